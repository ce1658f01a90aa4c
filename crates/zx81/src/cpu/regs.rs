use bitflags::bitflags;

bitflags! {
    /// Condition bits of the F register.
    ///
    /// `X` and `Y` are the undocumented bits 3 and 5. They carry copies of
    /// result (or operand) bits and are preserved exactly, since some
    /// programs depend on them.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Flags: u8 {
        const C = 0x01;
        const N = 0x02;
        const PV = 0x04;
        const X = 0x08;
        const H = 0x10;
        const Y = 0x20;
        const Z = 0x40;
        const S = 0x80;
    }
}

/// A 16-bit register pair with two 8-bit views.
///
/// The high view maps to bits 15-8 and the low view to bits 7-0. Both views
/// read and write the same backing word, so a write through either half is
/// immediately visible through the other and through `get`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RegisterPair(u16);

impl RegisterPair {
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn set(&mut self, value: u16) {
        self.0 = value;
    }

    #[inline]
    pub fn inc(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    #[inline]
    pub fn dec(&mut self) {
        self.0 = self.0.wrapping_sub(1);
    }

    #[inline]
    pub fn hi(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub fn lo(self) -> u8 {
        self.0 as u8
    }

    #[inline]
    pub fn set_hi(&mut self, value: u8) {
        self.0 = (self.0 & 0x00FF) | ((value as u16) << 8);
    }

    #[inline]
    pub fn set_lo(&mut self, value: u8) {
        self.0 = (self.0 & 0xFF00) | value as u16;
    }
}

/// The AF pair: accumulator in the high byte, flags in the low byte.
///
/// On top of the plain pair operations it supports masking the flag byte in
/// place, which is how most instructions update a subset of F.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FlagPair(RegisterPair);

impl FlagPair {
    pub const fn new(value: u16) -> Self {
        Self(RegisterPair::new(value))
    }

    #[inline]
    pub fn get(self) -> u16 {
        self.0.get()
    }

    #[inline]
    pub fn set(&mut self, value: u16) {
        self.0.set(value);
    }

    #[inline]
    pub fn hi(self) -> u8 {
        self.0.hi()
    }

    #[inline]
    pub fn lo(self) -> u8 {
        self.0.lo()
    }

    #[inline]
    pub fn set_hi(&mut self, value: u8) {
        self.0.set_hi(value);
    }

    #[inline]
    pub fn set_lo(&mut self, value: u8) {
        self.0.set_lo(value);
    }

    /// `F &= mask`
    #[inline]
    pub fn and(&mut self, mask: u8) {
        self.0.set_lo(self.0.lo() & mask);
    }

    /// `F |= mask`
    #[inline]
    pub fn or(&mut self, mask: u8) {
        self.0.set_lo(self.0.lo() | mask);
    }

    #[inline]
    pub fn flags(self) -> Flags {
        Flags::from_bits_retain(self.0.lo())
    }

    #[inline]
    pub fn set_flags(&mut self, flags: Flags) {
        self.0.set_lo(flags.bits());
    }
}

/// Complete Z80 register file, including interrupt and refresh state.
///
/// `Default` is the power-on state: everything zero, interrupts disabled,
/// interrupt mode 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    pub af: FlagPair,
    pub bc: RegisterPair,
    pub de: RegisterPair,
    pub hl: RegisterPair,
    pub af_alt: FlagPair,
    pub bc_alt: RegisterPair,
    pub de_alt: RegisterPair,
    pub hl_alt: RegisterPair,
    pub ix: RegisterPair,
    pub iy: RegisterPair,
    pub sp: u16,
    pub pc: u16,
    pub i: u8,
    /// Refresh counter. Only the low seven bits count; bit 7 lives in `r7`.
    pub r: u8,
    /// Bit 7 of R as last written by `LD R,A`.
    pub r7: u8,
    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,
    pub halted: bool,
}

impl Registers {
    /// R as an instruction would read it.
    #[inline]
    pub fn r(&self) -> u8 {
        (self.r & 0x7F) | (self.r7 & 0x80)
    }

    #[inline]
    pub fn set_r(&mut self, value: u8) {
        self.r = value;
        self.r7 = value;
    }

    /// I and R as driven onto the address bus during the refresh half of M1.
    #[inline]
    pub fn ir(&self) -> u16 {
        ((self.i as u16) << 8) | self.r() as u16
    }
}
