use super::{Bus, Cpu, IndexReg};

impl Cpu {
    /// M1 cycle: read the byte at PC through the opcode-fetch hook and bump
    /// the refresh counter.
    #[inline]
    pub(super) fn fetch_opcode<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let pc = self.regs.pc;
        self.tstates += bus.contend_mem(pc, 4);
        let opcode = bus.opcode_fetch(pc, self.regs.ir());
        self.regs.pc = pc.wrapping_add(1);
        self.regs.r = self.regs.r.wrapping_add(1);
        opcode
    }

    #[inline]
    pub(super) fn read8<B: Bus>(&mut self, bus: &mut B, addr: u16) -> u8 {
        self.tstates += bus.contend_mem(addr, 3);
        bus.read_byte(addr)
    }

    #[inline]
    pub(super) fn write8<B: Bus>(&mut self, bus: &mut B, addr: u16, value: u8) {
        self.tstates += bus.contend_mem(addr, 3);
        bus.write_byte(addr, value);
    }

    pub(super) fn read16<B: Bus>(&mut self, bus: &mut B, addr: u16) -> u16 {
        let lo = self.read8(bus, addr);
        let hi = self.read8(bus, addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    pub(super) fn write16<B: Bus>(&mut self, bus: &mut B, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write8(bus, addr, lo);
        self.write8(bus, addr.wrapping_add(1), hi);
    }

    /// Immediate byte at PC.
    #[inline]
    pub(super) fn fetch8<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = self.read8(bus, self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    pub(super) fn fetch16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch8(bus);
        let hi = self.fetch8(bus);
        u16::from_le_bytes([lo, hi])
    }

    pub(super) fn push16<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write8(bus, self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write8(bus, self.regs.sp, lo);
    }

    pub(super) fn pop16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.read8(bus, self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = self.read8(bus, self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        u16::from_le_bytes([lo, hi])
    }

    #[inline]
    pub(super) fn port_in<B: Bus>(&mut self, bus: &mut B, port: u16) -> u8 {
        self.tstates += bus.contend_io(port, 4);
        bus.read_port(port)
    }

    #[inline]
    pub(super) fn port_out<B: Bus>(&mut self, bus: &mut B, port: u16, value: u8) {
        self.tstates += bus.contend_io(port, 4);
        bus.write_port(port, value);
    }

    /// Internal cycles with no bus activity.
    #[inline]
    pub(super) fn idle(&mut self, ticks: u32) {
        self.tstates += ticks;
    }

    /// Relative jump by a signed displacement from the current PC.
    #[inline]
    pub(super) fn jump_relative(&mut self, offset: u8) {
        self.regs.pc = self.regs.pc.wrapping_add(offset as i8 as i16 as u16);
    }

    /// Read an 8-bit register by its 3-bit opcode encoding.
    ///
    /// Index 6 is `(HL)` and costs a memory read.
    pub(super) fn read_reg8<B: Bus>(&mut self, bus: &mut B, index: u8) -> u8 {
        match index {
            0 => self.regs.bc.hi(),
            1 => self.regs.bc.lo(),
            2 => self.regs.de.hi(),
            3 => self.regs.de.lo(),
            4 => self.regs.hl.hi(),
            5 => self.regs.hl.lo(),
            6 => self.read8(bus, self.regs.hl.get()),
            _ => self.a(),
        }
    }

    /// Write an 8-bit register by its 3-bit opcode encoding. Same encoding
    /// as `read_reg8`.
    pub(super) fn write_reg8<B: Bus>(&mut self, bus: &mut B, index: u8, value: u8) {
        match index {
            0 => self.regs.bc.set_hi(value),
            1 => self.regs.bc.set_lo(value),
            2 => self.regs.de.set_hi(value),
            3 => self.regs.de.set_lo(value),
            4 => self.regs.hl.set_hi(value),
            5 => self.regs.hl.set_lo(value),
            6 => self.write8(bus, self.regs.hl.get(), value),
            _ => self.set_a(value),
        }
    }

    /// Register pair by its 2-bit encoding in the BC/DE/HL/SP group.
    pub(super) fn read_rp(&self, index: u8) -> u16 {
        match index & 0x03 {
            0 => self.regs.bc.get(),
            1 => self.regs.de.get(),
            2 => self.regs.hl.get(),
            _ => self.regs.sp,
        }
    }

    pub(super) fn write_rp(&mut self, index: u8, value: u16) {
        match index & 0x03 {
            0 => self.regs.bc.set(value),
            1 => self.regs.de.set(value),
            2 => self.regs.hl.set(value),
            _ => self.regs.sp = value,
        }
    }

    /// Register pair in the BC/DE/HL/AF group used by PUSH and POP.
    pub(super) fn read_rp2(&self, index: u8) -> u16 {
        match index & 0x03 {
            3 => self.regs.af.get(),
            other => self.read_rp(other),
        }
    }

    pub(super) fn write_rp2(&mut self, index: u8, value: u16) {
        match index & 0x03 {
            3 => self.regs.af.set(value),
            other => self.write_rp(other, value),
        }
    }

    /// Evaluate a 3-bit condition code: NZ Z NC C PO PE P M.
    pub(super) fn condition(&self, cc: u8) -> bool {
        use super::tables::{FLAG_C, FLAG_P, FLAG_S, FLAG_Z};

        let f = self.f();
        match cc & 0x07 {
            0 => f & FLAG_Z == 0,
            1 => f & FLAG_Z != 0,
            2 => f & FLAG_C == 0,
            3 => f & FLAG_C != 0,
            4 => f & FLAG_P == 0,
            5 => f & FLAG_P != 0,
            6 => f & FLAG_S == 0,
            _ => f & FLAG_S != 0,
        }
    }

    pub(super) fn index(&self, reg: IndexReg) -> u16 {
        match reg {
            IndexReg::Ix => self.regs.ix.get(),
            IndexReg::Iy => self.regs.iy.get(),
        }
    }

    pub(super) fn set_index(&mut self, reg: IndexReg, value: u16) {
        match reg {
            IndexReg::Ix => self.regs.ix.set(value),
            IndexReg::Iy => self.regs.iy.set(value),
        }
    }

    /// `IX+d` / `IY+d` with the displacement fetched from the instruction
    /// stream, including the five internal cycles spent on the addition.
    pub(super) fn index_address<B: Bus>(&mut self, bus: &mut B, reg: IndexReg) -> u16 {
        let offset = self.fetch8(bus);
        self.idle(5);
        self.index(reg).wrapping_add(offset as i8 as i16 as u16)
    }
}
