//! Zilog Z80 interpreter.
//!
//! The core executes one instruction per [`Cpu::step`] call and returns the
//! number of T-states it took. Every memory, port and opcode access goes
//! through a [`Bus`], so the machine decides what an access means and how
//! long it lasts.

mod alu;
mod bus;
mod cb;
mod ed;
mod exec;
mod helpers;
mod index;
mod index_cb;
mod interrupts;
mod regs;
mod tables;
#[cfg(test)]
mod tests;

pub use bus::Bus;
pub use regs::{FlagPair, Flags, RegisterPair, Registers};
pub use tables::FlagTables;

/// Index register selected by a DD or FD prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum IndexReg {
    Ix,
    Iy,
}

#[derive(Clone, Debug)]
pub struct Cpu {
    pub regs: Registers,
    tables: &'static FlagTables,
    /// T-states charged so far by the instruction in flight.
    tstates: u32,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            regs: Registers::default(),
            tables: FlagTables::shared(),
            tstates: 0,
        }
    }

    /// Power-on state: all registers zero, interrupts disabled, IM 0.
    pub fn reset(&mut self) {
        self.regs = Registers::default();
        self.tstates = 0;
    }

    /// Fetch, decode and execute one instruction.
    ///
    /// Returns the T-states consumed, including any wait states the bus
    /// reported through its contention hooks.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> u32 {
        self.tstates = 0;
        let opcode = self.fetch_opcode(bus);
        self.exec_opcode(bus, opcode);
        self.tstates
    }

    /// Pop PC from the stack as if a `RET` had executed, without charging
    /// any time. Used by loader traps that replace a ROM routine.
    pub fn force_ret<B: Bus>(&mut self, bus: &mut B) {
        let sp = self.regs.sp;
        let lo = bus.read_byte(sp);
        let hi = bus.read_byte(sp.wrapping_add(1));
        self.regs.sp = sp.wrapping_add(2);
        self.regs.pc = u16::from_le_bytes([lo, hi]);
    }

    #[inline]
    fn a(&self) -> u8 {
        self.regs.af.hi()
    }

    #[inline]
    fn set_a(&mut self, value: u8) {
        self.regs.af.set_hi(value);
    }

    #[inline]
    fn f(&self) -> u8 {
        self.regs.af.lo()
    }

    #[inline]
    fn set_f(&mut self, value: u8) {
        self.regs.af.set_lo(value);
    }
}
