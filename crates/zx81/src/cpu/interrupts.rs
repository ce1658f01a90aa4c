use super::{Bus, Cpu};

/// Restart address for IM 0 / IM 1 acknowledges.
const IM1_VECTOR: u16 = 0x0038;
/// Fixed NMI restart address.
const NMI_VECTOR: u16 = 0x0066;

impl Cpu {
    /// Maskable interrupt acknowledge.
    ///
    /// Ignored (returning 0) while IFF1 is clear. Otherwise PC is pushed and
    /// the CPU vectors according to the interrupt mode. IM 0 is treated like
    /// IM 1 since nothing drives an opcode onto the data bus; IM 2 reads the
    /// handler address from `(I << 8) | 0xFF`.
    ///
    /// Returns the T-states taken by the acknowledge.
    pub fn interrupt<B: Bus>(&mut self, bus: &mut B) -> u32 {
        if !self.regs.iff1 {
            return 0;
        }

        self.leave_halt();
        self.regs.iff1 = false;
        self.regs.iff2 = false;
        self.regs.r = self.regs.r.wrapping_add(1);
        self.push_raw(bus, self.regs.pc);

        match self.regs.im {
            0 | 1 => {
                self.regs.pc = IM1_VECTOR;
                13
            }
            _ => {
                let vector = ((self.regs.i as u16) << 8) | 0xFF;
                let lo = bus.read_byte(vector);
                let hi = bus.read_byte(vector.wrapping_add(1));
                self.regs.pc = u16::from_le_bytes([lo, hi]);
                19
            }
        }
    }

    /// Non-maskable interrupt: always accepted, vectors to 0x0066.
    ///
    /// IFF1 is cleared and IFF2 keeps the previous state so `RETN` can
    /// restore it. `ts` is the length of the scanline so far in samples
    /// (two per T-state). When the NMI ends a HALT, the acknowledge is held
    /// by WAIT until the next HALT M1 boundary, which adds up to three
    /// T-states.
    pub fn nmi<B: Bus>(&mut self, bus: &mut B, ts: u32) -> u32 {
        let was_halted = self.regs.halted;

        self.leave_halt();
        self.regs.iff1 = false;
        self.regs.r = self.regs.r.wrapping_add(1);
        self.push_raw(bus, self.regs.pc);
        self.regs.pc = NMI_VECTOR;

        let wait_states = if was_halted { (4 - (ts / 2) % 4) % 4 } else { 0 };
        11 + wait_states
    }

    /// Step PC past the HALT opcode it has been parked on.
    fn leave_halt(&mut self) {
        if self.regs.halted {
            self.regs.halted = false;
            self.regs.pc = self.regs.pc.wrapping_add(1);
        }
    }

    /// Push without charging time; acknowledge cycles are fixed totals.
    fn push_raw<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write_byte(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write_byte(self.regs.sp, lo);
    }
}
