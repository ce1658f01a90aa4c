use super::{Bus, Cpu, IndexReg};

impl Cpu {
    /// DD CB d op / FD CB d op.
    ///
    /// The effective address is formed once, then `op` behaves like the CB
    /// table applied to that address. Apart from BIT, the result is also
    /// copied into the register named by the low three bits of `op` (the
    /// undocumented `LD r,RLC (IX+d)` forms); encoding 6 means memory only.
    pub(super) fn exec_index_cb<B: Bus>(&mut self, bus: &mut B, reg: IndexReg) {
        let offset = self.fetch8(bus);
        let addr = self.index(reg).wrapping_add(offset as i8 as i16 as u16);
        // The fourth byte is read as data, not as an M1 fetch.
        let opcode = self.fetch8(bus);
        self.idle(2);

        let x = opcode >> 6;
        let y = (opcode >> 3) & 0x07;
        let z = opcode & 0x07;

        let value = self.read8(bus, addr);
        self.idle(1);

        let result = match x {
            0 => self.shift_op(y, value),
            1 => {
                self.bit(y, value, (addr >> 8) as u8);
                return;
            }
            2 => value & !(1 << y),
            _ => value | (1 << y),
        };

        self.write8(bus, addr, result);
        if z != 6 {
            self.write_reg8(bus, z, result);
        }
    }
}
