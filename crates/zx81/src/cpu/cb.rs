use super::{Bus, Cpu};

impl Cpu {
    /// CB-prefixed rotates, shifts and bit operations on `r` or `(HL)`.
    pub(super) fn exec_cb<B: Bus>(&mut self, bus: &mut B) {
        let opcode = self.fetch_opcode(bus);
        let x = opcode >> 6;
        let y = (opcode >> 3) & 0x07;
        let z = opcode & 0x07;

        let value = self.read_reg8(bus, z);
        if z == 6 {
            self.idle(1);
        }

        match x {
            0 => {
                let result = self.shift_op(y, value);
                self.write_reg8(bus, z, result);
            }
            1 => self.bit(y, value, value),
            2 => self.write_reg8(bus, z, value & !(1 << y)),
            _ => self.write_reg8(bus, z, value | (1 << y)),
        }
    }
}
