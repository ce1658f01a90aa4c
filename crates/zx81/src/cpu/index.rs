use super::{Bus, Cpu, IndexReg};

impl Cpu {
    /// DD/FD-prefixed instructions: the HL forms with HL replaced by IX or
    /// IY, `(HL)` replaced by `(IX+d)`, and H/L replaced by the index halves.
    ///
    /// When the byte after the prefix does not touch HL at all, the prefix
    /// acts alone: PC and R are wound back so the next `step` executes that
    /// byte as an ordinary opcode, and only the prefix's own M1 is charged.
    pub(super) fn exec_index<B: Bus>(&mut self, bus: &mut B, reg: IndexReg) {
        let charged = self.tstates;
        let opcode = self.fetch_opcode(bus);
        let y = (opcode >> 3) & 0x07;
        let z = opcode & 0x07;
        let p = y >> 1;

        match opcode {
            // ADD IX,rr (rr = BC, DE, IX, SP)
            0x09 | 0x19 | 0x29 | 0x39 => {
                self.idle(7);
                let rhs = if p == 2 {
                    self.index(reg)
                } else {
                    self.read_rp(p)
                };
                let result = self.add16(self.index(reg), rhs);
                self.set_index(reg, result);
            }

            // LD IX,nn
            0x21 => {
                let value = self.fetch16(bus);
                self.set_index(reg, value);
            }

            // LD (nn),IX
            0x22 => {
                let addr = self.fetch16(bus);
                self.write16(bus, addr, self.index(reg));
            }

            // LD IX,(nn)
            0x2A => {
                let addr = self.fetch16(bus);
                let value = self.read16(bus, addr);
                self.set_index(reg, value);
            }

            // INC IX / DEC IX
            0x23 => {
                self.idle(2);
                self.set_index(reg, self.index(reg).wrapping_add(1));
            }
            0x2B => {
                self.idle(2);
                self.set_index(reg, self.index(reg).wrapping_sub(1));
            }

            // INC IXH / INC IXL
            0x24 | 0x2C => {
                let value = self.read_index_reg8(reg, y);
                let result = self.inc8(value);
                self.write_index_reg8(reg, y, result);
            }

            // DEC IXH / DEC IXL
            0x25 | 0x2D => {
                let value = self.read_index_reg8(reg, y);
                let result = self.dec8(value);
                self.write_index_reg8(reg, y, result);
            }

            // LD IXH,n / LD IXL,n
            0x26 | 0x2E => {
                let value = self.fetch8(bus);
                self.write_index_reg8(reg, y, value);
            }

            // INC (IX+d)
            0x34 => {
                let addr = self.index_address(bus, reg);
                let value = self.read8(bus, addr);
                self.idle(1);
                let result = self.inc8(value);
                self.write8(bus, addr, result);
            }

            // DEC (IX+d)
            0x35 => {
                let addr = self.index_address(bus, reg);
                let value = self.read8(bus, addr);
                self.idle(1);
                let result = self.dec8(value);
                self.write8(bus, addr, result);
            }

            // LD (IX+d),n: the displacement and the immediate are both read
            // before the address is formed.
            0x36 => {
                let offset = self.fetch8(bus);
                let value = self.fetch8(bus);
                self.idle(2);
                let addr = self.index(reg).wrapping_add(offset as i8 as i16 as u16);
                self.write8(bus, addr, value);
            }

            // LD r,(IX+d): the destination is the real register, H and L
            // included.
            0x46 | 0x4E | 0x56 | 0x5E | 0x66 | 0x6E | 0x7E => {
                let addr = self.index_address(bus, reg);
                let value = self.read8(bus, addr);
                self.write_reg8(bus, y, value);
            }

            // LD (IX+d),r
            0x70..=0x75 | 0x77 => {
                let addr = self.index_address(bus, reg);
                let value = self.read_reg8(bus, z);
                self.write8(bus, addr, value);
            }

            // LD r,r' where either side is H or L: both sides use the index
            // halves.
            0x40..=0x7F if y == 4 || y == 5 || z == 4 || z == 5 => {
                let value = self.read_index_reg8(reg, z);
                self.write_index_reg8(reg, y, value);
            }

            // ALU A,(IX+d)
            0x86 | 0x8E | 0x96 | 0x9E | 0xA6 | 0xAE | 0xB6 | 0xBE => {
                let addr = self.index_address(bus, reg);
                let value = self.read8(bus, addr);
                self.alu_op(y, value);
            }

            // ALU A,IXH / ALU A,IXL
            0x80..=0xBF if z == 4 || z == 5 => {
                let value = self.read_index_reg8(reg, z);
                self.alu_op(y, value);
            }

            0xCB => self.exec_index_cb(bus, reg),

            // POP IX
            0xE1 => {
                let value = self.pop16(bus);
                self.set_index(reg, value);
            }

            // EX (SP),IX
            0xE3 => {
                let value = self.exchange_stack_top(bus, self.index(reg));
                self.set_index(reg, value);
            }

            // PUSH IX
            0xE5 => {
                self.idle(1);
                self.push16(bus, self.index(reg));
            }

            // JP (IX)
            0xE9 => self.regs.pc = self.index(reg),

            // LD SP,IX
            0xF9 => {
                self.idle(2);
                self.regs.sp = self.index(reg);
            }

            _ => {
                self.tstates = charged;
                self.regs.pc = self.regs.pc.wrapping_sub(1);
                self.regs.r = self.regs.r.wrapping_sub(1);
            }
        }
    }

    /// Like `read_reg8` without memory, with H and L mapped to the index
    /// register halves.
    fn read_index_reg8(&self, reg: IndexReg, index: u8) -> u8 {
        let pair = match reg {
            IndexReg::Ix => self.regs.ix,
            IndexReg::Iy => self.regs.iy,
        };
        match index {
            0 => self.regs.bc.hi(),
            1 => self.regs.bc.lo(),
            2 => self.regs.de.hi(),
            3 => self.regs.de.lo(),
            4 => pair.hi(),
            5 => pair.lo(),
            _ => self.a(),
        }
    }

    fn write_index_reg8(&mut self, reg: IndexReg, index: u8, value: u8) {
        let pair = match reg {
            IndexReg::Ix => &mut self.regs.ix,
            IndexReg::Iy => &mut self.regs.iy,
        };
        match index {
            4 => pair.set_hi(value),
            5 => pair.set_lo(value),
            0 => self.regs.bc.set_hi(value),
            1 => self.regs.bc.set_lo(value),
            2 => self.regs.de.set_hi(value),
            3 => self.regs.de.set_lo(value),
            _ => self.set_a(value),
        }
    }
}
