use super::{Bus, Cpu, IndexReg};

impl Cpu {
    /// Execute an unprefixed opcode whose M1 fetch has already been charged.
    ///
    /// Prefix bytes hand over to the CB, ED and DD/FD tables.
    pub(super) fn exec_opcode<B: Bus>(&mut self, bus: &mut B, opcode: u8) {
        let y = (opcode >> 3) & 0x07;
        let z = opcode & 0x07;
        let p = y >> 1;

        match opcode {
            // NOP
            0x00 => {}

            // LD rr,nn
            0x01 | 0x11 | 0x21 | 0x31 => {
                let value = self.fetch16(bus);
                self.write_rp(p, value);
            }

            // LD (BC),A / LD (DE),A
            0x02 | 0x12 => {
                let addr = self.read_rp(p);
                self.write8(bus, addr, self.a());
            }

            // LD (nn),HL
            0x22 => {
                let addr = self.fetch16(bus);
                self.write16(bus, addr, self.regs.hl.get());
            }

            // LD (nn),A
            0x32 => {
                let addr = self.fetch16(bus);
                self.write8(bus, addr, self.a());
            }

            // INC rr
            0x03 | 0x13 | 0x23 | 0x33 => {
                self.idle(2);
                self.write_rp(p, self.read_rp(p).wrapping_add(1));
            }

            // DEC rr
            0x0B | 0x1B | 0x2B | 0x3B => {
                self.idle(2);
                self.write_rp(p, self.read_rp(p).wrapping_sub(1));
            }

            // INC r / INC (HL)
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
                let value = self.read_reg8(bus, y);
                if y == 6 {
                    self.idle(1);
                }
                let result = self.inc8(value);
                self.write_reg8(bus, y, result);
            }

            // DEC r / DEC (HL)
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
                let value = self.read_reg8(bus, y);
                if y == 6 {
                    self.idle(1);
                }
                let result = self.dec8(value);
                self.write_reg8(bus, y, result);
            }

            // LD r,n / LD (HL),n
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
                let value = self.fetch8(bus);
                self.write_reg8(bus, y, value);
            }

            0x07 => self.rlca(),
            0x0F => self.rrca(),
            0x17 => self.rla(),
            0x1F => self.rra(),
            0x27 => self.daa(),
            0x2F => self.cpl(),
            0x37 => self.scf(),
            0x3F => self.ccf(),

            // EX AF,AF'
            0x08 => std::mem::swap(&mut self.regs.af, &mut self.regs.af_alt),

            // ADD HL,rr
            0x09 | 0x19 | 0x29 | 0x39 => {
                self.idle(7);
                let result = self.add16(self.regs.hl.get(), self.read_rp(p));
                self.regs.hl.set(result);
            }

            // LD A,(BC) / LD A,(DE)
            0x0A | 0x1A => {
                let addr = self.read_rp(p);
                let value = self.read8(bus, addr);
                self.set_a(value);
            }

            // LD HL,(nn)
            0x2A => {
                let addr = self.fetch16(bus);
                let value = self.read16(bus, addr);
                self.regs.hl.set(value);
            }

            // LD A,(nn)
            0x3A => {
                let addr = self.fetch16(bus);
                let value = self.read8(bus, addr);
                self.set_a(value);
            }

            // DJNZ e
            0x10 => {
                self.idle(1);
                let b = self.regs.bc.hi().wrapping_sub(1);
                self.regs.bc.set_hi(b);
                let offset = self.fetch8(bus);
                if b != 0 {
                    self.idle(5);
                    self.jump_relative(offset);
                }
            }

            // JR e
            0x18 => {
                let offset = self.fetch8(bus);
                self.idle(5);
                self.jump_relative(offset);
            }

            // JR cc,e (NZ Z NC C only)
            0x20 | 0x28 | 0x30 | 0x38 => {
                let offset = self.fetch8(bus);
                if self.condition(y - 4) {
                    self.idle(5);
                    self.jump_relative(offset);
                }
            }

            // HALT: PC stays on the opcode until an interrupt moves it on.
            0x76 => {
                self.regs.halted = true;
                self.regs.pc = self.regs.pc.wrapping_sub(1);
            }

            // LD r,r' (with (HL) on either side). LD B,B and friends are
            // plain no-ops.
            0x40..=0x75 | 0x77..=0x7F => {
                let value = self.read_reg8(bus, z);
                self.write_reg8(bus, y, value);
            }

            // ALU A,r
            0x80..=0xBF => {
                let value = self.read_reg8(bus, z);
                self.alu_op(y, value);
            }

            // RET cc
            0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => {
                self.idle(1);
                if self.condition(y) {
                    self.regs.pc = self.pop16(bus);
                }
            }

            // POP rr
            0xC1 | 0xD1 | 0xE1 | 0xF1 => {
                let value = self.pop16(bus);
                self.write_rp2(p, value);
            }

            // JP cc,nn
            0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => {
                let addr = self.fetch16(bus);
                if self.condition(y) {
                    self.regs.pc = addr;
                }
            }

            // JP nn
            0xC3 => self.regs.pc = self.fetch16(bus),

            // CALL cc,nn
            0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => {
                let addr = self.fetch16(bus);
                if self.condition(y) {
                    self.call(bus, addr);
                }
            }

            // PUSH rr
            0xC5 | 0xD5 | 0xE5 | 0xF5 => {
                self.idle(1);
                self.push16(bus, self.read_rp2(p));
            }

            // ALU A,n
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
                let value = self.fetch8(bus);
                self.alu_op(y, value);
            }

            // RST p
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
                self.idle(1);
                self.push16(bus, self.regs.pc);
                self.regs.pc = (opcode & 0x38) as u16;
            }

            // RET
            0xC9 => self.regs.pc = self.pop16(bus),

            // CALL nn
            0xCD => {
                let addr = self.fetch16(bus);
                self.call(bus, addr);
            }

            // OUT (n),A: A supplies the high byte of the port address.
            0xD3 => {
                let low = self.fetch8(bus);
                let port = u16::from_be_bytes([self.a(), low]);
                self.port_out(bus, port, self.a());
            }

            // IN A,(n)
            0xDB => {
                let low = self.fetch8(bus);
                let port = u16::from_be_bytes([self.a(), low]);
                let value = self.port_in(bus, port);
                self.set_a(value);
            }

            // EXX
            0xD9 => {
                std::mem::swap(&mut self.regs.bc, &mut self.regs.bc_alt);
                std::mem::swap(&mut self.regs.de, &mut self.regs.de_alt);
                std::mem::swap(&mut self.regs.hl, &mut self.regs.hl_alt);
            }

            // EX (SP),HL
            0xE3 => {
                let value = self.exchange_stack_top(bus, self.regs.hl.get());
                self.regs.hl.set(value);
            }

            // JP (HL)
            0xE9 => self.regs.pc = self.regs.hl.get(),

            // EX DE,HL
            0xEB => std::mem::swap(&mut self.regs.de, &mut self.regs.hl),

            // DI / EI
            0xF3 => {
                self.regs.iff1 = false;
                self.regs.iff2 = false;
            }
            0xFB => {
                self.regs.iff1 = true;
                self.regs.iff2 = true;
            }

            // LD SP,HL
            0xF9 => {
                self.idle(2);
                self.regs.sp = self.regs.hl.get();
            }

            0xCB => self.exec_cb(bus),
            0xED => self.exec_ed(bus),
            0xDD => self.exec_index(bus, IndexReg::Ix),
            0xFD => self.exec_index(bus, IndexReg::Iy),
        }
    }

    fn call<B: Bus>(&mut self, bus: &mut B, addr: u16) {
        self.idle(1);
        self.push16(bus, self.regs.pc);
        self.regs.pc = addr;
    }

    /// Swap a word with the top of the stack (`EX (SP),rr`), returning the
    /// old stack contents.
    pub(super) fn exchange_stack_top<B: Bus>(&mut self, bus: &mut B, value: u16) -> u16 {
        let sp = self.regs.sp;
        let lo = self.read8(bus, sp);
        let hi = self.read8(bus, sp.wrapping_add(1));
        self.idle(1);
        let [new_lo, new_hi] = value.to_le_bytes();
        self.write8(bus, sp.wrapping_add(1), new_hi);
        self.write8(bus, sp, new_lo);
        self.idle(2);
        u16::from_le_bytes([lo, hi])
    }
}
