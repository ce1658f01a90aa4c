use super::tables::{FLAG_3, FLAG_5, FLAG_C, FLAG_H, FLAG_N, FLAG_S, FLAG_V, FLAG_Z};
use super::{Bus, Cpu};

impl Cpu {
    /// ED-prefixed instructions. Holes in the table execute as an 8 T-state
    /// no-op.
    pub(super) fn exec_ed<B: Bus>(&mut self, bus: &mut B) {
        let opcode = self.fetch_opcode(bus);
        let y = (opcode >> 3) & 0x07;
        let p = y >> 1;

        match opcode {
            // IN r,(C); ED 70 only sets flags.
            0x40 | 0x48 | 0x50 | 0x58 | 0x60 | 0x68 | 0x70 | 0x78 => {
                let value = self.port_in(bus, self.regs.bc.get());
                self.set_logic_flags_keep_carry(value);
                if y != 6 {
                    self.write_reg8(bus, y, value);
                }
            }

            // OUT (C),r; ED 71 outputs zero.
            0x41 | 0x49 | 0x51 | 0x59 | 0x61 | 0x69 | 0x71 | 0x79 => {
                let value = if y == 6 { 0 } else { self.read_reg8(bus, y) };
                self.port_out(bus, self.regs.bc.get(), value);
            }

            // SBC HL,rr
            0x42 | 0x52 | 0x62 | 0x72 => {
                self.idle(7);
                self.sbc16(self.read_rp(p));
            }

            // ADC HL,rr
            0x4A | 0x5A | 0x6A | 0x7A => {
                self.idle(7);
                self.adc16(self.read_rp(p));
            }

            // LD (nn),rr
            0x43 | 0x53 | 0x63 | 0x73 => {
                let addr = self.fetch16(bus);
                self.write16(bus, addr, self.read_rp(p));
            }

            // LD rr,(nn)
            0x4B | 0x5B | 0x6B | 0x7B => {
                let addr = self.fetch16(bus);
                let value = self.read16(bus, addr);
                self.write_rp(p, value);
            }

            // NEG and its mirrors
            0x44 | 0x4C | 0x54 | 0x5C | 0x64 | 0x6C | 0x74 | 0x7C => self.neg(),

            // RETN / RETI and mirrors
            0x45 | 0x4D | 0x55 | 0x5D | 0x65 | 0x6D | 0x75 | 0x7D => {
                self.regs.iff1 = self.regs.iff2;
                self.regs.pc = self.pop16(bus);
            }

            // IM 0 / 1 / 2
            0x46 | 0x4E | 0x66 | 0x6E => self.regs.im = 0,
            0x56 | 0x76 => self.regs.im = 1,
            0x5E | 0x7E => self.regs.im = 2,

            // LD I,A
            0x47 => {
                self.idle(1);
                self.regs.i = self.a();
            }

            // LD R,A
            0x4F => {
                self.idle(1);
                let a = self.a();
                self.regs.set_r(a);
            }

            // LD A,I / LD A,R: P/V reflects IFF2.
            0x57 | 0x5F => {
                self.idle(1);
                let value = if opcode == 0x57 {
                    self.regs.i
                } else {
                    self.regs.r()
                };
                self.set_a(value);
                let iff = if self.regs.iff2 { FLAG_V } else { 0 };
                self.set_f((self.f() & FLAG_C) | self.tables.sz53[value as usize] | iff);
            }

            // RRD
            0x67 => {
                let addr = self.regs.hl.get();
                let value = self.read8(bus, addr);
                self.idle(4);
                let a = self.a();
                self.write8(bus, addr, (a << 4) | (value >> 4));
                let a = (a & 0xF0) | (value & 0x0F);
                self.set_a(a);
                self.set_logic_flags_keep_carry(a);
            }

            // RLD
            0x6F => {
                let addr = self.regs.hl.get();
                let value = self.read8(bus, addr);
                self.idle(4);
                let a = self.a();
                self.write8(bus, addr, (value << 4) | (a & 0x0F));
                let a = (a & 0xF0) | (value >> 4);
                self.set_a(a);
                self.set_logic_flags_keep_carry(a);
            }

            // LDI / LDD / LDIR / LDDR
            0xA0 | 0xA8 | 0xB0 | 0xB8 => {
                self.block_load(bus, opcode & 0x08 == 0);
                if opcode & 0x10 != 0 && self.regs.bc.get() != 0 {
                    self.repeat_block();
                }
            }

            // CPI / CPD / CPIR / CPDR
            0xA1 | 0xA9 | 0xB1 | 0xB9 => {
                self.block_compare(bus, opcode & 0x08 == 0);
                if opcode & 0x10 != 0 && self.f() & (FLAG_V | FLAG_Z) == FLAG_V {
                    self.repeat_block();
                }
            }

            // INI / IND / INIR / INDR
            0xA2 | 0xAA | 0xB2 | 0xBA => {
                self.block_in(bus, opcode & 0x08 == 0);
                if opcode & 0x10 != 0 && self.regs.bc.hi() != 0 {
                    self.repeat_block();
                }
            }

            // OUTI / OUTD / OTIR / OTDR
            0xA3 | 0xAB | 0xB3 | 0xBB => {
                self.block_out(bus, opcode & 0x08 == 0);
                if opcode & 0x10 != 0 && self.regs.bc.hi() != 0 {
                    self.repeat_block();
                }
            }

            _ => {}
        }
    }

    fn step_hl(&mut self, increment: bool) {
        if increment {
            self.regs.hl.inc();
        } else {
            self.regs.hl.dec();
        }
    }

    /// Re-run the current block instruction: five extra cycles and PC back
    /// onto the ED prefix.
    fn repeat_block(&mut self) {
        self.idle(5);
        self.regs.pc = self.regs.pc.wrapping_sub(2);
    }

    fn block_load<B: Bus>(&mut self, bus: &mut B, increment: bool) {
        let value = self.read8(bus, self.regs.hl.get());
        self.regs.bc.dec();
        self.write8(bus, self.regs.de.get(), value);
        self.idle(2);
        if increment {
            self.regs.de.inc();
        } else {
            self.regs.de.dec();
        }
        self.step_hl(increment);

        let n = value.wrapping_add(self.a());
        let bc = if self.regs.bc.get() != 0 { FLAG_V } else { 0 };
        self.set_f(
            (self.f() & (FLAG_C | FLAG_Z | FLAG_S))
                | bc
                | (n & FLAG_3)
                | (if n & 0x02 != 0 { FLAG_5 } else { 0 }),
        );
    }

    fn block_compare<B: Bus>(&mut self, bus: &mut B, increment: bool) {
        let value = self.read8(bus, self.regs.hl.get());
        self.idle(5);
        let a = self.a();
        let mut diff = a.wrapping_sub(value);
        let lookup = (((a & 0x08) >> 3) | ((value & 0x08) >> 2) | ((diff & 0x08) >> 1)) as usize;
        self.step_hl(increment);
        self.regs.bc.dec();

        let bc = if self.regs.bc.get() != 0 {
            FLAG_V | FLAG_N
        } else {
            FLAG_N
        };
        let mut f = (self.f() & FLAG_C)
            | bc
            | self.tables.halfcarry_sub[lookup]
            | (if diff == 0 { FLAG_Z } else { 0 })
            | (diff & FLAG_S);
        if f & FLAG_H != 0 {
            diff = diff.wrapping_sub(1);
        }
        f |= (diff & FLAG_3) | (if diff & 0x02 != 0 { FLAG_5 } else { 0 });
        self.set_f(f);
    }

    fn block_in<B: Bus>(&mut self, bus: &mut B, increment: bool) {
        self.idle(1);
        let value = self.port_in(bus, self.regs.bc.get());
        self.write8(bus, self.regs.hl.get(), value);
        let b = self.regs.bc.hi().wrapping_sub(1);
        self.regs.bc.set_hi(b);
        self.step_hl(increment);
        let n = if value & 0x80 != 0 { FLAG_N } else { 0 };
        self.set_f(n | self.tables.sz53[b as usize]);
    }

    fn block_out<B: Bus>(&mut self, bus: &mut B, increment: bool) {
        self.idle(1);
        let value = self.read8(bus, self.regs.hl.get());
        // B is decremented before it goes out on the port address.
        let b = self.regs.bc.hi().wrapping_sub(1);
        self.regs.bc.set_hi(b);
        self.port_out(bus, self.regs.bc.get(), value);
        self.step_hl(increment);
        let n = if value & 0x80 != 0 { FLAG_N } else { 0 };
        self.set_f(n | self.tables.sz53[b as usize]);
    }
}
