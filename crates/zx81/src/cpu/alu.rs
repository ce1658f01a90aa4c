use super::tables::{
    lookup16, lookup8, FLAG_3, FLAG_5, FLAG_C, FLAG_H, FLAG_N, FLAG_P, FLAG_S, FLAG_V, FLAG_Z,
};
use super::Cpu;

impl Cpu {
    pub(super) fn add_a(&mut self, value: u8) {
        self.add_with_carry(value, 0);
    }

    pub(super) fn adc_a(&mut self, value: u8) {
        self.add_with_carry(value, self.f() & FLAG_C);
    }

    fn add_with_carry(&mut self, value: u8, carry: u8) {
        let a = self.a();
        let temp = a as u16 + value as u16 + carry as u16;
        let lookup = lookup8(a, value, temp);
        let result = temp as u8;
        self.set_a(result);
        self.set_f(
            (if temp & 0x100 != 0 { FLAG_C } else { 0 })
                | self.tables.halfcarry_add[lookup & 0x07]
                | self.tables.overflow_add[lookup >> 4]
                | self.tables.sz53[result as usize],
        );
    }

    pub(super) fn sub_a(&mut self, value: u8) {
        self.sub_with_carry(value, 0);
    }

    pub(super) fn sbc_a(&mut self, value: u8) {
        self.sub_with_carry(value, self.f() & FLAG_C);
    }

    fn sub_with_carry(&mut self, value: u8, carry: u8) {
        let a = self.a();
        let temp = (a as u16).wrapping_sub(value as u16).wrapping_sub(carry as u16);
        let lookup = lookup8(a, value, temp);
        let result = temp as u8;
        self.set_a(result);
        self.set_f(
            (if temp & 0x100 != 0 { FLAG_C } else { 0 })
                | FLAG_N
                | self.tables.halfcarry_sub[lookup & 0x07]
                | self.tables.overflow_sub[lookup >> 4]
                | self.tables.sz53[result as usize],
        );
    }

    /// Compare: a subtraction that only sets flags. Bits 3 and 5 come from
    /// the operand rather than the result.
    pub(super) fn cp_a(&mut self, value: u8) {
        let a = self.a();
        let temp = (a as u16).wrapping_sub(value as u16);
        let lookup = lookup8(a, value, temp);
        let carry_or_zero = if temp & 0x100 != 0 {
            FLAG_C
        } else if temp == 0 {
            FLAG_Z
        } else {
            0
        };
        self.set_f(
            carry_or_zero
                | FLAG_N
                | self.tables.halfcarry_sub[lookup & 0x07]
                | self.tables.overflow_sub[lookup >> 4]
                | (value & (FLAG_3 | FLAG_5))
                | (temp as u8 & FLAG_S),
        );
    }

    pub(super) fn and_a(&mut self, value: u8) {
        let result = self.a() & value;
        self.set_a(result);
        self.set_f(FLAG_H | self.tables.sz53p[result as usize]);
    }

    pub(super) fn xor_a(&mut self, value: u8) {
        let result = self.a() ^ value;
        self.set_a(result);
        self.set_f(self.tables.sz53p[result as usize]);
    }

    pub(super) fn or_a(&mut self, value: u8) {
        let result = self.a() | value;
        self.set_a(result);
        self.set_f(self.tables.sz53p[result as usize]);
    }

    /// The eight accumulator operations in opcode order:
    /// ADD ADC SUB SBC AND XOR OR CP.
    pub(super) fn alu_op(&mut self, op: u8, value: u8) {
        match op & 0x07 {
            0 => self.add_a(value),
            1 => self.adc_a(value),
            2 => self.sub_a(value),
            3 => self.sbc_a(value),
            4 => self.and_a(value),
            5 => self.xor_a(value),
            6 => self.or_a(value),
            _ => self.cp_a(value),
        }
    }

    pub(super) fn inc8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.set_f(
            (self.f() & FLAG_C)
                | (if result == 0x80 { FLAG_V } else { 0 })
                | (if result & 0x0F != 0 { 0 } else { FLAG_H })
                | self.tables.sz53[result as usize],
        );
        result
    }

    pub(super) fn dec8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.set_f(
            (self.f() & FLAG_C)
                | (if value & 0x0F != 0 { 0 } else { FLAG_H })
                | FLAG_N
                | (if result == 0x7F { FLAG_V } else { 0 })
                | self.tables.sz53[result as usize],
        );
        result
    }

    /// `ADD HL,rr` (or IX/IY). S, Z and P/V are left alone.
    pub(super) fn add16(&mut self, lhs: u16, rhs: u16) -> u16 {
        let temp = lhs as u32 + rhs as u32;
        let lookup = (((lhs & 0x0800) >> 11) | ((rhs & 0x0800) >> 10) | ((temp as u16 & 0x0800) >> 9))
            as usize;
        self.set_f(
            (self.f() & (FLAG_V | FLAG_Z | FLAG_S))
                | (if temp & 0x10000 != 0 { FLAG_C } else { 0 })
                | ((temp >> 8) as u8 & (FLAG_3 | FLAG_5))
                | self.tables.halfcarry_add[lookup],
        );
        temp as u16
    }

    /// `ADC HL,rr`
    pub(super) fn adc16(&mut self, value: u16) {
        let hl = self.regs.hl.get();
        let temp = hl as u32 + value as u32 + (self.f() & FLAG_C) as u32;
        let lookup = lookup16(hl, value, temp);
        let result = temp as u16;
        self.regs.hl.set(result);
        self.set_f(
            (if temp & 0x10000 != 0 { FLAG_C } else { 0 })
                | self.tables.overflow_add[lookup >> 4]
                | ((result >> 8) as u8 & (FLAG_3 | FLAG_5 | FLAG_S))
                | self.tables.halfcarry_add[lookup & 0x07]
                | (if result == 0 { FLAG_Z } else { 0 }),
        );
    }

    /// `SBC HL,rr`
    pub(super) fn sbc16(&mut self, value: u16) {
        let hl = self.regs.hl.get();
        let temp = (hl as u32)
            .wrapping_sub(value as u32)
            .wrapping_sub((self.f() & FLAG_C) as u32);
        let lookup = lookup16(hl, value, temp);
        let result = temp as u16;
        self.regs.hl.set(result);
        self.set_f(
            (if temp & 0x10000 != 0 { FLAG_C } else { 0 })
                | FLAG_N
                | self.tables.overflow_sub[lookup >> 4]
                | ((result >> 8) as u8 & (FLAG_3 | FLAG_5 | FLAG_S))
                | self.tables.halfcarry_sub[lookup & 0x07]
                | (if result == 0 { FLAG_Z } else { 0 }),
        );
    }

    /// Decimal adjust after a BCD add or subtract.
    ///
    /// The correction and the new carry depend on H, C, N and the value of
    /// A; the correction itself goes through the ordinary ADD/SUB paths so
    /// that H, S, Z and bits 3/5 come out the same way.
    pub(super) fn daa(&mut self) {
        let a = self.a();
        let f = self.f();
        let mut correction = 0u8;
        let mut carry = f & FLAG_C;

        if f & FLAG_H != 0 || a & 0x0F > 9 {
            correction = 0x06;
        }
        if carry != 0 || a > 0x99 {
            correction |= 0x60;
        }
        if a > 0x99 {
            carry = FLAG_C;
        }

        if f & FLAG_N != 0 {
            self.sub_a(correction);
        } else {
            self.add_a(correction);
        }

        let result = self.a();
        self.set_f((self.f() & !(FLAG_C | FLAG_P)) | carry | self.tables.parity[result as usize]);
    }

    pub(super) fn rlca(&mut self) {
        let a = self.a().rotate_left(1);
        self.set_a(a);
        self.set_f((self.f() & (FLAG_P | FLAG_Z | FLAG_S)) | (a & (FLAG_C | FLAG_3 | FLAG_5)));
    }

    pub(super) fn rrca(&mut self) {
        let old = self.a();
        let a = old.rotate_right(1);
        self.set_a(a);
        self.set_f(
            (self.f() & (FLAG_P | FLAG_Z | FLAG_S)) | (old & FLAG_C) | (a & (FLAG_3 | FLAG_5)),
        );
    }

    pub(super) fn rla(&mut self) {
        let old = self.a();
        let a = (old << 1) | (self.f() & FLAG_C);
        self.set_a(a);
        self.set_f((self.f() & (FLAG_P | FLAG_Z | FLAG_S)) | (a & (FLAG_3 | FLAG_5)) | (old >> 7));
    }

    pub(super) fn rra(&mut self) {
        let old = self.a();
        let a = (old >> 1) | (self.f() << 7);
        self.set_a(a);
        self.set_f(
            (self.f() & (FLAG_P | FLAG_Z | FLAG_S)) | (a & (FLAG_3 | FLAG_5)) | (old & FLAG_C),
        );
    }

    pub(super) fn cpl(&mut self) {
        let a = self.a() ^ 0xFF;
        self.set_a(a);
        self.set_f(
            (self.f() & (FLAG_C | FLAG_P | FLAG_Z | FLAG_S))
                | (a & (FLAG_3 | FLAG_5))
                | FLAG_N
                | FLAG_H,
        );
    }

    pub(super) fn scf(&mut self) {
        self.set_f((self.f() & (FLAG_P | FLAG_Z | FLAG_S)) | (self.a() & (FLAG_3 | FLAG_5)) | FLAG_C);
    }

    pub(super) fn ccf(&mut self) {
        let f = self.f();
        self.set_f(
            (f & (FLAG_P | FLAG_Z | FLAG_S))
                | (if f & FLAG_C != 0 { FLAG_H } else { FLAG_C })
                | (self.a() & (FLAG_3 | FLAG_5)),
        );
    }

    /// `NEG`: A = 0 - A.
    pub(super) fn neg(&mut self) {
        let value = self.a();
        self.set_a(0);
        self.sub_a(value);
    }

    /// CB-group rotates and shifts in opcode order:
    /// RLC RRC RL RR SLA SRA SLL SRL.
    ///
    /// SLL is the undocumented shift that feeds a 1 into bit 0.
    pub(super) fn shift_op(&mut self, op: u8, value: u8) -> u8 {
        let (result, carry) = match op & 0x07 {
            0 => (value.rotate_left(1), value >> 7),
            1 => (value.rotate_right(1), value & FLAG_C),
            2 => ((value << 1) | (self.f() & FLAG_C), value >> 7),
            3 => ((value >> 1) | (self.f() << 7), value & FLAG_C),
            4 => (value << 1, value >> 7),
            5 => ((value & 0x80) | (value >> 1), value & FLAG_C),
            6 => ((value << 1) | 0x01, value >> 7),
            _ => (value >> 1, value & FLAG_C),
        };
        self.set_f(carry | self.tables.sz53p[result as usize]);
        result
    }

    /// `BIT n,v`. Bits 3 and 5 are taken from `xy`, which is the tested value
    /// for register operands and the high byte of the effective address for
    /// indexed ones.
    pub(super) fn bit(&mut self, bit: u8, value: u8, xy: u8) {
        let mut f = (self.f() & FLAG_C) | FLAG_H | (xy & (FLAG_3 | FLAG_5));
        if value & (1 << bit) == 0 {
            f |= FLAG_P | FLAG_Z;
        }
        if bit == 7 && value & 0x80 != 0 {
            f |= FLAG_S;
        }
        self.set_f(f);
    }

    /// Flags after `RRD`/`RLD` and `IN r,(C)`.
    pub(super) fn set_logic_flags_keep_carry(&mut self, value: u8) {
        self.set_f((self.f() & FLAG_C) | self.tables.sz53p[value as usize]);
    }
}
