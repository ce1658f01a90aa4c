use super::*;

struct TestBus {
    memory: [u8; 0x10000],
    /// Value returned by every port read.
    port_value: u8,
    port_writes: Vec<(u16, u8)>,
    /// Extra T-states added to every memory access.
    wait_states: u32,
    opcode_fetches: usize,
}

impl Default for TestBus {
    fn default() -> Self {
        Self {
            memory: [0; 0x10000],
            port_value: 0xFF,
            port_writes: Vec::new(),
            wait_states: 0,
            opcode_fetches: 0,
        }
    }
}

impl TestBus {
    fn with_program(code: &[u8]) -> Self {
        let mut bus = Self::default();
        bus.memory[..code.len()].copy_from_slice(code);
        bus
    }
}

impl Bus for TestBus {
    fn read_byte(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
    }

    fn read_port(&mut self, _port: u16) -> u8 {
        self.port_value
    }

    fn write_port(&mut self, port: u16, value: u8) {
        self.port_writes.push((port, value));
    }

    fn opcode_fetch(&mut self, addr: u16, _refresh: u16) -> u8 {
        self.opcode_fetches += 1;
        self.read_byte(addr)
    }

    fn contend_mem(&mut self, _addr: u16, ticks: u32) -> u32 {
        ticks + self.wait_states
    }
}

fn flags_of(cpu: &Cpu) -> u8 {
    cpu.regs.af.lo()
}

/// Flags computed from first principles, for comparison with the
/// table-driven implementation. Returns (A after the op, F).
fn reference_alu(op: u8, a: u8, b: u8, carry_in: bool) -> (u8, u8) {
    let c = carry_in as u8;
    let sz = |r: u8| -> u8 {
        let mut f = r & 0xA8; // S, bit 5, bit 3
        if r == 0 {
            f |= 0x40;
        }
        f
    };
    let parity = |r: u8| -> u8 {
        if r.count_ones() % 2 == 0 {
            0x04
        } else {
            0
        }
    };

    match op {
        // ADD / ADC
        0 | 1 => {
            let c = if op == 1 { c } else { 0 };
            let wide = a as u16 + b as u16 + c as u16;
            let r = wide as u8;
            let signed = a as i8 as i16 + b as i8 as i16 + c as i16;
            let mut f = sz(r);
            if (a & 0x0F) + (b & 0x0F) + c > 0x0F {
                f |= 0x10;
            }
            if !(-128..=127).contains(&signed) {
                f |= 0x04;
            }
            if wide > 0xFF {
                f |= 0x01;
            }
            (r, f)
        }
        // SUB / SBC / CP
        2 | 3 | 7 => {
            let c = if op == 3 { c } else { 0 };
            let r = a.wrapping_sub(b).wrapping_sub(c);
            let signed = a as i8 as i16 - b as i8 as i16 - c as i16;
            let mut f = 0x02 | (r & 0x80) | if r == 0 { 0x40 } else { 0 };
            f |= if op == 7 { b & 0x28 } else { r & 0x28 };
            if (a & 0x0F) < (b & 0x0F) + c {
                f |= 0x10;
            }
            if !(-128..=127).contains(&signed) {
                f |= 0x04;
            }
            if (a as u16) < b as u16 + c as u16 {
                f |= 0x01;
            }
            (if op == 7 { a } else { r }, f)
        }
        4 => {
            let r = a & b;
            (r, sz(r) | parity(r) | 0x10)
        }
        5 => {
            let r = a ^ b;
            (r, sz(r) | parity(r))
        }
        _ => {
            let r = a | b;
            (r, sz(r) | parity(r))
        }
    }
}

fn to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

#[test]
fn register_pair_high_half_aliases_word() {
    for x in 0..=255u8 {
        let mut pair = RegisterPair::new(0x5A5A);
        pair.set_hi(x);
        assert_eq!(pair.get() & 0xFF00, (x as u16) << 8);
        assert_eq!(pair.get() & 0x00FF, 0x5A);
        assert_eq!(pair.hi(), x);
    }
}

#[test]
fn register_pair_low_half_aliases_word() {
    for x in 0..=255u8 {
        let mut pair = RegisterPair::new(0xA5A5);
        pair.set_lo(x);
        assert_eq!(pair.get() & 0x00FF, x as u16);
        assert_eq!(pair.get() & 0xFF00, 0xA500);
        assert_eq!(pair.lo(), x);
    }
}

#[test]
fn register_pair_inc_dec_wrap() {
    let mut pair = RegisterPair::new(0xFFFF);
    pair.inc();
    assert_eq!(pair.get(), 0);
    pair.dec();
    assert_eq!(pair.get(), 0xFFFF);
    assert_eq!((pair.hi(), pair.lo()), (0xFF, 0xFF));
}

#[test]
fn flag_pair_masks_only_the_flag_byte() {
    let mut af = FlagPair::new(0x12F0);
    af.and(0x0F | Flags::S.bits());
    assert_eq!(af.get(), 0x1280);
    af.or(Flags::C.bits() | Flags::X.bits());
    assert_eq!(af.get(), 0x1289);
    assert!(af.flags().contains(Flags::S | Flags::C | Flags::X));
    assert!(!af.flags().contains(Flags::Z));

    af.set_flags(Flags::Z | Flags::N);
    assert_eq!(af.get(), 0x1242);
    assert_eq!(af.hi(), 0x12);
}

#[test]
fn alu_flags_match_reference_for_all_operands() {
    let mut cpu = Cpu::new();
    for op in 0..8u8 {
        for carry_in in [false, true] {
            for a in 0..=255u8 {
                for b in 0..=255u8 {
                    cpu.set_a(a);
                    // Seed F with junk to prove every bit is rewritten.
                    cpu.set_f(if carry_in { 0xFF } else { 0xFE });
                    cpu.alu_op(op, b);

                    let (expected_a, expected_f) = reference_alu(op, a, b, carry_in);
                    assert_eq!(
                        (cpu.a(), flags_of(&cpu)),
                        (expected_a, expected_f),
                        "op {op} a={a:#04x} b={b:#04x} carry={carry_in}"
                    );
                }
            }
        }
    }
}

#[test]
fn daa_corrects_bcd_addition() {
    let mut cpu = Cpu::new();
    for x in 0..100u8 {
        for y in 0..100u8 {
            cpu.set_a(to_bcd(x));
            cpu.set_f(0);
            cpu.add_a(to_bcd(y));
            cpu.daa();

            let sum = x as u16 + y as u16;
            assert_eq!(cpu.a(), to_bcd((sum % 100) as u8), "{x} + {y}");
            assert_eq!(flags_of(&cpu) & 0x01 != 0, sum >= 100, "carry for {x} + {y}");
        }
    }
}

#[test]
fn daa_corrects_bcd_subtraction() {
    let mut cpu = Cpu::new();
    for x in 0..100u8 {
        for y in 0..100u8 {
            cpu.set_a(to_bcd(x));
            cpu.set_f(0);
            cpu.sub_a(to_bcd(y));
            cpu.daa();

            let difference = (x as i16 - y as i16).rem_euclid(100) as u8;
            assert_eq!(cpu.a(), to_bcd(difference), "{x} - {y}");
            assert_eq!(flags_of(&cpu) & 0x01 != 0, x < y, "borrow for {x} - {y}");
            assert_ne!(flags_of(&cpu) & 0x02, 0);
        }
    }
}

#[test]
fn inc_and_dec_set_overflow_at_sign_boundary() {
    let mut cpu = Cpu::new();
    cpu.set_f(0x01);
    assert_eq!(cpu.inc8(0x7F), 0x80);
    assert_eq!(flags_of(&cpu), 0x80 | 0x10 | 0x04 | 0x01);

    cpu.set_f(0);
    assert_eq!(cpu.dec8(0x80), 0x7F);
    assert_eq!(flags_of(&cpu), 0x28 | 0x10 | 0x04 | 0x02);
}

#[test]
fn sbc_hl_sets_zero_and_keeps_bits_from_high_byte() {
    // LD HL,0x2800 ; LD DE,0x27FF ; SCF ; SBC HL,DE
    let mut bus = TestBus::with_program(&[0x21, 0x00, 0x28, 0x11, 0xFF, 0x27, 0x37, 0xED, 0x52]);
    let mut cpu = Cpu::new();
    for _ in 0..3 {
        cpu.step(&mut bus);
    }
    assert_eq!(cpu.step(&mut bus), 15);
    assert_eq!(cpu.regs.hl.get(), 0);
    assert_eq!(flags_of(&cpu), 0x40 | 0x02);
}

#[test]
fn im2_vectors_through_table_and_pushes_pc() {
    let mut bus = TestBus::default();
    bus.memory[0x40FF] = 0x34;
    bus.memory[0x4100] = 0x12;

    let mut cpu = Cpu::new();
    cpu.regs.i = 0x40;
    cpu.regs.im = 2;
    cpu.regs.iff1 = true;
    cpu.regs.iff2 = true;
    cpu.regs.sp = 0xFFF0;
    cpu.regs.pc = 0x5678;

    assert_eq!(cpu.interrupt(&mut bus), 19);
    assert_eq!(cpu.regs.pc, 0x1234);
    assert_eq!(cpu.regs.sp, 0xFFEE);
    assert_eq!(bus.memory[0xFFEE], 0x78);
    assert_eq!(bus.memory[0xFFEF], 0x56);
    assert!(!cpu.regs.iff1 && !cpu.regs.iff2);
}

#[test]
fn interrupt_is_ignored_while_disabled() {
    let mut bus = TestBus::default();
    let mut cpu = Cpu::new();
    cpu.regs.im = 1;
    cpu.regs.pc = 0x1000;
    assert_eq!(cpu.interrupt(&mut bus), 0);
    assert_eq!(cpu.regs.pc, 0x1000);
    assert_eq!(cpu.regs.sp, 0);
}

#[test]
fn halt_parks_pc_until_interrupt_moves_past_it() {
    // EI ; HALT
    let mut bus = TestBus::with_program(&[0xFB, 0x76]);
    let mut cpu = Cpu::new();
    cpu.regs.sp = 0x8000;
    cpu.regs.im = 1;

    cpu.step(&mut bus);
    for _ in 0..3 {
        assert_eq!(cpu.step(&mut bus), 4);
        assert!(cpu.regs.halted);
        assert_eq!(cpu.regs.pc, 0x0001);
    }

    assert_eq!(cpu.interrupt(&mut bus), 13);
    assert!(!cpu.regs.halted);
    assert_eq!(cpu.regs.pc, 0x0038);
    // Return address is the byte after HALT.
    assert_eq!((bus.memory[0x7FFE], bus.memory[0x7FFF]), (0x02, 0x00));
}

#[test]
fn nmi_keeps_iff2_and_vectors_to_0066() {
    let mut bus = TestBus::default();
    let mut cpu = Cpu::new();
    cpu.regs.iff1 = true;
    cpu.regs.iff2 = true;
    cpu.regs.sp = 0x8000;
    cpu.regs.pc = 0x4321;

    assert_eq!(cpu.nmi(&mut bus, 100), 11);
    assert_eq!(cpu.regs.pc, 0x0066);
    assert!(!cpu.regs.iff1);
    assert!(cpu.regs.iff2);
    assert_eq!((bus.memory[0x7FFE], bus.memory[0x7FFF]), (0x21, 0x43));
}

#[test]
fn nmi_waking_halt_adds_alignment_wait_states() {
    let mut bus = TestBus::default();
    let mut cpu = Cpu::new();
    cpu.regs.sp = 0x8000;
    cpu.regs.pc = 0x0010;
    cpu.regs.halted = true;

    // 2 * 5 samples = 5 T-states into the line; 3 more reach the boundary.
    assert_eq!(cpu.nmi(&mut bus, 10), 14);
    assert_eq!((bus.memory[0x7FFE], bus.memory[0x7FFF]), (0x11, 0x00));
}

#[test]
fn unrecognised_index_prefix_rewinds_pc_and_r() {
    // DD 04 (INC B does not involve HL) then RET at 0x0002.
    let mut bus = TestBus::with_program(&[0xDD, 0x04, 0xC9]);
    let mut cpu = Cpu::new();

    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.regs.pc, 0x0001);
    assert_eq!(cpu.regs.r, 1);
    assert_eq!(cpu.regs.bc.hi(), 0);

    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.regs.pc, 0x0002);
    assert_eq!(cpu.regs.r, 2);
    assert_eq!(cpu.regs.bc.hi(), 1);
}

#[test]
fn index_prefix_replaces_h_and_l_with_index_halves() {
    // LD IX,0x1234 ; LD IXH,0x56 ; LD A,IXL ; LD H,(IX+0) with (0x5634)=0x99
    let mut bus =
        TestBus::with_program(&[0xDD, 0x21, 0x34, 0x12, 0xDD, 0x26, 0x56, 0xDD, 0x7D, 0xDD, 0x66, 0x00]);
    bus.memory[0x5634] = 0x99;
    let mut cpu = Cpu::new();

    assert_eq!(cpu.step(&mut bus), 14);
    assert_eq!(cpu.step(&mut bus), 11);
    assert_eq!(cpu.regs.ix.get(), 0x5634);
    assert_eq!(cpu.step(&mut bus), 8);
    assert_eq!(cpu.a(), 0x34);
    assert_eq!(cpu.step(&mut bus), 19);
    assert_eq!(cpu.regs.hl.hi(), 0x99);
    assert_eq!(cpu.regs.ix.get(), 0x5634);
}

#[test]
fn indexed_cb_uses_displacement_and_copies_result_to_register() {
    // LD IY,0x4000 ; RLC (IY-2) ; LD B,RLC (IY+1)
    let mut bus = TestBus::with_program(&[
        0xFD, 0x21, 0x00, 0x40, 0xFD, 0xCB, 0xFE, 0x06, 0xFD, 0xCB, 0x01, 0x00,
    ]);
    bus.memory[0x3FFE] = 0x81;
    bus.memory[0x4001] = 0x40;
    let mut cpu = Cpu::new();

    cpu.step(&mut bus);
    assert_eq!(cpu.step(&mut bus), 23);
    assert_eq!(bus.memory[0x3FFE], 0x03);
    assert_ne!(flags_of(&cpu) & 0x01, 0);

    assert_eq!(cpu.step(&mut bus), 23);
    assert_eq!(bus.memory[0x4001], 0x80);
    assert_eq!(cpu.regs.bc.hi(), 0x80);
}

#[test]
fn indexed_bit_takes_undocumented_bits_from_address() {
    // LD IX,0x2800 ; BIT 0,(IX+0)
    let mut bus = TestBus::with_program(&[0xDD, 0x21, 0x00, 0x28, 0xDD, 0xCB, 0x00, 0x46]);
    bus.memory[0x2800] = 0x00;
    let mut cpu = Cpu::new();

    cpu.step(&mut bus);
    assert_eq!(cpu.step(&mut bus), 20);
    assert_eq!(flags_of(&cpu), 0x28 | 0x10 | 0x40 | 0x04);
}

#[test]
fn documented_timings() {
    let cases: &[(&[u8], u32)] = &[
        (&[0x00], 4),
        (&[0x01, 0x00, 0x00], 10),
        (&[0x09], 11),
        (&[0x34], 11),
        (&[0x36, 0x00], 10),
        (&[0x18, 0x00], 12),
        (&[0xCD, 0x00, 0x10], 17),
        (&[0xC5], 11),
        (&[0xE3], 19),
        (&[0xD3, 0xFD], 11),
        (&[0xCB, 0x00], 8),
        (&[0xCB, 0x06], 15),
        (&[0xCB, 0x46], 12),
        (&[0xED, 0x47], 9),
        (&[0xED, 0x67], 18),
        (&[0xED, 0x43, 0x00, 0x00], 20),
        (&[0xED, 0x00], 8),
        (&[0xDD, 0x36, 0x00, 0x00], 19),
        (&[0xDD, 0x34, 0x00], 23),
        (&[0xDD, 0xE5], 15),
        (&[0xDD, 0xE3], 23),
        (&[0xDD, 0xCB, 0x00, 0x86], 23),
    ];

    for (code, expected) in cases {
        let mut bus = TestBus::with_program(code);
        let mut cpu = Cpu::new();
        cpu.regs.sp = 0x8000;
        assert_eq!(cpu.step(&mut bus), *expected, "opcode bytes {code:02x?}");
    }
}

#[test]
fn ldir_repeats_until_bc_is_zero() {
    // LD HL,0x1000 ; LD DE,0x2000 ; LD BC,3 ; LDIR
    let mut bus = TestBus::with_program(&[
        0x21, 0x00, 0x10, 0x11, 0x00, 0x20, 0x01, 0x03, 0x00, 0xED, 0xB0,
    ]);
    bus.memory[0x1000..0x1003].copy_from_slice(&[1, 2, 3]);
    let mut cpu = Cpu::new();
    for _ in 0..3 {
        cpu.step(&mut bus);
    }

    assert_eq!(cpu.step(&mut bus), 21);
    assert_eq!(cpu.regs.pc, 0x0009);
    assert_eq!(cpu.step(&mut bus), 21);
    assert_eq!(cpu.step(&mut bus), 16);
    assert_eq!(cpu.regs.pc, 0x000B);
    assert_eq!(&bus.memory[0x2000..0x2003], &[1, 2, 3]);
    assert_eq!(cpu.regs.bc.get(), 0);
    assert_eq!(flags_of(&cpu) & 0x04, 0);
}

#[test]
fn out_places_accumulator_on_high_address_byte() {
    // LD A,0x7F ; OUT (0xFE),A ; LD BC,0x12FD ; OUT (C),A
    let mut bus = TestBus::with_program(&[0x3E, 0x7F, 0xD3, 0xFE, 0x01, 0xFD, 0x12, 0xED, 0x79]);
    let mut cpu = Cpu::new();
    for _ in 0..4 {
        cpu.step(&mut bus);
    }
    assert_eq!(bus.port_writes, vec![(0x7FFE, 0x7F), (0x12FD, 0x7F)]);
}

#[test]
fn in_r_c_sets_parity_flags_and_keeps_carry() {
    // SCF ; LD BC,0x00FE ; IN D,(C)
    let mut bus = TestBus::with_program(&[0x37, 0x01, 0xFE, 0x00, 0xED, 0x50]);
    bus.port_value = 0x03;
    let mut cpu = Cpu::new();
    for _ in 0..2 {
        cpu.step(&mut bus);
    }
    assert_eq!(cpu.step(&mut bus), 12);
    assert_eq!(cpu.regs.de.hi(), 0x03);
    assert_eq!(flags_of(&cpu), 0x04 | 0x01);
}

#[test]
fn ld_a_r_combines_refresh_counter_and_bit_seven() {
    // LD A,0x80 ; LD R,A ; LD A,R
    let mut bus = TestBus::with_program(&[0x3E, 0x80, 0xED, 0x4F, 0xED, 0x5F]);
    let mut cpu = Cpu::new();
    for _ in 0..3 {
        cpu.step(&mut bus);
    }
    // LD R,A wrote 0x80; LD A,R fetched two more M1 cycles (ED, 5F).
    assert_eq!(cpu.a(), 0x82);
    assert_ne!(flags_of(&cpu) & 0x80, 0);
}

#[test]
fn prefixed_opcodes_are_fetched_as_m1_cycles() {
    // DD CB d op has two M1 fetches; the displacement and op are data reads.
    let mut bus = TestBus::with_program(&[0xDD, 0xCB, 0x00, 0xC6, 0xED, 0x44, 0x00]);
    let mut cpu = Cpu::new();
    cpu.step(&mut bus);
    assert_eq!(bus.opcode_fetches, 2);
    assert_eq!(cpu.regs.r, 2);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(bus.opcode_fetches, 5);
}

#[test]
fn contention_hook_adds_wait_states() {
    // LD A,(0x4000): one M1 plus three memory reads.
    let mut bus = TestBus::with_program(&[0x3A, 0x00, 0x40]);
    bus.wait_states = 1;
    let mut cpu = Cpu::new();
    assert_eq!(cpu.step(&mut bus), 13 + 4);
}

#[test]
fn reset_is_idempotent() {
    let mut bus = TestBus::with_program(&[0x31, 0x00, 0x80, 0x3E, 0x42, 0xED, 0x56, 0xFB]);
    let mut cpu = Cpu::new();
    for _ in 0..4 {
        cpu.step(&mut bus);
    }

    cpu.reset();
    let once = cpu.regs;
    cpu.reset();
    assert_eq!(cpu.regs, once);
    assert_eq!(once, Registers::default());
    assert_eq!(once.im, 0);
    assert!(!once.iff1);
}

#[test]
fn force_ret_pops_without_time() {
    let mut bus = TestBus::default();
    bus.memory[0x7FF0] = 0x07;
    bus.memory[0x7FF1] = 0x02;
    let mut cpu = Cpu::new();
    cpu.regs.sp = 0x7FF0;
    cpu.force_ret(&mut bus);
    assert_eq!(cpu.regs.pc, 0x0207);
    assert_eq!(cpu.regs.sp, 0x7FF2);
}
