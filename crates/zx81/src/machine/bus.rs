use crate::cpu::Bus;
use crate::scanline::Sample;

use super::keyboard::Keyboard;
use super::tape::Tape;
use super::{MEMORY_SIZE, RAM_START, RAM_TOP};

/// Lowest address whose opcode fetches are routed through the video logic.
const DISPLAY_FETCH_START: u16 = 0x8000;
/// Fetches at or above this address are folded back down by clearing A15.
const DISPLAY_FOLD_START: u16 = 0xC000;

/// Port activity seen during the current instruction.
///
/// The scanline loop reads this after every instruction to drive the sync
/// generators; it is the only way port I/O affects video timing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(super) enum LastInstruction {
    #[default]
    None,
    /// Read from an even port (keyboard / cassette).
    InFe,
    OutFe,
    OutFd,
    /// Write to any other port.
    OutFf,
}

/// Address space, ports and the video shift registers.
pub(super) struct Zx81Bus {
    memory: Vec<u8>,
    pub keyboard: Keyboard,
    pub tape: Tape,
    pub shift_register: u16,
    /// Inverse-video companion of `shift_register`; pixels are the XOR of
    /// both top bits.
    pub shift_inverse: u16,
    /// Character row (0-7) used to index the glyph table.
    pub row_counter: u8,
    pub last_instruction: LastInstruction,
}

impl Default for Zx81Bus {
    fn default() -> Self {
        Self {
            // Uninitialised RAM reads back as 7.
            memory: vec![7; MEMORY_SIZE],
            keyboard: Keyboard::default(),
            tape: Tape::default(),
            shift_register: 0,
            shift_inverse: 0,
            row_counter: 0,
            last_instruction: LastInstruction::None,
        }
    }
}

impl Zx81Bus {
    #[inline]
    pub fn peek(&self, addr: u16) -> u8 {
        self.memory[(addr & RAM_TOP) as usize]
    }

    /// Store bypassing write protection. Only used to place the ROM image.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        let start = addr as usize;
        let end = (start + bytes.len()).min(MEMORY_SIZE);
        self.memory[start..end].copy_from_slice(&bytes[..end - start]);
    }

    /// Clear the video latches. Memory, keyboard and tape are untouched.
    pub fn reset_video(&mut self) {
        self.shift_register = 0;
        self.shift_inverse = 0;
        self.row_counter = 0;
        self.last_instruction = LastInstruction::None;
    }

    /// Shift one sample out of the video registers.
    ///
    /// While the hsync generator is off the output is held at sync level,
    /// but the registers keep shifting.
    #[inline]
    pub fn next_sample(&mut self, hsync_generator: bool) -> Sample {
        let ink = (self.shift_register ^ self.shift_inverse) & 0x8000 != 0;
        self.shift_register <<= 1;
        self.shift_inverse <<= 1;
        match (hsync_generator, ink) {
            (false, _) => Sample::Sync,
            (true, true) => Sample::Ink,
            (true, false) => Sample::Paper,
        }
    }
}

impl Bus for Zx81Bus {
    fn read_byte(&mut self, addr: u16) -> u8 {
        self.peek(addr)
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        let addr = addr & RAM_TOP;
        if addr >= RAM_START {
            self.memory[addr as usize] = value;
        }
    }

    fn read_port(&mut self, port: u16) -> u8 {
        if port & 0x01 != 0 {
            return 0xFF;
        }

        self.last_instruction = LastInstruction::InFe;
        let keys = self.keyboard.read((port >> 8) as u8);
        let ear = if self.tape.level() { 0x80 } else { 0 };
        // Bit 5 unused (high), bit 6 set for a 50 Hz machine.
        (!keys & 0x1F) | 0x20 | 0x40 | ear
    }

    fn write_port(&mut self, port: u16, _value: u8) {
        self.last_instruction = match port & 0xFF {
            0xFD => LastInstruction::OutFd,
            0xFE => LastInstruction::OutFe,
            _ => LastInstruction::OutFf,
        };
    }

    /// Opcode fetches from the upper 32K run the display file.
    ///
    /// A byte with bit 6 set is real code and goes to the CPU. Anything else
    /// is a character: its glyph row is looked up in the table at `I * 256`
    /// and loaded into the shift register, and the CPU sees a NOP.
    fn opcode_fetch(&mut self, addr: u16, refresh: u16) -> u8 {
        if addr < DISPLAY_FETCH_START {
            return self.peek(addr);
        }

        let folded = if addr >= DISPLAY_FOLD_START {
            addr & RAM_TOP
        } else {
            addr
        };
        let data = self.peek(folded);
        if data & 0x40 != 0 {
            return data;
        }

        let glyph_addr = (refresh & 0xFE00) | (((data & 0x3F) as u16) << 3) | self.row_counter as u16;
        self.shift_register |= self.peek(glyph_addr) as u16;
        if data & 0x80 != 0 {
            self.shift_inverse |= 0xFF;
        }
        0
    }
}
