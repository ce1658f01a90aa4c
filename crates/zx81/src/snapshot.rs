//! `.z81` text snapshots.
//!
//! A snapshot is a sequence of whitespace separated tokens grouped under
//! `[CPU]`, `[ZX81]` and `[MEMORY]` headers. The first two sections hold
//! `KEY VALUE` pairs in hex. `[MEMORY]` holds hex bytes, `*COUNT VALUE`
//! runs and `MEMRANGE base` directives that move the write cursor.
//!
//! ```text
//! [CPU]
//! PC 0207 SP 7FE8 AF 1E44 IR 1E5C IM 02 IF1 01 IF2 01 HT 00
//! [ZX81]
//! NMI 01 HSYNC 01 ROW 03
//! [MEMORY]
//! MEMRANGE 4000
//! 00 FF 80 *0010 00 76
//! ```

use anyhow::{bail, Context, Result};

use crate::cpu::Registers;
use crate::machine::{VideoState, Zx81, TSTATES_PER_LINE};

const RAM_START: u16 = 0x4000;
const RAM_END: u16 = 0x7FFF;
/// Shortest run written as `*COUNT VALUE` on save.
const MIN_RUN: usize = 4;
const TOKENS_PER_LINE: usize = 16;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub registers: Registers,
    pub nmi_generator: bool,
    pub hsync_generator: bool,
    pub row_counter: u8,
    /// Memory blocks as (start address, bytes).
    pub memory: Vec<(u16, Vec<u8>)>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Section {
    Cpu,
    Zx81,
    Memory,
    Unknown,
}

/// Parse snapshot text. Errors name the token that could not be used.
pub fn parse(text: &str) -> Result<Snapshot> {
    let mut snapshot = Snapshot::default();
    let mut section = None;
    let mut tokens = text.split_whitespace();

    while let Some(token) = tokens.next() {
        if let Some(name) = token.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
            section = Some(match name {
                "CPU" => Section::Cpu,
                "ZX81" => Section::Zx81,
                "MEMORY" => Section::Memory,
                _ => {
                    log::warn!("skipping unknown snapshot section `{token}`");
                    Section::Unknown
                }
            });
            continue;
        }

        match section {
            None => bail!("`{token}` appears before any section header"),
            Some(Section::Unknown) => {}
            Some(Section::Cpu) => {
                let value = hex_value(token, tokens.next())?;
                set_register(&mut snapshot.registers, token, value);
            }
            Some(Section::Zx81) => {
                let value = hex_value(token, tokens.next())?;
                match token {
                    "NMI" => snapshot.nmi_generator = value != 0,
                    "HSYNC" => snapshot.hsync_generator = value != 0,
                    "ROW" => snapshot.row_counter = (value & 0x07) as u8,
                    _ => log::warn!("skipping unknown ZX81 key `{token}`"),
                }
            }
            Some(Section::Memory) => {
                if token == "MEMRANGE" {
                    let base = hex_value(token, tokens.next())?;
                    snapshot.memory.push((base, Vec::new()));
                    continue;
                }
                if snapshot.memory.is_empty() {
                    snapshot.memory.push((RAM_START, Vec::new()));
                }
                let Some((_, block)) = snapshot.memory.last_mut() else {
                    continue;
                };
                if let Some(count) = token.strip_prefix('*') {
                    let count = parse_hex(count, token)?;
                    let value = parse_byte(tokens.next(), token)?;
                    block.extend(std::iter::repeat(value).take(count as usize));
                } else {
                    block.push(parse_byte(Some(token), token)?);
                }
            }
        }
    }
    Ok(snapshot)
}

/// Read the value token following `key`.
fn hex_value(key: &str, value: Option<&str>) -> Result<u16> {
    let Some(value) = value else {
        bail!("missing value for `{key}`");
    };
    parse_hex(value, key)
}

fn parse_hex(text: &str, context: &str) -> Result<u16> {
    u16::from_str_radix(text, 16)
        .with_context(|| format!("invalid hex value `{text}` after `{context}`"))
}

fn parse_byte(text: Option<&str>, context: &str) -> Result<u8> {
    let Some(text) = text else {
        bail!("missing byte after `{context}`");
    };
    u8::from_str_radix(text, 16).with_context(|| format!("invalid memory byte `{text}`"))
}

fn set_register(regs: &mut Registers, key: &str, value: u16) {
    match key {
        "PC" => regs.pc = value,
        "SP" => regs.sp = value,
        "HL" => regs.hl.set(value),
        "DE" => regs.de.set(value),
        "BC" => regs.bc.set(value),
        "AF" => regs.af.set(value),
        "HL_" => regs.hl_alt.set(value),
        "DE_" => regs.de_alt.set(value),
        "BC_" => regs.bc_alt.set(value),
        "AF_" => regs.af_alt.set(value),
        "IX" => regs.ix.set(value),
        "IY" => regs.iy.set(value),
        "IR" => {
            let [r, i] = value.to_le_bytes();
            regs.i = i;
            regs.set_r(r);
        }
        "IM" => regs.im = value as u8,
        "IF1" => regs.iff1 = value != 0,
        "IF2" => regs.iff2 = value != 0,
        "HT" => regs.halted = value != 0,
        _ => log::warn!("skipping unknown CPU key `{key}`"),
    }
}

impl Zx81 {
    /// Restore CPU, sync generators and memory from a parsed snapshot.
    ///
    /// Memory goes through the normal write path, so blocks overlapping the
    /// ROM only land in RAM.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) {
        self.cpu_mut().regs = snapshot.registers;
        self.set_video_state(VideoState {
            nmi_generator: snapshot.nmi_generator,
            hsync_generator: snapshot.hsync_generator,
            row_counter: snapshot.row_counter,
            hsync_counter: TSTATES_PER_LINE as i32,
            borrow: 0,
        });

        let mut bytes = 0;
        for (base, block) in &snapshot.memory {
            for (offset, &value) in block.iter().enumerate() {
                self.write_byte(base.wrapping_add(offset as u16), value);
            }
            bytes += block.len();
        }
        log::info!(
            "snapshot applied: PC 0x{:04X}, {} bytes of memory",
            snapshot.registers.pc,
            bytes
        );
    }

    /// Write the machine state in snapshot text form. RAM is saved with
    /// runs of repeated bytes compressed.
    pub fn save_snapshot(&self) -> String {
        let regs = &self.cpu().regs;
        let video = self.video_state();

        let pair = |name: &str, value: u16| format!("{name} {value:04X}");
        let byte = |name: &str, value: u8| format!("{name} {value:02X}");
        let flag = |name: &str, value: bool| byte(name, value as u8);

        let mut lines = vec![
            "[CPU]".to_string(),
            pair("PC", regs.pc),
            pair("SP", regs.sp),
            pair("HL", regs.hl.get()),
            pair("DE", regs.de.get()),
            pair("BC", regs.bc.get()),
            pair("AF", regs.af.get()),
            pair("HL_", regs.hl_alt.get()),
            pair("DE_", regs.de_alt.get()),
            pair("BC_", regs.bc_alt.get()),
            pair("AF_", regs.af_alt.get()),
            pair("IX", regs.ix.get()),
            pair("IY", regs.iy.get()),
            pair("IR", regs.ir()),
            byte("IM", regs.im),
            flag("IF1", regs.iff1),
            flag("IF2", regs.iff2),
            flag("HT", regs.halted),
            String::new(),
            "[ZX81]".to_string(),
            flag("NMI", video.nmi_generator),
            flag("HSYNC", video.hsync_generator),
            byte("ROW", video.row_counter),
            String::new(),
            "[MEMORY]".to_string(),
            pair("MEMRANGE", RAM_START),
        ];

        let ram: Vec<u8> = (RAM_START..=RAM_END).map(|addr| self.read_byte(addr)).collect();
        let tokens = run_length_tokens(&ram);
        lines.extend(tokens.chunks(TOKENS_PER_LINE).map(|chunk| chunk.join(" ")));
        lines.push(String::new());
        lines.join("\n")
    }
}

fn run_length_tokens(bytes: &[u8]) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut index = 0;
    while index < bytes.len() {
        let value = bytes[index];
        let run = bytes[index..].iter().take_while(|&&b| b == value).count();
        if run >= MIN_RUN {
            tokens.push(format!("*{run:04X} {value:02X}"));
        } else {
            tokens.extend(std::iter::repeat(format!("{value:02X}")).take(run));
        }
        index += run;
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "
        [CPU]
        PC 0207 SP 7FE8 HL 4321 DE 1234 BC 00FF AF 1E44
        HL_ 1111 DE_ 2222 BC_ 3333 AF_ 4455
        IX 0281 IY 4000 IR 1ED5 IM 02 IF1 01 IF2 01 HT 00
        [ZX81]
        NMI 01 HSYNC 01 ROW 03
        [MEMORY]
        MEMRANGE 4000
        00 FF *0004 76 80
        MEMRANGE 7FFE
        C9 C9
    ";

    #[test]
    fn parses_registers_and_video_state() {
        let snapshot = parse(SAMPLE).unwrap();
        let regs = &snapshot.registers;
        assert_eq!(regs.pc, 0x0207);
        assert_eq!(regs.sp, 0x7FE8);
        assert_eq!(regs.af.get(), 0x1E44);
        assert_eq!(regs.af_alt.get(), 0x4455);
        assert_eq!(regs.iy.get(), 0x4000);
        assert_eq!((regs.i, regs.r()), (0x1E, 0xD5));
        assert_eq!(regs.im, 2);
        assert!(regs.iff1 && regs.iff2 && !regs.halted);
        assert!(snapshot.nmi_generator && snapshot.hsync_generator);
        assert_eq!(snapshot.row_counter, 3);
    }

    #[test]
    fn memory_runs_and_ranges() {
        let snapshot = parse(SAMPLE).unwrap();
        assert_eq!(
            snapshot.memory,
            vec![
                (0x4000, vec![0x00, 0xFF, 0x76, 0x76, 0x76, 0x76, 0x80]),
                (0x7FFE, vec![0xC9, 0xC9]),
            ]
        );
    }

    #[test]
    fn unknown_keys_and_sections_are_skipped() {
        let snapshot = parse("[CPU] XYZ 12 PC 0100 [DEBUG] anything at all [ZX81] ROW 05").unwrap();
        assert_eq!(snapshot.registers.pc, 0x0100);
        assert_eq!(snapshot.row_counter, 5);
    }

    #[test]
    fn errors_name_the_offending_token() {
        let cases = [
            ("[CPU] PC 12G4", "12G4"),
            ("[CPU] PC", "PC"),
            ("PC 0000", "PC"),
            ("[MEMORY] 4G", "4G"),
            ("[MEMORY] *ZZ 00", "ZZ"),
            ("[MEMORY] *0010", "*0010"),
            ("[ZX81] NMI -1", "-1"),
        ];
        for (text, token) in cases {
            let err = parse(text).unwrap_err();
            assert!(
                err.to_string().contains(token),
                "`{text}` gave `{err}`, expected it to mention `{token}`"
            );
        }
    }

    #[test]
    fn run_length_tokens_compress_long_runs_only() {
        let tokens = run_length_tokens(&[1, 1, 1, 2, 2, 2, 2, 2, 3]);
        assert_eq!(tokens, ["01", "01", "01", "*0005 02", "03"]);
    }

    #[test]
    fn saved_state_restores_into_a_fresh_machine() {
        let mut original = Zx81::new();
        original.apply_snapshot(&parse(SAMPLE).unwrap());
        original.write_byte(0x5000, 0x42);

        let mut restored = Zx81::new();
        restored.apply_snapshot(&parse(&original.save_snapshot()).unwrap());

        assert_eq!(restored.cpu().regs, original.cpu().regs);
        assert_eq!(restored.video_state(), original.video_state());
        for addr in RAM_START..=RAM_END {
            assert_eq!(restored.read_byte(addr), original.read_byte(addr), "at {addr:#06x}");
        }
    }
}
