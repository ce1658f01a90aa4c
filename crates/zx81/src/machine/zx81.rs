use anyhow::{bail, Result};

use crate::cpu::{Bus, Cpu};
use crate::scanline::{Sample, Scanline, SyncKind, MAX_SCANLINE_LEN};

use super::bus::{LastInstruction, Zx81Bus};
use super::keyboard::Zx81Key;
use super::loader::ProgramLoader;
use super::{Zx81Config, HSYNC_LEN, ROM_MIRROR, ROM_SIZE, TSTATES_PER_LINE};

/// Sync generator state, as saved in snapshots.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VideoState {
    pub nmi_generator: bool,
    pub hsync_generator: bool,
    pub row_counter: u8,
    pub hsync_counter: i32,
    pub borrow: i32,
}

/// A 16K ZX81.
///
/// Owns the Z80, the address space and the sync generators. The host drives
/// it one raster line at a time with [`Zx81::do_scanline`].
pub struct Zx81 {
    cpu: Cpu,
    bus: Zx81Bus,
    loader: ProgramLoader,
    config: Zx81Config,
    nmi_generator: bool,
    hsync_generator: bool,
    /// T-states left until the next horizontal sync.
    hsync_counter: i32,
    /// T-states the last line overran its sync point by, paid back as
    /// blanking at the start of the next line.
    borrow: i32,
    int_pending: bool,
}

impl Zx81 {
    pub fn new() -> Self {
        Self::with_config(Zx81Config::default())
    }

    pub fn with_config(config: Zx81Config) -> Self {
        log::info!("ZX81 init, loader {:?}", config.loader);
        Self {
            cpu: Cpu::new(),
            bus: Zx81Bus::default(),
            loader: ProgramLoader::new(&config),
            config,
            nmi_generator: false,
            hsync_generator: false,
            hsync_counter: TSTATES_PER_LINE as i32,
            borrow: 0,
            int_pending: false,
        }
    }

    /// Power-on reset. Memory, held keys and any queued program survive.
    pub fn reset(&mut self) {
        log::info!("ZX81 reset");
        self.cpu.reset();
        self.bus.reset_video();
        self.bus.tape.stop();
        self.nmi_generator = false;
        self.hsync_generator = false;
        self.hsync_counter = TSTATES_PER_LINE as i32;
        self.borrow = 0;
        self.int_pending = false;
    }

    /// Load the 8K system ROM at 0x0000 (mirrored at 0x2000) and reset.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<()> {
        if rom.is_empty() {
            bail!("ROM image is empty");
        }
        if rom.len() > ROM_SIZE {
            log::warn!("ROM image is {} bytes, using the first {}", rom.len(), ROM_SIZE);
        }
        let rom = &rom[..rom.len().min(ROM_SIZE)];
        self.bus.load(0, rom);
        self.bus.load(ROM_MIRROR, rom);
        log::info!("loaded {} byte ROM", rom.len());
        self.reset();
        Ok(())
    }

    /// Queue a program image (the bytes a tape would carry, starting with
    /// the system variables) for the next ROM LOAD.
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        if program.is_empty() {
            bail!("program image is empty");
        }
        log::info!(
            "queued {} byte program for {:?} load",
            program.len(),
            self.config.loader
        );
        self.loader.queue(program.to_vec());
        Ok(())
    }

    pub fn has_pending_program(&self) -> bool {
        self.loader.has_pending()
    }

    pub fn tape_playing(&self) -> bool {
        self.bus.tape.is_playing()
    }

    pub fn key_down(&mut self, key: Zx81Key, shift: bool) {
        self.bus.keyboard.set_key(key, true);
        if shift {
            self.bus.keyboard.set_key(Zx81Key::Shift, true);
        }
    }

    pub fn key_up(&mut self, key: Zx81Key, shift: bool) {
        self.bus.keyboard.set_key(key, false);
        if shift {
            self.bus.keyboard.set_key(Zx81Key::Shift, false);
        }
    }

    pub fn release_all_keys(&mut self) {
        self.bus.keyboard.release_all();
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn config(&self) -> &Zx81Config {
        &self.config
    }

    /// Memory as the CPU sees it, mirrors included.
    pub fn read_byte(&self, addr: u16) -> u8 {
        self.bus.peek(addr)
    }

    /// CPU-visible write: stores into ROM are dropped.
    pub fn write_byte(&mut self, addr: u16, value: u8) {
        self.bus.write_byte(addr, value);
    }

    pub fn video_state(&self) -> VideoState {
        VideoState {
            nmi_generator: self.nmi_generator,
            hsync_generator: self.hsync_generator,
            row_counter: self.bus.row_counter,
            hsync_counter: self.hsync_counter,
            borrow: self.borrow,
        }
    }

    pub fn set_video_state(&mut self, state: VideoState) {
        self.nmi_generator = state.nmi_generator;
        self.hsync_generator = state.hsync_generator;
        self.bus.row_counter = state.row_counter & 0x07;
        self.hsync_counter = state.hsync_counter;
        self.borrow = state.borrow;
    }

    /// Run the CPU until one raster line has been produced into `line`.
    ///
    /// A line ends when a sync pulse is flagged or when it reaches
    /// [`MAX_SCANLINE_LEN`] samples without one. Returns the T-states
    /// executed.
    pub fn do_scanline(&mut self, line: &mut Scanline) -> u32 {
        let mut total = 0;
        line.reset();

        if line.sync_valid() != SyncKind::None {
            let level = if self.hsync_generator {
                Sample::Paper
            } else {
                Sample::Sync
            };
            line.add_blank(self.borrow.max(0) as u32, level);
            self.borrow = 0;
        }

        loop {
            self.bus.last_instruction = LastInstruction::None;
            self.loader.check(&mut self.cpu, &mut self.bus);

            let mut ts = self.cpu.step(&mut self.bus);
            if self.int_pending {
                ts += self.cpu.interrupt(&mut self.bus);
                self.int_pending = false;
            }
            self.bus.tape.advance(ts);

            for _ in 0..ts * 2 {
                let sample = self.bus.next_sample(self.hsync_generator);
                line.add_pixel(sample);
            }

            match self.bus.last_instruction {
                LastInstruction::OutFd => {
                    self.nmi_generator = false;
                    self.start_hsync(line);
                }
                LastInstruction::OutFe => {
                    self.nmi_generator = true;
                    self.start_hsync(line);
                }
                LastInstruction::OutFf => self.start_hsync(line),
                LastInstruction::InFe => {
                    if !self.nmi_generator {
                        self.hsync_generator = false;
                        if line.sync_len() == 0 {
                            line.reset_sync(0, SyncKind::None);
                        }
                    }
                }
                LastInstruction::None => {}
            }

            self.hsync_counter -= ts as i32;
            // A6 low during refresh pulls /INT.
            if self.cpu.regs.r & 0x40 == 0 {
                self.int_pending = true;
            }
            if !self.hsync_generator {
                line.add_sync_length(ts);
            }

            if self.hsync_counter <= 0 {
                if self.nmi_generator {
                    let nmi = self.cpu.nmi(&mut self.bus, line.len() as u32);
                    self.hsync_counter -= nmi as i32;
                    total += nmi;
                }
                self.borrow = -self.hsync_counter;
                if self.hsync_generator && line.sync_len() == 0 {
                    line.reset_sync(HSYNC_LEN, SyncKind::Horizontal);
                    line.truncate(2 * TSTATES_PER_LINE as usize);
                    self.bus.row_counter = (self.bus.row_counter + 1) & 0x07;
                }
                self.hsync_counter += TSTATES_PER_LINE as i32;
            }

            total += ts;
            if line.len() >= MAX_SCANLINE_LEN || line.sync_valid() != SyncKind::None {
                break;
            }
        }

        if line.sync_valid() == SyncKind::Vertical {
            log::debug!("vsync, sync length {}", line.sync_len());
            self.hsync_counter = TSTATES_PER_LINE as i32;
            self.borrow = 0;
        }
        total
    }

    /// Any port write switches the hsync generator on. Leaving a sync
    /// period that has been accumulating marks the line as a vertical sync.
    fn start_hsync(&mut self, line: &mut Scanline) {
        if !self.hsync_generator {
            self.bus.row_counter = 0;
        }
        if line.sync_len() > 0 {
            line.reset_sync(line.sync_len(), SyncKind::Vertical);
        }
        self.hsync_generator = true;
    }
}

impl Default for Zx81 {
    fn default() -> Self {
        Self::new()
    }
}
