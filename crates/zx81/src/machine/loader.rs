use crate::cpu::{Bus, Cpu};

use super::bus::Zx81Bus;
use super::{Zx81Config, RAM_TOP};

/// How a queued program reaches memory when the ROM asks for it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LoaderStrategy {
    /// Copy the image straight into RAM and return from the ROM loader
    /// without running it.
    #[default]
    Instant,
    /// Play the image through the cassette input and let the ROM loader
    /// decode it in real time.
    Signal,
}

/// Watches for the CPU entering the ROM LOAD routine while a program image
/// is queued.
#[derive(Clone, Debug)]
pub(super) struct ProgramLoader {
    strategy: LoaderStrategy,
    trap_addr: u16,
    trap_opcode: u8,
    base: u16,
    pending: Option<Vec<u8>>,
}

impl ProgramLoader {
    pub fn new(config: &Zx81Config) -> Self {
        Self {
            strategy: config.loader,
            trap_addr: config.load_trap_addr,
            trap_opcode: config.load_trap_opcode,
            base: config.program_base,
            pending: None,
        }
    }

    pub fn queue(&mut self, image: Vec<u8>) {
        self.pending = Some(image);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Check the trap before the next instruction executes.
    ///
    /// Returns true when the queued image was handed over, either copied
    /// into RAM or started on the tape.
    pub fn check(&mut self, cpu: &mut Cpu, bus: &mut Zx81Bus) -> bool {
        if self.pending.is_none()
            || cpu.regs.pc != self.trap_addr
            || bus.read_byte(self.trap_addr) != self.trap_opcode
        {
            return false;
        }
        let Some(image) = self.pending.take() else {
            return false;
        };

        match self.strategy {
            LoaderStrategy::Instant => {
                // Stop at the top of RAM; past it the mirror would wrap
                // back onto the system variables.
                let room = (RAM_TOP as usize + 1).saturating_sub(self.base as usize);
                if image.len() > room {
                    log::warn!(
                        "program image is {} bytes, only {} fit between 0x{:04X} and the top of RAM",
                        image.len(),
                        room,
                        self.base
                    );
                }
                let copied = image.len().min(room);
                for (offset, &byte) in image[..copied].iter().enumerate() {
                    bus.write_byte(self.base.wrapping_add(offset as u16), byte);
                }
                cpu.force_ret(bus);
                log::info!(
                    "instant load: {} bytes at 0x{:04X}, returning to 0x{:04X}",
                    copied,
                    self.base,
                    cpu.regs.pc
                );
            }
            LoaderStrategy::Signal => {
                log::info!("signal load: playing {} bytes on the tape input", image.len());
                bus.tape.play(image);
            }
        }
        true
    }
}
