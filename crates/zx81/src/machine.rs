mod bus;
mod keyboard;
mod loader;
mod tape;
mod zx81;

use typed_builder::TypedBuilder;

pub use keyboard::Zx81Key;
pub use loader::LoaderStrategy;
pub use zx81::{VideoState, Zx81};

/// Full 64 KiB address space. Only the low 32K is decoded; the top half
/// mirrors it.
const MEMORY_SIZE: usize = 0x10000;
const RAM_TOP: u16 = 0x7FFF;
/// Writes below this address hit ROM and are dropped.
const RAM_START: u16 = 0x4000;

pub const ROM_SIZE: usize = 0x2000;
/// The 8K ROM appears again at 0x2000.
const ROM_MIRROR: u16 = 0x2000;

/// T-states per 64 µs raster line.
pub const TSTATES_PER_LINE: u32 = 207;
/// T-states per PAL frame (312 lines).
pub const TSTATES_PER_FRAME: u32 = 64_584;
/// Length recorded for a generated horizontal sync pulse.
const HSYNC_LEN: u32 = 10;

/// Entry point of the ROM LOAD routine.
pub const LOAD_TRAP_ADDR: u16 = 0x0340;
/// Opcode found at the LOAD entry point in the standard ROM.
pub const LOAD_TRAP_OPCODE: u8 = 0xCD;
/// A ZX81 tape image starts with the system variables from VERSN onward.
pub const PROGRAM_BASE: u16 = 0x4009;

/// Machine configuration.
///
/// ```
/// use zx81::machine::{LoaderStrategy, Zx81Config};
///
/// let config = Zx81Config::builder().loader(LoaderStrategy::Signal).build();
/// assert_eq!(config.load_trap_addr, 0x0340);
/// ```
#[derive(Clone, Debug, TypedBuilder)]
pub struct Zx81Config {
    #[builder(default)]
    pub loader: LoaderStrategy,
    #[builder(default = LOAD_TRAP_ADDR)]
    pub load_trap_addr: u16,
    #[builder(default = LOAD_TRAP_OPCODE)]
    pub load_trap_opcode: u8,
    #[builder(default = PROGRAM_BASE)]
    pub program_base: u16,
}

impl Default for Zx81Config {
    fn default() -> Self {
        Self::builder().build()
    }
}
