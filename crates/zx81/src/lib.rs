pub mod cpu;
pub mod frame;
pub mod machine;
pub mod scanline;
pub mod snapshot;

pub use frame::{FrameDriver, FrameDriverConfig, FrameRecorder, FrameStats, ScanlineSink};
pub use machine::{LoaderStrategy, Zx81, Zx81Config, Zx81Key};
pub use scanline::{Sample, Scanline, SyncKind};

/// Samples per line in the frame dump: one T-state of a 64 µs line is two
/// samples.
pub const LINE_SAMPLES: usize = 2 * machine::TSTATES_PER_LINE as usize;
