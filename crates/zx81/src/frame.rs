//! Frame pacing on top of [`Zx81::do_scanline`].
//!
//! [`FrameDriver::run_one_frame`] is synchronous and deterministic, so tests
//! and host loops can call it directly. [`FrameDriver::run`] adds real-time
//! pacing with a sleep primitive supplied by the host.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use typed_builder::TypedBuilder;

use crate::machine::{Zx81, TSTATES_PER_FRAME};
use crate::scanline::{Sample, Scanline, SyncKind};

/// Receives video as the machine produces it.
pub trait ScanlineSink {
    fn scanline(&mut self, line: &Scanline);

    fn end_frame(&mut self) {}
}

#[derive(Clone, Debug, TypedBuilder)]
pub struct FrameDriverConfig {
    #[builder(default = 50)]
    pub frame_rate_hz: u32,
}

impl Default for FrameDriverConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub lines: u32,
    pub tstates: u32,
    /// The frame ended on a vertical sync rather than the time limit.
    pub vsync: bool,
}

pub struct FrameDriver {
    config: FrameDriverConfig,
    line: Scanline,
    frames: u64,
}

impl FrameDriver {
    pub fn new(config: FrameDriverConfig) -> Self {
        Self {
            config,
            line: Scanline::new(),
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Produce lines until a vertical sync, or until one and a half frames
    /// of T-states pass without one (FAST mode, or a crashed program).
    pub fn run_one_frame<S: ScanlineSink>(&mut self, zx81: &mut Zx81, sink: &mut S) -> FrameStats {
        let budget = TSTATES_PER_FRAME + TSTATES_PER_FRAME / 2;
        let mut stats = FrameStats::default();

        while stats.tstates < budget {
            stats.tstates += zx81.do_scanline(&mut self.line);
            stats.lines += 1;
            sink.scanline(&self.line);
            if self.line.sync_valid() == SyncKind::Vertical {
                stats.vsync = true;
                break;
            }
        }

        sink.end_frame();
        self.frames += 1;
        log::debug!(
            "frame {}: {} lines, {} T-states, vsync {}",
            self.frames,
            stats.lines,
            stats.tstates,
            stats.vsync
        );
        stats
    }

    /// Run frames until `keep_going` is cleared, sleeping off whatever is
    /// left of each frame period. Returns the number of frames run.
    ///
    /// The flag is only checked between frames.
    pub fn run<S, F>(
        &mut self,
        zx81: &mut Zx81,
        sink: &mut S,
        keep_going: &AtomicBool,
        mut sleep: F,
    ) -> u64
    where
        S: ScanlineSink,
        F: FnMut(Duration),
    {
        let period = Duration::from_secs(1) / self.config.frame_rate_hz.max(1);
        log::info!("running at {} Hz", self.config.frame_rate_hz);

        let mut frames = 0;
        while keep_going.load(Ordering::Relaxed) {
            let started = Instant::now();
            self.run_one_frame(zx81, sink);
            frames += 1;
            if let Some(remaining) = period.checked_sub(started.elapsed()) {
                sleep(remaining);
            }
        }
        frames
    }
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new(FrameDriverConfig::default())
    }
}

/// Sink that keeps the samples of the most recently completed frame.
#[derive(Clone, Debug, Default)]
pub struct FrameRecorder {
    current: Vec<Vec<Sample>>,
    last_frame: Vec<Vec<Sample>>,
    frames: u64,
}

impl FrameRecorder {
    pub fn last_frame(&self) -> &[Vec<Sample>] {
        &self.last_frame
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl ScanlineSink for FrameRecorder {
    fn scanline(&mut self, line: &Scanline) {
        self.current.push(line.samples().to_vec());
    }

    fn end_frame(&mut self) {
        self.last_frame = std::mem::take(&mut self.current);
        self.frames += 1;
    }
}
