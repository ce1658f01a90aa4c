//! One raster line of video samples.
//!
//! The machine appends two samples per CPU T-state while it runs, so a line
//! is a plain sequence of levels rather than a bitmap. Sync bookkeeping rides
//! along with the samples so the next line knows whether the previous one
//! ended on a horizontal or vertical pulse.

/// Longest line the machine will build before giving up on seeing a sync.
pub const MAX_SCANLINE_LEN: usize = 420;

/// Level of one video sample.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Sample {
    /// Blanking / sync level.
    #[default]
    Sync = 0,
    Ink = 1,
    Paper = 2,
}

/// What kind of sync pulse, if any, ended the line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum SyncKind {
    #[default]
    None,
    Horizontal,
    Vertical,
}

#[derive(Clone, Debug, Default)]
pub struct Scanline {
    samples: Vec<Sample>,
    sync_len: u32,
    sync_valid: SyncKind,
}

impl Scanline {
    pub fn new() -> Self {
        Self {
            // An instruction in flight can run a few dozen samples past the
            // limit before the loop notices.
            samples: Vec::with_capacity(MAX_SCANLINE_LEN * 2),
            sync_len: 0,
            sync_valid: SyncKind::None,
        }
    }

    #[inline]
    pub fn add_pixel(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// Append `ticks` T-states of a flat level (two samples each) and clear
    /// the sync state carried over from the previous line.
    pub fn add_blank(&mut self, ticks: u32, sample: Sample) {
        let count = ticks as usize * 2;
        self.samples.extend(std::iter::repeat(sample).take(count));
        self.sync_len = 0;
        self.sync_valid = SyncKind::None;
    }

    /// Drop all samples. Sync state survives so the next line can see how
    /// this one ended.
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    pub fn truncate(&mut self, len: usize) {
        self.samples.truncate(len);
    }

    pub fn add_sync_length(&mut self, ticks: u32) {
        self.sync_len = self.sync_len.saturating_add(ticks);
    }

    pub fn reset_sync(&mut self, len: u32, kind: SyncKind) {
        self.sync_len = len;
        self.sync_valid = kind;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sync_len(&self) -> u32 {
        self.sync_len
    }

    pub fn sync_valid(&self) -> SyncKind {
        self.sync_valid
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}
