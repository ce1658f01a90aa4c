//! Cassette input signal.
//!
//! Plays raw bytes the way the ZX81 records them: bits MSB first, each bit
//! a burst of square pulses (4 for a 0, 9 for a 1) followed by a silent
//! gap. The machine advances the tape by every instruction's T-states and
//! samples `level()` on port reads.

/// Half a pulse: 150 µs at 3.25 MHz.
const PULSE_TICKS: u32 = 487;
/// Silence after each bit: 1300 µs.
const GAP_TICKS: u32 = 4225;
const ZERO_PULSES: u32 = 4;
const ONE_PULSES: u32 = 9;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Phase {
    /// Nothing loaded or the tape ran out. Input stays low.
    Idle,
    LeadIn { remaining: u32 },
    High { remaining: u32 },
    Low { remaining: u32 },
    Gap { remaining: u32 },
}

#[derive(Clone, Debug)]
pub struct Tape {
    data: Vec<u8>,
    /// Bit currently being played, counted from the start of `data`.
    bit: usize,
    /// Pulses still to play for the current bit, including the one in
    /// progress.
    pulses_left: u32,
    phase: Phase,
}

impl Default for Tape {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            bit: 0,
            pulses_left: 0,
            phase: Phase::Idle,
        }
    }
}

impl Tape {
    /// Start playing `data` from the beginning, after one gap of silence.
    pub fn play(&mut self, data: Vec<u8>) {
        self.bit = 0;
        self.pulses_left = 0;
        self.phase = if data.is_empty() {
            Phase::Idle
        } else {
            Phase::LeadIn {
                remaining: GAP_TICKS,
            }
        };
        self.data = data;
    }

    pub fn stop(&mut self) {
        self.data.clear();
        self.phase = Phase::Idle;
    }

    pub fn is_playing(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Cassette input level: high during the first half of each pulse.
    pub fn level(&self) -> bool {
        matches!(self.phase, Phase::High { .. })
    }

    pub fn advance(&mut self, mut ticks: u32) {
        while ticks > 0 {
            let remaining = match &mut self.phase {
                Phase::Idle => return,
                Phase::LeadIn { remaining }
                | Phase::High { remaining }
                | Phase::Low { remaining }
                | Phase::Gap { remaining } => remaining,
            };
            let step = (*remaining).min(ticks);
            *remaining -= step;
            ticks -= step;
            if *remaining == 0 {
                self.next_phase();
            }
        }
    }

    fn next_phase(&mut self) {
        self.phase = match self.phase {
            Phase::Idle => Phase::Idle,
            Phase::LeadIn { .. } => return self.start_bit(),
            Phase::High { .. } => Phase::Low {
                remaining: PULSE_TICKS,
            },
            Phase::Low { .. } => {
                self.pulses_left -= 1;
                if self.pulses_left > 0 {
                    Phase::High {
                        remaining: PULSE_TICKS,
                    }
                } else {
                    Phase::Gap {
                        remaining: GAP_TICKS,
                    }
                }
            }
            Phase::Gap { .. } => {
                self.bit += 1;
                return self.start_bit();
            }
        };
    }

    fn start_bit(&mut self) {
        let Some(&byte) = self.data.get(self.bit / 8) else {
            log::debug!("tape finished after {} bytes", self.data.len());
            self.stop();
            return;
        };
        let set = byte & (0x80 >> (self.bit % 8)) != 0;
        self.pulses_left = if set { ONE_PULSES } else { ZERO_PULSES };
        self.phase = Phase::High {
            remaining: PULSE_TICKS,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Count rising edges by stepping one T-state at a time until the tape
    /// stops.
    fn rising_edges(tape: &mut Tape) -> (u32, u32) {
        let mut edges = 0;
        let mut ticks = 0;
        let mut previous = tape.level();
        while tape.is_playing() {
            tape.advance(1);
            ticks += 1;
            let level = tape.level();
            if level && !previous {
                edges += 1;
            }
            previous = level;
        }
        (edges, ticks)
    }

    #[test]
    fn idle_tape_is_low() {
        let mut tape = Tape::default();
        tape.advance(10_000);
        assert!(!tape.is_playing());
        assert!(!tape.level());
    }

    #[test]
    fn lead_in_is_one_gap_of_silence() {
        let mut tape = Tape::default();
        tape.play(vec![0x00]);
        tape.advance(GAP_TICKS - 1);
        assert!(!tape.level());
        tape.advance(1);
        assert!(tape.level());
        tape.advance(PULSE_TICKS);
        assert!(!tape.level());
    }

    #[test]
    fn pulse_counts_encode_bits_msb_first() {
        let mut tape = Tape::default();
        tape.play(vec![0x80]);
        let (edges, ticks) = rising_edges(&mut tape);
        assert_eq!(edges, ONE_PULSES + 7 * ZERO_PULSES);

        let pulse = 2 * PULSE_TICKS;
        let expected = GAP_TICKS + ONE_PULSES * pulse + 8 * GAP_TICKS + 7 * ZERO_PULSES * pulse;
        assert_eq!(ticks, expected);
    }

    #[test]
    fn large_advance_crosses_phases() {
        let mut stepped = Tape::default();
        stepped.play(vec![0xA5, 0x3C]);
        let mut jumped = stepped.clone();

        for _ in 0..50_000 {
            stepped.advance(1);
        }
        jumped.advance(50_000);
        assert_eq!(stepped.phase, jumped.phase);
        assert_eq!(stepped.bit, jumped.bit);
    }

    #[test]
    fn empty_image_does_not_play() {
        let mut tape = Tape::default();
        tape.play(Vec::new());
        assert!(!tape.is_playing());
    }
}
