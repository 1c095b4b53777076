//! Tick-based edge detection for the sixteen expander inputs.
//!
//! Electrical contact bounce shows up as runs of alternating samples much
//! shorter than the stability window. Each channel tracks a candidate
//! value and how many consecutive ticks it has held; only when the run
//! reaches the window AND the candidate differs from the last confirmed
//! value is an edge promoted — so a physical transition produces exactly
//! one confirmed edge, with detection latency bounded by
//! `window × scan interval`.

use crate::config::CHANNEL_COUNT;

/// A debounce-confirmed transition of one input channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Input became asserted (contact closed).
    Press,
    /// Input returned to released.
    Release,
}

#[derive(Debug, Clone, Copy)]
struct Channel {
    candidate: bool,
    /// Consecutive ticks `candidate` has been sampled (saturating).
    run: u8,
    confirmed: bool,
}

/// Per-channel stability filter. Mutated only by the scan task.
#[derive(Debug, Clone)]
pub struct DebounceFilter {
    channels: [Channel; CHANNEL_COUNT],
    window: u8,
}

impl DebounceFilter {
    /// `initial` comes from the first hardware read so the filter does not
    /// report a spurious edge for an input that is held at boot.
    pub fn new(window: u8, initial: [bool; CHANNEL_COUNT]) -> Self {
        debug_assert!(window > 0);
        let channels = core::array::from_fn(|i| Channel {
            candidate: initial[i],
            run: window,
            confirmed: initial[i],
        });
        Self { channels, window }
    }

    /// Feed one raw sample for one channel; returns the confirmed edge, if
    /// this tick promoted one.
    pub fn update(&mut self, index: usize, sample: bool) -> Option<Edge> {
        let ch = &mut self.channels[index];

        if sample != ch.candidate {
            ch.candidate = sample;
            ch.run = 1;
            return None;
        }

        ch.run = ch.run.saturating_add(1);
        if ch.run >= self.window && ch.candidate != ch.confirmed {
            ch.confirmed = ch.candidate;
            return Some(if ch.confirmed { Edge::Press } else { Edge::Release });
        }
        None
    }

    /// Last confirmed value for a channel.
    pub fn confirmed(&self, index: usize) -> bool {
        self.channels[index].confirmed
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(window: u8) -> DebounceFilter {
        DebounceFilter::new(window, [false; CHANNEL_COUNT])
    }

    #[test]
    fn steady_input_emits_nothing() {
        let mut f = filter(2);
        for _ in 0..10 {
            assert_eq!(f.update(0, false), None);
        }
    }

    #[test]
    fn bounce_shorter_than_window_is_rejected() {
        let mut f = filter(3);
        // Alternating samples: every run is length 1, never reaches 3.
        for tick in 0..20 {
            assert_eq!(f.update(5, tick % 2 == 0), None);
        }
        assert!(!f.confirmed(5));
    }

    #[test]
    fn held_value_produces_exactly_one_press() {
        let mut f = filter(2);
        assert_eq!(f.update(3, true), None); // run = 1
        assert_eq!(f.update(3, true), Some(Edge::Press)); // run = 2, promote
        for _ in 0..10 {
            assert_eq!(f.update(3, true), None, "edge fires once per transition");
        }
        assert!(f.confirmed(3));
    }

    #[test]
    fn release_is_confirmed_the_same_way() {
        let mut f = DebounceFilter::new(2, {
            let mut init = [false; CHANNEL_COUNT];
            init[7] = true;
            init
        });
        assert_eq!(f.update(7, false), None);
        assert_eq!(f.update(7, false), Some(Edge::Release));
        assert!(!f.confirmed(7));
    }

    #[test]
    fn bounce_then_settle_emits_single_edge() {
        let mut f = filter(2);
        // Noisy leading edge, then the contact settles closed.
        let samples = [true, false, true, false, true, true, true];
        let edges: Vec<Edge> = samples.iter().filter_map(|&s| f.update(9, s)).collect();
        assert_eq!(edges, vec![Edge::Press]);
    }

    #[test]
    fn channels_are_independent() {
        let mut f = filter(2);
        f.update(0, true);
        f.update(0, true);
        assert!(f.confirmed(0));
        assert!(!f.confirmed(1));
    }
}
