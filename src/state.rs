//! Shared relay/input state model.
//!
//! [`IoState`] is the single source of truth for the sixteen relay outputs:
//! every physical relay write is derived from `relays[]`, and every reader
//! (the HTTP API included) reads these bits, never the hardware. A state
//! read is therefore O(1) and never blocks on the I²C bus.
//!
//! Mutation discipline: only the control service and the scan task mutate
//! this struct, and only inside an atomic section of the cooperative
//! scheduler (see [`tasks`](crate::tasks)).

use serde::Serialize;

use crate::config::{CHANNELS_PER_DEVICE, CHANNEL_COUNT, DEVICES_PER_BANK};
use crate::error::Error;

// ───────────────────────────────────────────────────────────────
// Channel identity
// ───────────────────────────────────────────────────────────────

/// External 1-based relay/input id → internal 0-based index.
///
/// Ids outside 1..=16 are rejected before any state is touched.
pub fn id_to_index(id: u8) -> Result<usize, Error> {
    if (1..=CHANNEL_COUNT as u8).contains(&id) {
        Ok(usize::from(id) - 1)
    } else {
        Err(Error::InvalidId(id))
    }
}

/// Internal index → (expander device within the bank, bit position).
///
/// Total for indices 0..=15: channels 0-7 live on device 0, 8-15 on
/// device 1.
pub fn index_to_slot(index: usize) -> (usize, u8) {
    debug_assert!(index < CHANNEL_COUNT);
    (index / CHANNELS_PER_DEVICE, (index % CHANNELS_PER_DEVICE) as u8)
}

// ───────────────────────────────────────────────────────────────
// Snapshot
// ───────────────────────────────────────────────────────────────

/// A point-in-time copy of the board state, ordered by 1-based channel id.
///
/// `inputs` carries the debounced values — raw samples are never surfaced
/// to the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IoSnapshot {
    pub relays: [bool; CHANNEL_COUNT],
    pub inputs: [bool; CHANNEL_COUNT],
}

// ───────────────────────────────────────────────────────────────
// IoState
// ───────────────────────────────────────────────────────────────

/// Process-wide relay/input model. Constructed once at startup after the
/// initial hardware read and owned for the process lifetime.
#[derive(Debug, Clone)]
pub struct IoState {
    relays: [bool; CHANNEL_COUNT],
    inputs_raw: [bool; CHANNEL_COUNT],
    inputs_stable: [bool; CHANNEL_COUNT],
}

impl IoState {
    /// All relays off; inputs seeded from the initial hardware read.
    pub fn new(initial_inputs: [bool; CHANNEL_COUNT]) -> Self {
        Self {
            relays: [false; CHANNEL_COUNT],
            inputs_raw: initial_inputs,
            inputs_stable: initial_inputs,
        }
    }

    /// Copy of the current state. Never fails, never touches hardware.
    pub fn snapshot(&self) -> IoSnapshot {
        IoSnapshot {
            relays: self.relays,
            inputs: self.inputs_stable,
        }
    }

    pub fn relay(&self, index: usize) -> bool {
        self.relays[index]
    }

    /// Set one relay bit. Returns whether the value actually changed,
    /// so callers can skip the hardware write when it didn't.
    pub fn set_relay(&mut self, index: usize, value: bool) -> bool {
        let changed = self.relays[index] != value;
        self.relays[index] = value;
        changed
    }

    /// Set every relay bit to `value`. Returns a mask of the bits that
    /// changed (bit *n* = channel index *n*).
    pub fn set_all_relays(&mut self, value: bool) -> u16 {
        let mut changed: u16 = 0;
        for (i, bit) in self.relays.iter_mut().enumerate() {
            if *bit != value {
                changed |= 1 << i;
                *bit = value;
            }
        }
        changed
    }

    /// True when all sixteen relays are energized.
    pub fn all_relays_on(&self) -> bool {
        self.relays.iter().all(|&b| b)
    }

    /// Last un-debounced sample for a channel. Scan bookkeeping only.
    pub fn record_raw_input(&mut self, index: usize, value: bool) {
        self.inputs_raw[index] = value;
    }

    /// Called only by the scan task after debounce confirmation.
    pub fn apply_confirmed_input(&mut self, index: usize, value: bool) {
        self.inputs_stable[index] = value;
    }

    /// Recompute the full domain byte (1 = energized) for one relay-bank
    /// device from the relay bits it owns.
    pub fn relay_bank_byte(&self, device: usize) -> u8 {
        debug_assert!(device < DEVICES_PER_BANK);
        let base = device * CHANNELS_PER_DEVICE;
        let mut byte = 0u8;
        for bit in 0..CHANNELS_PER_DEVICE {
            if self.relays[base + bit] {
                byte |= 1 << bit;
            }
        }
        byte
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_mapping_accepts_full_range() {
        for id in 1..=16u8 {
            assert_eq!(id_to_index(id).unwrap(), usize::from(id) - 1);
        }
    }

    #[test]
    fn id_mapping_rejects_out_of_range() {
        assert_eq!(id_to_index(0), Err(Error::InvalidId(0)));
        assert_eq!(id_to_index(17), Err(Error::InvalidId(17)));
        assert_eq!(id_to_index(255), Err(Error::InvalidId(255)));
    }

    #[test]
    fn slot_mapping_splits_banks() {
        assert_eq!(index_to_slot(0), (0, 0));
        assert_eq!(index_to_slot(7), (0, 7));
        assert_eq!(index_to_slot(8), (1, 0));
        assert_eq!(index_to_slot(15), (1, 7));
    }

    #[test]
    fn set_relay_reports_change() {
        let mut s = IoState::new([false; 16]);
        assert!(s.set_relay(4, true));
        assert!(!s.set_relay(4, true), "idempotent write reports no change");
        assert!(s.set_relay(4, false));
    }

    #[test]
    fn set_all_returns_changed_mask() {
        let mut s = IoState::new([false; 16]);
        s.set_relay(0, true);
        s.set_relay(9, true);
        let mask = s.set_all_relays(true);
        assert_eq!(mask, !0b0000_0010_0000_0001u16);
        assert_eq!(s.set_all_relays(true), 0, "repeat is a no-op");
        assert_eq!(s.set_all_relays(false), u16::MAX);
    }

    #[test]
    fn bank_byte_tracks_relay_bits() {
        let mut s = IoState::new([false; 16]);
        s.set_relay(0, true);
        s.set_relay(3, true);
        s.set_relay(8, true);
        s.set_relay(15, true);
        assert_eq!(s.relay_bank_byte(0), 0b0000_1001);
        assert_eq!(s.relay_bank_byte(1), 0b1000_0001);
    }

    #[test]
    fn snapshot_surfaces_stable_not_raw() {
        let mut s = IoState::new([false; 16]);
        s.record_raw_input(2, true);
        assert!(!s.snapshot().inputs[2], "raw sample must not leak to API");
        s.apply_confirmed_input(2, true);
        assert!(s.snapshot().inputs[2]);
    }
}
