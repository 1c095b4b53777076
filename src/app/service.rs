//! Control service — the hexagonal core.
//!
//! [`ControlService`] owns the [`IoState`] and is, together with the scan
//! task, its only mutator. Every mutating operation follows the same
//! discipline: update `relays[]` first, then push the owning device's
//! byte through the [`ExpanderBus`] port in the same atomic section, so
//! no concurrently scheduled task can observe a half-applied state.
//!
//! ```text
//!  HTTP layer ──RelayCommand──▶ ┌──────────────────┐ ──▶ EventSink
//!                               │  ControlService   │
//!  ScanTask ───toggle_index───▶ │     IoState       │ ──▶ ExpanderBus
//!                               └──────────────────┘
//! ```
//!
//! A failed hardware write is recoverable: state keeps the desired value,
//! the degraded flag goes up, and the next successful write to that device
//! reconciles the hardware (the byte is always recomputed from all eight
//! relay bits).

use log::{info, warn};

use crate::config::DEVICES_PER_BANK;
use crate::error::Error;
use crate::state::{IoSnapshot, IoState, id_to_index, index_to_slot};

use super::commands::RelayCommand;
use super::events::{AppEvent, Bank};
use super::ports::{EventSink, ExpanderBus};

/// The control service orchestrates relay mutations.
pub struct ControlService {
    state: IoState,
    /// Set when a relay write failed on the bus and hardware may lag
    /// `relays[]`; cleared by the next fully successful write pass.
    degraded: bool,
}

impl ControlService {
    pub fn new(state: IoState) -> Self {
        Self {
            state,
            degraded: false,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current state, O(1), no bus traffic.
    pub fn snapshot(&self) -> IoSnapshot {
        self.state.snapshot()
    }

    /// Whether the last relay write pass left hardware out of sync.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    // ── Mutations (atomic sections) ───────────────────────────

    /// Set relay `id` (1..=16). Skips the hardware write when the bit
    /// didn't change.
    pub fn set_relay(
        &mut self,
        id: u8,
        on: bool,
        bus: &mut impl ExpanderBus,
        sink: &mut impl EventSink,
    ) -> Result<IoSnapshot, Error> {
        let index = id_to_index(id)?;
        if self.state.set_relay(index, on) {
            let (device, _) = index_to_slot(index);
            self.push_device(device, bus, sink);
            sink.emit(&AppEvent::RelayChanged { id, on });
        }
        Ok(self.snapshot())
    }

    /// Set all sixteen relays and push both device bytes.
    pub fn set_all(
        &mut self,
        on: bool,
        bus: &mut impl ExpanderBus,
        sink: &mut impl EventSink,
    ) -> IoSnapshot {
        let changed = self.state.set_all_relays(on);
        if changed != 0 {
            for device in 0..DEVICES_PER_BANK {
                self.push_device(device, bus, sink);
            }
            sink.emit(&AppEvent::AllRelaysSet { on });
        }
        self.snapshot()
    }

    /// All-off when every relay is on, otherwise all-on. Mixed states go
    /// on — this is deliberately not a per-relay XOR.
    pub fn toggle_all(
        &mut self,
        bus: &mut impl ExpanderBus,
        sink: &mut impl EventSink,
    ) -> IoSnapshot {
        let target = !self.state.all_relays_on();
        self.set_all(target, bus, sink)
    }

    /// Flip one relay by internal index. Scan dispatch path (input *n*
    /// toggles relay *n*); indices come from the scan loop and are always
    /// in range.
    pub fn toggle_index(
        &mut self,
        index: usize,
        bus: &mut impl ExpanderBus,
        sink: &mut impl EventSink,
    ) {
        let on = !self.state.relay(index);
        self.state.set_relay(index, on);
        let (device, _) = index_to_slot(index);
        self.push_device(device, bus, sink);
        sink.emit(&AppEvent::RelayChanged {
            id: index as u8 + 1,
            on,
        });
    }

    /// Record a debounce-confirmed input value.
    pub fn apply_confirmed_input(
        &mut self,
        index: usize,
        value: bool,
        sink: &mut impl EventSink,
    ) {
        self.state.apply_confirmed_input(index, value);
        sink.emit(&AppEvent::InputEdge {
            id: index as u8 + 1,
            pressed: value,
        });
    }

    /// Record a raw (un-debounced) sample. Scan bookkeeping only.
    pub fn record_raw_input(&mut self, index: usize, value: bool) {
        self.state.record_raw_input(index, value);
    }

    /// Single entry point for the HTTP layer.
    pub fn handle_command(
        &mut self,
        cmd: RelayCommand,
        bus: &mut impl ExpanderBus,
        sink: &mut impl EventSink,
    ) -> Result<IoSnapshot, Error> {
        match cmd {
            RelayCommand::Set { id, on } => self.set_relay(id, on, bus, sink),
            RelayCommand::SetAll { on } => Ok(self.set_all(on, bus, sink)),
            RelayCommand::ToggleAll => Ok(self.toggle_all(bus, sink)),
        }
    }

    /// Re-push both relay device bytes. Used at startup (all-off) and as
    /// the reconciliation path after a degraded write.
    pub fn resync_relays(&mut self, bus: &mut impl ExpanderBus, sink: &mut impl EventSink) {
        self.degraded = false;
        for device in 0..DEVICES_PER_BANK {
            self.push_device(device, bus, sink);
        }
        if !self.degraded {
            info!("relay banks synchronised to state");
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// Push one relay-bank device byte, recomputed from all eight of its
    /// relay bits. A bus failure leaves `relays[]` at the desired value
    /// and flags degradation instead of propagating.
    fn push_device(&mut self, device: usize, bus: &mut impl ExpanderBus, sink: &mut impl EventSink) {
        let byte = self.state.relay_bank_byte(device);
        match bus.write_relays(device, byte) {
            Ok(()) => {
                if self.degraded {
                    // One device back in sync; a full resync clears the flag.
                    info!("relay device {} write recovered", device);
                }
            }
            Err(e) => {
                warn!("relay device {} write failed: {}", device, e);
                self.degraded = true;
                sink.emit(&AppEvent::BusDegraded {
                    bank: Bank::Relay,
                    device,
                });
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
