//! Input scan pass: poll the input-bank expanders, debounce, dispatch.
//!
//! Executed once per scan tick by the cooperative scan loop in
//! [`tasks`](crate::tasks). Each pass is one atomic section:
//!
//! 1. **Read** — both InputBank devices. A bus error skips that device's
//!    eight channels for this tick: raw samples are retained and the
//!    debounce counters do not advance, so a transient fault can never
//!    fabricate an edge.
//! 2. **Debounce** — every raw bit goes through the stability filter.
//! 3. **Dispatch** — a confirmed press on input *n* toggles relay *n*
//!    (when the policy says so); releases only update the stable input
//!    bits. Acting on press rather than release is a recorded design
//!    choice — wall switches feel wrong the other way around.

use log::{debug, warn};

use crate::app::events::{AppEvent, Bank};
use crate::app::ports::{EventSink, ExpanderBus};
use crate::app::service::ControlService;
use crate::config::{CHANNELS_PER_DEVICE, DEVICES_PER_BANK, InputPolicy};
use crate::debounce::{DebounceFilter, Edge};

/// Per-tick input scanner. Owns the debounce filter; mutates [`IoState`]
/// only through the control service.
///
/// [`IoState`]: crate::state::IoState
pub struct ScanTask {
    filter: DebounceFilter,
    policy: InputPolicy,
    /// Consecutive failed reads per input device, for log throttling.
    read_failures: [u32; DEVICES_PER_BANK],
}

impl ScanTask {
    pub fn new(filter: DebounceFilter, policy: InputPolicy) -> Self {
        Self {
            filter,
            policy,
            read_failures: [0; DEVICES_PER_BANK],
        }
    }

    /// Total failed input reads since startup (both devices).
    pub fn degraded_reads(&self) -> u32 {
        self.read_failures.iter().sum()
    }

    /// One full scan pass. Must run to completion without yielding.
    pub fn tick(
        &mut self,
        service: &mut ControlService,
        bus: &mut impl ExpanderBus,
        sink: &mut impl EventSink,
    ) {
        for device in 0..DEVICES_PER_BANK {
            let byte = match bus.read_inputs(device) {
                Ok(b) => b,
                Err(e) => {
                    self.read_failures[device] = self.read_failures[device].saturating_add(1);
                    // First failure of a streak is worth a warning; after
                    // that it's log spam on a 50 ms loop.
                    if self.read_failures[device] == 1 {
                        warn!("input device {} read failed: {}", device, e);
                    }
                    sink.emit(&AppEvent::BusDegraded {
                        bank: Bank::Input,
                        device,
                    });
                    continue;
                }
            };
            if self.read_failures[device] > 1 {
                debug!(
                    "input device {} recovered after {} failed reads",
                    device, self.read_failures[device]
                );
            }
            self.read_failures[device] = 0;

            for bit in 0..CHANNELS_PER_DEVICE {
                let index = device * CHANNELS_PER_DEVICE + bit;
                let sample = byte & (1 << bit) != 0;
                service.record_raw_input(index, sample);

                match self.filter.update(index, sample) {
                    Some(Edge::Press) => {
                        service.apply_confirmed_input(index, true, sink);
                        if self.policy == InputPolicy::ToggleRelay {
                            service.toggle_index(index, bus, sink);
                        }
                    }
                    Some(Edge::Release) => {
                        service.apply_confirmed_input(index, false, sink);
                    }
                    None => {}
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
