//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the serial log. A future MQTT or webhook adapter would implement the
//! same trait.

use log::{info, warn};

use crate::app::events::{AppEvent, Bank};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::RelayChanged { id, on } => {
                info!("RELAY | {} -> {}", id, if *on { "ON" } else { "OFF" });
            }
            AppEvent::AllRelaysSet { on } => {
                info!("RELAY | all -> {}", if *on { "ON" } else { "OFF" });
            }
            AppEvent::InputEdge { id, pressed } => {
                info!(
                    "INPUT | {} {}",
                    id,
                    if *pressed { "pressed" } else { "released" }
                );
            }
            AppEvent::BusDegraded { bank, device } => {
                let bank = match bank {
                    Bank::Relay => "relay",
                    Bank::Input => "input",
                };
                warn!("BUS   | {} bank device {} degraded", bank, device);
            }
            AppEvent::Started => {
                info!("START | relays off, inputs seeded");
            }
        }
    }
}
