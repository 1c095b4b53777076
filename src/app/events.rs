//! Outbound application events.
//!
//! The control service and scan task emit these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them — log to serial, count, etc.

/// Bank discriminant used in degraded-bus reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bank {
    Relay,
    Input,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// One relay changed state. `id` is the external 1-based id.
    RelayChanged { id: u8, on: bool },

    /// All sixteen relays were commanded to one value.
    AllRelaysSet { on: bool },

    /// A debounced input transition was confirmed. `pressed` = contact
    /// closed.
    InputEdge { id: u8, pressed: bool },

    /// An I²C transaction failed after retries; in-memory state may be
    /// ahead of (relays) or staler than (inputs) the hardware.
    BusDegraded { bank: Bank, device: usize },

    /// The board finished startup (relays forced off, inputs seeded).
    Started,
}
