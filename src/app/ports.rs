//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlService / ScanTask (domain)
//! ```
//!
//! Driven adapters (the I²C expander bank, event sinks, config storage)
//! implement these traits. The domain consumes them via generics, so the
//! core never touches hardware directly and every test runs against mocks.

use crate::config::BoardConfig;
use crate::error::BusError;

// ───────────────────────────────────────────────────────────────
// Expander bus port (driven adapter: domain ↔ I²C hardware)
// ───────────────────────────────────────────────────────────────

/// Access to the four PCF8574 expanders, in domain polarity.
///
/// Both operations speak the "1 = asserted / energized" byte domain; the
/// adapter (and only the adapter) translates to the chips' active-low
/// wire polarity.
///
/// Implementations must complete each call without yielding to the
/// cooperative scheduler — this is what makes a state mutation plus its
/// hardware write an atomic section (see [`tasks`](crate::tasks)).
pub trait ExpanderBus {
    /// Push the full 8-bit relay byte for one relay-bank device.
    fn write_relays(&mut self, device: usize, bits: u8) -> Result<(), BusError>;

    /// Read the 8 raw input lines of one input-bank device.
    fn read_inputs(&mut self, device: usize) -> Result<u8, BusError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, a future
/// MQTT topic, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the board configuration.
///
/// Implementations MUST validate before persisting
/// ([`BoardConfig::validate`]); invalid values are rejected with
/// [`ConfigError::ValidationFailed`], never silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`ConfigError::NotFound`] on first boot.
    fn load(&self) -> Result<BoardConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &BoardConfig) -> Result<(), ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
