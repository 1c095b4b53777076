//! Unified error types for the relayboard firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level task loops' error handling uniform. All variants are `Copy` so
//! they can be cheaply passed through the scan and control paths without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An I²C transaction against a port expander failed after retries.
    Bus(BusError),
    /// A relay id outside 1..=16 reached the control service.
    InvalidId(u8),
    /// Peripheral or listener initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus: {e}"),
            Self::InvalidId(id) => write!(f, "invalid relay id {id} (expected 1..=16)"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// I²C bus errors
// ---------------------------------------------------------------------------

/// A single failed I²C transaction, post-retry.
///
/// Transient by design: the owning component (scan task or control
/// service) proceeds on stale in-memory state and surfaces a degraded
/// indicator rather than halting the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Device did not acknowledge its address or a data byte.
    Nack,
    /// Lost bus arbitration to another master.
    ArbitrationLost,
    /// Transaction did not complete in time.
    Timeout,
    /// Anything the HAL reports that doesn't fit the above.
    Other,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nack => write!(f, "NACK"),
            Self::ArbitrationLost => write!(f, "arbitration lost"),
            Self::Timeout => write!(f, "timeout"),
            Self::Other => write!(f, "bus error"),
        }
    }
}

impl core::error::Error for BusError {}

impl BusError {
    /// Classify an `embedded-hal` I²C error.
    pub fn from_i2c<E: embedded_hal::i2c::Error>(e: &E) -> Self {
        use embedded_hal::i2c::ErrorKind;
        match e.kind() {
            ErrorKind::NoAcknowledge(_) => Self::Nack,
            ErrorKind::ArbitrationLoss => Self::ArbitrationLost,
            ErrorKind::Bus | ErrorKind::Overrun => Self::Other,
            _ => Self::Other,
        }
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
