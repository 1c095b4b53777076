//! Board configuration parameters
//!
//! All tunable parameters for the relay board: expander bus addresses,
//! scan/debounce timing, I²C retry policy, HTTP listener settings and
//! Wi-Fi credentials. Values can be overridden via NVS.

use serde::{Deserialize, Serialize};

/// Number of relay outputs (and digital inputs) on the board.
pub const CHANNEL_COUNT: usize = 16;

/// Channels per PCF8574 expander.
pub const CHANNELS_PER_DEVICE: usize = 8;

/// Expander devices per bank (relay bank, input bank).
pub const DEVICES_PER_BANK: usize = CHANNEL_COUNT / CHANNELS_PER_DEVICE;

/// What a confirmed press on input *n* does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputPolicy {
    /// Press toggles relay *n* (1:1 mapping). Releases never act.
    ToggleRelay,
    /// Inputs are surfaced in the state document but drive nothing.
    MonitorOnly,
}

/// Core board configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    // --- I²C expanders ---
    /// Relay bank addresses: device 0 drives relays 1-8, device 1 drives 9-16.
    pub relay_addr: [u8; DEVICES_PER_BANK],
    /// Input bank addresses: device 0 reads inputs 1-8, device 1 reads 9-16.
    pub input_addr: [u8; DEVICES_PER_BANK],
    /// Bounded retry count for a single I²C transaction.
    pub i2c_retry_count: u8,
    /// Backoff between retry attempts (microseconds, blocking).
    pub i2c_retry_backoff_us: u32,

    // --- Input scanning ---
    /// Scan loop tick interval (milliseconds).
    pub scan_interval_ms: u32,
    /// Consecutive identical scan ticks before an input edge is confirmed.
    pub debounce_ticks: u8,
    /// Confirmed-press dispatch policy.
    pub input_policy: InputPolicy,

    // --- HTTP ---
    /// TCP port the control server listens on.
    pub http_port: u16,
    /// Per-connection request read deadline (milliseconds).
    pub http_read_timeout_ms: u32,

    // --- Wi-Fi ---
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            // KC868-A16 factory addressing
            relay_addr: [0x24, 0x25],
            input_addr: [0x22, 0x21],
            i2c_retry_count: 3,
            i2c_retry_backoff_us: 500,

            scan_interval_ms: 50,
            debounce_ticks: 2,
            input_policy: InputPolicy::ToggleRelay,

            http_port: 80,
            http_read_timeout_ms: 3000,

            wifi_ssid: heapless::String::new(),
            wifi_password: heapless::String::new(),
        }
    }
}

impl BoardConfig {
    /// Range-check a configuration before it is persisted or applied.
    ///
    /// Rejects values that would stall the scan loop or make debounce
    /// confirmation unreachable; does not silently clamp.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.scan_interval_ms == 0 {
            return Err("scan_interval_ms must be > 0");
        }
        if self.debounce_ticks == 0 {
            return Err("debounce_ticks must be > 0");
        }
        if self.i2c_retry_count == 0 {
            return Err("i2c_retry_count must be > 0");
        }
        for addr in self.relay_addr.iter().chain(self.input_addr.iter()) {
            if *addr > 0x77 {
                return Err("expander address outside 7-bit range");
            }
        }
        if self.http_read_timeout_ms == 0 {
            return Err("http_read_timeout_ms must be > 0");
        }
        Ok(())
    }
}
