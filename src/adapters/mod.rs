//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to                    |
//! |------------|--------------|--------------------------------|
//! | `bank`     | ExpanderBus  | PCF8574 expanders over I²C     |
//! | `log_sink` | EventSink    | Serial log output              |
//! | `nvs`      | ConfigPort   | NVS / in-memory store          |
//! | `wifi`     | —            | ESP-IDF WiFi STA               |

pub mod bank;
pub mod log_sink;
pub mod nvs;
pub mod wifi;
