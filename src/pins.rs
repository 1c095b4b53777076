//! GPIO / peripheral pin assignments for the KC868-A16 main board.
//!
//! Single source of truth — every adapter references this module rather
//! than hard-coding pin numbers.
//!
//! The sixteen relay outputs and sixteen digital inputs are NOT on GPIOs:
//! they sit behind four PCF8574 port expanders on the I²C bus. Their bus
//! addresses are deployment configuration and live in
//! [`BoardConfig`](crate::config::BoardConfig), not here.

// ---------------------------------------------------------------------------
// I²C bus (four PCF8574 expanders: 2× relay bank, 2× input bank)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 4;
pub const I2C_SCL_GPIO: i32 = 5;

/// Standard-mode bus clock. The PCF8574 tops out at 100 kHz.
pub const I2C_BAUDRATE_HZ: u32 = 100_000;
