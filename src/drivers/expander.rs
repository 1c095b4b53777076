//! PCF8574 8-bit I²C port expander driver.
//!
//! One instance per physical chip; the KC868-A16 carries four (two relay
//! banks, two input banks) on one bus, so the bus and delay are passed per
//! call rather than owned. Generic over `embedded-hal` traits, which keeps
//! the driver host-testable against a scripted bus.
//!
//! ## Polarity
//!
//! The PCF8574 is active-low in both directions on this board: an input
//! line reads 0 when the contact is closed, and a relay energises when its
//! output bit is driven 0. This driver is the only place that knows — it
//! inverts on both paths, so everything above it speaks the
//! "1 = asserted / energized" domain.
//!
//! ## Retry policy
//!
//! Every transaction is retried up to a bounded count with a short
//! blocking backoff (hundreds of microseconds — deliberately *not* an
//! async sleep, see the scheduling contract in [`tasks`](crate::tasks)).
//! After exhaustion the [`BusError`] goes to the caller, which decides
//! whether to skip a scan cycle or surface a degraded write.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::trace;

use crate::error::BusError;

/// What a device is wired to. A capability distinction, not a subtype:
/// relay banks are written, input banks are read, one driver type covers
/// both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankRole {
    RelayBank,
    InputBank,
}

/// Handle for one PCF8574. Immutable after construction.
#[derive(Debug, Clone, Copy)]
pub struct PortExpander {
    addr: u8,
    role: BankRole,
    retries: u8,
    backoff_us: u32,
}

impl PortExpander {
    /// `addr` is the 7-bit bus address; `retries` the bounded attempt
    /// count (≥ 1); `backoff_us` the blocking pause between attempts.
    pub fn new(addr: u8, role: BankRole, retries: u8, backoff_us: u32) -> Self {
        Self {
            addr,
            role,
            retries: retries.max(1),
            backoff_us,
        }
    }

    pub fn addr(&self) -> u8 {
        self.addr
    }

    pub fn role(&self) -> BankRole {
        self.role
    }

    pub fn can_write(&self) -> bool {
        self.role == BankRole::RelayBank
    }

    pub fn can_read(&self) -> bool {
        self.role == BankRole::InputBank
    }

    /// Read the eight lines, returned in domain polarity (1 = asserted).
    pub fn read_byte<I: I2c, D: DelayNs>(
        &self,
        bus: &mut I,
        delay: &mut D,
    ) -> Result<u8, BusError> {
        let mut attempt = 0u8;
        loop {
            let mut buf = [0u8; 1];
            match bus.read(self.addr, &mut buf) {
                Ok(()) => {
                    trace!("pcf8574 0x{:02x} read 0x{:02x}", self.addr, buf[0]);
                    return Ok(!buf[0]);
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.retries {
                        return Err(BusError::from_i2c(&e));
                    }
                    delay.delay_us(self.backoff_us);
                }
            }
        }
    }

    /// Write all eight lines from a domain-polarity byte (1 = energized).
    ///
    /// Only relay banks are ever written; input banks stay at the chip's
    /// power-on high state so their quasi-bidirectional lines keep working
    /// as inputs.
    pub fn write_byte<I: I2c, D: DelayNs>(
        &self,
        bus: &mut I,
        delay: &mut D,
        domain_bits: u8,
    ) -> Result<(), BusError> {
        debug_assert!(self.can_write(), "write to an input bank");
        let wire = !domain_bits;
        let mut attempt = 0u8;
        loop {
            match bus.write(self.addr, &[wire]) {
                Ok(()) => {
                    trace!("pcf8574 0x{:02x} wrote 0x{:02x}", self.addr, wire);
                    return Ok(());
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.retries {
                        return Err(BusError::from_i2c(&e));
                    }
                    delay.delay_us(self.backoff_us);
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
