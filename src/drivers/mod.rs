//! Hardware drivers: the PCF8574 port expander and the task watchdog.

pub mod expander;
pub mod watchdog;
