//! Relayboard firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod debounce;
pub mod http;
pub mod scan;
pub mod state;
pub mod tasks;

pub mod error;
pub mod pins;

pub use error::{BusError, Error};

pub mod adapters;
pub mod drivers;
