//! Mock expander bus and event sink for integration tests.
//!
//! The bus records every relay byte written per device and serves
//! scripted input bytes, so tests can assert on the full hardware
//! command history without an I²C bus.

use relayboard::BusError;
use relayboard::app::events::AppEvent;
use relayboard::app::ports::{EventSink, ExpanderBus};
use relayboard::config::{CHANNELS_PER_DEVICE, DEVICES_PER_BANK};

// ── Mock bus ──────────────────────────────────────────────────

pub struct MockBus {
    /// Scripted raw input byte per input device (domain polarity).
    pub inputs: [u8; DEVICES_PER_BANK],
    /// Every relay byte written, in order, as `(device, bits)`.
    pub relay_writes: Vec<(usize, u8)>,
    pub fail_relay_device: Option<usize>,
    pub fail_input_device: Option<usize>,
}

#[allow(dead_code)]
impl MockBus {
    pub fn new() -> Self {
        Self {
            inputs: [0; DEVICES_PER_BANK],
            relay_writes: Vec::new(),
            fail_relay_device: None,
            fail_input_device: None,
        }
    }

    /// Drive one input channel (0-based index across both devices).
    pub fn set_input(&mut self, index: usize, active: bool) {
        let device = index / CHANNELS_PER_DEVICE;
        let bit = 1 << (index % CHANNELS_PER_DEVICE);
        if active {
            self.inputs[device] |= bit;
        } else {
            self.inputs[device] &= !bit;
        }
    }

    /// Last byte written to a relay device, if any.
    pub fn last_relay_byte(&self, device: usize) -> Option<u8> {
        self.relay_writes
            .iter()
            .rev()
            .find(|(d, _)| *d == device)
            .map(|(_, b)| *b)
    }

    pub fn writes_to(&self, device: usize) -> usize {
        self.relay_writes.iter().filter(|(d, _)| *d == device).count()
    }
}

impl ExpanderBus for MockBus {
    fn write_relays(&mut self, device: usize, bits: u8) -> Result<(), BusError> {
        if self.fail_relay_device == Some(device) {
            return Err(BusError::Nack);
        }
        self.relay_writes.push((device, bits));
        Ok(())
    }

    fn read_inputs(&mut self, device: usize) -> Result<u8, BusError> {
        if self.fail_input_device == Some(device) {
            return Err(BusError::Timeout);
        }
        Ok(self.inputs[device])
    }
}

// ── Recording sink ────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn relay_changes(&self) -> Vec<(u8, bool)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::RelayChanged { id, on } => Some((*id, *on)),
                _ => None,
            })
            .collect()
    }

    pub fn input_edges(&self) -> Vec<(u8, bool)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::InputEdge { id, pressed } => Some((*id, *pressed)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}
