//! Integration tests: RelayCommand → ControlService → ExpanderBus.

use relayboard::Error;
use relayboard::app::commands::RelayCommand;
use relayboard::app::events::AppEvent;
use relayboard::app::service::ControlService;
use relayboard::config::CHANNEL_COUNT;
use relayboard::state::IoState;

use crate::mock_hw::{MockBus, RecordingSink};

fn service() -> ControlService {
    ControlService::new(IoState::new([false; CHANNEL_COUNT]))
}

#[test]
fn set_relay_updates_state_and_device_byte() {
    let mut svc = service();
    let mut bus = MockBus::new();
    let mut sink = RecordingSink::new();

    // Relay 5 is index 4: device 0, bit 4.
    let snap = svc
        .handle_command(RelayCommand::Set { id: 5, on: true }, &mut bus, &mut sink)
        .unwrap();

    assert!(snap.relays[4]);
    assert!(snap.relays.iter().enumerate().all(|(i, &r)| r == (i == 4)));
    assert_eq!(bus.last_relay_byte(0), Some(0b0001_0000));
    assert_eq!(bus.writes_to(1), 0, "device 1 untouched");
    assert_eq!(sink.relay_changes(), vec![(5, true)]);
}

#[test]
fn set_relay_is_idempotent_on_the_wire() {
    let mut svc = service();
    let mut bus = MockBus::new();
    let mut sink = RecordingSink::new();

    svc.handle_command(RelayCommand::Set { id: 12, on: true }, &mut bus, &mut sink)
        .unwrap();
    svc.handle_command(RelayCommand::Set { id: 12, on: true }, &mut bus, &mut sink)
        .unwrap();

    assert_eq!(bus.writes_to(1), 1, "unchanged set must not re-write");
    assert_eq!(sink.relay_changes(), vec![(12, true)]);
}

#[test]
fn invalid_ids_are_rejected_without_mutation() {
    let mut svc = service();
    let mut bus = MockBus::new();
    let mut sink = RecordingSink::new();

    for id in [0u8, 17, 255] {
        let err = svc
            .handle_command(RelayCommand::Set { id, on: true }, &mut bus, &mut sink)
            .unwrap_err();
        assert_eq!(err, Error::InvalidId(id));
    }

    assert!(bus.relay_writes.is_empty());
    assert!(svc.snapshot().relays.iter().all(|&r| !r));
}

#[test]
fn set_all_drives_both_devices() {
    let mut svc = service();
    let mut bus = MockBus::new();
    let mut sink = RecordingSink::new();

    let snap = svc
        .handle_command(RelayCommand::SetAll { on: true }, &mut bus, &mut sink)
        .unwrap();

    assert!(snap.relays.iter().all(|&r| r));
    assert_eq!(bus.last_relay_byte(0), Some(0xFF));
    assert_eq!(bus.last_relay_byte(1), Some(0xFF));
    assert!(sink.events.contains(&AppEvent::AllRelaysSet { on: true }));
}

#[test]
fn toggle_all_is_all_or_nothing() {
    let mut svc = service();
    let mut bus = MockBus::new();
    let mut sink = RecordingSink::new();

    // Mixed state goes all-on, not per-relay XOR.
    svc.handle_command(RelayCommand::Set { id: 3, on: true }, &mut bus, &mut sink)
        .unwrap();
    let snap = svc
        .handle_command(RelayCommand::ToggleAll, &mut bus, &mut sink)
        .unwrap();
    assert!(snap.relays.iter().all(|&r| r));

    // All-on goes all-off.
    let snap = svc
        .handle_command(RelayCommand::ToggleAll, &mut bus, &mut sink)
        .unwrap();
    assert!(snap.relays.iter().all(|&r| !r));
    assert_eq!(bus.last_relay_byte(0), Some(0x00));
    assert_eq!(bus.last_relay_byte(1), Some(0x00));
}

#[test]
fn failed_write_keeps_desired_state_and_reconciles() {
    let mut svc = service();
    let mut bus = MockBus::new();
    let mut sink = RecordingSink::new();

    bus.fail_relay_device = Some(0);
    let snap = svc
        .handle_command(RelayCommand::Set { id: 1, on: true }, &mut bus, &mut sink)
        .unwrap();

    // In-memory state holds the desired value even though the wire write
    // failed; the service reports degradation instead of erroring.
    assert!(snap.relays[0]);
    assert!(svc.is_degraded());
    assert_eq!(bus.writes_to(0), 0);

    // Next write to the same device carries the full recomputed byte.
    bus.fail_relay_device = None;
    svc.handle_command(RelayCommand::Set { id: 2, on: true }, &mut bus, &mut sink)
        .unwrap();
    assert_eq!(bus.last_relay_byte(0), Some(0b0000_0011));
}

#[test]
fn snapshot_serializes_to_the_api_document() {
    let mut svc = service();
    let mut bus = MockBus::new();
    let mut sink = RecordingSink::new();

    svc.handle_command(RelayCommand::Set { id: 1, on: true }, &mut bus, &mut sink)
        .unwrap();

    let json = serde_json::to_string(&svc.snapshot()).unwrap();
    assert!(json.starts_with("{\"relays\":[true,false"));
    assert!(json.contains("\"inputs\":[false"));
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["relays"].as_array().unwrap().len(), CHANNEL_COUNT);
    assert_eq!(value["inputs"].as_array().unwrap().len(), CHANNEL_COUNT);
}
