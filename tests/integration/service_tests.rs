//! ControlService against mock field I/O and an in-memory store.

use tankguard::adapters::log_sink::RecordingSink;
use tankguard::adapters::store::MemoryStore;
use tankguard::app::commands::{AppCommand, CommandReply, DiagnosticsReport};
use tankguard::app::events::AppEvent;
use tankguard::app::ports::ConfigPort;
use tankguard::app::service::ControlService;
use tankguard::config::{ControllerConfig, ControllerVariant, FillMode};
use tankguard::diagnostics::FaultKind;
use tankguard::error::InputError;
use tankguard::policy::{LatchedState, OutputSnapshot};
use tankguard::topology::{PumpId, RouteId};

use crate::mock_hw::{FullStorage, MockHardware, OutputCall};

const DT: f32 = 0.01;

fn started(config: ControllerConfig) -> (ControlService, MemoryStore, RecordingSink) {
    let store = MemoryStore::new();
    let mut sink = RecordingSink::new();
    let mut svc = ControlService::new(config).unwrap();
    svc.start(&store, &mut sink);
    (svc, store, sink)
}

fn scans(
    svc: &mut ControlService,
    hw: &mut MockHardware,
    sink: &mut RecordingSink,
    store: &mut MemoryStore,
    n: usize,
) {
    for _ in 0..n {
        svc.scan(hw, sink, store, DT).unwrap();
    }
}

fn diagnostics(
    svc: &mut ControlService,
    hw: &mut MockHardware,
    store: &mut MemoryStore,
) -> DiagnosticsReport {
    match svc.handle_command(AppCommand::GetDiagnostics, hw, store).unwrap() {
        CommandReply::Diagnostics(d) => d,
        other => panic!("expected diagnostics, got {other:?}"),
    }
}

/// Start pressed, pump 1 stalled, scanned past the startup delay.
fn with_pump_one_faulted() -> (ControlService, MockHardware, MemoryStore, RecordingSink) {
    let (mut svc, mut store, mut sink) = started(ControllerConfig::default());
    let mut hw = MockHardware::healthy_tank_one_low();
    hw.stall(PumpId::P1);
    hw.inputs.start = true;
    scans(&mut svc, &mut hw, &mut sink, &mut store, 210);
    (svc, hw, store, sink)
}

// ── Lifecycle ─────────────────────────────────────────────────

#[test]
fn start_announces_the_controller_variant() {
    let mut config = ControllerConfig::default();
    config.variant = ControllerVariant::Tm221Ce40t;
    let (_, _, sink) = started(config);
    assert_eq!(sink.events, vec![AppEvent::Started(ControllerVariant::Tm221Ce40t)]);
}

#[test]
fn start_button_seals_in_and_energises_the_fill_pump() {
    let (mut svc, mut store, mut sink) = started(ControllerConfig::default());
    let mut hw = MockHardware::healthy_tank_one_low();
    hw.inputs.start = true;
    scans(&mut svc, &mut hw, &mut sink, &mut store, 3);

    assert!(svc.latched().running);
    assert!(hw.pump_on(PumpId::P1));
    assert!(!hw.pump_on(PumpId::P2));
    assert_eq!(
        sink.events.iter().filter(|e| **e == AppEvent::SystemStarted).count(),
        1
    );
    assert_eq!(svc.scan_count(), 3);
}

// ── Rejected scans ────────────────────────────────────────────

#[test]
fn missing_signal_forces_outputs_off_and_keeps_state() {
    let (mut svc, mut store, mut sink) = started(ControllerConfig::default());
    let mut hw = MockHardware::healthy_tank_one_low();
    hw.inputs.start = true;
    scans(&mut svc, &mut hw, &mut sink, &mut store, 10);
    let before: LatchedState = *svc.latched();
    assert!(hw.pump_on(PumpId::P1));

    hw.read_error = Some(InputError::MissingSignal("E_STOP"));
    let r = svc.scan(&mut hw, &mut sink, &mut store, DT);

    assert_eq!(r.unwrap_err(), InputError::MissingSignal("E_STOP"));
    assert_eq!(hw.calls.last(), Some(&OutputCall::AllOff));
    assert_eq!(*svc.outputs(), OutputSnapshot::all_off());
    assert_eq!(*svc.latched(), before);
    assert_eq!(svc.scan_count(), 10);
    assert!(sink.events.contains(&AppEvent::ScanRejected("E_STOP")));
    assert_eq!(svc.metrics(&store).rejected_scans, 1);

    // The next good scan picks up where the state left off.
    hw.read_error = None;
    svc.scan(&mut hw, &mut sink, &mut store, DT).unwrap();
    assert!(hw.pump_on(PumpId::P1));
}

#[test]
fn invalid_interval_is_rejected() {
    let (mut svc, mut store, mut sink) = started(ControllerConfig::default());
    let mut hw = MockHardware::new();
    let r = svc.scan(&mut hw, &mut sink, &mut store, 0.0);
    assert!(matches!(r, Err(InputError::InvalidDt(_))));
    assert!(sink.events.contains(&AppEvent::ScanRejected("invalid scan interval")));
    assert_eq!(svc.uptime_secs(), 0.0);
}

// ── Faults and diagnostics ────────────────────────────────────

#[test]
fn latched_fault_engages_backup_and_lands_in_history() {
    let (mut svc, mut hw, mut store, sink) = with_pump_one_faulted();

    assert!(svc.latched().fault(PumpId::P1));
    assert_eq!(svc.fault_flags(), 0b001);
    assert!(sink.events.contains(&AppEvent::FaultLatched(PumpId::P1)));
    assert!(sink.events.contains(&AppEvent::BackupEngaged(RouteId::Tank1ViaPump2)));
    assert!(hw.pump_on(PumpId::P2));
    assert!(!hw.pump_on(PumpId::P1));

    let d = diagnostics(&mut svc, &mut hw, &mut store);
    assert_eq!(d.history.len(), 1);
    assert_eq!(d.history[0].pump, PumpId::P1);
    assert_eq!(d.history[0].kind, FaultKind::Latched);
    assert_eq!(d.metrics.fault_events, 1);
    assert_eq!(d.metrics.backup_engagements, 1);
    assert_eq!(d.metrics.active_faults, 0b001);
    assert_eq!(d.metrics.history_entries, 1);
}

#[test]
fn reset_with_speed_restored_records_the_clear() {
    let (mut svc, mut hw, mut store, mut sink) = with_pump_one_faulted();
    hw.inputs.pump_mut(PumpId::P1).speed_ok = true;
    hw.inputs.fault_reset = true;
    svc.scan(&mut hw, &mut sink, &mut store, DT).unwrap();

    assert!(!svc.latched().fault(PumpId::P1));
    assert!(sink.events.contains(&AppEvent::FaultCleared(PumpId::P1)));
    assert!(sink.events.contains(&AppEvent::BackupReleased(RouteId::Tank1ViaPump2)));

    let d = diagnostics(&mut svc, &mut hw, &mut store);
    let kinds: Vec<FaultKind> = d.history.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![FaultKind::Latched, FaultKind::Cleared]);
}

#[test]
fn clear_diagnostics_empties_history() {
    let (mut svc, mut hw, mut store, _) = with_pump_one_faulted();
    let reply = svc
        .handle_command(AppCommand::ClearDiagnostics, &mut hw, &mut store)
        .unwrap();
    assert_eq!(reply, CommandReply::Ack);
    let d = diagnostics(&mut svc, &mut hw, &mut store);
    assert!(d.history.is_empty());
    assert_eq!(d.metrics.history_entries, 0);
    // The latch itself is untouched.
    assert!(svc.latched().fault(PumpId::P1));
}

#[test]
fn history_survives_a_service_restart() {
    let (_, mut hw, mut store, _) = with_pump_one_faulted();
    let mut sink = RecordingSink::new();
    let mut svc = ControlService::new(ControllerConfig::default()).unwrap();
    svc.start(&store, &mut sink);

    let d = diagnostics(&mut svc, &mut hw, &mut store);
    assert_eq!(d.history.len(), 1);
    assert_eq!(d.history[0].kind, FaultKind::Latched);
    // A fresh service starts with clear latches.
    assert!(!svc.latched().any_fault());
}

#[test]
fn full_storage_does_not_stop_the_scan() {
    let mut svc = ControlService::new(ControllerConfig::default()).unwrap();
    let mut sink = RecordingSink::new();
    let mut store = FullStorage;
    svc.start(&store, &mut sink);

    let mut hw = MockHardware::healthy_tank_one_low();
    hw.stall(PumpId::P1);
    hw.inputs.start = true;
    for _ in 0..210 {
        svc.scan(&mut hw, &mut sink, &mut store, DT).unwrap();
    }
    assert!(svc.latched().fault(PumpId::P1));
    assert!(sink.events.contains(&AppEvent::FaultLatched(PumpId::P1)));
    assert_eq!(svc.metrics(&store).history_entries, 0);
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn reset_state_drops_latches_and_de_energises() {
    let (mut svc, mut hw, mut store, mut sink) = with_pump_one_faulted();
    svc.handle_command(AppCommand::ResetState, &mut hw, &mut store)
        .unwrap();

    assert_eq!(*svc.latched(), LatchedState::default());
    assert_eq!(hw.calls.last(), Some(&OutputCall::AllOff));

    // Without a fresh START the system stays down.
    scans(&mut svc, &mut hw, &mut sink, &mut store, 5);
    assert!(!svc.latched().running);
    assert_eq!(hw.last_outputs(), Some(OutputSnapshot::all_off()));
}

#[test]
fn config_update_takes_effect_and_auto_saves_after_delay() {
    let (mut svc, mut store, mut sink) = started(ControllerConfig::default());
    let mut hw = MockHardware::new();

    let mut band = ControllerConfig::default();
    band.fill_mode = FillMode::Band;
    svc.handle_command(AppCommand::UpdateConfig(band), &mut hw, &mut store)
        .unwrap();
    assert!(svc.is_config_dirty());
    assert_eq!(svc.current_config().fill_mode, FillMode::Band);
    assert!(!svc.auto_save_if_needed(&store));

    scans(&mut svc, &mut hw, &mut sink, &mut store, 510);
    assert!(svc.auto_save_if_needed(&store));
    assert!(!svc.is_config_dirty());
    assert_eq!(store.load().unwrap().fill_mode, FillMode::Band);
}

#[test]
fn telemetry_follows_the_configured_interval() {
    let mut config = ControllerConfig::default();
    config.telemetry_interval_secs = 1;
    let (mut svc, mut store, mut sink) = started(config);
    let mut hw = MockHardware::healthy_tank_one_low();
    hw.inputs.start = true;
    scans(&mut svc, &mut hw, &mut sink, &mut store, 250);

    let telemetry: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Telemetry(t) => Some(t),
            _ => None,
        })
        .collect();
    assert_eq!(telemetry.len(), 2);
    let last = telemetry[1];
    assert!(last.running);
    assert_eq!(last.pump_run, [true, false, false]);
    assert_eq!(last.tank_low, [true, false, false]);
    assert_eq!(last.fault_flags, 0);
}
