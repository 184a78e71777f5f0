//! Control service — the hexagonal core.
//!
//! [`ControlService`] owns the single latched/timer state pair, the fault
//! supervisor and the diagnostics counters.  It exposes a clean,
//! hardware-agnostic API.  All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!   InputPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │      ControlService       │
//!  OutputPort ◀── │ Policy · Supervisor · Log │ ◀─▶ StoragePort
//!                 └──────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::{ControllerConfig, validate_config};
use crate::diagnostics::{FaultEntry, FaultHistory, FaultKind, RuntimeMetrics};
use crate::error::{Error, InputError};
use crate::policy::{
    CycleOutcome, InputSnapshot, LatchedState, OutputSnapshot, PolicyEvaluator, TimerState,
};
use crate::safety::{FaultSupervisor, Transition};

use super::commands::{AppCommand, CommandReply, DiagnosticsReport};
use super::events::{AppEvent, TelemetryData};
use super::ports::{ConfigError, ConfigPort, EventSink, InputPort, OutputPort, StoragePort};

/// Seconds a config change may stay unsaved before auto-save.
const AUTO_SAVE_DELAY_SECS: f32 = 5.0;

// ───────────────────────────────────────────────────────────────
// ControlService
// ───────────────────────────────────────────────────────────────

/// The control service orchestrates all domain logic.
pub struct ControlService {
    config: ControllerConfig,
    evaluator: PolicyEvaluator,
    latched: LatchedState,
    timers: TimerState,
    outputs: OutputSnapshot,
    last_inputs: InputSnapshot,
    supervisor: FaultSupervisor,
    history: FaultHistory,
    uptime_secs: f32,
    scan_count: u64,
    rejected_scans: u64,
    since_telemetry: f32,
    config_dirty: bool,
    dirty_since_secs: f32,
}

impl ControlService {
    /// Construct the service from configuration.  All latches start clear.
    ///
    /// The configuration is range-checked first; an invalid one is rejected.
    pub fn new(config: ControllerConfig) -> Result<Self, ConfigError> {
        validate_config(&config)?;
        Ok(Self {
            evaluator: PolicyEvaluator::new(config.policy())?,
            config,
            latched: LatchedState::default(),
            timers: TimerState::default(),
            outputs: OutputSnapshot::all_off(),
            last_inputs: InputSnapshot::default(),
            supervisor: FaultSupervisor::new(),
            history: FaultHistory::new(),
            uptime_secs: 0.0,
            scan_count: 0,
            rejected_scans: 0,
            since_telemetry: 0.0,
            config_dirty: false,
            dirty_since_secs: 0.0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Resume the fault history ring from `store` and announce startup.
    pub fn start(&mut self, store: &dyn StoragePort, sink: &mut impl EventSink) {
        self.history.init(store);
        sink.emit(&AppEvent::Started(self.config.variant));
        info!(
            "ControlService started for {} (preset {:.1}s, scan {}ms)",
            self.config.variant.model(),
            self.config.timer_preset_secs,
            self.config.scan_interval_ms
        );
    }

    // ── Per-scan orchestration ────────────────────────────────

    /// Run one scan: read inputs → evaluate → apply outputs → report edges.
    ///
    /// The `hw` parameter satisfies **both** [`InputPort`] and
    /// [`OutputPort`], which avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    ///
    /// A rejected scan leaves the latched state untouched and de-energises
    /// every output.
    pub fn scan(
        &mut self,
        hw: &mut (impl InputPort + OutputPort),
        sink: &mut impl EventSink,
        store: &mut dyn StoragePort,
        dt: f32,
    ) -> Result<CycleOutcome, InputError> {
        let outcome = hw.read_inputs().and_then(|inputs| {
            self.last_inputs = inputs;
            self.evaluator
                .evaluate_cycle(&inputs, &self.latched, &self.timers, dt)
        });

        let outcome = match outcome {
            Ok(o) => o,
            Err(e) => {
                self.rejected_scans += 1;
                warn!("Scan rejected: {e}; outputs forced off");
                self.outputs = OutputSnapshot::all_off();
                hw.all_off();
                sink.emit(&AppEvent::ScanRejected(match e {
                    InputError::InvalidDt(_) => "invalid scan interval",
                    InputError::MissingSignal(sym) => sym,
                }));
                return Err(e);
            }
        };

        self.scan_count += 1;
        self.uptime_secs += dt;

        let edges = self.supervisor.observe(&self.latched, &outcome.latched);
        self.latched = outcome.latched;
        self.timers = outcome.timers;
        self.outputs = outcome.outputs;

        hw.apply(&self.outputs);

        for edge in edges {
            self.report(edge, sink, store);
        }

        self.since_telemetry += dt;
        if self.since_telemetry >= self.config.telemetry_interval_secs as f32 {
            self.since_telemetry = 0.0;
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
        }

        Ok(outcome)
    }

    fn report(&mut self, edge: Transition, sink: &mut impl EventSink, store: &mut dyn StoragePort) {
        let event = match edge {
            Transition::SystemStarted => AppEvent::SystemStarted,
            Transition::SystemStopped => AppEvent::SystemStopped,
            Transition::FaultSet(pump) => {
                let entry = FaultEntry::new(
                    self.uptime_secs,
                    pump,
                    FaultKind::Latched,
                    "no speed after start delay",
                );
                self.history.record(store, &entry);
                AppEvent::FaultLatched(pump)
            }
            Transition::FaultCleared(pump) => {
                let entry = FaultEntry::new(self.uptime_secs, pump, FaultKind::Cleared, "reset");
                self.history.record(store, &entry);
                AppEvent::FaultCleared(pump)
            }
            Transition::BackupEngaged(route) => AppEvent::BackupEngaged(route),
            Transition::BackupReleased(route) => AppEvent::BackupReleased(route),
        };
        sink.emit(&event);
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (from HMI, CLI, maintenance tooling).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl OutputPort,
        store: &mut dyn StoragePort,
    ) -> Result<CommandReply, Error> {
        match cmd {
            AppCommand::UpdateConfig(new_config) => {
                validate_config(&new_config)?;
                self.evaluator = PolicyEvaluator::new(new_config.policy())?;
                self.config = new_config;
                self.mark_config_dirty();
                info!("Configuration updated at runtime");
            }
            AppCommand::SaveConfig => {
                self.mark_config_dirty();
                self.dirty_since_secs = self.uptime_secs - AUTO_SAVE_DELAY_SECS;
                info!("Explicit config save requested (will flush on next auto-save check)");
            }
            AppCommand::GetDiagnostics => {
                return Ok(CommandReply::Diagnostics(DiagnosticsReport {
                    metrics: self.metrics(store),
                    history: self.history.read_all(store),
                }));
            }
            AppCommand::ClearDiagnostics => {
                self.history.clear(store);
                info!("Fault history cleared");
            }
            AppCommand::ResetState => self.reset_state(hw),
        }
        Ok(CommandReply::Ack)
    }

    /// Drop every latch and timer back to power-on state and de-energise
    /// the outputs.  Fault history and counters are kept.
    pub fn reset_state(&mut self, hw: &mut impl OutputPort) {
        self.latched = LatchedState::default();
        self.timers = TimerState::default();
        self.outputs = OutputSnapshot::all_off();
        self.supervisor.clear();
        hw.all_off();
        info!("Latched state reset");
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the last scan.
    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            uptime_secs: self.uptime_secs,
            scans: self.scan_count,
            running: self.latched.running,
            pump_run: self.outputs.pump_run,
            tank_low: self.last_inputs.tanks.map(|t| t.low),
            tank_high: self.last_inputs.tanks.map(|t| t.high),
            backup: self.latched.backup,
            fault_flags: self.latched.fault_mask(),
        }
    }

    pub fn metrics(&self, store: &dyn StoragePort) -> RuntimeMetrics {
        RuntimeMetrics {
            uptime_secs: self.uptime_secs,
            scans: self.scan_count,
            rejected_scans: self.rejected_scans,
            fault_events: self.supervisor.fault_events(),
            backup_engagements: self.supervisor.backup_engagements(),
            history_entries: self.history.count(store),
            active_faults: self.supervisor.faults(),
        }
    }

    pub fn latched(&self) -> &LatchedState {
        &self.latched
    }

    pub fn timers(&self) -> &TimerState {
        &self.timers
    }

    pub fn outputs(&self) -> &OutputSnapshot {
        &self.outputs
    }

    /// Total successful scans since startup.
    pub fn scan_count(&self) -> u64 {
        self.scan_count
    }

    pub fn uptime_secs(&self) -> f32 {
        self.uptime_secs
    }

    /// Current fault bitmask (0 = no faults).
    pub fn fault_flags(&self) -> u8 {
        self.latched.fault_mask()
    }

    /// Clone of the live configuration.
    pub fn current_config(&self) -> ControllerConfig {
        self.config.clone()
    }

    // ── Config dirty-flag management ──────────────────────────

    /// Mark the config as modified.  Called by `handle_command(UpdateConfig)`.
    pub fn mark_config_dirty(&mut self) {
        if !self.config_dirty {
            self.config_dirty = true;
            self.dirty_since_secs = self.uptime_secs;
        }
    }

    /// Save once the config has been dirty for 5 seconds of scan time.
    /// Returns `true` if the config was saved.
    pub fn auto_save_if_needed(&mut self, storage: &impl ConfigPort) -> bool {
        if !self.config_dirty {
            return false;
        }
        if self.uptime_secs - self.dirty_since_secs < AUTO_SAVE_DELAY_SECS {
            return false;
        }
        match storage.save(&self.config) {
            Ok(()) => {
                self.config_dirty = false;
                info!("Config auto-saved");
                true
            }
            Err(e) => {
                warn!("Config auto-save failed: {}", e);
                false
            }
        }
    }

    /// Force-save if dirty (call before shutdown).
    pub fn force_save_if_dirty(&mut self, storage: &impl ConfigPort) {
        if !self.config_dirty {
            return;
        }
        match storage.save(&self.config) {
            Ok(()) => {
                self.config_dirty = false;
                info!("Config force-saved before shutdown");
            }
            Err(e) => {
                warn!("Config force-save failed: {}", e);
            }
        }
    }

    /// Whether the config has unsaved changes.
    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::MemoryStore;
    use crate::app::ports::ConfigError;

    struct NullOutputs;

    impl OutputPort for NullOutputs {
        fn apply(&mut self, _outputs: &OutputSnapshot) {}
    }

    #[test]
    fn telemetry_starts_idle() {
        let svc = ControlService::new(ControllerConfig::default()).unwrap();
        let t = svc.build_telemetry();
        assert_eq!(t.scans, 0);
        assert!(!t.running);
        assert_eq!(t.fault_flags, 0);
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let mut cfg = ControllerConfig::default();
        cfg.timer_preset_secs = 0.0;
        assert!(matches!(
            ControlService::new(cfg.clone()),
            Err(ConfigError::ValidationFailed(_))
        ));
        cfg.timer_preset_secs = f32::NAN;
        assert!(ControlService::new(cfg).is_err());
    }

    #[test]
    fn invalid_config_update_is_rejected_and_not_marked_dirty() {
        let mut svc = ControlService::new(ControllerConfig::default()).unwrap();
        let mut store = MemoryStore::new();
        let mut bad = ControllerConfig::default();
        bad.scan_interval_ms = 0;
        let r = svc.handle_command(AppCommand::UpdateConfig(bad), &mut NullOutputs, &mut store);
        assert!(matches!(r, Err(Error::Config(ConfigError::ValidationFailed(_)))));
        assert!(!svc.is_config_dirty());
    }

    #[test]
    fn save_command_flushes_on_next_check() {
        let mut svc = ControlService::new(ControllerConfig::default()).unwrap();
        let mut store = MemoryStore::new();
        svc.handle_command(AppCommand::SaveConfig, &mut NullOutputs, &mut store)
            .unwrap();
        assert!(svc.is_config_dirty());
        assert!(svc.auto_save_if_needed(&store));
        assert!(!svc.is_config_dirty());
        assert!(store.load().is_ok());
    }

    #[test]
    fn force_save_writes_only_when_dirty() {
        let mut svc = ControlService::new(ControllerConfig::default()).unwrap();
        let mut store = MemoryStore::new();
        svc.force_save_if_dirty(&store);
        assert!(store.is_empty());

        let mut cfg = ControllerConfig::default();
        cfg.telemetry_interval_secs = 30;
        svc.handle_command(AppCommand::UpdateConfig(cfg), &mut NullOutputs, &mut store)
            .unwrap();
        svc.force_save_if_dirty(&store);
        assert!(!svc.is_config_dirty());
        assert_eq!(store.load().unwrap().telemetry_interval_secs, 30);
    }
}
