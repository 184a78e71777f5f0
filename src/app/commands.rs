//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (HMI, CLI,
//! maintenance tooling) that the
//! [`ControlService`](super::service::ControlService) interprets and acts upon.

use crate::config::ControllerConfig;
use crate::diagnostics::{FAULT_RING_SLOTS, FaultEntry, RuntimeMetrics};

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Hot-reload configuration.  Rejected if it fails validation.
    UpdateConfig(ControllerConfig),

    /// Explicitly persist the current config immediately.
    SaveConfig,

    /// Return fault history entries and runtime metrics.
    GetDiagnostics,

    /// Erase all fault history entries.
    ClearDiagnostics,

    /// Drop all latches and timers back to power-on state.
    ResetState,
}

/// What the service hands back for a command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandReply {
    Ack,
    Diagnostics(DiagnosticsReport),
}

/// Answer to [`AppCommand::GetDiagnostics`].
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticsReport {
    pub metrics: RuntimeMetrics,
    /// Oldest first.
    pub history: heapless::Vec<FaultEntry, FAULT_RING_SLOTS>,
}
