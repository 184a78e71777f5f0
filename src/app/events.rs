//! Outbound application events.
//!
//! The [`ControlService`](super::service::ControlService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to console, forward to an HMI, etc.

use serde::Serialize;

use crate::config::ControllerVariant;
use crate::topology::{PUMP_COUNT, PumpId, ROUTE_COUNT, RouteId, TANK_COUNT};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AppEvent {
    /// The service has started (carries the controller it is configured for).
    Started(ControllerVariant),

    /// The run seal-in was set.
    SystemStarted,

    /// The run seal-in dropped.
    SystemStopped,

    /// A pump's zero-speed fault latched.
    FaultLatched(PumpId),

    /// A pump's fault latch was reset.
    FaultCleared(PumpId),

    /// A backup route took over a tank.
    BackupEngaged(RouteId),

    /// A backup route released its tank.
    BackupReleased(RouteId),

    /// A scan was rejected; outputs were forced off.
    ScanRejected(&'static str),

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryData {
    pub uptime_secs: f32,
    pub scans: u64,
    pub running: bool,
    pub pump_run: [bool; PUMP_COUNT],
    pub tank_low: [bool; TANK_COUNT],
    pub tank_high: [bool; TANK_COUNT],
    pub backup: [bool; ROUTE_COUNT],
    /// Fault latches, one bit per pump.
    pub fault_flags: u8,
}
