//! Scan records: the input image, the state carried between scans, and the
//! derived output image.

use serde::{Deserialize, Serialize};

use super::timer::OnDelayTimer;
use crate::topology::{PUMP_COUNT, PumpId, ROUTE_COUNT, RouteId, TANK_COUNT, TankId, ValveId};

// ---------------------------------------------------------------------------
// Inputs (read fresh every scan)
// ---------------------------------------------------------------------------

/// Per-pump field signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PumpInputs {
    /// Zero-speed sensor, wired NC: `true` = motor confirmed turning.
    /// An open or disconnected sensor reads `false`.
    pub speed_ok: bool,
    /// Thermal overload tripped.  `None` where the controller has no
    /// overload contacts.
    pub overload: Option<bool>,
}

/// Per-tank level switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TankInputs {
    /// Level is at or below the low switch.
    pub low: bool,
    /// Level is at or above the high switch.
    pub high: bool,
}

impl TankInputs {
    /// The tank asks for water: low and not yet high.
    pub const fn needs_water(self) -> bool {
        self.low && !self.high
    }
}

/// A point-in-time snapshot of every discrete input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub start: bool,
    /// Stop pushbutton pressed.
    pub stop: bool,
    /// Emergency stop pressed.  `None` on controllers without one.
    pub estop: Option<bool>,
    pub fault_reset: bool,
    pub pumps: [PumpInputs; PUMP_COUNT],
    pub tanks: [TankInputs; TANK_COUNT],
}

impl InputSnapshot {
    pub fn pump(&self, id: PumpId) -> &PumpInputs {
        &self.pumps[id.index()]
    }

    pub fn pump_mut(&mut self, id: PumpId) -> &mut PumpInputs {
        &mut self.pumps[id.index()]
    }

    pub fn tank(&self, id: TankId) -> &TankInputs {
        &self.tanks[id.index()]
    }

    pub fn tank_mut(&mut self, id: TankId) -> &mut TankInputs {
        &mut self.tanks[id.index()]
    }
}

// ---------------------------------------------------------------------------
// Latched state (carried between scans)
// ---------------------------------------------------------------------------

/// Health of one pump, as seen through its fault latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PumpHealth {
    Healthy,
    Faulted,
}

/// Memory bits that survive from one scan to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatchedState {
    /// System run seal-in.
    pub running: bool,
    /// Zero-speed fault latch per pump.
    pub faults: [bool; PUMP_COUNT],
    /// Backup-active flag per route.
    pub backup: [bool; ROUTE_COUNT],
    /// Fill command per pump as of this scan.
    pub commands: [bool; PUMP_COUNT],
}

impl LatchedState {
    pub fn fault(&self, pump: PumpId) -> bool {
        self.faults[pump.index()]
    }

    pub fn backup_active(&self, route: RouteId) -> bool {
        self.backup[route.index()]
    }

    pub fn command(&self, pump: PumpId) -> bool {
        self.commands[pump.index()]
    }

    pub fn health(&self, pump: PumpId) -> PumpHealth {
        if self.fault(pump) {
            PumpHealth::Faulted
        } else {
            PumpHealth::Healthy
        }
    }

    pub fn any_fault(&self) -> bool {
        self.faults.iter().any(|f| *f)
    }

    /// Fault latches packed one bit per pump (bit 0 = pump 1).
    pub fn fault_mask(&self) -> u8 {
        self.faults
            .iter()
            .enumerate()
            .fold(0, |m, (i, f)| if *f { m | (1 << i) } else { m })
    }
}

/// Startup timers, one per pump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub timers: [OnDelayTimer; PUMP_COUNT],
}

impl TimerState {
    pub fn timer(&self, pump: PumpId) -> OnDelayTimer {
        self.timers[pump.index()]
    }
}

// ---------------------------------------------------------------------------
// Outputs (derived every scan)
// ---------------------------------------------------------------------------

/// Every discrete output the program drives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSnapshot {
    /// Motor contactor per pump.
    pub pump_run: [bool; PUMP_COUNT],
    /// Interconnect valve open command, indexed by [`ValveId::index`].
    pub valve_open: [bool; ROUTE_COUNT],
    /// Fault lamp per pump.
    pub fault_lamp: [bool; PUMP_COUNT],
    pub running_lamp: bool,
    /// Alarm horn.
    pub alarm: bool,
}

impl OutputSnapshot {
    pub fn pump(&self, id: PumpId) -> bool {
        self.pump_run[id.index()]
    }

    pub fn valve(&self, id: ValveId) -> bool {
        self.valve_open[id.index()]
    }

    pub fn fault_lamp(&self, id: PumpId) -> bool {
        self.fault_lamp[id.index()]
    }

    /// Everything de-energised.
    pub fn all_off() -> Self {
        Self::default()
    }
}
