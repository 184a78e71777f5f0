//! Fixed plant topology: three pumps, three tanks, two backup routes.
//!
//! Pump *n* fills tank *n*.  A backup route names a primary pump, the pump
//! that takes over its tank when the primary faults, and the valve that
//! connects the two tanks while it does.
//!
//! ```text
//!          [PUMP 1]        [PUMP 2]        [PUMP 3]
//!              |               |               |
//!          +-------+       +-------+       +-------+
//!          |TANK 1 |<----->|TANK 2 |<----->|TANK 3 |
//!          +-------+VALVE12+-------+VALVE23+-------+
//! ```
//!
//! Tank 3 has no route: nothing backs up pump 3.  `VALVE_13` exists on the
//! 40-point controller's output card but no rule drives it.

use serde::{Deserialize, Serialize};

/// Number of pumps (and tanks, one per pump).
pub const PUMP_COUNT: usize = 3;
/// Number of tanks.
pub const TANK_COUNT: usize = 3;
/// Number of backup routes.
pub const ROUTE_COUNT: usize = 2;

/// Startup grace period before the zero-speed check arms (seconds).
pub const START_DELAY_SECS: f32 = 2.0;

/// Pump identity.  `index()` addresses the per-pump arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PumpId {
    P1,
    P2,
    P3,
}

impl PumpId {
    pub const ALL: [PumpId; PUMP_COUNT] = [PumpId::P1, PumpId::P2, PumpId::P3];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// One-based pump number as printed on the panel.
    pub const fn number(self) -> u8 {
        self as u8 + 1
    }

    /// The tank this pump fills in normal operation.
    pub const fn tank(self) -> TankId {
        match self {
            Self::P1 => TankId::T1,
            Self::P2 => TankId::T2,
            Self::P3 => TankId::T3,
        }
    }

    /// The route on which this pump serves as the backup, if any.
    pub fn backs_up(self) -> Option<RouteId> {
        RouteId::ALL.into_iter().find(|r| r.route().backup == self)
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }
}

impl core::fmt::Display for PumpId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "pump {}", self.number())
    }
}

/// Tank identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TankId {
    T1,
    T2,
    T3,
}

impl TankId {
    pub const ALL: [TankId; TANK_COUNT] = [TankId::T1, TankId::T2, TankId::T3];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn number(self) -> u8 {
        self as u8 + 1
    }
}

impl core::fmt::Display for TankId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "tank {}", self.number())
    }
}

/// Interconnecting valve identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValveId {
    /// Between tank 1 and tank 2.
    V12,
    /// Between tank 2 and tank 3.
    V23,
}

impl ValveId {
    pub const fn index(self) -> usize {
        self as usize
    }

    /// `"1-2"` / `"2-3"`
    pub const fn label(self) -> &'static str {
        match self {
            Self::V12 => "1-2",
            Self::V23 => "2-3",
        }
    }
}

/// Backup route identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteId {
    /// Pump 2 fills tank 1 through valve 1-2.
    Tank1ViaPump2,
    /// Pump 3 fills tank 2 through valve 2-3.
    Tank2ViaPump3,
}

impl RouteId {
    pub const ALL: [RouteId; ROUTE_COUNT] = [RouteId::Tank1ViaPump2, RouteId::Tank2ViaPump3];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn route(self) -> BackupRoute {
        BACKUP_ROUTES[self.index()]
    }
}

impl core::fmt::Display for RouteId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let r = self.route();
        write!(f, "{} -> {}", r.primary, r.backup)
    }
}

/// A (primary pump, backup pump, connecting valve) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRoute {
    pub primary: PumpId,
    pub backup: PumpId,
    pub valve: ValveId,
}

impl BackupRoute {
    /// The tank that receives water through this route.
    pub const fn tank(&self) -> TankId {
        self.primary.tank()
    }
}

/// Route table, indexed by [`RouteId::index`].
pub const BACKUP_ROUTES: [BackupRoute; ROUTE_COUNT] = [
    BackupRoute {
        primary: PumpId::P1,
        backup: PumpId::P2,
        valve: ValveId::V12,
    },
    BackupRoute {
        primary: PumpId::P2,
        backup: PumpId::P3,
        valve: ValveId::V23,
    },
];

/// Static description handed to the artifact renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topology {
    pub pump_count: usize,
    pub tank_count: usize,
    pub routes: [BackupRoute; ROUTE_COUNT],
    pub timer_preset_secs: f32,
}

impl Topology {
    /// The plant as built: three pumps, three tanks, two routes.
    pub fn baseline(timer_preset_secs: f32) -> Self {
        Self {
            pump_count: PUMP_COUNT,
            tank_count: TANK_COUNT,
            routes: BACKUP_ROUTES,
            timer_preset_secs,
        }
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::baseline(START_DELAY_SECS)
    }
}
