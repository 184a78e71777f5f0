//! Fault supervisor.
//!
//! The policy evaluator is pure and keeps no history of its own; the
//! supervisor runs **after every scan** and compares the new latched state
//! against the previous one, turning edges into [`Transition`]s.
//!
//! ## Fault lifecycle
//!
//! 1. A pump's startup timer expires with its zero-speed input still open.
//! 2. The evaluator sets the pump's fault latch; the supervisor sees the
//!    rising edge, sets the pump's bit in its mask and reports it.
//! 3. While the latch holds, a neighbouring pump may carry the tank through
//!    a backup route.  Route edges are reported the same way.
//! 4. Fault reset with the speed signal restored drops the latch; the
//!    supervisor clears the bit.
//!
//! Multiple pumps may be faulted at once; the mask tracks each one.

use heapless::Vec;
use log::{error, info, warn};

use crate::policy::LatchedState;
use crate::topology::{PumpId, RouteId};

/// Upper bound on edges in one scan: run + 3 faults + 2 routes.
pub const MAX_TRANSITIONS: usize = 6;

/// One observed edge in the latched state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    SystemStarted,
    SystemStopped,
    FaultSet(PumpId),
    FaultCleared(PumpId),
    BackupEngaged(RouteId),
    BackupReleased(RouteId),
}

/// Edge detector over consecutive latched states.
#[derive(Debug, Default)]
pub struct FaultSupervisor {
    /// Fault bitmask as last observed (bit 0 = pump 1).
    faults: u8,
    /// Rising edges of any fault latch since power-on.
    fault_events: u32,
    /// Rising edges of any backup route since power-on.
    backup_engagements: u32,
}

impl FaultSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare two consecutive states, log and return every edge.
    pub fn observe(
        &mut self,
        prev: &LatchedState,
        next: &LatchedState,
    ) -> Vec<Transition, MAX_TRANSITIONS> {
        let mut out = Vec::new();

        match (prev.running, next.running) {
            (false, true) => {
                info!("System started");
                let _ = out.push(Transition::SystemStarted);
            }
            (true, false) => {
                info!("System stopped");
                let _ = out.push(Transition::SystemStopped);
            }
            _ => {}
        }

        for pump in PumpId::ALL {
            let mask = 1u8 << pump.index();
            match (prev.fault(pump), next.fault(pump)) {
                (false, true) => {
                    error!("SAFETY FAULT SET: {pump} zero speed");
                    self.faults |= mask;
                    self.fault_events = self.fault_events.saturating_add(1);
                    let _ = out.push(Transition::FaultSet(pump));
                }
                (true, false) => {
                    info!("SAFETY FAULT CLEARED: {pump}");
                    self.faults &= !mask;
                    let _ = out.push(Transition::FaultCleared(pump));
                }
                _ => {}
            }
        }

        for route in RouteId::ALL {
            match (prev.backup_active(route), next.backup_active(route)) {
                (false, true) => {
                    warn!("Backup engaged: {route}");
                    self.backup_engagements = self.backup_engagements.saturating_add(1);
                    let _ = out.push(Transition::BackupEngaged(route));
                }
                (true, false) => {
                    info!("Backup released: {route}");
                    let _ = out.push(Transition::BackupReleased(route));
                }
                _ => {}
            }
        }

        out
    }

    /// Current fault bitmask.
    pub fn faults(&self) -> u8 {
        self.faults
    }

    /// True if **any** pump is faulted.
    pub fn has_faults(&self) -> bool {
        self.faults != 0
    }

    pub fn has_fault(&self, pump: PumpId) -> bool {
        self.faults & (1 << pump.index()) != 0
    }

    pub fn fault_events(&self) -> u32 {
        self.fault_events
    }

    pub fn backup_engagements(&self) -> u32 {
        self.backup_engagements
    }

    /// Forget every latched bit (state reset).  Counters are kept.
    pub fn clear(&mut self) {
        self.faults = 0;
    }
}
