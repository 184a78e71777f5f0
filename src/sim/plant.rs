//! Simulated plant: three tanks with level switches, three motors with
//! zero-speed sensors, two interconnect valves and an operator panel.
//!
//! The plant sits on the far side of the I/O image.  It encodes its field
//! signals through the controller's [`IoMap`] and decodes them again, so a
//! closed-loop run exercises the same terminal table a real PLC would.
//!
//! ## Flow model
//!
//! A running pump delivers `fill_rate` into its own tank.  When it is the
//! backup on a route whose valve is open, half of that flow crosses the
//! valve into the route's tank.  Every tank loses `demand` continuously.

use serde::{Deserialize, Serialize};

use crate::app::ports::{InputPort, OutputPort};
use crate::config::ControllerVariant;
use crate::error::InputError;
use crate::io::IoMap;
use crate::policy::{InputSnapshot, OutputSnapshot, PumpInputs, TankInputs};
use crate::topology::{PUMP_COUNT, PumpId, RouteId, TANK_COUNT, TankId};

/// Physical constants of the simulated plant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantParams {
    /// Level rise per second from one pump (% of tank height).
    pub fill_rate_pct_s: f32,
    /// Level drop per second from consumption.
    pub demand_pct_s: f32,
    /// Low switch makes at or below this level.
    pub low_switch_pct: f32,
    /// High switch makes at or above this level.
    pub high_switch_pct: f32,
    /// Time from contactor close to the speed sensor reporting rotation.
    pub spin_up_secs: f32,
    pub initial_level_pct: f32,
}

impl Default for PlantParams {
    fn default() -> Self {
        Self {
            fill_rate_pct_s: 5.0,
            demand_pct_s: 1.0,
            low_switch_pct: 30.0,
            high_switch_pct: 90.0,
            spin_up_secs: 0.5,
            initial_level_pct: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Motor {
    energised_secs: f32,
    /// Contactor closes but the shaft never turns.
    seized: bool,
    overload: bool,
    /// Remaining local (HAND) run time, bypassing the contactor.
    hand_secs: f32,
}

impl Motor {
    fn speed_ok(&self, spin_up_secs: f32) -> bool {
        !self.seized && (self.hand_secs > 0.0 || self.energised_secs >= spin_up_secs)
    }
}

/// Momentary panel buttons.  Each press is seen by exactly one scan.
#[derive(Debug, Clone, Copy, Default)]
struct Panel {
    start: bool,
    stop: bool,
    fault_reset: bool,
    estop: bool,
}

pub struct Plant {
    params: PlantParams,
    map: IoMap,
    levels: [f32; TANK_COUNT],
    lowest: [f32; TANK_COUNT],
    motors: [Motor; PUMP_COUNT],
    panel: Panel,
    outputs: OutputSnapshot,
    elapsed_secs: f32,
}

impl Plant {
    pub fn new(variant: ControllerVariant, params: PlantParams) -> Self {
        Self {
            params,
            map: IoMap::for_variant(variant),
            levels: [params.initial_level_pct; TANK_COUNT],
            lowest: [params.initial_level_pct; TANK_COUNT],
            motors: [Motor::default(); PUMP_COUNT],
            panel: Panel::default(),
            outputs: OutputSnapshot::all_off(),
            elapsed_secs: 0.0,
        }
    }

    // ── Operator panel ────────────────────────────────────────

    pub fn press_start(&mut self) {
        self.panel.start = true;
    }

    pub fn press_stop(&mut self) {
        self.panel.stop = true;
    }

    pub fn press_fault_reset(&mut self) {
        self.panel.fault_reset = true;
    }

    /// Emergency stop is maintained until released.
    pub fn set_estop(&mut self, pressed: bool) {
        self.panel.estop = pressed;
    }

    // ── Fault injection ───────────────────────────────────────

    /// The motor stops turning while its contactor stays closed.
    pub fn seize_pump(&mut self, pump: PumpId) {
        self.motors[pump.index()].seized = true;
    }

    pub fn repair_pump(&mut self, pump: PumpId) {
        self.motors[pump.index()].seized = false;
    }

    /// Run the motor locally for `secs`, independent of the PLC output.
    /// A faulted pump's contactor stays open, so this is how an operator
    /// proves a repaired motor turns before pressing FAULT RESET.
    pub fn jog_pump(&mut self, pump: PumpId, secs: f32) {
        self.motors[pump.index()].hand_secs = secs.max(0.0);
    }

    pub fn set_overload(&mut self, pump: PumpId, tripped: bool) {
        self.motors[pump.index()].overload = tripped;
    }

    pub fn set_level(&mut self, tank: TankId, pct: f32) {
        let pct = pct.clamp(0.0, 100.0);
        self.levels[tank.index()] = pct;
        self.lowest[tank.index()] = pct;
    }

    // ── Physics ───────────────────────────────────────────────

    /// Advance the plant by `dt` seconds under the last applied outputs.
    pub fn step(&mut self, dt: f32) {
        let p = self.params;
        self.elapsed_secs += dt;

        let mut inflow = [0.0_f32; TANK_COUNT];
        for pump in PumpId::ALL {
            let i = pump.index();
            let motor = &mut self.motors[i];
            if self.outputs.pump_run[i] {
                motor.energised_secs += dt;
            } else {
                motor.energised_secs = 0.0;
            }
            let turning = motor.speed_ok(p.spin_up_secs);
            motor.hand_secs = (motor.hand_secs - dt).max(0.0);
            if !turning {
                continue;
            }

            let flow = p.fill_rate_pct_s * dt;
            match pump.backs_up() {
                Some(route) if self.outputs.valve_open[route.route().valve.index()] => {
                    inflow[i] += flow / 2.0;
                    inflow[route.route().tank().index()] += flow / 2.0;
                }
                _ => inflow[i] += flow,
            }
        }

        for tank in TankId::ALL {
            let i = tank.index();
            let level = (self.levels[i] + inflow[i] - p.demand_pct_s * dt).clamp(0.0, 100.0);
            self.levels[i] = level;
            self.lowest[i] = self.lowest[i].min(level);
        }
    }

    // ── Observation ───────────────────────────────────────────

    pub fn level(&self, tank: TankId) -> f32 {
        self.levels[tank.index()]
    }

    /// Lowest level seen since construction or the last `set_level`.
    pub fn lowest_level(&self, tank: TankId) -> f32 {
        self.lowest[tank.index()]
    }

    pub fn last_outputs(&self) -> &OutputSnapshot {
        &self.outputs
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed_secs
    }

    /// Field signals as the terminals present them, before the I/O image.
    pub fn field_inputs(&self) -> InputSnapshot {
        let p = &self.params;
        let protection = self.map.variant().has_protection_inputs();

        let mut pumps = [PumpInputs::default(); PUMP_COUNT];
        for (i, m) in self.motors.iter().enumerate() {
            pumps[i] = PumpInputs {
                speed_ok: m.speed_ok(p.spin_up_secs),
                overload: protection.then_some(m.overload),
            };
        }
        let mut tanks = [TankInputs::default(); TANK_COUNT];
        for (i, level) in self.levels.iter().enumerate() {
            tanks[i] = TankInputs {
                low: *level <= p.low_switch_pct,
                high: *level >= p.high_switch_pct,
            };
        }

        InputSnapshot {
            start: self.panel.start,
            stop: self.panel.stop,
            estop: protection.then_some(self.panel.estop),
            fault_reset: self.panel.fault_reset,
            pumps,
            tanks,
        }
    }

    /// Routes whose valve is currently open.
    pub fn open_routes(&self) -> impl Iterator<Item = RouteId> + '_ {
        RouteId::ALL
            .into_iter()
            .filter(|r| self.outputs.valve_open[r.route().valve.index()])
    }
}

impl InputPort for Plant {
    fn read_inputs(&mut self) -> Result<InputSnapshot, InputError> {
        let image = self.map.encode_inputs(&self.field_inputs());
        let estop = self.panel.estop;
        self.panel = Panel {
            estop,
            ..Panel::default()
        };
        self.map.read_inputs(&image)
    }
}

impl OutputPort for Plant {
    fn apply(&mut self, outputs: &OutputSnapshot) {
        self.outputs = *outputs;
    }
}
