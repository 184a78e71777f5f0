//! Pump/tank backup policy.
//!
//! One call to [`PolicyEvaluator::evaluate_cycle`] is one PLC scan: it takes
//! the input image plus the state left by the previous scan and returns the
//! next state together with the output image.  Nothing here does I/O or
//! reads a clock; `dt` is supplied by the caller.
//!
//! Evaluation order within a scan:
//!
//! 1. system run seal-in
//! 2. per-pump fill commands (gated by the *previous* fault latch)
//! 3. startup timers, driven by the command or an active backup duty
//! 4. zero-speed fault latches
//! 5. backup routes (using the *new* fault latches)
//! 6. outputs

pub mod latch;
pub mod state;
pub mod timer;

use serde::{Deserialize, Serialize};

pub use state::{
    InputSnapshot, LatchedState, OutputSnapshot, PumpHealth, PumpInputs, TankInputs, TimerState,
};
pub use timer::OnDelayTimer;

use crate::app::ports::ConfigError;
use crate::config::{ControllerVariant, FillMode};
use crate::error::InputError;
use crate::io::map::sym;
use crate::topology::{BACKUP_ROUTES, PUMP_COUNT, PumpId, ROUTE_COUNT, START_DELAY_SECS};

/// Parameters the evaluator needs.  A subset of
/// [`ControllerConfig`](crate::config::ControllerConfig).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub variant: ControllerVariant,
    pub timer_preset_secs: f32,
    pub fill_mode: FillMode,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            variant: ControllerVariant::Tm221Ce24t,
            timer_preset_secs: START_DELAY_SECS,
            fill_mode: FillMode::LevelSwitch,
        }
    }
}

/// Result of one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleOutcome {
    pub latched: LatchedState,
    pub timers: TimerState,
    pub outputs: OutputSnapshot,
}

/// Longest preset the microsecond timers can hold, in seconds.
const MAX_PRESET_SECS: f32 = 4000.0;

/// Stateless scan evaluator bound to one configuration.
#[derive(Debug, Clone, Copy)]
pub struct PolicyEvaluator {
    config: PolicyConfig,
    preset_us: u32,
}

impl Default for PolicyEvaluator {
    fn default() -> Self {
        let config = PolicyConfig::default();
        Self {
            preset_us: timer::secs_to_us(config.timer_preset_secs),
            config,
        }
    }
}

impl PolicyEvaluator {
    /// Bind an evaluator to `config`.
    ///
    /// A preset that is not finite, not positive, or rounds to zero
    /// microseconds is rejected: it would latch a fault on the first scan.
    pub fn new(config: PolicyConfig) -> Result<Self, ConfigError> {
        let preset = config.timer_preset_secs;
        if !preset.is_finite() || preset <= 0.0 || preset > MAX_PRESET_SECS {
            return Err(ConfigError::ValidationFailed(
                "timer_preset_secs must be positive and finite",
            ));
        }
        let preset_us = timer::secs_to_us(preset);
        if preset_us == 0 {
            return Err(ConfigError::ValidationFailed(
                "timer_preset_secs below timer resolution",
            ));
        }
        Ok(Self { config, preset_us })
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Evaluate one scan.
    ///
    /// Rejects a non-finite `dt` or one below [`timer::MIN_DT_SECS`], and on
    /// controllers that wire protection inputs, a snapshot that leaves E_STOP
    /// or an overload unset.
    ///
    /// Under [`FillMode::LevelSwitch`] (the default) the fill command is
    /// combinational, `low AND NOT high`, so a pump stops as soon as its low
    /// switch clears and there is no fill band.  Use [`FillMode::Band`] to
    /// keep filling from low until high.
    pub fn evaluate_cycle(
        &self,
        inputs: &InputSnapshot,
        prev: &LatchedState,
        prev_timers: &TimerState,
        dt: f32,
    ) -> Result<CycleOutcome, InputError> {
        if !dt.is_finite() || dt < timer::MIN_DT_SECS {
            return Err(InputError::InvalidDt(dt));
        }
        let dt_ps = timer::secs_to_ps(dt);

        let estop = self.protection(inputs.estop, sym::E_STOP)?;
        let mut overload = [false; PUMP_COUNT];
        for pump in PumpId::ALL {
            overload[pump.index()] =
                self.protection(inputs.pump(pump).overload, sym::PUMP_OL[pump.index()])?;
        }

        // 1. Run latch
        let running = latch::seal_in(prev.running, inputs.start, inputs.stop || estop);

        // 2. Fill commands
        let mut commands = [false; PUMP_COUNT];
        for pump in PumpId::ALL {
            let i = pump.index();
            let tank = *inputs.tank(pump.tank());
            let level = match self.config.fill_mode {
                FillMode::LevelSwitch => tank.low,
                FillMode::Band => tank.low || prev.commands[i],
            };
            commands[i] = running && level && !tank.high && !prev.faults[i] && !overload[i];
        }

        // 3. Startup timers
        let mut timers = *prev_timers;
        for pump in PumpId::ALL {
            let i = pump.index();
            let on_backup_duty = pump.backs_up().is_some_and(|r| prev.backup_active(r));
            timers.timers[i] =
                prev_timers.timers[i].advance_ps(commands[i] || on_backup_duty, dt_ps, self.preset_us);
        }

        // 4. Zero-speed fault latches
        let mut faults = [false; PUMP_COUNT];
        for pump in PumpId::ALL {
            let i = pump.index();
            let speed_ok = inputs.pump(pump).speed_ok;
            let set = timers.timers[i].done(self.preset_us) && !speed_ok;
            let reset = inputs.fault_reset && speed_ok;
            faults[i] = latch::set_dominant(prev.faults[i], set, reset);
        }

        // 5. Backup routes
        let mut backup = [false; ROUTE_COUNT];
        for (r, route) in BACKUP_ROUTES.iter().enumerate() {
            backup[r] = faults[route.primary.index()]
                && inputs.tank(route.tank()).needs_water()
                && !faults[route.backup.index()];
        }

        // 6. Outputs
        let mut outputs = OutputSnapshot {
            pump_run: commands,
            fault_lamp: faults,
            running_lamp: running,
            alarm: faults.iter().any(|f| *f),
            ..OutputSnapshot::default()
        };
        for (r, route) in BACKUP_ROUTES.iter().enumerate() {
            if backup[r] {
                outputs.pump_run[route.backup.index()] = true;
            }
            outputs.valve_open[route.valve.index()] = backup[r];
        }

        Ok(CycleOutcome {
            latched: LatchedState {
                running,
                faults,
                backup,
                commands,
            },
            timers,
            outputs,
        })
    }

    /// Resolve an optional protection input against the controller variant.
    fn protection(&self, value: Option<bool>, symbol: &'static str) -> Result<bool, InputError> {
        match value {
            Some(v) => Ok(v),
            None if self.config.variant.has_protection_inputs() => {
                Err(InputError::MissingSignal(symbol))
            }
            None => Ok(false),
        }
    }
}

/// Evaluate one scan with [`PolicyConfig::default`].
///
/// The default fill mode is [`FillMode::LevelSwitch`]: commands follow the
/// low switch scan by scan and hold no band between the switches.
pub fn evaluate_cycle(
    inputs: &InputSnapshot,
    prev: &LatchedState,
    prev_timers: &TimerState,
    dt: f32,
) -> Result<CycleOutcome, InputError> {
    PolicyEvaluator::default().evaluate_cycle(inputs, prev, prev_timers, dt)
}
