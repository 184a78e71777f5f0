//! Terminal assignments for the two supported controllers.
//!
//! Single source of truth for addresses and symbols: the policy, the pin
//! adapters and the artifact renderer all look signals up here rather than
//! hard-coding `%I0.x` strings.

use super::image::IoImage;
use crate::config::ControllerVariant;
use crate::error::InputError;
use crate::policy::{InputSnapshot, OutputSnapshot, PumpInputs, TankInputs};
use crate::topology::{PUMP_COUNT, PumpId, RouteId, TANK_COUNT, TankId};

/// Signal symbols.
pub mod sym {
    pub const START_BTN: &str = "START_BTN";
    pub const STOP_BTN: &str = "STOP_BTN";
    pub const E_STOP: &str = "E_STOP";
    pub const FAULT_RESET: &str = "FAULT_RESET";
    pub const PUMP_SPEED_OK: [&str; 3] = ["PUMP1_SPEED_OK", "PUMP2_SPEED_OK", "PUMP3_SPEED_OK"];
    pub const PUMP_OL: [&str; 3] = ["PUMP1_OL", "PUMP2_OL", "PUMP3_OL"];
    pub const TANK_LOW: [&str; 3] = ["TANK1_LOW", "TANK2_LOW", "TANK3_LOW"];
    pub const TANK_HIGH: [&str; 3] = ["TANK1_HIGH", "TANK2_HIGH", "TANK3_HIGH"];

    pub const PUMP_RUN: [&str; 3] = ["PUMP1_RUN", "PUMP2_RUN", "PUMP3_RUN"];
    pub const VALVE: [&str; 2] = ["VALVE_12", "VALVE_23"];
    /// Wired on the 40-point controller, driven by no rule.
    pub const VALVE_13: &str = "VALVE_13";
    pub const PUMP_FAULT_IND: [&str; 3] = ["PUMP1_FAULT_IND", "PUMP2_FAULT_IND", "PUMP3_FAULT_IND"];
    pub const SYSTEM_RUN_IND: &str = "SYSTEM_RUN_IND";
    pub const ALARM_OUTPUT: &str = "ALARM_OUTPUT";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// Field contact type, as documented on the wiring diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    NormallyOpen,
    NormallyClosed,
}

impl Contact {
    pub const fn abbrev(self) -> &'static str {
        match self {
            Self::NormallyOpen => "NO",
            Self::NormallyClosed => "NC",
        }
    }
}

/// One terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoPoint {
    /// `%I0.n` / `%Q0.n`
    pub address: &'static str,
    pub symbol: &'static str,
    pub description: &'static str,
    pub contact: Contact,
}

impl IoPoint {
    const fn no(address: &'static str, symbol: &'static str, description: &'static str) -> Self {
        Self {
            address,
            symbol,
            description,
            contact: Contact::NormallyOpen,
        }
    }

    const fn nc(address: &'static str, symbol: &'static str, description: &'static str) -> Self {
        Self {
            address,
            symbol,
            description,
            contact: Contact::NormallyClosed,
        }
    }

    /// Bit index within the `%I0` / `%Q0` word.
    pub fn index(&self) -> Option<u8> {
        self.address.rsplit('.').next()?.parse().ok()
    }
}

// ---------------------------------------------------------------------------
// TM221CE24T
// ---------------------------------------------------------------------------

static INPUTS_24T: [IoPoint; 12] = [
    IoPoint::no("%I0.0", sym::START_BTN, "System Start Button"),
    IoPoint::nc("%I0.1", sym::STOP_BTN, "System Stop Button"),
    IoPoint::nc("%I0.2", sym::PUMP_SPEED_OK[0], "Pump 1 Zero Speed Sensor"),
    IoPoint::nc("%I0.3", sym::PUMP_SPEED_OK[1], "Pump 2 Zero Speed Sensor"),
    IoPoint::nc("%I0.4", sym::PUMP_SPEED_OK[2], "Pump 3 Zero Speed Sensor"),
    IoPoint::no("%I0.5", sym::TANK_LOW[0], "Tank 1 Low Level Switch"),
    IoPoint::no("%I0.6", sym::TANK_HIGH[0], "Tank 1 High Level Switch"),
    IoPoint::no("%I0.7", sym::TANK_LOW[1], "Tank 2 Low Level Switch"),
    IoPoint::no("%I0.8", sym::TANK_HIGH[1], "Tank 2 High Level Switch"),
    IoPoint::no("%I0.9", sym::TANK_LOW[2], "Tank 3 Low Level Switch"),
    IoPoint::no("%I0.10", sym::TANK_HIGH[2], "Tank 3 High Level Switch"),
    IoPoint::no("%I0.11", sym::FAULT_RESET, "Fault Reset Button"),
];

static OUTPUTS_24T: [IoPoint; 10] = [
    IoPoint::no("%Q0.0", sym::PUMP_RUN[0], "Pump 1 Motor Contactor"),
    IoPoint::no("%Q0.1", sym::PUMP_RUN[1], "Pump 2 Motor Contactor"),
    IoPoint::no("%Q0.2", sym::PUMP_RUN[2], "Pump 3 Motor Contactor"),
    IoPoint::no("%Q0.3", sym::VALVE[0], "Valve between Tank 1 and Tank 2"),
    IoPoint::no("%Q0.4", sym::VALVE[1], "Valve between Tank 2 and Tank 3"),
    IoPoint::no("%Q0.5", sym::PUMP_FAULT_IND[0], "Pump 1 Fault Indicator"),
    IoPoint::no("%Q0.6", sym::PUMP_FAULT_IND[1], "Pump 2 Fault Indicator"),
    IoPoint::no("%Q0.7", sym::PUMP_FAULT_IND[2], "Pump 3 Fault Indicator"),
    IoPoint::no("%Q0.8", sym::SYSTEM_RUN_IND, "System Running Indicator"),
    IoPoint::no("%Q0.9", sym::ALARM_OUTPUT, "General Alarm Horn"),
];

// ---------------------------------------------------------------------------
// TM221CE40T
// ---------------------------------------------------------------------------

static INPUTS_40T: [IoPoint; 16] = [
    IoPoint::no("%I0.0", sym::START_BTN, "System Start Button"),
    IoPoint::nc("%I0.1", sym::STOP_BTN, "System Stop Button"),
    IoPoint::nc("%I0.2", sym::E_STOP, "Emergency Stop"),
    IoPoint::nc("%I0.3", sym::PUMP_SPEED_OK[0], "Pump 1 Zero Speed Sensor"),
    IoPoint::nc("%I0.4", sym::PUMP_SPEED_OK[1], "Pump 2 Zero Speed Sensor"),
    IoPoint::nc("%I0.5", sym::PUMP_SPEED_OK[2], "Pump 3 Zero Speed Sensor"),
    IoPoint::no("%I0.6", sym::TANK_LOW[0], "Tank 1 Low Level Switch"),
    IoPoint::no("%I0.7", sym::TANK_HIGH[0], "Tank 1 High Level Switch"),
    IoPoint::no("%I0.8", sym::TANK_LOW[1], "Tank 2 Low Level Switch"),
    IoPoint::no("%I0.9", sym::TANK_HIGH[1], "Tank 2 High Level Switch"),
    IoPoint::no("%I0.10", sym::TANK_LOW[2], "Tank 3 Low Level Switch"),
    IoPoint::no("%I0.11", sym::TANK_HIGH[2], "Tank 3 High Level Switch"),
    IoPoint::nc("%I0.12", sym::PUMP_OL[0], "Pump 1 Overload"),
    IoPoint::nc("%I0.13", sym::PUMP_OL[1], "Pump 2 Overload"),
    IoPoint::nc("%I0.14", sym::PUMP_OL[2], "Pump 3 Overload"),
    IoPoint::no("%I0.15", sym::FAULT_RESET, "Fault Reset Button"),
];

static OUTPUTS_40T: [IoPoint; 11] = [
    IoPoint::no("%Q0.0", sym::PUMP_RUN[0], "Pump 1 Motor Contactor"),
    IoPoint::no("%Q0.1", sym::PUMP_RUN[1], "Pump 2 Motor Contactor"),
    IoPoint::no("%Q0.2", sym::PUMP_RUN[2], "Pump 3 Motor Contactor"),
    IoPoint::no("%Q0.3", sym::VALVE[0], "Valve between Tank 1 and Tank 2"),
    IoPoint::no("%Q0.4", sym::VALVE[1], "Valve between Tank 2 and Tank 3"),
    IoPoint::no("%Q0.5", sym::VALVE_13, "Valve between Tank 1 and Tank 3"),
    IoPoint::no("%Q0.6", sym::PUMP_FAULT_IND[0], "Pump 1 Fault Indicator"),
    IoPoint::no("%Q0.7", sym::PUMP_FAULT_IND[1], "Pump 2 Fault Indicator"),
    IoPoint::no("%Q0.8", sym::PUMP_FAULT_IND[2], "Pump 3 Fault Indicator"),
    IoPoint::no("%Q0.9", sym::SYSTEM_RUN_IND, "System Running Indicator"),
    IoPoint::no("%Q0.10", sym::ALARM_OUTPUT, "General Alarm Horn"),
];

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

/// Terminal table for one controller variant.
#[derive(Debug, Clone, Copy)]
pub struct IoMap {
    variant: ControllerVariant,
    inputs: &'static [IoPoint],
    outputs: &'static [IoPoint],
}

impl IoMap {
    pub fn for_variant(variant: ControllerVariant) -> Self {
        match variant {
            ControllerVariant::Tm221Ce24t => Self {
                variant,
                inputs: &INPUTS_24T,
                outputs: &OUTPUTS_24T,
            },
            ControllerVariant::Tm221Ce40t => Self {
                variant,
                inputs: &INPUTS_40T,
                outputs: &OUTPUTS_40T,
            },
        }
    }

    pub fn variant(&self) -> ControllerVariant {
        self.variant
    }

    pub fn inputs(&self) -> &'static [IoPoint] {
        self.inputs
    }

    pub fn outputs(&self) -> &'static [IoPoint] {
        self.outputs
    }

    /// Look a symbol up in either direction.
    pub fn point(&self, symbol: &str) -> Option<(Direction, &'static IoPoint)> {
        if let Some(p) = self.inputs.iter().find(|p| p.symbol == symbol) {
            return Some((Direction::Input, p));
        }
        self.outputs
            .iter()
            .find(|p| p.symbol == symbol)
            .map(|p| (Direction::Output, p))
    }

    /// Address of a wired symbol, e.g. `"TANK1_LOW"` → `"%I0.5"` on the 24T.
    pub fn address(&self, symbol: &str) -> Option<&'static str> {
        self.point(symbol).map(|(_, p)| p.address)
    }

    pub fn is_wired(&self, symbol: &str) -> bool {
        self.point(symbol).is_some()
    }

    /// Decode an input image.
    ///
    /// Every wired input must be present.  E-stop and overload bits on a
    /// controller that does not wire them are passed through if supplied.
    pub fn read_inputs(&self, image: &IoImage) -> Result<InputSnapshot, InputError> {
        let required = |symbol: &'static str| image.get(symbol).ok_or(InputError::MissingSignal(symbol));
        let optional = |symbol: &'static str| -> Result<Option<bool>, InputError> {
            if self.is_wired(symbol) {
                required(symbol).map(Some)
            } else {
                Ok(image.get(symbol))
            }
        };

        let mut pumps = [PumpInputs::default(); PUMP_COUNT];
        for pump in PumpId::ALL {
            let i = pump.index();
            pumps[i] = PumpInputs {
                speed_ok: required(sym::PUMP_SPEED_OK[i])?,
                overload: optional(sym::PUMP_OL[i])?,
            };
        }
        let mut tanks = [TankInputs::default(); TANK_COUNT];
        for tank in TankId::ALL {
            let i = tank.index();
            tanks[i] = TankInputs {
                low: required(sym::TANK_LOW[i])?,
                high: required(sym::TANK_HIGH[i])?,
            };
        }

        Ok(InputSnapshot {
            start: required(sym::START_BTN)?,
            stop: required(sym::STOP_BTN)?,
            estop: optional(sym::E_STOP)?,
            fault_reset: required(sym::FAULT_RESET)?,
            pumps,
            tanks,
        })
    }

    /// Encode an input snapshot.  Only wired symbols are written.
    pub fn encode_inputs(&self, inputs: &InputSnapshot) -> IoImage {
        let mut image = IoImage::new();
        image.set(sym::START_BTN, inputs.start);
        image.set(sym::STOP_BTN, inputs.stop);
        image.set(sym::FAULT_RESET, inputs.fault_reset);
        if self.is_wired(sym::E_STOP) {
            image.set(sym::E_STOP, inputs.estop.unwrap_or(false));
        }
        for pump in PumpId::ALL {
            let i = pump.index();
            image.set(sym::PUMP_SPEED_OK[i], inputs.pumps[i].speed_ok);
            if self.is_wired(sym::PUMP_OL[i]) {
                image.set(sym::PUMP_OL[i], inputs.pumps[i].overload.unwrap_or(false));
            }
        }
        for tank in TankId::ALL {
            let i = tank.index();
            image.set(sym::TANK_LOW[i], inputs.tanks[i].low);
            image.set(sym::TANK_HIGH[i], inputs.tanks[i].high);
        }
        image
    }

    /// Encode an output snapshot.  Every wired output gets a bit, including
    /// spare coils no rule drives.
    pub fn write_outputs(&self, outputs: &OutputSnapshot) -> IoImage {
        let mut image = IoImage::new();
        for pump in PumpId::ALL {
            let i = pump.index();
            image.set(sym::PUMP_RUN[i], outputs.pump_run[i]);
            image.set(sym::PUMP_FAULT_IND[i], outputs.fault_lamp[i]);
        }
        for route in RouteId::ALL {
            let valve = route.route().valve.index();
            image.set(sym::VALVE[valve], outputs.valve_open[valve]);
        }
        image.set(sym::SYSTEM_RUN_IND, outputs.running_lamp);
        image.set(sym::ALARM_OUTPUT, outputs.alarm);
        if self.is_wired(sym::VALVE_13) {
            image.set(sym::VALVE_13, false);
        }
        image
    }
}
