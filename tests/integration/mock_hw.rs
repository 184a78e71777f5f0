//! Mock field I/O for integration tests.
//!
//! Serves a scripted input snapshot each scan and records every output
//! image the service applies, so tests can assert on the full history
//! without a controller.

use tankguard::app::ports::{InputPort, OutputPort, StorageError, StoragePort};
use tankguard::error::InputError;
use tankguard::policy::{InputSnapshot, OutputSnapshot};
use tankguard::topology::{PumpId, TankId};

// ── Output call record ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum OutputCall {
    Apply(OutputSnapshot),
    AllOff,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub inputs: InputSnapshot,
    /// Returned instead of `inputs` while set.
    pub read_error: Option<InputError>,
    pub calls: Vec<OutputCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            inputs: InputSnapshot::default(),
            read_error: None,
            calls: Vec::new(),
        }
    }

    /// Every motor turning, tank 1 calling for water.
    pub fn healthy_tank_one_low() -> Self {
        let mut hw = Self::new();
        for p in &mut hw.inputs.pumps {
            p.speed_ok = true;
        }
        hw.inputs.tank_mut(TankId::T1).low = true;
        hw
    }

    pub fn stall(&mut self, pump: PumpId) {
        self.inputs.pump_mut(pump).speed_ok = false;
    }

    pub fn last_outputs(&self) -> Option<OutputSnapshot> {
        self.calls.iter().rev().find_map(|c| match c {
            OutputCall::Apply(o) => Some(*o),
            OutputCall::AllOff => Some(OutputSnapshot::all_off()),
        })
    }

    pub fn pump_on(&self, pump: PumpId) -> bool {
        self.last_outputs().is_some_and(|o| o.pump(pump))
    }
}

impl InputPort for MockHardware {
    fn read_inputs(&mut self) -> Result<InputSnapshot, InputError> {
        let snapshot = self.inputs;
        // Pushbuttons are momentary.
        self.inputs.start = false;
        self.inputs.fault_reset = false;
        match self.read_error {
            Some(e) => Err(e),
            None => Ok(snapshot),
        }
    }
}

impl OutputPort for MockHardware {
    fn apply(&mut self, outputs: &OutputSnapshot) {
        self.calls.push(OutputCall::Apply(*outputs));
    }

    fn all_off(&mut self) {
        self.calls.push(OutputCall::AllOff);
    }
}

// ── Storage that refuses writes ───────────────────────────────

pub struct FullStorage;

impl StoragePort for FullStorage {
    fn read(&self, _ns: &str, _key: &str, _buf: &mut [u8]) -> Result<usize, StorageError> {
        Err(StorageError::NotFound)
    }

    fn write(&mut self, _ns: &str, _key: &str, _data: &[u8]) -> Result<(), StorageError> {
        Err(StorageError::Full)
    }

    fn delete(&mut self, _ns: &str, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn exists(&self, _ns: &str, _key: &str) -> bool {
        false
    }
}
