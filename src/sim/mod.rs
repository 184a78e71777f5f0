//! Closed-loop simulation: a [`ControlService`] scanning a simulated [`Plant`].

pub mod plant;

pub use plant::{Plant, PlantParams};

use crate::adapters::store::MemoryStore;
use crate::app::ports::{ConfigError, EventSink};
use crate::app::service::ControlService;
use crate::config::ControllerConfig;
use crate::error::InputError;
use crate::topology::TankId;

/// Controller, plant and backing store stepped together at a fixed interval.
pub struct Simulation {
    pub service: ControlService,
    pub plant: Plant,
    pub store: MemoryStore,
    dt: f32,
}

impl Simulation {
    /// Start a controller for `config` against a fresh plant.
    pub fn new(
        config: ControllerConfig,
        params: PlantParams,
        sink: &mut impl EventSink,
    ) -> Result<Self, ConfigError> {
        let dt = config.scan_secs();
        let plant = Plant::new(config.variant, params);
        let store = MemoryStore::new();
        let mut service = ControlService::new(config)?;
        service.start(&store, sink);
        Ok(Self {
            service,
            plant,
            store,
            dt,
        })
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// One scan followed by one physics step.
    pub fn tick(&mut self, sink: &mut impl EventSink) -> Result<(), InputError> {
        self.service
            .scan(&mut self.plant, sink, &mut self.store, self.dt)?;
        self.plant.step(self.dt);
        Ok(())
    }

    /// Tick for `secs` of simulated time.
    pub fn run_for(&mut self, secs: f32, sink: &mut impl EventSink) -> Result<(), InputError> {
        let ticks = (secs / self.dt).round() as u64;
        for _ in 0..ticks {
            self.tick(sink)?;
        }
        Ok(())
    }

    pub fn levels(&self) -> [f32; 3] {
        TankId::ALL.map(|t| self.plant.level(t))
    }
}
