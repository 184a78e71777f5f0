//! tankguard library.
//!
//! Pump/tank backup control for a three-pump, three-tank water system on a
//! TM221 controller: the scan-by-scan policy evaluator, the control service
//! that runs it against field I/O, the PLC artifact renderer, a sketch
//! analyzer for hand-drawn ladder diagrams and a plant simulator.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod io;
pub mod policy;
pub mod program;
pub mod safety;
pub mod sim;
pub mod topology;
pub mod vision;

pub use error::{Error, InputError};
