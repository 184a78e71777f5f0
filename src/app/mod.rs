//! Application core — orchestration around the pure policy evaluator.
//!
//! The [`service::ControlService`] owns the latched state between scans,
//! turns latch edges into events and fault-history entries, and answers
//! maintenance commands.  All interaction with the field happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real terminals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
