//! Unified error types for the tankguard controller.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! caller's error handling uniform.  All variants are `Copy` so they can be
//! passed through the control service without allocation.

use core::fmt;

use crate::app::ports::{ConfigError, StorageError};

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// A scan was requested with malformed input.
    Input(InputError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// Persistent storage failed.
    Storage(StorageError),
    /// An artifact could not be produced.
    Render(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(e) => write!(f, "input: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Render(msg) => write!(f, "render: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Input errors
// ---------------------------------------------------------------------------

/// Rejection of a scan request.  The evaluator never guesses a value for a
/// malformed input: a missing sensor in a pump/tank system must surface as a
/// wiring fault, not be papered over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputError {
    /// Scan interval was not finite or below the 1 ps timer resolution.
    InvalidDt(f32),
    /// A signal the controller variant wires was not supplied.
    /// Carries the signal's symbol (e.g. `"E_STOP"`).
    MissingSignal(&'static str),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDt(dt) => write!(f, "scan interval must be at least 1 ps, got {dt}"),
            Self::MissingSignal(sym) => write!(f, "required signal {sym} not supplied"),
        }
    }
}

impl std::error::Error for InputError {}

impl From<InputError> for Error {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
