//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlService (domain)
//! ```
//!
//! Driven adapters (field inputs, contactors, event sinks, storage, the
//! vision model) implement these traits.  The
//! [`ControlService`](super::service::ControlService) consumes them via
//! generics, so the domain core never touches hardware directly.
//!
//! - **ConfigPort** implementations MUST validate before persisting.
//! - All port errors are typed; callers handle every variant explicitly.

use crate::config::ControllerConfig;
use crate::error::InputError;
use crate::policy::{InputSnapshot, OutputSnapshot};

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: field → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per scan.
pub trait InputPort {
    /// Read every discrete input.  An unreadable wired signal is an error,
    /// never a default.
    fn read_inputs(&mut self) -> Result<InputSnapshot, InputError>;
}

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → field)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this with the scan's output image.
pub trait OutputPort {
    fn apply(&mut self, outputs: &OutputSnapshot);

    /// De-energise every coil.
    fn all_off(&mut self) {
        self.apply(&OutputSnapshot::all_off());
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists controller configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`ControllerConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<ControllerConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &ControllerConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ persistent key-value store)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage for fault history and other blobs.
///
/// Keys are namespaced to prevent collisions between subsystems.
/// Write operations MUST be atomic: no partial writes on power loss.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Vision port (driven adapter: domain → image-understanding model)
// ───────────────────────────────────────────────────────────────

/// One request to the vision model.
#[derive(Debug, Clone, Copy)]
pub struct VisionRequest<'a> {
    /// Encoded image (PNG / JPEG bytes).
    pub image: &'a [u8],
    /// Media type of `image`, e.g. `"image/png"`.
    pub media_type: &'a str,
    /// Full instruction text.
    pub prompt: &'a str,
}

/// Sends an image plus instructions to a multimodal model and returns its
/// raw text answer.  Transport, authentication and vendor selection live
/// entirely in the adapter.
pub trait VisionPort {
    fn describe(&mut self, request: &VisionRequest<'_>) -> Result<String, VisionError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage is full, or the caller's buffer is too small.
    Full,
    /// Generic I/O error.
    IoError,
    /// A stored blob failed to decode.
    Corrupted,
}

/// Errors from [`VisionPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisionError {
    /// The image is empty or of an unsupported media type.
    UnsupportedImage,
    /// The model could not be reached.
    Unavailable,
    /// The model refused or returned an error status.
    Rejected(u16),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
            Self::Corrupted => write!(f, "stored value corrupted"),
        }
    }
}

impl core::fmt::Display for VisionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnsupportedImage => write!(f, "unsupported image"),
            Self::Unavailable => write!(f, "vision model unavailable"),
            Self::Rejected(status) => write!(f, "vision model rejected request (status {status})"),
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for StorageError {}
impl std::error::Error for VisionError {}
