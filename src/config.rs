//! Controller configuration parameters
//!
//! All tunable parameters for the tankguard controller.
//! Values can be overridden from a JSON file (CLI) or the persistent store.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::policy::PolicyConfig;
use crate::topology::START_DELAY_SECS;

/// Target PLC.  Decides which optional signals are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerVariant {
    /// TM221CE24T: 14 DI / 10 DO.  No emergency stop, no overload contacts.
    Tm221Ce24t,
    /// TM221CE40T: 24 DI / 16 DO.  Adds E_STOP and per-pump overloads.
    Tm221Ce40t,
}

impl ControllerVariant {
    pub const fn model(self) -> &'static str {
        match self {
            Self::Tm221Ce24t => "TM221CE24T",
            Self::Tm221Ce40t => "TM221CE40T",
        }
    }

    pub const fn digital_inputs(self) -> usize {
        match self {
            Self::Tm221Ce24t => 14,
            Self::Tm221Ce40t => 24,
        }
    }

    pub const fn digital_outputs(self) -> usize {
        match self {
            Self::Tm221Ce24t => 10,
            Self::Tm221Ce40t => 16,
        }
    }

    /// Emergency stop and overload contacts are wired.
    pub const fn has_protection_inputs(self) -> bool {
        matches!(self, Self::Tm221Ce40t)
    }
}

/// How the per-pump fill command follows the tank level switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillMode {
    /// Command follows `low AND NOT high` every scan (the shipped rung).
    LevelSwitch,
    /// Command seals in at low and holds until high.
    Band,
}

/// Core controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    // --- Target ---
    /// Controller model the program is built for
    pub variant: ControllerVariant,
    /// Project / POU base name used in rendered artifacts
    pub project_name: heapless::String<32>,

    // --- Control ---
    /// Pump startup grace period before the zero-speed check (seconds)
    pub timer_preset_secs: f32,
    /// Fill command behaviour
    pub fill_mode: FillMode,

    // --- Timing ---
    /// MAST task interval (milliseconds)
    pub scan_interval_ms: u32,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        let mut project_name = heapless::String::new();
        let _ = project_name.push_str("Pump_Tank_Backup");

        Self {
            variant: ControllerVariant::Tm221Ce24t,
            project_name,

            timer_preset_secs: START_DELAY_SECS,
            fill_mode: FillMode::LevelSwitch,

            scan_interval_ms: 10,      // 100 Hz MAST task
            telemetry_interval_secs: 5,
        }
    }
}

impl ControllerConfig {
    /// Evaluator parameters carried by this configuration.
    pub fn policy(&self) -> PolicyConfig {
        PolicyConfig {
            variant: self.variant,
            timer_preset_secs: self.timer_preset_secs,
            fill_mode: self.fill_mode,
        }
    }

    /// Scan interval in seconds.
    pub fn scan_secs(&self) -> f32 {
        self.scan_interval_ms as f32 / 1000.0
    }
}

/// Range-check every field.  Out-of-range values are rejected, never clamped.
pub fn validate_config(cfg: &ControllerConfig) -> Result<(), ConfigError> {
    if !cfg.timer_preset_secs.is_finite() || !(0.1..=60.0).contains(&cfg.timer_preset_secs) {
        return Err(ConfigError::ValidationFailed(
            "timer_preset_secs must be 0.1–60",
        ));
    }
    if !(1..=1000).contains(&cfg.scan_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "scan_interval_ms must be 1–1000",
        ));
    }
    if !(1..=3600).contains(&cfg.telemetry_interval_secs) {
        return Err(ConfigError::ValidationFailed(
            "telemetry_interval_secs must be 1–3600",
        ));
    }
    if cfg.project_name.is_empty()
        || !cfg
            .project_name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
    {
        return Err(ConfigError::ValidationFailed(
            "project_name must be non-empty [A-Za-z0-9_]",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = ControllerConfig::default();
        assert!(validate_config(&c).is_ok());
        assert!((c.timer_preset_secs - 2.0).abs() < f32::EPSILON);
        assert_eq!(c.scan_interval_ms, 10);
        assert_eq!(c.variant, ControllerVariant::Tm221Ce24t);
    }

    #[test]
    fn serde_roundtrip() {
        let c = ControllerConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: ControllerConfig = serde_json::from_str(&json).unwrap();
        assert!((c.timer_preset_secs - c2.timer_preset_secs).abs() < 0.001);
        assert_eq!(c.fill_mode, c2.fill_mode);
        assert_eq!(c.project_name, c2.project_name);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = ControllerConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: ControllerConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.variant, c2.variant);
        assert_eq!(c.scan_interval_ms, c2.scan_interval_ms);
    }

    #[test]
    fn rejects_zero_preset_and_bad_names() {
        let mut c = ControllerConfig::default();
        c.timer_preset_secs = 0.0;
        assert!(matches!(
            validate_config(&c),
            Err(ConfigError::ValidationFailed(_))
        ));

        let mut c = ControllerConfig::default();
        c.project_name.clear();
        let _ = c.project_name.push_str("bad name");
        assert!(validate_config(&c).is_err());
    }

    #[test]
    fn scan_interval_must_be_faster_than_the_grace_period() {
        let c = ControllerConfig::default();
        assert!(
            c.scan_secs() < c.timer_preset_secs,
            "a scan longer than the startup delay would skip the grace period"
        );
    }

    #[test]
    fn variant_io_counts_match_the_catalogue() {
        assert_eq!(ControllerVariant::Tm221Ce24t.digital_inputs(), 14);
        assert_eq!(ControllerVariant::Tm221Ce40t.digital_outputs(), 16);
        assert!(!ControllerVariant::Tm221Ce24t.has_protection_inputs());
    }
}
