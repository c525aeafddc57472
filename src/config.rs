//! Kettle configuration parameters
//!
//! All tunable parameters for the kettle controller.  Defaults match the
//! production board; a JSON override can be baked into the firmware image
//! through the `KETTLE_CONFIG_JSON` build-time environment variable.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Soft access point SSID used for provisioning and the diagnostic fallback.
pub const DEFAULT_ACCESS_POINT_NAME: &str = "Kettle";

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KettleConfig {
    // --- Heating ---
    /// Temperature (Celsius) at which a heating session completes
    pub target_temperature_c: f32,
    /// Maximum heating session length (milliseconds) before the session faults
    pub heating_timeout_ms: u32,
    /// Cool-down period after a completed session (milliseconds)
    pub cooldown_ms: u32,
    /// Delay between the start press and the interlock check (milliseconds)
    pub start_delay_ms: u32,

    // --- Safety ---
    /// Re-read mug/water levels on every heating tick in addition to the
    /// edge interrupts.
    pub poll_interlocks: bool,

    // --- Telemetry ---
    /// Broadcast `DEBUG,STATE,<n>` and `SENSORS,THERMISTOR,<c>` frames.
    pub debug_broadcasts: bool,

    // --- Timing ---
    /// Polling loop period (milliseconds)
    pub loop_interval_ms: u32,

    // --- Network ---
    /// SSID advertised by the provisioning / diagnostic access point
    pub access_point_name: heapless::String<32>,

    // --- Sensor ---
    pub thermistor: ThermistorConfig,
}

/// Divider and material constants for the NTC thermistor channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermistorConfig {
    /// Fixed divider resistor (ohms)
    pub series_ohms: f32,
    /// Thermistor resistance at `nominal_c` (ohms)
    pub nominal_ohms: f32,
    /// Beta coefficient (K)
    pub beta: f32,
    /// Reference temperature for `nominal_ohms` (Celsius)
    pub nominal_c: f32,
    /// Full-scale ADC count
    pub adc_max: f32,
    /// Exponential moving average weight of the newest sample (0, 1]
    pub smoothing: f32,
}

impl Default for ThermistorConfig {
    fn default() -> Self {
        Self {
            series_ohms: 10_000.0,
            nominal_ohms: 1_100.0,
            beta: 3_950.0,
            nominal_c: 25.0,
            adc_max: 4_096.0,
            smoothing: 0.05,
        }
    }
}

impl Default for KettleConfig {
    fn default() -> Self {
        Self {
            // Heating
            target_temperature_c: 40.0,
            heating_timeout_ms: 100_000,
            cooldown_ms: 100_000,
            start_delay_ms: 2_000,

            // Safety
            poll_interlocks: true,

            // Telemetry
            debug_broadcasts: false,

            // Timing
            loop_interval_ms: 10,

            // Network
            access_point_name: heapless::String::try_from(DEFAULT_ACCESS_POINT_NAME)
                .unwrap_or_default(),

            thermistor: ThermistorConfig::default(),
        }
    }
}

/// Errors from loading or validating a [`KettleConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    Malformed,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "config JSON malformed"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl KettleConfig {
    /// Parse a (possibly partial) JSON document; missing fields keep their
    /// defaults.  The result is validated before it is returned.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(20.0..=100.0).contains(&self.target_temperature_c) {
            return Err(ConfigError::ValidationFailed(
                "target_temperature_c must be 20.0–100.0",
            ));
        }
        if !(1_000..=600_000).contains(&self.heating_timeout_ms) {
            return Err(ConfigError::ValidationFailed(
                "heating_timeout_ms must be 1000–600000",
            ));
        }
        if self.cooldown_ms > 600_000 {
            return Err(ConfigError::ValidationFailed(
                "cooldown_ms must be at most 600000",
            ));
        }
        if !(100..=10_000).contains(&self.start_delay_ms) {
            return Err(ConfigError::ValidationFailed(
                "start_delay_ms must be 100–10000",
            ));
        }
        if !(1..=1_000).contains(&self.loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "loop_interval_ms must be 1–1000",
            ));
        }
        if self.access_point_name.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "access_point_name must not be empty",
            ));
        }
        self.thermistor.validate()
    }
}

impl ThermistorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.series_ohms <= 0.0 || self.nominal_ohms <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "thermistor resistances must be positive",
            ));
        }
        if self.beta <= 0.0 {
            return Err(ConfigError::ValidationFailed("thermistor beta must be positive"));
        }
        if self.adc_max < 2.0 {
            return Err(ConfigError::ValidationFailed("thermistor adc_max must be >= 2"));
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(ConfigError::ValidationFailed(
                "thermistor smoothing must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = KettleConfig::default();
        assert!(c.validate().is_ok());
        assert!((c.target_temperature_c - 40.0).abs() < f32::EPSILON);
        assert_eq!(c.heating_timeout_ms, 100_000);
        assert_eq!(c.cooldown_ms, 100_000);
        assert_eq!(c.start_delay_ms, 2_000);
        assert_eq!(c.access_point_name.as_str(), "Kettle");
    }

    #[test]
    fn serde_roundtrip() {
        let c = KettleConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: KettleConfig = serde_json::from_str(&json).unwrap();
        assert!((c.target_temperature_c - c2.target_temperature_c).abs() < 0.001);
        assert_eq!(c.heating_timeout_ms, c2.heating_timeout_ms);
        assert_eq!(c.thermistor, c2.thermistor);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = KettleConfig::from_json(r#"{"heating_timeout_ms": 5000}"#).unwrap();
        assert_eq!(c.heating_timeout_ms, 5_000);
        assert_eq!(c.cooldown_ms, 100_000);
        assert!((c.thermistor.beta - 3_950.0).abs() < f32::EPSILON);
    }

    #[test]
    fn rebuild_variant_target_is_accepted() {
        let c = KettleConfig::from_json(r#"{"target_temperature_c": 70.0}"#).unwrap();
        assert!((c.target_temperature_c - 70.0).abs() < f32::EPSILON);
    }

    #[test]
    fn rejects_malformed_json() {
        assert_eq!(KettleConfig::from_json("{not json"), Err(ConfigError::Malformed));
    }

    #[test]
    fn rejects_target_above_boiling() {
        let c = KettleConfig {
            target_temperature_c: 120.0,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::ValidationFailed(_))));
    }

    #[test]
    fn rejects_zero_smoothing() {
        let mut c = KettleConfig::default();
        c.thermistor.smoothing = 0.0;
        assert!(matches!(c.validate(), Err(ConfigError::ValidationFailed(_))));
    }

    #[test]
    fn rejects_empty_access_point_name() {
        let c = KettleConfig {
            access_point_name: heapless::String::new(),
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::ValidationFailed(_))));
    }
}
