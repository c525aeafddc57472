//! NTC thermistor temperature estimation.
//!
//! The thermistor sits in a voltage divider with a fixed series resistor
//! and is sampled by the ESP32 ADC.  Raw counts are smoothed with an
//! exponential moving average, then converted with the Beta equation:
//!
//! ```text
//! avg  = r·sample + (1 − r)·avg
//! R    = R_series / (MAX / avg − 1)
//! 1/T  = ln(R / R_nominal) / B + 1 / T_nominal
//! ```
//!
//! The average is seeded from the first sample and never reset, so it
//! carries across heating sessions for the device lifetime.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: [`ThermistorChannel`] reads ADC1 via the oneshot API
//! (initialised by hw_init).  On host/test: reads from a static
//! `AtomicU16` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use crate::config::ThermistorConfig;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

const KELVIN_OFFSET: f32 = 273.15;

#[cfg(not(target_os = "espidf"))]
static SIM_THERMISTOR_ADC: AtomicU16 = AtomicU16::new(2048);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_thermistor_adc(raw: u16) {
    SIM_THERMISTOR_ADC.store(raw, Ordering::Relaxed);
}

// ── Estimator ─────────────────────────────────────────────────

/// Smoothed thermistor reading.
#[derive(Debug, Clone)]
pub struct TemperatureEstimator {
    cfg: ThermistorConfig,
    average: Option<f32>,
    samples: u32,
}

impl TemperatureEstimator {
    pub fn new(cfg: ThermistorConfig) -> Self {
        Self {
            cfg,
            average: None,
            samples: 0,
        }
    }

    /// Fold one raw ADC sample into the running average and return the
    /// resulting temperature estimate.
    pub fn sample(&mut self, raw: u16) -> Option<f32> {
        let raw = f32::from(raw);
        let r = self.cfg.smoothing;
        let next = match self.average {
            None => raw,
            Some(prev) => r * raw + (1.0 - r) * prev,
        };
        self.average = Some(next);
        self.samples = self.samples.saturating_add(1);
        self.celsius()
    }

    /// Current estimate, or `None` before the first sample or when the
    /// average sits at a rail (open or shorted thermistor).
    pub fn celsius(&self) -> Option<f32> {
        self.average
            .and_then(|avg| celsius_for_average(&self.cfg, avg))
    }

    /// Smoothed raw ADC value.
    pub fn average(&self) -> Option<f32> {
        self.average
    }

    pub fn sample_count(&self) -> u32 {
        self.samples
    }
}

/// Beta-equation conversion of a smoothed ADC average.
pub fn celsius_for_average(cfg: &ThermistorConfig, avg: f32) -> Option<f32> {
    if !(avg > 0.0 && avg < cfg.adc_max) {
        return None;
    }
    let resistance = cfg.series_ohms / (cfg.adc_max / avg - 1.0);
    let inv_t = (resistance / cfg.nominal_ohms).ln() / cfg.beta
        + 1.0 / (cfg.nominal_c + KELVIN_OFFSET);
    let celsius = 1.0 / inv_t - KELVIN_OFFSET;
    celsius.is_finite().then_some(celsius)
}

/// Inverse of [`celsius_for_average`]: the ADC count that reads as
/// `celsius`.  Used by the host simulation and by tests to synthesise
/// sensor input.
pub fn raw_for_celsius(cfg: &ThermistorConfig, celsius: f32) -> u16 {
    let t = celsius + KELVIN_OFFSET;
    let t0 = cfg.nominal_c + KELVIN_OFFSET;
    let resistance = cfg.nominal_ohms * (cfg.beta * (1.0 / t - 1.0 / t0)).exp();
    let avg = cfg.adc_max / (1.0 + cfg.series_ohms / resistance);
    avg.round().clamp(1.0, cfg.adc_max - 1.0) as u16
}

// ── ADC channel ───────────────────────────────────────────────

/// Raw ADC source for the thermistor divider.
pub struct ThermistorChannel {
    _adc_gpio: i32,
}

impl ThermistorChannel {
    pub fn new(adc_gpio: i32) -> Self {
        Self { _adc_gpio: adc_gpio }
    }

    #[cfg(target_os = "espidf")]
    pub fn read_raw(&self) -> u16 {
        hw_init::adc1_read(hw_init::ADC1_CH_THERMISTOR)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read_raw(&self) -> u16 {
        SIM_THERMISTOR_ADC.load(Ordering::Relaxed)
    }
}
