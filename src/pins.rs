//! GPIO / peripheral pin assignments for the kettle base board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Switch inputs (internal pull-up)
// ---------------------------------------------------------------------------

/// Momentary start switch.  Rising edge requests a heating session.
pub const START_SWITCH_GPIO: i32 = 1;
/// Mug contact switch.  HIGH = mug on the plate.
pub const MUG_SWITCH_GPIO: i32 = 2;
/// Reservoir water switch.  HIGH = water present.
pub const WATER_SWITCH_GPIO: i32 = 3;

// ---------------------------------------------------------------------------
// Status LED (discrete RGB, common cathode)
// ---------------------------------------------------------------------------

pub const LED_R_GPIO: i32 = 4;
pub const LED_B_GPIO: i32 = 5;
pub const LED_G_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Heating element
// ---------------------------------------------------------------------------

/// Relay coil driver.  HIGH = element energized.
pub const HEATER_RELAY_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// Thermistor (ADC1)
// ---------------------------------------------------------------------------

/// NTC divider midpoint.  ADC1 channel 7 (GPIO 8 on ESP32-S3).
pub const THERMISTOR_ADC_GPIO: i32 = 8;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// LEDC frequency for the RGB status LED.
pub const LED_PWM_FREQ_HZ: u32 = 1_000;
