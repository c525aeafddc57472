//! Sensor drivers.
//!
//! | Sensor        | Interface        | Reading                     |
//! |---------------|------------------|-----------------------------|
//! | Thermistor    | ADC1 (12-bit)    | smoothed Celsius estimate   |
//! | Mug switch    | GPIO, pull-up    | HIGH = mug on the plate     |
//! | Water switch  | GPIO, pull-up    | HIGH = water in reservoir   |

pub mod presence;
pub mod temperature;
