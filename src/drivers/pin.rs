//! Raw GPIO number wrapped in the `embedded-hal` digital traits.
//!
//! Pins are configured once by [`hw_init`](super::hw_init); this type only
//! reads and writes levels, so the generic drivers (relay, presence
//! switches) stay independent of ESP-IDF.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use super::hw_init;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioPin(i32);

impl GpioPin {
    pub const fn new(gpio: i32) -> Self {
        Self(gpio)
    }
}

impl ErrorType for GpioPin {
    type Error = Infallible;
}

impl InputPin for GpioPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(hw_init::gpio_read(self.0))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!hw_init::gpio_read(self.0))
    }
}

impl OutputPin for GpioPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.0, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.0, true);
        Ok(())
    }
}
