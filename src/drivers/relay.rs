//! Heating element relay driver.
//!
//! A single digital output drives the relay coil: HIGH closes the contact
//! and energizes the element.  The driver remembers the last commanded
//! level and only touches the pin on a change.

use embedded_hal::digital::OutputPin;
use log::{info, warn};

pub struct HeaterRelay<P: OutputPin> {
    pin: P,
    closed: bool,
}

impl<P: OutputPin> HeaterRelay<P> {
    /// Wrap `pin` and force the relay open.
    pub fn new(mut pin: P) -> Self {
        if pin.set_low().is_err() {
            warn!("Relay: initial open failed");
        }
        Self { pin, closed: false }
    }

    pub fn set(&mut self, on: bool) {
        if on == self.closed {
            return;
        }
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match result {
            Ok(()) => {
                self.closed = on;
                info!("Relay: heater {}", if on { "ON" } else { "OFF" });
            }
            Err(_) => warn!("Relay: pin write failed (wanted {})", on),
        }
    }

    pub fn open(&mut self) {
        self.set(false);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
