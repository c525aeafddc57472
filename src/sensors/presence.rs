//! Mug and water presence switches.
//!
//! Both are plain contact switches on pull-up inputs: the line reads HIGH
//! while the mug sits on the plate / the reservoir holds water, and drops
//! LOW when it goes away.  The falling edge is what the GPIO ISR watches;
//! this driver only serves level reads for the PostInit check and the
//! Heating poll.

use embedded_hal::digital::InputPin;
use log::warn;

pub struct PresenceSwitch<P: InputPin> {
    pin: P,
    label: &'static str,
}

impl<P: InputPin> PresenceSwitch<P> {
    pub fn new(pin: P, label: &'static str) -> Self {
        Self { pin, label }
    }

    /// `true` while the line is HIGH.  A failed read counts as absent so a
    /// broken input can never enable the heater.
    pub fn is_present(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(level) => level,
            Err(_) => {
                warn!("{}: level read failed, treating as absent", self.label);
                false
            }
        }
    }
}
