//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the relay, status LED, presence switches, thermistor channel and
//! start-delay timer, exposing them through [`SensorPort`],
//! [`ActuatorPort`] and [`DelayTimer`].  This is the only module in the
//! system that touches actual hardware.  On non-espidf targets, the
//! underlying drivers use cfg-gated simulation stubs.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::{ActuatorPort, DelayTimer, SensorPort};
use crate::drivers::relay::HeaterRelay;
use crate::drivers::status_led::StatusLed;
use crate::sensors::presence::PresenceSwitch;
use crate::sensors::temperature::ThermistorChannel;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I: InputPin, O: OutputPin, T: DelayTimer> {
    relay: HeaterRelay<O>,
    led: StatusLed,
    mug: PresenceSwitch<I>,
    water: PresenceSwitch<I>,
    thermistor: ThermistorChannel,
    timer: T,
}

impl<I: InputPin, O: OutputPin, T: DelayTimer> HardwareAdapter<I, O, T> {
    pub fn new(
        relay: HeaterRelay<O>,
        led: StatusLed,
        mug: PresenceSwitch<I>,
        water: PresenceSwitch<I>,
        thermistor: ThermistorChannel,
        timer: T,
    ) -> Self {
        Self {
            relay,
            led,
            mug,
            water,
            thermistor,
            timer,
        }
    }

    pub fn heater_on(&self) -> bool {
        self.relay.is_closed()
    }

    pub fn indicator(&self) -> (u8, u8, u8) {
        self.led.current_colour()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<I: InputPin, O: OutputPin, T: DelayTimer> SensorPort for HardwareAdapter<I, O, T> {
    fn mug_present(&mut self) -> bool {
        self.mug.is_present()
    }

    fn water_present(&mut self) -> bool {
        self.water.is_present()
    }

    fn thermistor_raw(&mut self) -> u16 {
        self.thermistor.read_raw()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<I: InputPin, O: OutputPin, T: DelayTimer> ActuatorPort for HardwareAdapter<I, O, T> {
    fn set_heater(&mut self, on: bool) {
        self.relay.set(on);
    }

    fn set_indicator(&mut self, r: u8, g: u8, b: u8) {
        self.led.set_colour(r, g, b);
    }

    fn all_off(&mut self) {
        self.relay.open();
        self.led.off();
    }
}

// ── DelayTimer implementation ─────────────────────────────────

impl<I: InputPin, O: OutputPin, T: DelayTimer> DelayTimer for HardwareAdapter<I, O, T> {
    fn start(&mut self, delay_ms: u32) {
        self.timer.start(delay_ms);
    }

    fn cancel(&mut self) {
        self.timer.cancel();
    }
}
