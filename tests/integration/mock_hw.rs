//! Mock adapters for integration tests.
//!
//! Records every actuator, timer and channel call so tests can assert on
//! the full command history without touching real GPIO/PWM registers.
//! Network and credential storage use the library's own simulation
//! backends ([`WifiAdapter`], [`NvsAdapter`]).

use kettle::adapters::nvs::NvsAdapter;
use kettle::adapters::wifi::WifiAdapter;
use kettle::app::events::AppEvent;
use kettle::app::ports::{
    ActuatorPort, CommandChannel, CredentialStore, DelayTimer, EventSink, PASSPHRASE_CAPACITY,
    SensorPort, StorageError,
};
use kettle::app::service::Device;
use kettle::config::{KettleConfig, ThermistorConfig};
use kettle::events::InterruptSignals;
use kettle::protocol::ConnectionId;
use kettle::protocol::channels::InboundQueue;
use kettle::sensors::temperature::raw_for_celsius;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    Heater(bool),
    Indicator(u8, u8, u8),
    AllOff,
    TimerStart(u32),
    TimerCancel,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub mug: bool,
    pub water: bool,
    pub raw: u16,
    pub heater: bool,
    pub indicator: (u8, u8, u8),
    pub calls: Vec<HwCall>,
    thermistor: ThermistorConfig,
}

#[allow(dead_code)]
impl MockHardware {
    /// Mug and water present, thermistor at room temperature.
    pub fn new(thermistor: ThermistorConfig) -> Self {
        Self {
            mug: true,
            water: true,
            raw: raw_for_celsius(&thermistor, 20.0),
            heater: false,
            indicator: (0, 0, 0),
            calls: Vec::new(),
            thermistor,
        }
    }

    pub fn set_celsius(&mut self, celsius: f32) {
        self.raw = raw_for_celsius(&self.thermistor, celsius);
    }

    pub fn timer_starts(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HwCall::TimerStart(_)))
            .count()
    }

    pub fn heater_ever_on(&self) -> bool {
        self.calls.contains(&HwCall::Heater(true))
    }
}

impl SensorPort for MockHardware {
    fn mug_present(&mut self) -> bool {
        self.mug
    }

    fn water_present(&mut self) -> bool {
        self.water
    }

    fn thermistor_raw(&mut self) -> u16 {
        self.raw
    }
}

impl ActuatorPort for MockHardware {
    fn set_heater(&mut self, on: bool) {
        if self.heater != on {
            self.calls.push(HwCall::Heater(on));
        }
        self.heater = on;
    }

    fn set_indicator(&mut self, r: u8, g: u8, b: u8) {
        if self.indicator != (r, g, b) {
            self.calls.push(HwCall::Indicator(r, g, b));
        }
        self.indicator = (r, g, b);
    }

    fn all_off(&mut self) {
        self.calls.push(HwCall::AllOff);
        self.heater = false;
        self.indicator = (0, 0, 0);
    }
}

impl DelayTimer for MockHardware {
    fn start(&mut self, delay_ms: u32) {
        self.calls.push(HwCall::TimerStart(delay_ms));
    }

    fn cancel(&mut self) {
        self.calls.push(HwCall::TimerCancel);
    }
}

// ── Recording channel ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Reply(ConnectionId, String),
    Broadcast(String),
}

#[derive(Default)]
pub struct RecordingChannel {
    pub sent: Vec<Sent>,
}

#[allow(dead_code)]
impl RecordingChannel {
    pub fn replies_to(&self, connection: ConnectionId) -> Vec<&str> {
        self.sent
            .iter()
            .filter_map(|s| match s {
                Sent::Reply(c, text) if *c == connection => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn broadcasts(&self) -> Vec<&str> {
        self.sent
            .iter()
            .filter_map(|s| match s {
                Sent::Broadcast(text) => Some(text.as_str()),
                Sent::Reply(..) => None,
            })
            .collect()
    }
}

impl CommandChannel for RecordingChannel {
    fn reply(&mut self, connection: ConnectionId, text: &str) {
        self.sent.push(Sent::Reply(connection, text.into()));
    }

    fn broadcast(&mut self, text: &str) {
        self.sent.push(Sent::Broadcast(text.into()));
    }
}

// ── Recording event sink ──────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Store that refuses every write ────────────────────────────

#[derive(Default)]
pub struct ReadOnlyStore {
    pub ssid: heapless::String<PASSPHRASE_CAPACITY>,
}

impl CredentialStore for ReadOnlyStore {
    fn get(&self, key: &str) -> heapless::String<PASSPHRASE_CAPACITY> {
        if key == kettle::app::ports::SSID_KEY {
            self.ssid.clone()
        } else {
            heapless::String::new()
        }
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::IoError)
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        Err(StorageError::IoError)
    }
}

// ── Test rig ──────────────────────────────────────────────────

pub type TestDevice<S = NvsAdapter> =
    Device<MockHardware, WifiAdapter, S, RecordingChannel, RecordingSink>;

/// Config whose estimator tracks the thermistor without lag.
pub fn fast_config() -> KettleConfig {
    let mut config = KettleConfig::default();
    config.thermistor.smoothing = 1.0;
    config
}

/// A started device over fresh mocks.  `signals` and `inbound` must be
/// per-test statics so parallel tests never share latches.
pub fn device(
    config: KettleConfig,
    signals: &'static InterruptSignals,
) -> TestDevice {
    let store = NvsAdapter::new().expect("sim NVS");
    device_with_store(config, signals, store)
}

pub fn device_with_store<S: CredentialStore>(
    config: KettleConfig,
    signals: &'static InterruptSignals,
    store: S,
) -> TestDevice<S> {
    let hw = MockHardware::new(config.thermistor);
    let mut device = Device::new(
        config,
        signals,
        hw,
        WifiAdapter::new(),
        store,
        RecordingChannel::default(),
        RecordingSink::default(),
    );
    device.start();
    device
}

/// Tick until the kettle is heating: start edge, delay expiry, interlock
/// check.  Returns the timestamp of the last tick.
#[allow(dead_code)]
pub fn drive_to_heating<S: CredentialStore>(
    device: &mut TestDevice<S>,
    signals: &'static InterruptSignals,
    inbound: &InboundQueue,
    mut now_ms: u64,
) -> u64 {
    signals.on_start_edge();
    device.tick(now_ms, inbound);
    now_ms += 2_000;
    signals.on_delay_elapsed();
    device.tick(now_ms, inbound);
    now_ms += 10;
    device.tick(now_ms, inbound);
    now_ms
}
