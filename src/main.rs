//! Kettle firmware: main entry point.
//!
//! Hexagonal architecture around a single cooperative polling loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    LogEventSink   NvsAdapter   Esp32Time      │
//! │  (Sensor+Actuator   (EventSink)    (Credential  (Clock)        │
//! │   +DelayTimer)                      Store)                     │
//! │  WifiAdapter        ChannelOutbox  ChipRestart                 │
//! │  (NetworkPort)      (CommandChan.) (RestartPort)               │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │                Device (pure logic)                     │    │
//! │  │  Kettle FSM · Provisioning · Dispatcher · Estimator    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  ISRs → InterruptSignals      WsBridge ⇄ INBOUND / OUTBOUND    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Result, anyhow};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::prelude::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{error, info, warn};

use kettle::adapters::hardware::HardwareAdapter;
use kettle::adapters::log_sink::LogEventSink;
use kettle::adapters::nvs::NvsAdapter;
use kettle::adapters::outbox::ChannelOutbox;
use kettle::adapters::restart::ChipRestart;
use kettle::adapters::time::Esp32TimeAdapter;
use kettle::adapters::websocket::WsBridge;
use kettle::adapters::wifi::WifiAdapter;
use kettle::app::ports::{Clock, RestartPort};
use kettle::app::service::{Device, LoopOutcome};
use kettle::config::KettleConfig;
use kettle::drivers::hw_init;
use kettle::drivers::hw_timer::StartDelayTimer;
use kettle::drivers::pin::GpioPin;
use kettle::drivers::relay::HeaterRelay;
use kettle::drivers::status_led::StatusLed;
use kettle::events::SIGNALS;
use kettle::pins;
use kettle::protocol::channels::{INBOUND, OUTBOUND};
use kettle::sensors::presence::PresenceSwitch;
use kettle::sensors::temperature::ThermistorChannel;

/// Build-time configuration override, validated before use.
fn load_config() -> KettleConfig {
    match option_env!("KETTLE_CONFIG_JSON") {
        Some(json) => match KettleConfig::from_json(json) {
            Ok(cfg) => {
                info!("Config: using build-time override");
                cfg
            }
            Err(e) => {
                warn!("Config: override rejected ({}), using defaults", e);
                KettleConfig::default()
            }
        },
        None => KettleConfig::default(),
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Kettle v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = load_config();

    // ── 2. Peripherals and interrupts ─────────────────────────
    hw_init::init_peripherals().map_err(|e| anyhow!("HAL init failed: {}", e))?;
    if let Err(e) = hw_init::init_isr_service() {
        // Without edge interrupts the kettle can never leave Idle.
        error!("ISR service init failed: {}", e);
        return Err(anyhow!("ISR service init failed: {}", e));
    }
    let timer = StartDelayTimer::new(&SIGNALS)
        .map_err(|rc| anyhow!("start-delay timer create failed (rc={})", rc))?;

    let hw = HardwareAdapter::new(
        HeaterRelay::new(GpioPin::new(pins::HEATER_RELAY_GPIO)),
        StatusLed::new(),
        PresenceSwitch::new(GpioPin::new(pins::MUG_SWITCH_GPIO), "mug"),
        PresenceSwitch::new(GpioPin::new(pins::WATER_SWITCH_GPIO), "water"),
        ThermistorChannel::new(pins::THERMISTOR_ADC_GPIO),
        timer,
    );

    // ── 3. Storage and radio ──────────────────────────────────
    let store = NvsAdapter::new().map_err(|e| anyhow!("NVS init failed: {}", e))?;

    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;
    let esp_wifi = EspWifi::new(peripherals.modem, sys_loop.clone(), Some(nvs_partition))?;
    let wifi = WifiAdapter::new(BlockingWifi::wrap(esp_wifi, sys_loop)?);

    // ── 4. Websocket bridge ───────────────────────────────────
    let bridge = WsBridge::start(&INBOUND, &OUTBOUND)?;

    // ── 5. Device ─────────────────────────────────────────────
    let loop_interval_ms = config.loop_interval_ms;
    let mut device = Device::new(
        config,
        &SIGNALS,
        hw,
        wifi,
        store,
        ChannelOutbox::new(&OUTBOUND),
        LogEventSink::new(),
    );
    device.start();

    let clock = Esp32TimeAdapter::new();
    let mut chip = ChipRestart;
    let mut page = device.served_page();

    info!("System ready. Entering polling loop.");

    // ── 6. Polling loop ───────────────────────────────────────
    loop {
        let outcome = device.tick(clock.now_ms(), &INBOUND);
        bridge.flush();

        if device.served_page() != page {
            page = device.served_page();
            info!("Serving {:?} page", page);
        }

        if outcome == LoopOutcome::Restart {
            // Give the httpd task a moment to put the last reply on the wire.
            FreeRtos::delay_ms(100);
            chip.restart();
        }

        FreeRtos::delay_ms(loop_interval_ms);
    }
}
