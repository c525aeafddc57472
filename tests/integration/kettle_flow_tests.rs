//! End-to-end heating sessions through `Device::tick` with mock hardware.

use kettle::app::events::AppEvent;
use kettle::error::KettleFault;
use kettle::events::InterruptSignals;
use kettle::fsm::KettleState;
use kettle::fsm::states::{COLOUR_HEATING, COLOUR_IDLE, COLOUR_POST_HEAT};
use kettle::protocol::channels::InboundQueue;

use crate::mock_hw::{HwCall, device, drive_to_heating, fast_config};

#[test]
fn full_session_heats_then_cools_back_to_idle() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);
    assert_eq!(dev.state(), KettleState::Idle);
    assert_eq!(dev.hw().indicator, COLOUR_IDLE);

    let t = drive_to_heating(&mut dev, &SIG, &inbound, 0);
    assert_eq!(dev.state(), KettleState::Heating);
    assert!(dev.hw().heater);
    assert_eq!(dev.hw().indicator, COLOUR_HEATING);

    // Below target: keeps heating.
    dev.hw_mut().set_celsius(30.0);
    dev.tick(t + 10, &inbound);
    assert_eq!(dev.state(), KettleState::Heating);
    assert!(dev.hw().heater);

    // Target reached.
    dev.hw_mut().set_celsius(45.0);
    dev.tick(t + 20, &inbound);
    assert_eq!(dev.state(), KettleState::PostHeat);
    assert!(!dev.hw().heater);
    assert_eq!(dev.hw().indicator, COLOUR_POST_HEAT);

    // The start switch is locked out during cooldown.
    SIG.on_start_edge();
    dev.tick(t + 50_000, &inbound);
    assert_eq!(dev.state(), KettleState::PostHeat);
    assert!(!dev.hw().heater);

    dev.tick(t + 20 + 100_000, &inbound);
    assert_eq!(dev.state(), KettleState::Idle);
    assert!(!dev.hw().heater);
    assert_eq!(dev.hw().indicator, COLOUR_IDLE);

    let path: Vec<(KettleState, KettleState)> = dev
        .sink()
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::StateChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        path,
        [
            (KettleState::Idle, KettleState::PreInit),
            (KettleState::PreInit, KettleState::PostInit),
            (KettleState::PostInit, KettleState::Heating),
            (KettleState::Heating, KettleState::PostHeat),
            (KettleState::PostHeat, KettleState::Idle),
        ]
    );
}

#[test]
fn start_delay_timer_is_armed_then_cancelled() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);

    SIG.on_start_edge();
    dev.tick(0, &inbound);
    assert_eq!(dev.state(), KettleState::PreInit);
    assert_eq!(dev.hw().calls.last(), Some(&HwCall::TimerStart(2_000)));

    SIG.on_delay_elapsed();
    dev.tick(2_000, &inbound);
    assert_eq!(dev.state(), KettleState::PostInit);
    assert!(dev.hw().calls.contains(&HwCall::TimerCancel));
}

#[test]
fn stale_delay_expiry_does_not_skip_the_wait() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);

    SIG.on_delay_elapsed();
    SIG.on_start_edge();
    dev.tick(0, &inbound);
    assert_eq!(dev.state(), KettleState::PreInit);

    dev.tick(10, &inbound);
    dev.tick(20, &inbound);
    assert_eq!(dev.state(), KettleState::PreInit);
}

#[test]
fn mug_interrupt_while_heating_faults_and_reports() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);
    let t = drive_to_heating(&mut dev, &SIG, &inbound, 0);

    // Interrupt wins even with the level still reading "present".
    SIG.on_mug_removed();
    dev.tick(t + 10, &inbound);
    assert_eq!(dev.state(), KettleState::Error);
    assert!(!dev.hw().heater);

    dev.tick(t + 20, &inbound);
    assert_eq!(dev.state(), KettleState::Idle);
    assert_eq!(dev.channel().broadcasts(), ["ERROR Mug Moved!"]);
    assert!(
        dev.sink()
            .events
            .contains(&AppEvent::FaultHandled(KettleFault::MugRemoved))
    );
}

#[test]
fn polled_water_loss_while_heating_faults() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);
    let t = drive_to_heating(&mut dev, &SIG, &inbound, 0);

    dev.hw_mut().water = false;
    dev.tick(t + 10, &inbound);
    assert_eq!(dev.state(), KettleState::Error);
    assert!(!dev.hw().heater);
    dev.tick(t + 20, &inbound);
    assert_eq!(dev.channel().broadcasts(), ["ERROR No water in system!"]);
}

#[test]
fn missing_mug_at_start_never_energizes_heater() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);
    dev.hw_mut().mug = false;

    let t = drive_to_heating(&mut dev, &SIG, &inbound, 0);
    assert_eq!(dev.state(), KettleState::Error);
    dev.tick(t + 10, &inbound);
    assert_eq!(dev.state(), KettleState::Idle);
    assert!(!dev.hw().heater_ever_on());
    assert_eq!(dev.channel().broadcasts(), ["ERROR No Mug Present"]);
}

#[test]
fn missing_water_at_start_reports_no_water() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);
    dev.hw_mut().water = false;

    let t = drive_to_heating(&mut dev, &SIG, &inbound, 0);
    dev.tick(t + 10, &inbound);
    assert!(!dev.hw().heater_ever_on());
    assert_eq!(dev.channel().broadcasts(), ["ERROR No water in the kettle"]);
}

#[test]
fn heating_without_reaching_target_times_out() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);
    let t = drive_to_heating(&mut dev, &SIG, &inbound, 0);

    dev.tick(t + 100_000, &inbound);
    assert_eq!(dev.state(), KettleState::Heating);

    dev.tick(t + 100_001, &inbound);
    assert_eq!(dev.state(), KettleState::Error);
    assert!(!dev.hw().heater);
    dev.tick(t + 100_011, &inbound);
    assert_eq!(
        dev.channel().broadcasts(),
        ["ERROR Heating too long somethings wrong!"]
    );
}

#[test]
fn kettle_can_run_a_second_session_after_a_fault() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);
    let t = drive_to_heating(&mut dev, &SIG, &inbound, 0);
    SIG.on_water_lost();
    dev.tick(t + 10, &inbound);
    dev.tick(t + 20, &inbound);
    assert_eq!(dev.state(), KettleState::Idle);

    drive_to_heating(&mut dev, &SIG, &inbound, t + 1_000);
    assert_eq!(dev.state(), KettleState::Heating);
    assert!(dev.hw().heater);
}

#[test]
fn debug_broadcasts_report_states_and_temperature() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut config = fast_config();
    config.debug_broadcasts = true;
    let mut dev = device(config, &SIG);

    let t = drive_to_heating(&mut dev, &SIG, &inbound, 0);
    dev.tick(t + 10, &inbound);

    let sent = dev.channel().broadcasts();
    assert_eq!(&sent[..3], ["DEBUG,STATE,1", "DEBUG,STATE,2", "DEBUG,STATE,3"]);
    assert!(sent[3].starts_with("SENSORS,THERMISTOR,"));
}

#[test]
fn estimator_lags_with_default_smoothing() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(kettle::config::KettleConfig::default(), &SIG);

    dev.tick(0, &inbound);
    let cold = dev.temperature_c().unwrap();
    dev.hw_mut().set_celsius(90.0);
    dev.tick(10, &inbound);
    let warmer = dev.temperature_c().unwrap();
    assert!(warmer > cold);
    assert!(warmer < 90.0);
}
