//! Text commands delivered through the inbound queue and dispatched by
//! `Device::tick`.

use kettle::adapters::nvs::NvsAdapter;
use kettle::app::events::AppEvent;
use kettle::app::ports::{CredentialStore, PASSWORD_KEY, SSID_KEY, StorageError};
use kettle::app::service::LoopOutcome;
use kettle::error::{KettleFault, ProvisioningError};
use kettle::events::InterruptSignals;
use kettle::fsm::KettleState;
use kettle::protocol::ConnectionId;
use kettle::protocol::channels::{InboundQueue, submit_connect, submit_line};
use kettle::provisioning::WifiState;

use crate::mock_hw::{
    HwCall, ReadOnlyStore, device, device_with_store, drive_to_heating, fast_config,
};

const PEER: ConnectionId = ConnectionId(7);

#[test]
fn new_connection_is_greeted() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);

    submit_connect(&inbound, PEER);
    assert_eq!(dev.tick(0, &inbound), LoopOutcome::Continue);
    assert_eq!(dev.channel().replies_to(PEER), ["Connected"]);
}

#[test]
fn greeting_carries_state_when_debugging() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut config = fast_config();
    config.debug_broadcasts = true;
    let mut dev = device(config, &SIG);

    submit_connect(&inbound, PEER);
    dev.tick(0, &inbound);
    assert_eq!(dev.channel().replies_to(PEER), ["Connected", "DEBUG,STATE,0"]);
}

#[test]
fn wifi_lists_the_cached_scan() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);
    dev.net_mut().sim_set_visible(&["Home", "Cafe", "Home"]);

    dev.tick(0, &inbound);
    dev.tick(10, &inbound);
    assert_eq!(dev.wifi_state(), WifiState::Setup);

    submit_line(&inbound, PEER, "WIFI").unwrap();
    dev.tick(20, &inbound);
    assert_eq!(dev.channel().replies_to(PEER), ["NETWORKS,Home,Cafe"]);
}

#[test]
fn switch_forces_pre_init_and_broadcasts() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);

    submit_line(&inbound, PEER, "SWITCH").unwrap();
    dev.tick(0, &inbound);
    assert_eq!(dev.state(), KettleState::PreInit);
    assert_eq!(dev.channel().broadcasts(), ["STATE CHANGED"]);
    assert_eq!(dev.hw().timer_starts(), 1);

    // A second SWITCH restarts the delay.
    submit_line(&inbound, PEER, "SWITCH").unwrap();
    dev.tick(500, &inbound);
    assert_eq!(dev.state(), KettleState::PreInit);
    assert_eq!(dev.hw().timer_starts(), 2);
}

#[test]
fn switch_while_heating_releases_the_relay() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);
    let t = drive_to_heating(&mut dev, &SIG, &inbound, 0);
    assert!(dev.hw().heater);

    submit_line(&inbound, PEER, "SWITCH").unwrap();
    dev.tick(t + 10, &inbound);
    assert_eq!(dev.state(), KettleState::PreInit);
    assert!(!dev.hw().heater);
    assert_eq!(dev.hw().calls.last(), Some(&HwCall::TimerStart(2_000)));
}

#[test]
fn fault_and_switch_in_one_pass_still_report_the_fault() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);
    let t = drive_to_heating(&mut dev, &SIG, &inbound, 0);

    SIG.on_mug_removed();
    submit_line(&inbound, PEER, "SWITCH").unwrap();
    dev.tick(t + 10, &inbound);
    assert_eq!(dev.state(), KettleState::PreInit);
    assert!(!dev.hw().heater);
    let broadcasts = dev.channel().broadcasts();
    assert_eq!(broadcasts.len(), 2);
    assert!(broadcasts.contains(&"ERROR Mug Moved!"));
    assert!(broadcasts.contains(&"STATE CHANGED"));
    assert!(
        dev.sink()
            .events
            .contains(&AppEvent::FaultHandled(KettleFault::MugRemoved))
    );

    // The fault is not reported a second time by the next session.
    for i in 1..50 {
        dev.tick(t + 10 + i * 10, &inbound);
    }
    assert_eq!(
        dev.channel()
            .broadcasts()
            .iter()
            .filter(|b| b.starts_with("ERROR"))
            .count(),
        1
    );
}

#[test]
fn credentials_are_persisted_before_restart() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);

    submit_line(&inbound, PEER, "AccessPointName,MyNet").unwrap();
    submit_line(&inbound, PEER, "AccessPointPassword,secret").unwrap();
    assert_eq!(dev.tick(0, &inbound), LoopOutcome::Restart);

    assert_eq!(
        dev.channel().replies_to(PEER),
        ["Access Point Name Saved", "Access Point Password Saved"]
    );
    assert_eq!(dev.store().get(SSID_KEY).as_str(), "MyNet");
    assert_eq!(dev.store().get(PASSWORD_KEY).as_str(), "secret");
    assert_eq!(dev.hw().calls.last(), Some(&HwCall::AllOff));
    assert!(dev.sink().events.contains(&AppEvent::RestartRequested));

    // After the restart the saved network is joined.
    dev.reboot();
    dev.tick(10, &inbound);
    assert_eq!(dev.wifi_state(), WifiState::ConnectionTest);
    dev.tick(20, &inbound);
    assert_eq!(dev.wifi_state(), WifiState::Connected);
    assert_eq!(dev.net_mut().joined(), Some("MyNet"));
}

#[test]
fn name_alone_does_not_restart() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);

    submit_line(&inbound, PEER, "AccessPointName,Cafe,2G").unwrap();
    assert_eq!(dev.tick(0, &inbound), LoopOutcome::Continue);
    assert_eq!(dev.store().get(SSID_KEY).as_str(), "Cafe,2G");
}

#[test]
fn over_long_name_is_rejected_without_reply() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);

    let line = format!("AccessPointName,{}", "n".repeat(33));
    submit_line(&inbound, PEER, &line).unwrap();
    assert_eq!(dev.tick(0, &inbound), LoopOutcome::Continue);

    assert!(dev.channel().replies_to(PEER).is_empty());
    assert!(dev.store().get(SSID_KEY).is_empty());
    assert!(
        dev.sink()
            .events
            .contains(&AppEvent::CommandRejected(ProvisioningError::CredentialTooLong))
    );
}

#[test]
fn reset_erases_credentials_and_restarts() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut store = NvsAdapter::new().unwrap();
    store.set(SSID_KEY, "MyNet").unwrap();
    store.set(PASSWORD_KEY, "secret").unwrap();
    let mut dev = device_with_store(fast_config(), &SIG, store);

    dev.tick(0, &inbound);
    dev.tick(10, &inbound);
    assert_eq!(dev.wifi_state(), WifiState::Connected);

    submit_line(&inbound, PEER, "RESET").unwrap();
    assert_eq!(dev.tick(20, &inbound), LoopOutcome::Restart);
    assert!(dev.store().get(SSID_KEY).is_empty());
    assert!(dev.store().get(PASSWORD_KEY).is_empty());

    dev.reboot();
    assert_eq!(dev.wifi_state(), WifiState::Startup);
    dev.tick(30, &inbound);
    assert_eq!(dev.wifi_state(), WifiState::Setup);
}

#[test]
fn reset_with_failing_store_is_rejected() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device_with_store(fast_config(), &SIG, ReadOnlyStore::default());

    submit_line(&inbound, PEER, "RESET").unwrap();
    assert_eq!(dev.tick(0, &inbound), LoopOutcome::Continue);
    assert!(dev.sink().events.contains(&AppEvent::CommandRejected(
        ProvisioningError::Storage(StorageError::IoError)
    )));
}

#[test]
fn unrecognized_lines_change_nothing() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);
    dev.tick(0, &inbound);
    let wifi = dev.wifi_state();

    for line in ["switch", "WIFI,now", "Reset", "AccessPointKey,x", ""] {
        submit_line(&inbound, PEER, line).unwrap();
    }
    assert_eq!(dev.tick(10, &inbound), LoopOutcome::Continue);

    assert_eq!(dev.state(), KettleState::Idle);
    assert_eq!(dev.wifi_state(), wifi);
    assert!(dev.store().get(SSID_KEY).is_empty());
    assert!(dev.channel().sent.is_empty());
}

#[test]
fn lines_after_a_restart_wait_in_the_queue() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);

    submit_line(&inbound, PEER, "RESET").unwrap();
    submit_line(&inbound, PEER, "SWITCH").unwrap();
    assert_eq!(dev.tick(0, &inbound), LoopOutcome::Restart);
    assert_eq!(dev.state(), KettleState::Idle);
    assert!(inbound.try_receive().is_ok());
}
