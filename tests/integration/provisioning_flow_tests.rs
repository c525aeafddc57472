//! Provisioning machine driven by the polling loop against the simulated
//! radio and credential store.

use kettle::adapters::nvs::NvsAdapter;
use kettle::app::events::AppEvent;
use kettle::app::ports::{CredentialStore, PASSWORD_KEY, SSID_KEY};
use kettle::events::InterruptSignals;
use kettle::protocol::channels::InboundQueue;
use kettle::provisioning::{Page, WifiState};

use crate::mock_hw::{device, device_with_store, fast_config};

fn stored(ssid: &str, passphrase: &str) -> NvsAdapter {
    let mut store = NvsAdapter::new().unwrap();
    store.set(SSID_KEY, ssid).unwrap();
    store.set(PASSWORD_KEY, passphrase).unwrap();
    store
}

#[test]
fn empty_store_opens_the_provisioning_access_point() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);
    assert_eq!(dev.wifi_state(), WifiState::Startup);
    assert_eq!(dev.served_page(), Page::None);

    dev.tick(0, &inbound);
    assert_eq!(dev.wifi_state(), WifiState::Setup);
    dev.tick(10, &inbound);
    assert_eq!(dev.served_page(), Page::Provisioning);
    assert_eq!(dev.net_mut().access_point(), Some("Kettle"));

    // Setup stays put; entry actions do not repeat.
    dev.tick(20, &inbound);
    assert_eq!(dev.wifi_state(), WifiState::Setup);
}

#[test]
fn configured_access_point_name_is_used() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut config = fast_config();
    config.access_point_name = heapless::String::try_from("Kitchen Kettle").unwrap();
    let mut dev = device(config, &SIG);

    dev.tick(0, &inbound);
    dev.tick(10, &inbound);
    assert_eq!(dev.net_mut().access_point(), Some("Kitchen Kettle"));
}

#[test]
fn stored_credentials_join_and_serve_home() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device_with_store(fast_config(), &SIG, stored("MyNet", "secret"));

    dev.tick(0, &inbound);
    assert_eq!(dev.wifi_state(), WifiState::ConnectionTest);
    dev.tick(10, &inbound);
    assert_eq!(dev.wifi_state(), WifiState::Connected);
    assert_eq!(dev.served_page(), Page::Home);
    assert_eq!(dev.net_mut().joined(), Some("MyNet"));

    let changes: Vec<WifiState> = dev
        .sink()
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::WifiChanged(s) => Some(*s),
            _ => None,
        })
        .collect();
    assert_eq!(changes, [WifiState::ConnectionTest, WifiState::Connected]);
}

#[test]
fn rejected_join_falls_back_to_diagnostic_page() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device_with_store(fast_config(), &SIG, stored("MyNet", "wrong"));
    dev.net_mut().sim_fail_join(true);

    dev.tick(0, &inbound);
    dev.tick(10, &inbound);
    assert_eq!(dev.wifi_state(), WifiState::WifiError);
    dev.tick(20, &inbound);
    assert_eq!(dev.served_page(), Page::Diagnostic);
    assert_eq!(dev.net_mut().access_point(), Some("Kettle"));

    // No automatic retry.
    dev.net_mut().sim_fail_join(false);
    dev.tick(30, &inbound);
    assert_eq!(dev.wifi_state(), WifiState::WifiError);
}

#[test]
fn access_point_failure_leaves_nothing_served() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);
    dev.net_mut().sim_fail_access_point(true);

    dev.tick(0, &inbound);
    dev.tick(10, &inbound);
    assert_eq!(dev.wifi_state(), WifiState::WifiError);
    dev.tick(20, &inbound);
    assert_eq!(dev.served_page(), Page::None);
}

#[test]
fn kettle_keeps_working_while_provisioning_fails() {
    static SIG: InterruptSignals = InterruptSignals::new();
    let inbound = InboundQueue::new();
    let mut dev = device(fast_config(), &SIG);
    dev.net_mut().sim_fail_access_point(true);

    SIG.on_start_edge();
    dev.tick(0, &inbound);
    SIG.on_delay_elapsed();
    dev.tick(2_000, &inbound);
    dev.tick(2_010, &inbound);
    assert_eq!(dev.wifi_state(), WifiState::WifiError);
    assert!(dev.hw().heater);
}
