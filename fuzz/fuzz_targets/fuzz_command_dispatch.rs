//! Fuzz target: inbound line → `Dispatcher::dispatch`
//!
//! Drives arbitrary bytes through the inbound queue and the dispatcher
//! and asserts that nothing panics, that only recognised commands touch
//! the stored credentials, and that credentials never exceed their
//! capacities.
//!
//! cargo fuzz run fuzz_command_dispatch

#![no_main]

use kettle::adapters::nvs::NvsAdapter;
use kettle::app::ports::{
    CommandChannel, CredentialStore, PASSPHRASE_CAPACITY, PASSWORD_KEY, SSID_CAPACITY, SSID_KEY,
};
use kettle::config::{DEFAULT_ACCESS_POINT_NAME, KettleConfig};
use kettle::fsm::Fsm;
use kettle::fsm::context::KettleContext;
use kettle::protocol::ConnectionId;
use kettle::protocol::channels::{Inbound, InboundQueue, submit_line};
use kettle::protocol::command::Command;
use kettle::protocol::dispatcher::{Dispatch, Dispatcher};
use kettle::provisioning::Provisioning;
use libfuzzer_sys::fuzz_target;

struct Discard;

impl CommandChannel for Discard {
    fn reply(&mut self, _connection: ConnectionId, _text: &str) {}
    fn broadcast(&mut self, _text: &str) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    let queue = InboundQueue::new();
    if submit_line(&queue, ConnectionId(0), text).is_err() {
        return;
    }
    let Ok(msg) = queue.try_receive() else {
        return;
    };
    let Inbound::Line(line) = msg.body else {
        return;
    };

    let mut fsm = Fsm::new();
    let mut ctx = KettleContext::new(KettleConfig::default());
    fsm.start(&mut ctx);
    let Ok(store) = NvsAdapter::new() else {
        return;
    };
    let mut provisioning = Provisioning::new(DEFAULT_ACCESS_POINT_NAME, store);
    let mut channel = Discard;

    let recognized = Command::parse(&line).is_recognized();
    let outcome = Dispatcher {
        fsm: &mut fsm,
        ctx: &mut ctx,
        provisioning: &mut provisioning,
        channel: &mut channel,
    }
    .dispatch(msg.connection, &line);

    assert_eq!(recognized, outcome != Dispatch::Unrecognized);
    let store = provisioning.store();
    if !recognized {
        assert!(store.get(SSID_KEY).is_empty());
        assert!(store.get(PASSWORD_KEY).is_empty());
    }
    assert!(store.get(SSID_KEY).len() <= SSID_CAPACITY);
    assert!(store.get(PASSWORD_KEY).len() <= PASSPHRASE_CAPACITY);
});
