//! Polling loop: the hexagonal core.
//!
//! [`Device`] owns both state machines, the temperature estimator and the
//! adapters behind the port traits.  One call to [`Device::tick`] is one
//! pass of the firmware's main loop:
//!
//! ```text
//!  1. drain interrupt signals (start, delay, interlock)
//!  2. sample thermistor, read mug / water levels
//!  3. kettle FSM tick → requests, actuators, notices
//!  4. provisioning tick
//!  5. drain inbound queue → dispatch each line to completion
//! ```
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │         Device         │ ──▶ CommandChannel
//! ActuatorPort ◀──│ Kettle FSM · WiFi FSM  │ ◀─▶ CredentialStore
//!   DelayTimer ◀──│ Estimator · Dispatcher │ ◀─▶ NetworkPort
//!                 └────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::KettleConfig;
use crate::events::{InterruptSignals, Line};
use crate::fsm::context::{DelayRequest, KettleContext, Notice, TickInputs};
use crate::fsm::{Fsm, KettleState};
use crate::protocol::channels::{Inbound, InboundQueue};
use crate::protocol::dispatcher::{Dispatch, Dispatcher};
use crate::protocol::frames;
use crate::provisioning::{Page, Provisioning, WifiState};
use crate::sensors::temperature::TemperatureEstimator;

use super::events::AppEvent;
use super::ports::{
    ActuatorPort, CommandChannel, CredentialStore, DelayTimer, EventSink, NetworkPort, SensorPort,
};

/// Whether the caller should keep looping or restart the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    Continue,
    Restart,
}

// ───────────────────────────────────────────────────────────────
// Device
// ───────────────────────────────────────────────────────────────

pub struct Device<H, N, S, C, E> {
    fsm: Fsm,
    ctx: KettleContext,
    estimator: TemperatureEstimator,
    provisioning: Provisioning<S>,
    signals: &'static InterruptSignals,
    hw: H,
    net: N,
    channel: C,
    sink: E,
    tick_count: u64,
}

impl<H, N, S, C, E> Device<H, N, S, C, E>
where
    H: SensorPort + ActuatorPort + DelayTimer,
    N: NetworkPort,
    S: CredentialStore,
    C: CommandChannel,
    E: EventSink,
{
    /// Assemble the device.  Nothing runs until [`start`](Self::start).
    pub fn new(
        config: KettleConfig,
        signals: &'static InterruptSignals,
        hw: H,
        net: N,
        store: S,
        channel: C,
        sink: E,
    ) -> Self {
        let estimator = TemperatureEstimator::new(config.thermistor);
        let provisioning = Provisioning::new(&config.access_point_name, store);
        Self {
            fsm: Fsm::new(),
            ctx: KettleContext::new(config),
            estimator,
            provisioning,
            signals,
            hw,
            net,
            channel,
            sink,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter Idle with only the start line armed.
    pub fn start(&mut self) {
        self.hw.all_off();
        self.fsm.start(&mut self.ctx);
        self.apply_outputs();
        self.sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("Device started in {}", self.fsm.current_state().name());
    }

    /// Power-on state again: both machines rebuilt, actuators off, latches
    /// cleared.  Stands in for the chip reset on the host.
    pub fn reboot(&mut self) {
        warn!("Device rebooting");
        self.hw.cancel();
        self.hw.all_off();
        self.signals.reset();
        let config = self.ctx.config.clone();
        self.estimator = TemperatureEstimator::new(config.thermistor);
        self.ctx = KettleContext::new(config);
        self.fsm = Fsm::new();
        self.provisioning.reset();
        self.start();
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one pass of the polling loop at `now_ms`.
    pub fn tick(&mut self, now_ms: u64, inbound: &InboundQueue) -> LoopOutcome {
        self.tick_count += 1;

        // 1. Interrupt signals, each consumed exactly once.
        let start_pressed = self.signals.take_start();
        let delay_elapsed = self.signals.take_delay_elapsed();
        let interlock = self.signals.take_interlock();

        // 2. Sensors.  The estimator runs in every state.
        let temperature_c = self.estimator.sample(self.hw.thermistor_raw());
        self.ctx.inputs = TickInputs {
            now_ms,
            start_pressed,
            delay_elapsed,
            interlock,
            mug_present: self.hw.mug_present(),
            water_present: self.hw.water_present(),
            temperature_c,
        };

        // 3. Kettle machine.
        let prev = self.fsm.current_state();
        self.fsm.tick(&mut self.ctx);
        self.report_transition(prev);
        self.apply_outputs();

        // 4. Provisioning machine.
        if let Some(next) = self.provisioning.tick(&mut self.net) {
            self.sink.emit(&AppEvent::WifiChanged(next));
        }

        // 5. Commands.
        self.drain_inbound(inbound)
    }

    fn drain_inbound(&mut self, inbound: &InboundQueue) -> LoopOutcome {
        while let Ok(msg) = inbound.try_receive() {
            let prev = self.fsm.current_state();
            let mut dispatcher = Dispatcher {
                fsm: &mut self.fsm,
                ctx: &mut self.ctx,
                provisioning: &mut self.provisioning,
                channel: &mut self.channel,
            };
            let outcome = match msg.body {
                Inbound::Connected => {
                    dispatcher.on_connect(msg.connection);
                    Dispatch::Handled
                }
                Inbound::Line(line) => dispatcher.dispatch(msg.connection, &line),
            };

            self.report_transition(prev);
            self.apply_outputs();

            match outcome {
                Dispatch::Handled | Dispatch::Unrecognized => {}
                Dispatch::Rejected(e) => self.sink.emit(&AppEvent::CommandRejected(e)),
                Dispatch::Restart => {
                    self.hw.all_off();
                    self.sink.emit(&AppEvent::RestartRequested);
                    return LoopOutcome::Restart;
                }
            }
        }
        LoopOutcome::Continue
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> KettleState {
        self.fsm.current_state()
    }

    pub fn wifi_state(&self) -> WifiState {
        self.provisioning.state()
    }

    pub fn served_page(&self) -> Page {
        self.provisioning.served_page()
    }

    /// Latest smoothed temperature estimate.
    pub fn temperature_c(&self) -> Option<f32> {
        self.estimator.celsius()
    }

    pub fn heater_commanded(&self) -> bool {
        self.ctx.commands.heater_on
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &KettleConfig {
        &self.ctx.config
    }

    pub fn hw(&self) -> &H {
        &self.hw
    }

    pub fn hw_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    pub fn net_mut(&mut self) -> &mut N {
        &mut self.net
    }

    pub fn store(&self) -> &S {
        self.provisioning.store()
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    // ── Internal ──────────────────────────────────────────────

    fn report_transition(&mut self, prev: KettleState) {
        let now = self.fsm.current_state();
        if now != prev {
            self.sink
                .emit(&AppEvent::StateChanged { from: prev, to: now });
        }
    }

    /// Push everything the handlers left in the context out to the ports.
    fn apply_outputs(&mut self) {
        let requests = self.ctx.take_requests();

        match requests.delay {
            Some(DelayRequest::Start { delay_ms }) => {
                // A stale expiry from a previous arm must not end the new delay.
                let _ = self.signals.take_delay_elapsed();
                self.hw.start(delay_ms);
            }
            Some(DelayRequest::Cancel) => self.hw.cancel(),
            None => {}
        }

        match requests.start_line {
            Some(true) => self.signals.arm(Line::StartSwitch),
            Some(false) => self.signals.disarm(Line::StartSwitch),
            None => {}
        }

        match requests.interlock_lines {
            Some(true) => self.signals.arm_interlocks(),
            Some(false) => self.signals.disarm_interlocks(),
            None => {}
        }

        let cmds = self.ctx.commands;
        self.hw.set_heater(cmds.heater_on);
        let (r, g, b) = cmds.indicator;
        self.hw.set_indicator(r, g, b);

        for notice in core::mem::take(&mut self.ctx.notices) {
            match notice {
                Notice::Fault(fault) => {
                    self.channel.broadcast(&frames::fault(fault));
                    self.sink.emit(&AppEvent::FaultHandled(fault));
                }
                Notice::State(state) => self.channel.broadcast(&frames::debug_state(state)),
                Notice::Temperature(c) => self.channel.broadcast(&frames::thermistor(c)),
            }
        }
    }
}
