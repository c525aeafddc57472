//! Shared mutable context threaded through every kettle state handler.
//!
//! `KettleContext` is the single struct that state handlers read from and
//! write to.  It contains the inputs sampled for this tick, actuator
//! command outputs, requests for the interrupt and timer plumbing, and the
//! per-state records (session, cooldown, error).  Think of it as the
//! "blackboard" in a blackboard architecture: handlers never touch
//! hardware, the polling loop applies whatever they leave here.

use heapless::Vec;

use crate::config::KettleConfig;
use crate::error::KettleFault;
use crate::events::InterlockSignal;

use super::KettleState;

/// Maximum notices a single tick can queue (one transition plus telemetry).
pub const NOTICE_CAPACITY: usize = 4;

// ---------------------------------------------------------------------------
// Tick inputs (read-only to state handlers; written by the polling loop)
// ---------------------------------------------------------------------------

/// Everything the state machine observes during one tick.
#[derive(Debug, Clone, Copy)]
pub struct TickInputs {
    /// Monotonic milliseconds since boot.
    pub now_ms: u64,
    /// Start switch rising edge drained this tick.
    pub start_pressed: bool,
    /// Start-delay timer expiry drained this tick.
    pub delay_elapsed: bool,
    /// Interlock trip drained this tick.
    pub interlock: InterlockSignal,
    /// Mug switch level (HIGH = present).
    pub mug_present: bool,
    /// Water switch level (HIGH = present).
    pub water_present: bool,
    /// Smoothed thermistor estimate, `None` while the channel reads a rail.
    pub temperature_c: Option<f32>,
}

impl Default for TickInputs {
    fn default() -> Self {
        Self {
            now_ms: 0,
            start_pressed: false,
            delay_elapsed: false,
            interlock: InterlockSignal::None,
            mug_present: false,
            water_present: false,
            temperature_c: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator commands (written by state handlers; consumed by polling loop)
// ---------------------------------------------------------------------------

/// Commands that state handlers write to request actuator actions.
/// The polling loop applies these to the actual drivers each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorCommands {
    /// Heating element relay.
    pub heater_on: bool,
    /// Status indicator colour (R, G, B), each 0–255.
    pub indicator: (u8, u8, u8),
}

impl Default for ActuatorCommands {
    fn default() -> Self {
        Self {
            heater_on: false,
            indicator: (0, 0, 0),
        }
    }
}

impl ActuatorCommands {
    /// Heater off, indicator dark.
    pub fn all_off() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Plumbing requests (written by state handlers; consumed by polling loop)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayRequest {
    /// (Re)start the one-shot start-delay timer.
    Start { delay_ms: u32 },
    /// Stop the timer if it is still pending.
    Cancel,
}

/// Side effects the handlers cannot perform themselves.  Each field is
/// last-write-wins within a tick, so an exit action followed by an enter
/// action resolves to the enter action's request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requests {
    pub delay: Option<DelayRequest>,
    /// `Some(true)` arms the start switch interrupt, `Some(false)` disarms it.
    pub start_line: Option<bool>,
    /// `Some(true)` arms the mug and water interrupts, `Some(false)` disarms them.
    pub interlock_lines: Option<bool>,
}

/// Outbound notices for connected clients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Notice {
    /// A fault was handled; broadcast as `ERROR <message>`.
    Fault(KettleFault),
    /// The state machine entered a new state (debug telemetry).
    State(KettleState),
    /// Heating-tick thermistor estimate (debug telemetry).
    Temperature(f32),
}

// ---------------------------------------------------------------------------
// Per-state records
// ---------------------------------------------------------------------------

/// Lives from entry into Heating until the heater is released.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatingSession {
    pub start_ms: u64,
    /// Fixed at session start; config changes apply to the next session.
    pub target_c: f32,
}

/// Lives from entry into PostHeat until the return to Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownWindow {
    pub start_ms: u64,
}

/// Cause recorded when the machine is forced into Error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorRecord {
    pub fault: KettleFault,
}

// ---------------------------------------------------------------------------
// KettleContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct KettleContext {
    // -- Inputs --
    /// Latest inputs.  Updated before each FSM tick.
    pub inputs: TickInputs,

    // -- Outputs --
    /// Commands to be applied to actuators after the FSM tick.
    pub commands: ActuatorCommands,
    /// Timer / interrupt requests to be applied after the FSM tick.
    pub requests: Requests,
    /// Messages to broadcast after the FSM tick.
    pub notices: Vec<Notice, NOTICE_CAPACITY>,

    // -- State records --
    pub session: Option<HeatingSession>,
    pub cooldown: Option<CooldownWindow>,
    pub error: Option<ErrorRecord>,

    // -- Configuration --
    pub config: KettleConfig,
}

impl KettleContext {
    pub fn new(config: KettleConfig) -> Self {
        Self {
            inputs: TickInputs::default(),
            commands: ActuatorCommands::all_off(),
            requests: Requests::default(),
            notices: Vec::new(),
            session: None,
            cooldown: None,
            error: None,
            config,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.inputs.now_ms
    }

    /// Record the fault that is about to send the machine to Error.
    pub fn record_fault(&mut self, fault: KettleFault) {
        self.error = Some(ErrorRecord { fault });
    }

    /// Queue a notice.  A full queue drops the new notice.
    pub fn notify(&mut self, notice: Notice) {
        if self.notices.push(notice).is_err() {
            log::warn!("notice queue full, dropped {:?}", notice);
        }
    }

    /// Hand the pending requests to the caller, leaving none behind.
    pub fn take_requests(&mut self) -> Requests {
        core::mem::take(&mut self.requests)
    }
}
