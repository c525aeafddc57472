//! Kettle control finite state machine engine.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  match KettleState                                       │
//! │  ┌───────────┬───────────┬──────────┬─────────────────┐  │
//! │  │ State     │ on_enter  │ on_exit  │ on_update       │  │
//! │  ├───────────┼───────────┼──────────┼─────────────────┤  │
//! │  │ Idle      │ cyan      │ -        │ start edge?     │  │
//! │  │ PreInit   │ arm delay │ cancel   │ delay elapsed?  │  │
//! │  │ PostInit  │ -         │ -        │ mug + water?    │  │
//! │  │ Heating   │ relay on  │ relay off│ trip/temp/time  │  │
//! │  │ PostHeat  │ lock start│ unlock   │ cooldown done?  │  │
//! │  │ Error     │ relay off │ report   │ report → Idle   │  │
//! │  └───────────┴───────────┴──────────┴─────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next)`, the engine runs `on_exit` for the current
//! state, then `on_enter` for the next, and updates the current state.
//! All handlers receive `&mut KettleContext`, which holds the inputs
//! sampled for this tick, actuator commands, and the state records.

pub mod context;
pub mod states;

use context::{KettleContext, Notice};
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Heating lifecycle states.  The discriminant is the number reported in
/// `DEBUG,STATE,<n>` frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KettleState {
    Idle = 0,
    PreInit = 1,
    PostInit = 2,
    Heating = 3,
    PostHeat = 4,
    Error = 5,
}

impl KettleState {
    pub const ALL: [Self; 6] = [
        Self::Idle,
        Self::PreInit,
        Self::PostInit,
        Self::Heating,
        Self::PostHeat,
        Self::Error,
    ];

    pub const fn index(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::PreInit => "PreInit",
            Self::PostInit => "PostInit",
            Self::Heating => "Heating",
            Self::PostHeat => "PostHeat",
            Self::Error => "Error",
        }
    }
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The kettle state machine engine.
///
/// Holds only the current state; everything the handlers touch lives in the
/// [`KettleContext`] passed to each call.
pub struct Fsm {
    current: KettleState,
    transitions: u32,
}

impl Default for Fsm {
    fn default() -> Self {
        Self::new()
    }
}

impl Fsm {
    /// A machine in `Idle`.  Call [`start`](Self::start) before the first tick.
    pub fn new() -> Self {
        Self {
            current: KettleState::Idle,
            transitions: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    pub fn start(&mut self, ctx: &mut KettleContext) {
        info!("Kettle FSM starting in state: {}", self.current.name());
        states::on_enter(self.current, ctx);
    }

    /// Advance the machine by one tick using `ctx.inputs`.
    pub fn tick(&mut self, ctx: &mut KettleContext) {
        if let Some(next) = states::on_update(self.current, ctx) {
            self.transition(next, ctx);
        }
    }

    /// Jump straight to `next`, running the current state's exit action
    /// first.  Forcing the state the machine is already in re-runs its
    /// entry action (a second `SWITCH` restarts the start delay).
    pub fn force_transition(&mut self, next: KettleState, ctx: &mut KettleContext) {
        self.transition(next, ctx);
    }

    pub fn current_state(&self) -> KettleState {
        self.current
    }

    pub fn transition_count(&self) -> u32 {
        self.transitions
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next: KettleState, ctx: &mut KettleContext) {
        info!(
            "Kettle transition: {} -> {}",
            self.current.name(),
            next.name()
        );

        states::on_exit(self.current, ctx);

        self.current = next;
        self.transitions = self.transitions.wrapping_add(1);

        states::on_enter(next, ctx);

        if ctx.config.debug_broadcasts {
            ctx.notify(Notice::State(next));
        }
    }
}
