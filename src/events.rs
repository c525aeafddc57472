//! Interrupt signal latch.
//!
//! Signals are produced by:
//! - GPIO ISRs (start switch rising edge, mug / water falling edges)
//! - The one-shot start-delay timer callback
//!
//! and consumed by the polling loop, which drains every flag exactly once
//! per tick before running the kettle state machine.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────┐     ┌──────────────┐
//! │ Switch ISR  │────▶│                  │     │              │
//! │ Mug ISR     │────▶│ InterruptSignals │────▶│ Polling loop │
//! │ Water ISR   │────▶│    (atomics)     │     │  (consumer)  │
//! │ Delay timer │────▶│                  │     │              │
//! └─────────────┘     └──────────────────┘     └──────────────┘
//! ```
//!
//! Handlers only store into atomics and return.  A line that is not armed
//! drops its edges, which is how "attach / detach interrupt" is expressed
//! without touching the GPIO interrupt controller from the main loop.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Most recent interlock trip reported by the mug / water ISRs.
/// Last write wins; there is no queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InterlockSignal {
    None = 0,
    MugRemoved = 1,
    WaterEmpty = 2,
}

impl InterlockSignal {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::MugRemoved,
            2 => Self::WaterEmpty,
            _ => Self::None,
        }
    }
}

/// Interrupt lines that can be armed or disarmed by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Line {
    StartSwitch = 0b001,
    Mug = 0b010,
    Water = 0b100,
}

impl Line {
    const fn mask(self) -> u8 {
        self as u8
    }
}

const INTERLOCK_LINES: u8 = Line::Mug.mask() | Line::Water.mask();

/// Atomic flags shared between interrupt context and the polling loop.
///
/// Boots with only the start switch armed, matching an Idle kettle.
pub struct InterruptSignals {
    start_pressed: AtomicBool,
    delay_elapsed: AtomicBool,
    interlock: AtomicU8,
    armed: AtomicU8,
}

/// Process-wide instance the GPIO and timer callbacks write into.
pub static SIGNALS: InterruptSignals = InterruptSignals::new();

impl Default for InterruptSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptSignals {
    pub const fn new() -> Self {
        Self {
            start_pressed: AtomicBool::new(false),
            delay_elapsed: AtomicBool::new(false),
            interlock: AtomicU8::new(InterlockSignal::None as u8),
            armed: AtomicU8::new(Line::StartSwitch.mask()),
        }
    }

    // ── ISR side ──────────────────────────────────────────────

    /// Start switch rising edge.  Safe to call from ISR context.
    pub fn on_start_edge(&self) {
        if self.is_armed(Line::StartSwitch) {
            self.start_pressed.store(true, Ordering::Release);
        }
    }

    /// Mug switch falling edge (mug lifted).  Safe to call from ISR context.
    pub fn on_mug_removed(&self) {
        if self.is_armed(Line::Mug) {
            self.interlock
                .store(InterlockSignal::MugRemoved as u8, Ordering::Release);
        }
    }

    /// Water switch falling edge (reservoir empty).  Safe to call from ISR context.
    pub fn on_water_lost(&self) {
        if self.is_armed(Line::Water) {
            self.interlock
                .store(InterlockSignal::WaterEmpty as u8, Ordering::Release);
        }
    }

    /// One-shot start-delay timer expiry.  Safe to call from timer context.
    pub fn on_delay_elapsed(&self) {
        self.delay_elapsed.store(true, Ordering::Release);
    }

    // ── Main-loop side ────────────────────────────────────────

    /// Consume a pending start press.
    pub fn take_start(&self) -> bool {
        self.start_pressed.swap(false, Ordering::AcqRel)
    }

    /// Consume a pending delay-timer expiry.
    pub fn take_delay_elapsed(&self) -> bool {
        self.delay_elapsed.swap(false, Ordering::AcqRel)
    }

    /// Consume the latest interlock trip, leaving `None` behind.
    pub fn take_interlock(&self) -> InterlockSignal {
        InterlockSignal::from_u8(
            self.interlock
                .swap(InterlockSignal::None as u8, Ordering::AcqRel),
        )
    }

    pub fn is_armed(&self, line: Line) -> bool {
        self.armed.load(Ordering::Acquire) & line.mask() != 0
    }

    pub fn arm(&self, line: Line) {
        self.armed.fetch_or(line.mask(), Ordering::AcqRel);
    }

    pub fn disarm(&self, line: Line) {
        self.armed.fetch_and(!line.mask(), Ordering::AcqRel);
        if line == Line::StartSwitch {
            self.start_pressed.store(false, Ordering::Release);
        }
    }

    /// Arm both interlock lines with a clean latch so a trip left over
    /// from a previous session cannot fault the new one.
    pub fn arm_interlocks(&self) {
        self.interlock
            .store(InterlockSignal::None as u8, Ordering::Release);
        self.armed.fetch_or(INTERLOCK_LINES, Ordering::AcqRel);
    }

    pub fn disarm_interlocks(&self) {
        self.armed.fetch_and(!INTERLOCK_LINES, Ordering::AcqRel);
    }

    /// Return to the power-on state (used when the device reboots).
    pub fn reset(&self) {
        self.start_pressed.store(false, Ordering::Release);
        self.delay_elapsed.store(false, Ordering::Release);
        self.interlock
            .store(InterlockSignal::None as u8, Ordering::Release);
        self.armed
            .store(Line::StartSwitch.mask(), Ordering::Release);
    }
}
