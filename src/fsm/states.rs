//! Concrete kettle state handlers.
//!
//! Each state is defined by three plain functions (enter, exit, update)
//! selected by an exhaustive `match` on [`KettleState`], so adding a state
//! without handlers is a compile error.
//!
//! ```text
//!  IDLE ──[start edge]──▶ PRE_INIT ──[delay timer]──▶ POST_INIT
//!    ▲                                                   │
//!    │                                   [mug+water ok]  │  [mug/water missing]
//!    │                                         ▼         ▼
//!    │                                     HEATING ──▶ ERROR
//!    │                     [temp ≥ target]     │  [interlock / timeout]
//!    │                                         ▼
//!    └───────────[cooldown elapsed]────── POST_HEAT
//!
//!  ERROR ──[handled next tick]──▶ IDLE
//! ```

use log::{info, warn};

use super::KettleState;
use super::context::{
    ActuatorCommands, CooldownWindow, DelayRequest, HeatingSession, KettleContext, Notice,
};
use crate::error::KettleFault;
use crate::events::InterlockSignal;

pub const COLOUR_IDLE: (u8, u8, u8) = (0, 255, 255);
pub const COLOUR_HEATING: (u8, u8, u8) = (0, 255, 0);
pub const COLOUR_POST_HEAT: (u8, u8, u8) = (255, 128, 0);
pub const COLOUR_ERROR: (u8, u8, u8) = (255, 0, 0);

// ═══════════════════════════════════════════════════════════════════════════
//  Dispatch
// ═══════════════════════════════════════════════════════════════════════════

pub fn on_enter(state: KettleState, ctx: &mut KettleContext) {
    match state {
        KettleState::Idle => idle_enter(ctx),
        KettleState::PreInit => pre_init_enter(ctx),
        KettleState::PostInit => {}
        KettleState::Heating => heating_enter(ctx),
        KettleState::PostHeat => post_heat_enter(ctx),
        KettleState::Error => error_enter(ctx),
    }
}

pub fn on_exit(state: KettleState, ctx: &mut KettleContext) {
    match state {
        KettleState::PreInit => pre_init_exit(ctx),
        KettleState::Heating => heating_exit(ctx),
        KettleState::PostHeat => post_heat_exit(ctx),
        KettleState::Error => error_exit(ctx),
        KettleState::Idle | KettleState::PostInit => {}
    }
}

pub fn on_update(state: KettleState, ctx: &mut KettleContext) -> Option<KettleState> {
    match state {
        KettleState::Idle => idle_update(ctx),
        KettleState::PreInit => pre_init_update(ctx),
        KettleState::PostInit => post_init_update(ctx),
        KettleState::Heating => heating_update(ctx),
        KettleState::PostHeat => post_heat_update(ctx),
        KettleState::Error => error_update(ctx),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut KettleContext) {
    ctx.commands.heater_on = false;
    ctx.commands.indicator = COLOUR_IDLE;
}

fn idle_update(ctx: &mut KettleContext) -> Option<KettleState> {
    if ctx.inputs.start_pressed {
        info!("IDLE: start pressed");
        return Some(KettleState::PreInit);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  PRE_INIT state: waiting out the start delay
// ═══════════════════════════════════════════════════════════════════════════

fn pre_init_enter(ctx: &mut KettleContext) {
    let delay_ms = ctx.config.start_delay_ms;
    ctx.requests.delay = Some(DelayRequest::Start { delay_ms });
    info!("PRE_INIT: start delay armed for {}ms", delay_ms);
}

fn pre_init_exit(ctx: &mut KettleContext) {
    ctx.requests.delay = Some(DelayRequest::Cancel);
}

fn pre_init_update(ctx: &mut KettleContext) -> Option<KettleState> {
    if ctx.inputs.delay_elapsed {
        return Some(KettleState::PostInit);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  POST_INIT state: interlock check before the heater may switch on
// ═══════════════════════════════════════════════════════════════════════════

fn post_init_update(ctx: &mut KettleContext) -> Option<KettleState> {
    if !ctx.inputs.mug_present {
        ctx.record_fault(KettleFault::NoMug);
        return Some(KettleState::Error);
    }
    if !ctx.inputs.water_present {
        ctx.record_fault(KettleFault::NoWater);
        return Some(KettleState::Error);
    }
    Some(KettleState::Heating)
}

// ═══════════════════════════════════════════════════════════════════════════
//  HEATING state: relay closed until target, timeout or interlock trip
// ═══════════════════════════════════════════════════════════════════════════

fn heating_enter(ctx: &mut KettleContext) {
    let target_c = ctx.config.target_temperature_c;
    ctx.session = Some(HeatingSession {
        start_ms: ctx.now_ms(),
        target_c,
    });
    ctx.commands.heater_on = true;
    ctx.commands.indicator = COLOUR_HEATING;
    ctx.requests.interlock_lines = Some(true);
    info!(
        "HEATING: target {:.1}\u{00b0}C, timeout {}ms",
        target_c, ctx.config.heating_timeout_ms
    );
}

fn heating_exit(ctx: &mut KettleContext) {
    // Every way out of Heating releases the relay.
    ctx.commands.heater_on = false;
    ctx.requests.interlock_lines = Some(false);
    ctx.session = None;
}

fn heating_update(ctx: &mut KettleContext) -> Option<KettleState> {
    // Interlocks first: a trip must win over any progress this tick.
    if let Some(fault) = interlock_fault(ctx) {
        ctx.commands.heater_on = false;
        warn!("HEATING: interlock tripped: {}", fault);
        ctx.record_fault(fault);
        return Some(KettleState::Error);
    }

    let session = ctx.session.unwrap_or(HeatingSession {
        start_ms: ctx.now_ms(),
        target_c: ctx.config.target_temperature_c,
    });

    // No reading means "not there yet"; the timeout still bounds the session.
    if let Some(celsius) = ctx.inputs.temperature_c {
        if ctx.config.debug_broadcasts {
            ctx.notify(Notice::Temperature(celsius));
        }
        if celsius >= session.target_c {
            info!("HEATING: reached {:.1}\u{00b0}C", celsius);
            return Some(KettleState::PostHeat);
        }
    }

    let elapsed = ctx.now_ms().saturating_sub(session.start_ms);
    if elapsed > u64::from(ctx.config.heating_timeout_ms) {
        ctx.record_fault(KettleFault::HeatingTimeout);
        return Some(KettleState::Error);
    }

    ctx.commands.heater_on = true;
    None
}

fn interlock_fault(ctx: &KettleContext) -> Option<KettleFault> {
    match ctx.inputs.interlock {
        InterlockSignal::MugRemoved => return Some(KettleFault::MugRemoved),
        InterlockSignal::WaterEmpty => return Some(KettleFault::WaterEmpty),
        InterlockSignal::None => {}
    }
    if ctx.config.poll_interlocks {
        if !ctx.inputs.mug_present {
            return Some(KettleFault::MugRemoved);
        }
        if !ctx.inputs.water_present {
            return Some(KettleFault::WaterEmpty);
        }
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  POST_HEAT state: cooldown with the start switch locked out
// ═══════════════════════════════════════════════════════════════════════════

fn post_heat_enter(ctx: &mut KettleContext) {
    ctx.commands.heater_on = false;
    ctx.commands.indicator = COLOUR_POST_HEAT;
    ctx.requests.start_line = Some(false);
    ctx.cooldown = Some(CooldownWindow {
        start_ms: ctx.now_ms(),
    });
    info!("POST_HEAT: cooling down for {}ms", ctx.config.cooldown_ms);
}

fn post_heat_exit(ctx: &mut KettleContext) {
    ctx.cooldown = None;
    ctx.requests.start_line = Some(true);
}

fn post_heat_update(ctx: &mut KettleContext) -> Option<KettleState> {
    let start_ms = ctx.cooldown.map_or(0, |c| c.start_ms);
    if ctx.now_ms().saturating_sub(start_ms) >= u64::from(ctx.config.cooldown_ms) {
        return Some(KettleState::Idle);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ERROR state: relay open, fault reported once, then back to Idle
// ═══════════════════════════════════════════════════════════════════════════

fn error_enter(ctx: &mut KettleContext) {
    ctx.commands = ActuatorCommands::all_off();
    ctx.commands.indicator = ctx
        .error
        .map_or(COLOUR_ERROR, |record| record.fault.indicator());
}

fn error_update(ctx: &mut KettleContext) -> Option<KettleState> {
    ctx.commands.heater_on = false;
    ctx.commands.indicator = COLOUR_ERROR;
    if !report_fault(ctx) {
        warn!("ERROR: entered without a recorded fault");
    }
    Some(KettleState::Idle)
}

/// Leaving Error before its update ran (a forced `SWITCH`) still reports
/// the fault.
fn error_exit(ctx: &mut KettleContext) {
    ctx.commands.heater_on = false;
    report_fault(ctx);
}

fn report_fault(ctx: &mut KettleContext) -> bool {
    match ctx.error.take() {
        Some(record) => {
            warn!("ERROR: {}", record.fault);
            ctx.notify(Notice::Fault(record.fault));
            true
        }
        None => false,
    }
}
