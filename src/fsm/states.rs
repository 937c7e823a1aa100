//! Concrete alarm state handlers and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!  DAY_DISARMED ──[dark]──▶ NIGHT_ARMED_IDLE ──[beam broken]──▶ NIGHT_ARMED_TRIGGERED
//!       ▲                          │                                   │
//!       └─────────[bright]─────────┴──────────────[bright]─────────────┘
//! ```
//!
//! A triggered alarm latches: the only way back to idle is through
//! `DayDisarmed`.

use super::context::{AlarmContext, AlarmNotice, SirenCommand};
use super::{StateDescriptor, StateId};
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table. Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: DayDisarmed
        StateDescriptor {
            id: StateId::DayDisarmed,
            name: "DayDisarmed",
            on_enter: Some(day_enter),
            on_exit: None,
            on_update: day_update,
        },
        // Index 1: NightArmedIdle
        StateDescriptor {
            id: StateId::NightArmedIdle,
            name: "NightArmedIdle",
            on_enter: Some(armed_idle_enter),
            on_exit: None,
            on_update: armed_idle_update,
        },
        // Index 2: NightArmedTriggered
        StateDescriptor {
            id: StateId::NightArmedTriggered,
            name: "NightArmedTriggered",
            on_enter: Some(triggered_enter),
            on_exit: Some(triggered_exit),
            on_update: triggered_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  DAY_DISARMED
// ═══════════════════════════════════════════════════════════════════════════

fn day_enter(ctx: &mut AlarmContext) {
    // Startup entry: outputs were already driven to their safe levels.
    if !ctx.armed {
        info!("DAY: alarm disarmed");
        return;
    }

    ctx.armed = false;
    ctx.commands.laser = Some(false);
    ctx.commands.outside_light = Some(false);
    ctx.commands.siren = SirenCommand::Stop;
    ctx.notify(AlarmNotice::OutsideLight(false));
    info!("DAY: bright, laser and outside light off");
}

fn day_update(ctx: &mut AlarmContext) -> Option<StateId> {
    if ctx.inputs.dark {
        return Some(StateId::NightArmedIdle);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  NIGHT_ARMED_IDLE
// ═══════════════════════════════════════════════════════════════════════════

fn armed_idle_enter(ctx: &mut AlarmContext) {
    ctx.armed = true;
    ctx.commands.laser = Some(true);
    ctx.commands.outside_light = Some(true);
    ctx.notify(AlarmNotice::OutsideLight(true));
    info!("NIGHT: dark, laser armed and outside light on");
}

fn armed_idle_update(ctx: &mut AlarmContext) -> Option<StateId> {
    if !ctx.inputs.dark {
        return Some(StateId::DayDisarmed);
    }
    if ctx.beam_broken() {
        return Some(StateId::NightArmedTriggered);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  NIGHT_ARMED_TRIGGERED
// ═══════════════════════════════════════════════════════════════════════════

fn triggered_enter(ctx: &mut AlarmContext) {
    debug_assert!(ctx.armed, "trigger while disarmed");
    ctx.triggered = true;
    if !ctx.inputs.siren_playing {
        ctx.commands.siren = SirenCommand::Start;
    }
    ctx.notify(AlarmNotice::Alarm(true));
    warn!("NIGHT: beam broken, alarm triggered");
}

fn triggered_exit(ctx: &mut AlarmContext) {
    ctx.triggered = false;
    ctx.commands.siren = SirenCommand::Stop;
    ctx.notify(AlarmNotice::Alarm(false));
    info!("NIGHT: alarm cleared");
}

fn triggered_update(ctx: &mut AlarmContext) -> Option<StateId> {
    if !ctx.inputs.dark {
        return Some(StateId::DayDisarmed);
    }
    // Re-break while latched: replay a finished siren, tell nobody.
    if ctx.beam_broken() && !ctx.inputs.siren_playing {
        ctx.commands.siren = SirenCommand::Start;
    }
    None
}
