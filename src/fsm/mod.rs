//! Function-pointer finite state machine engine for the intrusion alarm.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                     │
//! │  ┌─────────────────────┬──────────┬─────────┬────────────────┐  │
//! │  │ StateId             │ on_enter │ on_exit │ on_update      │  │
//! │  ├─────────────────────┼──────────┼─────────┼────────────────┤  │
//! │  │ DayDisarmed         │ fn(ctx)  │ -       │ fn(ctx)->Opt<> │  │
//! │  │ NightArmedIdle      │ fn(ctx)  │ -       │ fn(ctx)->Opt<> │  │
//! │  │ NightArmedTriggered │ fn(ctx)  │ fn(ctx) │ fn(ctx)->Opt<> │  │
//! │  └─────────────────────┴──────────┴─────────┴────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the
//! current pointer. All functions receive `&mut AlarmContext`.

pub mod context;
pub mod states;

use context::{AlarmContext, AlarmInputs};
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    DayDisarmed = 0,
    NightArmedIdle = 1,
    NightArmedTriggered = 2,
}

impl StateId {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 3;

    /// Convert an index back to `StateId`. Out-of-range is a bug; release
    /// builds fall back to `DayDisarmed`.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::DayDisarmed,
            1 => Self::NightArmedIdle,
            2 => Self::NightArmedTriggered,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::DayDisarmed
            }
        }
    }

    pub fn is_armed(self) -> bool {
        self != Self::DayDisarmed
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut AlarmContext);

/// Per-tick update handler. Returns `Some(next)` to transition.
pub type StateUpdateFn = fn(&mut AlarmContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    current: usize,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, s)| s.id as usize == i),
            "state table out of order"
        );
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut AlarmContext) {
        info!("alarm FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut AlarmContext) {
        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut AlarmContext) {
        let next_idx = next_id as usize;

        info!(
            "alarm FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}

// ---------------------------------------------------------------------------
// Alarm policy: engine + context as one unit
// ---------------------------------------------------------------------------

/// The alarm state machine together with its blackboard.
///
/// Owned by the controller and only ever advanced under its state lock.
pub struct AlarmPolicy {
    fsm: Fsm,
    ctx: AlarmContext,
}

impl AlarmPolicy {
    /// Start disarmed. No commands or notices are produced by the startup
    /// entry.
    pub fn new() -> Self {
        let mut fsm = Fsm::new(states::build_state_table(), StateId::DayDisarmed);
        let mut ctx = AlarmContext::new();
        fsm.start(&mut ctx);
        ctx.begin_cycle(AlarmInputs::default());
        Self { fsm, ctx }
    }

    /// Run one tick with fresh inputs; returns the context holding this
    /// tick's commands and notices.
    pub fn cycle(&mut self, inputs: AlarmInputs) -> &AlarmContext {
        self.ctx.begin_cycle(inputs);
        self.fsm.tick(&mut self.ctx);
        &self.ctx
    }

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn context(&self) -> &AlarmContext {
        &self.ctx
    }
}

impl Default for AlarmPolicy {
    fn default() -> Self {
        Self::new()
    }
}
