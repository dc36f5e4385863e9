//! Button gesture state table.
//!
//! Debounce confirmation and gesture classification live in one machine.
//! Level guards are on the *logical* level (`true` = switch closed).
//!
//! ```text
//!            active          held active ≥ confirm
//!  IDLE ─────────────▶ DEBOUNCE ─────────────────▶ PRESSED ──[≥ hold]──▶ HOLD ──[≥ long]──▶ LONG
//!   ▲  ◀──inactive ≥ release──┘                       │                   │                  │
//!   │                                             inactive            inactive           inactive
//!   │                                                 ▼                   ▼                  │
//!   │                      WAIT ──[≥ double window]──────────────────▶ SINGLE               │
//!   │                        │                                            │                  │
//!   │                     active                                          │                  │
//!   │                        ▼                                            │                  │
//!   ├──── inactive ──── DOUBLE                                            │                  │
//!   └─────────────────────────────────────────────────────────────────────┴──────────────────┘
//! ```
//!
//! Within a state, exits are evaluated in the order listed below; a timeout
//! listed first wins over a level exit that becomes true on the same tick
//! (a release exactly at the hold threshold still reaches HOLD).
//!
//! DEBOUNCE only confirms an unbroken active run: a single inactive sample
//! restarts the confirm window.  LONG and DOUBLE both wait for the release
//! before rearming, so a press held on past LONG stays silent.

use super::context::GestureContext;
use super::{Dwell, Machine, StateDescriptor, StateId, Transition};
use crate::events::Gesture;

/// States of the per-button gesture machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ButtonState {
    Idle = 0,
    Debounce = 1,
    Pressed = 2,
    Hold = 3,
    Wait = 4,
    Single = 5,
    Double = 6,
    Long = 7,
}

impl ButtonState {
    pub const COUNT: usize = 8;
}

impl StateId for ButtonState {
    fn index(self) -> usize {
        self as usize
    }
}

pub type ButtonMachine = Machine<ButtonState, GestureContext>;

type Exits = &'static [Transition<ButtonState, GestureContext>];

const ACTIVE: bool = true;
const INACTIVE: bool = false;

// ── Dwell readers ─────────────────────────────────────────────

fn debounce_confirm(ctx: &GestureContext) -> u32 {
    ctx.timing.debounce_confirm_ms
}

fn debounce_release(ctx: &GestureContext) -> u32 {
    ctx.timing.debounce_release_ms
}

fn hold(ctx: &GestureContext) -> u32 {
    ctx.timing.hold_ms
}

fn long(ctx: &GestureContext) -> u32 {
    ctx.timing.long_ms
}

fn double_window(ctx: &GestureContext) -> u32 {
    ctx.timing.double_window_ms
}

// ── Actions ───────────────────────────────────────────────────

fn emit_pressed(ctx: &mut GestureContext) {
    ctx.emit(Gesture::Pressed);
}

fn emit_hold(ctx: &mut GestureContext) {
    ctx.emit(Gesture::Hold);
}

fn emit_long(ctx: &mut GestureContext) {
    ctx.emit(Gesture::Long);
}

fn emit_single(ctx: &mut GestureContext) {
    ctx.emit(Gesture::Single);
}

fn emit_double(ctx: &mut GestureContext) {
    ctx.emit(Gesture::Double);
}

// ── Transitions ───────────────────────────────────────────────

const IDLE_EXITS: Exits = &[Transition::when(ACTIVE, Dwell::Immediate, ButtonState::Debounce)];

const DEBOUNCE_EXITS: Exits = &[
    Transition::when(INACTIVE, Dwell::From(debounce_release), ButtonState::Idle),
    Transition::held(ACTIVE, Dwell::From(debounce_confirm), ButtonState::Pressed),
];

const PRESSED_EXITS: Exits = &[
    Transition::after(Dwell::From(hold), ButtonState::Hold),
    Transition::when(INACTIVE, Dwell::Immediate, ButtonState::Wait),
];

// Timeout only: LONG does not additionally require the level to be active.
const HOLD_EXITS: Exits = &[
    Transition::after(Dwell::From(long), ButtonState::Long),
    Transition::when(INACTIVE, Dwell::Immediate, ButtonState::Single),
];

const WAIT_EXITS: Exits = &[
    Transition::after(Dwell::From(double_window), ButtonState::Single),
    Transition::when(ACTIVE, Dwell::Immediate, ButtonState::Double),
];

const SINGLE_EXITS: Exits = &[Transition::after(Dwell::Immediate, ButtonState::Idle)];

// Rearm only once the second press is released.
const DOUBLE_EXITS: Exits = &[Transition::when(INACTIVE, Dwell::Immediate, ButtonState::Idle)];

// Likewise for a long press that is still held.
const LONG_EXITS: Exits = &[Transition::when(INACTIVE, Dwell::Immediate, ButtonState::Idle)];

// ═══════════════════════════════════════════════════════════════════════════
//  Table
// ═══════════════════════════════════════════════════════════════════════════

static BUTTON_STATES: [StateDescriptor<ButtonState, GestureContext>; ButtonState::COUNT] = [
    StateDescriptor {
        id: ButtonState::Idle,
        name: "Idle",
        on_enter: None,
        while_in: None,
        transitions: IDLE_EXITS,
    },
    StateDescriptor {
        id: ButtonState::Debounce,
        name: "Debounce",
        on_enter: None,
        while_in: None,
        transitions: DEBOUNCE_EXITS,
    },
    StateDescriptor {
        id: ButtonState::Pressed,
        name: "Pressed",
        on_enter: Some(emit_pressed),
        while_in: None,
        transitions: PRESSED_EXITS,
    },
    StateDescriptor {
        id: ButtonState::Hold,
        name: "Hold",
        on_enter: None,
        while_in: Some(emit_hold),
        transitions: HOLD_EXITS,
    },
    StateDescriptor {
        id: ButtonState::Wait,
        name: "Wait",
        on_enter: None,
        while_in: None,
        transitions: WAIT_EXITS,
    },
    StateDescriptor {
        id: ButtonState::Single,
        name: "Single",
        on_enter: Some(emit_single),
        while_in: None,
        transitions: SINGLE_EXITS,
    },
    StateDescriptor {
        id: ButtonState::Double,
        name: "Double",
        on_enter: Some(emit_double),
        while_in: None,
        transitions: DOUBLE_EXITS,
    },
    StateDescriptor {
        id: ButtonState::Long,
        name: "Long",
        on_enter: Some(emit_long),
        while_in: None,
        transitions: LONG_EXITS,
    },
];

/// The shared, immutable gesture table.
pub fn build_state_table() -> &'static [StateDescriptor<ButtonState, GestureContext>] {
    &BUTTON_STATES
}

/// A fresh machine resting in IDLE.
pub fn new_machine() -> ButtonMachine {
    Machine::new(build_state_table(), ButtonState::Idle)
}
