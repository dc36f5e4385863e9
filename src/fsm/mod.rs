//! Timed, table-driven finite state machine engine.
//!
//! Classic embedded FSM pattern: a static table of states, each with an
//! ordered list of outgoing transitions and optional plain-`fn` actions.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  StateDescriptor table (indexed by StateId::index)               │
//! │  ┌─────────┬──────────┬──────────┬────────────────────────────┐  │
//! │  │ id      │ on_enter │ while_in │ transitions (ordered)      │  │
//! │  ├─────────┼──────────┼──────────┼────────────────────────────┤  │
//! │  │ A       │ fn(ctx)  │ -        │ [guard?, dwell, next] ...  │  │
//! │  │ B       │ -        │ fn(ctx)  │ [guard?, dwell, next] ...  │  │
//! │  └─────────┴──────────┴──────────┴────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each call to [`Machine::advance`] walks the current state's transitions
//! top to bottom and takes the **first** one whose level guard (if any)
//! matches and whose dwell has elapsed since the state was entered.  A
//! [`held`](Transition::held) edge instead measures its dwell from the
//! later of state entry and the last level change, so one contrary sample
//! restarts it.  Taking
//! a transition resets the entry timestamp and runs the new state's
//! `on_enter`.  Afterwards the (possibly new) current state's `while_in`
//! runs, so it also fires on the entry tick.  At most one transition is
//! taken per call.
//!
//! Dwell times are relative to state entry, so changing a threshold in the
//! context only affects transitions evaluated after the change.

pub mod context;
pub mod states;

use core::fmt::Debug;

use log::trace;

/// Identity of a state.  `index()` must be the state's position in the
/// table handed to [`Machine::new`].
pub trait StateId: Copy + Eq + Debug + 'static {
    fn index(self) -> usize;
}

/// Entry / while-in-state action.
pub type ActionFn<C> = fn(&mut C);

/// Reads a dwell threshold from the context at evaluation time.
pub type DwellFn<C> = fn(&C) -> u32;

/// Minimum time (ms) the machine must have spent in the current state.
pub enum Dwell<C> {
    Immediate,
    Fixed(u32),
    From(DwellFn<C>),
}

impl<C> Dwell<C> {
    fn millis(&self, ctx: &C) -> u32 {
        match self {
            Self::Immediate => 0,
            Self::Fixed(ms) => *ms,
            Self::From(read) => read(ctx),
        }
    }
}

/// One outgoing edge.  `guard: None` means the edge is purely time-gated.
pub struct Transition<S, C> {
    pub guard: Option<bool>,
    pub dwell: Dwell<C>,
    /// Dwell counts only the current unbroken run of the guarded level.
    pub continuous: bool,
    pub next: S,
}

impl<S, C> Transition<S, C> {
    /// Fires once the level equals `level` and `dwell` has elapsed.
    pub const fn when(level: bool, dwell: Dwell<C>, next: S) -> Self {
        Self {
            guard: Some(level),
            dwell,
            continuous: false,
            next,
        }
    }

    /// Fires once the level has equalled `level` on every sample for
    /// `dwell` within the current state.
    pub const fn held(level: bool, dwell: Dwell<C>, next: S) -> Self {
        Self {
            guard: Some(level),
            dwell,
            continuous: true,
            next,
        }
    }

    /// Fires once `dwell` has elapsed, whatever the level.
    pub const fn after(dwell: Dwell<C>, next: S) -> Self {
        Self {
            guard: None,
            dwell,
            continuous: false,
            next,
        }
    }

    fn is_satisfied(&self, ctx: &C, level: bool, elapsed: Elapsed) -> bool {
        let ms = if self.continuous { elapsed.steady } else { elapsed.in_state };
        self.guard.is_none_or(|expected| expected == level) && ms >= self.dwell.millis(ctx)
    }
}

#[derive(Clone, Copy)]
struct Elapsed {
    in_state: u32,
    /// Since the later of state entry and the last level change.
    steady: u32,
}

/// Static descriptor for one state.  Stored in a `static` table — no heap,
/// no `dyn`.
pub struct StateDescriptor<S: 'static, C: 'static> {
    pub id: S,
    pub name: &'static str,
    pub on_enter: Option<ActionFn<C>>,
    pub while_in: Option<ActionFn<C>>,
    pub transitions: &'static [Transition<S, C>],
}

/// A running instance of a state table.
///
/// The table is shared and immutable; each machine only carries its
/// current state and the time it entered it.
pub struct Machine<S: StateId, C: 'static> {
    table: &'static [StateDescriptor<S, C>],
    initial: S,
    current: S,
    /// Monotonic ms timestamp at which `current` was entered.
    entered_at: u32,
    /// Level seen on the previous tick and when it (or `current`) last changed.
    last_level: Option<bool>,
    steady_since: u32,
}

impl<S: StateId, C: 'static> Machine<S, C> {
    /// Construct a machine resting in `initial`.  The initial state's
    /// `on_enter` is not run.
    pub fn new(table: &'static [StateDescriptor<S, C>], initial: S) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, d)| d.id.index() == i),
            "state table out of order"
        );
        Self {
            table,
            initial,
            current: initial,
            entered_at: 0,
            last_level: None,
            steady_since: 0,
        }
    }

    /// Evaluate one tick.  Returns the state entered on this tick, if any.
    pub fn advance(&mut self, ctx: &mut C, level: bool, now: u32) -> Option<S> {
        if self.last_level != Some(level) {
            self.last_level = Some(level);
            self.steady_since = now;
        }
        let elapsed = Elapsed {
            in_state: now.wrapping_sub(self.entered_at),
            steady: now.wrapping_sub(self.steady_since),
        };
        let next = self
            .descriptor(self.current)
            .transitions
            .iter()
            .find(|t| t.is_satisfied(ctx, level, elapsed))
            .map(|t| t.next);

        if let Some(next) = next {
            trace!(
                "fsm: {} -> {} after {}ms",
                self.descriptor(self.current).name,
                self.descriptor(next).name,
                elapsed.in_state
            );
            self.current = next;
            self.entered_at = now;
            self.steady_since = now;
            if let Some(enter) = self.descriptor(next).on_enter {
                enter(ctx);
            }
        }

        if let Some(action) = self.descriptor(self.current).while_in {
            action(ctx);
        }

        next
    }

    /// Return to the initial state without running any action.
    pub fn reset(&mut self, now: u32) {
        self.current = self.initial;
        self.entered_at = now;
        self.last_level = None;
        self.steady_since = now;
    }

    pub fn state(&self) -> S {
        self.current
    }

    pub fn state_name(&self) -> &'static str {
        self.descriptor(self.current).name
    }

    /// Milliseconds spent in the current state as of `now`.
    pub fn time_in_state(&self, now: u32) -> u32 {
        now.wrapping_sub(self.entered_at)
    }

    fn descriptor(&self, id: S) -> &'static StateDescriptor<S, C> {
        let table: &'static [StateDescriptor<S, C>] = self.table;
        &table[id.index()]
    }
}
