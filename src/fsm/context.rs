//! Per-button context threaded through the gesture state actions.
//!
//! State actions are plain `fn` pointers, so everything they need lives
//! here: the button's current thresholds (read by the dwell functions) and
//! an outbox for the gestures they classify.  The scheduler drains the
//! outbox after every [`Machine::advance`](super::Machine::advance).

use heapless::Vec;
use log::warn;

use crate::config::TimingConfig;
use crate::events::Gesture;

/// Upper bound of gestures one tick can produce (an entry action plus a
/// while-in-state action).
pub const MAX_GESTURES_PER_TICK: usize = 2;

pub type Emitted = Vec<Gesture, MAX_GESTURES_PER_TICK>;

#[derive(Debug, Clone, Default)]
pub struct GestureContext {
    pub timing: TimingConfig,
    emitted: Emitted,
}

impl GestureContext {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            timing,
            emitted: Vec::new(),
        }
    }

    pub fn emit(&mut self, gesture: Gesture) {
        if self.emitted.push(gesture).is_err() {
            warn!("fsm: gesture outbox full, dropping {:?}", gesture);
        }
    }

    /// Take everything emitted since the last call.
    pub fn take_emitted(&mut self) -> Emitted {
        core::mem::take(&mut self.emitted)
    }
}
