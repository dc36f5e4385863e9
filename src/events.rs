//! Gestures, handlers, and the self-contained events that carry them to
//! the dispatch worker.
//!
//! ```text
//! ┌─────────────┐  Gesture   ┌──────────────┐  GestureEvent  ┌──────────┐
//! │ Button FSM  │──────────▶│ HandlerTable │──────────────▶│ Dispatch │
//! │ (tick ctx)  │           │ (per button) │  (owned copy)  │  queue   │
//! └─────────────┘           └──────────────┘               └──────────┘
//! ```
//!
//! A [`GestureEvent`] owns a clone of the handler it will invoke, so
//! changing or removing the handler (or the whole button) after the event
//! was queued cannot affect delivery.

use core::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Dense button identifier, `0..registry.len()`.
pub type ButtonId = u8;

/// A classified user interaction.
///
/// The discriminants are the handler-table indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Gesture {
    Single = 0,
    Double = 1,
    Pressed = 2,
    /// Emitted on every tick the button stays in HOLD (auto-repeat).
    Hold = 3,
    Long = 4,
}

impl Gesture {
    pub const COUNT: usize = 5;

    pub const ALL: [Gesture; Gesture::COUNT] = [
        Self::Single,
        Self::Double,
        Self::Pressed,
        Self::Hold,
        Self::Long,
    ];

    /// Convert a raw table index back to a gesture.
    pub fn from_index(idx: usize) -> Result<Self> {
        Self::ALL
            .get(idx)
            .copied()
            .ok_or(Error::InvalidParameter("gesture"))
    }

    /// Repeating gestures are queued behind every one-shot gesture.
    pub fn is_repeating(self) -> bool {
        self == Self::Hold
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Double => "Double",
            Self::Pressed => "Pressed",
            Self::Hold => "Hold",
            Self::Long => "Long",
        }
    }
}

/// Callback invoked on the dispatch worker for a delivered gesture.
#[derive(Clone)]
pub struct Handler(Arc<dyn Fn(ButtonId, Gesture) + Send + Sync>);

impl Handler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(ButtonId, Gesture) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Function-plus-argument form: `func(&arg)` on every delivery.
    pub fn with_arg<A>(func: fn(&A), arg: A) -> Self
    where
        A: Send + Sync + 'static,
    {
        Self::new(move |_, _| func(&arg))
    }

    pub fn call(&self, id: ButtonId, gesture: Gesture) {
        (self.0)(id, gesture);
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Arc::as_ptr(&self.0))
    }
}

/// Per-button table of optional handlers, indexed by [`Gesture`].
#[derive(Debug, Clone, Default)]
pub struct HandlerTable {
    slots: [Option<Handler>; Gesture::COUNT],
}

impl HandlerTable {
    pub fn set(&mut self, gesture: Gesture, handler: Handler) {
        self.slots[gesture as usize] = Some(handler);
    }

    pub fn clear(&mut self, gesture: Gesture) {
        self.slots[gesture as usize] = None;
    }

    pub fn get(&self, gesture: Gesture) -> Option<&Handler> {
        self.slots[gesture as usize].as_ref()
    }

    pub fn is_set(&self, gesture: Gesture) -> bool {
        self.get(gesture).is_some()
    }
}

/// A classified gesture ready for delivery.
#[derive(Debug, Clone)]
pub struct GestureEvent {
    /// Id of the button at classification time.
    pub id: ButtonId,
    pub gesture: Gesture,
    pub handler: Handler,
}

impl GestureEvent {
    pub fn new(id: ButtonId, gesture: Gesture, handler: Handler) -> Self {
        Self {
            id,
            gesture,
            handler,
        }
    }

    pub fn deliver(&self) {
        self.handler.call(self.id, self.gesture);
    }
}
