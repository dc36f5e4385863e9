//! Debounced momentary-switch gesture classification.
//!
//! Buttons are registered on a [`Scheduler`], which samples them on every
//! tick, runs each one through the gesture state machine, and hands the
//! classified gestures (PRESSED, SINGLE, DOUBLE, HOLD, LONG) to per-button
//! handlers on a dedicated dispatch worker.
//!
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module; everything else runs on the host for testing.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod drivers;
pub mod events;
pub mod fsm;
pub mod pins;
pub mod registry;
pub mod scheduler;

mod error;

// Links the std critical-section impl behind the dispatch queue lock.
#[cfg(not(target_os = "espidf"))]
use critical_section as _;

pub use app::ports::LevelSource;
pub use config::{ManagerConfig, TimingConfig, TimingParam};
pub use diagnostics::DispatchStats;
pub use error::{Error, Result};
pub use events::{ButtonId, Gesture, Handler};
pub use fsm::states::ButtonState;
pub use pins::{ActiveLevel, PinConfig};
pub use registry::MAX_BUTTONS;
pub use scheduler::Scheduler;
