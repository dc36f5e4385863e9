//! Port traits — the boundary between the gesture core and the hardware.
//!
//! ```text
//!   GPIO adapter ──▶ LevelSource ──▶ Scheduler (domain)
//! ```
//!
//! The [`Scheduler`](crate::scheduler::Scheduler) is generic over the
//! level source, so the classification core never touches registers and
//! runs unchanged against a simulated or scripted source in tests.

use crate::error::Result;
use crate::pins::PinConfig;

// ───────────────────────────────────────────────────────────────
// Level source (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Reports the current raw level of a GPIO.
///
/// Implementations do no debouncing of their own and must not block:
/// `read_level` is called for every registered button on every tick,
/// inside the scheduler's critical section.  They must not call back into
/// the scheduler.
pub trait LevelSource: Send {
    /// Raw electrical level (`true` = high).  Polarity is applied by the
    /// caller from the button's [`PinConfig`].
    fn read_level(&mut self, gpio: i32) -> bool;

    /// Prepare a pin for sampling (direction, pull resistor) when a button
    /// is registered on it.  An error rejects the registration.
    fn configure(&mut self, pin: &PinConfig) -> Result<()> {
        let _ = pin;
        Ok(())
    }
}

impl<L: LevelSource + ?Sized> LevelSource for Box<L> {
    fn read_level(&mut self, gpio: i32) -> bool {
        (**self).read_level(gpio)
    }

    fn configure(&mut self, pin: &PinConfig) -> Result<()> {
        (**self).configure(pin)
    }
}
