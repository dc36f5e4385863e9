//! Button input descriptors.
//!
//! A [`PinConfig`] is what callers hand to [`crate::Scheduler::register`]:
//! the GPIO number plus which electrical level counts as "pressed".

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of GPIO pads on the ESP32-S3 (`GPIO_NUM_MAX`).
pub const GPIO_COUNT: i32 = 49;

/// BOOT button on ESP32-S3 dev boards.  Active LOW with pull-up.
pub const BUTTON_GPIO: i32 = 0;

/// Which raw level means the switch is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveLevel {
    /// Switch to ground, pull-up enabled.  Press is a falling edge.
    Low,
    /// Switch to VCC, pull-down enabled.  Press is a rising edge.
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinConfig {
    pub gpio: i32,
    pub active: ActiveLevel,
}

impl PinConfig {
    pub const fn new(gpio: i32, active: ActiveLevel) -> Self {
        Self { gpio, active }
    }

    /// Active-low switch, the common wiring for momentary buttons.
    pub const fn active_low(gpio: i32) -> Self {
        Self::new(gpio, ActiveLevel::Low)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0..GPIO_COUNT).contains(&self.gpio) {
            return Err(Error::InvalidSource);
        }
        Ok(())
    }

    /// Translate a raw electrical level into "switch closed".
    pub fn is_active(&self, raw_level: bool) -> bool {
        match self.active {
            ActiveLevel::Low => !raw_level,
            ActiveLevel::High => raw_level,
        }
    }

    /// Raw level read while the switch is open.
    pub fn idle_level(&self) -> bool {
        self.active == ActiveLevel::Low
    }
}
