//! Level sources — concrete implementations of [`LevelSource`].
//!
//! | Source           | Target   | Reads from                              |
//! |------------------|----------|-----------------------------------------|
//! | `EspGpioLevels`  | ESP-IDF  | `gpio_get_level` on raw GPIO numbers    |
//! | `PinBank`        | any      | `embedded_hal::digital::InputPin`s      |
//! | `SimulatedLevels`| any      | shared atomics, settable from any thread|

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use embedded_hal::digital::InputPin;
use heapless::Vec;
use log::warn;

use crate::app::ports::LevelSource;
use crate::error::{Error, Result};
use crate::pins::{GPIO_COUNT, PinConfig};
use crate::registry::MAX_BUTTONS;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── ESP-IDF GPIO ──────────────────────────────────────────────

/// Raw GPIO pads via ESP-IDF.  Pins are configured as plain inputs with
/// the pull resistor that holds them at their idle level; no interrupt is
/// attached since the ticker samples them.
#[cfg(target_os = "espidf")]
#[derive(Debug, Default)]
pub struct EspGpioLevels;

#[cfg(target_os = "espidf")]
impl EspGpioLevels {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "espidf")]
impl LevelSource for EspGpioLevels {
    fn read_level(&mut self, gpio: i32) -> bool {
        // SAFETY: read-only register access on a pin configured as input
        // by `configure`.
        (unsafe { gpio_get_level(gpio) }) != 0
    }

    fn configure(&mut self, pin: &PinConfig) -> Result<()> {
        pin.validate()?;
        let active_low = pin.active == crate::pins::ActiveLevel::Low;
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin.gpio,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: if active_low {
                gpio_pullup_t_GPIO_PULLUP_ENABLE
            } else {
                gpio_pullup_t_GPIO_PULLUP_DISABLE
            },
            pull_down_en: if active_low {
                gpio_pulldown_t_GPIO_PULLDOWN_DISABLE
            } else {
                gpio_pulldown_t_GPIO_PULLDOWN_ENABLE
            },
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: `cfg` describes a single valid pad (checked above).
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            warn!("gpio: config of GPIO {} failed (rc={})", pin.gpio, ret);
            return Err(Error::InvalidSource);
        }
        Ok(())
    }
}

// ── embedded-hal pins ─────────────────────────────────────────

/// A fixed set of HAL input pins addressed by their GPIO number.
///
/// Useful on targets with a HAL crate instead of raw IDF access, and in
/// tests with scripted pins.  A read error counts as a low level.
pub struct PinBank<P> {
    pins: Vec<(i32, P), MAX_BUTTONS>,
}

impl<P> Default for PinBank<P> {
    fn default() -> Self {
        Self { pins: Vec::new() }
    }
}

impl<P: InputPin + Send> PinBank<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `pin` under `gpio`.  Fails if the bank is full or `gpio` is
    /// taken.
    pub fn insert(&mut self, gpio: i32, pin: P) -> Result<()> {
        if self.pins.iter().any(|(g, _)| *g == gpio) {
            return Err(Error::InvalidSource);
        }
        self.pins
            .push((gpio, pin))
            .map_err(|_| Error::CapacityExceeded)
    }

    fn pin_mut(&mut self, gpio: i32) -> Option<&mut P> {
        self.pins
            .iter_mut()
            .find(|(g, _)| *g == gpio)
            .map(|(_, p)| p)
    }
}

impl<P: InputPin + Send> LevelSource for PinBank<P> {
    fn read_level(&mut self, gpio: i32) -> bool {
        self.pin_mut(gpio)
            .and_then(|pin| pin.is_high().ok())
            .unwrap_or(false)
    }

    fn configure(&mut self, pin: &PinConfig) -> Result<()> {
        if self.pin_mut(pin.gpio).is_none() {
            warn!("gpio: no HAL pin bound to GPIO {}", pin.gpio);
            return Err(Error::InvalidSource);
        }
        Ok(())
    }
}

// ── Simulation ────────────────────────────────────────────────

/// Shared, settable pad levels.  Clones observe the same pads, so a test
/// or simulation thread can drive the levels a [`Scheduler`] samples.
///
/// [`Scheduler`]: crate::scheduler::Scheduler
#[derive(Clone)]
pub struct SimulatedLevels {
    pads: Arc<[AtomicBool; GPIO_COUNT as usize]>,
}

impl Default for SimulatedLevels {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedLevels {
    /// Every pad starts high (idle for active-low wiring).
    pub fn new() -> Self {
        Self {
            pads: Arc::new(core::array::from_fn(|_| AtomicBool::new(true))),
        }
    }

    pub fn set(&self, gpio: i32, level: bool) {
        if let Some(pad) = self.pad(gpio) {
            pad.store(level, Ordering::Release);
        }
    }

    /// Drive the pad to the pressed level for `pin`'s polarity.
    pub fn press(&self, pin: &PinConfig) {
        self.set(pin.gpio, !pin.idle_level());
    }

    pub fn release(&self, pin: &PinConfig) {
        self.set(pin.gpio, pin.idle_level());
    }

    pub fn get(&self, gpio: i32) -> bool {
        self.pad(gpio).is_some_and(|pad| pad.load(Ordering::Acquire))
    }

    fn pad(&self, gpio: i32) -> Option<&AtomicBool> {
        usize::try_from(gpio).ok().and_then(|i| self.pads.get(i))
    }
}

impl LevelSource for SimulatedLevels {
    fn read_level(&mut self, gpio: i32) -> bool {
        self.get(gpio)
    }

    fn configure(&mut self, pin: &PinConfig) -> Result<()> {
        pin.validate()?;
        self.release(pin);
        Ok(())
    }
}
