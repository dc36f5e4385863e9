//! Bounded registry of live buttons.
//!
//! Ids are positions: they are always dense `0..len`.  Removing a button
//! compacts the storage and renumbers every button above it, so an id
//! cached across the deregistration of a lower-numbered button is stale.

use heapless::Vec;
use log::info;

use crate::config::TimingConfig;
use crate::drivers::button::ButtonInstance;
use crate::error::{Error, Result};
use crate::events::ButtonId;
use crate::pins::PinConfig;

/// Maximum number of simultaneously registered buttons.
pub const MAX_BUTTONS: usize = 8;

#[derive(Default)]
pub struct Registry {
    buttons: Vec<ButtonInstance, MAX_BUTTONS>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `pin` could be registered right now.
    pub fn check(&self, pin: &PinConfig) -> Result<()> {
        if self.buttons.is_full() {
            return Err(Error::CapacityExceeded);
        }
        pin.validate()?;
        if self.buttons.iter().any(|b| b.pin().gpio == pin.gpio) {
            return Err(Error::InvalidSource);
        }
        Ok(())
    }

    /// Append a button and return its id.  On error nothing changes.
    pub fn register(&mut self, pin: PinConfig, timing: TimingConfig) -> Result<ButtonId> {
        self.check(&pin)?;
        let id = self.buttons.len() as ButtonId;
        self.buttons
            .push(ButtonInstance::new(id, pin, timing))
            .map_err(|_| Error::CapacityExceeded)?;
        info!("registry: button {} on GPIO {}", id, pin.gpio);
        Ok(id)
    }

    /// Remove a button and shift every higher id down by one.
    pub fn deregister(&mut self, id: ButtonId) -> Result<ButtonInstance> {
        let idx = id as usize;
        if idx >= self.buttons.len() {
            return Err(Error::NotFound);
        }
        let removed = self.buttons.remove(idx);
        for (i, button) in self.buttons.iter_mut().enumerate().skip(idx) {
            button.set_id(i as ButtonId);
        }
        info!(
            "registry: removed button {} (GPIO {}), {} remaining",
            id,
            removed.pin().gpio,
            self.buttons.len()
        );
        Ok(removed)
    }

    pub fn get(&self, id: ButtonId) -> Result<&ButtonInstance> {
        self.buttons.get(id as usize).ok_or(Error::NotFound)
    }

    pub fn get_mut(&mut self, id: ButtonId) -> Result<&mut ButtonInstance> {
        self.buttons.get_mut(id as usize).ok_or(Error::NotFound)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ButtonInstance> {
        self.buttons.iter()
    }

    /// Registry order, which is also tick order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ButtonInstance> {
        self.buttons.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }
}
