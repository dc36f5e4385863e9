//! One registered button: pin, gesture machine, thresholds, handlers.
//!
//! ## Hardware
//!
//! Momentary switch on a GPIO, active LOW (pull-up) or active HIGH
//! (pull-down) per its [`PinConfig`].  No interrupt: the shared ticker
//! samples the level and advances the machine once per tick.
//!
//! ## Gesture detection
//!
//! | Gesture | Condition                                          | Delivered          |
//! |---------|----------------------------------------------------|--------------------|
//! | Pressed | active for >= debounce confirm                     | once, on confirm   |
//! | Hold    | still pressed >= hold after confirm                | every tick in HOLD |
//! | Long    | still in HOLD >= long                              | once               |
//! | Single  | released, no second press within the double window | once               |
//! | Double  | second press within the double window              | once               |

use crate::app::ports::LevelSource;
use crate::config::{TimingConfig, TimingParam};
use crate::error::Result;
use crate::events::{ButtonId, HandlerTable};
use crate::fsm::context::{Emitted, GestureContext};
use crate::fsm::states::{ButtonMachine, ButtonState, new_machine};
use crate::pins::PinConfig;

pub struct ButtonInstance {
    id: ButtonId,
    pin: PinConfig,
    /// Last sampled logical level (`true` = pressed).
    active: bool,
    machine: ButtonMachine,
    ctx: GestureContext,
    handlers: HandlerTable,
}

impl ButtonInstance {
    pub fn new(id: ButtonId, pin: PinConfig, timing: TimingConfig) -> Self {
        Self {
            id,
            pin,
            active: false,
            machine: new_machine(),
            ctx: GestureContext::new(timing),
            handlers: HandlerTable::default(),
        }
    }

    pub fn id(&self) -> ButtonId {
        self.id
    }

    /// Only the registry renumbers buttons, when it compacts.
    pub(crate) fn set_id(&mut self, id: ButtonId) {
        self.id = id;
    }

    pub fn pin(&self) -> PinConfig {
        self.pin
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn state(&self) -> ButtonState {
        self.machine.state()
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.ctx.timing
    }

    /// Takes effect for transitions evaluated from the next tick on.
    pub fn set_timing(&mut self, param: TimingParam, ms: u32, tick_period_ms: u32) -> Result<()> {
        self.ctx.timing.set(param, ms, tick_period_ms)
    }

    pub fn handlers(&self) -> &HandlerTable {
        &self.handlers
    }

    pub fn handlers_mut(&mut self) -> &mut HandlerTable {
        &mut self.handlers
    }

    /// Sample the pin and advance one tick.
    pub fn sample_and_advance<L>(&mut self, source: &mut L, now_ms: u32) -> Emitted
    where
        L: LevelSource + ?Sized,
    {
        let raw = source.read_level(self.pin.gpio);
        self.advance(self.pin.is_active(raw), now_ms)
    }

    /// Advance one tick with an already-sampled logical level.
    pub fn advance(&mut self, active: bool, now_ms: u32) -> Emitted {
        self.active = active;
        self.machine.advance(&mut self.ctx, active, now_ms);
        self.ctx.take_emitted()
    }
}
