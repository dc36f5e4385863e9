//! The button manager: one context object owning every registered button,
//! the level source they are sampled from, and the dispatcher that delivers
//! their gestures.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Scheduler (critical section)             │
//! │                                                              │
//! │  ┌─────────────┐   read_level   ┌──────────────────────────┐  │
//! │  │ LevelSource │◀──────────────│ Registry                 │  │
//! │  └─────────────┘                │  ButtonInstance 0..n     │  │
//! │                                 │   FSM + timing + handlers│  │
//! │                                 └────────────┬─────────────┘  │
//! │                                              │ GestureEvent   │
//! │                                              ▼                │
//! │                                 ┌──────────────────────────┐  │
//! │                                 │ Dispatcher (lazy)        │  │
//! │                                 └────────────┬─────────────┘  │
//! └──────────────────────────────────────────────┼────────────────┘
//!                                                ▼
//!                                     worker thread → handlers
//! ```
//!
//! All methods take `&self`.  Registry mutation, handler/timing changes and
//! the tick are serialized by one `embassy-sync` critical-section mutex, so
//! a tick never observes a half-applied change.  The dispatcher exists
//! exactly while at least one button is registered: it is created by the
//! first registration and torn down, outside the critical section, when the
//! last button is removed.
//!
//! The level source is called inside the critical section and must not
//! call back into the scheduler.

use core::cell::RefCell;
use std::sync::Arc;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::{info, warn};

use crate::app::ports::LevelSource;
use crate::config::{ManagerConfig, TimingConfig, TimingParam};
use crate::diagnostics::{DispatchCounters, DispatchStats};
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::events::{ButtonId, Gesture, GestureEvent, Handler};
use crate::fsm::states::ButtonState;
use crate::pins::PinConfig;
use crate::registry::Registry;

struct Inner<L> {
    source: L,
    registry: Registry,
    dispatcher: Option<Dispatcher>,
    config: ManagerConfig,
}

pub struct Scheduler<L: LevelSource> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Inner<L>>>,
    /// Outlives individual dispatchers.
    counters: Arc<DispatchCounters>,
}

impl<L: LevelSource> Scheduler<L> {
    pub fn new(source: L, config: ManagerConfig) -> Result<Self> {
        config.validate()?;
        info!(
            "scheduler: tick={}ms, worker stack={}KB pri={}",
            config.tick_period_ms, config.worker_stack_kb, config.worker_priority
        );
        Ok(Self {
            inner: Mutex::new(RefCell::new(Inner {
                source,
                registry: Registry::new(),
                dispatcher: None,
                config,
            })),
            counters: Arc::new(DispatchCounters::new()),
        })
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner<L>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Register a button with the default thresholds of this manager.
    ///
    /// Fails with `CapacityExceeded` when the registry is full and with
    /// `InvalidSource` when the pin is invalid, already registered, or
    /// rejected by the level source, and with `OutOfResources` when the
    /// first registration cannot start the dispatch worker.  Nothing
    /// changes on failure: the pin is only configured once the worker runs.
    pub fn register(&self, pin: PinConfig) -> Result<ButtonId> {
        let mut unused = None;
        let registered = self.with(|inner| -> Result<ButtonId> {
            inner.registry.check(&pin)?;
            if inner.dispatcher.is_none() {
                inner.dispatcher = Some(Dispatcher::start(
                    Arc::clone(&self.counters),
                    inner.config.worker_stack_kb,
                    inner.config.worker_priority,
                )?);
            }
            let registered = inner
                .source
                .configure(&pin)
                .map_err(|e| {
                    warn!("scheduler: GPIO {} rejected by level source: {}", pin.gpio, e);
                    Error::InvalidSource
                })
                .and_then(|()| inner.registry.register(pin, inner.config.timing));
            if registered.is_err() && inner.registry.is_empty() {
                unused = inner.dispatcher.take();
            }
            registered
        });
        // Joined outside the critical section.
        if let Some(dispatcher) = unused {
            dispatcher.shutdown();
        }
        registered
    }

    /// Remove a button.  Ids above `id` shift down by one.
    ///
    /// Events already queued for the button are still delivered.
    pub fn deregister(&self, id: ButtonId) -> Result<()> {
        let retired = self.with(|inner| -> Result<Option<Dispatcher>> {
            inner.registry.deregister(id)?;
            Ok(if inner.registry.is_empty() {
                inner.dispatcher.take()
            } else {
                None
            })
        })?;
        if let Some(dispatcher) = retired {
            info!("scheduler: last button removed, stopping dispatcher");
            dispatcher.shutdown();
        }
        Ok(())
    }

    pub fn set_handler(&self, id: ButtonId, gesture: Gesture, handler: Handler) -> Result<()> {
        self.with(|inner| {
            inner.registry.get_mut(id)?.handlers_mut().set(gesture, handler);
            Ok(())
        })
    }

    pub fn clear_handler(&self, id: ButtonId, gesture: Gesture) -> Result<()> {
        self.with(|inner| {
            inner.registry.get_mut(id)?.handlers_mut().clear(gesture);
            Ok(())
        })
    }

    /// Change one threshold of one button.  Affects transitions evaluated
    /// from the next tick on, including a press already in progress.
    pub fn set_timing(&self, id: ButtonId, param: TimingParam, ms: u32) -> Result<()> {
        self.with(|inner| {
            let tick = inner.config.tick_period_ms;
            inner.registry.get_mut(id)?.set_timing(param, ms, tick)
        })
    }

    pub fn timing(&self, id: ButtonId) -> Result<TimingConfig> {
        self.with(|inner| inner.registry.get(id).map(|b| *b.timing()))
    }

    pub fn state(&self, id: ButtonId) -> Result<ButtonState> {
        self.with(|inner| inner.registry.get(id).map(|b| b.state()))
    }

    pub fn len(&self) -> usize {
        self.with(|inner| inner.registry.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tick_period_ms(&self) -> u32 {
        self.with(|inner| inner.config.tick_period_ms)
    }

    /// Whether a dispatcher (queue + worker) currently exists.
    pub fn is_dispatching(&self) -> bool {
        self.with(|inner| inner.dispatcher.is_some())
    }

    pub fn stats(&self) -> DispatchStats {
        self.counters.snapshot()
    }

    /// Sample and advance every button once, in registry order, and queue
    /// the gestures that have a handler.  Never blocks on delivery.
    pub fn tick(&self, now_ms: u32) {
        self.with(|inner| {
            let Inner {
                source,
                registry,
                dispatcher,
                ..
            } = inner;
            for button in registry.iter_mut() {
                let emitted = button.sample_and_advance(source, now_ms);
                let Some(dispatcher) = dispatcher.as_ref() else {
                    continue;
                };
                for gesture in emitted {
                    if let Some(handler) = button.handlers().get(gesture) {
                        dispatcher.try_submit(GestureEvent::new(button.id(), gesture, handler.clone()));
                    }
                }
            }
        });
    }
}
