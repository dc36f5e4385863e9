//! Scripted level source and handler recorder for integration tests.
//!
//! Tests drive time explicitly: they set pad levels, call
//! `Scheduler::tick` with synthetic timestamps, and finally deregister
//! every button, which drains and joins the dispatch worker so the
//! recorded history is complete.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use gesture_button::{
    ButtonId, Gesture, Handler, LevelSource, ManagerConfig, PinConfig, Result, Scheduler,
};

pub const TICK_MS: u32 = 20;

// ── ScriptedLevels ────────────────────────────────────────────

/// Pads default to high (idle for active-low wiring).
#[derive(Clone, Default)]
pub struct ScriptedLevels {
    pads: Arc<Mutex<HashMap<i32, bool>>>,
    configured: Arc<Mutex<Vec<i32>>>,
}

#[allow(dead_code)]
impl ScriptedLevels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, gpio: i32, level: bool) {
        self.pads.lock().unwrap().insert(gpio, level);
    }

    pub fn press(&self, pin: &PinConfig) {
        self.set(pin.gpio, !pin.idle_level());
    }

    pub fn release(&self, pin: &PinConfig) {
        self.set(pin.gpio, pin.idle_level());
    }

    pub fn configured(&self) -> Vec<i32> {
        self.configured.lock().unwrap().clone()
    }
}

impl LevelSource for ScriptedLevels {
    fn read_level(&mut self, gpio: i32) -> bool {
        self.pads.lock().unwrap().get(&gpio).copied().unwrap_or(true)
    }

    fn configure(&mut self, pin: &PinConfig) -> Result<()> {
        self.configured.lock().unwrap().push(pin.gpio);
        self.release(pin);
        Ok(())
    }
}

// ── Recorder ──────────────────────────────────────────────────

/// Collects every `(id, gesture)` delivered to its handlers.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<(ButtonId, Gesture)>>>,
}

#[allow(dead_code)]
impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler(&self) -> Handler {
        let events = Arc::clone(&self.events);
        Handler::new(move |id, gesture| events.lock().unwrap().push((id, gesture)))
    }

    pub fn events(&self) -> Vec<(ButtonId, Gesture)> {
        self.events.lock().unwrap().clone()
    }

    pub fn gestures(&self) -> Vec<Gesture> {
        self.events().into_iter().map(|(_, g)| g).collect()
    }

    pub fn count(&self, gesture: Gesture) -> usize {
        self.events().iter().filter(|(_, g)| *g == gesture).count()
    }

    pub fn count_for(&self, id: ButtonId, gesture: Gesture) -> usize {
        self.events()
            .iter()
            .filter(|e| **e == (id, gesture))
            .count()
    }

    /// Poll until at least `n` events arrived or `timeout` elapsed.
    pub fn wait_for(&self, n: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.events.lock().unwrap().len() >= n {
                return true;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        false
    }
}

// ── Helpers ───────────────────────────────────────────────────

pub type TestScheduler = Scheduler<ScriptedLevels>;

pub fn scheduler() -> (TestScheduler, ScriptedLevels) {
    let levels = ScriptedLevels::new();
    let sched = Scheduler::new(levels.clone(), ManagerConfig::default()).unwrap();
    (sched, levels)
}

/// Register `pin` with `recorder` installed for every gesture.
pub fn register_recorded(sched: &TestScheduler, pin: PinConfig, recorder: &Recorder) -> ButtonId {
    let id = sched.register(pin).unwrap();
    for gesture in Gesture::ALL {
        sched.set_handler(id, gesture, recorder.handler()).unwrap();
    }
    id
}

/// Tick every `TICK_MS` over `[from, to)`, setting `pin` pressed where
/// `pressed(t)` holds.
pub fn drive(
    sched: &TestScheduler,
    levels: &ScriptedLevels,
    pin: &PinConfig,
    from: u32,
    to: u32,
    pressed: impl Fn(u32) -> bool,
) {
    for t in (from..to).step_by(TICK_MS as usize) {
        if pressed(t) {
            levels.press(pin);
        } else {
            levels.release(pin);
        }
        sched.tick(t);
    }
}

/// Deregister every button; the last removal drains and joins the worker.
pub fn finish(sched: &TestScheduler) {
    while !sched.is_empty() {
        sched.deregister(0).unwrap();
    }
}
