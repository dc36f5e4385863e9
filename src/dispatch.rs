//! Bounded delivery of classified gestures to user handlers.
//!
//! ```text
//!  tick context                        dispatch worker (own thread)
//! ┌─────────────┐  try_submit   ┌──────────────────┐  pop   ┌──────────┐
//! │ Scheduler   │─────────────▶│  discrete lane   │──────▶│ handler  │
//! │ (producer)  │   never       │  repeat lane     │ FIFO   │ (no lock │
//! └─────────────┘   blocks      └──────────────────┘        │  held)   │
//!                                      │ Signal             └──────────┘
//!                                      ▼
//!                              worker wakes
//! ```
//!
//! One-shot gestures (PRESSED, SINGLE, DOUBLE, LONG) always leave the queue
//! before any pending HOLD repeat; within a lane order is FIFO.  Both lanes
//! share one capacity.  When it is exhausted:
//!
//! | Incoming  | HOLD pending | Result                               |
//! |-----------|--------------|--------------------------------------|
//! | HOLD      | any          | incoming dropped                     |
//! | one-shot  | yes          | newest pending HOLD evicted, queued  |
//! | one-shot  | no           | incoming dropped                     |
//!
//! Drops are counted in [`DispatchCounters`] and never reported to the
//! tick context as errors.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use heapless::Deque;
use log::{debug, info, warn};

use crate::diagnostics::DispatchCounters;
use crate::drivers::task_pin::{Core, spawn_on_core};
use crate::error::Result;
use crate::events::GestureEvent;
use crate::registry::MAX_BUTTONS;

/// Queue slots reserved per possible button.
pub const QUEUE_SLACK_PER_BUTTON: usize = 4;

/// Total queue capacity shared by both lanes.
pub const QUEUE_CAPACITY: usize = QUEUE_SLACK_PER_BUTTON * MAX_BUTTONS;

/// Outcome of offering an event to a full or non-full queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Queued,
    /// Queued after evicting the newest pending HOLD.
    QueuedEvictingRepeat,
    Dropped,
}

impl Admission {
    pub fn accepted(self) -> bool {
        self != Self::Dropped
    }
}

struct Lanes<const N: usize> {
    discrete: Deque<GestureEvent, N>,
    repeat: Deque<GestureEvent, N>,
}

impl<const N: usize> Lanes<N> {
    const fn new() -> Self {
        Self {
            discrete: Deque::new(),
            repeat: Deque::new(),
        }
    }

    fn len(&self) -> usize {
        self.discrete.len() + self.repeat.len()
    }

    fn push(&mut self, event: GestureEvent) -> Admission {
        let repeating = event.gesture.is_repeating();
        let mut admission = Admission::Queued;

        if self.len() >= N {
            if repeating || self.repeat.pop_back().is_none() {
                return Admission::Dropped;
            }
            admission = Admission::QueuedEvictingRepeat;
        }

        let lane = if repeating {
            &mut self.repeat
        } else {
            &mut self.discrete
        };
        // Each lane alone can hold N, and the total is below N here.
        match lane.push_back(event) {
            Ok(()) => admission,
            Err(_) => Admission::Dropped,
        }
    }

    fn pop(&mut self) -> Option<GestureEvent> {
        self.discrete.pop_front().or_else(|| self.repeat.pop_front())
    }
}

/// Two-lane bounded queue with a wake-up signal for its consumer.
pub struct DispatchQueue<const N: usize = QUEUE_CAPACITY> {
    lanes: Mutex<CriticalSectionRawMutex, RefCell<Lanes<N>>>,
    ready: Signal<CriticalSectionRawMutex, ()>,
}

impl<const N: usize> Default for DispatchQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DispatchQueue<N> {
    pub const fn new() -> Self {
        Self {
            lanes: Mutex::new(RefCell::new(Lanes::new())),
            ready: Signal::new(),
        }
    }

    /// Offer an event without blocking.  Returns the admission and the
    /// queue depth afterwards.  Wakes the consumer when accepted.
    pub fn push(&self, event: GestureEvent) -> (Admission, usize) {
        let (admission, depth) = self.lanes.lock(|lanes| {
            let mut lanes = lanes.borrow_mut();
            let admission = lanes.push(event);
            (admission, lanes.len())
        });
        if admission.accepted() {
            self.ready.signal(());
        }
        (admission, depth)
    }

    pub fn pop(&self) -> Option<GestureEvent> {
        self.lanes.lock(|lanes| lanes.borrow_mut().pop())
    }

    pub fn len(&self) -> usize {
        self.lanes.lock(|lanes| lanes.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wake the consumer even if nothing was queued.
    pub fn notify(&self) {
        self.ready.signal(());
    }

    /// Resolves once something was pushed (or [`notify`](Self::notify)
    /// was called) since the previous wait.
    pub async fn wait(&self) {
        self.ready.wait().await;
    }
}

struct Shared {
    queue: DispatchQueue,
    stop: AtomicBool,
    counters: Arc<DispatchCounters>,
}

/// Owns the queue and the worker thread draining it.
pub struct Dispatcher {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Dispatcher {
    /// Create the queue and spawn its worker on the application core.
    pub fn start(counters: Arc<DispatchCounters>, stack_kb: usize, priority: u8) -> Result<Self> {
        let shared = Arc::new(Shared {
            queue: DispatchQueue::new(),
            stop: AtomicBool::new(false),
            counters,
        });
        let worker_shared = Arc::clone(&shared);
        let worker = spawn_on_core(Core::App, priority, stack_kb, "btn-dispatch\0", move || {
            run_worker(&worker_shared);
        })?;
        info!("dispatch: worker started (capacity {})", QUEUE_CAPACITY);
        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// Queue an event for delivery.  Never blocks.
    pub fn try_submit(&self, event: GestureEvent) -> Admission {
        let (id, gesture) = (event.id, event.gesture);
        let counters = &self.shared.counters;
        let (admission, depth) = self.shared.queue.push(event);
        match admission {
            Admission::Queued => counters.record_submit(depth),
            Admission::QueuedEvictingRepeat => {
                counters.record_dropped_repeat();
                counters.record_submit(depth);
                debug!("dispatch: queue full, evicted a HOLD for {:?} on button {}", gesture, id);
            }
            Admission::Dropped if gesture.is_repeating() => {
                counters.record_dropped_repeat();
                debug!("dispatch: queue full, HOLD on button {} dropped", id);
            }
            Admission::Dropped => {
                counters.record_dropped_discrete();
                warn!("dispatch: queue full, {:?} on button {} dropped", gesture, id);
            }
        }
        admission
    }

    /// Deliver everything still queued, then stop and join the worker.
    ///
    /// Called from a handler (i.e. on the worker itself) the worker is
    /// detached instead of joined; it finishes the drain and exits on its
    /// own once the handler returns.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.shared.stop.store(true, Ordering::Release);
        self.shared.queue.notify();

        if worker.thread().id() == std::thread::current().id() {
            debug!("dispatch: shutdown requested from a handler, worker detached");
            return;
        }
        if worker.join().is_err() {
            warn!("dispatch: worker panicked");
        }
        info!("dispatch: worker stopped");
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(shared: &Shared) {
    loop {
        // Sampled before draining so that everything queued ahead of the
        // stop request is still delivered.
        let stopping = shared.stop.load(Ordering::Acquire);
        while let Some(event) = shared.queue.pop() {
            event.deliver();
            shared.counters.record_delivered();
        }
        if stopping {
            break;
        }
        futures_lite::future::block_on(shared.queue.wait());
    }
    debug!("dispatch: worker exiting");
}
