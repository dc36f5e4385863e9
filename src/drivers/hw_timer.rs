//! Periodic tick source for the [`Scheduler`].
//!
//! Runs `scheduler.tick(clock.now_ms())` every `period_ms` on a dedicated
//! thread pinned to the protocol core, apart from the dispatch worker on
//! the application core, so a slow handler never delays sampling.  Sleeps are computed against an
//! absolute deadline so the period does not drift with tick duration; when
//! a tick overruns a whole period the missed deadlines are skipped rather
//! than replayed back to back.
//!
//! The gesture machine measures dwell with the clock value passed to each
//! tick, so jitter in the sleep only delays classification, it never
//! shortens a window.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::adapters::time::MonotonicClock;
use crate::app::ports::LevelSource;
use crate::drivers::task_pin::{Core, spawn_on_core};
use crate::error::{Error, Result};
use crate::scheduler::Scheduler;

/// Above the dispatch worker.
const TICKER_PRIORITY: u8 = 10;
const TICKER_STACK_KB: usize = 4;

pub struct Ticker {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Start ticking `scheduler` every `period_ms` (its configured tick
    /// period when `None`).
    pub fn start<L>(scheduler: Arc<Scheduler<L>>, clock: MonotonicClock, period_ms: Option<u32>) -> Result<Self>
    where
        L: LevelSource + 'static,
    {
        let period_ms = period_ms.unwrap_or_else(|| scheduler.tick_period_ms());
        if period_ms == 0 {
            return Err(Error::InvalidParameter("tick_period_ms"));
        }
        let period = Duration::from_millis(u64::from(period_ms));
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let thread = spawn_on_core(Core::Pro, TICKER_PRIORITY, TICKER_STACK_KB, "btn-tick\0", move || {
            let mut deadline = Instant::now();
            while !thread_stop.load(Ordering::Acquire) {
                scheduler.tick(clock.now_ms());

                deadline += period;
                let now = Instant::now();
                if deadline > now {
                    std::thread::sleep(deadline - now);
                } else {
                    deadline = now;
                }
            }
        })?;
        info!("hw_timer: ticking every {}ms", period_ms);
        Ok(Self {
            stop,
            thread: Some(thread),
        })
    }

    /// Stop ticking and wait for the in-flight tick to finish.
    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        self.stop.store(true, Ordering::Release);
        if thread.join().is_err() {
            warn!("hw_timer: ticker thread panicked");
        }
        info!("hw_timer: stopped");
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.halt();
    }
}
