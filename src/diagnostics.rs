//! Dispatch counters and the serializable snapshot built from them.
//!
//! Counters live in an `Arc` owned by the manager, so they keep
//! accumulating across dispatcher teardown and re-creation.  They are
//! updated with relaxed atomics: the snapshot is for logs and tests, not
//! for synchronization.

use core::sync::atomic::{AtomicU32, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct DispatchCounters {
    submitted: AtomicU32,
    delivered: AtomicU32,
    dropped_repeat: AtomicU32,
    dropped_discrete: AtomicU32,
    high_water: AtomicU32,
}

impl DispatchCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// An event entered the queue; `depth` is the queue length after it.
    pub fn record_submit(&self, depth: usize) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
        self.high_water.fetch_max(depth as u32, Ordering::Relaxed);
    }

    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// A HOLD repeat was refused or evicted.
    pub fn record_dropped_repeat(&self) {
        self.dropped_repeat.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_discrete(&self) {
        self.dropped_discrete.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped_repeat: self.dropped_repeat.load(Ordering::Relaxed),
            dropped_discrete: self.dropped_discrete.load(Ordering::Relaxed),
            high_water: self.high_water.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`DispatchCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    /// Events accepted into the queue (evicted ones included).
    pub submitted: u32,
    /// Handler invocations completed by the worker.
    pub delivered: u32,
    pub dropped_repeat: u32,
    pub dropped_discrete: u32,
    /// Deepest the queue has been.
    pub high_water: u32,
}

impl DispatchStats {
    pub fn dropped(&self) -> u32 {
        self.dropped_repeat + self.dropped_discrete
    }

    /// JSON line for the periodic stats log.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
