//! Timing and scheduler configuration.
//!
//! Every threshold is in milliseconds and is validated against a fixed
//! range before it is accepted, both when a whole [`ManagerConfig`] is
//! loaded and when a single value is changed at runtime through
//! [`crate::Scheduler::set_timing`].  Out-of-range values are rejected,
//! never clamped.

use core::ops::RangeInclusive;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Upper bound for both debounce windows.
pub const DEBOUNCE_MAX_MS: u32 = 200;
pub const HOLD_RANGE_MS: RangeInclusive<u32> = 100..=5_000;
pub const LONG_RANGE_MS: RangeInclusive<u32> = 500..=10_000;
pub const DOUBLE_WINDOW_MAX_MS: u32 = 1_000;
pub const TICK_PERIOD_RANGE_MS: RangeInclusive<u32> = 1..=100;

/// One independently configurable threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimingParam {
    /// Time the level must stay active before a press is confirmed.
    DebounceConfirm,
    /// Time after which an unconfirmed edge that went inactive is rejected.
    DebounceRelease,
    /// Press duration before HOLD repeats start.
    Hold,
    /// Time spent in HOLD before LONG is classified.
    Long,
    /// Window after a release in which a second press counts as DOUBLE.
    DoubleWindow,
}

impl TimingParam {
    pub const ALL: [TimingParam; 5] = [
        Self::DebounceConfirm,
        Self::DebounceRelease,
        Self::Hold,
        Self::Long,
        Self::DoubleWindow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::DebounceConfirm => "debounce_confirm_ms",
            Self::DebounceRelease => "debounce_release_ms",
            Self::Hold => "hold_ms",
            Self::Long => "long_ms",
            Self::DoubleWindow => "double_window_ms",
        }
    }

    /// Accepted range for this parameter at the given tick period.
    ///
    /// Windows that must be observed on at least two samples are bounded
    /// below by twice the tick period.
    pub fn range(self, tick_period_ms: u32) -> RangeInclusive<u32> {
        let two_ticks = tick_period_ms.saturating_mul(2);
        match self {
            Self::DebounceConfirm | Self::DebounceRelease => two_ticks..=DEBOUNCE_MAX_MS,
            Self::Hold => HOLD_RANGE_MS,
            Self::Long => LONG_RANGE_MS,
            Self::DoubleWindow => two_ticks..=DOUBLE_WINDOW_MAX_MS,
        }
    }
}

/// Per-button gesture thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub debounce_confirm_ms: u32,
    pub debounce_release_ms: u32,
    pub hold_ms: u32,
    /// Measured from HOLD entry, not from the initial press.
    pub long_ms: u32,
    pub double_window_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            debounce_confirm_ms: 40,
            debounce_release_ms: 40,
            hold_ms: 500,
            long_ms: 2_500,
            double_window_ms: 100,
        }
    }
}

impl TimingConfig {
    pub fn get(&self, param: TimingParam) -> u32 {
        match param {
            TimingParam::DebounceConfirm => self.debounce_confirm_ms,
            TimingParam::DebounceRelease => self.debounce_release_ms,
            TimingParam::Hold => self.hold_ms,
            TimingParam::Long => self.long_ms,
            TimingParam::DoubleWindow => self.double_window_ms,
        }
    }

    /// Validate and store a single threshold.  On error the config is
    /// left untouched.
    pub fn set(&mut self, param: TimingParam, ms: u32, tick_period_ms: u32) -> Result<()> {
        let range = param.range(tick_period_ms);
        if !range.contains(&ms) {
            warn!(
                "timing: {}={}ms outside {}..={}ms",
                param.name(),
                ms,
                range.start(),
                range.end()
            );
            return Err(Error::InvalidParameter(param.name()));
        }
        let slot = match param {
            TimingParam::DebounceConfirm => &mut self.debounce_confirm_ms,
            TimingParam::DebounceRelease => &mut self.debounce_release_ms,
            TimingParam::Hold => &mut self.hold_ms,
            TimingParam::Long => &mut self.long_ms,
            TimingParam::DoubleWindow => &mut self.double_window_ms,
        };
        *slot = ms;
        Ok(())
    }

    pub fn validate(&self, tick_period_ms: u32) -> Result<()> {
        for param in TimingParam::ALL {
            if !param.range(tick_period_ms).contains(&self.get(param)) {
                return Err(Error::InvalidParameter(param.name()));
            }
        }
        Ok(())
    }
}

/// Scheduler-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Period at which the host ticker calls [`crate::Scheduler::tick`].
    /// Must be shorter than the shortest configured dwell.
    pub tick_period_ms: u32,
    /// Thresholds applied to every newly registered button.
    pub timing: TimingConfig,
    /// Stack size of the dispatch worker thread (KiB).
    pub worker_stack_kb: usize,
    /// FreeRTOS priority of the dispatch worker (ignored on host).
    pub worker_priority: u8,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 20,
            timing: TimingConfig::default(),
            worker_stack_kb: 4,
            worker_priority: 5,
        }
    }
}

impl ManagerConfig {
    pub fn validate(&self) -> Result<()> {
        if !TICK_PERIOD_RANGE_MS.contains(&self.tick_period_ms) {
            return Err(Error::InvalidParameter("tick_period_ms"));
        }
        if self.worker_stack_kb == 0 {
            return Err(Error::InvalidParameter("worker_stack_kb"));
        }
        self.timing.validate(self.tick_period_ms)
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            warn!("config: JSON parse failed ({})", e);
            Error::InvalidParameter("malformed configuration")
        })?;
        config.validate()?;
        Ok(config)
    }
}
