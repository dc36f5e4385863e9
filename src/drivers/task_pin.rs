//! Core-pinned thread spawning for ESP32-S3 dual-core.
//!
//! Wraps `esp_pthread_set_cfg()` so that `std::thread::spawn` creates a
//! FreeRTOS task pinned to a specific CPU core with explicit priority
//! and stack size. On non-ESP targets, falls back to a plain named thread.
//!
//! # ESP-IDF Threading Model
//!
//! ESP-IDF implements `std::thread` via pthreads, which are thin wrappers
//! around FreeRTOS tasks. `esp_pthread_set_cfg()` sets thread-local
//! configuration that applies to the *next* `pthread_create()` call from
//! the calling thread, so the config→spawn pair must not be interleaved
//! with other thread creation on the same thread.
//!
//! Spawn failures are reported as [`Error::OutOfResources`]: the dispatch
//! worker is created lazily on the first registration, and a full heap
//! must fail that registration rather than abort the firmware.

use std::thread::JoinHandle;

use log::{info, warn};

use crate::error::{Error, Result};

/// CPU core identifiers for the ESP32-S3 Xtensa LX7 dual-core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 0 (PRO_CPU) — protocol stacks and the button ticker.
    Pro = 0,
    /// Core 1 (APP_CPU) — handler delivery.
    App = 1,
}

/// Spawn a thread pinned to a specific core with explicit priority and stack.
///
/// The `name` parameter must be a null-terminated string (e.g.
/// `"btn-dispatch\0"`); ESP-IDF keeps the pointer for the task name.
#[cfg(target_os = "espidf")]
pub fn spawn_on_core(
    core: Core,
    priority: u8,
    stack_kb: usize,
    name: &'static str,
    f: impl FnOnce() + Send + 'static,
) -> Result<JoinHandle<()>> {
    // SAFETY: `cfg` is fully initialised by the IDF default constructor and
    // `name` is a 'static NUL-terminated string.
    let ret = unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = core as i32;
        cfg.prio = priority as i32;
        cfg.stack_size = (stack_kb * 1024) as i32;
        cfg.thread_name = name.as_ptr() as *const _;
        esp_idf_sys::esp_pthread_set_cfg(&cfg)
    };
    if ret != esp_idf_sys::ESP_OK as i32 {
        warn!("task_pin: esp_pthread_set_cfg failed (rc={})", ret);
        return Err(Error::OutOfResources);
    }

    let display_name = name.trim_end_matches('\0');
    info!(
        "Spawning '{}' on {:?} (pri={}, stack={}KB)",
        display_name, core, priority, stack_kb
    );

    std::thread::Builder::new()
        .name(display_name.into())
        .spawn(f)
        .map_err(|e| {
            warn!("task_pin: '{}' spawn failed: {}", display_name, e);
            Error::OutOfResources
        })
}

/// Simulation fallback — ignores core affinity and priority.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_on_core(
    _core: Core,
    _priority: u8,
    stack_kb: usize,
    name: &'static str,
    f: impl FnOnce() + Send + 'static,
) -> Result<JoinHandle<()>> {
    let display_name = name.trim_end_matches('\0');
    info!(
        "Spawning '{}' (sim, no core pinning, stack={}KB)",
        display_name, stack_kb
    );

    std::thread::Builder::new()
        .name(display_name.into())
        // Host threads need more headroom than the FreeRTOS budget for
        // test harness formatting.
        .stack_size(stack_kb.max(64) * 1024)
        .spawn(f)
        .map_err(|e| {
            warn!("task_pin(sim): '{}' spawn failed: {}", display_name, e);
            Error::OutOfResources
        })
}
