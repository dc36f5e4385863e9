//! Gesture button demo — Main Entry Point
//!
//! Registers the BOOT button and logs every gesture it classifies.
//!
//! ```text
//! ┌──────────────┐ tick ┌──────────────────────┐ GestureEvent ┌──────────────┐
//! │ Ticker       │─────▶│ Scheduler            │────────────▶│ btn-dispatch │
//! │ (btn-tick)   │      │  EspGpioLevels       │              │ print_press  │
//! └──────────────┘      │  Button 0 (GPIO 0)   │              └──────────────┘
//!                       └──────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::info;

use gesture_button::adapters::gpio::EspGpioLevels;
use gesture_button::adapters::time::MonotonicClock;
use gesture_button::drivers::hw_timer::Ticker;
use gesture_button::pins::BUTTON_GPIO;
use gesture_button::{Gesture, Handler, ManagerConfig, PinConfig, Scheduler};

const STATS_INTERVAL: Duration = Duration::from_secs(30);

fn print_press_type(gesture: &Gesture) {
    info!("button: {}", gesture.name());
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  gesture-button v{}                ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Manager + button ───────────────────────────────────
    let scheduler = Arc::new(Scheduler::new(EspGpioLevels::new(), ManagerConfig::default())?);
    let id = scheduler.register(PinConfig::active_low(BUTTON_GPIO))?;
    for gesture in Gesture::ALL {
        scheduler.set_handler(id, gesture, Handler::with_arg(print_press_type, gesture))?;
    }
    info!("Button {} registered on GPIO {}", id, BUTTON_GPIO);

    // ── 3. Tick ───────────────────────────────────────────────
    let _ticker = Ticker::start(Arc::clone(&scheduler), MonotonicClock::new(), None)?;

    // ── 4. Idle: periodic stats ───────────────────────────────
    loop {
        std::thread::sleep(STATS_INTERVAL);
        info!("dispatch stats: {}", scheduler.stats().to_json());
    }
}
