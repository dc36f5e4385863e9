//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter | Implements  | Connects to                              |
//! |---------|-------------|------------------------------------------|
//! | `gpio`  | LevelSource | ESP-IDF GPIO, embedded-hal pins, sim pads|
//! | `time`  | —           | ESP32 system timer / `Instant`           |

pub mod gpio;
pub mod time;
