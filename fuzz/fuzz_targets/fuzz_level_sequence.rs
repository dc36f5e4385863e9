//! Fuzz target: `ButtonInstance::advance`
//!
//! The first bytes pick thresholds (re-validated, so out-of-range picks
//! are simply rejected); every following bit is one tick's level, and
//! the high bit of each byte may also stretch that tick's timestamp.
//! Asserts per-tick output bounds and that every classification follows
//! a PRESSED.
//!
//! cargo fuzz run fuzz_level_sequence

#![no_main]

use gesture_button::config::{TimingConfig, TimingParam};
use gesture_button::drivers::button::ButtonInstance;
use gesture_button::{Gesture, PinConfig};
use libfuzzer_sys::fuzz_target;

const TICK: u32 = 20;

fuzz_target!(|data: &[u8]| {
    let (head, body) = data.split_at(data.len().min(TimingParam::ALL.len()));

    let mut timing = TimingConfig::default();
    for (param, byte) in TimingParam::ALL.iter().zip(head) {
        let _ = timing.set(*param, u32::from(*byte) * TICK, TICK);
    }
    assert!(timing.validate(TICK).is_ok());

    let mut button = ButtonInstance::new(0, PinConfig::active_low(4), timing);
    let mut now: u32 = 0;
    let mut pressed_open = false;

    for byte in body {
        for bit in 0..8 {
            let emitted = button.advance(byte & (1 << bit) != 0, now);
            assert!(emitted.len() <= 2);
            for gesture in emitted {
                match gesture {
                    Gesture::Pressed => pressed_open = true,
                    Gesture::Hold => assert!(pressed_open),
                    Gesture::Single | Gesture::Double | Gesture::Long => {
                        assert!(pressed_open, "{gesture:?} without PRESSED");
                        pressed_open = false;
                    }
                }
            }
            now = now.wrapping_add(TICK);
        }
        if byte & 0x80 != 0 {
            now = now.wrapping_add(u32::from(*byte) * TICK);
        }
    }
});
