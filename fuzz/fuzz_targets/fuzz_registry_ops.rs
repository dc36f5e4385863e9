//! Fuzz target: `Registry` register/deregister sequences
//!
//! Each byte is one operation: high bit clear registers GPIO `b & 0x3f`
//! (which may be invalid or a duplicate), high bit set deregisters id
//! `b & 0x0f`.  After every operation ids must be dense and GPIOs unique.
//!
//! cargo fuzz run fuzz_registry_ops

#![no_main]

use gesture_button::config::TimingConfig;
use gesture_button::registry::{MAX_BUTTONS, Registry};
use gesture_button::PinConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut registry = Registry::new();

    for &b in data {
        if b & 0x80 == 0 {
            let before = registry.len();
            match registry.register(PinConfig::active_low(i32::from(b & 0x3f)), TimingConfig::default()) {
                Ok(id) => assert_eq!(usize::from(id), before),
                Err(_) => assert_eq!(registry.len(), before),
            }
        } else {
            let before = registry.len();
            let ok = registry.deregister(b & 0x0f).is_ok();
            assert_eq!(ok, usize::from(b & 0x0f) < before);
        }

        assert!(registry.len() <= MAX_BUTTONS);
        for (i, button) in registry.iter().enumerate() {
            assert_eq!(usize::from(button.id()), i);
            assert!(registry.iter().skip(i + 1).all(|o| o.pin().gpio != button.pin().gpio));
        }
    }
});
