//! Registration lifecycle through the public manager API: capacity,
//! id compaction, and the dispatcher's lifetime following the registry.

use gesture_button::{Error, Gesture, MAX_BUTTONS, PinConfig, TimingParam};

use super::mock_hw::{Recorder, drive, finish, register_recorded, scheduler};

#[test]
fn ids_are_dense_up_to_capacity() {
    let (sched, levels) = scheduler();
    for gpio in 0..MAX_BUTTONS {
        assert_eq!(sched.register(PinConfig::active_low(gpio as i32 + 10)), Ok(gpio as u8));
    }
    assert_eq!(
        sched.register(PinConfig::active_low(40)),
        Err(Error::CapacityExceeded)
    );
    assert_eq!(sched.len(), MAX_BUTTONS);
    assert_eq!(levels.configured().len(), MAX_BUTTONS);
    finish(&sched);
}

#[test]
fn invalid_or_duplicate_pins_are_rejected() {
    let (sched, levels) = scheduler();
    sched.register(PinConfig::active_low(4)).unwrap();
    assert_eq!(sched.register(PinConfig::active_low(4)), Err(Error::InvalidSource));
    assert_eq!(sched.register(PinConfig::active_low(-1)), Err(Error::InvalidSource));
    assert_eq!(sched.register(PinConfig::active_low(99)), Err(Error::InvalidSource));
    assert_eq!(sched.len(), 1);
    // Rejected pins never reach the level source.
    assert_eq!(levels.configured(), [4]);
    finish(&sched);
}

#[test]
fn deregistering_shifts_ids_and_keeps_handlers_and_timing() {
    let (sched, levels) = scheduler();
    let first = PinConfig::active_low(4);
    let second = PinConfig::active_low(5);
    let kept = Recorder::new();

    sched.register(first).unwrap();
    let id = register_recorded(&sched, second, &kept);
    assert_eq!(id, 1);
    sched.set_timing(id, TimingParam::DoubleWindow, 300).unwrap();

    sched.deregister(0).unwrap();
    assert_eq!(sched.len(), 1);
    assert_eq!(sched.timing(0).unwrap().double_window_ms, 300);
    assert_eq!(sched.timing(1), Err(Error::NotFound));

    drive(&sched, &levels, &second, 0, 1_000, |t| t < 100);
    finish(&sched);

    // Delivered under the new id, through the handler installed before.
    assert_eq!(kept.events(), [(0, Gesture::Pressed), (0, Gesture::Single)]);
}

#[test]
fn stale_ids_are_not_found() {
    let (sched, _levels) = scheduler();
    let id = sched.register(PinConfig::active_low(4)).unwrap();
    sched.register(PinConfig::active_low(5)).unwrap();
    sched.deregister(id).unwrap();

    assert_eq!(sched.deregister(1), Err(Error::NotFound));
    assert_eq!(
        sched.set_handler(1, Gesture::Long, Recorder::new().handler()),
        Err(Error::NotFound)
    );
    assert_eq!(sched.clear_handler(3, Gesture::Long), Err(Error::NotFound));
    assert_eq!(sched.set_timing(1, TimingParam::Hold, 600), Err(Error::NotFound));
    assert!(sched.state(1).is_err());
    finish(&sched);
}

#[test]
fn dispatcher_is_rebuilt_after_full_teardown() {
    let (sched, levels) = scheduler();
    let pin = PinConfig::active_low(4);
    let rec = Recorder::new();

    register_recorded(&sched, pin, &rec);
    drive(&sched, &levels, &pin, 0, 1_000, |t| t < 100);
    finish(&sched);
    assert!(!sched.is_dispatching());

    register_recorded(&sched, pin, &rec);
    assert!(sched.is_dispatching());
    drive(&sched, &levels, &pin, 1_000, 2_000, |t| t < 1_100);
    finish(&sched);

    assert_eq!(rec.count(Gesture::Single), 2);
    // Counters survive the teardown.
    assert_eq!(sched.stats().delivered, 4);
}

#[test]
fn events_queued_before_removal_are_still_delivered() {
    let (sched, levels) = scheduler();
    let pin = PinConfig::active_low(4);
    let rec = Recorder::new();
    let id = register_recorded(&sched, pin, &rec);

    drive(&sched, &levels, &pin, 0, 60, |_| true);
    sched.deregister(id).unwrap();

    assert_eq!(rec.events(), [(0, Gesture::Pressed)]);
}

#[test]
fn failed_registration_on_full_registry_keeps_existing_buttons_working() {
    let (sched, levels) = scheduler();
    let rec = Recorder::new();
    let pins: Vec<_> = (0..MAX_BUTTONS as i32).map(|g| PinConfig::active_low(g + 10)).collect();
    for pin in &pins {
        register_recorded(&sched, *pin, &rec);
    }
    assert!(sched.register(PinConfig::active_low(2)).is_err());

    let last = pins[MAX_BUTTONS - 1];
    drive(&sched, &levels, &last, 0, 1_000, |t| t < 100);
    finish(&sched);

    let last_id = (MAX_BUTTONS - 1) as u8;
    assert_eq!(rec.events(), [(last_id, Gesture::Pressed), (last_id, Gesture::Single)]);
}
