//! End-to-end gesture flows: scripted levels → tick → FSM → dispatcher →
//! handler, at the default thresholds (confirm 40ms, hold 500ms, long
//! 2500ms, double window 100ms, 20ms ticks).

use std::time::Duration;

use gesture_button::{ActiveLevel, ButtonState, Gesture, Handler, PinConfig, TimingParam};

use super::mock_hw::{Recorder, TICK_MS, drive, finish, register_recorded, scheduler};

const PIN: PinConfig = PinConfig::active_low(4);

#[test]
fn short_press_is_pressed_then_single() {
    let (sched, levels) = scheduler();
    let rec = Recorder::new();
    let id = register_recorded(&sched, PIN, &rec);

    drive(&sched, &levels, &PIN, 0, 1_000, |t| t < 100);
    finish(&sched);

    assert_eq!(rec.events(), [(id, Gesture::Pressed), (id, Gesture::Single)]);
}

#[test]
fn two_quick_presses_are_double() {
    let (sched, levels) = scheduler();
    let rec = Recorder::new();
    register_recorded(&sched, PIN, &rec);

    drive(&sched, &levels, &PIN, 0, 1_000, |t| t < 50 || (110..160).contains(&t));
    finish(&sched);

    assert_eq!(rec.gestures(), [Gesture::Pressed, Gesture::Double]);
}

#[test]
fn press_past_hold_repeats_and_ends_single() {
    let (sched, levels) = scheduler();
    let rec = Recorder::new();
    register_recorded(&sched, PIN, &rec);

    drive(&sched, &levels, &PIN, 0, 1_000, |t| t < 600);
    finish(&sched);

    // HOLD at 540, 560, 580; release observed at 600.
    assert_eq!(rec.count(Gesture::Pressed), 1);
    assert_eq!(rec.count(Gesture::Hold), 3);
    assert_eq!(rec.count(Gesture::Single), 1);
    assert_eq!(rec.count(Gesture::Double), 0);
}

#[test]
fn held_past_long_classifies_long_once() {
    let (sched, levels) = scheduler();
    let rec = Recorder::new();
    register_recorded(&sched, PIN, &rec);

    drive(&sched, &levels, &PIN, 0, 3_300, |t| t <= 3_040);
    finish(&sched);

    let stats = sched.stats();
    assert_eq!(rec.count(Gesture::Pressed), 1);
    assert_eq!(rec.count(Gesture::Long), 1);
    assert_eq!(rec.count(Gesture::Single), 0);
    // One HOLD per tick from 540 to 3020; any the queue could not hold
    // are accounted for as repeat drops.
    assert_eq!(rec.count(Gesture::Hold) as u32 + stats.dropped_repeat, 125);
    assert_eq!(stats.dropped_discrete, 0);
}

#[test]
fn held_for_four_seconds_is_pressed_and_long_once() {
    let (sched, levels) = scheduler();
    let rec = Recorder::new();
    let id = register_recorded(&sched, PIN, &rec);

    drive(&sched, &levels, &PIN, 0, 4_000, |_| true);
    assert_eq!(sched.state(id).unwrap(), ButtonState::Long);
    drive(&sched, &levels, &PIN, 4_000, 4_600, |_| false);
    assert_eq!(sched.state(id).unwrap(), ButtonState::Idle);
    finish(&sched);

    let stats = sched.stats();
    assert_eq!(rec.count(Gesture::Pressed), 1);
    assert_eq!(rec.count(Gesture::Long), 1);
    assert_eq!(rec.count(Gesture::Single) + rec.count(Gesture::Double), 0);
    assert_eq!(rec.count(Gesture::Hold) as u32 + stats.dropped_repeat, 125);
}

#[test]
fn one_tick_chatter_is_ignored() {
    let (sched, levels) = scheduler();
    let rec = Recorder::new();
    let id = register_recorded(&sched, PIN, &rec);

    // Active, inactive, active, then released for good.
    drive(&sched, &levels, &PIN, 0, 600, |t| t == 0 || t == 40);
    assert_eq!(sched.state(id).unwrap(), ButtonState::Idle);
    // Alternating every tick for a full second.
    drive(&sched, &levels, &PIN, 600, 1_600, |t| (t / TICK_MS) % 2 == 0);
    finish(&sched);

    assert!(rec.events().is_empty());
    assert_eq!(sched.stats().submitted, 0);
}

#[test]
fn bounce_shorter_than_confirm_window_is_ignored() {
    let (sched, levels) = scheduler();
    let rec = Recorder::new();
    let id = register_recorded(&sched, PIN, &rec);

    // Isolated single-tick active samples.
    drive(&sched, &levels, &PIN, 0, 400, |t| t == 0 || t == 100 || t == 200);
    assert_eq!(sched.state(id).unwrap(), ButtonState::Idle);
    finish(&sched);

    assert!(rec.events().is_empty());
    assert_eq!(sched.stats().submitted, 0);
}

#[test]
fn active_high_button_uses_rising_edge() {
    let (sched, levels) = scheduler();
    let rec = Recorder::new();
    let pin = PinConfig::new(9, ActiveLevel::High);
    register_recorded(&sched, pin, &rec);

    // Level source idles high; the configured pull keeps this pad low.
    drive(&sched, &levels, &pin, 0, 600, |t| t < 100);
    finish(&sched);

    assert_eq!(rec.gestures(), [Gesture::Pressed, Gesture::Single]);
}

#[test]
fn buttons_are_classified_independently() {
    let (sched, levels) = scheduler();
    let rec = Recorder::new();
    let a = PinConfig::active_low(4);
    let b = PinConfig::active_low(5);
    let id_a = register_recorded(&sched, a, &rec);
    let id_b = register_recorded(&sched, b, &rec);

    for t in (0..1_000).step_by(TICK_MS as usize) {
        // A: single click.  B: double click.
        if t < 100 { levels.press(&a) } else { levels.release(&a) }
        if t < 50 || (110..160).contains(&t) {
            levels.press(&b);
        } else {
            levels.release(&b);
        }
        sched.tick(t);
    }
    finish(&sched);

    assert_eq!(rec.count_for(id_a, Gesture::Single), 1);
    assert_eq!(rec.count_for(id_a, Gesture::Double), 0);
    assert_eq!(rec.count_for(id_b, Gesture::Double), 1);
    assert_eq!(rec.count_for(id_b, Gesture::Single), 0);
    assert_eq!(rec.count(Gesture::Pressed), 2);
}

#[test]
fn only_gestures_with_a_handler_are_queued() {
    let (sched, levels) = scheduler();
    let rec = Recorder::new();
    let id = sched.register(PIN).unwrap();
    sched.set_handler(id, Gesture::Single, rec.handler()).unwrap();

    drive(&sched, &levels, &PIN, 0, 1_000, |t| t < 100);
    finish(&sched);

    assert_eq!(rec.gestures(), [Gesture::Single]);
    assert_eq!(sched.stats().submitted, 1);
}

#[test]
fn hold_threshold_change_applies_to_press_in_progress() {
    let (sched, levels) = scheduler();
    let rec = Recorder::new();
    let id = register_recorded(&sched, PIN, &rec);

    drive(&sched, &levels, &PIN, 0, 100, |_| true);
    sched.set_timing(id, TimingParam::Hold, 200).unwrap();
    // PRESSED entered at 40, so HOLD starts at 240 instead of 540.
    drive(&sched, &levels, &PIN, 100, 280, |_| true);
    drive(&sched, &levels, &PIN, 280, 600, |_| false);
    finish(&sched);

    assert_eq!(rec.count(Gesture::Hold), 2);
    assert_eq!(rec.count(Gesture::Single), 1);
}

#[test]
fn function_and_argument_handler_receives_its_argument() {
    static LABEL: std::sync::Mutex<Option<&'static str>> = std::sync::Mutex::new(None);
    fn remember(label: &&'static str) {
        *LABEL.lock().unwrap() = Some(*label);
    }

    let (sched, levels) = scheduler();
    let id = sched.register(PIN).unwrap();
    sched
        .set_handler(id, Gesture::Pressed, Handler::with_arg(remember, "boot"))
        .unwrap();

    drive(&sched, &levels, &PIN, 0, 60, |_| true);
    finish(&sched);

    assert_eq!(*LABEL.lock().unwrap(), Some("boot"));
}

#[test]
fn delivery_happens_without_teardown() {
    let (sched, levels) = scheduler();
    let rec = Recorder::new();
    register_recorded(&sched, PIN, &rec);

    drive(&sched, &levels, &PIN, 0, 60, |_| true);
    assert!(rec.wait_for(1, Duration::from_secs(2)));
    assert_eq!(rec.gestures(), [Gesture::Pressed]);
    finish(&sched);
}
