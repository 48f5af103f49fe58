use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use airmon_hardware::error::HwError;
use airmon_hardware::util::wait_while_with_timeout;

#[test]
fn wait_while_success_path() {
    let high = Arc::new(AtomicBool::new(true));
    let high_bg = high.clone();
    // Flip low after a short delay
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(3));
        high_bg.store(false, Ordering::Relaxed);
    });

    let res = wait_while_with_timeout(
        || high.load(Ordering::Relaxed),
        Duration::from_millis(500),
        Some(Duration::from_micros(200)),
    );
    let held = res.unwrap_or_else(|e| panic!("expected success, got {e:?}"));
    assert!(held >= Duration::from_millis(2), "held for {held:?}");
}

#[test]
fn wait_while_returns_immediately_when_condition_false() {
    let held = wait_while_with_timeout(|| false, Duration::from_millis(5), None)
        .unwrap_or_else(|e| panic!("unexpected error: {e:?}"));
    assert!(held < Duration::from_millis(5));
}

#[test]
fn wait_while_timeout_path_spinning() {
    let err = wait_while_with_timeout(|| true, Duration::from_millis(5), None)
        .expect_err("expected timeout error");

    match err {
        HwError::Timeout => {}
        other => panic!("unexpected error: {other:?}"),
    }
}
