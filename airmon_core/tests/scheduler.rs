use std::time::{Duration, Instant};

use airmon_core::ReportScheduler;
use proptest::prelude::*;

proptest! {
    #[test]
    fn gate_is_exactly_elapsed_vs_interval(interval_ms in 1u64..120_000, elapsed_ms in 0u64..240_000) {
        let t0 = Instant::now();
        let s = ReportScheduler::new(Duration::from_millis(interval_ms), t0);
        let now = t0 + Duration::from_millis(elapsed_ms);
        prop_assert_eq!(s.should_dispatch(now), elapsed_ms >= interval_ms);
    }

    #[test]
    fn mark_resets_unconditionally(interval_ms in 1u64..60_000, at_ms in 0u64..120_000) {
        let t0 = Instant::now();
        let mut s = ReportScheduler::new(Duration::from_millis(interval_ms), t0);
        let at = t0 + Duration::from_millis(at_ms);
        s.mark_dispatched(at);
        prop_assert!(!s.should_dispatch(at));
        prop_assert_eq!(s.last_dispatch(), at);
        prop_assert_eq!(s.remaining(at), Duration::from_millis(interval_ms));
        prop_assert!(s.should_dispatch(at + Duration::from_millis(interval_ms)));
    }
}

#[test]
fn now_before_last_counts_as_not_due() {
    let t0 = Instant::now() + Duration::from_secs(10);
    let s = ReportScheduler::new(Duration::from_secs(1), t0);
    assert!(!s.should_dispatch(t0 - Duration::from_secs(5)));
}

#[test]
fn ticks_fire_once_per_interval() {
    // 2 s loop, 30 s interval: fires on the 15th, 30th, ... tick
    let t0 = Instant::now();
    let mut s = ReportScheduler::new(Duration::from_secs(30), t0);
    let mut fired = Vec::new();
    for tick in 1..=45u64 {
        let now = t0 + Duration::from_secs(2 * tick);
        if s.should_dispatch(now) {
            s.mark_dispatched(now);
            fired.push(tick);
        }
    }
    assert_eq!(fired, vec![15, 30, 45]);
}
