//! Interval gate between the fast sampling loop and the slow upload cadence.

use std::time::{Duration, Instant};

/// Last dispatch instant plus the fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchClock {
    pub last: Instant,
    pub interval: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct ReportScheduler {
    clock: DispatchClock,
}

impl ReportScheduler {
    /// Start counting from `start`; the first dispatch is due one interval later.
    pub fn new(interval: Duration, start: Instant) -> Self {
        Self {
            clock: DispatchClock {
                last: start,
                interval,
            },
        }
    }

    pub fn interval(&self) -> Duration {
        self.clock.interval
    }

    pub fn last_dispatch(&self) -> Instant {
        self.clock.last
    }

    /// `now - last >= interval`. A `now` earlier than `last` counts as zero
    /// elapsed.
    #[inline]
    pub fn should_dispatch(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.clock.last) >= self.clock.interval
    }

    /// Record an attempted dispatch, whatever its outcome.
    #[inline]
    pub fn mark_dispatched(&mut self, now: Instant) {
        self.clock.last = now;
    }

    pub fn next_due(&self) -> Instant {
        self.clock.last + self.clock.interval
    }

    /// Time left until the next dispatch; zero when already due.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next_due().saturating_duration_since(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_dispatch_after_one_interval() {
        let t0 = Instant::now();
        let s = ReportScheduler::new(Duration::from_secs(30), t0);
        assert!(!s.should_dispatch(t0));
        assert!(!s.should_dispatch(t0 + Duration::from_millis(29_999)));
        assert!(s.should_dispatch(t0 + Duration::from_secs(30)));
        assert_eq!(s.remaining(t0 + Duration::from_secs(10)), Duration::from_secs(20));
        assert_eq!(s.remaining(t0 + Duration::from_secs(45)), Duration::ZERO);
    }

    #[test]
    fn mark_resets_the_window() {
        let t0 = Instant::now();
        let mut s = ReportScheduler::new(Duration::from_secs(30), t0);
        let t1 = t0 + Duration::from_secs(31);
        s.mark_dispatched(t1);
        assert!(!s.should_dispatch(t1));
        assert_eq!(s.next_due(), t1 + Duration::from_secs(30));
    }
}
