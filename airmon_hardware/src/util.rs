use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Wait while the provided `cond` predicate holds (e.g. line still high),
/// or until the timeout expires. Returns how long the condition held.
///
/// With `poll_interval == None` the wait spins, which is what bit-banged
/// protocols with microsecond pulses need; otherwise it sleeps between polls.
pub fn wait_while_with_timeout(
    mut cond: impl FnMut() -> bool,
    timeout: Duration,
    poll_interval: Option<Duration>,
) -> Result<Duration> {
    let start = Instant::now();
    let deadline = start + timeout;
    while cond() {
        if Instant::now() >= deadline {
            return Err(HwError::Timeout);
        }
        match poll_interval {
            Some(d) => std::thread::sleep(d),
            None => std::hint::spin_loop(),
        }
    }
    Ok(start.elapsed())
}
