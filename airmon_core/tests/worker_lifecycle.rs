use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use airmon_core::{AirQuality, AirmonError, Dispatch, DispatchOutcome, DispatchWorker, Snapshot};

fn snap(air_raw: u16) -> Snapshot {
    Snapshot {
        temperature_c: 20.0,
        humidity_pct: 40.0,
        air_raw,
        air_quality: AirQuality::classify(air_raw),
        dust_ug_m3: 0.0,
    }
}

/// Transport that records what it was given, optionally slowly.
#[derive(Clone, Default)]
struct Recorder {
    seen: Arc<Mutex<Vec<u16>>>,
    started: Arc<Mutex<Option<thread::ThreadId>>>,
    delay: Duration,
}

impl Dispatch for Recorder {
    fn start(&mut self) -> Result<(), AirmonError> {
        *self.started.lock().unwrap() = Some(thread::current().id());
        Ok(())
    }

    fn dispatch(&mut self, snapshot: &Snapshot) -> DispatchOutcome {
        thread::sleep(self.delay);
        self.seen.lock().unwrap().push(snapshot.air_raw);
        DispatchOutcome::Attempted {
            upload: Some(Ok(200)),
            publish: None,
        }
    }
}

fn wait_for(mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out");
        thread::sleep(Duration::from_millis(2));
    }
}

#[test]
fn start_connects_on_caller_thread_and_dispatch_queues() {
    let rec = Recorder::default();
    let mut w = DispatchWorker::new(rec.clone(), Duration::from_millis(5));

    w.start().unwrap();
    assert_eq!(*rec.started.lock().unwrap(), Some(thread::current().id()));

    assert_eq!(w.dispatch(&snap(42)), DispatchOutcome::Queued);
    wait_for(|| w.completed() == 1);
    assert_eq!(*rec.seen.lock().unwrap(), vec![42]);
    assert!(w.last_outcome().is_some_and(|o| o.upload_ok()));
}

#[test]
fn newest_snapshot_wins_while_worker_is_busy() {
    let rec = Recorder {
        delay: Duration::from_millis(100),
        ..Recorder::default()
    };
    let mut w = DispatchWorker::new(rec.clone(), Duration::from_millis(5));
    w.start().unwrap();

    w.dispatch(&snap(1));
    // let the worker pick up the first snapshot and block in dispatch
    thread::sleep(Duration::from_millis(20));
    for v in 2..=5 {
        w.dispatch(&snap(v));
    }
    wait_for(|| rec.seen.lock().unwrap().len() == 2);

    let seen = rec.seen.lock().unwrap().clone();
    assert_eq!(seen, vec![1, 5]);
    assert_eq!(w.replaced(), 3);
}

#[test]
fn drop_joins_the_worker() {
    let rec = Recorder::default();
    let seen = rec.seen.clone();
    {
        let mut w = DispatchWorker::new(rec, Duration::from_millis(5));
        w.dispatch(&snap(7));
        wait_for(|| w.completed() == 1);
    }
    // worker gone; the session it owned has been dropped
    assert_eq!(Arc::strong_count(&seen), 1);
}
