//! Background dispatch.
//!
//! A single worker thread owns the transport so a slow upload or a reconnect
//! never stalls the sampling loop. Snapshots are handed over a one-slot
//! channel: a snapshot still waiting when a newer one arrives is replaced,
//! and the worker always sends the newest it can see.
//!
//! The worker is shut down and joined when `DispatchWorker` is dropped.
use crossbeam_channel as xch;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::AirmonError;
use crate::readings::Snapshot;
use crate::status::DispatchOutcome;
use crate::transport::Dispatch;

pub struct DispatchWorker {
    tx: xch::Sender<Snapshot>,
    /// Producer-side handle used to evict a stale snapshot.
    evict: xch::Receiver<Snapshot>,
    rx: Option<xch::Receiver<Snapshot>>,
    pending: Option<Box<dyn Dispatch + Send>>,
    poll: Duration,
    completed: Arc<AtomicU64>,
    replaced: Arc<AtomicU64>,
    last_outcome: Arc<Mutex<Option<DispatchOutcome>>>,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl DispatchWorker {
    /// Wrap `session`. The thread is spawned by `start()`, or lazily by the
    /// first `dispatch()`. `poll` bounds how long shutdown can go unnoticed.
    pub fn new(session: impl Dispatch + Send + 'static, poll: Duration) -> Self {
        let (tx, rx) = xch::bounded(1);
        Self {
            tx,
            evict: rx.clone(),
            rx: Some(rx),
            pending: Some(Box::new(session)),
            poll,
            completed: Arc::new(AtomicU64::new(0)),
            replaced: Arc::new(AtomicU64::new(0)),
            last_outcome: Arc::new(Mutex::new(None)),
            shutdown: Arc::new(AtomicBool::new(false)),
            join_handle: None,
        }
    }

    /// Dispatch cycles the worker has finished.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Snapshots that were replaced before the worker picked them up.
    pub fn replaced(&self) -> u64 {
        self.replaced.load(Ordering::Relaxed)
    }

    pub fn last_outcome(&self) -> Option<DispatchOutcome> {
        self.last_outcome.lock().ok().and_then(|g| g.clone())
    }

    fn spawn(&mut self) {
        let (Some(mut session), Some(rx)) = (self.pending.take(), self.rx.take()) else {
            return;
        };
        let shutdown = self.shutdown.clone();
        let completed = self.completed.clone();
        let last_outcome = self.last_outcome.clone();
        let poll = self.poll;

        self.join_handle = Some(std::thread::spawn(move || {
            loop {
                if shutdown.load(Ordering::Relaxed) {
                    tracing::debug!("dispatch worker received shutdown signal");
                    break;
                }
                let first = match rx.recv_timeout(poll) {
                    Ok(s) => s,
                    Err(xch::RecvTimeoutError::Timeout) => continue,
                    Err(xch::RecvTimeoutError::Disconnected) => {
                        tracing::debug!("dispatch producer disconnected, exiting thread");
                        break;
                    }
                };
                let snapshot = rx.try_iter().last().unwrap_or(first);
                let outcome = session.dispatch(&snapshot);
                tracing::debug!(?outcome, "background dispatch cycle");
                if let Ok(mut g) = last_outcome.lock() {
                    *g = Some(outcome);
                }
                completed.fetch_add(1, Ordering::Relaxed);
            }
            tracing::trace!("dispatch worker exiting cleanly");
        }));
    }
}

impl Dispatch for DispatchWorker {
    /// Boot-connect on the caller's thread, then hand the session to the
    /// worker.
    fn start(&mut self) -> Result<(), AirmonError> {
        let result = match self.pending.as_mut() {
            Some(session) => session.start(),
            None => Ok(()),
        };
        self.spawn();
        result
    }

    fn dispatch(&mut self, snapshot: &Snapshot) -> DispatchOutcome {
        if self.join_handle.is_none() {
            self.spawn();
        }
        match self.tx.try_send(*snapshot) {
            Ok(()) => {}
            Err(xch::TrySendError::Full(latest)) => {
                if self.evict.try_recv().is_ok() {
                    self.replaced.fetch_add(1, Ordering::Relaxed);
                }
                if self.tx.try_send(latest).is_err() {
                    tracing::warn!("dispatch worker busy; snapshot dropped");
                }
            }
            Err(xch::TrySendError::Disconnected(_)) => {
                tracing::warn!("dispatch worker gone; snapshot dropped");
            }
        }
        DispatchOutcome::Queued
    }
}

impl Drop for DispatchWorker {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => tracing::trace!("dispatch worker joined"),
                Err(e) => tracing::warn!(?e, "dispatch worker panicked during shutdown"),
            }
        }
    }
}
