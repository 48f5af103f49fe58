//! The control loop: acquire, render, maybe dispatch, sleep.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use airmon_traits::Clock;
use serde::Serialize;

use crate::acquisition::{Acquire, AcquisitionReport};
use crate::config::ScheduleCfg;
use crate::error::{AirmonError, Result};
use crate::readings::{SensorReadings, Snapshot};
use crate::render::Renderer;
use crate::scheduler::ReportScheduler;
use crate::status::DispatchOutcome;
use crate::transport::Dispatch;

/// Everything that happened during one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub snapshot: Snapshot,
    pub acquisition: AcquisitionReport,
    /// `Some` when the scheduler fired this tick.
    pub dispatch: Option<DispatchOutcome>,
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub ticks: u64,
    pub dispatches: u64,
    pub uploads_ok: u64,
    pub link_down_cycles: u64,
    /// Channel reads that kept a previous value.
    pub channel_faults: u64,
}

impl RunStats {
    fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        let a = &report.acquisition;
        self.channel_faults += [&a.climate, &a.gas, &a.dust]
            .iter()
            .filter(|s| !s.is_updated())
            .count() as u64;
        match &report.dispatch {
            None => {}
            Some(outcome) => {
                self.dispatches += 1;
                if outcome.upload_ok() {
                    self.uploads_ok += 1;
                }
                if matches!(outcome, DispatchOutcome::LinkDown { .. }) {
                    self.link_down_cycles += 1;
                }
            }
        }
    }
}

/// Owns the sensor state and drives the collaborators in a fixed order.
pub struct Monitor {
    pub(crate) acquisition: Box<dyn Acquire>,
    pub(crate) renderer: Box<dyn Renderer>,
    pub(crate) transport: Box<dyn Dispatch>,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) schedule: ScheduleCfg,
    pub(crate) scheduler: ReportScheduler,
    pub(crate) readings: SensorReadings,
    pub(crate) stats: RunStats,
    pub(crate) started: bool,
    pub(crate) online: bool,
}

impl core::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Monitor")
            .field("schedule", &self.schedule)
            .field("readings", &self.readings)
            .field("stats", &self.stats)
            .field("started", &self.started)
            .field("online", &self.online)
            .finish_non_exhaustive()
    }
}

impl Monitor {
    pub fn builder() -> crate::builder::MonitorBuilder<
        crate::builder::Missing,
        crate::builder::Missing,
        crate::builder::Missing,
    > {
        crate::builder::MonitorBuilder::default()
    }

    pub fn readings(&self) -> &SensorReadings {
        &self.readings
    }

    pub fn snapshot(&self) -> Snapshot {
        self.readings.snapshot()
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn schedule(&self) -> &ScheduleCfg {
        &self.schedule
    }

    /// Link state as of the last boot connect or dispatch cycle. A queued
    /// dispatch leaves it unchanged.
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Bring up the renderer, idle the sensors, and boot-connect the
    /// transport. Only a renderer failure is an error; a transport failure
    /// leaves the monitor in display-only mode until the next dispatch cycle.
    pub fn start(&mut self) -> Result<()> {
        self.renderer
            .init()
            .map_err(|e| eyre::Report::new(AirmonError::Init(e.to_string())))?;

        if let Err(e) = self.acquisition.init() {
            tracing::warn!(error = %e, "sensor init failed");
        }

        self.notice("Connecting WiFi...");
        match self.transport.start() {
            Ok(()) => {
                self.online = true;
                self.notice("WiFi Connected!");
            }
            Err(e) => {
                self.online = false;
                tracing::warn!(error = %e, "transport unavailable; display-only until next cycle");
                self.notice("WiFi Failed!");
            }
        }

        self.scheduler = ReportScheduler::new(self.scheduler.interval(), self.clock.now());
        self.started = true;
        tracing::info!(
            send_interval_ms = self.schedule.send_interval_ms,
            loop_delay_ms = self.schedule.loop_delay_ms,
            "monitor started"
        );
        Ok(())
    }

    fn notice(&mut self, message: &str) {
        tracing::info!(notice = message, "status");
        if let Err(e) = self.renderer.notice(message) {
            tracing::warn!(error = %e, "notice render failed");
        }
    }

    /// One pass: acquire, render, then dispatch if the interval has elapsed.
    pub fn tick(&mut self) -> TickReport {
        let acquisition = self.acquisition.acquire_all(&mut self.readings);
        let snapshot = self.readings.snapshot();

        if let Err(e) = self.renderer.render(&snapshot) {
            tracing::warn!(error = %e, "render failed");
        }

        let now = self.clock.now();
        let dispatch = if self.scheduler.should_dispatch(now) {
            self.scheduler.mark_dispatched(now);
            let outcome = self.transport.dispatch(&snapshot);
            tracing::debug!(?outcome, "dispatch cycle");
            match outcome {
                DispatchOutcome::LinkDown { reconnected } => self.online = reconnected,
                DispatchOutcome::Attempted { .. } => self.online = true,
                DispatchOutcome::Queued => {}
            }
            Some(outcome)
        } else {
            None
        };

        let report = TickReport {
            snapshot,
            acquisition,
            dispatch,
        };
        self.stats.record(&report);
        report
    }

    /// Tick until `shutdown` is set or `max_ticks` ticks have run, sleeping
    /// the loop delay between ticks. Starts the monitor first if needed.
    pub fn run(&mut self, max_ticks: Option<u64>, shutdown: &AtomicBool) -> Result<RunStats> {
        if !self.started {
            self.start()?;
        }
        let delay = Duration::from_millis(self.schedule.loop_delay_ms);
        let budget_reached = |stats: &RunStats| max_ticks.is_some_and(|n| stats.ticks >= n);

        while !shutdown.load(Ordering::Relaxed) && !budget_reached(&self.stats) {
            self.tick();
            if budget_reached(&self.stats) || shutdown.load(Ordering::Relaxed) {
                break;
            }
            self.clock.sleep(delay);
        }

        tracing::info!(
            ticks = self.stats.ticks,
            dispatches = self.stats.dispatches,
            uploads_ok = self.stats.uploads_ok,
            "monitor stopped"
        );
        Ok(self.stats)
    }
}
