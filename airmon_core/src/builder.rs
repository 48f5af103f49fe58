//! Type-state builder for `Monitor`.
//!
//! Acquisition, renderer, and transport must be provided before `build()` is
//! available. `try_build()` is always available for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;

use airmon_traits::clock::{Clock, MonotonicClock};

use crate::acquisition::Acquire;
use crate::config::ScheduleCfg;
use crate::error::{BuildError, Result};
use crate::monitor::{Monitor, RunStats};
use crate::readings::SensorReadings;
use crate::render::Renderer;
use crate::scheduler::ReportScheduler;
use crate::transport::Dispatch;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `Monitor`. Configuration is validated on `build()`.
pub struct MonitorBuilder<A, R, X> {
    acquisition: Option<Box<dyn Acquire>>,
    renderer: Option<Box<dyn Renderer>>,
    transport: Option<Box<dyn Dispatch>>,
    schedule: Option<ScheduleCfg>,
    dust_cap: Option<f32>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    _a: PhantomData<A>,
    _r: PhantomData<R>,
    _x: PhantomData<X>,
}

impl Default for MonitorBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            acquisition: None,
            renderer: None,
            transport: None,
            schedule: None,
            dust_cap: None,
            clock: None,
            _a: PhantomData,
            _r: PhantomData,
            _x: PhantomData,
        }
    }
}

impl<A, R, X> MonitorBuilder<A, R, X> {
    /// Fallible build available in any type-state.
    pub fn try_build(self) -> Result<Monitor> {
        let acquisition = self
            .acquisition
            .ok_or_else(|| eyre::Report::new(BuildError::MissingAcquisition))?;
        let renderer = self
            .renderer
            .ok_or_else(|| eyre::Report::new(BuildError::MissingRenderer))?;
        let transport = self
            .transport
            .ok_or_else(|| eyre::Report::new(BuildError::MissingTransport))?;

        let schedule = self.schedule.unwrap_or_default();
        if schedule.send_interval_ms == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "send_interval_ms must be > 0",
            )));
        }
        let dust_cap = self.dust_cap.unwrap_or(1000.0);
        if !dust_cap.is_finite() || dust_cap <= 0.0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "dust density cap must be > 0",
            )));
        }

        let clock: Arc<dyn Clock + Send + Sync> = match self.clock {
            Some(b) => Arc::from(b),
            None => Arc::new(MonotonicClock::new()),
        };
        let interval = std::time::Duration::from_millis(schedule.send_interval_ms);
        let scheduler = ReportScheduler::new(interval, clock.now());

        Ok(Monitor {
            acquisition,
            renderer,
            transport,
            clock,
            schedule,
            scheduler,
            readings: SensorReadings::new(dust_cap),
            stats: RunStats::default(),
            started: false,
            online: false,
        })
    }

    pub fn with_schedule(mut self, schedule: ScheduleCfg) -> Self {
        self.schedule = Some(schedule);
        self
    }

    pub fn with_dust_cap(mut self, cap: f32) -> Self {
        self.dust_cap = Some(cap);
        self
    }

    /// Provide a custom clock; defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

// Setters that advance type-state
impl<R, X> MonitorBuilder<Missing, R, X> {
    pub fn with_acquisition(self, acq: impl Acquire + 'static) -> MonitorBuilder<Set, R, X> {
        MonitorBuilder {
            acquisition: Some(Box::new(acq)),
            renderer: self.renderer,
            transport: self.transport,
            schedule: self.schedule,
            dust_cap: self.dust_cap,
            clock: self.clock,
            _a: PhantomData,
            _r: PhantomData,
            _x: PhantomData,
        }
    }
}

impl<A, X> MonitorBuilder<A, Missing, X> {
    pub fn with_renderer(self, renderer: impl Renderer + 'static) -> MonitorBuilder<A, Set, X> {
        MonitorBuilder {
            acquisition: self.acquisition,
            renderer: Some(Box::new(renderer)),
            transport: self.transport,
            schedule: self.schedule,
            dust_cap: self.dust_cap,
            clock: self.clock,
            _a: PhantomData,
            _r: PhantomData,
            _x: PhantomData,
        }
    }
}

impl<A, R> MonitorBuilder<A, R, Missing> {
    pub fn with_transport(self, transport: impl Dispatch + 'static) -> MonitorBuilder<A, R, Set> {
        MonitorBuilder {
            acquisition: self.acquisition,
            renderer: self.renderer,
            transport: Some(Box::new(transport)),
            schedule: self.schedule,
            dust_cap: self.dust_cap,
            clock: self.clock,
            _a: PhantomData,
            _r: PhantomData,
            _x: PhantomData,
        }
    }
}

impl MonitorBuilder<Set, Set, Set> {
    /// Validate and build. Only available once every collaborator is set.
    pub fn build(self) -> Result<Monitor> {
        self.try_build()
    }
}
