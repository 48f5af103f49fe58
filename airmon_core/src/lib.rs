#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Air-quality monitor core (hardware-agnostic).
//!
//! All hardware and network access goes through the capability traits in
//! `airmon_traits`, so every component here runs on a host against fakes.
//!
//! ## Architecture
//!
//! - **Sampling**: actuator-synchronized multi-sample analog reads (`sampler`)
//! - **Readings**: single-owner sensor state and classification (`readings`)
//! - **Acquisition**: one pass over all channels with per-channel failure isolation (`acquisition`)
//! - **Scheduling**: interval gate for the upload cadence (`scheduler`)
//! - **Transport**: network link, HTTP upload, and broker publish (`transport`)
//! - **Loop**: `Monitor` ties them together (`monitor`, `builder`), optionally
//!   with a background `DispatchWorker` (`worker`)
//!
//! ## Units
//!
//! The gas reading is normalized to `0..=1023` with integer arithmetic. Dust
//! density is in µg/m³ and always within `[0, cap]`.

pub mod acquisition;
pub mod builder;
pub mod config;
pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod monitor;
pub mod readings;
pub mod render;
pub mod sampler;
pub mod scheduler;
pub mod status;
pub mod transport;
pub mod util;
pub mod worker;

pub use acquisition::{Acquire, AcquisitionController, AcquisitionReport};
pub use builder::MonitorBuilder;
pub use config::{
    AcquisitionCfg, AdcCfg, DustCfg, GasCfg, LinkCfg, PublishCfg, ScheduleCfg, UploadCfg,
};
pub use error::{AirmonError, BuildError, Report, Result};
pub use monitor::{Monitor, RunStats, TickReport};
pub use readings::{AirQuality, SensorReadings, Snapshot};
pub use render::{RenderError, Renderer};
pub use sampler::{AnalogSampler, PulseTiming, SampleStats, SampleWindow};
pub use scheduler::{DispatchClock, ReportScheduler};
pub use status::{ChannelStatus, DispatchOutcome};
pub use transport::{
    Dispatch, LinkState, NetworkSession, Publisher, TransportSession, Uploader,
};
pub use worker::DispatchWorker;
