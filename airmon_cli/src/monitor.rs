//! Assembles a monitor from the typed config and drives the CLI commands.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use airmon_config::{Config, TransportMode};
use airmon_core::{
    AcquisitionController, AcquisitionReport, AirmonError, ChannelStatus, DispatchWorker, Monitor,
    NetworkSession, Publisher, Renderer, RunStats, SensorReadings, TransportSession, Uploader,
};
use airmon_hardware::{SimulatedBoard, SimulatedBroker, SimulatedClimate, SimulatedHttp, SimulatedLink};
use airmon_traits::{
    Board, ClimateSensor, HttpGet, Level, MessageBroker, MonotonicClock, NetworkLink,
};
use airmon_ui::{JsonLines, TextPanel, panel_lines};
use eyre::WrapErr;

type DynBoard = Box<dyn Board + Send>;
type DynClimate = Box<dyn ClimateSensor + Send>;
type DynLink = Box<dyn NetworkLink + Send>;
type DynHttp = Box<dyn HttpGet + Send>;
type DynBroker = Box<dyn MessageBroker + Send>;

pub type Controller = AcquisitionController<DynBoard, DynClimate, MonotonicClock>;
pub type Session = TransportSession<DynLink, MonotonicClock, DynHttp, DynBroker>;

const WORKER_POLL: Duration = Duration::from_millis(100);

fn simulated_sensors(cfg: &Config) -> (DynBoard, DynClimate) {
    let sim = &cfg.simulation;
    let active = if cfg.dust.led_active_low {
        Level::Low
    } else {
        Level::High
    };
    let board = SimulatedBoard::new()
        .with_channel(cfg.channels.gas, sim.gas_raw)
        .with_channel(cfg.channels.dust, sim.dust_raw)
        .with_actuator(cfg.channels.dust, cfg.pins.dust_led, active, 0);
    let climate = if sim.climate_fault {
        SimulatedClimate::faulty()
    } else {
        SimulatedClimate::new(sim.temperature_c, sim.humidity_pct)
    };
    (Box::new(board), Box::new(climate))
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn live_sensors(cfg: &Config) -> eyre::Result<(DynBoard, DynClimate)> {
    use airmon_hardware::board::{HardwareClimate, PiBoard};

    let board = PiBoard::new().wrap_err("open ADC/GPIO")?;
    let climate = HardwareClimate::new(board.gpio(), cfg.pins.dht).wrap_err("open DHT11")?;
    Ok((Box::new(board), Box::new(climate)))
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn live_sensors(cfg: &Config) -> eyre::Result<(DynBoard, DynClimate)> {
    tracing::warn!("built without the `hardware` feature; sensors are simulated");
    Ok(simulated_sensors(cfg))
}

/// Sensor front end for the configured mode.
pub fn build_acquisition(cfg: &Config) -> eyre::Result<Controller> {
    let (board, climate) = match cfg.transport.mode {
        TransportMode::Sim => simulated_sensors(cfg),
        TransportMode::Live => live_sensors(cfg)?,
    };
    Ok(AcquisitionController::new(
        board,
        climate,
        MonotonicClock::new(),
        cfg.into(),
    ))
}

fn simulated_transport(cfg: &Config) -> (DynLink, DynHttp, DynBroker) {
    let sim = &cfg.simulation;
    let link = if sim.link_up_after == 0 {
        SimulatedLink::never()
    } else {
        SimulatedLink::up_after(sim.link_up_after)
    };
    (
        Box::new(link),
        Box::new(SimulatedHttp::new(sim.http_status)),
        Box::new(SimulatedBroker::new(sim.broker_accepts)),
    )
}

#[cfg(feature = "net")]
fn live_transport(cfg: &Config) -> eyre::Result<(DynLink, DynHttp, DynBroker)> {
    use airmon_hardware::net::{HostLink, HttpClient, MqttClient, keep_alive_for};

    let http = HttpClient::new(Duration::from_millis(cfg.upload.timeout_ms))
        .wrap_err("create HTTP client")?;
    let broker = MqttClient::new(
        cfg.publish.broker.clone(),
        cfg.publish.port,
        Duration::from_millis(cfg.publish.connect_timeout_ms),
    )
    .with_keep_alive(keep_alive_for(Duration::from_millis(
        cfg.sampling.send_interval_ms,
    )));
    Ok((
        Box::new(HostLink::new(cfg.wifi.probe.clone())),
        Box::new(http),
        Box::new(broker),
    ))
}

#[cfg(not(feature = "net"))]
fn live_transport(_cfg: &Config) -> eyre::Result<(DynLink, DynHttp, DynBroker)> {
    eyre::bail!("live transport requires the `net` feature")
}

/// Link session plus whichever delivery paths are enabled.
pub fn build_session(cfg: &Config) -> eyre::Result<Session> {
    let (link, http, broker) = match cfg.transport.mode {
        TransportMode::Sim => simulated_transport(cfg),
        TransportMode::Live => live_transport(cfg)?,
    };
    let network = NetworkSession::new(link, MonotonicClock::new(), (&cfg.wifi).into());
    let mut session = TransportSession::new(network);
    if cfg.upload.enabled {
        let uploader = Uploader::new(http, &(&cfg.upload).into()).map_err(eyre::Report::new)?;
        session = session.with_uploader(uploader);
    }
    if cfg.publish.enabled {
        session = session.with_publisher(Publisher::new(broker, (&cfg.publish).into()));
    }
    Ok(session)
}

fn renderer(json: bool) -> Box<dyn Renderer> {
    if json {
        Box::new(JsonLines::new(std::io::stdout()))
    } else {
        Box::new(TextPanel::new(std::io::stdout()))
    }
}

/// Build the monitor and run it until the tick budget or Ctrl-C.
pub fn run_monitor(
    cfg: &Config,
    ticks: Option<u64>,
    background: bool,
    json: bool,
    shutdown: &Arc<AtomicBool>,
) -> eyre::Result<RunStats> {
    let acquisition = build_acquisition(cfg)?;
    let session = build_session(cfg)?;

    let builder = Monitor::builder()
        .with_acquisition(acquisition)
        .with_renderer(renderer(json))
        .with_schedule((&cfg.sampling).into())
        .with_dust_cap(cfg.dust.density_cap);

    let mut monitor = if background {
        tracing::info!(poll_ms = WORKER_POLL.as_millis() as u64, "dispatching on worker thread");
        builder
            .with_transport(DispatchWorker::new(session, WORKER_POLL))
            .build()?
    } else {
        builder.with_transport(session).build()?
    };

    monitor.run(ticks, shutdown)
}

fn status_text(s: &ChannelStatus) -> String {
    match s {
        ChannelStatus::Updated => "updated".to_string(),
        ChannelStatus::Retained(e) => format!("retained ({e})"),
    }
}

fn self_check_json(report: &AcquisitionReport, readings: &SensorReadings) -> serde_json::Value {
    serde_json::json!({
        "kind": "self_check",
        "snapshot": readings.snapshot(),
        "channels": {
            "climate": status_text(&report.climate),
            "gas": status_text(&report.gas),
            "dust": status_text(&report.dust),
        },
        "dust": report.dust_stats.map(|s| serde_json::json!({
            "mean": s.mean,
            "min": s.min,
            "max": s.max,
            "count": s.count,
            "voltage": report.dust_voltage,
        })),
    })
}

/// Blink the dust LED, take one reading of every channel, and print the result.
pub fn self_check(cfg: &Config, json: bool) -> eyre::Result<()> {
    let mut acquisition = build_acquisition(cfg)?;
    acquisition
        .init()
        .map_err(|e| eyre::Report::new(AirmonError::Init(e.to_string())))?;
    acquisition
        .led_self_test(
            cfg.dust.self_test_blinks,
            Duration::from_millis(cfg.dust.self_test_period_ms),
        )
        .map_err(eyre::Report::new)
        .wrap_err("dust LED self-test")?;

    let mut readings = SensorReadings::new(cfg.dust.density_cap);
    let report = acquisition.acquire_all(&mut readings);

    if json {
        println!("{}", self_check_json(&report, &readings));
    } else {
        for line in panel_lines(&readings.snapshot()) {
            println!("{line}");
        }
        println!();
        println!("climate: {}", status_text(&report.climate));
        println!("gas:     {}", status_text(&report.gas));
        println!("dust:    {}", status_text(&report.dust));
        if let (Some(s), Some(v)) = (report.dust_stats, report.dust_voltage) {
            println!(
                "dust samples: n={} mean={:.1} min={} max={} ({v:.3} V)",
                s.count, s.mean, s.min, s.max
            );
        }
    }

    if !report.all_updated() {
        tracing::warn!("self-check: one or more channels kept their previous value");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim_config() -> Config {
        airmon_config::load_toml(
            r#"
            [sampling]
            send_interval_ms = 20
            loop_delay_ms = 5

            [simulation]
            gas_raw = 600
            dust_raw = 1200
            "#,
        )
        .unwrap()
    }

    #[test]
    fn simulated_acquisition_reads_every_channel() {
        let cfg = sim_config();
        let mut acq = build_acquisition(&cfg).unwrap();
        acq.init().unwrap();
        let mut readings = SensorReadings::new(cfg.dust.density_cap);
        let report = acq.acquire_all(&mut readings);
        assert!(report.all_updated());
        assert_eq!(readings.air_raw(), 149);
        assert!(readings.dust_ug_m3() > 0.0);
    }

    #[test]
    fn faulty_climate_is_retained() {
        let mut cfg = sim_config();
        cfg.simulation.climate_fault = true;
        let mut acq = build_acquisition(&cfg).unwrap();
        let mut readings = SensorReadings::new(cfg.dust.density_cap);
        let report = acq.acquire_all(&mut readings);
        assert!(!report.climate.is_updated());
        assert!(report.gas.is_updated());
    }

    #[test]
    fn session_connects_in_simulation() {
        let cfg = sim_config();
        let mut session = build_session(&cfg).unwrap();
        assert!(airmon_core::Dispatch::start(&mut session).is_ok());
        assert!(session.network().is_connected());
    }
}
