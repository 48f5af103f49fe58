#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the air monitor.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every section except `[upload]` has usable defaults matching the
//!   reference board (ESP32-style 12-bit ADC, GP2Y dust sensor, DHT11).
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pins {
    /// DHT11 data line
    pub dht: u8,
    /// Dust-sensor LED control line
    pub dust_led: u8,
    /// Display I2C lines. The terminal panel does not drive them; they are
    /// kept so one file describes the whole board.
    pub sda: u8,
    pub scl: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            dht: 4,
            dust_led: 5,
            sda: 21,
            scl: 22,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Channels {
    /// ADC channel wired to the MQ-135 analog output
    pub gas: u8,
    /// ADC channel wired to the GP2Y analog output
    pub dust: u8,
}

impl Default for Channels {
    fn default() -> Self {
        Self { gas: 0, dust: 1 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Adc {
    /// Full-scale ADC code (4095 for 12-bit)
    pub resolution: u16,
    /// ADC reference voltage
    pub vref: f32,
}

impl Default for Adc {
    fn default() -> Self {
        Self {
            resolution: 4095,
            vref: 3.3,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Sampling {
    /// Upload cadence in ms
    pub send_interval_ms: u64,
    /// Delay between loop ticks in ms
    pub loop_delay_ms: u64,
    /// Hand dispatches to a background worker thread
    pub background_dispatch: bool,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            send_interval_ms: 30_000,
            loop_delay_ms: 2_000,
            background_dispatch: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Dust {
    pub samples: u32,
    pub settle_us: u64,
    pub hold_us: u64,
    pub recovery_ms: u64,
    /// Clean-air output voltage; tuned per sensor unit
    pub baseline_v: f32,
    /// µg/m³ per volt above baseline; tuned per sensor unit
    pub sensitivity: f32,
    pub density_cap: f32,
    /// LED is lit when its control line is low
    pub led_active_low: bool,
    /// Wiring check run by `self-check`: blink count and half-period
    pub self_test_blinks: u32,
    pub self_test_period_ms: u64,
}

impl Default for Dust {
    fn default() -> Self {
        Self {
            samples: 10,
            settle_us: 280,
            hold_us: 40,
            recovery_ms: 10,
            baseline_v: 0.3,
            sensitivity: 500.0,
            density_cap: 1000.0,
            led_active_low: true,
            self_test_blinks: 5,
            self_test_period_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Wifi {
    /// Network to join; passed to the link on every connect and logged
    pub ssid: String,
    /// Never logged
    pub password: String,
    pub max_attempts: u32,
    pub attempt_spacing_ms: u64,
    /// host:port probed by the live host link to decide "associated"
    pub probe: String,
}

impl Default for Wifi {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            max_attempts: 20,
            attempt_spacing_ms: 500,
            probe: "1.1.1.1:53".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Upload {
    pub enabled: bool,
    pub endpoint: String,
    pub api_key: String,
    pub timeout_ms: u64,
}

impl Default for Upload {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.thingspeak.com".to_string(),
            api_key: String::new(),
            timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Publish {
    pub enabled: bool,
    pub broker: String,
    pub port: u16,
    pub topic: String,
    pub client_prefix: String,
    pub connect_timeout_ms: u64,
}

impl Default for Publish {
    fn default() -> Self {
        Self {
            enabled: false,
            broker: "broker.hivemq.com".to_string(),
            port: 1883,
            topic: "airmon/airquality".to_string(),
            client_prefix: "airmon-".to_string(),
            connect_timeout_ms: 3_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Simulated board, link, and endpoints
    #[default]
    Sim,
    /// Real network clients (requires the `net` feature)
    Live,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Transport {
    pub mode: TransportMode,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// Values fed to the simulated devices in `sim` mode.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Simulation {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub gas_raw: u16,
    pub dust_raw: u16,
    /// Link associates on this poll; 0 means never
    pub link_up_after: u32,
    /// Climate sensor reports NaN
    pub climate_fault: bool,
    pub http_status: i32,
    pub broker_accepts: bool,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            temperature_c: 24.5,
            humidity_pct: 55.0,
            gas_raw: 600,
            dust_raw: 600,
            link_up_after: 1,
            climate_fault: false,
            http_status: 200,
            broker_accepts: true,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub pins: Pins,
    #[serde(default)]
    pub channels: Channels,
    #[serde(default)]
    pub adc: Adc,
    #[serde(default)]
    pub sampling: Sampling,
    #[serde(default)]
    pub dust: Dust,
    #[serde(default)]
    pub wifi: Wifi,
    #[serde(default)]
    pub upload: Upload,
    #[serde(default)]
    pub publish: Publish,
    #[serde(default)]
    pub transport: Transport,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub simulation: Simulation,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse, and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {e}", path.display()))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {}: {e}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        if self.adc.resolution == 0 {
            eyre::bail!("invalid configuration: adc.resolution must be > 0");
        }
        if !(self.adc.vref.is_finite() && self.adc.vref > 0.0) {
            eyre::bail!("invalid configuration: adc.vref must be > 0");
        }
        if self.channels.gas == self.channels.dust {
            eyre::bail!("invalid configuration: channels.gas and channels.dust must differ");
        }
        if self.sampling.send_interval_ms == 0 {
            eyre::bail!("invalid configuration: sampling.send_interval_ms must be > 0");
        }
        if self.dust.samples == 0 {
            eyre::bail!("invalid configuration: dust.samples must be > 0");
        }
        if !(self.dust.sensitivity.is_finite() && self.dust.sensitivity > 0.0) {
            eyre::bail!("invalid configuration: dust.sensitivity must be > 0");
        }
        if !(self.dust.density_cap.is_finite() && self.dust.density_cap > 0.0) {
            eyre::bail!("invalid configuration: dust.density_cap must be > 0");
        }
        if !(self.dust.baseline_v.is_finite() && self.dust.baseline_v >= 0.0) {
            eyre::bail!("invalid configuration: dust.baseline_v must be >= 0");
        }
        if self.wifi.max_attempts == 0 {
            eyre::bail!("invalid configuration: wifi.max_attempts must be > 0");
        }
        if self.upload.enabled {
            if self.upload.endpoint.trim().is_empty() {
                eyre::bail!("invalid configuration: upload.endpoint is missing");
            }
            if !(self.upload.endpoint.starts_with("http://")
                || self.upload.endpoint.starts_with("https://"))
            {
                eyre::bail!("invalid configuration: upload.endpoint must be an http(s) URL");
            }
            if self.upload.api_key.trim().is_empty() {
                eyre::bail!("invalid configuration: upload.api_key is missing");
            }
        }
        if self.publish.enabled {
            if self.publish.broker.trim().is_empty() {
                eyre::bail!("invalid configuration: publish.broker is missing");
            }
            if self.publish.topic.trim().is_empty() {
                eyre::bail!("invalid configuration: publish.topic is missing");
            }
            if self.publish.port == 0 {
                eyre::bail!("invalid configuration: publish.port must be > 0");
            }
        }
        if let Some(rot) = self.logging.rotation.as_deref() {
            if !matches!(rot, "never" | "daily" | "hourly") {
                eyre::bail!("invalid configuration: logging.rotation must be never|daily|hourly");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_board() {
        let cfg = load_toml("[upload]\napi_key = \"K\"\n").unwrap();
        assert_eq!(cfg.adc.resolution, 4095);
        assert_eq!(cfg.sampling.send_interval_ms, 30_000);
        assert_eq!(cfg.sampling.loop_delay_ms, 2_000);
        assert_eq!(cfg.dust.samples, 10);
        assert_eq!(cfg.wifi.max_attempts, 20);
        assert_eq!(cfg.transport.mode, TransportMode::Sim);
        cfg.validate().unwrap();
    }

    #[test]
    fn empty_document_needs_an_api_key() {
        let cfg = load_toml("").unwrap();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("upload.api_key"));
    }
}
