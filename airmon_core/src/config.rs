//! Configuration types for the monitor core.
//!
//! These are the runtime configuration structs used by the acquisition,
//! scheduling, and transport components. They are separate from the
//! TOML-deserialized config in `airmon_config`.

use airmon_traits::Level;

/// ADC scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdcCfg {
    /// Full-scale code (4095 for a 12-bit converter).
    pub resolution: u16,
    /// Reference voltage in volts.
    pub vref: f32,
}

impl Default for AdcCfg {
    fn default() -> Self {
        Self {
            resolution: 4095,
            vref: 3.3,
        }
    }
}

/// Gas (MQ-135) channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasCfg {
    pub channel: u8,
}

impl Default for GasCfg {
    fn default() -> Self {
        Self { channel: 0 }
    }
}

/// Optical dust sensor (GP2Y1010) wiring, pulse timing, and conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DustCfg {
    pub channel: u8,
    pub led_pin: u8,
    /// Level that lights the LED.
    pub led_active: Level,
    pub samples: u32,
    /// LED-on to ADC-sample delay.
    pub settle_us: u64,
    /// ADC-sample to LED-off delay.
    pub hold_us: u64,
    /// LED-off gap before the next pulse.
    pub recovery_ms: u64,
    /// Output voltage in clean air. Empirical, per sensor unit.
    pub baseline_v: f32,
    /// µg/m³ per volt above baseline. Empirical, per sensor unit.
    pub sensitivity: f32,
    pub density_cap: f32,
}

impl Default for DustCfg {
    fn default() -> Self {
        Self {
            channel: 1,
            led_pin: 5,
            led_active: Level::Low,
            samples: 10,
            settle_us: 280,
            hold_us: 40,
            recovery_ms: 10,
            baseline_v: 0.3,
            sensitivity: 500.0,
            density_cap: 1000.0,
        }
    }
}

/// Everything one acquisition pass needs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AcquisitionCfg {
    pub adc: AdcCfg,
    pub gas: GasCfg,
    pub dust: DustCfg,
}

/// Loop pacing and upload cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleCfg {
    pub send_interval_ms: u64,
    pub loop_delay_ms: u64,
}

impl Default for ScheduleCfg {
    fn default() -> Self {
        Self {
            send_interval_ms: 30_000,
            loop_delay_ms: 2_000,
        }
    }
}

/// Network credentials plus the bounded association retry policy.
#[derive(Clone, PartialEq, Eq)]
pub struct LinkCfg {
    pub ssid: String,
    pub password: String,
    pub max_attempts: u32,
    pub attempt_spacing_ms: u64,
}

impl Default for LinkCfg {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            max_attempts: 20,
            attempt_spacing_ms: 500,
        }
    }
}

impl std::fmt::Debug for LinkCfg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkCfg")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .field("max_attempts", &self.max_attempts)
            .field("attempt_spacing_ms", &self.attempt_spacing_ms)
            .finish()
    }
}

/// Request/response upload target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCfg {
    pub endpoint: String,
    pub api_key: String,
}

/// Pub/sub target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishCfg {
    pub topic: String,
    pub client_prefix: String,
}

impl Default for PublishCfg {
    fn default() -> Self {
        Self {
            topic: "airmon/airquality".to_string(),
            client_prefix: "airmon-".to_string(),
        }
    }
}
