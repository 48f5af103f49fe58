//! `From` implementations bridging `airmon_config` types to `airmon_core` types.

use airmon_traits::Level;

use crate::config::{
    AcquisitionCfg, AdcCfg, DustCfg, GasCfg, LinkCfg, PublishCfg, ScheduleCfg, UploadCfg,
};

// ── AdcCfg ───────────────────────────────────────────────────────────────────

impl From<&airmon_config::Adc> for AdcCfg {
    fn from(c: &airmon_config::Adc) -> Self {
        Self {
            resolution: c.resolution,
            vref: c.vref,
        }
    }
}

// ── AcquisitionCfg ───────────────────────────────────────────────────────────

/// Spans several sections (pins, channels, adc, dust), so it maps from the
/// whole document.
impl From<&airmon_config::Config> for AcquisitionCfg {
    fn from(c: &airmon_config::Config) -> Self {
        Self {
            adc: (&c.adc).into(),
            gas: GasCfg {
                channel: c.channels.gas,
            },
            dust: DustCfg {
                channel: c.channels.dust,
                led_pin: c.pins.dust_led,
                led_active: if c.dust.led_active_low {
                    Level::Low
                } else {
                    Level::High
                },
                samples: c.dust.samples,
                settle_us: c.dust.settle_us,
                hold_us: c.dust.hold_us,
                recovery_ms: c.dust.recovery_ms,
                baseline_v: c.dust.baseline_v,
                sensitivity: c.dust.sensitivity,
                density_cap: c.dust.density_cap,
            },
        }
    }
}

// ── ScheduleCfg ──────────────────────────────────────────────────────────────

impl From<&airmon_config::Sampling> for ScheduleCfg {
    fn from(c: &airmon_config::Sampling) -> Self {
        Self {
            send_interval_ms: c.send_interval_ms,
            loop_delay_ms: c.loop_delay_ms,
        }
    }
}

// ── LinkCfg ──────────────────────────────────────────────────────────────────

impl From<&airmon_config::Wifi> for LinkCfg {
    fn from(c: &airmon_config::Wifi) -> Self {
        Self {
            ssid: c.ssid.clone(),
            password: c.password.clone(),
            max_attempts: c.max_attempts,
            attempt_spacing_ms: c.attempt_spacing_ms,
        }
    }
}

// ── UploadCfg / PublishCfg ───────────────────────────────────────────────────

impl From<&airmon_config::Upload> for UploadCfg {
    fn from(c: &airmon_config::Upload) -> Self {
        Self {
            endpoint: c.endpoint.clone(),
            api_key: c.api_key.clone(),
        }
    }
}

impl From<&airmon_config::Publish> for PublishCfg {
    fn from(c: &airmon_config::Publish) -> Self {
        Self {
            topic: c.topic.clone(),
            client_prefix: c.client_prefix.clone(),
        }
    }
}
