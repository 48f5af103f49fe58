//! One sampling pass across the climate, gas, and dust channels.
//!
//! Each channel is read independently. A failed read leaves the previous
//! value in place and is reported in the `AcquisitionReport`; nothing
//! propagates out of `acquire_all`.

use std::time::Duration;

use airmon_traits::{Board, ClimateSensor, Clock};

use crate::config::AcquisitionCfg;
use crate::error::AirmonError;
use crate::hw_error::map_hw_error;
use crate::readings::SensorReadings;
use crate::sampler::{AnalogSampler, SampleStats};
use crate::status::ChannelStatus;
use crate::util::{AIR_SCALE_MAX, code_to_voltage, dust_density, rescale};

/// Per-channel outcome of one `acquire_all` pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionReport {
    pub climate: ChannelStatus,
    pub gas: ChannelStatus,
    pub dust: ChannelStatus,
    /// Raw window statistics of the dust read, when it completed.
    pub dust_stats: Option<SampleStats>,
    /// Sensor output voltage derived from `dust_stats`.
    pub dust_voltage: Option<f32>,
}

impl AcquisitionReport {
    /// True when every channel was refreshed.
    pub fn all_updated(&self) -> bool {
        self.climate.is_updated() && self.gas.is_updated() && self.dust.is_updated()
    }
}

/// Seam between the control loop and whatever produces readings.
pub trait Acquire {
    /// Put the sensors into their idle state.
    fn init(&mut self) -> Result<(), AirmonError> {
        Ok(())
    }

    fn acquire_all(&mut self, readings: &mut SensorReadings) -> AcquisitionReport;
}

impl<T: Acquire + ?Sized> Acquire for Box<T> {
    fn init(&mut self) -> Result<(), AirmonError> {
        (**self).init()
    }

    fn acquire_all(&mut self, readings: &mut SensorReadings) -> AcquisitionReport {
        (**self).acquire_all(readings)
    }
}

pub struct AcquisitionController<B, T, C> {
    board: B,
    climate: T,
    clock: C,
    cfg: AcquisitionCfg,
    sampler: AnalogSampler,
}

impl<B, T, C> AcquisitionController<B, T, C>
where
    B: Board,
    T: ClimateSensor,
    C: Clock,
{
    pub fn new(board: B, climate: T, clock: C, cfg: AcquisitionCfg) -> Self {
        let sampler = AnalogSampler::new((&cfg.dust).into());
        Self {
            board,
            climate,
            clock,
            cfg,
            sampler,
        }
    }

    pub fn cfg(&self) -> &AcquisitionCfg {
        &self.cfg
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    /// Drive the dust LED to its inactive level.
    pub fn init(&mut self) -> Result<(), AirmonError> {
        let off = self.cfg.dust.led_active.inverted();
        self.board
            .set_digital(self.cfg.dust.led_pin, off)
            .map_err(|e| map_hw_error(&*e))
    }

    /// Blink the dust LED `blinks` times, `period` on and `period` off.
    /// Leaves it inactive.
    pub fn led_self_test(&mut self, blinks: u32, period: Duration) -> Result<(), AirmonError> {
        let pin = self.cfg.dust.led_pin;
        let on = self.cfg.dust.led_active;
        for i in 0..blinks {
            tracing::debug!(blink = i + 1, pin, "dust LED self-test");
            self.board
                .set_digital(pin, on)
                .map_err(|e| map_hw_error(&*e))?;
            self.clock.sleep(period);
            self.board
                .set_digital(pin, on.inverted())
                .map_err(|e| map_hw_error(&*e))?;
            self.clock.sleep(period);
        }
        Ok(())
    }

    pub fn read_climate(&mut self, readings: &mut SensorReadings) -> ChannelStatus {
        match self.climate.read_climate() {
            Ok(s) if s.is_valid() => {
                readings.set_climate(s.temperature_c, s.humidity_pct);
                ChannelStatus::Updated
            }
            Ok(_) => {
                tracing::warn!("climate sensor returned NaN; keeping previous values");
                ChannelStatus::Retained(AirmonError::NoReading("climate sensor returned NaN"))
            }
            Err(e) => {
                let err = map_hw_error(&*e);
                tracing::warn!(error = %err, "climate read failed; keeping previous values");
                ChannelStatus::Retained(err)
            }
        }
    }

    pub fn read_gas(&mut self, readings: &mut SensorReadings) -> ChannelStatus {
        match self.board.read_analog(self.cfg.gas.channel) {
            Ok(raw) => {
                let scaled = rescale(raw, self.cfg.adc.resolution, AIR_SCALE_MAX);
                tracing::trace!(raw, scaled, "gas channel");
                readings.set_air_raw(scaled);
                ChannelStatus::Updated
            }
            Err(e) => {
                let err = map_hw_error(&*e);
                tracing::warn!(error = %err, "gas read failed; keeping previous value");
                ChannelStatus::Retained(err)
            }
        }
    }

    /// Dust reading. Returns the channel status plus the window statistics
    /// and derived voltage when sampling completed.
    pub fn read_dust(
        &mut self,
        readings: &mut SensorReadings,
    ) -> (ChannelStatus, Option<(SampleStats, f32)>) {
        let dust = &self.cfg.dust;
        let stats = match self.sampler.sample_with_actuator(
            &mut self.board,
            &self.clock,
            dust.channel,
            dust.led_pin,
        ) {
            Ok(s) => s,
            Err(err) => {
                tracing::warn!(error = %err, "dust read failed; keeping previous value");
                return (ChannelStatus::Retained(err), None);
            }
        };

        let voltage = code_to_voltage(stats.mean, self.cfg.adc.vref, self.cfg.adc.resolution);
        let density = dust_density(voltage, dust.baseline_v, dust.sensitivity, dust.density_cap);
        tracing::debug!(
            min = stats.min,
            max = stats.max,
            mean = stats.mean,
            voltage,
            density,
            "dust window"
        );
        readings.set_dust(density);
        (ChannelStatus::Updated, Some((stats, voltage)))
    }

    /// Climate, then gas, then dust. Never fails as a whole.
    pub fn acquire_all(&mut self, readings: &mut SensorReadings) -> AcquisitionReport {
        let climate = self.read_climate(readings);
        let gas = self.read_gas(readings);
        let (dust, window) = self.read_dust(readings);
        AcquisitionReport {
            climate,
            gas,
            dust,
            dust_stats: window.map(|(s, _)| s),
            dust_voltage: window.map(|(_, v)| v),
        }
    }
}

impl<B, T, C> Acquire for AcquisitionController<B, T, C>
where
    B: Board,
    T: ClimateSensor,
    C: Clock,
{
    fn init(&mut self) -> Result<(), AirmonError> {
        AcquisitionController::init(self)
    }

    fn acquire_all(&mut self, readings: &mut SensorReadings) -> AcquisitionReport {
        AcquisitionController::acquire_all(self, readings)
    }
}
