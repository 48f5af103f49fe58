//! Actuator-synchronized analog sampling.
//!
//! Optical dust sensors only produce a meaningful output while their LED is
//! lit, and only within a narrow window after it turns on. Each sample is
//! therefore one pulse:
//!
//! ```text
//! LED  ──┐                 ┌──────────── recovery ───────────┐
//!        └── settle ─┬─hold┘                                  └── next pulse
//! ADC               read
//! ```
//!
//! The order (activate, settle, read, hold, deactivate, recovery) is what the
//! sensor's datasheet timing assumes; every density value downstream depends
//! on it.
use std::time::Duration;

use airmon_traits::{Board, Clock, Level};

use crate::config::DustCfg;
use crate::error::AirmonError;
use crate::hw_error::map_hw_error;

/// Pulse timing for one multi-sample read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseTiming {
    pub settle: Duration,
    pub hold: Duration,
    pub recovery: Duration,
    pub samples: u32,
    /// Level that turns the actuator on.
    pub active: Level,
}

impl From<&DustCfg> for PulseTiming {
    fn from(c: &DustCfg) -> Self {
        Self {
            settle: Duration::from_micros(c.settle_us),
            hold: Duration::from_micros(c.hold_us),
            recovery: Duration::from_millis(c.recovery_ms),
            samples: c.samples,
            active: c.led_active,
        }
    }
}

impl Default for PulseTiming {
    fn default() -> Self {
        (&DustCfg::default()).into()
    }
}

/// Running aggregate of raw codes for a single read.
#[derive(Debug, Clone, Copy)]
pub struct SampleWindow {
    sum: u64,
    min: u16,
    max: u16,
    count: u32,
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleWindow {
    pub fn new() -> Self {
        Self {
            sum: 0,
            min: u16::MAX,
            max: 0,
            count: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, raw: u16) {
        self.sum += u64::from(raw);
        self.min = self.min.min(raw);
        self.max = self.max.max(raw);
        self.count += 1;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Consume the window; `None` when nothing was pushed.
    pub fn finish(self) -> Option<SampleStats> {
        if self.count == 0 {
            return None;
        }
        Some(SampleStats {
            mean: (self.sum as f64 / f64::from(self.count)) as f32,
            min: self.min,
            max: self.max,
            count: self.count,
        })
    }
}

/// Result of one multi-sample read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStats {
    pub mean: f32,
    pub min: u16,
    pub max: u16,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnalogSampler {
    timing: PulseTiming,
}

impl AnalogSampler {
    pub fn new(timing: PulseTiming) -> Self {
        Self { timing }
    }

    pub fn timing(&self) -> &PulseTiming {
        &self.timing
    }

    /// Take `samples` pulsed reads of `channel`, driving `actuator_pin`.
    ///
    /// On a failed read the actuator is switched off before the error is
    /// returned, so the LED is never left lit.
    pub fn sample_with_actuator<B, C>(
        &self,
        board: &mut B,
        clock: &C,
        channel: u8,
        actuator_pin: u8,
    ) -> Result<SampleStats, AirmonError>
    where
        B: Board + ?Sized,
        C: Clock + ?Sized,
    {
        let t = &self.timing;
        if t.samples == 0 {
            return Err(AirmonError::Config("sample count must be > 0".into()));
        }
        let inactive = t.active.inverted();
        let mut window = SampleWindow::new();

        for _ in 0..t.samples {
            if let Err(e) = board.set_digital(actuator_pin, t.active) {
                let _ = board.set_digital(actuator_pin, inactive);
                return Err(map_hw_error(&*e));
            }
            clock.sleep(t.settle);

            let raw = match board.read_analog(channel) {
                Ok(v) => v,
                Err(e) => {
                    let _ = board.set_digital(actuator_pin, inactive);
                    return Err(map_hw_error(&*e));
                }
            };
            window.push(raw);

            clock.sleep(t.hold);
            board
                .set_digital(actuator_pin, inactive)
                .map_err(|e| map_hw_error(&*e))?;
            clock.sleep(t.recovery);
        }

        window
            .finish()
            .ok_or(AirmonError::NoReading("empty sample window"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_tracks_sum_min_max() {
        let mut w = SampleWindow::new();
        for v in [610, 590, 600, 605, 595] {
            w.push(v);
        }
        let s = w.finish().unwrap();
        assert_eq!(s.count, 5);
        assert_eq!(s.min, 590);
        assert_eq!(s.max, 610);
        assert!((s.mean - 600.0).abs() < f32::EPSILON);
    }

    #[test]
    fn empty_window_has_no_stats() {
        assert!(SampleWindow::new().finish().is_none());
    }

    #[test]
    fn default_timing_is_reference_pulse() {
        let t = PulseTiming::default();
        assert_eq!(t.settle, Duration::from_micros(280));
        assert_eq!(t.hold, Duration::from_micros(40));
        assert_eq!(t.recovery, Duration::from_millis(10));
        assert_eq!(t.samples, 10);
        assert_eq!(t.active, Level::Low);
    }
}
