//! Latest sensor values and the derived air-quality classification.

use serde::Serialize;

/// Qualitative air-quality band, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AirQuality {
    Excellent,
    Good,
    Moderate,
    Poor,
    VeryPoor,
    Hazardous,
}

/// Inclusive upper bound of each band on the 0..=1023 scale; anything above
/// the last bound is `Hazardous`. Scanned first-match-wins.
pub const AIR_QUALITY_BANDS: [(u16, AirQuality); 5] = [
    (99, AirQuality::Excellent),
    (199, AirQuality::Good),
    (299, AirQuality::Moderate),
    (399, AirQuality::Poor),
    (500, AirQuality::VeryPoor),
];

impl AirQuality {
    /// Classify a normalized gas reading.
    pub fn classify(raw: u16) -> Self {
        AIR_QUALITY_BANDS
            .iter()
            .find(|(max, _)| raw <= *max)
            .map_or(AirQuality::Hazardous, |(_, q)| *q)
    }

    /// Human-readable label, as shown on the panel.
    pub const fn label(self) -> &'static str {
        match self {
            AirQuality::Excellent => "Excellent",
            AirQuality::Good => "Good",
            AirQuality::Moderate => "Moderate",
            AirQuality::Poor => "Poor",
            AirQuality::VeryPoor => "Very Poor",
            AirQuality::Hazardous => "Hazardous",
        }
    }
}

impl std::fmt::Display for AirQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable copy of the readings at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Snapshot {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub air_raw: u16,
    pub air_quality: AirQuality,
    pub dust_ug_m3: f32,
}

/// Latest value of every channel. Owned by the control loop; collaborators
/// only ever see `Snapshot`s.
///
/// The label is derived from `air_raw` on every read and dust density can
/// only be stored through a clamping setter, so neither invariant can drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReadings {
    temperature_c: f32,
    humidity_pct: f32,
    air_raw: u16,
    dust_ug_m3: f32,
    dust_cap: f32,
}

impl SensorReadings {
    /// Zeroed readings with the given dust-density cap.
    pub fn new(dust_cap: f32) -> Self {
        Self {
            temperature_c: 0.0,
            humidity_pct: 0.0,
            air_raw: 0,
            dust_ug_m3: 0.0,
            dust_cap: dust_cap.max(0.0),
        }
    }

    pub fn temperature_c(&self) -> f32 {
        self.temperature_c
    }

    pub fn humidity_pct(&self) -> f32 {
        self.humidity_pct
    }

    pub fn air_raw(&self) -> u16 {
        self.air_raw
    }

    pub fn air_quality(&self) -> AirQuality {
        AirQuality::classify(self.air_raw)
    }

    pub fn dust_ug_m3(&self) -> f32 {
        self.dust_ug_m3
    }

    /// Store a climate pair. A pair with a NaN on either side is rejected
    /// and the previous values stay; returns whether the pair was stored.
    pub fn set_climate(&mut self, temperature_c: f32, humidity_pct: f32) -> bool {
        if temperature_c.is_nan() || humidity_pct.is_nan() {
            return false;
        }
        self.temperature_c = temperature_c;
        self.humidity_pct = humidity_pct;
        true
    }

    /// Store a normalized gas reading, saturating at the top of the scale.
    pub fn set_air_raw(&mut self, raw: u16) {
        self.air_raw = raw.min(crate::util::AIR_SCALE_MAX);
    }

    /// Store a dust density, clamped to `[0, cap]`; NaN stores 0.
    pub fn set_dust(&mut self, ug_m3: f32) {
        self.dust_ug_m3 = if ug_m3.is_nan() {
            0.0
        } else {
            ug_m3.clamp(0.0, self.dust_cap)
        };
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            temperature_c: self.temperature_c,
            humidity_pct: self.humidity_pct,
            air_raw: self.air_raw,
            air_quality: self.air_quality(),
            dust_ug_m3: self.dust_ug_m3,
        }
    }
}

impl Default for SensorReadings {
    fn default() -> Self {
        Self::new(1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zeroed() {
        let r = SensorReadings::default();
        let s = r.snapshot();
        assert_eq!(s.temperature_c, 0.0);
        assert_eq!(s.humidity_pct, 0.0);
        assert_eq!(s.air_raw, 0);
        assert_eq!(s.air_quality, AirQuality::Excellent);
        assert_eq!(s.dust_ug_m3, 0.0);
    }

    #[test]
    fn dust_setter_clamps() {
        let mut r = SensorReadings::new(1000.0);
        r.set_dust(-4.0);
        assert_eq!(r.dust_ug_m3(), 0.0);
        r.set_dust(2500.0);
        assert_eq!(r.dust_ug_m3(), 1000.0);
        r.set_dust(f32::NAN);
        assert_eq!(r.dust_ug_m3(), 0.0);
    }

    #[test]
    fn nan_climate_pair_is_rejected() {
        let mut r = SensorReadings::default();
        assert!(r.set_climate(22.5, 48.0));
        assert!(!r.set_climate(f32::NAN, 40.0));
        assert!(!r.set_climate(19.0, f32::NAN));
        assert_eq!(r.temperature_c(), 22.5);
        assert_eq!(r.humidity_pct(), 48.0);
    }

    #[test]
    fn label_follows_raw() {
        let mut r = SensorReadings::default();
        r.set_air_raw(450);
        assert_eq!(r.air_quality(), AirQuality::VeryPoor);
        assert_eq!(r.snapshot().air_quality.label(), "Very Poor");
        r.set_air_raw(9999);
        assert_eq!(r.air_raw(), 1023);
        assert_eq!(r.air_quality(), AirQuality::Hazardous);
    }
}
