//! Unit conversions shared by the acquisition pass.

/// Upper bound of the normalized air-quality scale.
pub const AIR_SCALE_MAX: u16 = 1023;

/// Linearly rescale `raw` from `0..=from_max` to `0..=to_max` with integer
/// arithmetic (truncating). `raw` is clamped to `from_max` first.
#[inline]
pub fn rescale(raw: u16, from_max: u16, to_max: u16) -> u16 {
    if from_max == 0 {
        return 0;
    }
    let raw = u32::from(raw.min(from_max));
    // raw <= from_max, so the quotient never exceeds to_max
    (raw * u32::from(to_max) / u32::from(from_max)) as u16
}

/// Convert a (mean) ADC code to volts: `code * (vref / resolution)`.
#[inline]
pub fn code_to_voltage(code: f32, vref: f32, resolution: u16) -> f32 {
    if resolution == 0 {
        return 0.0;
    }
    code * (vref / f32::from(resolution))
}

/// Dust density in µg/m³ from the sensor output voltage.
///
/// `max(0, (voltage - baseline) * sensitivity)`, clamped to `[0, cap]`.
/// Non-finite intermediate results map to 0.
#[inline]
pub fn dust_density(voltage: f32, baseline_v: f32, sensitivity: f32, cap: f32) -> f32 {
    let d = (voltage - baseline_v) * sensitivity;
    if d.is_nan() || d <= 0.0 {
        0.0
    } else {
        d.min(cap.max(0.0))
    }
}

/// Round to two decimals for wire encodings.
#[inline]
pub fn round2(x: f32) -> f64 {
    (f64::from(x) * 100.0).round() / 100.0
}
