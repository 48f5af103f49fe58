#![no_main]
use airmon_core::util::{code_to_voltage, dust_density, rescale};
use airmon_core::{AirQuality, SensorReadings};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u16, u16, f32, f32, f32)| {
    let (raw, dust_code, t, h, cap) = input;
    let cap = if cap.is_finite() && cap > 0.0 { cap } else { 1000.0 };

    let air = rescale(raw % 4096, 4095, 1023);
    assert!(air <= 1023);
    let _ = AirQuality::classify(raw).label();

    let v = code_to_voltage(f32::from(dust_code % 4096), 3.3, 4095);
    let density = dust_density(v, 0.3, 500.0, cap);
    assert!((0.0..=cap).contains(&density));

    let mut readings = SensorReadings::new(cap);
    if !readings.set_climate(t, h) {
        assert!(t.is_nan() || h.is_nan());
        assert_eq!(readings.temperature_c(), 0.0);
    }
    readings.set_air_raw(air);
    readings.set_dust(density);
    let _ = readings.snapshot();
});
