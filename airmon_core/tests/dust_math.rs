use airmon_core::util::{code_to_voltage, dust_density};
use proptest::prelude::*;

#[test]
fn reference_mean_gives_expected_density() {
    let v = code_to_voltage(600.0, 3.3, 4095);
    assert!((v - 0.4835).abs() < 1e-4, "voltage {v}");
    let d = dust_density(v, 0.3, 500.0, 1000.0);
    assert!((d - 91.76).abs() < 0.01, "density {d}");
}

proptest! {
    #[test]
    fn density_within_bounds(v in -5.0f32..10.0, base in 0.0f32..1.0, sens in 1.0f32..2000.0, cap in 1.0f32..5000.0) {
        let d = dust_density(v, base, sens, cap);
        prop_assert!((0.0..=cap).contains(&d));
    }

    #[test]
    fn zero_at_or_below_baseline(base in 0.0f32..1.0, below in 0.0f32..1.0) {
        prop_assert_eq!(dust_density(base - below, base, 500.0, 1000.0), 0.0);
    }

    #[test]
    fn linear_above_baseline(excess in 0.001f32..1.0, sens in 1.0f32..900.0) {
        // stays under the cap: excess * sens < 900 < 1000
        let d = dust_density(0.3 + excess, 0.3, sens, 1000.0);
        let expected = excess * sens;
        prop_assert!((d - expected).abs() <= expected * 1e-3 + 1e-3, "{} vs {}", d, expected);
    }
}
