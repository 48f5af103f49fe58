use airmon_core::readings::AIR_QUALITY_BANDS;
use airmon_core::util::{AIR_SCALE_MAX, rescale};
use airmon_core::{AirQuality, SensorReadings};
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case(0, AirQuality::Excellent)]
#[case(99, AirQuality::Excellent)]
#[case(100, AirQuality::Good)]
#[case(199, AirQuality::Good)]
#[case(200, AirQuality::Moderate)]
#[case(299, AirQuality::Moderate)]
#[case(300, AirQuality::Poor)]
#[case(399, AirQuality::Poor)]
#[case(400, AirQuality::VeryPoor)]
#[case(500, AirQuality::VeryPoor)]
#[case(501, AirQuality::Hazardous)]
#[case(1023, AirQuality::Hazardous)]
#[case(u16::MAX, AirQuality::Hazardous)]
fn band_boundaries(#[case] raw: u16, #[case] expected: AirQuality) {
    assert_eq!(AirQuality::classify(raw), expected);
}

#[rstest]
#[case(AirQuality::Excellent, "Excellent")]
#[case(AirQuality::VeryPoor, "Very Poor")]
#[case(AirQuality::Hazardous, "Hazardous")]
fn labels_match_panel_text(#[case] q: AirQuality, #[case] text: &str) {
    assert_eq!(q.label(), text);
    assert_eq!(q.to_string(), text);
}

#[test]
fn band_table_is_strictly_increasing() {
    for pair in AIR_QUALITY_BANDS.windows(2) {
        assert!(pair[0].0 < pair[1].0);
        assert!(pair[0].1 < pair[1].1);
    }
}

proptest! {
    #[test]
    fn severity_is_non_decreasing(a in 0u16..=AIR_SCALE_MAX, b in 0u16..=AIR_SCALE_MAX) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(AirQuality::classify(lo) <= AirQuality::classify(hi));
    }

    #[test]
    fn stored_label_always_matches_raw(raw in any::<u16>()) {
        let mut r = SensorReadings::default();
        r.set_air_raw(raw);
        let s = r.snapshot();
        prop_assert!(s.air_raw <= AIR_SCALE_MAX);
        prop_assert_eq!(s.air_quality, AirQuality::classify(s.air_raw));
    }

    #[test]
    fn rescale_stays_in_range_and_is_monotonic(a in 0u16..=4095, b in 0u16..=4095) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (slo, shi) = (rescale(lo, 4095, AIR_SCALE_MAX), rescale(hi, 4095, AIR_SCALE_MAX));
        prop_assert!(shi <= AIR_SCALE_MAX);
        prop_assert!(slo <= shi);
        prop_assert_eq!(u32::from(slo), u32::from(lo) * 1023 / 4095);
    }
}
