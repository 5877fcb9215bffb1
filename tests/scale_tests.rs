use approx::assert_relative_eq;
use chart_join::core::{
    BandSpec, ContinuousKind, DomainPolicy, Key, ScaleFactory, ScaleSpec,
};
use chart_join::ChartError;
use proptest::prelude::*;

#[test]
fn linear_scale_maps_domain_into_range() {
    let scale = ScaleFactory::build(&ScaleSpec::linear(Some((0.0, 25.0)), (0.0, 100.0)))
        .expect("valid scale");
    assert_eq!(scale.kind(), ContinuousKind::Linear);
    assert_relative_eq!(scale.map(5.0), 20.0);
    assert_relative_eq!(scale.map(25.0), 100.0);
    assert_relative_eq!(scale.invert(60.0).expect("domain"), 15.0);
}

#[test]
fn degenerate_domain_collapses_to_range_start() {
    let scale = ScaleFactory::build(&ScaleSpec::linear(Some((5.0, 5.0)), (10.0, 200.0)))
        .expect("degenerate domains are legal");
    for value in [-100.0, 0.0, 5.0, 1e9] {
        assert_eq!(scale.map(value), 10.0);
    }
    assert_eq!(scale.invert(150.0), Some(5.0));
}

#[test]
fn missing_domain_maps_to_range_midpoint() {
    let domain = DomainPolicy::ZeroToMax.resolve(Vec::<f64>::new());
    assert_eq!(domain, None);

    let scale = ScaleFactory::build(&ScaleSpec::linear(domain, (10.0, 200.0)))
        .expect("empty datasets are legal");
    assert_eq!(scale.map(42.0), 105.0);
    assert_eq!(scale.invert(42.0), None);
    assert!(scale.ticks(5).is_empty());
}

#[test]
fn domain_policies_follow_data() {
    let values = [4.0, f64::NAN, -2.0, 9.0];
    assert_eq!(DomainPolicy::Extent.resolve(values), Some((-2.0, 9.0)));
    assert_eq!(DomainPolicy::ZeroToMax.resolve(values), Some((0.0, 9.0)));
    assert_eq!(
        DomainPolicy::Fixed { min: 1.0, max: 2.0 }.resolve(values),
        Some((1.0, 2.0))
    );
}

#[test]
fn sqrt_scale_tracks_area() {
    let scale = ScaleFactory::build(&ScaleSpec::sqrt(Some((0.0, 90.0)), (0.0, 10.0)))
        .expect("valid scale");
    let quarter_area = scale.map(22.5);
    assert_relative_eq!(quarter_area, 5.0, epsilon = 1e-12);
    assert_relative_eq!(scale.map(90.0), 10.0, epsilon = 1e-12);
}

#[test]
fn clamp_pins_out_of_domain_values() {
    let scale = ScaleFactory::build(
        &ScaleSpec::linear(Some((0.0, 10.0)), (0.0, 100.0)).with_clamp(true),
    )
    .expect("valid scale");
    assert_eq!(scale.map(-5.0), 0.0);
    assert_eq!(scale.map(50.0), 100.0);
}

#[test]
fn non_finite_specs_are_rejected() {
    let err = ScaleFactory::build(&ScaleSpec::linear(Some((0.0, f64::NAN)), (0.0, 1.0)))
        .expect_err("nan domain");
    assert!(matches!(err, ChartError::InvalidData(_)));

    let err = ScaleFactory::build(&ScaleSpec::linear(None, (0.0, f64::INFINITY)))
        .expect_err("infinite range");
    assert!(matches!(err, ChartError::InvalidData(_)));
}

#[test]
fn ticks_use_nice_steps_and_labels() {
    let scale = ScaleFactory::build(&ScaleSpec::linear(Some((0.0, 90.0)), (320.0, 30.0)))
        .expect("valid scale");
    assert_eq!(scale.ticks(6), vec![0.0, 20.0, 40.0, 60.0, 80.0]);
    assert_eq!(scale.tick_label(40.0, 6), "40");

    let fine = ScaleFactory::build(&ScaleSpec::linear(Some((0.0, 1.0)), (0.0, 100.0)))
        .expect("valid scale");
    assert_eq!(fine.tick_label(0.4, 5), "0.4");
}

#[test]
fn band_scale_splits_range_evenly_without_padding() {
    let band = ScaleFactory::band(&BandSpec::indexed(5, (0.0, 500.0))).expect("valid band");
    assert_eq!(band.len(), 5);
    assert_relative_eq!(band.bandwidth(), 100.0);
    for index in 0..5 {
        let cell = band.band_at(index).expect("in range");
        assert_relative_eq!(cell.start, index as f64 * 100.0);
    }
    assert_eq!(band.band_at(5), None);
    assert_eq!(band.band(&Key::Index(2)).map(|cell| cell.start), Some(200.0));
    assert_eq!(band.band(&Key::Index(9)), None);
}

#[test]
fn band_scale_rounds_like_range_round() {
    let band = ScaleFactory::band(
        &BandSpec::indexed(3, (0.0, 900.0))
            .with_padding_inner(0.05)
            .with_round(true),
    )
    .expect("valid band");
    assert_eq!(band.step(), 305.0);
    assert_eq!(band.bandwidth(), 290.0);
    let starts: Vec<f64> = (0..3)
        .filter_map(|index| band.band_at(index).map(|cell| cell.start))
        .collect();
    assert_eq!(starts, vec![0.0, 305.0, 610.0]);
}

#[test]
fn band_scale_handles_reversed_and_empty_ranges() {
    let reversed = ScaleFactory::band(&BandSpec::indexed(2, (100.0, 0.0))).expect("valid band");
    assert_eq!(reversed.band_at(0).map(|cell| cell.start), Some(50.0));
    assert_eq!(reversed.band_at(1).map(|cell| cell.start), Some(0.0));

    let empty = ScaleFactory::band(&BandSpec::indexed(0, (0.0, 100.0))).expect("valid band");
    assert!(empty.is_empty());
    assert_eq!(empty.bandwidth(), 0.0);
}

#[test]
fn band_scale_rejects_full_padding() {
    let err = ScaleFactory::band(&BandSpec::indexed(3, (0.0, 1.0)).with_padding_inner(1.0))
        .expect_err("padding must stay below 1");
    assert!(matches!(err, ChartError::InvalidData(_)));
}

proptest! {
    #[test]
    fn continuous_scales_are_monotonic(
        d0 in -1_000.0f64..1_000.0,
        span in 0.001f64..1_000.0,
        r0 in -500.0f64..500.0,
        range_span in 0.001f64..2_000.0,
        a in -3_000.0f64..3_000.0,
        delta in 0.0f64..3_000.0,
        sqrt in any::<bool>()
    ) {
        let domain = Some((d0, d0 + span));
        let range = (r0, r0 + range_span);
        let spec = if sqrt {
            ScaleSpec::sqrt(domain, range)
        } else {
            ScaleSpec::linear(domain, range)
        };
        let scale = ScaleFactory::build(&spec).expect("valid scale");
        let b = a + delta;
        prop_assert!(scale.map(a) <= scale.map(b) + 1e-9);
    }

    #[test]
    fn band_cells_and_inner_gaps_cover_the_range(
        count in 1usize..60,
        padding in 0.0f64..0.95,
        start in -1_000.0f64..1_000.0,
        span in 1.0f64..5_000.0
    ) {
        let band = ScaleFactory::band(
            &BandSpec::indexed(count, (start, start + span)).with_padding_inner(padding),
        )
        .expect("valid band");
        let gap = band.step() - band.bandwidth();
        let covered = band.bandwidth() * count as f64 + gap * (count - 1) as f64;
        prop_assert!((covered - span).abs() <= 1e-6 * span.max(1.0));

        let last = band.band_at(count - 1).expect("last band");
        prop_assert!((last.start + last.bandwidth - (start + span)).abs() <= 1e-6 * span.max(1.0));
    }
}
