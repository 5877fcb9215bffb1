use chart_join::core::{ScaleFactory, TimeScaleSpec, format_time};
use chrono::{TimeZone, Utc};

fn day(day: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0)
        .single()
        .expect("valid date")
}

#[test]
fn time_scale_maps_and_inverts_instants() {
    let scale = ScaleFactory::time(&TimeScaleSpec::new(Some((day(1), day(11))), (0.0, 1000.0)))
        .expect("valid time scale");
    assert_eq!(scale.map(day(1)), 0.0);
    assert_eq!(scale.map(day(6)), 500.0);
    assert_eq!(scale.invert(500.0).expect("inside domain"), day(6));
}

#[test]
fn daily_ticks_use_month_day_labels() {
    let scale = ScaleFactory::time(&TimeScaleSpec::new(Some((day(1), day(8))), (0.0, 700.0)))
        .expect("valid time scale");
    let ticks = scale.ticks(7);
    assert_eq!(ticks.len(), 8);
    assert_eq!(ticks.first().copied(), Some(day(1)));
    assert_eq!(ticks.last().copied(), Some(day(8)));
    assert_eq!(scale.tick_label(day(2), 7), "Jan  2");
}

#[test]
fn domain_from_instants_spans_their_extent() {
    let spec = TimeScaleSpec::from_instants([day(5), day(2), day(9)], (0.0, 100.0));
    assert_eq!(spec.domain, Some((day(2), day(9))));

    let empty = TimeScaleSpec::from_instants(Vec::new(), (0.0, 100.0));
    let scale = ScaleFactory::time(&empty).expect("empty domain is legal");
    assert_eq!(scale.map(day(3)), 50.0);
    assert!(scale.invert(10.0).is_err());
    assert!(scale.ticks(5).is_empty());
}

#[test]
fn monthly_ticks_align_to_calendar_months() {
    let start = Utc
        .with_ymd_and_hms(2024, 1, 15, 0, 0, 0)
        .single()
        .expect("valid date");
    let end = Utc
        .with_ymd_and_hms(2024, 7, 15, 0, 0, 0)
        .single()
        .expect("valid date");
    let scale = ScaleFactory::time(&TimeScaleSpec::new(Some((start, end)), (0.0, 600.0)))
        .expect("valid time scale");
    let labels: Vec<String> = scale
        .ticks(7)
        .into_iter()
        .map(|tick| scale.tick_label(tick, 7))
        .collect();
    assert_eq!(labels, vec!["February", "March", "April", "May", "June", "July"]);
}

#[test]
fn format_time_accepts_strftime_patterns() {
    assert_eq!(format_time(day(9), "%b %e"), "Jan  9");
    assert_eq!(format_time(day(9), "%Y-%m-%d"), "2024-01-09");
}

#[test]
fn time_scale_specs_round_trip_through_json() {
    let spec = TimeScaleSpec::new(Some((day(1), day(8))), (0.0, 700.0));
    let text = serde_json::to_string(&spec).expect("serialize");
    assert!(text.contains("2024-01-01T00:00:00Z"));
    let restored: TimeScaleSpec = serde_json::from_str(&text).expect("deserialize");
    assert_eq!(restored, spec);
}
