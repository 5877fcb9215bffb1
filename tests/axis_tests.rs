use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use chart_join::api::{
    AxisModel, AxisOrientation, AxisRenderer, BarChartLayout, ChartConfig, RenderTarget,
    ScatterLayout, TargetState,
};
use chart_join::core::{Record, ScaleFactory, TimeScaleSpec};
use chart_join::render::MemorySurface;
use chart_join::{ChartError, ChartResult};
use chrono::{TimeZone, Utc};

struct RecordingAxes {
    drawn: Rc<RefCell<Vec<AxisModel>>>,
    fail: bool,
}

impl AxisRenderer for RecordingAxes {
    fn render_axis(&mut self, axis: &AxisModel) -> ChartResult<()> {
        self.drawn.borrow_mut().push(axis.clone());
        if self.fail {
            return Err(ChartError::InvalidData("axis layer unavailable".to_owned()));
        }
        Ok(())
    }
}

fn scatter_points() -> Vec<Record> {
    vec![
        Record::Pair(480.0, 90.0),
        Record::Pair(120.0, 45.0),
        Record::Pair(10.0, 20.0),
    ]
}

#[test]
fn scatter_axes_follow_padding_and_nice_ticks() {
    let mut target = RenderTarget::new(ScatterLayout::new(), MemorySurface::new(), ChartConfig::default())
        .expect("valid config");
    target.initialize(&scatter_points()).expect("initialize");

    let axes = target.axes();
    assert_eq!(axes.len(), 2);

    let bottom = &axes[0];
    assert_eq!(bottom.orientation, AxisOrientation::Bottom);
    assert_eq!(bottom.offset, 320.0);
    assert_eq!(bottom.range, (30.0, 840.0));
    assert_eq!(bottom.ticks.len(), 25);
    assert_eq!(bottom.ticks[0].position, 30.0);
    assert_eq!(bottom.ticks[1].value, 20.0);
    assert_eq!(bottom.ticks[1].label, "20");
    assert_eq!(bottom.ticks[24].position, 840.0);

    let left = &axes[1];
    assert_eq!(left.orientation, AxisOrientation::Left);
    assert_eq!(left.offset, 30.0);
    let values: Vec<f64> = left.ticks.iter().map(|tick| tick.value).collect();
    assert_eq!(values, vec![0.0, 20.0, 40.0, 60.0, 80.0]);
    assert_eq!(left.ticks[0].position, 320.0);
}

#[test]
fn axis_renderer_runs_after_every_scale_rebuild() {
    let drawn = Rc::new(RefCell::new(Vec::new()));
    let renderer = RecordingAxes {
        drawn: Rc::clone(&drawn),
        fail: false,
    };
    let mut target = RenderTarget::new(ScatterLayout::new(), MemorySurface::new(), ChartConfig::default())
        .expect("valid config")
        .with_axis_renderer(Box::new(renderer));

    target.initialize(&scatter_points()).expect("initialize");
    target
        .update(&[Record::Pair(240.0, 45.0)])
        .expect("update");

    let drawn = drawn.borrow();
    assert_eq!(drawn.len(), 4);
    let last_bottom = &drawn[2];
    assert_eq!(last_bottom.orientation, AxisOrientation::Bottom);
    assert_eq!(last_bottom.ticks.last().map(|tick| tick.value), Some(240.0));
}

#[test]
fn axis_renderer_failures_do_not_block_redraws() {
    let drawn = Rc::new(RefCell::new(Vec::new()));
    let mut target = RenderTarget::new(ScatterLayout::new(), MemorySurface::new(), ChartConfig::default())
        .expect("valid config");
    target.set_axis_renderer(Some(Box::new(RecordingAxes {
        drawn: Rc::clone(&drawn),
        fail: true,
    })));

    target.initialize(&scatter_points()).expect("axis errors are not fatal");
    assert_eq!(drawn.borrow().len(), 2);
    assert_eq!(target.surface().len(), 3);
}

#[test]
fn bar_axis_centers_one_tick_per_band() {
    let mut target = RenderTarget::new(
        BarChartLayout::indexed(),
        MemorySurface::new(),
        ChartConfig::new(500.0, 100.0).with_band_padding(0.0),
    )
    .expect("valid config");
    let records: Vec<Record> = (1..=5).map(|value| Record::Scalar(f64::from(value))).collect();
    target.initialize(&records).expect("initialize");

    let axis = &target.axes()[0];
    assert_eq!(axis.orientation, AxisOrientation::Bottom);
    assert_eq!(axis.offset, 100.0);
    let positions: Vec<f64> = axis.ticks.iter().map(|tick| tick.position).collect();
    assert_eq!(positions, vec![50.0, 150.0, 250.0, 350.0, 450.0]);
    assert_eq!(axis.ticks[2].label, "#2");
}

#[test]
fn time_axis_reports_epoch_millisecond_values() {
    let start = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("valid date");
    let end = Utc
        .with_ymd_and_hms(2024, 1, 8, 0, 0, 0)
        .single()
        .expect("valid date");
    let scale = ScaleFactory::time(&TimeScaleSpec::new(Some((start, end)), (0.0, 700.0)))
        .expect("valid time scale");

    let axis = AxisModel::time(AxisOrientation::Bottom, scale, 7, 320.0);
    assert_eq!(axis.ticks.len(), 8);
    assert_eq!(axis.ticks[0].value, 1_704_067_200_000.0);
    assert_eq!(axis.ticks[0].position, 0.0);
    assert_relative_eq!(axis.ticks[1].position, 100.0, epsilon = 1e-9);
    assert_eq!(axis.ticks[1].label, "Jan  2");
}

#[test]
fn oversized_tick_hints_produce_empty_axes() {
    let config = ChartConfig::default().with_ticks(usize::MAX, usize::MAX);
    let mut target = RenderTarget::new(ScatterLayout::new(), MemorySurface::new(), config)
        .expect("valid config");
    target.initialize(&scatter_points()).expect("initialize");

    let axes = target.axes();
    assert_eq!(axes.len(), 2);
    assert!(axes.iter().all(|axis| axis.ticks.is_empty()));
    assert!(target.scales().expect("scales built").x.ticks(usize::MAX).is_empty());
}

#[test]
fn rejected_first_draw_publishes_no_axes() {
    let drawn = Rc::new(RefCell::new(Vec::new()));
    let mut target = RenderTarget::new(
        ScatterLayout::new().with_phase_ms(-1.0),
        MemorySurface::new(),
        ChartConfig::default(),
    )
    .expect("valid config")
    .with_axis_renderer(Box::new(RecordingAxes {
        drawn: Rc::clone(&drawn),
        fail: false,
    }));

    let err = target.initialize(&scatter_points()).unwrap_err();
    assert!(matches!(err, ChartError::InvalidData(_)));
    assert!(target.axes().is_empty());
    assert!(drawn.borrow().is_empty());
    assert_eq!(target.state(), TargetState::Uninitialized);
    assert!(target.surface().is_empty());
}
