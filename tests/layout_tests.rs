use approx::assert_relative_eq;
use chart_join::api::{
    BarLabelLayout, ChartConfig, CircleRowLayout, Encoding, RenderTarget, ScatterLayout,
};
use chart_join::core::{Key, KeyStrategy, Record};
use chart_join::render::{Color, MarkKind, MemorySurface, Surface};

fn scalars(values: &[f64]) -> Vec<Record> {
    values.iter().copied().map(Record::Scalar).collect()
}

#[test]
fn encodings_resolve_constants_and_computed_bindings() {
    let encoding = Encoding::new()
        .constant("fill", Color::BLACK)
        .computed("x", |record: &Record, index| record.value() + index as f64)
        .computed("label", |record: &Record, _| format!("v={}", record.value()));
    let attributes = encoding.resolve(&Record::Scalar(4.0), 2);
    assert_eq!(attributes.number("x"), Some(6.0));
    assert_eq!(attributes.color("fill"), Some(Color::BLACK));
    assert_eq!(attributes.text("label"), Some("v=4"));

    let narrowed = encoding
        .clone()
        .merged(&Encoding::new().constant("x", 1.0))
        .only(&["x"]);
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed.resolve(&Record::Scalar(4.0), 2).number("x"), Some(1.0));
    assert_eq!(encoding.names().collect::<Vec<_>>(), vec!["fill", "x", "label"]);
}

#[test]
fn labels_sit_centered_inside_their_bars() {
    let mut target = RenderTarget::new(
        BarLabelLayout::indexed(),
        MemorySurface::new(),
        ChartConfig::new(500.0, 100.0).with_band_padding(0.0),
    )
    .expect("valid config");
    target
        .initialize(&scalars(&[1.0, 2.0, 3.0, 4.0, 5.0]))
        .expect("initialize");

    let first = target.element(&Key::Index(0)).expect("label");
    let node = target.surface().node(first.id).expect("on surface");
    assert_eq!(node.mark, MarkKind::Text);
    assert_eq!(node.attributes.text("text"), Some("1"));
    assert_eq!(node.attributes.text("text-anchor"), Some("middle"));
    assert_eq!(node.attributes.number("font-size"), Some(11.0));
    assert_eq!(node.attributes.color("fill"), Some(Color::WHITE));
    assert_relative_eq!(node.attributes.number("x").expect("x"), 50.0);
    assert_relative_eq!(node.attributes.number("y").expect("y"), 94.0);
}

#[test]
fn labels_switch_text_when_values_change() {
    let mut target = RenderTarget::new(
        BarLabelLayout::indexed(),
        MemorySurface::new(),
        ChartConfig::new(500.0, 100.0).with_band_padding(0.0),
    )
    .expect("valid config");
    target.initialize(&scalars(&[1.0, 2.0])).expect("initialize");
    target.update(&scalars(&[2.5, 2.0])).expect("update");
    target.tick(5000.0);

    let first = target.element(&Key::Index(0)).expect("label");
    assert_eq!(
        target
            .surface()
            .committed(first.id, "text")
            .and_then(|value| value.as_text().map(str::to_owned)),
        Some("2.5".to_owned())
    );
}

#[test]
fn circle_row_spaces_circles_by_index() {
    let mut target = RenderTarget::new(
        CircleRowLayout::new(),
        MemorySurface::new(),
        ChartConfig::new(720.0, 120.0),
    )
    .expect("valid config");
    target.initialize(&scalars(&[5.0, 10.0, 15.0])).expect("initialize");

    let centers: Vec<f64> = target
        .surface()
        .nodes()
        .filter_map(|node| node.attributes.number("cx"))
        .collect();
    assert_eq!(centers, vec![25.0, 75.0, 125.0]);

    let id = target.element(&Key::Index(2)).expect("circle").id;
    let node = target.surface().node(id).expect("on surface");
    assert_eq!(node.mark, MarkKind::Circle);
    assert_eq!(node.attributes.number("cy"), Some(60.0));
    assert_eq!(node.attributes.number("r"), Some(15.0));
    assert_eq!(node.attributes.number("stroke-width"), Some(7.5));
    assert_eq!(node.attributes.color("stroke"), Some(Color::from_rgb8(0x00, 0x99, 0xff)));

    target.update(&scalars(&[5.0, 10.0])).expect("update");
    target.tick(250.0);
    let shrinking = target
        .surface()
        .committed(id, "r")
        .and_then(|value| value.as_number())
        .expect("still present");
    assert!(shrinking < 15.0 && shrinking > 0.0);
    let done = target.tick(600.0);
    assert_eq!(done.removed, vec![Key::Index(2)]);
}

#[test]
fn scatter_updates_highlight_then_settle() {
    let config = ChartConfig::default();
    let mut target = RenderTarget::new(
        ScatterLayout::new().with_key_strategy(KeyStrategy::Index),
        MemorySurface::new(),
        config,
    )
    .expect("valid config");
    target.initialize(&[Record::Pair(10.0, 20.0)]).expect("initialize");
    let id = target.element(&Key::Index(0)).expect("point").id;
    let fill = |target: &RenderTarget<ScatterLayout, MemorySurface>| {
        target
            .surface()
            .committed(id, "fill")
            .and_then(|value| value.as_color())
    };
    let radius = |target: &RenderTarget<ScatterLayout, MemorySurface>| {
        target
            .surface()
            .committed(id, "r")
            .and_then(|value| value.as_number())
    };
    assert_eq!(fill(&target), Some(Color::BLACK));
    assert_eq!(radius(&target), Some(2.0));

    target.update(&[Record::Pair(30.0, 40.0)]).expect("update");
    target.tick(0.0);
    assert_eq!(fill(&target), Some(config.fill_color));
    assert_eq!(radius(&target), Some(3.0));

    target.tick(1000.0);
    assert_eq!(fill(&target), Some(config.fill_color));
    let node = target.surface().node(id).expect("on surface");
    assert_relative_eq!(node.attributes.number("cx").expect("cx"), 840.0);
    assert_relative_eq!(node.attributes.number("cy").expect("cy"), 30.0);

    target.tick(2000.0);
    assert_eq!(fill(&target), Some(Color::BLACK));
    assert_eq!(radius(&target), Some(2.0));
}

#[test]
fn scatter_area_radius_follows_sqrt_scale() {
    let mut target = RenderTarget::new(
        ScatterLayout::new().with_area_radius(true),
        MemorySurface::new(),
        ChartConfig::default(),
    )
    .expect("valid config");
    target
        .initialize(&[Record::Pair(10.0, 22.5), Record::Pair(20.0, 90.0)])
        .expect("initialize");

    let radius = |key: Key| {
        let id = target.element(&key).expect("point").id;
        target
            .surface()
            .committed(id, "r")
            .and_then(|value| value.as_number())
            .expect("radius")
    };
    assert_relative_eq!(radius(Key::pair(10.0, 22.5)), 5.0, epsilon = 1e-12);
    assert_relative_eq!(radius(Key::pair(20.0, 90.0)), 10.0, epsilon = 1e-12);
}

#[test]
fn scatter_exits_slide_to_the_right_edge() {
    let mut target = RenderTarget::new(ScatterLayout::new(), MemorySurface::new(), ChartConfig::default())
        .expect("valid config");
    target
        .initialize(&[Record::Pair(10.0, 20.0), Record::Pair(50.0, 60.0)])
        .expect("initialize");
    let leaving = target.element(&Key::pair(50.0, 60.0)).expect("point").id;

    let summary = target.update(&[Record::Pair(10.0, 20.0)]).expect("update");
    assert_eq!(summary.exited, 1);
    target.tick(999.0);
    let cx = target
        .surface()
        .committed(leaving, "cx")
        .and_then(|value| value.as_number())
        .expect("still present");
    assert!(cx > 800.0 && cx < 870.0);

    let done = target.tick(1000.0);
    assert_eq!(done.removed, vec![Key::pair(50.0, 60.0)]);
}
