use crate::animation::{Delay, TransitionSpec};
use crate::api::{AxisModel, AxisOrientation, ChartConfig, ChartLayout, Encoding, PhaseTemplate};
use crate::core::{
    BandScale, BandSpec, ContinuousScale, DomainPolicy, Key, KeyStrategy, Record, RecordShape,
    ScaleFactory, ScaleSpec,
};
use crate::error::ChartResult;
use crate::render::{Color, MarkKind};

/// Scales shared by bars and their labels.
#[derive(Debug, Clone, PartialEq)]
pub struct BarScales {
    /// One band per record index.
    pub x: BandScale,
    /// Bar height for a value, over `[0, max]`.
    pub height: ContinuousScale,
}

impl BarScales {
    pub fn build(records: &[Record], config: &ChartConfig, round: bool) -> ChartResult<Self> {
        let x = ScaleFactory::band(
            &BandSpec::indexed(records.len(), (0.0, config.width))
                .with_padding_inner(config.band_padding)
                .with_round(round),
        )?;
        let domain = DomainPolicy::ZeroToMax.resolve(records.iter().map(|record| record.value()));
        let height = ScaleFactory::build(&ScaleSpec::linear(
            domain,
            (config.bar_baseline_px, config.height),
        ))?;
        Ok(Self { x, height })
    }

    /// Left edge of the band at `index`.
    #[must_use]
    pub fn x_of(&self, index: usize) -> f64 {
        self.x.band_at(index).map_or(self.x.range().0, |band| band.start)
    }

    #[must_use]
    pub fn bar_height(&self, value: f64) -> f64 {
        self.height.map(value)
    }
}

/// Value-driven bar color: red channel `round(value * 10)`, saturated at 255.
#[must_use]
pub fn bar_fill(value: f64) -> Color {
    let red = (value * 10.0).round().clamp(0.0, 255.0) as u8;
    Color::from_rgb8(red, 22, 88)
}

/// Vertical bars, one per record, laid out by record index.
///
/// Bars enter from the right edge, slide into their band with an index
/// proportional stagger and leave past the left edge.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChartLayout {
    shape: RecordShape,
    key_strategy: KeyStrategy,
    round: bool,
}

impl BarChartLayout {
    /// `{key, value}` records identified by their `key` field.
    #[must_use]
    pub fn keyed() -> Self {
        Self {
            shape: RecordShape::Keyed,
            key_strategy: KeyStrategy::Field,
            round: true,
        }
    }

    /// Plain numbers identified by position.
    #[must_use]
    pub fn indexed() -> Self {
        Self {
            shape: RecordShape::Scalar,
            key_strategy: KeyStrategy::Index,
            round: true,
        }
    }

    /// Toggles pixel rounding of band positions and widths.
    #[must_use]
    pub fn with_round(mut self, round: bool) -> Self {
        self.round = round;
        self
    }
}

impl ChartLayout for BarChartLayout {
    type Scales = BarScales;

    fn mark(&self) -> MarkKind {
        MarkKind::Rect
    }

    fn shape(&self) -> RecordShape {
        self.shape
    }

    fn key(&self, record: &Record, index: usize) -> Key {
        self.key_strategy.key_of(record, index)
    }

    fn keys(&self, records: &[Record]) -> Vec<Key> {
        self.key_strategy.keys(records)
    }

    fn scales(&self, records: &[Record], config: &ChartConfig) -> ChartResult<BarScales> {
        BarScales::build(records, config, self.round)
    }

    fn target(&self, scales: &BarScales, config: &ChartConfig) -> Encoding {
        let positions = scales.clone();
        bar_body(scales, config).computed("x", move |_, index| positions.x_of(index))
    }

    fn entering(&self, scales: &BarScales, config: &ChartConfig) -> Encoding {
        bar_body(scales, config).constant("x", config.width)
    }

    fn exiting(&self, scales: &BarScales, _config: &ChartConfig) -> Encoding {
        Encoding::new().constant("x", -scales.x.bandwidth())
    }

    fn update_phases(&self, scales: &BarScales, config: &ChartConfig) -> Vec<PhaseTemplate> {
        vec![PhaseTemplate::new(
            TransitionSpec::new(config.transition_duration_ms)
                .with_delay(Delay::Spread(config.stagger_ms)),
            self.target(scales, config),
        )]
    }

    fn axes(&self, scales: &BarScales, config: &ChartConfig) -> Vec<AxisModel> {
        vec![AxisModel::band(AxisOrientation::Bottom, &scales.x, config.height)]
    }
}

fn bar_body(scales: &BarScales, config: &ChartConfig) -> Encoding {
    let height = scales.height;
    let chart_height = config.height;
    Encoding::new()
        .computed("y", move |record: &Record, _| {
            chart_height - height.map(record.value())
        })
        .constant("width", scales.x.bandwidth())
        .computed("height", move |record: &Record, _| height.map(record.value()))
        .computed("fill", |record: &Record, _| bar_fill(record.value()))
}
