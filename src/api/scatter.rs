use crate::animation::TransitionSpec;
use crate::api::{AxisModel, AxisOrientation, ChartConfig, ChartLayout, Encoding, PhaseTemplate};
use crate::core::{
    ContinuousScale, DomainPolicy, Key, KeyStrategy, Record, RecordShape, ScaleFactory, ScaleSpec,
};
use crate::error::ChartResult;
use crate::render::{Color, MarkKind};

const DEFAULT_PHASE_MS: f64 = 1000.0;
const RESTING_RADIUS: f64 = 2.0;
const HIGHLIGHT_RADIUS: f64 = 3.0;
const MAX_AREA_RADIUS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterScales {
    pub x: ContinuousScale,
    pub y: ContinuousScale,
    /// Square-root radius scale over the `y` values.
    pub area: ContinuousScale,
}

/// Points of `(x, y)` pairs on padded linear axes.
///
/// Updates run in two phases per point: a highlighted move to the new
/// position, then a recolor back to the resting style.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterLayout {
    key_strategy: KeyStrategy,
    area_radius: bool,
    phase_ms: f64,
}

impl Default for ScatterLayout {
    fn default() -> Self {
        Self {
            key_strategy: KeyStrategy::Identity,
            area_radius: false,
            phase_ms: DEFAULT_PHASE_MS,
        }
    }
}

impl ScatterLayout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_key_strategy(mut self, key_strategy: KeyStrategy) -> Self {
        self.key_strategy = key_strategy;
        self
    }

    /// Sizes points by `y` through the area scale instead of a fixed radius.
    #[must_use]
    pub fn with_area_radius(mut self, enabled: bool) -> Self {
        self.area_radius = enabled;
        self
    }

    #[must_use]
    pub fn with_phase_ms(mut self, phase_ms: f64) -> Self {
        self.phase_ms = phase_ms;
        self
    }

    fn resting(&self, scales: &ScatterScales) -> Encoding {
        let encoding = Encoding::new().constant("fill", Color::BLACK);
        if self.area_radius {
            let area = scales.area;
            encoding.computed("r", move |record: &Record, _| area.map(record.value()))
        } else {
            encoding.constant("r", RESTING_RADIUS)
        }
    }
}

fn position(scales: &ScatterScales) -> Encoding {
    let (x, y) = (scales.x, scales.y);
    Encoding::new()
        .computed("cx", move |record: &Record, _| x.map(record.x().unwrap_or_default()))
        .computed("cy", move |record: &Record, _| y.map(record.value()))
}

impl ChartLayout for ScatterLayout {
    type Scales = ScatterScales;

    fn mark(&self) -> MarkKind {
        MarkKind::Circle
    }

    fn shape(&self) -> RecordShape {
        RecordShape::Pair
    }

    fn key(&self, record: &Record, index: usize) -> Key {
        self.key_strategy.key_of(record, index)
    }

    fn keys(&self, records: &[Record]) -> Vec<Key> {
        self.key_strategy.keys(records)
    }

    fn scales(&self, records: &[Record], config: &ChartConfig) -> ChartResult<ScatterScales> {
        let x_domain = DomainPolicy::ZeroToMax.resolve(records.iter().filter_map(|record| record.x()));
        let y_domain = DomainPolicy::ZeroToMax.resolve(records.iter().map(|record| record.value()));

        let x = ScaleFactory::build(&ScaleSpec::linear(
            x_domain,
            (config.x_padding, config.width - config.x_padding * 2.0),
        ))?;
        let y = ScaleFactory::build(&ScaleSpec::linear(
            y_domain,
            (config.height - config.y_padding, config.y_padding),
        ))?;
        let area = ScaleFactory::build(&ScaleSpec::sqrt(y_domain, (0.0, MAX_AREA_RADIUS)))?;
        Ok(ScatterScales { x, y, area })
    }

    fn target(&self, scales: &ScatterScales, _config: &ChartConfig) -> Encoding {
        position(scales).merged(&self.resting(scales))
    }

    fn entering(&self, scales: &ScatterScales, _config: &ChartConfig) -> Encoding {
        position(scales)
            .constant("fill", Color::BLACK)
            .constant("r", 0.0)
    }

    fn exiting(&self, _scales: &ScatterScales, config: &ChartConfig) -> Encoding {
        Encoding::new().constant("cx", config.width - config.x_padding)
    }

    fn update_phases(&self, scales: &ScatterScales, config: &ChartConfig) -> Vec<PhaseTemplate> {
        let highlight = Encoding::new()
            .constant("fill", config.fill_color)
            .constant("r", HIGHLIGHT_RADIUS);
        vec![
            PhaseTemplate::new(TransitionSpec::new(self.phase_ms), position(scales))
                .with_on_start(highlight),
            PhaseTemplate::new(TransitionSpec::new(self.phase_ms), self.resting(scales)),
        ]
    }

    fn exit_transition(&self, _config: &ChartConfig) -> TransitionSpec {
        TransitionSpec::new(self.phase_ms)
    }

    fn axes(&self, scales: &ScatterScales, config: &ChartConfig) -> Vec<AxisModel> {
        vec![
            AxisModel::linear(
                AxisOrientation::Bottom,
                scales.x,
                config.x_ticks,
                config.height - config.y_padding,
            ),
            AxisModel::linear(
                AxisOrientation::Left,
                scales.y,
                config.y_ticks,
                config.x_padding,
            ),
        ]
    }
}
