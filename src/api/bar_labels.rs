use crate::animation::{Delay, TransitionSpec};
use crate::api::{AttrBinding, BarScales, ChartConfig, ChartLayout, Encoding, PhaseTemplate};
use crate::core::{Key, KeyStrategy, Record, RecordShape};
use crate::error::ChartResult;
use crate::render::MarkKind;

/// Value labels riding on top of a [`BarChartLayout`](crate::api::BarChartLayout).
///
/// Shares the bar scales, keys and stagger so each label moves with its bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BarLabelLayout {
    shape: RecordShape,
    key_strategy: KeyStrategy,
    round: bool,
}

impl BarLabelLayout {
    #[must_use]
    pub fn keyed() -> Self {
        Self {
            shape: RecordShape::Keyed,
            key_strategy: KeyStrategy::Field,
            round: true,
        }
    }

    #[must_use]
    pub fn indexed() -> Self {
        Self {
            shape: RecordShape::Scalar,
            key_strategy: KeyStrategy::Index,
            round: true,
        }
    }

    #[must_use]
    pub fn with_round(mut self, round: bool) -> Self {
        self.round = round;
        self
    }
}

/// Label text for a bar value; integral values print without a fraction.
#[must_use]
pub fn label_text(value: f64) -> String {
    format!("{value}")
}

impl ChartLayout for BarLabelLayout {
    type Scales = BarScales;

    fn mark(&self) -> MarkKind {
        MarkKind::Text
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
        let half_band = scales.x.bandwidth() / 2.0;
        label_style(config)
            .computed("text", |record: &Record, _| label_text(record.value()))
            .computed("x", move |_, index| positions.x_of(index) + half_band)
            .bind("y", label_y(scales, config))
    }

    fn entering(&self, scales: &BarScales, config: &ChartConfig) -> Encoding {
        label_style(config)
            .constant("x", config.width)
            .bind("y", label_y(scales, config))
    }

    fn exiting(&self, scales: &BarScales, _config: &ChartConfig) -> Encoding {
        Encoding::new().constant("x", -scales.x.bandwidth())
    }

    fn update_phases(&self, scales: &BarScales, config: &ChartConfig) -> Vec<PhaseTemplate> {
        let targets = self.target(scales, config).only(&["text", "x", "y"]);
        vec![PhaseTemplate::new(
            TransitionSpec::new(config.transition_duration_ms)
                .with_delay(Delay::Spread(config.stagger_ms)),
            targets,
        )]
    }
}

fn label_style(config: &ChartConfig) -> Encoding {
    Encoding::new()
        .constant("font-size", config.label_size)
        .constant("fill", config.label_color)
        .constant("text-anchor", "middle")
}

/// Baseline of a label: just inside the top edge of its bar.
fn label_y(scales: &BarScales, config: &ChartConfig) -> AttrBinding {
    let height = scales.height;
    let (chart_height, offset) = (config.height, config.text_offset_y);
    AttrBinding::computed(move |record: &Record, _| {
        chart_height - height.map(record.value()) + offset
    })
}
