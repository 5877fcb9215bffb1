use crate::api::{ChartConfig, ChartLayout, Encoding};
use crate::core::{Key, Record, RecordShape};
use crate::error::ChartResult;
use crate::render::{Color, MarkKind};

/// A single row of circles, one per number, sized by value.
///
/// The value is drawn as-is (radius in pixels), so no scales are built.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleRowLayout {
    pub spacing: f64,
    pub offset: f64,
    pub fill: Color,
    pub stroke: Color,
}

impl Default for CircleRowLayout {
    fn default() -> Self {
        Self {
            spacing: 50.0,
            offset: 25.0,
            fill: Color::from_rgb8(0x22, 0x00, 0xff),
            stroke: Color::from_rgb8(0x00, 0x99, 0xff),
        }
    }
}

impl CircleRowLayout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_spacing(mut self, spacing: f64, offset: f64) -> Self {
        self.spacing = spacing;
        self.offset = offset;
        self
    }
}

impl ChartLayout for CircleRowLayout {
    type Scales = ();

    fn mark(&self) -> MarkKind {
        MarkKind::Circle
    }

    fn shape(&self) -> RecordShape {
        RecordShape::Scalar
    }

    fn key(&self, _record: &Record, index: usize) -> Key {
        Key::Index(index)
    }

    fn scales(&self, _records: &[Record], _config: &ChartConfig) -> ChartResult<()> {
        Ok(())
    }

    fn target(&self, _scales: &(), config: &ChartConfig) -> Encoding {
        let (spacing, offset) = (self.spacing, self.offset);
        Encoding::new()
            .computed("cx", move |_, index| index as f64 * spacing + offset)
            .constant("cy", config.height / 2.0)
            .computed("r", |record: &Record, _| record.value())
            .constant("fill", self.fill)
            .constant("stroke", self.stroke)
            .computed("stroke-width", |record: &Record, _| record.value() / 2.0)
    }

    fn exiting(&self, _scales: &(), _config: &ChartConfig) -> Encoding {
        Encoding::new().constant("r", 0.0)
    }
}
