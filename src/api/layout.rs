use std::rc::Rc;

use crate::animation::{PhasePlan, TransitionSpec};
use crate::api::{AxisModel, ChartConfig, Encoding};
use crate::core::{Key, Record, RecordShape};
use crate::error::ChartResult;
use crate::render::MarkKind;

/// Timing plus attribute bindings for one animation phase of every element.
#[derive(Debug, Clone)]
pub struct PhaseTemplate {
    pub spec: Rc<TransitionSpec>,
    pub on_start: Encoding,
    pub targets: Encoding,
}

impl PhaseTemplate {
    #[must_use]
    pub fn new(spec: TransitionSpec, targets: Encoding) -> Self {
        Self {
            spec: Rc::new(spec),
            on_start: Encoding::new(),
            targets,
        }
    }

    #[must_use]
    pub fn with_on_start(mut self, on_start: Encoding) -> Self {
        self.on_start = on_start;
        self
    }

    #[must_use]
    pub fn resolve(&self, record: &Record, index: usize) -> PhasePlan {
        PhasePlan::new(Rc::clone(&self.spec), self.targets.resolve(record, index))
            .with_on_start(self.on_start.resolve(record, index))
    }
}

/// Binds one record shape to one mark type.
///
/// Layouts are the only chart-specific piece of a render target: they rebuild
/// scales from each snapshot and describe attributes as encodings over those
/// scales. Joining, timing and element ownership stay in
/// [`RenderTarget`](crate::api::RenderTarget).
pub trait ChartLayout {
    type Scales;

    fn mark(&self) -> MarkKind;

    fn shape(&self) -> RecordShape;

    fn key(&self, record: &Record, index: usize) -> Key;

    /// Keys for a whole snapshot, in record order.
    fn keys(&self, records: &[Record]) -> Vec<Key> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| self.key(record, index))
            .collect()
    }

    fn scales(&self, records: &[Record], config: &ChartConfig) -> ChartResult<Self::Scales>;

    /// Attributes of an element at rest.
    fn target(&self, scales: &Self::Scales, config: &ChartConfig) -> Encoding;

    /// Starting attributes of elements entering on a redraw.
    fn entering(&self, scales: &Self::Scales, config: &ChartConfig) -> Encoding {
        self.target(scales, config)
    }

    /// Attributes exiting elements animate towards before removal.
    fn exiting(&self, scales: &Self::Scales, config: &ChartConfig) -> Encoding;

    /// Phases moving entering and updated elements to their targets.
    fn update_phases(&self, scales: &Self::Scales, config: &ChartConfig) -> Vec<PhaseTemplate> {
        vec![PhaseTemplate::new(
            TransitionSpec::new(config.transition_duration_ms),
            self.target(scales, config),
        )]
    }

    fn exit_transition(&self, config: &ChartConfig) -> TransitionSpec {
        TransitionSpec::new(config.transition_duration_ms)
    }

    /// Axes to hand to the axis renderer after each scale rebuild.
    fn axes(&self, _scales: &Self::Scales, _config: &ChartConfig) -> Vec<AxisModel> {
        Vec::new()
    }
}
