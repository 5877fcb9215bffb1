use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::animation::{Easing, Interpolator};
use crate::error::{ChartError, ChartResult};
use crate::render::{AttrValue, Attributes, ElementId};

type DelayFn = dyn Fn(usize, usize) -> f64;

/// Per-element start offset.
#[derive(Clone, Default)]
pub enum Delay {
    #[default]
    None,
    Constant(f64),
    /// `index * step_ms`.
    PerIndex(f64),
    /// `index / count * total_ms`: the whole cascade spans `total_ms`.
    Spread(f64),
    /// Arbitrary function of `(index, count)`.
    Custom(Rc<DelayFn>),
}

impl fmt::Debug for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Constant(ms) => f.debug_tuple("Constant").field(ms).finish(),
            Self::PerIndex(ms) => f.debug_tuple("PerIndex").field(ms).finish(),
            Self::Spread(ms) => f.debug_tuple("Spread").field(ms).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Delay {
    pub fn custom<F>(delay: F) -> Self
    where
        F: Fn(usize, usize) -> f64 + 'static,
    {
        Self::Custom(Rc::new(delay))
    }

    /// Delay in milliseconds for the `index`-th of `count` elements.
    ///
    /// Negative or non-finite results collapse to zero.
    #[must_use]
    pub fn delay_ms(&self, index: usize, count: usize) -> f64 {
        let delay = match self {
            Self::None => 0.0,
            Self::Constant(ms) => *ms,
            Self::PerIndex(step) => index as f64 * step,
            Self::Spread(total) if count > 0 => index as f64 / count as f64 * total,
            Self::Spread(_) => 0.0,
            Self::Custom(delay) => delay(index, count),
        };
        if delay.is_finite() { delay.max(0.0) } else { 0.0 }
    }
}

/// Timing of one animation phase, shared by every element it applies to.
#[derive(Debug, Clone)]
pub struct TransitionSpec {
    pub duration_ms: f64,
    pub delay: Delay,
    pub easing: Easing,
    /// Per-attribute overrides; attributes not listed use [`Interpolator::Auto`].
    pub interpolators: IndexMap<String, Interpolator>,
}

impl TransitionSpec {
    #[must_use]
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            delay: Delay::None,
            easing: Easing::default(),
            interpolators: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Delay) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn with_interpolator(mut self, name: impl Into<String>, interpolator: Interpolator) -> Self {
        self.interpolators.insert(name.into(), interpolator);
        self
    }

    /// Interpolates attribute `name` with its override or the automatic blend.
    #[must_use]
    pub fn interpolate(
        &self,
        name: &str,
        from: &AttrValue,
        to: &AttrValue,
        t: f64,
    ) -> Option<AttrValue> {
        match self.interpolators.get(name) {
            Some(interpolator) => interpolator.interpolate(from, to, t),
            None => Interpolator::Auto.interpolate(from, to, t),
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.duration_ms.is_finite() || self.duration_ms < 0.0 {
            return Err(ChartError::InvalidData(
                "transition duration must be finite and >= 0".to_owned(),
            ));
        }
        Ok(())
    }
}

/// One phase of one element: shared timing plus that element's targets.
#[derive(Debug, Clone)]
pub struct PhasePlan {
    pub spec: Rc<TransitionSpec>,
    /// Applied instantly when the phase starts.
    pub on_start: Attributes,
    /// Values reached when the phase completes.
    pub targets: Attributes,
}

impl PhasePlan {
    #[must_use]
    pub fn new(spec: Rc<TransitionSpec>, targets: Attributes) -> Self {
        Self {
            spec,
            on_start: Attributes::new(),
            targets,
        }
    }

    #[must_use]
    pub fn with_on_start(mut self, on_start: Attributes) -> Self {
        self.on_start = on_start;
        self
    }
}

/// What happens to the element after its last phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Commit,
    Remove,
}

/// Ordered phases for one element.
#[derive(Debug, Clone)]
pub struct AnimationRequest {
    pub element: ElementId,
    /// Stagger position and group size fed to each phase's [`Delay`].
    pub index: usize,
    pub count: usize,
    /// Committed values the first phase starts from.
    pub from: Attributes,
    pub phases: SmallVec<[PhasePlan; 2]>,
    pub on_complete: Completion,
}

impl AnimationRequest {
    #[must_use]
    pub fn new(element: ElementId, from: Attributes) -> Self {
        Self {
            element,
            index: 0,
            count: 1,
            from,
            phases: SmallVec::new(),
            on_complete: Completion::Commit,
        }
    }

    #[must_use]
    pub fn at(mut self, index: usize, count: usize) -> Self {
        self.index = index;
        self.count = count;
        self
    }

    #[must_use]
    pub fn then(mut self, phase: PhasePlan) -> Self {
        self.phases.push(phase);
        self
    }

    #[must_use]
    pub fn removing(mut self) -> Self {
        self.on_complete = Completion::Remove;
        self
    }
}
