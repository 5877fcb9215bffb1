use serde::{Deserialize, Serialize};

use crate::core::band_scale::{BandScale, BandSpec};
use crate::core::ticks::{format_tick, nice_ticks, tick_step};
use crate::core::time_scale::{TimeScale, TimeScaleSpec};
use crate::error::{ChartError, ChartResult};

/// Shape of the normalized-to-range transfer function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContinuousKind {
    Linear,
    /// Square-root transfer so that an encoded area, not a radius, tracks the value.
    Sqrt,
}

/// How a scale domain is derived from the dataset on each redraw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DomainPolicy {
    /// `[0, max(values)]`.
    ZeroToMax,
    /// `[min(values), max(values)]`.
    Extent,
    /// Pinned domain, ignores data.
    Fixed { min: f64, max: f64 },
}

impl DomainPolicy {
    /// Resolves the domain for `values`. Non-finite values are ignored.
    ///
    /// Returns `None` when no finite value is available and the policy is
    /// data-driven.
    pub fn resolve<I>(self, values: I) -> Option<(f64, f64)>
    where
        I: IntoIterator<Item = f64>,
    {
        match self {
            Self::Fixed { min, max } => Some((min, max)),
            Self::Extent => extent(values),
            Self::ZeroToMax => extent(values).map(|(_, max)| (0.0, max)),
        }
    }
}

/// Minimum and maximum of the finite values, if any.
pub fn extent<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|value| value.is_finite())
        .fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
}

/// Declarative description of a continuous scale.
///
/// `domain: None` models an empty dataset; such scales map everything to the
/// midpoint of the range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleSpec {
    pub kind: ContinuousKind,
    pub domain: Option<(f64, f64)>,
    pub range: (f64, f64),
    #[serde(default)]
    pub clamp: bool,
}

impl ScaleSpec {
    #[must_use]
    pub fn linear(domain: Option<(f64, f64)>, range: (f64, f64)) -> Self {
        Self {
            kind: ContinuousKind::Linear,
            domain,
            range,
            clamp: false,
        }
    }

    #[must_use]
    pub fn sqrt(domain: Option<(f64, f64)>, range: (f64, f64)) -> Self {
        Self {
            kind: ContinuousKind::Sqrt,
            domain,
            range,
            clamp: false,
        }
    }

    #[must_use]
    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    fn validate(self) -> ChartResult<Self> {
        if !self.range.0.is_finite() || !self.range.1.is_finite() {
            return Err(ChartError::InvalidData(
                "scale range must be finite".to_owned(),
            ));
        }
        if let Some((min, max)) = self.domain {
            if !min.is_finite() || !max.is_finite() {
                return Err(ChartError::InvalidData(
                    "scale domain must be finite".to_owned(),
                ));
            }
        }
        Ok(self)
    }
}

/// Builds pure mapping functions from scale specs.
pub struct ScaleFactory;

impl ScaleFactory {
    pub fn build(spec: &ScaleSpec) -> ChartResult<ContinuousScale> {
        let spec = spec.validate()?;
        Ok(ContinuousScale {
            kind: spec.kind,
            domain: spec.domain,
            range: spec.range,
            clamp: spec.clamp,
        })
    }

    pub fn band(spec: &BandSpec) -> ChartResult<BandScale> {
        BandScale::new(spec)
    }

    pub fn time(spec: &TimeScaleSpec) -> ChartResult<TimeScale> {
        TimeScale::new(spec)
    }
}

/// Linear or square-root mapping from a numeric domain into pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContinuousScale {
    kind: ContinuousKind,
    domain: Option<(f64, f64)>,
    range: (f64, f64),
    clamp: bool,
}

impl ContinuousScale {
    #[must_use]
    pub fn kind(self) -> ContinuousKind {
        self.kind
    }

    #[must_use]
    pub fn domain(self) -> Option<(f64, f64)> {
        self.domain
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        self.range
    }

    /// Maps a domain value into the range.
    ///
    /// A degenerate domain (`min == max`) maps everything to `range.0`; an
    /// empty domain maps everything to the range midpoint.
    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        let (r0, r1) = self.range;
        let Some((d0, d1)) = self.domain else {
            return (r0 + r1) / 2.0;
        };
        let span = d1 - d0;
        if span == 0.0 {
            return r0;
        }

        let mut normalized = (value - d0) / span;
        if self.clamp {
            normalized = normalized.clamp(0.0, 1.0);
        }
        let shaped = match self.kind {
            ContinuousKind::Linear => normalized,
            ContinuousKind::Sqrt => normalized.signum() * normalized.abs().sqrt(),
        };
        r0 + (r1 - r0) * shaped
    }

    /// Maps a range value back into the domain.
    #[must_use]
    pub fn invert(self, pixel: f64) -> Option<f64> {
        let (d0, d1) = self.domain?;
        let (r0, r1) = self.range;
        let range_span = r1 - r0;
        if d1 == d0 || range_span == 0.0 {
            return Some(d0);
        }

        let mut shaped = (pixel - r0) / range_span;
        if self.clamp {
            shaped = shaped.clamp(0.0, 1.0);
        }
        let normalized = match self.kind {
            ContinuousKind::Linear => shaped,
            ContinuousKind::Sqrt => shaped.signum() * shaped * shaped,
        };
        Some(d0 + (d1 - d0) * normalized)
    }

    /// Roughly `count` human-friendly tick values inside the domain.
    #[must_use]
    pub fn ticks(self, count: usize) -> Vec<f64> {
        match self.domain {
            Some((d0, d1)) => nice_ticks(d0, d1, count),
            None => Vec::new(),
        }
    }

    /// Formats `value` with the precision implied by `ticks(count)`.
    #[must_use]
    pub fn tick_label(self, value: f64, count: usize) -> String {
        let step = self
            .domain
            .map_or(0.0, |(d0, d1)| tick_step(d0, d1, count));
        format_tick(value, step)
    }
}
