use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::core::types::Key;
use crate::error::{ChartError, ChartResult};

/// Declarative description of a categorical band scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSpec {
    pub categories: Vec<Key>,
    pub range: (f64, f64),
    #[serde(default)]
    pub padding_inner: f64,
    /// Snap step, start and bandwidth to whole pixels.
    #[serde(default)]
    pub round: bool,
}

impl BandSpec {
    #[must_use]
    pub fn new(categories: Vec<Key>, range: (f64, f64)) -> Self {
        Self {
            categories,
            range,
            padding_inner: 0.0,
            round: false,
        }
    }

    /// Categories `Index(0) .. Index(count - 1)`.
    #[must_use]
    pub fn indexed(count: usize, range: (f64, f64)) -> Self {
        Self::new((0..count).map(Key::Index).collect(), range)
    }

    #[must_use]
    pub fn with_padding_inner(mut self, padding_inner: f64) -> Self {
        self.padding_inner = padding_inner;
        self
    }

    #[must_use]
    pub fn with_round(mut self, round: bool) -> Self {
        self.round = round;
        self
    }
}

/// Start offset and width of one category cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub start: f64,
    pub bandwidth: f64,
}

impl Band {
    #[must_use]
    pub fn center(self) -> f64 {
        self.start + self.bandwidth / 2.0
    }
}

/// Partitions a pixel range into equal cells, one per category.
///
/// With `n` categories and inner padding `p` the step is `span / (n - p)`, so
/// `n` bandwidths plus `n - 1` inner gaps cover the range exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    categories: IndexSet<Key>,
    range: (f64, f64),
    padding_inner: f64,
    start: f64,
    step: f64,
    bandwidth: f64,
    reversed: bool,
}

impl BandScale {
    pub fn new(spec: &BandSpec) -> ChartResult<Self> {
        if !spec.range.0.is_finite() || !spec.range.1.is_finite() {
            return Err(ChartError::InvalidData(
                "band scale range must be finite".to_owned(),
            ));
        }
        if !spec.padding_inner.is_finite() || !(0.0..1.0).contains(&spec.padding_inner) {
            return Err(ChartError::InvalidData(
                "band inner padding must be finite and in [0, 1)".to_owned(),
            ));
        }

        // Repeated categories collapse onto their first cell.
        let categories: IndexSet<Key> = spec.categories.iter().cloned().collect();
        let reversed = spec.range.1 < spec.range.0;
        let (lo, hi) = if reversed {
            (spec.range.1, spec.range.0)
        } else {
            spec.range
        };

        let count = categories.len() as f64;
        let padding = spec.padding_inner;
        let (mut start, mut step, mut bandwidth) = (lo, 0.0, 0.0);
        if !categories.is_empty() {
            step = (hi - lo) / (count - padding);
            if spec.round {
                step = step.floor();
                start += ((hi - lo - step * (count - padding)) / 2.0).max(0.0);
                start = start.round();
            }
            bandwidth = step * (1.0 - padding);
            if spec.round {
                bandwidth = bandwidth.round();
            }
        }

        Ok(Self {
            categories,
            range: spec.range,
            padding_inner: padding,
            start,
            step,
            bandwidth,
            reversed,
        })
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    #[must_use]
    pub fn padding_inner(&self) -> f64 {
        self.padding_inner
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = &Key> {
        self.categories.iter()
    }

    /// Cell for `category`, or `None` when it is not part of the domain.
    #[must_use]
    pub fn band(&self, category: &Key) -> Option<Band> {
        self.categories
            .get_index_of(category)
            .and_then(|index| self.band_at(index))
    }

    /// Cell for the `index`-th category.
    #[must_use]
    pub fn band_at(&self, index: usize) -> Option<Band> {
        if index >= self.categories.len() {
            return None;
        }
        let slot = if self.reversed {
            self.categories.len() - 1 - index
        } else {
            index
        };
        Some(Band {
            start: self.start + self.step * slot as f64,
            bandwidth: self.bandwidth,
        })
    }
}
