use std::collections::HashMap;
use std::fmt;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Pixel dimensions of one chart mount point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// One entry of a dataset snapshot.
///
/// Serialized untagged so JSON payloads keep their natural shapes:
/// `5`, `[10, 20]` and `{"key": 1, "value": 7}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    Scalar(f64),
    Pair(f64, f64),
    Keyed { key: f64, value: f64 },
}

/// Record layout a render target is fixed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordShape {
    Scalar,
    Pair,
    Keyed,
}

impl RecordShape {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Pair => "pair",
            Self::Keyed => "keyed",
        }
    }
}

impl Record {
    #[must_use]
    pub fn shape(self) -> RecordShape {
        match self {
            Self::Scalar(_) => RecordShape::Scalar,
            Self::Pair(..) => RecordShape::Pair,
            Self::Keyed { .. } => RecordShape::Keyed,
        }
    }

    /// Magnitude plotted on the value axis.
    ///
    /// Scalars return themselves, pairs their `y`, keyed records their `value`.
    #[must_use]
    pub fn value(self) -> f64 {
        match self {
            Self::Scalar(value) | Self::Keyed { value, .. } => value,
            Self::Pair(_, y) => y,
        }
    }

    /// Horizontal coordinate of paired records.
    #[must_use]
    pub fn x(self) -> Option<f64> {
        match self {
            Self::Pair(x, _) => Some(x),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        match self {
            Self::Scalar(value) => value.is_finite(),
            Self::Pair(x, y) => x.is_finite() && y.is_finite(),
            Self::Keyed { key, value } => key.is_finite() && value.is_finite(),
        }
    }
}

impl From<f64> for Record {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<(f64, f64)> for Record {
    fn from((x, y): (f64, f64)) -> Self {
        Self::Pair(x, y)
    }
}

impl From<[f64; 2]> for Record {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::Pair(x, y)
    }
}

/// Stable identity of a record across redraws.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    Index(usize),
    Number(OrderedFloat<f64>),
    Pair(OrderedFloat<f64>, OrderedFloat<f64>),
    Text(String),
    /// Repeat of `base` within one snapshot; `ordinal` starts at 1 for the
    /// second occurrence.
    Occurrence { base: Box<Key>, ordinal: usize },
}

impl Key {
    #[must_use]
    pub fn number(value: f64) -> Self {
        Self::Number(OrderedFloat(value))
    }

    #[must_use]
    pub fn pair(x: f64, y: f64) -> Self {
        Self::Pair(OrderedFloat(x), OrderedFloat(y))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{index}"),
            Self::Number(value) => write!(f, "{}", value.0),
            Self::Pair(x, y) => write!(f, "({}, {})", x.0, y.0),
            Self::Text(text) => f.write_str(text),
            Self::Occurrence { base, ordinal } => write!(f, "{base}~{ordinal}"),
        }
    }
}

/// Built-in key extractors.
///
/// Callers needing anything else pass a closure to
/// [`DatasetJoiner::join`](crate::core::DatasetJoiner::join) directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyStrategy {
    /// Positional identity: the record's index in the snapshot.
    Index,
    /// The `key` field of keyed records; other shapes fall back to index.
    Field,
    /// The record's own coordinates. Coincident records are told apart by
    /// their occurrence order inside the snapshot.
    Identity,
}

impl KeyStrategy {
    #[must_use]
    pub fn key_of(self, record: &Record, index: usize) -> Key {
        match (self, *record) {
            (Self::Index, _) => Key::Index(index),
            (Self::Field, Record::Keyed { key, .. }) => Key::number(key),
            (Self::Field, _) => Key::Index(index),
            (Self::Identity, Record::Scalar(value)) => Key::number(value),
            (Self::Identity, Record::Pair(x, y)) => Key::pair(x, y),
            (Self::Identity, Record::Keyed { key, value }) => Key::pair(key, value),
        }
    }

    /// Keys for a whole snapshot.
    ///
    /// `Identity` keeps the first occurrence of a coordinate as its plain key
    /// and wraps later ones in [`Key::Occurrence`], so repeated points stay
    /// distinct elements. Other strategies map records one by one.
    #[must_use]
    pub fn keys(self, records: &[Record]) -> Vec<Key> {
        let mut seen: HashMap<Key, usize> = HashMap::new();
        records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let key = self.key_of(record, index);
                if self != Self::Identity {
                    return key;
                }
                let ordinal = seen.entry(key.clone()).or_insert(0);
                let occurrence = *ordinal;
                *ordinal += 1;
                if occurrence == 0 {
                    key
                } else {
                    Key::Occurrence {
                        base: Box::new(key),
                        ordinal: occurrence,
                    }
                }
            })
            .collect()
    }
}

/// Verifies that every record of `records` has the `expected` shape.
pub fn ensure_shape(records: &[Record], expected: RecordShape) -> crate::ChartResult<()> {
    if let Some(record) = records.iter().find(|record| record.shape() != expected) {
        return Err(crate::ChartError::ShapeMismatch {
            expected: expected.name(),
            actual: record.shape().name(),
        });
    }
    Ok(())
}
