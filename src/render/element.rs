use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{Key, Record};
use crate::core::join::BoundRecord;
use crate::render::Color;

/// Surface-wide identity of one created element.
///
/// Ids are never reused, so a late callback for a removed element cannot touch
/// a newer element created under the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mark type a render target creates on its surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkKind {
    Rect,
    Circle,
    Text,
}

/// Value of one visual attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Number(f64),
    Color(Color),
    Text(String),
}

impl AttrValue {
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(color) => Some(*color),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// `false` for numbers or color channels that are NaN or infinite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Number(value) => value.is_finite(),
            Self::Color(color) => {
                color.red.is_finite()
                    && color.green.is_finite()
                    && color.blue.is_finite()
                    && color.alpha.is_finite()
            }
            Self::Text(_) => true,
        }
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Color> for AttrValue {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Ordered attribute name to value mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(IndexMap<String, AttrValue>);

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.0.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.get(name)
    }

    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(AttrValue::as_number)
    }

    #[must_use]
    pub fn color(&self, name: &str) -> Option<Color> {
        self.get(name).and_then(AttrValue::as_color)
    }

    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttrValue::as_text)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Overwrites entries of `self` with every entry of `other`.
    pub fn merge(&mut self, other: &Self) {
        for (name, value) in other.iter() {
            self.0.insert(name.to_owned(), value.clone());
        }
    }

    /// Drops non-finite values and returns their names.
    pub fn retain_finite(&mut self) -> Vec<String> {
        let dropped: Vec<String> = self
            .0
            .iter()
            .filter(|(_, value)| !value.is_finite())
            .map(|(name, _)| name.clone())
            .collect();
        self.0.retain(|_, value| value.is_finite());
        dropped
    }
}

impl<N: Into<String>, V: Into<AttrValue>> FromIterator<(N, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Whether an element is part of the current dataset or animating out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementLifecycle {
    Live,
    Exiting,
}

/// One rendered element exclusively owned by a render target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualElement {
    pub id: ElementId,
    pub key: Key,
    pub record: Record,
    /// Position of `record` in the latest snapshot it was bound from.
    pub index: usize,
    /// Last committed (possibly mid-transition) attribute values.
    pub attributes: Attributes,
    pub lifecycle: ElementLifecycle,
}

impl VisualElement {
    #[must_use]
    pub fn is_exiting(&self) -> bool {
        self.lifecycle == ElementLifecycle::Exiting
    }
}

impl BoundRecord for VisualElement {
    fn bound_record(&self) -> &Record {
        &self.record
    }
}
