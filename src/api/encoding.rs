use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::core::Record;
use crate::render::{AttrValue, Attributes};

type BindingFn = dyn Fn(&Record, usize) -> AttrValue;

/// Attribute value source: a constant, or a pure function of `(record, index)`.
#[derive(Clone)]
pub enum AttrBinding {
    Constant(AttrValue),
    Computed(Rc<BindingFn>),
}

impl fmt::Debug for AttrBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl AttrBinding {
    pub fn computed<F, V>(compute: F) -> Self
    where
        F: Fn(&Record, usize) -> V + 'static,
        V: Into<AttrValue>,
    {
        Self::Computed(Rc::new(move |record, index| compute(record, index).into()))
    }

    #[must_use]
    pub fn resolve(&self, record: &Record, index: usize) -> AttrValue {
        match self {
            Self::Constant(value) => value.clone(),
            Self::Computed(compute) => compute(record, index),
        }
    }
}

/// Named attribute bindings resolved uniformly per record.
#[derive(Debug, Clone, Default)]
pub struct Encoding {
    bindings: IndexMap<String, AttrBinding>,
}

impl Encoding {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn constant(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.bindings
            .insert(name.into(), AttrBinding::Constant(value.into()));
        self
    }

    #[must_use]
    pub fn computed<F, V>(mut self, name: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&Record, usize) -> V + 'static,
        V: Into<AttrValue>,
    {
        self.bindings
            .insert(name.into(), AttrBinding::computed(compute));
        self
    }

    #[must_use]
    pub fn bind(mut self, name: impl Into<String>, binding: AttrBinding) -> Self {
        self.bindings.insert(name.into(), binding);
        self
    }

    /// Adds every binding of `other`, replacing same-named ones.
    #[must_use]
    pub fn merged(mut self, other: &Encoding) -> Self {
        for (name, binding) in &other.bindings {
            self.bindings.insert(name.clone(), binding.clone());
        }
        self
    }

    /// Keeps only the bindings whose name is in `names`.
    #[must_use]
    pub fn only(mut self, names: &[&str]) -> Self {
        self.bindings.retain(|name, _| names.contains(&name.as_str()));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    #[must_use]
    pub fn resolve(&self, record: &Record, index: usize) -> Attributes {
        self.bindings
            .iter()
            .map(|(name, binding)| (name.clone(), binding.resolve(record, index)))
            .collect()
    }
}
