use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::render::{AttrValue, Attributes, ElementId, MarkKind, Surface};

/// One element as stored by [`MemorySurface`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceNode {
    pub id: ElementId,
    pub mark: MarkKind,
    pub attributes: Attributes,
}

/// Serializable view of every element currently on a surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSnapshot {
    pub nodes: Vec<SurfaceNode>,
}

impl SurfaceSnapshot {
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize surface snapshot: {e}"))
        })
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse surface snapshot: {e}"))
        })
    }
}

/// Headless surface used by tests, benches and the replay binary.
///
/// It still validates attribute values so invalid geometry surfaces as an
/// error instead of being stored.
#[derive(Debug, Default)]
pub struct MemorySurface {
    nodes: IndexMap<ElementId, SurfaceNode>,
    pub created_count: usize,
    pub removed_count: usize,
    pub write_count: usize,
}

impl MemorySurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[must_use]
    pub fn node(&self, id: ElementId) -> Option<&SurfaceNode> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SurfaceNode> {
        self.nodes.values()
    }

    #[must_use]
    pub fn snapshot(&self) -> SurfaceSnapshot {
        SurfaceSnapshot {
            nodes: self.nodes.values().cloned().collect(),
        }
    }
}

fn validate_value(id: ElementId, name: &str, value: &AttrValue) -> ChartResult<()> {
    if name.is_empty() {
        return Err(ChartError::Surface {
            element: id.0,
            reason: "attribute name must not be empty".to_owned(),
        });
    }
    if !value.is_finite() {
        return Err(ChartError::Surface {
            element: id.0,
            reason: format!("attribute `{name}` must be finite"),
        });
    }
    Ok(())
}

impl Surface for MemorySurface {
    fn create(
        &mut self,
        id: ElementId,
        mark: MarkKind,
        attributes: &Attributes,
    ) -> ChartResult<()> {
        if self.nodes.contains_key(&id) {
            return Err(ChartError::Surface {
                element: id.0,
                reason: "element already exists".to_owned(),
            });
        }
        for (name, value) in attributes.iter() {
            validate_value(id, name, value)?;
        }
        self.nodes.insert(
            id,
            SurfaceNode {
                id,
                mark,
                attributes: attributes.clone(),
            },
        );
        self.created_count += 1;
        Ok(())
    }

    fn set_attribute(&mut self, id: ElementId, name: &str, value: &AttrValue) -> ChartResult<()> {
        validate_value(id, name, value)?;
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(ChartError::UnknownElement(id.0))?;
        node.attributes.set(name, value.clone());
        self.write_count += 1;
        Ok(())
    }

    fn remove(&mut self, id: ElementId) -> ChartResult<()> {
        self.nodes
            .shift_remove(&id)
            .ok_or(ChartError::UnknownElement(id.0))?;
        self.removed_count += 1;
        Ok(())
    }

    fn committed(&self, id: ElementId, name: &str) -> Option<AttrValue> {
        self.nodes
            .get(&id)
            .and_then(|node| node.attributes.get(name).cloned())
    }
}
