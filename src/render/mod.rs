mod element;
mod memory_surface;
mod primitives;

pub use element::{
    AttrValue, Attributes, ElementId, ElementLifecycle, MarkKind, VisualElement,
};
pub use memory_surface::{MemorySurface, SurfaceNode, SurfaceSnapshot};
pub use primitives::Color;

use crate::error::ChartResult;

/// Mount point a render target draws into.
///
/// The core never assumes a graphics API; elements only need to be created,
/// updated one attribute at a time, removed, and read back.
pub trait Surface {
    fn create(&mut self, id: ElementId, mark: MarkKind, attributes: &Attributes)
    -> ChartResult<()>;

    fn set_attribute(&mut self, id: ElementId, name: &str, value: &AttrValue) -> ChartResult<()>;

    fn remove(&mut self, id: ElementId) -> ChartResult<()>;

    /// Currently committed value of `name` on element `id`.
    fn committed(&self, id: ElementId, name: &str) -> Option<AttrValue>;
}
