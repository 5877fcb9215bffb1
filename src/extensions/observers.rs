use serde::{Deserialize, Serialize};

use crate::core::Key;
use crate::render::ElementId;

/// Read-only render target state passed to observer hooks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverContext {
    pub now_ms: f64,
    pub live_elements: usize,
    pub exiting_elements: usize,
    pub active_transitions: usize,
}

/// Event stream exposed to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderEvent {
    Initialized {
        elements: usize,
    },
    Updated {
        entered: usize,
        updated: usize,
        exited: usize,
        revived: usize,
    },
    ElementRemoved {
        element: ElementId,
        key: Key,
    },
    /// A key came back while its element was still animating out.
    ElementRevived {
        element: ElementId,
        key: Key,
    },
    SurfaceError {
        element: ElementId,
        reason: String,
    },
    TornDown {
        abandoned_transitions: usize,
    },
}

/// Hook interface for watching a render target without mutating it.
pub trait ChartObserver {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: &RenderEvent, context: ObserverContext);
}
