//! Optional hooks layered on top of render targets.
//!
//! Keep extensions observational and avoid coupling them into core paths.

pub mod observers;

pub use observers::{ChartObserver, ObserverContext, RenderEvent};
