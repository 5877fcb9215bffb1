//! chart-join: data-join and transition engine for data-driven charts.
//!
//! Datasets are mapped to pixels by scales, reconciled against the elements
//! already on screen by key, and animated by a tick-driven scheduler. Hosts
//! plug in a [`render::Surface`] and drive time explicitly.

pub mod animation;
pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod render;
pub mod telemetry;

pub use api::{ChartConfig, RenderTarget, StreamDrivenRedrawLoop};
pub use error::{ChartError, ChartResult};
