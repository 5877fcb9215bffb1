//! Render targets and everything that feeds them: layouts, configuration,
//! axes, data sources and the stream-driven redraw loop.

mod axis;
mod bar_chart;
mod bar_labels;
mod circle_row;
mod config;
mod data_source;
mod encoding;
mod layout;
mod redraw_loop;
mod render_target;
mod scatter;

pub use axis::{AxisModel, AxisOrientation, AxisRenderer, AxisTick};
pub use bar_chart::{BarChartLayout, BarScales, bar_fill};
pub use bar_labels::{BarLabelLayout, label_text};
pub use circle_row::CircleRowLayout;
pub use config::ChartConfig;
pub use data_source::{ChannelSource, DataSource, IterSource, TimerSource};
pub use encoding::{AttrBinding, Encoding};
pub use layout::{ChartLayout, PhaseTemplate};
pub use redraw_loop::{ChartGroup, LoopStep, Redraw, RedrawError, StreamDrivenRedrawLoop};
pub use render_target::{JoinSummary, RenderTarget, TargetState, TickSummary};
pub use scatter::{ScatterLayout, ScatterScales};
