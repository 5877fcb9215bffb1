use serde::{Deserialize, Serialize};

use crate::core::primitives::datetime_to_unix_millis;
use crate::core::{BandScale, ContinuousScale, TimeScale};
use crate::error::ChartResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisOrientation {
    Bottom,
    Left,
}

/// One tick mark along an axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    /// Domain value (epoch milliseconds for time axes, band index for band axes).
    pub value: f64,
    pub position: f64,
    pub label: String,
}

/// Scale-derived description of one axis, ready to be drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisModel {
    pub orientation: AxisOrientation,
    /// Translation across the axis: `y` for bottom axes, `x` for left axes.
    pub offset: f64,
    pub range: (f64, f64),
    pub ticks: Vec<AxisTick>,
}

impl AxisModel {
    #[must_use]
    pub fn linear(
        orientation: AxisOrientation,
        scale: ContinuousScale,
        tick_count: usize,
        offset: f64,
    ) -> Self {
        let ticks = scale
            .ticks(tick_count)
            .into_iter()
            .map(|value| AxisTick {
                value,
                position: scale.map(value),
                label: scale.tick_label(value, tick_count),
            })
            .collect();
        Self {
            orientation,
            offset,
            range: scale.range(),
            ticks,
        }
    }

    #[must_use]
    pub fn time(
        orientation: AxisOrientation,
        scale: TimeScale,
        tick_count: usize,
        offset: f64,
    ) -> Self {
        let ticks = scale
            .ticks(tick_count)
            .into_iter()
            .map(|time| AxisTick {
                value: datetime_to_unix_millis(time),
                position: scale.map(time),
                label: scale.tick_label(time, tick_count),
            })
            .collect();
        Self {
            orientation,
            offset,
            range: scale.range(),
            ticks,
        }
    }

    /// One tick centered on every band.
    #[must_use]
    pub fn band(orientation: AxisOrientation, scale: &BandScale, offset: f64) -> Self {
        let ticks = scale
            .categories()
            .enumerate()
            .filter_map(|(index, key)| {
                scale.band_at(index).map(|band| AxisTick {
                    value: index as f64,
                    position: band.center(),
                    label: key.to_string(),
                })
            })
            .collect();
        Self {
            orientation,
            offset,
            range: scale.range(),
            ticks,
        }
    }
}

/// Draws tick marks and labels for a freshly built scale.
pub trait AxisRenderer {
    fn render_axis(&mut self, axis: &AxisModel) -> ChartResult<()>;
}
