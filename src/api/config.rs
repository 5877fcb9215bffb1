use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

/// Chart bootstrap configuration shared by every layout.
///
/// Serializable so hosts can persist chart setup; every field has a default,
/// so partial JSON documents load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default = "default_padding")]
    pub x_padding: f64,
    #[serde(default = "default_padding")]
    pub y_padding: f64,
    /// Tick count hint for the horizontal axis.
    #[serde(default = "default_x_ticks")]
    pub x_ticks: usize,
    /// Tick count hint for the vertical axis.
    #[serde(default = "default_y_ticks")]
    pub y_ticks: usize,
    #[serde(default = "default_fill_color")]
    pub fill_color: Color,
    #[serde(default = "default_label_color")]
    pub label_color: Color,
    #[serde(default = "default_label_size")]
    pub label_size: f64,
    #[serde(default = "default_text_offset_x")]
    pub text_offset_x: f64,
    #[serde(default = "default_text_offset_y")]
    pub text_offset_y: f64,
    /// Inner padding ratio of band scales, in `[0, 1)`.
    #[serde(default = "default_band_padding")]
    pub band_padding: f64,
    /// Pixel height of a zero-valued bar.
    #[serde(default)]
    pub bar_baseline_px: f64,
    #[serde(default = "default_transition_duration_ms")]
    pub transition_duration_ms: f64,
    /// Total spread of the index-proportional stagger delay.
    #[serde(default = "default_stagger_ms")]
    pub stagger_ms: f64,
    /// Animate the first draw from the entering attributes instead of
    /// committing target attributes immediately.
    #[serde(default)]
    pub animate_initial_entry: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            x_padding: default_padding(),
            y_padding: default_padding(),
            x_ticks: default_x_ticks(),
            y_ticks: default_y_ticks(),
            fill_color: default_fill_color(),
            label_color: default_label_color(),
            label_size: default_label_size(),
            text_offset_x: default_text_offset_x(),
            text_offset_y: default_text_offset_y(),
            band_padding: default_band_padding(),
            bar_baseline_px: 0.0,
            transition_duration_ms: default_transition_duration_ms(),
            stagger_ms: default_stagger_ms(),
            animate_initial_entry: false,
        }
    }
}

impl ChartConfig {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_padding(mut self, x_padding: f64, y_padding: f64) -> Self {
        self.x_padding = x_padding;
        self.y_padding = y_padding;
        self
    }

    #[must_use]
    pub fn with_ticks(mut self, x_ticks: usize, y_ticks: usize) -> Self {
        self.x_ticks = x_ticks;
        self.y_ticks = y_ticks;
        self
    }

    #[must_use]
    pub fn with_fill_color(mut self, color: Color) -> Self {
        self.fill_color = color;
        self
    }

    #[must_use]
    pub fn with_label_color(mut self, color: Color) -> Self {
        self.label_color = color;
        self
    }

    #[must_use]
    pub fn with_band_padding(mut self, band_padding: f64) -> Self {
        self.band_padding = band_padding;
        self
    }

    #[must_use]
    pub fn with_bar_baseline(mut self, bar_baseline_px: f64) -> Self {
        self.bar_baseline_px = bar_baseline_px;
        self
    }

    #[must_use]
    pub fn with_timing(mut self, transition_duration_ms: f64, stagger_ms: f64) -> Self {
        self.transition_duration_ms = transition_duration_ms;
        self.stagger_ms = stagger_ms;
        self
    }

    #[must_use]
    pub fn with_initial_entry_animation(mut self, enabled: bool) -> Self {
        self.animate_initial_entry = enabled;
        self
    }

    #[must_use]
    pub fn viewport(self) -> Viewport {
        Viewport::new(
            self.width.max(0.0).round() as u32,
            self.height.max(0.0).round() as u32,
        )
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.width.is_finite() || !self.height.is_finite() || self.width <= 0.0 || self.height <= 0.0
        {
            let viewport = self.viewport();
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        for (name, value) in [
            ("x_padding", self.x_padding),
            ("y_padding", self.y_padding),
            ("label_size", self.label_size),
            ("bar_baseline_px", self.bar_baseline_px),
            ("transition_duration_ms", self.transition_duration_ms),
            ("stagger_ms", self.stagger_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "`{name}` must be finite and >= 0"
                )));
            }
        }
        if !self.text_offset_x.is_finite() || !self.text_offset_y.is_finite() {
            return Err(ChartError::InvalidData(
                "text offsets must be finite".to_owned(),
            ));
        }
        if !self.band_padding.is_finite() || !(0.0..1.0).contains(&self.band_padding) {
            return Err(ChartError::InvalidData(
                "`band_padding` must be finite and in [0, 1)".to_owned(),
            ));
        }
        self.fill_color.validate()?;
        self.label_color.validate()?;
        Ok(self)
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse chart config: {e}")))?;
        config.validate()
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize chart config: {e}")))
    }
}

fn default_width() -> f64 {
    900.0
}

fn default_height() -> f64 {
    350.0
}

fn default_padding() -> f64 {
    30.0
}

fn default_x_ticks() -> usize {
    16
}

fn default_y_ticks() -> usize {
    6
}

fn default_fill_color() -> Color {
    Color::from_rgb8(250, 128, 114)
}

fn default_label_color() -> Color {
    Color::WHITE
}

fn default_label_size() -> f64 {
    11.0
}

fn default_text_offset_x() -> f64 {
    5.0
}

fn default_text_offset_y() -> f64 {
    14.0
}

fn default_band_padding() -> f64 {
    0.05
}

fn default_transition_duration_ms() -> f64 {
    500.0
}

fn default_stagger_ms() -> f64 {
    1000.0
}
