use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

const NAMED_COLORS: [(&str, (u8, u8, u8)); 12] = [
    ("black", (0, 0, 0)),
    ("white", (255, 255, 255)),
    ("red", (255, 0, 0)),
    ("green", (0, 128, 0)),
    ("blue", (0, 0, 255)),
    ("salmon", (250, 128, 114)),
    ("teal", (0, 128, 128)),
    ("steelblue", (70, 130, 180)),
    ("orange", (255, 165, 0)),
    ("gray", (128, 128, 128)),
    ("grey", (128, 128, 128)),
    ("transparent", (0, 0, 0)),
];

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Builds a color from 8-bit channels.
    #[must_use]
    pub fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self::rgb(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
        )
    }

    /// Parses `#rgb`, `#rrggbb`, `rgb(r, g, b)` or a small set of CSS names.
    pub fn parse(input: &str) -> ChartResult<Self> {
        let input = input.trim();
        let invalid = || ChartError::InvalidData(format!("unrecognized color `{input}`"));

        if let Some(hex) = input.strip_prefix('#') {
            let expanded: String = match hex.len() {
                3 => hex.chars().flat_map(|c| [c, c]).collect(),
                6 => hex.to_owned(),
                _ => return Err(invalid()),
            };
            let channel = |at: usize| {
                expanded
                    .get(at..at + 2)
                    .and_then(|digits| u8::from_str_radix(digits, 16).ok())
                    .ok_or_else(invalid)
            };
            return Ok(Self::from_rgb8(channel(0)?, channel(2)?, channel(4)?));
        }

        if let Some(body) = input
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let channels: Vec<u8> = body
                .split(',')
                .map(|part| part.trim().parse::<u8>().map_err(|_| invalid()))
                .collect::<ChartResult<_>>()?;
            let [red, green, blue] = channels[..] else {
                return Err(invalid());
            };
            return Ok(Self::from_rgb8(red, green, blue));
        }

        let lowered = input.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lowered)
            .map(|(name, (red, green, blue))| {
                let color = Self::from_rgb8(*red, *green, *blue);
                if *name == "transparent" {
                    Self { alpha: 0.0, ..color }
                } else {
                    color
                }
            })
            .ok_or_else(invalid)
    }

    /// Channel-wise linear blend; `t` is clamped to `[0, 1]`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |from: f64, to: f64| from + (to - from) * t;
        Self::rgba(
            mix(self.red, other.red),
            mix(self.green, other.green),
            mix(self.blue, other.blue),
            mix(self.alpha, other.alpha),
        )
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        let byte = |channel: f64| (channel.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            byte(self.red),
            byte(self.green),
            byte(self.blue)
        )
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}
