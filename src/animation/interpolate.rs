use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::render::AttrValue;

/// Timing curve applied to normalized elapsed time before interpolation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    #[default]
    CubicInOut,
    QuadOut,
}

impl Easing {
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 1.0 };
        match self {
            Self::Linear => t,
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

type InterpolateFn = dyn Fn(&AttrValue, &AttrValue, f64) -> Option<AttrValue>;

/// Blends a `from` value towards a `to` value at progress `t`.
///
/// Returning `None` leaves the attribute at its last committed value.
#[derive(Clone, Default)]
pub enum Interpolator {
    /// Numbers and colors blend linearly, anything else switches at start.
    #[default]
    Auto,
    /// Jumps to `to` as soon as progress is positive.
    Discrete,
    Custom(Rc<InterpolateFn>),
}

impl fmt::Debug for Interpolator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("Auto"),
            Self::Discrete => f.write_str("Discrete"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Interpolator {
    pub fn custom<F>(interpolate: F) -> Self
    where
        F: Fn(&AttrValue, &AttrValue, f64) -> Option<AttrValue> + 'static,
    {
        Self::Custom(Rc::new(interpolate))
    }

    /// Value at progress `t`, or `None` when it would not be finite.
    #[must_use]
    pub fn interpolate(&self, from: &AttrValue, to: &AttrValue, t: f64) -> Option<AttrValue> {
        let value = match self {
            Self::Custom(interpolate) => interpolate(from, to, t),
            _ if t >= 1.0 => Some(to.clone()),
            Self::Auto => interpolate_auto(from, to, t),
            Self::Discrete => Some(discrete(from, to, t)),
        };
        value.filter(AttrValue::is_finite)
    }
}

fn interpolate_auto(from: &AttrValue, to: &AttrValue, t: f64) -> Option<AttrValue> {
    match (from, to) {
        (AttrValue::Number(from), AttrValue::Number(to)) => {
            if !from.is_finite() || !to.is_finite() {
                return None;
            }
            Some(AttrValue::Number(from + (to - from) * t))
        }
        (AttrValue::Color(from), AttrValue::Color(to)) => {
            let (from_value, to_value) = (AttrValue::Color(*from), AttrValue::Color(*to));
            if !from_value.is_finite() || !to_value.is_finite() {
                return None;
            }
            Some(AttrValue::Color(from.lerp(*to, t)))
        }
        _ => Some(discrete(from, to, t)),
    }
}

fn discrete(from: &AttrValue, to: &AttrValue, t: f64) -> AttrValue {
    if t > 0.0 { to.clone() } else { from.clone() }
}

#[cfg(test)]
mod tests {
    use super::{Easing, Interpolator};
    use crate::render::{AttrValue, Color};

    #[test]
    fn easing_curves_pin_endpoints() {
        for easing in [Easing::Linear, Easing::CubicInOut, Easing::QuadOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
        }
        assert_eq!(Easing::CubicInOut.apply(0.5), 0.5);
    }

    #[test]
    fn auto_interpolates_numbers_and_colors() {
        let number = Interpolator::Auto
            .interpolate(&AttrValue::Number(10.0), &AttrValue::Number(20.0), 0.25)
            .expect("finite");
        assert_eq!(number, AttrValue::Number(12.5));

        let color = Interpolator::Auto
            .interpolate(
                &AttrValue::Color(Color::BLACK),
                &AttrValue::Color(Color::WHITE),
                0.5,
            )
            .and_then(|value| value.as_color())
            .expect("color");
        assert_eq!(color.red, 0.5);
    }

    #[test]
    fn non_finite_endpoints_yield_none() {
        let result = Interpolator::Auto.interpolate(
            &AttrValue::Number(f64::NAN),
            &AttrValue::Number(1.0),
            0.5,
        );
        assert!(result.is_none());
    }

    #[test]
    fn text_switches_once_progress_starts() {
        let from = AttrValue::from("old");
        let to = AttrValue::from("new");
        assert_eq!(Interpolator::Auto.interpolate(&from, &to, 0.0), Some(from.clone()));
        assert_eq!(Interpolator::Auto.interpolate(&from, &to, 0.1), Some(to));
    }
}
