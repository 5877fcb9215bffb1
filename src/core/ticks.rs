//! Nice-number tick generation for continuous scales.

const MAX_TICKS: i64 = 10_000;

/// Step between ticks for roughly `count` ticks over `[start, stop]`.
///
/// Steps are powers of ten times 1, 2 or 5. Returns `0.0` for empty or
/// non-finite inputs.
#[must_use]
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    if count == 0 || !start.is_finite() || !stop.is_finite() || start == stop {
        return 0.0;
    }

    let raw = (stop - start).abs() / count as f64;
    let base = 10f64.powf(raw.log10().floor());
    let error = raw / base;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * base
}

/// Tick values at multiples of [`tick_step`] that fall inside the domain.
///
/// Order follows the domain direction, so reversed domains yield descending ticks.
#[must_use]
pub fn nice_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let reversed = stop < start;
    let (lo, hi) = if reversed { (stop, start) } else { (start, stop) };
    let step = tick_step(lo, hi, count);
    if !step.is_finite() || step <= 0.0 {
        return Vec::new();
    }

    // Dividing by the inverse keeps fractional steps free of accumulated error.
    let inverse = if step < 1.0 { (1.0 / step).round() } else { 0.0 };
    let (first, last) = if inverse > 0.0 {
        ((lo * inverse).ceil() as i64, (hi * inverse).floor() as i64)
    } else {
        ((lo / step).ceil() as i64, (hi / step).floor() as i64)
    };
    // Saturated bounds from huge counts must not overflow the span.
    match last.checked_sub(first) {
        Some(span) if (0..=MAX_TICKS).contains(&span) => {}
        _ => return Vec::new(),
    }

    let mut ticks: Vec<f64> = (first..=last)
        .map(|index| {
            if inverse > 0.0 {
                index as f64 / inverse
            } else {
                index as f64 * step
            }
        })
        .collect();
    if reversed {
        ticks.reverse();
    }
    ticks
}

/// Formats a tick value with just enough decimals for `step`.
#[must_use]
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step > 0.0 && step < 1.0 {
        ((-step.log10() - 1e-9).ceil().max(0.0) as usize).min(12)
    } else {
        0
    };
    let label = format!("{value:.decimals$}");
    if label.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        label.trim_start_matches('-').to_owned()
    } else {
        label
    }
}
