use chrono::{DateTime, Datelike, Months, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::core::primitives::{datetime_to_unix_millis, unix_millis_to_datetime};
use crate::core::scale::{ContinuousScale, ScaleFactory, ScaleSpec};
use crate::error::{ChartError, ChartResult};

const SECOND_MS: i64 = 1_000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;
const MAX_TIME_TICKS: usize = 1_000;

/// Declarative description of a time scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeScaleSpec {
    pub domain: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub range: (f64, f64),
    #[serde(default)]
    pub clamp: bool,
}

impl TimeScaleSpec {
    #[must_use]
    pub fn new(domain: Option<(DateTime<Utc>, DateTime<Utc>)>, range: (f64, f64)) -> Self {
        Self {
            domain,
            range,
            clamp: false,
        }
    }

    /// Spec whose domain spans the earliest and latest of `instants`.
    #[must_use]
    pub fn from_instants<I>(instants: I, range: (f64, f64)) -> Self
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let domain = instants.into_iter().fold(None, |acc, time| match acc {
            None => Some((time, time)),
            Some((min, max)) => Some((min.min(time), max.max(time))),
        });
        Self::new(domain, range)
    }
}

/// Linear scale over instants, computed on elapsed milliseconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    domain: Option<(DateTime<Utc>, DateTime<Utc>)>,
    inner: ContinuousScale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickInterval {
    Fixed(i64),
    Months(u32),
}

impl TickInterval {
    fn approx_millis(self) -> i64 {
        match self {
            Self::Fixed(millis) => millis,
            Self::Months(months) => i64::from(months) * 30 * DAY_MS,
        }
    }

    fn label_pattern(self) -> &'static str {
        match self {
            Self::Fixed(millis) if millis < MINUTE_MS => "%H:%M:%S",
            Self::Fixed(millis) if millis < DAY_MS => "%H:%M",
            Self::Fixed(_) => "%b %e",
            Self::Months(months) if months < 12 => "%B",
            Self::Months(_) => "%Y",
        }
    }
}

const TICK_INTERVALS: [TickInterval; 20] = [
    TickInterval::Fixed(SECOND_MS),
    TickInterval::Fixed(5 * SECOND_MS),
    TickInterval::Fixed(15 * SECOND_MS),
    TickInterval::Fixed(30 * SECOND_MS),
    TickInterval::Fixed(MINUTE_MS),
    TickInterval::Fixed(5 * MINUTE_MS),
    TickInterval::Fixed(15 * MINUTE_MS),
    TickInterval::Fixed(30 * MINUTE_MS),
    TickInterval::Fixed(HOUR_MS),
    TickInterval::Fixed(3 * HOUR_MS),
    TickInterval::Fixed(6 * HOUR_MS),
    TickInterval::Fixed(12 * HOUR_MS),
    TickInterval::Fixed(DAY_MS),
    TickInterval::Fixed(2 * DAY_MS),
    TickInterval::Fixed(7 * DAY_MS),
    TickInterval::Months(1),
    TickInterval::Months(3),
    TickInterval::Months(6),
    TickInterval::Months(12),
    TickInterval::Months(60),
];

impl TimeScale {
    pub fn new(spec: &TimeScaleSpec) -> ChartResult<Self> {
        let millis_domain = spec
            .domain
            .map(|(start, end)| (datetime_to_unix_millis(start), datetime_to_unix_millis(end)));
        let inner = ScaleFactory::build(
            &ScaleSpec::linear(millis_domain, spec.range).with_clamp(spec.clamp),
        )?;
        Ok(Self {
            domain: spec.domain,
            inner,
        })
    }

    #[must_use]
    pub fn domain(self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.domain
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        self.inner.range()
    }

    #[must_use]
    pub fn map(self, time: DateTime<Utc>) -> f64 {
        self.inner.map(datetime_to_unix_millis(time))
    }

    pub fn invert(self, pixel: f64) -> ChartResult<DateTime<Utc>> {
        let millis = self.inner.invert(pixel).ok_or_else(|| {
            ChartError::InvalidData("cannot invert a time scale without a domain".to_owned())
        })?;
        unix_millis_to_datetime(millis).ok_or_else(|| {
            ChartError::InvalidData(format!("pixel {pixel} maps outside representable time"))
        })
    }

    /// Roughly `count` ticks aligned to calendar-friendly intervals.
    #[must_use]
    pub fn ticks(self, count: usize) -> Vec<DateTime<Utc>> {
        let Some((start, end)) = self.domain else {
            return Vec::new();
        };
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        if start == end {
            return vec![start];
        }

        match select_interval(start, end, count) {
            TickInterval::Fixed(step) => fixed_ticks(start, end, step),
            TickInterval::Months(months) => month_ticks(start, end, months),
        }
    }

    /// Formats `time` with the pattern matching the interval `ticks(count)` uses.
    #[must_use]
    pub fn tick_label(self, time: DateTime<Utc>, count: usize) -> String {
        let pattern = match self.domain {
            Some((start, end)) if start != end => {
                let (start, end) = if end < start { (end, start) } else { (start, end) };
                select_interval(start, end, count).label_pattern()
            }
            _ => "%b %e",
        };
        format_time(time, pattern)
    }
}

/// Formats an instant with a `chrono` strftime pattern.
#[must_use]
pub fn format_time(time: DateTime<Utc>, pattern: &str) -> String {
    time.format(pattern).to_string()
}

fn select_interval(start: DateTime<Utc>, end: DateTime<Utc>, count: usize) -> TickInterval {
    let span = (end - start).num_milliseconds();
    let target = span / i64::try_from(count.max(1)).unwrap_or(i64::MAX);
    TICK_INTERVALS
        .iter()
        .copied()
        .find(|interval| interval.approx_millis() >= target)
        .unwrap_or(TickInterval::Months(60))
}

fn fixed_ticks(start: DateTime<Utc>, end: DateTime<Utc>, step: i64) -> Vec<DateTime<Utc>> {
    let start_ms = start.timestamp_millis();
    let end_ms = end.timestamp_millis();
    let mut current = start_ms.div_euclid(step) * step;
    if current < start_ms {
        current += step;
    }

    let mut ticks = Vec::new();
    while current <= end_ms && ticks.len() < MAX_TIME_TICKS {
        if let Some(time) = Utc.timestamp_millis_opt(current).single() {
            ticks.push(time);
        }
        current += step;
    }
    ticks
}

fn month_ticks(start: DateTime<Utc>, end: DateTime<Utc>, months: u32) -> Vec<DateTime<Utc>> {
    let Some(mut current) = Utc
        .with_ymd_and_hms(start.year(), start.month(), 1, 0, 0, 0)
        .single()
    else {
        return Vec::new();
    };

    while current < start || month_index(current) % i64::from(months) != 0 {
        match current.checked_add_months(Months::new(1)) {
            Some(next) => current = next,
            None => return Vec::new(),
        }
    }

    let mut ticks = Vec::new();
    while current <= end && ticks.len() < MAX_TIME_TICKS {
        ticks.push(current);
        match current.checked_add_months(Months::new(months)) {
            Some(next) => current = next,
            None => break,
        }
    }
    ticks
}

fn month_index(time: DateTime<Utc>) -> i64 {
    i64::from(time.year()) * 12 + i64::from(time.month0())
}
