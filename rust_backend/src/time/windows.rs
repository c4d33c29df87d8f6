use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::{AggregatorError, AggregatorResult};

/// Date-time pattern used to render window bounds in reports
pub const WINDOW_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date pattern accepted in a window list
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A closed time interval `[start, end]` in UTC.
///
/// `start` is midnight of the first day, `end` the last instant of the final day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a window spanning whole calendar days from `first_day` to `last_day`.
    pub fn from_days(first_day: NaiveDate, last_day: NaiveDate) -> Self {
        let last_instant = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
            .unwrap_or(NaiveTime::MIN);
        Self {
            start: first_day.and_time(NaiveTime::MIN).and_utc(),
            end: last_day.and_time(last_instant).and_utc(),
        }
    }

    /// Returns true if `time` lies inside the closed interval.
    pub fn contains(&self, time: &DateTime<Utc>) -> bool {
        self.start <= *time && *time <= self.end
    }
}

/// Ordered, non-overlapping set of time windows with timestamp lookup.
///
/// # Examples
///
/// ```
/// use region_stats::time::TimeWindowIndex;
/// use chrono::{TimeZone, Utc};
///
/// let index = TimeWindowIndex::parse("2010-01-01:2010-01-10,2010-01-11:2010-01-20").unwrap();
/// let t = Utc.with_ymd_and_hms(2010, 1, 15, 10, 0, 0).unwrap();
/// assert_eq!(index.lookup(&t), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct TimeWindowIndex {
    windows: Vec<TimeWindow>,
}

impl TimeWindowIndex {
    /// Parse a comma-separated list of `start:end` day pairs.
    ///
    /// Windows must be given in ascending order and must not overlap.
    pub fn parse(spec: &str) -> AggregatorResult<Self> {
        let mut windows = Vec::new();

        for part in spec.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let (first, last) = part.split_once(':').ok_or_else(|| {
                AggregatorError::InvalidTimeWindows(format!(
                    "expected 'start:end', got '{}'",
                    part
                ))
            })?;

            windows.push(TimeWindow::from_days(parse_day(first)?, parse_day(last)?));
        }

        Self::new(windows)
    }

    /// Build an index from explicit windows, validating their order.
    pub fn new(windows: Vec<TimeWindow>) -> AggregatorResult<Self> {
        if windows.is_empty() {
            return Err(AggregatorError::InvalidTimeWindows(
                "at least one time window is required".to_string(),
            ));
        }

        for (i, window) in windows.iter().enumerate() {
            if window.end < window.start {
                return Err(AggregatorError::InvalidTimeWindows(format!(
                    "window {} ends before it starts",
                    i
                )));
            }
        }

        for (i, pair) in windows.windows(2).enumerate() {
            if pair[1].start <= pair[0].end {
                return Err(AggregatorError::InvalidTimeWindows(format!(
                    "window {} overlaps or precedes window {}",
                    i + 1,
                    i
                )));
            }
        }

        Ok(Self { windows })
    }

    /// Index of the window containing `time`, or `None` outside all windows.
    pub fn lookup(&self, time: &DateTime<Utc>) -> Option<usize> {
        let idx = self.windows.partition_point(|w| w.end < *time);
        match self.windows.get(idx) {
            Some(window) if window.start <= *time => Some(idx),
            _ => None,
        }
    }

    /// Render both bounds of window `index`.
    pub fn format(&self, index: usize) -> Option<(String, String)> {
        self.windows.get(index).map(|w| {
            (
                w.start.format(WINDOW_FORMAT).to_string(),
                w.end.format(WINDOW_FORMAT).to_string(),
            )
        })
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn windows(&self) -> &[TimeWindow] {
        &self.windows
    }
}

fn parse_day(text: &str) -> AggregatorResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).map_err(|e| {
        AggregatorError::InvalidTimeWindows(format!("invalid date '{}': {}", text.trim(), e))
    })
}
