//! Time window scoping a history fetch.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// `[start, end)` in epoch milliseconds plus an ingest-type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: i64,
    pub end: i64,
    pub ingest_type: String,
}

impl Window {
    /// Window covering the `lookback_days` days before today plus all of today,
    /// where "today" is the local date of `now` in its own time zone.
    ///
    /// `start` is today's local midnight minus `lookback_days` × 24h;
    /// `end` is the last millisecond of today plus one.
    pub fn ending_today<Tz: TimeZone>(
        now: &DateTime<Tz>,
        lookback_days: u32,
        ingest_type: impl Into<String>,
    ) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();

        Self {
            start: start_of_day_millis(&tz, today) - i64::from(lookback_days) * MILLIS_PER_DAY,
            end: end_of_day_millis(&tz, today) + 1,
            ingest_type: ingest_type.into(),
        }
    }

    /// Length of the window in milliseconds; negative for inverted ranges.
    ///
    /// Saturates at the `i64` bounds instead of overflowing.
    pub fn span_millis(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }
}

fn start_of_day_millis<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> i64 {
    local_millis(tz, day.and_time(NaiveTime::MIN))
}

fn end_of_day_millis<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> i64 {
    // Wraps to 23:59:59.999.
    let last_milli = NaiveTime::MIN - Duration::milliseconds(1);
    local_millis(tz, day.and_time(last_milli))
}

/// Epoch millis of a local wall-clock time.
///
/// Folds resolve to the earliest instant. Times inside a gap are read at the
/// offset the zone has at that UTC instant.
fn local_millis<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> i64 {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => t.timestamp_millis(),
        LocalResult::None => {
            let offset = tz.offset_from_utc_datetime(&naive).fix();
            Utc.from_utc_datetime(&naive).timestamp_millis()
                - i64::from(offset.local_minus_utc()) * 1000
        }
    }
}
