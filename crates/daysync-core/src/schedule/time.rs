use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, Offset, TimeZone};
use chrono_tz::Tz;

use crate::error::{Result, ValidationError};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a calendar entry's `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()).into())
}

/// Resolve a local wall clock time on `date` in `zone`.
///
/// Ambiguous times (the repeated hour when clocks go back) resolve to the
/// earlier instant. Times skipped when clocks go forward are shifted past
/// the gap, so 02:30 on a spring-forward night in Paris becomes 03:30.
pub fn to_zoned_timestamp(date: NaiveDate, clock: NaiveTime, zone: Tz) -> DateTime<Tz> {
    let local = date.and_time(clock);
    match zone.from_local_datetime(&local) {
        LocalResult::Single(ts) => ts,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            // Read the wall clock with the offset in force a day earlier.
            let before = zone.offset_from_utc_datetime(&(local - Duration::days(1))).fix();
            let utc = local - Duration::seconds(i64::from(before.local_minus_utc()));
            zone.from_utc_datetime(&utc)
        }
    }
}

/// `YYYY-MM-DDTHH:MM:SS+HH:MM`, the form the calendar API expects.
pub fn format_timestamp(ts: &DateTime<Tz>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}
