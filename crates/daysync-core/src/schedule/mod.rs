//! Day templates and the calendar that assigns them to dates.

pub mod time;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

pub use time::{format_timestamp, parse_date, to_zoned_timestamp};

/// A named template of timed activities for one kind of day.
///
/// Loaded from `<name>.json` in the data folder; `name` is the file stem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayType {
    #[serde(skip)]
    pub name: String,
    pub activities: Vec<Activity>,
}

/// A named interval of local clock time.
///
/// `end_time` is expected to be later than `start_time`; overnight
/// activities are not supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    #[serde(with = "clock")]
    pub start_time: NaiveTime,
    #[serde(with = "clock")]
    pub end_time: NaiveTime,
}

impl Activity {
    /// Length in hours at minute precision. Negative when `end_time`
    /// precedes `start_time`.
    pub fn duration_hours(&self) -> f64 {
        let delta = self.end_time.signed_duration_since(self.start_time);
        delta.num_minutes() as f64 / 60.0
    }
}

/// Assignment of a concrete date to a day type.
///
/// `date` is kept as written and only parsed when its events are built,
/// so one malformed date fails that entry's events and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub date: String,
    #[serde(rename = "type")]
    pub day_type: String,
}

/// `"HH:MM"` wall clock strings.
pub mod clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), FORMAT).map_err(serde::de::Error::custom)
    }
}
