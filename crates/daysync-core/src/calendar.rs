//! The remote calendar seam.
//!
//! The publisher only needs one remote operation: insert an event on a
//! named calendar. [`CalendarService`] is that operation;
//! [`crate::integrations::google::GoogleCalendar`] is the real backend.

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, Result};
use crate::schedule::{format_timestamp, parse_date, to_zoned_timestamp, Activity};

/// Start or end of an event, as the calendar API expects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
}

/// Body of an insert-event request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRequest {
    pub summary: String,
    pub start: EventTime,
    pub end: EventTime,
}

impl EventRequest {
    /// Event for `activity` on `date` (`YYYY-MM-DD`), with both ends
    /// resolved in `zone`.
    pub fn for_activity(date: &str, activity: &Activity, zone: Tz) -> Result<Self> {
        let date = parse_date(date)?;
        let at = |clock: NaiveTime| EventTime {
            date_time: format_timestamp(&to_zoned_timestamp(date, clock, zone)),
            time_zone: zone.name().to_string(),
        };

        Ok(Self {
            summary: activity.name.clone(),
            start: at(activity.start_time),
            end: at(activity.end_time),
        })
    }
}

/// What the calendar returns for a created event. Both fields are
/// best-effort: a created event is still a success when they are missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CreatedEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "htmlLink", default)]
    pub html_link: Option<String>,
}

/// A calendar that events can be inserted into.
#[allow(async_fn_in_trait)]
pub trait CalendarService {
    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &EventRequest,
    ) -> std::result::Result<CreatedEvent, CalendarError>;
}
