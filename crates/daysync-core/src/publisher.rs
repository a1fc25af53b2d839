//! Publishing calendar entries as remote events.
//!
//! Each entry's day type expands into one event per activity. Events are
//! created independently: a failed insert is logged and the run moves on to
//! the next activity. Durations are accumulated whether or not the insert
//! succeeded.

use chrono_tz::Tz;
use indexmap::IndexMap;
use tracing::{error, info, warn};

use crate::analytics::{Accumulator, AnalyticsConfig};
use crate::calendar::{CalendarService, EventRequest};
use crate::schedule::{Activity, CalendarEntry, DayType};

const RULE_WIDTH: usize = 60;

/// Counts and accumulated hours for one publishing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishOutcome {
    pub accumulator: Accumulator,
    pub created: usize,
    pub failed: usize,
    pub skipped_entries: usize,
}

/// Publishes entries to one calendar through a [`CalendarService`].
pub struct Publisher<'a, S> {
    service: &'a S,
    calendar_id: &'a str,
    zone: Tz,
}

impl<'a, S: CalendarService> Publisher<'a, S> {
    pub fn new(service: &'a S, calendar_id: &'a str, zone: Tz) -> Self {
        Self {
            service,
            calendar_id,
            zone,
        }
    }

    /// Publish every entry in order and return the accumulated hours.
    ///
    /// Entries naming an unknown day type are skipped whole.
    pub async fn publish(
        &self,
        entries: &[CalendarEntry],
        day_types: &IndexMap<String, DayType>,
        config: &AnalyticsConfig,
    ) -> PublishOutcome {
        let mut outcome = PublishOutcome {
            accumulator: Accumulator::new(config),
            created: 0,
            failed: 0,
            skipped_entries: 0,
        };

        info!("Creating events in calendar '{}'...", self.calendar_id);
        let rule = "=".repeat(RULE_WIDTH);
        for (idx, entry) in entries.iter().enumerate() {
            info!("{rule}");
            info!("Processing entry {} - Date: {}", idx + 1, entry.date);
            info!("{rule}");

            let Some(day_type) = day_types.get(&entry.day_type) else {
                warn!(
                    "  ! Unknown day type '{}' for date {}. Skipping...",
                    entry.day_type, entry.date
                );
                outcome.skipped_entries += 1;
                continue;
            };

            info!(
                "  * Creating events for {}, this is a {} day...",
                entry.date, day_type.name
            );
            for activity in &day_type.activities {
                if self.publish_activity(entry, activity).await {
                    outcome.created += 1;
                } else {
                    outcome.failed += 1;
                }
                outcome
                    .accumulator
                    .record(&activity.name, activity.duration_hours());
            }
        }

        outcome
    }

    async fn publish_activity(&self, entry: &CalendarEntry, activity: &Activity) -> bool {
        let event = match EventRequest::for_activity(&entry.date, activity, self.zone) {
            Ok(event) => event,
            Err(e) => {
                error!("  ! Cannot schedule '{}' on {}: {e}", activity.name, entry.date);
                return false;
            }
        };

        match self.service.insert_event(self.calendar_id, &event).await {
            Ok(created) => {
                info!(
                    "  - Event created: {} ({} to {})",
                    event.summary, event.start.date_time, event.end.date_time
                );
                if let Some(link) = created.html_link {
                    info!("    {link}");
                }
                true
            }
            Err(e) => {
                error!("  ! An HTTP error occurred: {e}");
                if let Some(details) = e.details() {
                    error!("  ! Error details: {details}");
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::TrackedActivity;
    use crate::calendar::CreatedEvent;
    use crate::error::CalendarError;
    use std::cell::RefCell;

    /// Records requests; fails any event whose summary is in `fail`.
    #[derive(Default)]
    struct FakeCalendar {
        fail: Vec<&'static str>,
        requests: RefCell<Vec<EventRequest>>,
    }

    impl CalendarService for FakeCalendar {
        async fn insert_event(
            &self,
            _calendar_id: &str,
            event: &EventRequest,
        ) -> Result<CreatedEvent, CalendarError> {
            self.requests.borrow_mut().push(event.clone());
            if self.fail.iter().any(|f| *f == event.summary) {
                return Err(CalendarError::Api {
                    status: 500,
                    message: "backend error".into(),
                    details: "{}".into(),
                });
            }
            Ok(CreatedEvent {
                id: Some(format!("ev{}", self.requests.borrow().len())),
                html_link: None,
            })
        }
    }

    fn day_types() -> IndexMap<String, DayType> {
        let workday: DayType = serde_json::from_value(serde_json::json!({
            "activities": [
                {"name": "gym", "start_time": "07:00", "end_time": "08:00"},
                {"name": "work", "start_time": "09:00", "end_time": "17:00"}
            ]
        }))
        .unwrap();
        let mut map = IndexMap::new();
        map.insert("workday".to_string(), DayType { name: "workday".into(), ..workday });
        map
    }

    fn entry(date: &str, day_type: &str) -> CalendarEntry {
        CalendarEntry { date: date.into(), day_type: day_type.into() }
    }

    fn tracked(names: &[&str]) -> AnalyticsConfig {
        let mut cfg = AnalyticsConfig::new();
        for name in names {
            cfg.insert(TrackedActivity { name: name.to_string(), wage: None });
        }
        cfg
    }

    async fn run(service: &FakeCalendar, entries: &[CalendarEntry], cfg: &AnalyticsConfig) -> PublishOutcome {
        Publisher::new(service, "primary", Tz::Europe__Paris)
            .publish(entries, &day_types(), cfg)
            .await
    }

    #[tokio::test]
    async fn one_event_per_activity_in_order() {
        let service = FakeCalendar::default();
        let outcome = run(&service, &[entry("2024-06-01", "workday")], &tracked(&["gym"])).await;

        let requests = service.requests.borrow();
        let summaries: Vec<&str> = requests.iter().map(|r| r.summary.as_str()).collect();
        assert_eq!(summaries, vec!["gym", "work"]);
        assert_eq!(requests[0].start.date_time, "2024-06-01T07:00:00+02:00");
        assert_eq!(outcome.created, 2);
        assert_eq!(outcome.accumulator.hours("gym"), Some(1.0));
    }

    #[tokio::test]
    async fn unknown_day_type_skips_entry_without_side_effects() {
        let service = FakeCalendar::default();
        let entries = [entry("2024-06-01", "holiday"), entry("2024-06-02", "workday")];
        let outcome = run(&service, &entries, &tracked(&["gym", "work"])).await;

        assert_eq!(outcome.skipped_entries, 1);
        assert_eq!(service.requests.borrow().len(), 2);
        assert!(service
            .requests
            .borrow()
            .iter()
            .all(|r| r.start.date_time.starts_with("2024-06-02")));
        assert_eq!(outcome.accumulator.hours("work"), Some(8.0));
    }

    #[tokio::test]
    async fn failed_insert_still_counts_hours_and_continues() {
        let service = FakeCalendar { fail: vec!["gym"], ..Default::default() };
        let entries = [entry("2024-06-01", "workday"), entry("2024-06-02", "workday")];
        let outcome = run(&service, &entries, &tracked(&["gym"])).await;

        assert_eq!(service.requests.borrow().len(), 4);
        assert_eq!(outcome.failed, 2);
        assert_eq!(outcome.created, 2);
        assert_eq!(outcome.accumulator.hours("gym"), Some(2.0));
    }

    #[tokio::test]
    async fn spring_forward_gap_still_creates_event() {
        let service = FakeCalendar::default();
        let mut types = day_types();
        types.insert(
            "night".into(),
            serde_json::from_value::<DayType>(serde_json::json!({
                "activities": [{"name": "shift", "start_time": "02:00", "end_time": "04:00"}]
            }))
            .unwrap(),
        );

        let outcome = Publisher::new(&service, "primary", Tz::Europe__Paris)
            .publish(&[entry("2024-03-31", "night")], &types, &tracked(&["shift"]))
            .await;

        let requests = service.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].start.date_time, "2024-03-31T03:00:00+02:00");
        assert_eq!(requests[0].end.date_time, "2024-03-31T04:00:00+02:00");
        assert_eq!(outcome.created, 1);
        assert_eq!(outcome.accumulator.hours("shift"), Some(2.0));
    }

    #[tokio::test]
    async fn bad_date_fails_only_its_own_entry() {
        let service = FakeCalendar::default();
        let entries = [
            entry("2024-06-01", "workday"),
            entry("2024-02-30", "workday"),
            entry("2024-06-03", "workday"),
        ];
        let outcome = run(&service, &entries, &tracked(&["gym", "work"])).await;

        let requests = service.requests.borrow();
        assert_eq!(requests.len(), 4);
        assert!(requests[0].start.date_time.starts_with("2024-06-01"));
        assert!(requests[2].start.date_time.starts_with("2024-06-03"));
        assert_eq!(outcome.created, 4);
        assert_eq!(outcome.failed, 2);
        assert_eq!(outcome.skipped_entries, 0);
        assert_eq!(outcome.accumulator.hours("gym"), Some(3.0));
        assert_eq!(outcome.accumulator.hours("work"), Some(24.0));
    }
}
