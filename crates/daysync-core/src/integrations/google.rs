//! Google Calendar backend.
//!
//! Inserts events through the Calendar v3 REST API with the bearer token
//! from [`Credentials`].

use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::oauth::Credentials;
use crate::calendar::{CalendarService, CreatedEvent, EventRequest};
use crate::error::CalendarError;

pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar client bound to one access token.
pub struct GoogleCalendar {
    client: Client,
    base_url: String,
    access_token: String,
}

impl GoogleCalendar {
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            client: Client::new(),
            base_url: CALENDAR_API_BASE.to_string(),
            access_token: credentials.token.clone(),
        }
    }

    /// Point the client at another API root (used against mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn events_url(&self, calendar_id: &str) -> Result<Url, CalendarError> {
        let invalid = || CalendarError::InvalidBaseUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["calendars", calendar_id, "events"]);
        Ok(url)
    }
}

/// Pull `error.message` out of a Google API error body.
fn api_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value["error"]["message"].as_str().map(String::from)
}

impl CalendarService for GoogleCalendar {
    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &EventRequest,
    ) -> Result<CreatedEvent, CalendarError> {
        let resp = self
            .client
            .post(self.events_url(calendar_id)?)
            .bearer_auth(&self.access_token)
            .json(event)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(CalendarError::Api {
                status: status.as_u16(),
                message: api_error_message(&body).unwrap_or_else(|| status.to_string()),
                details: body,
            });
        }

        // The event exists once the API says so; the body is informational.
        Ok(serde_json::from_str(&body).unwrap_or_else(|e| {
            debug!("unreadable insert response ({e}): {body}");
            CreatedEvent::default()
        }))
    }
}
