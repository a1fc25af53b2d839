//! # daysync core library
//!
//! Turns locally authored day templates into calendar events and tallies
//! the time (and money) spent per activity.
//!
//! ## Architecture
//!
//! - **Config**: paths and calendar settings assembled from the environment
//! - **Storage**: day-type files, `calendar.json` and other flat JSON files
//! - **Integrations**: OAuth2 credentials and the Google Calendar backend
//! - **Publisher**: expands calendar entries into one event per activity
//! - **Analytics**: per-activity tracking config, hour accumulation, summary
//!
//! ## Key Components
//!
//! - [`CredentialManager`]: cached, refreshed or freshly authorized tokens
//! - [`CalendarService`]: the single remote operation the publisher needs
//! - [`Publisher`]: sequential event creation with per-event recovery
//! - [`AnalyticsSetup`]: loads or interactively builds the analytics config
//! - [`pipeline::run`]: everything after credentials, in order

pub mod analytics;
pub mod calendar;
pub mod config;
pub mod error;
pub mod integrations;
pub mod pipeline;
pub mod publisher;
pub mod schedule;
pub mod storage;

pub use analytics::{
    Accumulator, AnalyticsConfig, AnalyticsReport, AnalyticsSetup, AnswerProvider,
    ConsoleAnswers, ScriptedAnswers, TrackedActivity,
};
pub use calendar::{CalendarService, CreatedEvent, EventRequest, EventTime};
pub use config::AppConfig;
pub use error::{CalendarError, ConfigError, CoreError, OAuthError, PromptError, ValidationError};
pub use integrations::{CredentialManager, Credentials, GoogleCalendar};
pub use publisher::{PublishOutcome, Publisher};
pub use schedule::{Activity, CalendarEntry, DayType};
