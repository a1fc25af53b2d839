//! One full run: load, resolve analytics, publish, summarize.

use tracing::info;

use crate::analytics::{AnalyticsReport, AnalyticsSetup, AnswerProvider};
use crate::calendar::CalendarService;
use crate::config::AppConfig;
use crate::error::Result;
use crate::publisher::{PublishOutcome, Publisher};
use crate::storage::{load_calendar, load_day_types};

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub outcome: PublishOutcome,
    pub report: AnalyticsReport,
}

/// Publish the configured calendar through `service`.
///
/// Returns `None` when the data folder holds no day types; nothing is
/// prompted or published in that case.
pub async fn run<S: CalendarService>(
    config: &AppConfig,
    service: &S,
    answers: &mut dyn AnswerProvider,
) -> Result<Option<RunSummary>> {
    let day_types = load_day_types(&config.json_folder)?;
    let entries = load_calendar(&config.json_folder)?;
    info!(
        "Loaded {} day types and {} calendar entries",
        day_types.len(),
        entries.len()
    );

    let Some(sample) = day_types.values().next() else {
        info!("No day types found in JSON folder.");
        return Ok(None);
    };

    let analytics = AnalyticsSetup::new(&config.analytics_config_path).resolve(sample, answers)?;

    let outcome = Publisher::new(service, &config.calendar_id, config.time_zone)
        .publish(&entries, &day_types, &analytics)
        .await;
    info!(
        "Publishing finished: {} created, {} failed, {} entries skipped",
        outcome.created, outcome.failed, outcome.skipped_entries
    );

    let report = AnalyticsReport::build(&outcome.accumulator, &analytics);
    Ok(Some(RunSummary { outcome, report }))
}
