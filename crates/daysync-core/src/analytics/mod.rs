//! Per-activity time tracking.
//!
//! - [`AnalyticsConfig`]: which activities to track and their hourly wage
//! - [`setup`]: loading the config, or building it interactively on first run
//! - [`Accumulator`]: hours summed while publishing
//! - [`AnalyticsReport`]: the end-of-run summary

pub mod accumulator;
pub mod report;
pub mod setup;

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::{read_json, write_json};

pub use accumulator::Accumulator;
pub use report::{AnalyticsReport, ReportLine};
pub use setup::{build_config, AnalyticsSetup, AnswerProvider, ConsoleAnswers, ScriptedAnswers};

/// One tracked activity. `wage` is per hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedActivity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wage: Option<f64>,
}

/// Tracked activities keyed by activity name, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalyticsConfig {
    activities: IndexMap<String, TrackedActivity>,
}

impl AnalyticsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `activity.name`. A replaced entry
    /// keeps its original position.
    pub fn insert(&mut self, activity: TrackedActivity) {
        self.activities.insert(activity.name.clone(), activity);
    }

    pub fn get(&self, name: &str) -> Option<&TrackedActivity> {
        self.activities.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.activities.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.activities.keys().map(String::as_str)
    }

    /// Entries as `(key, activity)`. The key is what publishing records
    /// hours under, even when a hand-edited file gives a different `name`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TrackedActivity)> {
        self.activities.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }
}
