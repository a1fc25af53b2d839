use indexmap::IndexMap;

use super::AnalyticsConfig;

/// Running hours per tracked activity.
///
/// Only names present in the config when the accumulator is created are
/// ever recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulator {
    hours: IndexMap<String, f64>,
}

impl Accumulator {
    /// One zeroed slot per tracked activity.
    pub fn new(config: &AnalyticsConfig) -> Self {
        Self {
            hours: config.names().map(|n| (n.to_string(), 0.0)).collect(),
        }
    }

    /// Add `hours` to `name`'s total. Returns false for untracked names.
    pub fn record(&mut self, name: &str, hours: f64) -> bool {
        match self.hours.get_mut(name) {
            Some(total) => {
                *total += hours;
                true
            }
            None => false,
        }
    }

    pub fn hours(&self, name: &str) -> Option<f64> {
        self.hours.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.hours.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
