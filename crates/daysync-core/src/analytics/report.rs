use std::fmt;

use super::{Accumulator, AnalyticsConfig};

const RULE_WIDTH: usize = 60;

/// Hours (and earnings, for paid activities) for one tracked activity.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    pub activity: String,
    pub hours: f64,
    pub earnings: Option<f64>,
}

/// End-of-run summary, in config order.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsReport {
    pub lines: Vec<ReportLine>,
    pub total_earnings: f64,
}

impl AnalyticsReport {
    pub fn build(accumulator: &Accumulator, config: &AnalyticsConfig) -> Self {
        let mut total_earnings = 0.0;
        let lines = config
            .iter()
            .map(|(activity, tracked)| {
                let hours = accumulator.hours(activity).unwrap_or(0.0);
                let earnings = tracked.wage.map(|wage| hours * wage);
                if let Some(e) = earnings {
                    total_earnings += e;
                }
                ReportLine {
                    activity: activity.to_string(),
                    hours,
                    earnings,
                }
            })
            .collect();

        Self {
            lines,
            total_earnings,
        }
    }
}

impl fmt::Display for AnalyticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(f, "{rule}")?;
        writeln!(f, "Analytics Summary")?;
        writeln!(f, "{rule}")?;
        for line in &self.lines {
            write!(
                f,
                "  Total time spent on {}: {:.2} hours",
                line.activity, line.hours
            )?;
            match line.earnings {
                Some(e) => writeln!(f, ", Earnings: €{e:.2}")?,
                None => writeln!(f)?,
            }
        }
        if self.total_earnings > 0.0 {
            writeln!(f, "  Total earnings: €{:.2}", self.total_earnings)?;
        }
        writeln!(f, "{rule}")
    }
}
