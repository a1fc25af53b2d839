//! First-run analytics setup.
//!
//! [`build_config`] asks, for each candidate activity, whether to track it
//! and at what wage. Questions go through an [`AnswerProvider`] so the flow
//! runs the same against the console or a scripted list of answers.

use std::collections::VecDeque;
use std::path::PathBuf;

use inquire::Text;
use tracing::info;

use super::{AnalyticsConfig, TrackedActivity};
use crate::error::{PromptError, Result};
use crate::schedule::DayType;

/// Source of free-text answers to setup questions.
pub trait AnswerProvider {
    fn ask(&mut self, question: &str) -> Result<String, PromptError>;
}

/// Reads answers from the terminal.
#[derive(Debug, Default)]
pub struct ConsoleAnswers;

impl AnswerProvider for ConsoleAnswers {
    fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        Ok(Text::new(question).prompt()?)
    }
}

/// Replays a fixed list of answers and records every question asked.
#[derive(Debug, Default)]
pub struct ScriptedAnswers {
    answers: VecDeque<String>,
    pub asked: Vec<String>,
}

impl ScriptedAnswers {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }
}

impl AnswerProvider for ScriptedAnswers {
    fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        self.asked.push(question.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| PromptError::NoAnswer(question.to_string()))
    }
}

fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

fn parse_wage(activity: &str, answer: &str) -> Result<f64, PromptError> {
    answer
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|w| w.is_finite())
        .ok_or_else(|| PromptError::InvalidWage {
            activity: activity.to_string(),
            answer: answer.to_string(),
        })
}

/// Build a config by asking about each name in turn.
///
/// Names are not de-duplicated: a repeated name is asked about again and
/// the last "yes" wins.
pub fn build_config<'a, I>(names: I, answers: &mut dyn AnswerProvider) -> Result<AnalyticsConfig>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut config = AnalyticsConfig::new();
    for name in names {
        let track = answers.ask(&format!(
            "Do you want to track analytics for '{name}'? (yes/no)"
        ))?;
        if !is_yes(&track) {
            continue;
        }

        let paid = answers.ask(&format!("Is '{name}' a paid activity? (yes/no)"))?;
        let wage = if is_yes(&paid) {
            let raw = answers.ask(&format!("Enter the hourly wage for '{name}':"))?;
            Some(parse_wage(name, &raw)?)
        } else {
            None
        };

        config.insert(TrackedActivity {
            name: name.to_string(),
            wage,
        });
    }
    Ok(config)
}

/// Resolves the analytics config stored at a fixed path.
#[derive(Debug, Clone)]
pub struct AnalyticsSetup {
    path: PathBuf,
}

impl AnalyticsSetup {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the stored config, or build one from `sample`'s activities,
    /// save it and return what was saved.
    ///
    /// An existing file is returned as-is, even if it names activities no
    /// day type has any more.
    pub fn resolve(
        &self,
        sample: &DayType,
        answers: &mut dyn AnswerProvider,
    ) -> Result<AnalyticsConfig> {
        if self.path.exists() {
            return AnalyticsConfig::load(&self.path);
        }

        info!("Setting up analytics configuration...");
        let names = sample.activities.iter().map(|a| a.name.as_str());
        let config = build_config(names, answers)?;
        config.save(&self.path)?;
        info!("Analytics configuration saved to {}", self.path.display());

        AnalyticsConfig::load(&self.path)
    }
}
