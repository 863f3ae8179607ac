//! # Stage classification
//!
//! Check runs are grouped into user-defined stages (e.g. "Build", "Test") by
//! ordered pattern rules. A rule matches when its pattern matches the start of
//! the check run name.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::errors::DashboardError;

#[cfg(test)]
#[path = "stages_tests.rs"]
mod tests;

/// How a check run that matches several stage rules is filed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMode {
    /// File the run under the first matching stage only.
    #[default]
    FirstMatch,

    /// File the run under every matching stage.
    AllMatches,
}

/// A check run name that matches more than one stage rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageAmbiguity {
    pub check_run: String,
    pub stages: Vec<String>,
}

/// One stage rule as configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRule {
    pub name: String,
    pub pattern: String,
}

impl StageRule {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    name: String,
    regex: Regex,
}

/// Compiled, ordered stage rules.
///
/// # Examples
///
/// ```
/// use pr_dashboard_core::stages::{ClassificationMode, StageClassifier, StageRule};
///
/// let classifier = StageClassifier::new(
///     &[StageRule::new("Build", "Build"), StageRule::new("Test", ".*Test")],
///     ClassificationMode::FirstMatch,
/// )
/// .unwrap();
///
/// assert_eq!(classifier.classify("Build and Test"), vec!["Build"]);
/// assert!(classifier.classify("Nightly Build").is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct StageClassifier {
    rules: Vec<CompiledRule>,
    mode: ClassificationMode,
}

impl StageClassifier {
    /// Compiles the rules in order.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::InvalidStageRule` for an empty or duplicate stage
    /// name, or a pattern that is not a valid regular expression.
    pub fn new(rules: &[StageRule], mode: ClassificationMode) -> Result<Self, DashboardError> {
        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            if rule.name.trim().is_empty() {
                return Err(DashboardError::InvalidStageRule {
                    stage: rule.name.clone(),
                    message: "stage name must not be empty".to_string(),
                });
            }

            if !seen.insert(rule.name.as_str()) {
                return Err(DashboardError::InvalidStageRule {
                    stage: rule.name.clone(),
                    message: "stage name is used by more than one rule".to_string(),
                });
            }

            // Anchor at the start only: "Build" matches "Build and Test" but
            // not "Nightly Build".
            let regex = Regex::new(&format!("^(?:{})", rule.pattern)).map_err(|e| {
                DashboardError::InvalidStageRule {
                    stage: rule.name.clone(),
                    message: e.to_string(),
                }
            })?;

            compiled.push(CompiledRule {
                name: rule.name.clone(),
                regex,
            });
        }

        Ok(Self {
            rules: compiled,
            mode,
        })
    }

    pub fn mode(&self) -> ClassificationMode {
        self.mode
    }

    /// Stage names in configured order.
    pub fn stage_names(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.name.clone()).collect()
    }

    /// Returns the stages a check run is filed under, according to the mode.
    ///
    /// An empty result means the run is not shown in any stage.
    pub fn classify(&self, check_run_name: &str) -> Vec<&str> {
        match self.mode {
            ClassificationMode::FirstMatch => self
                .rules
                .iter()
                .find(|r| r.regex.is_match(check_run_name))
                .map(|r| vec![r.name.as_str()])
                .unwrap_or_default(),
            ClassificationMode::AllMatches => self.matching_stages(check_run_name),
        }
    }

    /// Returns every stage whose rule matches, regardless of the mode.
    pub fn matching_stages(&self, check_run_name: &str) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|r| r.regex.is_match(check_run_name))
            .map(|r| r.name.as_str())
            .collect()
    }

    /// Reports the check run names that match more than one rule.
    ///
    /// Each name is reported once, in the order first seen.
    pub fn find_ambiguities<'a, I>(&self, check_run_names: I) -> Vec<StageAmbiguity>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut reported = HashSet::new();
        let mut ambiguities = Vec::new();
        for name in check_run_names {
            let stages = self.matching_stages(name);
            if stages.len() > 1 && reported.insert(name) {
                ambiguities.push(StageAmbiguity {
                    check_run: name.to_string(),
                    stages: stages.into_iter().map(str::to_string).collect(),
                });
            }
        }

        ambiguities
    }
}
