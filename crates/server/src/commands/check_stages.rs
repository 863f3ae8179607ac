use clap::Args;
use pr_dashboard_core::stages::{ClassificationMode, StageClassifier};
use tracing::{instrument, warn};

use crate::commands::{load_config, GlobalOptions};
use crate::errors::ServerError;

#[cfg(test)]
#[path = "check_stages_tests.rs"]
mod tests;

/// Arguments for the check-stages command
#[derive(Args, Debug)]
pub struct CheckStagesArgs {
    /// Check run names to classify
    #[arg(required = true)]
    pub names: Vec<String>,
}

/// Prints the stages each check run name is filed under and reports names
/// that match more than one stage rule.
#[instrument(skip(options))]
pub async fn execute(args: CheckStagesArgs, options: &GlobalOptions) -> Result<(), ServerError> {
    let config = load_config(options)?;
    let classifier = config.stage_classifier()?;

    print!("{}", describe_stage_matches(&classifier, &args.names));

    let ambiguities = classifier.find_ambiguities(args.names.iter().map(String::as_str));
    for ambiguity in &ambiguities {
        warn!(
            check_run = ambiguity.check_run.as_str(),
            stages = ambiguity.stages.join(", "),
            "Check run matches more than one stage rule"
        );
    }

    Ok(())
}

/// Describes, one line per name, the stages a check run is filed under.
pub fn describe_stage_matches(classifier: &StageClassifier, names: &[String]) -> String {
    let mut report = String::new();
    for name in names {
        let filed = classifier.classify(name);
        let filed_text = if filed.is_empty() {
            "(no stage)".to_string()
        } else {
            filed.join(", ")
        };
        report.push_str(&format!("{}: {}", name, filed_text));

        let matching = classifier.matching_stages(name);
        if matching.len() > 1 && classifier.mode() == ClassificationMode::FirstMatch {
            report.push_str(&format!(" (also matches: {})", matching[1..].join(", ")));
        }
        report.push('\n');
    }
    report
}
