//! Resolved action inputs.

use crate::error::{Result, ValidateError};
use crate::output::OutputType;
use serde_json::json;
use std::fmt;
use std::path::PathBuf;

/// Everything one run needs to know about what to validate and where to report
#[derive(Debug, Clone)]
pub struct ActionInputs {
    /// Clone URL of the target repository
    pub repository_url: String,
    /// Branch of the target to validate; default branch when `None`
    pub repository_branch: Option<String>,
    /// Shell command run in the target after validation passes
    pub test_command: Option<String>,
    /// Label that acknowledges known findings
    pub remediation_label: Option<String>,
    /// Token for label lookup and comments
    pub github_token: Option<String>,
    /// Checkout of the source repository
    pub source_dir: PathBuf,
    pub output_strategy: Vec<OutputType>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl ActionInputs {
    /// Validate raw inputs and derive the output strategy.
    ///
    /// Terminal and job summaries are always requested; a pull request comment
    /// is added when a token is available. `require_comment` makes a missing
    /// token fatal.
    pub fn new(
        repository_url: String,
        repository_branch: Option<String>,
        test_command: Option<String>,
        remediation_label: Option<String>,
        github_token: Option<String>,
        source_dir: PathBuf,
        require_comment: bool,
    ) -> Result<Self> {
        let repository_url = non_empty(Some(repository_url))
            .ok_or_else(|| ValidateError::MissingInput("repository".to_string()))?;
        let github_token = non_empty(github_token);

        let mut output_strategy = vec![OutputType::TerminalSummary, OutputType::JobSummary];
        if github_token.is_some() {
            output_strategy.push(OutputType::Comment);
        } else if require_comment {
            return Err(ValidateError::MissingCredential(
                "a token is required to post pull request comments".to_string(),
            ));
        } else {
            log::info!("No token provided, pull request comment will be skipped");
        }

        Ok(Self {
            repository_url,
            repository_branch: non_empty(repository_branch),
            test_command: non_empty(test_command),
            remediation_label: non_empty(remediation_label),
            github_token,
            source_dir,
            output_strategy,
        })
    }

    pub fn should_run_target_tests(&self) -> bool {
        self.test_command.is_some()
    }

    pub fn requested_strategy(&self, output: OutputType) -> bool {
        self.output_strategy.contains(&output)
    }

    /// Repository name derived from the clone URL
    pub fn repository_name(&self) -> String {
        repository_name(&self.repository_url)
    }
}

/// Last path segment of a clone URL without `.git`.
///
/// Handles `https://host/org/repo.git`, `git@host:org/repo.git` and local paths.
pub fn repository_name(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    let last = trimmed
        .rsplit(|c: char| c == '/' || c == ':')
        .next()
        .unwrap_or(trimmed);
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() {
        trimmed.to_string()
    } else {
        name.to_string()
    }
}

impl fmt::Display for ActionInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outputs: Vec<String> = self.output_strategy.iter().map(|o| o.to_string()).collect();
        let description = json!({
            "target": {
                "repository": self.repository_url,
                "branch": self.repository_branch,
            },
            "actions": {
                "validation": true,
                "custom_test_command": self.should_run_target_tests(),
                "remediation_label": self.remediation_label,
            },
            "output": outputs,
        });
        write!(f, "{}", description)
    }
}
