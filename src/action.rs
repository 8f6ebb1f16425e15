//! End-to-end run: extract source, clone target, install, validate, test,
//! remediate.
//!
//! Fatal errors abort the run and are returned as `Err`. Findings and general
//! failures are captured in the returned [`ActionResults`].

use crate::error::{Result, ValidateError};
use crate::inputs::ActionInputs;
use crate::output::workflow::{self, Group};
use crate::remediation::{LabelSource, RemediationManager};
use crate::results::ActionResults;
use crate::runner::{CommandRunner, CommandSpec, DEFAULT_TIMEOUT_MS};
use crate::validation::ValidationManager;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const CLONE_DIR_PREFIX: &str = "validate-repo-";

/// Annotation text pointing at a local reproduction of a failed test run
pub fn reproduce_message(command: &str, repository_name: &str) -> String {
    format!(
        "Reproduce locally by running `{}` in {} with the source module linked in",
        command, repository_name
    )
}

pub struct Action {
    inputs: ActionInputs,
    runner: Arc<dyn CommandRunner>,
    manager: ValidationManager,
    test_timeout_ms: u64,
    clone_timeout_ms: u64,
    clone_dir: Option<TempDir>,
}

impl Action {
    pub fn new(inputs: ActionInputs, runner: Arc<dyn CommandRunner>, manager: ValidationManager) -> Self {
        Self {
            inputs,
            runner,
            manager,
            test_timeout_ms: DEFAULT_TIMEOUT_MS,
            clone_timeout_ms: DEFAULT_TIMEOUT_MS,
            clone_dir: None,
        }
    }

    pub fn with_timeouts(mut self, test_timeout_ms: u64, clone_timeout_ms: u64) -> Self {
        self.test_timeout_ms = test_timeout_ms;
        self.clone_timeout_ms = clone_timeout_ms;
        self
    }

    pub fn inputs(&self) -> &ActionInputs {
        &self.inputs
    }

    pub fn manager(&self) -> &ValidationManager {
        &self.manager
    }

    /// Directory the target was cloned into, once cloned
    pub fn target_dir(&self) -> Option<&Path> {
        self.clone_dir.as_ref().map(|d| d.path())
    }

    /// Run the pipeline and the remediation check
    pub async fn execute(&mut self, labels: Option<&dyn LabelSource>) -> Result<ActionResults> {
        let mut results = self.run().await?;

        let _group = Group::start("Checking remediation...");
        RemediationManager::check_remediation(
            &mut results,
            self.inputs.remediation_label.as_deref(),
            labels,
        )
        .await;
        Ok(results)
    }

    /// Run extraction, clone, install, validation and tests
    pub async fn run(&mut self) -> Result<ActionResults> {
        let mut results = ActionResults::new();
        log::info!("Inputs: {}", self.inputs);

        {
            let _group = Group::start("Parsing source repository");
            self.manager.init(&self.inputs.source_dir).await?;
        }

        let target = match self.clone_target().await {
            Ok(dir) => dir,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                results.append_general_error(e);
                return Ok(results);
            }
        };

        let installed = {
            let _group = Group::start("Preparing target repository");
            self.manager.install_target(&target).await
        };
        match installed {
            Ok(_) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                results.append_general_error(e);
                return Ok(results);
            }
        }

        let validation = {
            let _group = Group::start("Validating...");
            self.manager.validate_target(&target).await
        };

        match validation {
            Ok(_) => {
                if let Some(command) = self.inputs.test_command.clone() {
                    self.run_tests(&target, &command, &mut results).await?;
                }
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => results.append_validation_error(e),
        }

        Ok(results)
    }

    async fn clone_target(&mut self) -> Result<PathBuf> {
        let _group = Group::start("Cloning target repository");

        let dir = tempfile::Builder::new().prefix(CLONE_DIR_PREFIX).tempdir()?;
        let path = dir.path().to_path_buf();

        let mut spec = CommandSpec::new("git").arg("clone");
        if let Some(branch) = &self.inputs.repository_branch {
            spec = spec.args(["--branch", branch.as_str(), "--single-branch"]);
        }
        let spec = spec
            .arg(self.inputs.repository_url.clone())
            .arg(path.display().to_string())
            .timeout_ms(self.clone_timeout_ms);

        log::info!(
            "Cloning {}{} to {}",
            self.inputs.repository_url,
            self.inputs
                .repository_branch
                .as_ref()
                .map(|b| format!(" (@{})", b))
                .unwrap_or_default(),
            path.display()
        );

        self.runner.run(&spec).await.map_err(|e| match e {
            ValidateError::Command(cmd) => ValidateError::Clone(if cmd.stderr.trim().is_empty() {
                cmd.to_string()
            } else {
                format!("{}: {}", cmd, cmd.stderr.trim())
            }),
            other => other,
        })?;

        log::info!("Cloned target repository to {}", path.display());
        self.clone_dir = Some(dir);
        Ok(path)
    }

    async fn run_tests(&mut self, target: &Path, command: &str, results: &mut ActionResults) -> Result<()> {
        self.manager.begin_tests()?;
        let _group = Group::start("Running tests...");

        let spec = CommandSpec::shell(command)
            .cwd(target)
            .timeout_ms(self.test_timeout_ms);
        match self.runner.run(&spec).await {
            Ok(_) => {
                log::info!("Tests passed");
                Ok(())
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                results.append_test_error(e);
                workflow::warning(&reproduce_message(command, &self.inputs.repository_name()));
                Ok(())
            }
        }
    }
}
