use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod cli;

use cli::Cli;
use repo_validate::action::Action;
use repo_validate::config::Config;
use repo_validate::github::{GitHubClient, GitHubContext};
use repo_validate::inputs::ActionInputs;
use repo_validate::output::{self, CommentSink, OutputType, Reporter, workflow};
use repo_validate::remediation::LabelSource;
use repo_validate::runner::{CommandRunner, ProcessRunner};
use repo_validate::validation::ValidationManager;

fn setup_logging(verbose: bool, config: &Config) {
    let level = if verbose {
        "debug"
    } else {
        config.log_level.as_deref().unwrap_or("info")
    };

    // stdout carries workflow commands and the summary, logs go to stderr
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    if verbose {
        builder.parse_filters("debug");
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn build_github_client(inputs: &ActionInputs, config: &Config) -> Option<GitHubClient> {
    let token = inputs.github_token.as_ref()?;
    let Some(context) = GitHubContext::from_env(&config.github.api_url) else {
        warn!("GITHUB_REPOSITORY is not set, GitHub features disabled");
        return None;
    };
    if context.pr_number.is_none() {
        warn!("No pull request associated with this run, label and comment features disabled");
    }

    match GitHubClient::new(
        token.clone(),
        context,
        &config.github.user_agent,
        Duration::from_millis(config.github.timeout_ms),
    ) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("Failed to create GitHub client: {}", e);
            None
        }
    }
}

fn output_strategy(inputs: &ActionInputs, config: &Config) -> Vec<OutputType> {
    inputs
        .output_strategy
        .iter()
        .copied()
        .filter(|o| match o {
            OutputType::TerminalSummary => config.output.terminal_summary,
            OutputType::JobSummary => config.output.job_summary,
            OutputType::Comment => true,
        })
        .collect()
}

/// Run the action; returns whether the run passed
async fn run_application(cli: &Cli, config: &Config) -> Result<bool> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let inputs = ActionInputs::new(
        cli.repository.clone(),
        cli.branch.clone(),
        cli.test_command.clone(),
        cli.remediation_label.clone(),
        cli.token.clone(),
        cli.source_dir.clone(),
        cli.comment,
    )?;

    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner::new());
    let manager = ValidationManager::with_default_validators(runner.clone(), config.runner.timeout_ms);
    let github = build_github_client(&inputs, config);

    let reporter = Reporter::new(output_strategy(&inputs, config))
        .with_summary_path(std::env::var_os("GITHUB_STEP_SUMMARY").map(PathBuf::from))
        .with_json_report(config.output.json_report.clone());
    let target_name = inputs.repository_name();

    let mut action = Action::new(inputs, runner, manager)
        .with_timeouts(config.runner.timeout_ms, config.runner.clone_timeout_ms);
    let results = action
        .execute(github.as_ref().map(|c| c as &dyn LabelSource))
        .await?;
    info!(
        "Validation finished in {}s",
        (chrono::Utc::now() - results.started_at()).num_seconds()
    );

    reporter
        .report(
            &target_name,
            &results,
            github.as_ref().map(|c| c as &dyn CommentSink),
        )
        .await;

    if results.has_not_resolved_errors() {
        workflow::error(&output::get_action_failed_message(&results));
        return Ok(false);
    }

    info!("Repository validation succeeded");
    Ok(true)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(cli.is_verbose(), &config);
    info!("Starting with config from: {:?}", cli.config);

    match run_application(&cli, &config).await {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            workflow::error(&e.to_string());
            Err(e.wrap_err("Application failed"))
        }
    }
}
