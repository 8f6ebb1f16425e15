//! Reporting sinks: terminal, job summary, pull request comment, JSON report.
//!
//! Every sink is best-effort. A failing sink logs a warning and never changes
//! the outcome of the run.

use crate::error::Result;
use crate::output::render::{self, COMMENT_MARKER};
use crate::results::ActionResults;
use async_trait::async_trait;
use colored::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Output channels a run can report to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    TerminalSummary,
    JobSummary,
    Comment,
}

impl std::fmt::Display for OutputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OutputType::TerminalSummary => "terminal summary",
            OutputType::JobSummary => "job summary",
            OutputType::Comment => "comment",
        };
        write!(f, "{}", s)
    }
}

/// Destination for the tagged pull request comment
#[async_trait]
pub trait CommentSink: Send + Sync {
    async fn upsert_comment(&self, marker: &str, body: &str) -> Result<()>;
}

/// Writes the rendered results to every requested channel
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    strategies: Vec<OutputType>,
    summary_path: Option<PathBuf>,
    json_report: Option<PathBuf>,
}

impl Reporter {
    pub fn new(strategies: Vec<OutputType>) -> Self {
        Self {
            strategies,
            summary_path: None,
            json_report: None,
        }
    }

    /// File the job summary is appended to (`GITHUB_STEP_SUMMARY`)
    pub fn with_summary_path(mut self, path: Option<PathBuf>) -> Self {
        self.summary_path = path;
        self
    }

    pub fn with_json_report(mut self, path: Option<PathBuf>) -> Self {
        self.json_report = path;
        self
    }

    pub fn requested(&self, output: OutputType) -> bool {
        self.strategies.contains(&output)
    }

    pub async fn report(
        &self,
        target_name: &str,
        results: &ActionResults,
        comments: Option<&dyn CommentSink>,
    ) {
        if self.requested(OutputType::TerminalSummary) {
            print_summary(results);
        }

        if self.requested(OutputType::JobSummary) {
            match &self.summary_path {
                Some(path) => {
                    let markdown = render::generate_markdown(target_name, results);
                    if let Err(e) = append_file(path, &markdown).await {
                        log::warn!("Failed to write job summary to {}: {}", path.display(), e);
                    }
                }
                None => log::debug!("No job summary file available, skipping job summary"),
            }
        }

        if self.requested(OutputType::Comment) {
            self.post_comment(target_name, results, comments).await;
        }

        if let Some(path) = &self.json_report {
            if let Err(e) = write_json(path, results).await {
                log::warn!("Failed to write JSON report to {}: {}", path.display(), e);
            }
        }
    }

    async fn post_comment(
        &self,
        target_name: &str,
        results: &ActionResults,
        comments: Option<&dyn CommentSink>,
    ) {
        if !results.has_action_errors() {
            log::info!("No findings to report, skipping pull request comment");
            return;
        }
        let Some(sink) = comments else {
            log::warn!("Pull request comment requested but no GitHub client available");
            return;
        };
        let body = render::generate_comment(target_name, results);
        if let Err(e) = sink.upsert_comment(COMMENT_MARKER, &body).await {
            log::warn!("Failed to post pull request comment: {}", e);
        }
    }
}

fn print_summary(results: &ActionResults) {
    let summary = render::generate_summary(results);
    let colored = if results.has_not_resolved_errors() {
        summary.yellow()
    } else {
        summary.green()
    };
    println!("{}", colored);
}

async fn append_file(path: &Path, content: &str) -> Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(content.as_bytes()).await?;
    file.write_all(b"\n").await?;
    file.flush().await?;
    Ok(())
}

async fn write_json(path: &Path, results: &ActionResults) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}
