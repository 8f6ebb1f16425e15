//! Error types for repo-validate
//!
//! Centralized error handling using thiserror. Every variant belongs to exactly
//! one [`ErrorClass`], fixed where the error is constructed.

use thiserror::Error;

/// How a failure is treated by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Setup/configuration defect: aborts the run and bypasses the result model
    Fatal,
    /// Finding produced by a check or test; captured and remediable
    Classified,
    /// Anything else; captured, never remediable
    General,
}

/// A command that exited unsuccessfully.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{command} failed with exit code {}", exit_code_label(.exit_code))]
pub struct CommandError {
    /// The command line as it was run
    pub command: String,
    /// Captured stderr
    pub stderr: String,
    /// Exit code, `None` when the process was killed or timed out
    pub exit_code: Option<i32>,
    /// Suggestion attached by whoever issued the command
    pub hint: Option<String>,
}

fn exit_code_label(code: &Option<i32>) -> String {
    code.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string())
}

impl CommandError {
    pub fn new(command: impl Into<String>, stderr: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self {
            command: command.into(),
            stderr: stderr.into(),
            exit_code,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// All error types that can occur in repo-validate
#[derive(Debug, Error)]
pub enum ValidateError {
    /// No registered validator recognises the directory
    #[error("No supported technology found in {0}")]
    UnsupportedTechnology(String),

    /// Descriptor present but its declaration is missing or malformed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Source module handed to a validator of another ecosystem
    #[error("Source module type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A credential needed for a requested feature is absent
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// A required input is absent or empty
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Pipeline step called out of order
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A check or test command failed
    #[error("{0}")]
    Command(#[from] CommandError),

    /// Cloning the target repository failed
    #[error("Clone failed: {0}")]
    Clone(String),

    /// GitHub API error
    #[error("GitHub error: {0}")]
    GitHub(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ValidateError {
    /// The class this error belongs to
    pub fn class(&self) -> ErrorClass {
        match self {
            ValidateError::UnsupportedTechnology(_)
            | ValidateError::Parse(_)
            | ValidateError::TypeMismatch { .. }
            | ValidateError::MissingCredential(_)
            | ValidateError::MissingInput(_)
            | ValidateError::InvalidState(_) => ErrorClass::Fatal,
            ValidateError::Command(_) => ErrorClass::Classified,
            ValidateError::Clone(_)
            | ValidateError::GitHub(_)
            | ValidateError::Io(_)
            | ValidateError::Json(_)
            | ValidateError::Http(_) => ErrorClass::General,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::Fatal
    }
}

/// Result type alias for repo-validate operations
pub type Result<T> = std::result::Result<T, ValidateError>;
