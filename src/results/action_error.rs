//! Classified findings and general failures.

use crate::error::CommandError;
use serde::Serialize;

/// Classification of an action error. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionErrorKind {
    /// Technology check failure (e.g. `go vet`)
    Validation,
    /// Custom test command failure
    Test,
}

impl ActionErrorKind {
    pub const ALL: [ActionErrorKind; 2] = [ActionErrorKind::Validation, ActionErrorKind::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionErrorKind::Validation => "validation",
            ActionErrorKind::Test => "test",
        }
    }
}

impl std::fmt::Display for ActionErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classified, potentially remediable finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionError {
    kind: ActionErrorKind,
    issue: String,
    std_err: Option<String>,
    hint: Option<String>,
    remediation_evidence: Vec<String>,
}

impl ActionError {
    pub fn new(kind: ActionErrorKind, issue: impl Into<String>) -> Self {
        Self {
            kind,
            issue: issue.into(),
            std_err: None,
            hint: None,
            remediation_evidence: Vec::new(),
        }
    }

    /// Build from a failed command, keeping its stderr and hint
    pub fn from_command(kind: ActionErrorKind, err: CommandError) -> Self {
        let issue = err.to_string();
        let std_err = Some(err.stderr).filter(|s| !s.trim().is_empty());
        Self {
            kind,
            issue,
            std_err,
            hint: err.hint,
            remediation_evidence: Vec::new(),
        }
    }

    pub fn kind(&self) -> ActionErrorKind {
        self.kind
    }

    pub fn issue(&self) -> &str {
        &self.issue
    }

    pub fn std_err(&self) -> Option<&str> {
        self.std_err.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn remediation_evidence(&self) -> &[String] {
        &self.remediation_evidence
    }

    /// Attach a hint. No-op returning `false` if one is already set.
    pub fn set_hint(&mut self, hint: impl Into<String>) -> bool {
        if self.hint.is_some() {
            return false;
        }
        self.hint = Some(hint.into());
        true
    }

    pub fn add_remediation_evidence(&mut self, evidence: impl Into<String>) {
        self.remediation_evidence.push(evidence.into());
    }

    /// Resolved once any remediation evidence exists
    pub fn is_resolved(&self) -> bool {
        !self.remediation_evidence.is_empty()
    }
}

/// A failure outside the classification; always counts against the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralError {
    message: String,
}

impl GeneralError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for GeneralError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_command() {
        let cmd = CommandError::new("go vet ./...", "undefined: Foo", Some(1)).with_hint("fix it");
        let err = ActionError::from_command(ActionErrorKind::Validation, cmd);
        assert_eq!(err.kind(), ActionErrorKind::Validation);
        assert_eq!(err.issue(), "go vet ./... failed with exit code 1");
        assert_eq!(err.std_err(), Some("undefined: Foo"));
        assert_eq!(err.hint(), Some("fix it"));
        assert!(!err.is_resolved());
    }

    #[test]
    fn test_from_command_blank_stderr() {
        let cmd = CommandError::new("sh -c make test", "  \n", Some(2));
        let err = ActionError::from_command(ActionErrorKind::Test, cmd);
        assert_eq!(err.std_err(), None);
    }

    #[test]
    fn test_set_hint_is_single_assignment() {
        let mut err = ActionError::new(ActionErrorKind::Test, "tests failed");
        assert!(err.set_hint("first"));
        assert!(!err.set_hint("second"));
        assert_eq!(err.hint(), Some("first"));
    }

    #[test]
    fn test_resolution_is_monotonic() {
        let mut err = ActionError::new(ActionErrorKind::Validation, "vet failed");
        assert!(!err.is_resolved());
        err.add_remediation_evidence("label found");
        assert!(err.is_resolved());
        err.add_remediation_evidence("label found");
        assert!(err.is_resolved());
        assert_eq!(err.remediation_evidence().len(), 2);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ActionErrorKind::Validation.to_string(), "validation");
        assert_eq!(ActionErrorKind::Test.to_string(), "test");
    }

    #[test]
    fn test_general_error_display() {
        let err = GeneralError::new("Clone failed: not found");
        assert_eq!(err.to_string(), "Clone failed: not found");
        assert_eq!(err.message(), "Clone failed: not found");
    }
}
