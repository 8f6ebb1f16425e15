//! Run-scoped result model
//!
//! [`ActionResults`] collects every finding of a run. It is mutated by the
//! pipeline and the remediation step, then handed read-only to the renderers.

pub mod action_error;

pub use action_error::{ActionError, ActionErrorKind, GeneralError};

use crate::error::ValidateError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Aggregate of action errors and general errors for one run
#[derive(Debug, Clone, Serialize)]
pub struct ActionResults {
    action_errors: Vec<ActionError>,
    general_errors: Vec<GeneralError>,
    started_at: DateTime<Utc>,
}

impl Default for ActionResults {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionResults {
    pub fn new() -> Self {
        Self {
            action_errors: Vec::new(),
            general_errors: Vec::new(),
            started_at: Utc::now(),
        }
    }

    /// Record a failure of the technology checks
    pub fn append_validation_error(&mut self, err: ValidateError) {
        self.append_classified(ActionErrorKind::Validation, err);
    }

    /// Record a failure of the custom test command
    pub fn append_test_error(&mut self, err: ValidateError) {
        self.append_classified(ActionErrorKind::Test, err);
    }

    /// Record a failure that is never remediable
    pub fn append_general_error(&mut self, err: ValidateError) {
        log::error!("{}", err);
        self.general_errors.push(GeneralError::new(err.to_string()));
    }

    fn append_classified(&mut self, kind: ActionErrorKind, err: ValidateError) {
        match err {
            ValidateError::Command(cmd) => {
                log::error!("{} error: {}", kind, cmd);
                self.action_errors.push(ActionError::from_command(kind, cmd));
            }
            other => self.append_general_error(other),
        }
    }

    pub fn action_errors(&self) -> &[ActionError] {
        &self.action_errors
    }

    /// Mutable access for late-binding annotations (hints)
    pub fn action_errors_mut(&mut self) -> impl Iterator<Item = &mut ActionError> {
        self.action_errors.iter_mut()
    }

    pub fn general_errors(&self) -> &[GeneralError] {
        &self.general_errors
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Any error at all, resolved or not
    pub fn has_errors(&self) -> bool {
        !self.general_errors.is_empty() || !self.action_errors.is_empty()
    }

    pub fn has_action_errors(&self) -> bool {
        !self.action_errors.is_empty()
    }

    /// General errors always count; action errors only while unresolved
    pub fn has_not_resolved_errors(&self) -> bool {
        !self.general_errors.is_empty() || self.action_errors.iter().any(|e| !e.is_resolved())
    }

    pub fn resolved_count(&self) -> usize {
        self.action_errors.iter().filter(|e| e.is_resolved()).count()
    }

    pub fn unresolved_count(&self) -> usize {
        self.action_errors.len() - self.resolved_count()
    }

    /// Append `evidence` to every action error of `kind`
    pub fn add_remediation_evidence(&mut self, kind: ActionErrorKind, evidence: &str) {
        for err in self.action_errors.iter_mut().filter(|e| e.kind() == kind) {
            err.add_remediation_evidence(evidence);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandError;

    fn command_failure(stderr: &str) -> ValidateError {
        CommandError::new("go vet ./...", stderr, Some(1)).into()
    }

    #[test]
    fn test_empty_results() {
        let results = ActionResults::new();
        assert!(!results.has_errors());
        assert!(!results.has_action_errors());
        assert!(!results.has_not_resolved_errors());
    }

    #[test]
    fn test_command_failure_becomes_action_error() {
        let mut results = ActionResults::new();
        results.append_validation_error(command_failure("undefined: Foo"));

        assert_eq!(results.action_errors().len(), 1);
        let err = &results.action_errors()[0];
        assert_eq!(err.kind(), ActionErrorKind::Validation);
        assert_eq!(err.std_err(), Some("undefined: Foo"));
        assert!(!err.is_resolved());
        assert!(results.has_errors());
        assert!(results.has_not_resolved_errors());
    }

    #[test]
    fn test_generic_failure_becomes_general_error() {
        let mut results = ActionResults::new();
        results.append_test_error(ValidateError::Clone("network down".to_string()));

        assert!(results.action_errors().is_empty());
        assert_eq!(results.general_errors().len(), 1);
        assert_eq!(results.general_errors()[0].message(), "Clone failed: network down");
        assert!(results.has_errors());
        assert!(!results.has_action_errors());
    }

    #[test]
    fn test_evidence_only_touches_matching_kind() {
        let mut results = ActionResults::new();
        results.append_validation_error(command_failure("vet"));
        results.append_test_error(command_failure("test"));

        results.add_remediation_evidence(ActionErrorKind::Test, "label found");

        let validation = &results.action_errors()[0];
        let test = &results.action_errors()[1];
        assert!(!validation.is_resolved());
        assert!(test.is_resolved());
        assert_eq!(results.resolved_count(), 1);
        assert_eq!(results.unresolved_count(), 1);
    }

    #[test]
    fn test_resolved_action_errors_do_not_fail_run() {
        let mut results = ActionResults::new();
        results.append_validation_error(command_failure("vet"));
        results.add_remediation_evidence(ActionErrorKind::Validation, "label found");

        assert!(results.has_errors());
        assert!(results.has_action_errors());
        assert!(!results.has_not_resolved_errors());
    }

    #[test]
    fn test_general_errors_always_count() {
        let mut results = ActionResults::new();
        results.append_general_error(ValidateError::GitHub("rate limited".to_string()));
        results.add_remediation_evidence(ActionErrorKind::Validation, "label found");
        assert!(results.has_not_resolved_errors());
    }

    #[test]
    fn test_evidence_accumulates() {
        let mut results = ActionResults::new();
        results.append_validation_error(command_failure("vet"));
        results.add_remediation_evidence(ActionErrorKind::Validation, "label found");
        results.add_remediation_evidence(ActionErrorKind::Validation, "label found");
        assert_eq!(results.action_errors()[0].remediation_evidence().len(), 2);
    }

    #[test]
    fn test_serializes_to_json() {
        let mut results = ActionResults::new();
        results.append_validation_error(command_failure("undefined: Foo"));
        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json["action_errors"][0]["kind"], "validation");
        assert_eq!(json["action_errors"][0]["std_err"], "undefined: Foo");
    }
}
