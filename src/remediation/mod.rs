//! Label-based remediation
//!
//! A maintainer acknowledges the open findings of a run by applying a label to
//! the pull request. When the label is present every action error receives a
//! piece of evidence and counts as resolved; otherwise unresolved errors get a
//! hint explaining how to acknowledge them.

use crate::error::Result;
use crate::results::{ActionErrorKind, ActionResults};
use async_trait::async_trait;

/// Answers whether a label is applied to the pull request of this run
#[async_trait]
pub trait LabelSource: Send + Sync {
    async fn has_label(&self, label: &str) -> Result<bool>;
}

/// Outcome of a remediation check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemediationStatus {
    /// Nothing to remediate
    NoFindings,
    /// No remediation label configured
    NotConfigured,
    /// Label configured but it could not be looked up
    Unavailable(String),
    /// Label configured and absent from the pull request
    LabelMissing(String),
    /// Label present; findings resolved
    LabelFound(String),
}

/// Evidence recorded when the remediation label is found
pub fn label_evidence(label: &str) -> String {
    format!("Remediation label `{}` found on the pull request", label)
}

/// Hint for findings when no remediation label is configured
pub fn configure_label_hint() -> String {
    "Configure a remediation label (`remediation_label` input) to be able to acknowledge known issues"
        .to_string()
}

/// Hint for findings when the configured label is absent
pub fn apply_label_hint(label: &str) -> String {
    format!(
        "Apply the `{}` label to the pull request to acknowledge this issue",
        label
    )
}

pub struct RemediationManager;

impl RemediationManager {
    /// Attach evidence or hints to the action errors in `results`.
    ///
    /// Best-effort: a failed label lookup is logged and treated as
    /// remediation being unavailable.
    pub async fn check_remediation(
        results: &mut ActionResults,
        label: Option<&str>,
        source: Option<&dyn LabelSource>,
    ) -> RemediationStatus {
        if !results.has_action_errors() {
            return RemediationStatus::NoFindings;
        }

        let status = Self::lookup(label, source).await;
        match &status {
            RemediationStatus::LabelFound(label) => {
                log::info!("Remediation label '{}' found, marking findings as resolved", label);
                let evidence = label_evidence(label);
                for kind in ActionErrorKind::ALL {
                    results.add_remediation_evidence(kind, &evidence);
                }
            }
            RemediationStatus::NotConfigured => Self::hint_unresolved(results, configure_label_hint()),
            RemediationStatus::LabelMissing(label) | RemediationStatus::Unavailable(label) => {
                Self::hint_unresolved(results, apply_label_hint(label))
            }
            RemediationStatus::NoFindings => {}
        }
        status
    }

    async fn lookup(label: Option<&str>, source: Option<&dyn LabelSource>) -> RemediationStatus {
        let Some(label) = label.filter(|l| !l.trim().is_empty()) else {
            return RemediationStatus::NotConfigured;
        };
        let Some(source) = source else {
            log::warn!(
                "Remediation label '{}' configured but no token available to look it up",
                label
            );
            return RemediationStatus::Unavailable(label.to_string());
        };

        match source.has_label(label).await {
            Ok(true) => RemediationStatus::LabelFound(label.to_string()),
            Ok(false) => {
                log::info!("Remediation label '{}' not found on the pull request", label);
                RemediationStatus::LabelMissing(label.to_string())
            }
            Err(e) => {
                log::warn!("Error checking remediation: {}", e);
                RemediationStatus::Unavailable(label.to_string())
            }
        }
    }

    fn hint_unresolved(results: &mut ActionResults, hint: String) {
        for err in results.action_errors_mut().filter(|e| !e.is_resolved()) {
            err.set_hint(hint.clone());
        }
    }
}
