//! Pure renderers over [`ActionResults`].
//!
//! None of these functions mutate their input; calling them repeatedly yields
//! identical text.

use crate::results::{ActionError, ActionResults};

pub const ICON_SUCCESS: &str = "✅";
pub const ICON_UNRESOLVED: &str = "⚠️";
pub const ICON_RESOLVED: &str = "🩹";
pub const ICON_FAILURE: &str = "❌";

/// Marker embedded in pull request comments so later runs can find them
pub const COMMENT_MARKER: &str = "<!-- repo-validate-comment -->";

pub const ACTION_FAILED_BANNER: &str =
    "Validation of the target repository found issues, see the job summary for details";
pub const SUCCESS_MESSAGE: &str = "Validation of the target repository passed";

fn status_icon(err: &ActionError) -> &'static str {
    if err.is_resolved() {
        ICON_RESOLVED
    } else {
        ICON_UNRESOLVED
    }
}

/// Unresolved errors first, then resolved, each group in insertion order
fn ordered(results: &ActionResults) -> Vec<&ActionError> {
    let (resolved, active): (Vec<&ActionError>, Vec<&ActionError>) =
        results.action_errors().iter().partition(|e| e.is_resolved());
    active.into_iter().chain(resolved).collect()
}

fn issue_count(results: &ActionResults) -> String {
    let total = results.action_errors().len();
    let noun = if total == 1 { "issue" } else { "issues" };
    match results.resolved_count() {
        0 => format!("{} {}", total, noun),
        resolved => format!("{} {} ({} resolved)", total, noun, resolved),
    }
}

/// Terminal summary: a header line plus one line per action error
pub fn generate_summary(results: &ActionResults) -> String {
    if !results.has_action_errors() {
        return format!("{} {}", ICON_SUCCESS, SUCCESS_MESSAGE);
    }

    let mut lines = vec![format!("Found {}", issue_count(results))];
    lines.extend(
        ordered(results)
            .into_iter()
            .map(|err| format!("{} [{}] {}", status_icon(err), err.kind(), err.issue())),
    );
    lines.join("\n")
}

/// Make text safe inside a single markdown table cell
fn escape_cell(text: &str) -> String {
    text.trim()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('|', "&#124;")
}

fn details_cell(err: &ActionError) -> String {
    let mut parts = Vec::new();
    if let Some(hint) = err.hint().filter(|_| !err.is_resolved()) {
        parts.push(format!("**Hint:** {}", escape_cell(hint)));
    }
    if err.is_resolved() {
        let evidence: Vec<String> = err
            .remediation_evidence()
            .iter()
            .map(|e| escape_cell(e))
            .collect();
        parts.push(format!("**Remediation:** {}", evidence.join("<br>")));
    }
    if let Some(std_err) = err.std_err() {
        let body = escape_html(std_err.trim()).replace("\r\n", "\n").replace('\n', "<br>");
        parts.push(format!(
            "<details><summary>stderr</summary><pre>{}</pre></details>",
            body
        ));
    }
    parts.join("<br>")
}

/// Markdown report used for the job summary and the pull request comment
pub fn generate_markdown(target_name: &str, results: &ActionResults) -> String {
    let mut out = String::new();

    let heading_icon = if results.has_not_resolved_errors() {
        ICON_FAILURE
    } else {
        ICON_SUCCESS
    };
    out.push_str(&format!(
        "## {} Validation of `{}`\n\n",
        heading_icon, target_name
    ));

    if !results.has_errors() {
        out.push_str(&format!("{} {}\n", ICON_SUCCESS, SUCCESS_MESSAGE));
        return out;
    }

    if results.has_action_errors() {
        let unresolved = results.unresolved_count();
        let status = if unresolved == 0 {
            format!("Found {}, all acknowledged.", issue_count(results))
        } else {
            format!("Found {}, {} unresolved.", issue_count(results), unresolved)
        };
        out.push_str(&status);
        out.push_str("\n\n");
        out.push_str("| Status | Type | Issue | Details |\n");
        out.push_str("| :---: | --- | --- | --- |\n");
        for err in ordered(results) {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                status_icon(err),
                err.kind(),
                escape_cell(err.issue()),
                details_cell(err)
            ));
        }
    }

    if !results.general_errors().is_empty() {
        if results.has_action_errors() {
            out.push('\n');
        }
        out.push_str("### Errors\n\n");
        for err in results.general_errors() {
            out.push_str(&format!("- {} {}\n", ICON_FAILURE, err.message().trim()));
        }
    }

    out
}

/// Pull request comment body: the markdown report tagged with [`COMMENT_MARKER`]
pub fn generate_comment(target_name: &str, results: &ActionResults) -> String {
    format!("{}\n{}", COMMENT_MARKER, generate_markdown(target_name, results))
}

/// Message the action fails with
pub fn get_action_failed_message(results: &ActionResults) -> String {
    if results.has_action_errors() {
        return ACTION_FAILED_BANNER.to_string();
    }
    results
        .general_errors()
        .iter()
        .map(|e| e.message())
        .collect::<Vec<_>>()
        .join("\n")
}
