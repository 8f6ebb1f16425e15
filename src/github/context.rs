//! Workflow run context read from the GitHub Actions environment.

use serde_json::Value;
use std::path::Path;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Where this run lives on GitHub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubContext {
    /// REST API base URL
    pub api_url: String,
    /// `owner/repo` of the repository running the workflow
    pub repository: String,
    /// Pull request number, if the run belongs to one
    pub pr_number: Option<u64>,
}

impl GitHubContext {
    pub fn new(api_url: impl Into<String>, repository: impl Into<String>, pr_number: Option<u64>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            repository: repository.into(),
            pr_number,
        }
    }

    /// Build from `GITHUB_API_URL`, `GITHUB_REPOSITORY`, `GITHUB_EVENT_PATH`
    /// and `GITHUB_REF`. Returns `None` outside of a workflow run.
    pub fn from_env(default_api_url: &str) -> Option<Self> {
        let repository = std::env::var("GITHUB_REPOSITORY").ok().filter(|r| !r.is_empty())?;
        let api_url = std::env::var("GITHUB_API_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| default_api_url.to_string());

        let from_event = std::env::var("GITHUB_EVENT_PATH")
            .ok()
            .and_then(|path| read_event(Path::new(&path)))
            .and_then(|event| pr_number_from_event(&event));
        let pr_number =
            from_event.or_else(|| std::env::var("GITHUB_REF").ok().and_then(|r| pr_number_from_ref(&r)));

        Some(Self::new(api_url, repository, pr_number))
    }
}

fn read_event(path: &Path) -> Option<Value> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Failed to read event payload {}: {}", path.display(), e);
            return None;
        }
    };
    serde_json::from_str(&content)
        .map_err(|e| log::warn!("Failed to parse event payload: {}", e))
        .ok()
}

/// Pull request number from a webhook event payload
pub fn pr_number_from_event(event: &Value) -> Option<u64> {
    event
        .pointer("/pull_request/number")
        .or_else(|| event.pointer("/issue/number"))
        .or_else(|| event.get("number"))
        .and_then(Value::as_u64)
}

/// Pull request number from a ref like `refs/pull/42/merge`
pub fn pr_number_from_ref(git_ref: &str) -> Option<u64> {
    let rest = git_ref.strip_prefix("refs/pull/")?;
    rest.split('/').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pr_number_from_pull_request_event() {
        let event = json!({"action": "labeled", "pull_request": {"number": 42}});
        assert_eq!(pr_number_from_event(&event), Some(42));
    }

    #[test]
    fn test_pr_number_from_top_level_number() {
        let event = json!({"number": 7});
        assert_eq!(pr_number_from_event(&event), Some(7));
    }

    #[test]
    fn test_pr_number_from_push_event() {
        let event = json!({"ref": "refs/heads/main", "head_commit": {}});
        assert_eq!(pr_number_from_event(&event), None);
    }

    #[test]
    fn test_pr_number_from_ref() {
        assert_eq!(pr_number_from_ref("refs/pull/42/merge"), Some(42));
        assert_eq!(pr_number_from_ref("refs/heads/main"), None);
        assert_eq!(pr_number_from_ref("refs/pull/abc/merge"), None);
    }

    #[test]
    fn test_new_trims_api_url() {
        let ctx = GitHubContext::new("https://ghe.example.com/api/v3/", "acme/lib", Some(1));
        assert_eq!(ctx.api_url, "https://ghe.example.com/api/v3");
    }
}
