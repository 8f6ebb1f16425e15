//! Minimal GitHub REST client: pull request labels and comments.

use crate::error::{Result, ValidateError};
use crate::github::context::GitHubContext;
use crate::output::CommentSink;
use crate::remediation::LabelSource;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";
const PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct Label {
    name: String,
}

#[derive(Debug, Deserialize)]
struct IssueComment {
    id: u64,
    #[serde(default)]
    body: Option<String>,
}

fn comments_page(page: u32) -> String {
    format!("comments?per_page={}&page={}", PAGE_SIZE, page)
}

fn tagged_comment_id(comments: &[IssueComment], marker: &str) -> Option<u64> {
    comments
        .iter()
        .find(|c| c.body.as_deref().is_some_and(|b| b.contains(marker)))
        .map(|c| c.id)
}

/// Token-authenticated client bound to one repository and pull request
pub struct GitHubClient {
    client: Client,
    token: String,
    context: GitHubContext,
}

impl GitHubClient {
    pub fn new(token: impl Into<String>, context: GitHubContext, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ValidateError::GitHub(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            token: token.into(),
            context,
        })
    }

    fn pr_number(&self) -> Result<u64> {
        self.context
            .pr_number
            .ok_or_else(|| ValidateError::GitHub("no pull request associated with this run".to_string()))
    }

    fn issue_url(&self, suffix: &str) -> Result<String> {
        Ok(format!(
            "{}/repos/{}/issues/{}/{}",
            self.context.api_url,
            self.context.repository,
            self.pr_number()?,
            suffix
        ))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header("Accept", GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ValidateError::GitHub(format!("{} {}", status, body.trim())))
    }

    /// Names of the labels applied to the pull request
    pub async fn labels(&self) -> Result<Vec<String>> {
        let url = self.issue_url(&format!("labels?per_page={}", PAGE_SIZE))?;
        let response = self.authorized(self.client.get(&url)).send().await?;
        let labels: Vec<Label> = Self::check(response).await?.json().await?;
        Ok(labels.into_iter().map(|l| l.name).collect())
    }

    /// Walk the comment pages until one contains `marker`
    async fn find_tagged_comment(&self, marker: &str) -> Result<Option<u64>> {
        let mut page = 1;
        loop {
            let url = self.issue_url(&comments_page(page))?;
            let response = self.authorized(self.client.get(&url)).send().await?;
            let comments: Vec<IssueComment> = Self::check(response).await?.json().await?;

            if let Some(id) = tagged_comment_id(&comments, marker) {
                return Ok(Some(id));
            }
            if comments.len() < PAGE_SIZE {
                return Ok(None);
            }
            page += 1;
        }
    }

    /// Create the pull request comment tagged with `marker`, or update it in place
    /// if one already exists
    pub async fn upsert_tagged_comment(&self, marker: &str, body: &str) -> Result<()> {
        let payload = json!({ "body": body });
        match self.find_tagged_comment(marker).await? {
            Some(id) => {
                let url = format!(
                    "{}/repos/{}/issues/comments/{}",
                    self.context.api_url, self.context.repository, id
                );
                let response = self.authorized(self.client.patch(&url)).json(&payload).send().await?;
                Self::check(response).await?;
                log::info!("Updated pull request comment {}", id);
            }
            None => {
                let url = self.issue_url("comments")?;
                let response = self.authorized(self.client.post(&url)).json(&payload).send().await?;
                Self::check(response).await?;
                log::info!("Created pull request comment");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LabelSource for GitHubClient {
    async fn has_label(&self, label: &str) -> Result<bool> {
        let labels = self.labels().await?;
        log::debug!("Pull request labels: {:?}", labels);
        Ok(labels.iter().any(|l| l == label))
    }
}

#[async_trait]
impl CommentSink for GitHubClient {
    async fn upsert_comment(&self, marker: &str, body: &str) -> Result<()> {
        self.upsert_tagged_comment(marker, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(pr_number: Option<u64>) -> GitHubClient {
        let ctx = GitHubContext::new("https://api.github.com", "acme/lib", pr_number);
        GitHubClient::new("token", ctx, "repo-validate-test", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_issue_url() {
        let c = client(Some(42));
        assert_eq!(
            c.issue_url("labels").unwrap(),
            "https://api.github.com/repos/acme/lib/issues/42/labels"
        );
    }

    #[test]
    fn test_issue_url_without_pull_request() {
        let c = client(None);
        let err = c.issue_url("labels").unwrap_err();
        assert!(matches!(err, ValidateError::GitHub(_)));
    }

    #[tokio::test]
    async fn test_has_label_without_pull_request_fails() {
        let c = client(None);
        assert!(c.has_label("override").await.is_err());
    }

    #[test]
    fn test_comment_deserializes_without_body() {
        let comments: Vec<IssueComment> = serde_json::from_str(r#"[{"id": 1}, {"id": 2, "body": "hi"}]"#).unwrap();
        assert_eq!(comments[0].body, None);
        assert_eq!(comments[1].body.as_deref(), Some("hi"));
    }

    #[test]
    fn test_comments_page_query() {
        let c = client(Some(7));
        assert_eq!(
            c.issue_url(&comments_page(3)).unwrap(),
            "https://api.github.com/repos/acme/lib/issues/7/comments?per_page=100&page=3"
        );
    }

    #[test]
    fn test_tagged_comment_id() {
        let comments: Vec<IssueComment> = serde_json::from_str(
            r#"[{"id": 1, "body": "lgtm"}, {"id": 2}, {"id": 3, "body": "<!-- tag -->\nreport"}]"#,
        )
        .unwrap();
        assert_eq!(tagged_comment_id(&comments, "<!-- tag -->"), Some(3));
        assert_eq!(tagged_comment_id(&comments, "<!-- other -->"), None);
    }
}
