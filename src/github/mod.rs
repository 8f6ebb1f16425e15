//! GitHub integration: run context, labels, pull request comments.

pub mod client;
pub mod context;

pub use client::GitHubClient;
pub use context::GitHubContext;
