//! CLI definition using clap.
//!
//! Every input can also be supplied through the environment variables GitHub
//! Actions sets for action inputs (`INPUT_<NAME>`).

use clap::Parser;
use std::path::PathBuf;

/// Validate a downstream repository against the changes in this checkout
#[derive(Parser, Debug)]
#[command(name = "repo-validate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Clone URL of the target repository
    #[arg(long, env = "INPUT_REPOSITORY")]
    pub repository: String,

    /// Branch of the target repository to validate
    #[arg(long, env = "INPUT_BRANCH")]
    pub branch: Option<String>,

    /// Shell command to run in the target after validation passes
    #[arg(long, env = "INPUT_TEST_COMMAND")]
    pub test_command: Option<String>,

    /// Pull request label that acknowledges known findings
    #[arg(long, env = "INPUT_REMEDIATION_LABEL")]
    pub remediation_label: Option<String>,

    /// Checkout of the source repository
    #[arg(long, env = "GITHUB_WORKSPACE", default_value = ".")]
    pub source_dir: PathBuf,

    /// Token used for label lookup and pull request comments
    #[arg(long, env = "COMMENT_GENERATION_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Fail if a pull request comment cannot be posted for lack of a token
    #[arg(long)]
    pub comment: bool,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from([
            "repo-validate",
            "--repository",
            "https://github.com/acme/app.git",
            "--source-dir",
            "/work/lib",
        ])
        .unwrap();
        assert_eq!(cli.repository, "https://github.com/acme/app.git");
        assert_eq!(cli.source_dir, PathBuf::from("/work/lib"));
        assert!(!cli.is_verbose());
        assert!(!cli.comment);
    }

    #[test]
    fn test_parse_all_flags() {
        let cli = Cli::try_parse_from([
            "repo-validate",
            "-v",
            "--repository",
            "https://github.com/acme/app.git",
            "--branch",
            "develop",
            "--test-command",
            "go test ./...",
            "--remediation-label",
            "override-breaking-change",
            "--token",
            "secret",
            "--comment",
            "--config",
            "ci.yml",
        ])
        .unwrap();
        assert!(cli.is_verbose());
        assert_eq!(cli.branch.as_deref(), Some("develop"));
        assert_eq!(cli.test_command.as_deref(), Some("go test ./..."));
        assert_eq!(cli.remediation_label.as_deref(), Some("override-breaking-change"));
        assert_eq!(cli.token.as_deref(), Some("secret"));
        assert!(cli.comment);
        assert_eq!(cli.config, Some(PathBuf::from("ci.yml")));
    }
}
