//! Go modules support.
//!
//! The target's `go.mod` gets a `replace` directive pointing at the source
//! checkout, then `go vet ./...` compiles and lints the whole target.

use crate::error::{Result, ValidateError};
use crate::runner::{CommandRunner, CommandSpec, DEFAULT_TIMEOUT_MS};
use crate::technology::traits::{Module, TechValidator};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

pub const DESCRIPTOR_FILE: &str = "go.mod";
pub const GO_TYPE: &str = "golang";

/// Validator for Go module projects
pub struct GolangValidator {
    runner: Arc<dyn CommandRunner>,
    timeout_ms: u64,
}

impl GolangValidator {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Find the `module` declaration in go.mod content
    pub fn parse_module_name(content: &str) -> Option<&str> {
        content.lines().find_map(|line| {
            let rest = line.strip_prefix("module")?;
            if !rest.starts_with(char::is_whitespace) {
                return None;
            }
            let name = rest
                .split("//")
                .next()
                .unwrap_or_default()
                .trim()
                .trim_matches('"');
            if name.is_empty() || name.contains(char::is_whitespace) {
                None
            } else {
                Some(name)
            }
        })
    }

    /// The directive that redirects `source` to its local checkout
    pub fn replace_directive(source: &Module) -> String {
        format!("replace {} => {}", source.name, source.root().display())
    }
}

#[async_trait]
impl TechValidator for GolangValidator {
    fn name(&self) -> &str {
        "GolangValidator"
    }

    fn technology(&self) -> &str {
        GO_TYPE
    }

    async fn is_supporting(&self, wd: &Path) -> bool {
        tokio::fs::try_exists(wd.join(DESCRIPTOR_FILE))
            .await
            .unwrap_or(false)
    }

    async fn extract_module(&self, wd: &Path) -> Result<Module> {
        let descriptor = wd.join(DESCRIPTOR_FILE);
        let descriptor = tokio::fs::canonicalize(&descriptor).await.unwrap_or(descriptor);
        let content = tokio::fs::read_to_string(&descriptor).await?;

        match Self::parse_module_name(&content) {
            Some(name) => Ok(Module::new(GO_TYPE, name, descriptor)),
            None => Err(ValidateError::Parse(format!(
                "could not parse module from {}",
                descriptor.display()
            ))),
        }
    }

    async fn install(&self, source: &Module, wd: &Path) -> Result<()> {
        if source.technology != self.technology() {
            return Err(ValidateError::TypeMismatch {
                expected: self.technology().to_string(),
                found: source.technology.clone(),
            });
        }

        let go_mod = wd.join(DESCRIPTOR_FILE);
        let directive = Self::replace_directive(source);
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&go_mod)
            .await?;
        file.write_all(format!("\n{}\n", directive).as_bytes()).await?;
        file.flush().await?;

        log::info!("Appended '{}' to {}", directive, go_mod.display());
        Ok(())
    }

    async fn validate(&self, wd: &Path) -> Result<()> {
        log::info!("Running go validation...");
        let spec = CommandSpec::new("go")
            .args(["vet", "./..."])
            .cwd(wd)
            .timeout_ms(self.timeout_ms);
        self.runner.run(&spec).await?;
        Ok(())
    }
}
