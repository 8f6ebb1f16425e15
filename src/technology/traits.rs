//! Technology validator interface

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Descriptor of the source unit being validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Ecosystem tag, e.g. "golang"
    #[serde(rename = "type")]
    pub technology: String,
    /// Logical module identifier
    pub name: String,
    /// Path to the descriptor file the module was read from
    pub path: PathBuf,
}

impl Module {
    pub fn new(technology: impl Into<String>, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            technology: technology.into(),
            name: name.into(),
            path: path.into(),
        }
    }

    /// Directory containing the descriptor
    pub fn root(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Per-ecosystem strategy: detection, extraction, installation and validation
#[async_trait]
pub trait TechValidator: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Ecosystem tag carried by modules this validator extracts
    fn technology(&self) -> &str;

    /// Whether `wd` holds a project of this ecosystem. Never fails.
    async fn is_supporting(&self, wd: &Path) -> bool;

    /// Read the module descriptor in `wd`
    async fn extract_module(&self, wd: &Path) -> Result<Module>;

    /// Point the project in `wd` at the local `source` module
    async fn install(&self, source: &Module, wd: &Path) -> Result<()>;

    /// Run the ecosystem's static check in `wd`
    async fn validate(&self, wd: &Path) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_root() {
        let module = Module::new("golang", "github.com/acme/lib", "/work/lib/go.mod");
        assert_eq!(module.root(), Path::new("/work/lib"));
    }

    #[test]
    fn test_module_serializes_type_tag() {
        let module = Module::new("golang", "github.com/acme/lib", "/work/lib/go.mod");
        let json = serde_json::to_value(&module).unwrap();
        assert_eq!(json["type"], "golang");
        assert_eq!(json["name"], "github.com/acme/lib");
    }
}
