//! Drives the registered technology validators through one run.
//!
//! The manager moves through a fixed sequence of states; calling a step out of
//! order is an `InvalidState` error.

use crate::error::{Result, ValidateError};
use crate::runner::CommandRunner;
use crate::technology::{GolangValidator, Module, TechValidator};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Where the manager is in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Uninitialized,
    SourceExtracted,
    TargetInstalled,
    Validated,
    TestsRun,
}

impl fmt::Display for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ManagerState::Uninitialized => "uninitialized",
            ManagerState::SourceExtracted => "source extracted",
            ManagerState::TargetInstalled => "target installed",
            ManagerState::Validated => "validated",
            ManagerState::TestsRun => "tests run",
        };
        write!(f, "{}", s)
    }
}

/// Owns the validator registry and the extracted source module
pub struct ValidationManager {
    validators: Vec<Box<dyn TechValidator>>,
    source: Option<Module>,
    state: ManagerState,
}

impl ValidationManager {
    /// Create a manager with an explicit, ordered registry
    pub fn new(validators: Vec<Box<dyn TechValidator>>) -> Self {
        Self {
            validators,
            source: None,
            state: ManagerState::Uninitialized,
        }
    }

    /// Registry of every built-in technology
    pub fn with_default_validators(runner: Arc<dyn CommandRunner>, timeout_ms: u64) -> Self {
        Self::new(vec![Box::new(
            GolangValidator::new(runner).with_timeout_ms(timeout_ms),
        )])
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    /// The extracted source module
    pub fn source(&self) -> Result<&Module> {
        self.source
            .as_ref()
            .ok_or_else(|| ValidateError::InvalidState("no source module found".to_string()))
    }

    pub fn validator_names(&self) -> Vec<&str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    fn expect_state(&self, expected: ManagerState, step: &str) -> Result<()> {
        if self.state != expected {
            return Err(ValidateError::InvalidState(format!(
                "cannot {} while {} (expected {})",
                step, self.state, expected
            )));
        }
        Ok(())
    }

    async fn supporting(&self, wd: &Path) -> Vec<&dyn TechValidator> {
        let mut found = Vec::new();
        for validator in &self.validators {
            if validator.is_supporting(wd).await {
                found.push(validator.as_ref());
            }
        }
        found
    }

    /// Extract the source module with the first validator that supports `source_dir`
    pub async fn init(&mut self, source_dir: &Path) -> Result<&Module> {
        self.expect_state(ManagerState::Uninitialized, "extract source")?;

        let mut extracted = None;
        for validator in &self.validators {
            if validator.is_supporting(source_dir).await {
                extracted = Some(validator.extract_module(source_dir).await?);
                break;
            }
        }
        let module = extracted.ok_or_else(|| {
            ValidateError::UnsupportedTechnology(source_dir.display().to_string())
        })?;

        log::info!(
            "Extracted module: {}",
            serde_json::to_string(&module).unwrap_or_else(|_| module.name.clone())
        );
        self.state = ManagerState::SourceExtracted;
        Ok(self.source.insert(module))
    }

    /// Link the source module into `target_dir` with every supporting validator
    pub async fn install_target(&mut self, target_dir: &Path) -> Result<Vec<String>> {
        self.expect_state(ManagerState::SourceExtracted, "install target")?;
        let source = self.source()?;

        let mut installed = Vec::new();
        for validator in self.supporting(target_dir).await {
            validator.install(source, target_dir).await?;
            installed.push(validator.name().to_string());
        }
        if installed.is_empty() {
            return Err(ValidateError::UnsupportedTechnology(
                target_dir.display().to_string(),
            ));
        }

        log::info!("Installed source module to target with {}", installed.join(", "));
        self.state = ManagerState::TargetInstalled;
        Ok(installed)
    }

    /// Run every supporting validator's check against `target_dir`.
    ///
    /// Check failures propagate unchanged; the caller classifies them.
    pub async fn validate_target(&mut self, target_dir: &Path) -> Result<Vec<String>> {
        self.expect_state(ManagerState::TargetInstalled, "validate target")?;

        let mut validated = Vec::new();
        for validator in self.supporting(target_dir).await {
            if let Err(e) = validator.validate(target_dir).await {
                log::info!("Validation failed with {}", validator.name());
                return Err(e);
            }
            validated.push(validator.name().to_string());
        }
        if validated.is_empty() {
            return Err(ValidateError::UnsupportedTechnology(
                target_dir.display().to_string(),
            ));
        }

        log::info!("Validation passed with {}", validated.join(", "));
        self.state = ManagerState::Validated;
        Ok(validated)
    }

    /// Mark the start of the custom test step; only legal after validation passed
    pub fn begin_tests(&mut self) -> Result<()> {
        self.expect_state(ManagerState::Validated, "run tests")?;
        self.state = ManagerState::TestsRun;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandError;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Validator that supports a fixed set of directories
    struct MockValidator {
        name: String,
        supports: Vec<PathBuf>,
        fail_validate: bool,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl MockValidator {
        fn new(name: &str, supports: &[&str], calls: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name: name.to_string(),
                supports: supports.iter().map(PathBuf::from).collect(),
                fail_validate: false,
                calls,
            }
        }

        fn failing(mut self) -> Self {
            self.fail_validate = true;
            self
        }
    }

    #[async_trait]
    impl TechValidator for MockValidator {
        fn name(&self) -> &str {
            &self.name
        }

        fn technology(&self) -> &str {
            "mock"
        }

        async fn is_supporting(&self, wd: &Path) -> bool {
            self.supports.iter().any(|p| p == wd)
        }

        async fn extract_module(&self, wd: &Path) -> Result<Module> {
            self.calls.lock().unwrap().push(format!("{}:extract", self.name));
            Ok(Module::new("mock", &self.name, wd.join("mock.toml")))
        }

        async fn install(&self, _source: &Module, _wd: &Path) -> Result<()> {
            self.calls.lock().unwrap().push(format!("{}:install", self.name));
            Ok(())
        }

        async fn validate(&self, _wd: &Path) -> Result<()> {
            self.calls.lock().unwrap().push(format!("{}:validate", self.name));
            if self.fail_validate {
                return Err(CommandError::new("mock check", "undefined: Foo", Some(1)).into());
            }
            Ok(())
        }
    }

    fn manager(validators: Vec<MockValidator>) -> ValidationManager {
        ValidationManager::new(
            validators
                .into_iter()
                .map(|v| Box::new(v) as Box<dyn TechValidator>)
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_init_uses_first_supporting_validator() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut mgr = manager(vec![
            MockValidator::new("a", &["/other"], calls.clone()),
            MockValidator::new("b", &["/src"], calls.clone()),
            MockValidator::new("c", &["/src"], calls.clone()),
        ]);

        let module = mgr.init(Path::new("/src")).await.unwrap();
        assert_eq!(module.name, "b");
        assert_eq!(mgr.state(), ManagerState::SourceExtracted);
        assert_eq!(*calls.lock().unwrap(), vec!["b:extract"]);
    }

    #[tokio::test]
    async fn test_init_unsupported_is_fatal() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut mgr = manager(vec![MockValidator::new("a", &["/other"], calls)]);

        let err = mgr.init(Path::new("/src")).await.unwrap_err();
        assert!(matches!(err, ValidateError::UnsupportedTechnology(_)));
        assert!(err.is_fatal());
        assert_eq!(mgr.state(), ManagerState::Uninitialized);
        assert!(mgr.source().is_err());
    }

    #[tokio::test]
    async fn test_install_runs_every_supporting_validator() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut mgr = manager(vec![
            MockValidator::new("a", &["/src", "/target"], calls.clone()),
            MockValidator::new("b", &["/target"], calls.clone()),
        ]);

        mgr.init(Path::new("/src")).await.unwrap();
        let installed = mgr.install_target(Path::new("/target")).await.unwrap();
        assert_eq!(installed, vec!["a", "b"]);
        assert_eq!(mgr.state(), ManagerState::TargetInstalled);
    }

    #[tokio::test]
    async fn test_install_without_support_is_fatal() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut mgr = manager(vec![MockValidator::new("a", &["/src"], calls)]);

        mgr.init(Path::new("/src")).await.unwrap();
        let err = mgr.install_target(Path::new("/target")).await.unwrap_err();
        assert!(matches!(err, ValidateError::UnsupportedTechnology(_)));
        assert_eq!(mgr.state(), ManagerState::SourceExtracted);
    }

    #[tokio::test]
    async fn test_validate_propagates_check_failure() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut mgr = manager(vec![
            MockValidator::new("a", &["/src", "/target"], calls.clone()).failing(),
        ]);

        mgr.init(Path::new("/src")).await.unwrap();
        mgr.install_target(Path::new("/target")).await.unwrap();
        let err = mgr.validate_target(Path::new("/target")).await.unwrap_err();

        assert!(matches!(err, ValidateError::Command(_)));
        assert!(!err.is_fatal());
        assert_eq!(mgr.state(), ManagerState::TargetInstalled);
        assert!(mgr.begin_tests().is_err());
    }

    #[tokio::test]
    async fn test_full_sequence() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut mgr = manager(vec![MockValidator::new("a", &["/src", "/target"], calls.clone())]);

        mgr.init(Path::new("/src")).await.unwrap();
        mgr.install_target(Path::new("/target")).await.unwrap();
        let validated = mgr.validate_target(Path::new("/target")).await.unwrap();
        mgr.begin_tests().unwrap();

        assert_eq!(validated, vec!["a"]);
        assert_eq!(mgr.state(), ManagerState::TestsRun);
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["a:extract", "a:install", "a:validate"]
        );
    }

    #[tokio::test]
    async fn test_out_of_order_steps_are_rejected() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut mgr = manager(vec![MockValidator::new("a", &["/src", "/target"], calls)]);

        let err = mgr.install_target(Path::new("/target")).await.unwrap_err();
        assert!(matches!(err, ValidateError::InvalidState(_)));

        mgr.init(Path::new("/src")).await.unwrap();
        let err = mgr.validate_target(Path::new("/target")).await.unwrap_err();
        assert!(matches!(err, ValidateError::InvalidState(_)));

        let err = mgr.init(Path::new("/src")).await.unwrap_err();
        assert!(matches!(err, ValidateError::InvalidState(_)));
    }

    #[test]
    fn test_default_registry() {
        let runner: Arc<dyn CommandRunner> = Arc::new(crate::runner::ProcessRunner::new());
        let mgr = ValidationManager::with_default_validators(runner, 1000);
        assert_eq!(mgr.validator_names(), vec!["GolangValidator"]);
        assert_eq!(mgr.state(), ManagerState::Uninitialized);
    }
}
