//! repo-validate - validate a downstream repository against local changes
//!
//! The source checkout is linked into a freshly cloned target repository, the
//! target's technology checks and optional tests run, and the findings are
//! reported with a label-based remediation workflow.

pub mod action;
pub mod config;
pub mod error;
pub mod github;
pub mod inputs;
pub mod output;
pub mod remediation;
pub mod results;
pub mod runner;
pub mod technology;
pub mod validation;

pub use error::{ErrorClass, Result, ValidateError};
