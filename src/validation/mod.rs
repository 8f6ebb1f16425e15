//! Validation pipeline
//!
//! Drives source extraction, target installation and technology checks.

pub mod manager;

pub use manager::{ManagerState, ValidationManager};
