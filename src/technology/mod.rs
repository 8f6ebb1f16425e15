//! Technology validators
//!
//! One [`TechValidator`] per supported ecosystem.

pub mod golang;
pub mod traits;

pub use golang::GolangValidator;
pub use traits::{Module, TechValidator};
