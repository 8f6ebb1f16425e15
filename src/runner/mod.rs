//! Command execution
//!
//! Everything that spawns a process goes through [`CommandRunner`] so the
//! pipeline can be driven by a scripted runner in tests.

pub mod command;

pub use command::{CommandOutput, CommandRunner, CommandSpec, DEFAULT_TIMEOUT_MS, ProcessRunner};
