//! CLI module for repo-validate - command-line interface.

pub mod commands;

pub use commands::Cli;
