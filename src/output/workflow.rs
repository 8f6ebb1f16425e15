//! GitHub Actions workflow commands written to stdout.

use std::io::Write;

/// Escape data for a workflow command message
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

pub fn start_group(name: &str) {
    println!("::group::{}", escape_data(name));
}

pub fn end_group() {
    println!("::endgroup::");
    let _ = std::io::stdout().flush();
}

/// Emit an error annotation for the run
pub fn error(message: &str) {
    println!("::error::{}", escape_data(message));
}

pub fn warning(message: &str) {
    println!("::warning::{}", escape_data(message));
}

/// Scoped log group; closes the group when dropped
pub struct Group;

impl Group {
    pub fn start(name: &str) -> Self {
        start_group(name);
        Group
    }
}

impl Drop for Group {
    fn drop(&mut self) {
        end_group();
    }
}
