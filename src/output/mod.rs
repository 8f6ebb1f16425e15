//! Rendering and reporting of run results.

pub mod render;
pub mod report;
pub mod workflow;

pub use render::{
    COMMENT_MARKER, generate_comment, generate_markdown, generate_summary, get_action_failed_message,
};
pub use report::{CommentSink, OutputType, Reporter};
