//! Recap runtime: coordinates one analysis run.
//!
//! Discovery and extraction are synchronous; the single backend call can be
//! submitted as a background task while the caller keeps working.

pub mod orchestrator;
pub mod prompt;
pub mod report;
pub mod types;

pub use orchestrator::{Analyzer, PendingAnalysis};
pub use prompt::{all_skipped_message, build_prompt, NO_FILES_MESSAGE};
pub use report::{file_type_stats, Report};
pub use types::*;
