//! Recap Core — error taxonomy and run-wide settings.

pub mod config;
pub mod error;

pub use config::{
    default_extensions, is_markdown_extension, normalize_extension, Settings, DEFAULT_EXTENSIONS,
    MARKDOWN_EXTENSIONS,
};
pub use error::{Error, Result};
