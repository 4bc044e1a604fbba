//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use recap_chat::{BackendKind, ConfigOverrides};
use recap_core::config::{
    DEFAULT_DAYS, DEFAULT_MAX_CHARS, DEFAULT_MAX_PROMPT_FILES, DEFAULT_RESPONSE_LANGUAGE,
};
use recap_core::Settings;

/// Recap - summarize recently modified files with an LLM
///
/// Scans a folder for files changed in the last N days, reads them (UTF-8,
/// Shift_JIS and other fallbacks), cleans up Obsidian Markdown and asks a
/// local or cloud model what changed.
#[derive(Parser, Debug)]
#[command(name = "recap")]
#[command(version)]
#[command(about = "Summarize recently modified files with an LLM")]
pub struct Args {
    /// Folder to analyze
    pub folder: Option<PathBuf>,

    /// Recency window in days
    #[arg(long, default_value_t = DEFAULT_DAYS)]
    pub days: u32,

    /// LLM backend (overrides RECAP_BACKEND)
    #[arg(long, value_enum)]
    pub backend: Option<CliBackend>,

    /// Model name (deployment name on Azure)
    #[arg(long)]
    pub model: Option<String>,

    /// Save the report as JSON to this file
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Extension to include (repeatable; replaces the default list)
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Include files and folders whose name starts with '.'
    #[arg(long)]
    pub include_hidden: bool,

    /// Follow symbolic links while walking
    #[arg(long)]
    pub follow_links: bool,

    /// Number of newest files sent to the model
    #[arg(long, default_value_t = DEFAULT_MAX_PROMPT_FILES)]
    pub max_files: usize,

    /// Characters of content sent per file
    #[arg(long, default_value_t = DEFAULT_MAX_CHARS)]
    pub max_chars: usize,

    /// Language of the answer
    #[arg(long, default_value = DEFAULT_RESPONSE_LANGUAGE)]
    pub language: String,

    /// JSON file with backend settings
    #[arg(long, env = "RECAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Check that the backend is reachable and exit
    #[arg(long)]
    pub test_connection: bool,

    /// Print backend setup instructions and exit
    #[arg(long)]
    pub setup: bool,

    /// Debug logging
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliBackend {
    Ollama,
    Openai,
    Azure,
}

impl From<CliBackend> for BackendKind {
    fn from(b: CliBackend) -> Self {
        match b {
            CliBackend::Ollama => BackendKind::Ollama,
            CliBackend::Openai => BackendKind::OpenAI,
            CliBackend::Azure => BackendKind::Azure,
        }
    }
}

impl Args {
    pub fn settings(&self) -> Settings {
        Settings {
            days: self.days,
            skip_hidden: !self.include_hidden,
            follow_links: self.follow_links,
            max_chars: self.max_chars,
            max_prompt_files: self.max_files,
            response_language: self.language.clone(),
            ..Default::default()
        }
        .with_extensions(&self.extensions)
    }

    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            backend: self.backend.map(BackendKind::from),
            model: self.model.clone(),
        }
    }
}
