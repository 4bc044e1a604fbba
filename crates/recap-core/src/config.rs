//! Run-wide settings for discovery, extraction and prompt assembly.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Extensions scanned by default (plain text, Markdown, structured and code formats).
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "md", "markdown", "txt", "json", "csv", "html", "xml", "js", "ts", "py", "css", "yaml", "yml",
];

/// Extensions that receive Obsidian-style Markdown normalization.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

pub const DEFAULT_DAYS: u32 = 30;
pub const DEFAULT_MAX_CHARS: usize = 2000;
/// Hard ceiling on a single file's size (4 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 4 * 1024 * 1024;
pub const DEFAULT_MAX_PROMPT_FILES: usize = 10;
pub const DEFAULT_RESPONSE_LANGUAGE: &str = "Japanese";

/// Settings for one analysis run. Built once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Recency window in days.
    pub days: u32,
    /// Lower-case extensions without the leading dot.
    pub extensions: BTreeSet<String>,
    /// Skip files and directories whose name starts with `.`.
    pub skip_hidden: bool,
    pub follow_links: bool,
    /// Per-file character budget for prompt content.
    pub max_chars: usize,
    pub max_file_bytes: u64,
    /// How many of the newest files are read and sent to the backend.
    pub max_prompt_files: usize,
    pub response_language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS,
            extensions: default_extensions(),
            skip_hidden: true,
            follow_links: false,
            max_chars: DEFAULT_MAX_CHARS,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_prompt_files: DEFAULT_MAX_PROMPT_FILES,
            response_language: DEFAULT_RESPONSE_LANGUAGE.into(),
        }
    }
}

impl Settings {
    /// Replace the extension allow-list. Entries are normalized and blanks dropped.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = extensions
            .into_iter()
            .map(|e| normalize_extension(e.as_ref()))
            .filter(|e| !e.is_empty())
            .collect();
        if !set.is_empty() {
            self.extensions = set;
        }
        self
    }
}

/// The default allow-list as an owned set.
pub fn default_extensions() -> BTreeSet<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

/// `".MD"` → `"md"`.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Whether the (already normalized) extension belongs to the Markdown family.
pub fn is_markdown_extension(ext: &str) -> bool {
    MARKDOWN_EXTENSIONS.contains(&ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.days, 30);
        assert!(settings.extensions.contains("md"));
        assert!(settings.extensions.contains("yml"));
        assert!(!settings.extensions.contains("rs"));
        assert!(settings.skip_hidden);
    }

    #[test]
    fn test_with_extensions_normalizes() {
        let settings = Settings::default().with_extensions([".MD", " Rs ", ""]);
        let exts: Vec<&str> = settings.extensions.iter().map(|s| s.as_str()).collect();
        assert_eq!(exts, vec!["md", "rs"]);
    }

    #[test]
    fn test_with_empty_extensions_keeps_defaults() {
        let settings = Settings::default().with_extensions(Vec::<String>::new());
        assert_eq!(settings.extensions, default_extensions());
    }

    #[test]
    fn test_markdown_family() {
        assert!(is_markdown_extension("md"));
        assert!(is_markdown_extension("markdown"));
        assert!(!is_markdown_extension("txt"));
    }
}
