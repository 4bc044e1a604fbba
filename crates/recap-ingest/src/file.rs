//! File type classification by extension.

use std::path::Path;

use recap_core::{is_markdown_extension, normalize_extension};

/// Broad file categories used for normalization and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileType {
    PlainText,
    Markdown,
    Structured,
    Code,
    Unknown,
}

impl FileType {
    /// Detect file type from extension (case-insensitive, leading dot allowed).
    pub fn from_extension(ext: &str) -> Self {
        let ext = normalize_extension(ext);
        if is_markdown_extension(&ext) {
            return Self::Markdown;
        }
        match ext.as_str() {
            "txt" | "text" | "log" => Self::PlainText,
            "json" | "csv" | "tsv" | "xml" | "yaml" | "yml" | "toml" | "ini" => Self::Structured,
            "py" | "js" | "ts" | "tsx" | "jsx" | "rs" | "go" | "java" | "c" | "h" | "cpp" | "hpp"
            | "cs" | "rb" | "php" | "swift" | "kt" | "sh" | "html" | "css" | "scss" | "sql" => {
                Self::Code
            }
            _ => Self::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    pub fn is_markdown(&self) -> bool {
        matches!(self, Self::Markdown)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PlainText => "text",
            Self::Markdown => "markdown",
            Self::Structured => "structured",
            Self::Code => "code",
            Self::Unknown => "other",
        }
    }
}
