//! Error types for Recap.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid root: {0}")]
    InvalidRoot(String),

    #[error("Unreadable file {}: {reason}", .path.display())]
    UnreadableFile { path: PathBuf, reason: String },

    #[error("File too large {}: {size} bytes (limit {limit})", .path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error aborts the whole run.
    ///
    /// Per-file errors are collected and reported instead.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::UnreadableFile { .. } | Self::FileTooLarge { .. })
    }

    /// Whether this error came from the LLM backend.
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            Self::BackendUnavailable(_) | Self::Authentication(_) | Self::RateLimited(_) | Self::Http(_)
        )
    }

    /// Short machine-readable name, used when summarising skipped files.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRoot(_) => "invalid_root",
            Self::UnreadableFile { .. } => "unreadable",
            Self::FileTooLarge { .. } => "too_large",
            Self::BackendUnavailable(_) => "backend_unavailable",
            Self::Authentication(_) => "authentication",
            Self::RateLimited(_) => "rate_limited",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Config(_) => "config",
            Self::Http(_) => "http",
            Self::Internal(_) => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_file_errors_are_not_fatal() {
        let unreadable = Error::UnreadableFile {
            path: PathBuf::from("/tmp/a.bin"),
            reason: "binary content".into(),
        };
        let too_large = Error::FileTooLarge {
            path: PathBuf::from("/tmp/big.txt"),
            size: 10,
            limit: 5,
        };
        assert!(!unreadable.is_fatal());
        assert!(!too_large.is_fatal());
        assert_eq!(unreadable.kind(), "unreadable");
        assert_eq!(too_large.kind(), "too_large");
    }

    #[test]
    fn test_run_errors_are_fatal() {
        assert!(Error::InvalidRoot("/nope".into()).is_fatal());
        assert!(Error::RateLimited("slow down".into()).is_fatal());
        assert!(Error::RateLimited("slow down".into()).is_backend());
        assert!(!Error::Config("missing key".into()).is_backend());
    }

    #[test]
    fn test_display_includes_path() {
        let err = Error::FileTooLarge {
            path: PathBuf::from("/tmp/big.txt"),
            size: 10,
            limit: 5,
        };
        assert_eq!(
            err.to_string(),
            "File too large /tmp/big.txt: 10 bytes (limit 5)"
        );
    }
}
