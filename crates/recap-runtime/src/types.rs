//! Runtime types.

use std::collections::BTreeMap;

use serde::Serialize;

use recap_ingest::{Discovery, ExtractionBatch};

/// Everything gathered from disk for one run, before the backend is involved.
#[derive(Debug)]
pub struct Collected {
    pub discovery: Discovery,
    /// Extraction results for the newest files only.
    pub batch: ExtractionBatch,
}

impl Collected {
    pub fn is_empty(&self) -> bool {
        self.discovery.files.is_empty()
    }

    pub fn skipped(&self) -> SkipCounts {
        let failures = self.batch.failure_summary();
        SkipCounts {
            walk: self.discovery.skipped.len(),
            unreadable: failures.get("unreadable").copied().unwrap_or(0),
            too_large: failures.get("too_large").copied().unwrap_or(0),
        }
    }
}

/// Entries left out of the analysis, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    /// Directory entries the walk could not stat or read.
    pub walk: usize,
    pub unreadable: usize,
    pub too_large: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.walk + self.unreadable + self.too_large
    }
}

/// Count and size for one extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtensionStats {
    pub count: usize,
    pub total_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileTypeStats {
    /// Keyed by lower-case extension; `(none)` for extension-less files.
    pub by_extension: BTreeMap<String, ExtensionStats>,
    /// Keyed by broad category (`markdown`, `code`, ...).
    pub by_kind: BTreeMap<&'static str, usize>,
    pub total_files: usize,
    pub total_bytes: u64,
}
