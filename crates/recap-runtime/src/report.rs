//! Run report and JSON persistence.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use recap_chat::BackendKind;
use recap_core::{Error, Result};
use recap_ingest::{FileDescriptor, FileType};

use crate::types::{ExtensionStats, FileTypeStats, SkipCounts};

/// Result of one analysis run, as saved with `--output`.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub folder: PathBuf,
    pub days: u32,
    pub file_count: usize,
    pub files: Vec<FileDescriptor>,
    pub file_types: FileTypeStats,
    pub skipped: SkipCounts,
    pub analysis: String,
    pub model: String,
    pub backend: BackendKind,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON.
    ///
    /// The JSON goes to a sibling temp file first and is renamed over `path`,
    /// so readers never see a half-written report.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        let file_name = path
            .file_name()
            .ok_or_else(|| Error::Config(format!("Output path has no file name: {}", path.display())))?;
        let mut tmp_name = std::ffi::OsString::from(".");
        tmp_name.push(file_name);
        tmp_name.push(".tmp");
        let tmp = path.with_file_name(tmp_name);

        fs::write(&tmp, json)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        info!("Saved report to {}", path.display());
        Ok(())
    }
}

/// Per-extension and per-category counts over discovered files.
pub fn file_type_stats(files: &[FileDescriptor]) -> FileTypeStats {
    let mut stats = FileTypeStats::default();
    for file in files {
        let ext = file.extension().unwrap_or_else(|| "(none)".to_string());
        let entry = stats.by_extension.entry(ext).or_insert_with(ExtensionStats::default);
        entry.count += 1;
        entry.total_bytes += file.size_bytes;

        *stats
            .by_kind
            .entry(FileType::from_path(&file.path).label())
            .or_insert(0) += 1;

        stats.total_files += 1;
        stats.total_bytes += file.size_bytes;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(path: &str, size: u64) -> FileDescriptor {
        FileDescriptor {
            path: PathBuf::from(path),
            modified_at: Utc::now(),
            size_bytes: size,
        }
    }

    fn report(files: Vec<FileDescriptor>) -> Report {
        Report {
            folder: PathBuf::from("/vault"),
            days: 30,
            file_count: files.len(),
            file_types: file_type_stats(&files),
            files,
            skipped: SkipCounts::default(),
            analysis: "Mostly notes.".into(),
            model: "llama3.2".into(),
            backend: BackendKind::Ollama,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_file_type_stats() {
        let files = vec![
            descriptor("/v/a.md", 10),
            descriptor("/v/b.MD", 5),
            descriptor("/v/c.py", 100),
            descriptor("/v/Makefile", 7),
        ];
        let stats = file_type_stats(&files);

        assert_eq!(stats.total_files, 4);
        assert_eq!(stats.total_bytes, 122);
        assert_eq!(
            stats.by_extension["md"],
            ExtensionStats {
                count: 2,
                total_bytes: 15
            }
        );
        assert_eq!(stats.by_extension["(none)"].count, 1);
        assert_eq!(stats.by_kind["markdown"], 2);
        assert_eq!(stats.by_kind["code"], 1);
        assert_eq!(stats.by_kind["other"], 1);
    }

    #[test]
    fn test_save_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = report(vec![descriptor("/v/a.md", 3)]);

        report.save(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["folder"], "/vault");
        assert_eq!(value["days"], 30);
        assert_eq!(value["file_count"], 1);
        assert_eq!(value["files"][0]["path"], "/v/a.md");
        assert_eq!(value["files"][0]["size_bytes"], 3);
        assert_eq!(value["analysis"], "Mostly notes.");
        assert_eq!(value["backend"], "ollama");
        assert_eq!(value["skipped"]["walk"], 0);

        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("report.json");
        assert!(matches!(
            report(vec![]).save(&path),
            Err(Error::Io(_))
        ));
        assert!(!path.exists());
    }
}
