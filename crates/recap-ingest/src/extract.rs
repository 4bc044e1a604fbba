//! Content extraction: bounded read → decode → normalize → truncate.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use recap_core::config::{DEFAULT_MAX_CHARS, DEFAULT_MAX_FILE_BYTES};
use recap_core::{Error, Result, Settings};

use crate::decode::decode;
use crate::discover::FileDescriptor;
use crate::file::FileType;
use crate::markdown::{self, MarkdownMeta};

/// Decoded, possibly truncated text of one file, ready for a prompt.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedDocument {
    pub path: PathBuf,
    pub modified_at: DateTime<Utc>,
    pub text: String,
    pub encoding_used: String,
    pub truncated: bool,
    /// Markers stripped from Markdown notes; `None` for other files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<MarkdownMeta>,
}

/// A file that could not be extracted.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: Error,
}

/// Per-file outcomes of a batch, in input order.
#[derive(Debug, Default)]
pub struct ExtractionBatch {
    pub documents: Vec<ExtractedDocument>,
    pub failures: Vec<FileFailure>,
}

impl ExtractionBatch {
    /// Failure counts keyed by error kind (`unreadable`, `too_large`).
    pub fn failure_summary(&self) -> BTreeMap<&'static str, usize> {
        let mut summary = BTreeMap::new();
        for failure in &self.failures {
            *summary.entry(failure.error.kind()).or_insert(0) += 1;
        }
        summary
    }
}

/// Reads files into bounded prompt text.
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    pub max_chars: usize,
    pub max_file_bytes: u64,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS, DEFAULT_MAX_FILE_BYTES)
    }
}

impl Extractor {
    pub fn new(max_chars: usize, max_file_bytes: u64) -> Self {
        Self {
            max_chars,
            max_file_bytes,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.max_chars, settings.max_file_bytes)
    }

    /// Extract one file. Fails with `FileTooLarge` or `UnreadableFile`.
    pub fn extract(&self, descriptor: &FileDescriptor) -> Result<ExtractedDocument> {
        let bytes = read_bounded(&descriptor.path, self.max_file_bytes)?;

        let decoded = decode(&bytes).ok_or_else(|| Error::UnreadableFile {
            path: descriptor.path.clone(),
            reason: "no viable text encoding (binary content)".into(),
        })?;

        let (text, markdown) = if FileType::from_path(&descriptor.path).is_markdown() {
            let normalized = markdown::normalize(&decoded.text);
            (normalized.text, Some(normalized.meta))
        } else {
            (decoded.text, None)
        };

        let (text, truncated) = truncate_chars(&text, self.max_chars);

        debug!(
            "Extracted {} ({}, {} chars{})",
            descriptor.path.display(),
            decoded.encoding,
            text.chars().count(),
            if truncated { ", truncated" } else { "" }
        );

        Ok(ExtractedDocument {
            path: descriptor.path.clone(),
            modified_at: descriptor.modified_at,
            text: text.to_string(),
            encoding_used: decoded.encoding.to_string(),
            truncated,
            markdown,
        })
    }

    /// Extract every descriptor; a failing file never stops the rest.
    pub fn extract_batch(&self, descriptors: &[FileDescriptor]) -> ExtractionBatch {
        let mut batch = ExtractionBatch::default();
        for descriptor in descriptors {
            match self.extract(descriptor) {
                Ok(doc) => batch.documents.push(doc),
                Err(error) => {
                    warn!("Skipping {}: {}", descriptor.path.display(), error);
                    batch.failures.push(FileFailure {
                        path: descriptor.path.clone(),
                        error,
                    });
                }
            }
        }
        batch
    }
}

/// Extract one file with the default size ceiling.
pub fn extract(descriptor: &FileDescriptor, max_chars: usize) -> Result<ExtractedDocument> {
    Extractor::new(max_chars, DEFAULT_MAX_FILE_BYTES).extract(descriptor)
}

/// Cut `text` to at most `max_chars` characters, on a character boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

/// Read a whole file, refusing anything above `limit` bytes without reading it.
fn read_bounded(path: &Path, limit: u64) -> Result<Vec<u8>> {
    let unreadable = |e: std::io::Error| Error::UnreadableFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    let too_large = |size: u64| Error::FileTooLarge {
        path: path.to_path_buf(),
        size,
        limit,
    };

    let file = File::open(path).map_err(unreadable)?;
    let size = file.metadata().map_err(unreadable)?.len();
    if size > limit {
        return Err(too_large(size));
    }

    // The file may grow between stat and read; never pull more than limit + 1.
    let mut bytes = Vec::with_capacity(size as usize);
    file.take(limit + 1)
        .read_to_end(&mut bytes)
        .map_err(unreadable)?;
    if bytes.len() as u64 > limit {
        return Err(too_large(bytes.len() as u64));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::SHIFT_JIS;
    use std::fs;

    fn descriptor_for(path: &Path) -> FileDescriptor {
        let metadata = fs::metadata(path).unwrap();
        FileDescriptor {
            path: path.to_path_buf(),
            modified_at: metadata.modified().unwrap().into(),
            size_bytes: metadata.len(),
        }
    }

    fn write(dir: &Path, name: &str, bytes: &[u8]) -> FileDescriptor {
        let path = dir.join(name);
        fs::write(&path, bytes).unwrap();
        descriptor_for(&path)
    }

    #[test]
    fn test_utf8_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let source = "{\"title\": \"週報\", \"done\": [\"draft\", \"review\"]}";
        let desc = write(dir.path(), "data.json", source.as_bytes());

        let doc = extract(&desc, 10_000).unwrap();
        assert_eq!(doc.encoding_used, "utf-8");
        assert_eq!(doc.text, source);
        assert!(!doc.truncated);
        assert!(doc.markdown.is_none());
        assert_eq!(doc.path, desc.path);
        assert_eq!(doc.modified_at, desc.modified_at);
    }

    #[test]
    fn test_shift_jis_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = "議事録：来週までに仕様を確定する。";
        let (bytes, _, _) = SHIFT_JIS.encode(source);
        let desc = write(dir.path(), "minutes.txt", &bytes);

        let doc = extract(&desc, 10_000).unwrap();
        assert_eq!(doc.encoding_used, "shift_jis");
        assert_eq!(doc.text, source);
    }

    #[test]
    fn test_truncation_is_exact_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let source = "あいうえおかきくけこ".repeat(5);
        let desc = write(dir.path(), "long.txt", source.as_bytes());

        let doc = extract(&desc, 7).unwrap();
        assert!(doc.truncated);
        assert_eq!(doc.text.chars().count(), 7);
        assert_eq!(doc.text, "あいうえおかき");
        assert!(source.starts_with(&doc.text));
    }

    #[test]
    fn test_exact_length_not_truncated() {
        let (text, truncated) = truncate_chars("héllo", 5);
        assert_eq!(text, "héllo");
        assert!(!truncated);

        let (text, truncated) = truncate_chars("héllo", 2);
        assert_eq!(text, "hé");
        assert!(truncated);

        let (text, truncated) = truncate_chars("abc", 0);
        assert_eq!(text, "");
        assert!(truncated);
    }

    #[test]
    fn test_markdown_normalized_then_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let desc = write(
            dir.path(),
            "note.md",
            b"Met with [[Note A]] about #project.\nShipped. ^block1\n",
        );

        let doc = extract(&desc, 10_000).unwrap();
        assert_eq!(doc.text, "Met with Note A about .\nShipped.\n");
        let meta = doc.markdown.unwrap();
        assert_eq!(meta.links, vec!["Note A"]);
        assert_eq!(meta.tags, vec!["project"]);
        assert_eq!(meta.block_refs, vec!["block1"]);

        let doc = extract(&desc, 8).unwrap();
        assert_eq!(doc.text, "Met with");
        assert!(doc.truncated);
    }

    #[test]
    fn test_plain_text_not_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let source = "TODO: link [[Note A]] #project ^block1";
        let desc = write(dir.path(), "todo.txt", source.as_bytes());

        let doc = extract(&desc, 10_000).unwrap();
        assert_eq!(doc.text, source);
    }

    #[test]
    fn test_binary_file_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let desc = write(dir.path(), "blob.json", &[0x00, 0x9F, 0x92, 0x96, 0x00]);

        let result = extract(&desc, 100);
        assert!(matches!(result, Err(Error::UnreadableFile { .. })));
    }

    #[test]
    fn test_oversized_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let desc = write(dir.path(), "big.txt", &[b'a'; 64]);

        let extractor = Extractor::new(100, 32);
        match extractor.extract(&desc) {
            Err(Error::FileTooLarge { size, limit, .. }) => {
                assert_eq!(size, 64);
                assert_eq!(limit, 32);
            }
            other => panic!("expected FileTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let desc = write(dir.path(), "gone.md", b"soon deleted");
        fs::remove_file(&desc.path).unwrap();

        assert!(matches!(
            extract(&desc, 100),
            Err(Error::UnreadableFile { .. })
        ));
    }

    #[test]
    fn test_batch_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let descriptors = vec![
            write(dir.path(), "1.md", b"first"),
            write(dir.path(), "2.txt", b"second"),
            write(dir.path(), "3.json", &[0x7B, 0x00, 0x7D]),
            write(dir.path(), "4.csv", b"a,b\n1,2"),
            write(dir.path(), "5.yml", b"key: value"),
        ];

        let batch = Extractor::default().extract_batch(&descriptors);

        assert_eq!(batch.documents.len(), 4);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].path, descriptors[2].path);
        let order: Vec<&str> = batch.documents.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "a,b\n1,2", "key: value"]);
        assert_eq!(batch.failure_summary().get("unreadable"), Some(&1));
    }
}
