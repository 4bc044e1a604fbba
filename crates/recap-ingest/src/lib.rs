//! Recap Ingest — recent-file discovery, text decoding, Markdown normalization.
//!
//! `discover` walks a folder for files modified inside a recency window.
//! `Extractor` turns each hit into bounded, decoded text ready for a prompt.

pub mod decode;
pub mod discover;
pub mod extract;
pub mod file;
pub mod markdown;

pub use decode::{decode, Decoded};
pub use discover::{discover, discover_since, Discovery, DiscoveryOptions, FileDescriptor, SkippedEntry};
pub use extract::{extract, truncate_chars, ExtractedDocument, ExtractionBatch, Extractor, FileFailure};
pub use file::FileType;
pub use markdown::{normalize, MarkdownMeta, Normalized};
