//! Recursive discovery of recently modified files.
//!
//! Walks a root directory, keeps files whose extension is allow-listed and
//! whose modification time falls inside the recency window, and returns them
//! newest first. Unreadable entries are recorded and skipped; only a bad root
//! aborts the walk.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use recap_core::{default_extensions, normalize_extension, Error, Result, Settings};

/// A file found inside the recency window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDescriptor {
    /// Absolute path.
    pub path: PathBuf,
    pub modified_at: DateTime<Utc>,
    pub size_bytes: u64,
}

impl FileDescriptor {
    /// Lower-case extension without the dot.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(normalize_extension)
    }
}

/// A directory entry that could not be inspected.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
    pub path: Option<PathBuf>,
    pub reason: String,
}

/// Filters applied during the walk.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Normalized extensions (see [`normalize_extension`]).
    pub extensions: BTreeSet<String>,
    pub skip_hidden: bool,
    pub follow_links: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            skip_hidden: true,
            follow_links: false,
        }
    }
}

impl From<&Settings> for DiscoveryOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            extensions: settings.extensions.clone(),
            skip_hidden: settings.skip_hidden,
            follow_links: settings.follow_links,
        }
    }
}

/// Result of one walk.
#[derive(Debug, Clone, Serialize)]
pub struct Discovery {
    /// Canonicalized root.
    pub root: PathBuf,
    pub cutoff: DateTime<Utc>,
    /// Newest first; ties ordered by path.
    pub files: Vec<FileDescriptor>,
    pub skipped: Vec<SkippedEntry>,
}

/// Find files under `root` modified within `since` of now.
///
/// A window reaching past the earliest representable instant covers everything.
pub fn discover(root: &Path, since: Duration, options: &DiscoveryOptions) -> Result<Discovery> {
    let cutoff = Utc::now()
        .checked_sub_signed(since)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    discover_since(root, cutoff, options)
}

/// Find files under `root` modified at or after `cutoff`.
pub fn discover_since(
    root: &Path,
    cutoff: DateTime<Utc>,
    options: &DiscoveryOptions,
) -> Result<Discovery> {
    let root = validate_root(root)?;
    info!(
        "Scanning {} for files modified since {}",
        root.display(),
        cutoff.to_rfc3339()
    );

    let mut files = Vec::new();
    let mut skipped = Vec::new();
    let mut visited_dirs: HashSet<PathBuf> = HashSet::new();

    let walker = WalkDir::new(&root)
        .follow_links(options.follow_links)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| should_enter(entry, options, &mut visited_dirs));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                skipped.push(SkippedEntry {
                    path: e.path().map(Path::to_path_buf),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() || !matches_extension(entry.path(), &options.extensions) {
            continue;
        }

        // Unfollowed symlinks are stat'ed through so dangling ones get counted.
        let metadata = if file_type.is_symlink() {
            std::fs::metadata(entry.path())
        } else {
            entry.metadata().map_err(std::io::Error::from)
        };
        let metadata = match metadata {
            Ok(m) if m.is_file() => m,
            Ok(_) => continue,
            Err(e) => {
                debug!("Cannot stat {}: {}", entry.path().display(), e);
                skipped.push(SkippedEntry {
                    path: Some(entry.path().to_path_buf()),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let modified_at: DateTime<Utc> = match metadata.modified() {
            Ok(t) => t.into(),
            Err(e) => {
                skipped.push(SkippedEntry {
                    path: Some(entry.path().to_path_buf()),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if modified_at < cutoff {
            continue;
        }

        files.push(FileDescriptor {
            path: entry.into_path(),
            modified_at,
            size_bytes: metadata.len(),
        });
    }

    sort_newest_first(&mut files);

    info!(
        "Found {} recent files ({} entries skipped)",
        files.len(),
        skipped.len()
    );

    Ok(Discovery {
        root,
        cutoff,
        files,
        skipped,
    })
}

fn validate_root(root: &Path) -> Result<PathBuf> {
    let metadata = std::fs::metadata(root)
        .map_err(|e| Error::InvalidRoot(format!("{}: {}", root.display(), e)))?;
    if !metadata.is_dir() {
        return Err(Error::InvalidRoot(format!(
            "{} is not a directory",
            root.display()
        )));
    }
    root.canonicalize()
        .map_err(|e| Error::InvalidRoot(format!("{}: {}", root.display(), e)))
}

/// Decide whether the walker yields (and, for directories, descends into) an entry.
fn should_enter(entry: &DirEntry, options: &DiscoveryOptions, visited: &mut HashSet<PathBuf>) -> bool {
    if entry.depth() > 0 && options.skip_hidden && is_hidden(entry) {
        return false;
    }

    if options.follow_links && entry.file_type().is_dir() {
        // Each real directory is entered once, whatever link led to it.
        let key = entry
            .path()
            .canonicalize()
            .unwrap_or_else(|_| entry.path().to_path_buf());
        if !visited.insert(key) {
            debug!("Already visited {}, skipping", entry.path().display());
            return false;
        }
    }

    true
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn matches_extension(path: &Path, extensions: &BTreeSet<String>) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&normalize_extension(e)))
        .unwrap_or(false)
}

/// Descending modification time, ties broken by path bytes.
fn sort_newest_first(files: &mut [FileDescriptor]) {
    files.sort_by(|a, b| {
        b.modified_at
            .cmp(&a.modified_at)
            .then_with(|| a.path.as_os_str().cmp(b.path.as_os_str()))
    });
}
