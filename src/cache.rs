//! Fingerprint cache for incremental moc runs.
//!
//! Running moc over every header on every build is what this tool exists to
//! avoid. The cache remembers, per source header, the content fingerprint it
//! had when its fragment was last generated and where that fragment lives.
//!
//! # Design
//!
//! ## Keys
//!
//! Entries are keyed by the **absolute, `/`-normalized source path**. The
//! fingerprint is a SHA-256 of the file contents rather than an mtime so a
//! `git checkout` that resets timestamps does not trigger a full rebuild.
//!
//! ## Fragment paths
//!
//! Each source gets exactly one fragment path, recorded in its entry. Once
//! assigned, the path never changes for that source (unless the cache is
//! dropped), so a regenerated fragment always overwrites its predecessor
//! instead of leaving a stale twin behind for the combiner to pick up.
//!
//! New paths are derived from the source's file stem (`widget.h` →
//! `moc_widget.moc`). Two headers with the same stem in different
//! directories would collide, so a numeric suffix (`moc_widget_1.moc`,
//! `moc_widget_2.moc`, ...) is appended until the path is neither on disk nor
//! claimed by another entry. Claims include paths resolved earlier in the
//! same run whose fragments have not been written yet.
//!
//! ## Failed regenerations
//!
//! When moc fails on a header, its fragment is deleted and its entry keeps
//! the fragment path but loses the fingerprint ([`CacheManifest::invalidate`]).
//! An entry whose fingerprint matches therefore always has its fragment on
//! disk. The manifest also records `combine_pending` while fragments have
//! changed since the combined output was last written, so a later run with
//! nothing to regenerate still brings the combined output up to date.
//!
//! ## Storage
//!
//! The manifest is a JSON file inside the fragments directory. Entries are
//! kept in a `BTreeMap` and written with `to_string_pretty`, so saving an
//! unchanged cache produces byte-identical output.
//!
//! There is no locking: two concurrent invocations against the same output
//! directory will race on this file.

use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::paths::display_path;

/// Version of the cache manifest format. Bump this to invalidate all
/// existing caches when the format or key computation changes.
const MANIFEST_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cannot access cache file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cache file {path} is corrupt: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// What we know about one source header.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub fingerprint: String,
    pub generated_path: String,
}

/// On-disk cache mapping source paths to their cache entries.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: BTreeMap<String, CacheEntry>,
    /// Fragments changed since the combined output was last written.
    #[serde(default)]
    pub combine_pending: bool,
    /// Runtime set of fragment paths that are taken, either by an entry or
    /// by a resolution earlier in this run. Never serialized.
    #[serde(skip)]
    claimed: HashSet<String>,
}

#[derive(serde::Deserialize)]
struct VersionProbe {
    version: u32,
}

impl CacheManifest {
    /// Create an empty manifest (used for `--no-cache` or first build).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: BTreeMap::new(),
            combine_pending: false,
            claimed: HashSet::new(),
        }
    }

    /// Load the manifest at `path`.
    ///
    /// A missing file is a first build and yields an empty manifest. A file
    /// written by a different format version is discarded the same way. A
    /// file that is not valid JSON is an error: silently starting over would
    /// hide whatever clobbered it.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::empty()),
            Err(source) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let parse_err = |source| CacheError::Parse {
            path: path.to_path_buf(),
            source,
        };

        let probe: VersionProbe = serde_json::from_str(&content).map_err(parse_err)?;
        if probe.version != MANIFEST_VERSION {
            tracing::warn!(
                path = %path.display(),
                found = probe.version,
                expected = MANIFEST_VERSION,
                "discarding cache written by another format version"
            );
            return Ok(Self::empty());
        }

        let mut manifest: Self = serde_json::from_str(&content).map_err(parse_err)?;
        manifest.claimed = manifest
            .entries
            .values()
            .map(|e| e.generated_path.clone())
            .collect();
        Ok(manifest)
    }

    /// Write the manifest to `path`, creating its directory if needed.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let io_err = |source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut json = serde_json::to_string_pretty(self).map_err(|source| CacheError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        json.push('\n');
        std::fs::write(path, json).map_err(io_err)
    }

    pub fn get(&self, source: &str) -> Option<&CacheEntry> {
        self.entries.get(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fragment path for `source`, claiming a fresh one if it has none yet.
    ///
    /// The first candidate is `{dir}/{prefix}{stem}.{extension}`; on
    /// collision `_1`, `_2`, ... are appended to the stem.
    pub fn resolve_output_path(
        &mut self,
        source: &str,
        dir: &Path,
        prefix: &str,
        extension: &str,
    ) -> String {
        if let Some(entry) = self.entries.get(source) {
            return entry.generated_path.clone();
        }

        let stem = Path::new(source)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = display_path(dir);
        let dir = dir.trim_end_matches('/');

        let mut candidate = format!("{dir}/{prefix}{stem}.{extension}");
        let mut index = 1;
        while self.is_taken(&candidate) {
            candidate = format!("{dir}/{prefix}{stem}_{index}.{extension}");
            index += 1;
        }
        self.claimed.insert(candidate.clone());
        candidate
    }

    fn is_taken(&self, candidate: &str) -> bool {
        self.claimed.contains(candidate) || Path::new(candidate).exists()
    }

    /// Insert or replace the entry for `source`.
    pub fn upsert(&mut self, source: String, fingerprint: String, generated_path: String) {
        self.claimed.insert(generated_path.clone());
        self.entries.insert(
            source,
            CacheEntry {
                fingerprint,
                generated_path,
            },
        );
    }

    /// Forget the fingerprint of `source` but keep its fragment path, so the
    /// next run regenerates it into the same file.
    pub fn invalidate(&mut self, source: &str) {
        if let Some(entry) = self.entries.get_mut(source) {
            entry.fingerprint.clear();
        }
    }
}

/// SHA-256 of a file's contents as a hex string, streamed from disk.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Summary of what a compile run did with each candidate header.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompileStats {
    pub up_to_date: u32,
    pub generated: u32,
    pub failed: u32,
    /// Inputs without the marker; not counted in [`CompileStats::total`].
    pub skipped: u32,
}

impl CompileStats {
    pub fn total(&self) -> u32 {
        self.up_to_date + self.generated + self.failed
    }
}

impl fmt::Display for CompileStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.up_to_date == 0 && self.failed == 0 {
            return write!(f, "{} generated", self.generated);
        }
        write!(f, "{} up to date, {} generated", self.up_to_date, self.generated)?;
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        write!(f, " ({} total)", self.total())
    }
}
