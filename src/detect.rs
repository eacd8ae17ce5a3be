//! Per-file regeneration decision.
//!
//! This is the only gate between an input header and a moc invocation. It
//! is evaluated once per file per compile run.

use crate::cache::{CacheManifest, hash_file};
use crate::marker::contains_marker;
use std::io;
use std::path::Path;

/// Outcome of inspecting one input file against the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// No marker: moc has nothing to do with this file.
    NotCandidate,
    /// Has the marker but was never generated before.
    New { fingerprint: String },
    /// Has the marker and its content changed since the cached run.
    Changed { fingerprint: String },
    /// Has the marker and matches the cached fingerprint.
    UpToDate,
}

impl Decision {
    /// Fingerprint to commit after regenerating, or `None` when moc should
    /// not run.
    pub fn into_fingerprint(self) -> Option<String> {
        match self {
            Decision::New { fingerprint } | Decision::Changed { fingerprint } => Some(fingerprint),
            Decision::NotCandidate | Decision::UpToDate => None,
        }
    }
}

/// Decide whether `path` (cached under `key`) needs moc to run again.
pub fn needs_regeneration(
    path: &Path,
    key: &str,
    marker: &str,
    cache: &CacheManifest,
) -> io::Result<Decision> {
    if !contains_marker(path, marker)? {
        return Ok(Decision::NotCandidate);
    }
    let fingerprint = hash_file(path)?;
    Ok(match cache.get(key) {
        None => Decision::New { fingerprint },
        Some(entry) if entry.fingerprint != fingerprint => Decision::Changed { fingerprint },
        Some(_) => Decision::UpToDate,
    })
}
