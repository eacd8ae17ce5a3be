//! Concatenate moc fragments into the single file the build compiles.
//!
//! Fragments are discovered by walking the fragments directory rather than
//! from the cache, so a fragment whose header dropped out of the input list
//! is still included until someone cleans the build tree. The walk is sorted
//! by path: the combined file's byte layout depends only on what is on disk,
//! never on directory enumeration order.
//!
//! The combined file is written to a temporary file next to it and renamed
//! into place, so a failure halfway through leaves the previous output intact.

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum CombineError {
    #[error("cannot list fragments in {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("cannot read fragment {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Every `*.{extension}` file under `dir`, recursively, sorted by path.
///
/// `exclude` is skipped even if it carries the fragment extension, so an
/// output file named like a fragment never swallows itself.
pub fn list_fragments(
    dir: &Path,
    extension: &str,
    exclude: &Path,
) -> Result<Vec<PathBuf>, CombineError> {
    let mut fragments = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|source| CombineError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(extension)
            && path != exclude
        {
            fragments.push(path.to_path_buf());
        }
    }
    fragments.sort();
    Ok(fragments)
}

/// Overwrite `output_file` with the concatenation of all fragments.
///
/// Returns the number of fragments written.
pub fn combine(dir: &Path, extension: &str, output_file: &Path) -> Result<usize, CombineError> {
    let fragments = list_fragments(dir, extension, output_file)?;
    let write_err = |source| CombineError::Write {
        path: output_file.to_path_buf(),
        source,
    };

    let parent = match output_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_err)?;

    let mut out = BufWriter::new(NamedTempFile::new_in(parent).map_err(write_err)?);
    for fragment in &fragments {
        let content = std::fs::read(fragment).map_err(|source| CombineError::Read {
            path: fragment.clone(),
            source,
        })?;
        out.write_all(&content).map_err(write_err)?;
    }
    let staged = out.into_inner().map_err(|e| write_err(e.into_error()))?;
    staged
        .persist(output_file)
        .map_err(|e| write_err(e.error))?;

    tracing::debug!(
        fragments = fragments.len(),
        output = %output_file.display(),
        "combined fragments"
    );
    Ok(fragments.len())
}
