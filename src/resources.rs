//! The rcc family: list the files a `.qrc` resource manifest pulls in.
//!
//! The build system uses the listing as extra dependencies of the resource
//! target, so touching an icon re-runs rcc. Each `<file>` entry is reported
//! relative to the source root, prefixed with the manifest's own directory:
//!
//! ```text
//! res/app.qrc:  <file>icons/open.png</file>
//! listing:      res/icons/open.png
//! ```
//!
//! A manifest sitting directly in the source root yields `./icons/open.png`.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

use crate::paths::relative_to;

/// `<file>` with optional attributes (`alias="..."`), capturing the body.
static FILE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<file(?:\s[^>]*)?>(.*?)</file>").expect("file tag pattern is valid")
});

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("cannot read resource manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Every file referenced by `manifests`, in manifest then line order.
pub fn list_references(
    manifests: &[PathBuf],
    source_dir: &Path,
) -> Result<Vec<String>, ResourceError> {
    let mut references = Vec::new();
    for manifest in manifests {
        let content = std::fs::read_to_string(manifest).map_err(|source| ResourceError::Read {
            path: manifest.clone(),
            source,
        })?;
        let dir = relative_to(manifest.parent().unwrap_or(Path::new("")), source_dir);
        references.extend(
            FILE_TAG
                .captures_iter(&content)
                .map(|caps| format!("{dir}/{}", &caps[1])),
        );
    }
    Ok(references)
}
