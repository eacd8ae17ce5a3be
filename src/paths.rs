//! Path normalization shared by the moc and rcc commands.
//!
//! Build systems on Windows hand us a mix of `\` and `\\` separators. Every
//! path that ends up in the cache or in listing output is normalized to `/`
//! first, so cache keys stay stable no matter which generator invoked us.
//!
//! Inputs are also made absolute and lexically normalized, so `a.h`,
//! `./a.h` and `ui/../a.h` under the same root are one cache key.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Replace `\\` and `\` separators with `/`.
pub fn to_standard_path(path: &str) -> String {
    path.replace("\\\\", "/").replace('\\', "/")
}

/// Render a path with `/` separators regardless of platform.
pub fn display_path(path: &Path) -> String {
    to_standard_path(&path.to_string_lossy())
}

/// Absolute, lexically normalized, `/`-separated form of `path`.
///
/// Relative paths are taken against the current directory. Symlinks are not
/// resolved.
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    let path = PathBuf::from(display_path(path));
    let absolute = std::path::absolute(&path)?;
    Ok(PathBuf::from(display_path(&normalize(&absolute))))
}

/// Resolve an input entry against the source root.
///
/// Absolute entries are kept as-is apart from normalization, which is what
/// `Path::join` does anyway.
pub fn resolve_input(source_dir: &Path, entry: &str) -> io::Result<PathBuf> {
    absolute_path(&source_dir.join(to_standard_path(entry)))
}

/// Express `path` relative to `base`, using `/` separators.
///
/// Returns `"."` when both are the same directory. Paths outside `base` are
/// returned unchanged.
pub fn relative_to(path: &Path, base: &Path) -> String {
    let path = normalize(path);
    let base = normalize(base);
    match path.strip_prefix(&base) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => display_path(rel),
        Err(_) => display_path(&path),
    }
}

/// Lexically drop `.` components and fold `..` where possible.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
