//! Marker detection: does a header need moc at all?

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Returns `true` as soon as a line containing `marker` is found.
///
/// Lines are compared as raw bytes, so headers with stray Latin-1 comments
/// are scanned like any other file instead of failing UTF-8 decoding.
pub fn contains_marker(path: &Path, marker: &str) -> io::Result<bool> {
    let needle = marker.as_bytes();
    if needle.is_empty() {
        return Ok(true);
    }
    let mut reader = BufReader::new(File::open(path)?);
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(false);
        }
        if line.windows(needle.len()).any(|w| w == needle) {
            return Ok(true);
        }
    }
}
