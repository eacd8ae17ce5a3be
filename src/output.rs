//! CLI output formatting.
//!
//! # Streams
//!
//! stdout belongs to the build system. In `--check` mode it is parsed line
//! by line as a file list, so nothing but the listing may be printed there.
//! Diagnostics go through `tracing` to stderr.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! widgets/main_window.h
//! core/model.h
//! ```
//!
//! ## Compile
//!
//! ```text
//! generated src/widgets/main_window.h → moc_main_window.moc
//! FAILED src/core/model.h
//!     /opt/qt/bin/moc exited with exit status: 1: model.h:12: Parse error
//! Cache: 14 up to date, 1 generated, 1 failed (16 total)
//! Combined output not updated; stale: src/core/model.h
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::compile::{CompileReport, GenerationEvent};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

// ============================================================================
// Check
// ============================================================================

pub fn print_listing(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Compile
// ============================================================================

/// Format a single generation event as display lines.
pub fn format_generation_event(event: &GenerationEvent) -> Vec<String> {
    match event {
        GenerationEvent::Generated { source, fragment } => {
            vec![format!("generated {} → {}", source, file_name(fragment))]
        }
        GenerationEvent::Failed { source, reason } => {
            vec![format!("FAILED {}", source), format!("{}{}", indent(1), reason)]
        }
    }
}

/// Format the end-of-run summary.
pub fn format_compile_summary(report: &CompileReport, output_file: &Path) -> Vec<String> {
    let mut lines = vec![format!("Cache: {}", report.stats)];
    if !report.failures.is_empty() {
        let stale: Vec<&str> = report.failures.iter().map(|f| f.source.as_str()).collect();
        lines.push(format!(
            "Combined output not updated; stale: {}",
            stale.join(", ")
        ));
    } else if let Some(count) = report.combined {
        lines.push(format!(
            "Combined {} fragments → {}",
            count,
            output_file.display()
        ));
    } else {
        lines.push("Nothing regenerated; combined output left as is".to_string());
    }
    lines
}

pub fn print_compile_summary(report: &CompileReport, output_file: &Path) {
    for line in format_compile_summary(report, output_file) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
