//! The moc family: candidate listing and incremental compilation.
//!
//! ## Compile pipeline
//!
//! ```text
//! load cache → decide per header → dispatch moc in parallel → commit → save cache → combine
//! ```
//!
//! Every input header goes through [`needs_regeneration`]. Headers that need
//! moc get a fragment path from the cache and become a [`GenerationTask`].
//! Tasks run on a dedicated rayon pool sized from the processing config; each
//! writes its own fragment, so they need no coordination.
//!
//! ## Commit after success
//!
//! The cache is only touched on the calling thread: path claims before
//! dispatch, entry commits after the pool has drained. A task whose
//! generator fails is not committed and its partial fragment is deleted, so
//! the next run sees the header as changed (or new) and tries again.
//!
//! The cache is saved whether or not generation failed. The combined output
//! is rewritten only when at least one fragment was regenerated and none
//! failed; after a failure it is left untouched and the report names the
//! headers whose fragments are missing or stale.

use rayon::prelude::*;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

use crate::cache::{CacheError, CacheManifest, CompileStats};
use crate::combine::{CombineError, combine, list_fragments};
use crate::config::MocLayout;
use crate::detect::{Decision, needs_regeneration};
use crate::generator::Generator;
use crate::marker::contains_marker;
use crate::paths::{display_path, relative_to};

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("cannot read input {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Combine(#[from] CombineError),
    #[error("cannot prepare {path}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("{} file(s) failed to generate, combined output not updated: {}", .0.len(), .0.join(", "))]
    GenerationFailed(Vec<String>),
}

/// One header to run through the generator.
#[derive(Debug, Clone)]
pub struct GenerationTask {
    pub input: PathBuf,
    /// Cache key: the `/`-normalized input path.
    pub key: String,
    pub output: String,
    fingerprint: String,
}

/// Progress reported as each generation task finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    Generated { source: String, fragment: String },
    Failed { source: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFile {
    pub source: String,
    pub reason: String,
}

/// What a compile run did.
#[derive(Debug, Default)]
pub struct CompileReport {
    pub stats: CompileStats,
    /// At least one task was dispatched.
    pub regenerated: bool,
    pub failures: Vec<FailedFile>,
    /// Fragment count written to the combined output, if it was rewritten.
    pub combined: Option<usize>,
}

impl CompileReport {
    /// Turn recorded generation failures into an error.
    pub fn ensure_success(&self) -> Result<(), CompileError> {
        if self.failures.is_empty() {
            return Ok(());
        }
        Err(CompileError::GenerationFailed(
            self.failures.iter().map(|f| f.source.clone()).collect(),
        ))
    }
}

/// Source-relative paths of the inputs that contain `marker`, in input order.
pub fn list_candidates(
    inputs: &[PathBuf],
    source_dir: &Path,
    marker: &str,
) -> Result<Vec<String>, CompileError> {
    let mut candidates = Vec::new();
    for input in inputs {
        let has_marker = contains_marker(input, marker).map_err(|source| CompileError::Input {
            path: input.clone(),
            source,
        })?;
        if has_marker {
            candidates.push(relative_to(input, source_dir));
        }
    }
    Ok(candidates)
}

/// Regenerate every input whose fingerprint changed, committing successes
/// into `cache`.
///
/// Returns once every dispatched task has finished.
pub fn compile(
    inputs: &[PathBuf],
    cache: &mut CacheManifest,
    layout: &MocLayout,
    marker: &str,
    generator: &impl Generator,
    workers: usize,
    events: Option<Sender<GenerationEvent>>,
) -> Result<CompileReport, CompileError> {
    let mut report = CompileReport::default();
    let mut seen = HashSet::new();
    let mut tasks = Vec::new();

    for input in inputs {
        let key = display_path(input);
        if !seen.insert(key.clone()) {
            continue;
        }
        let decision =
            needs_regeneration(input, &key, marker, cache).map_err(|source| CompileError::Input {
                path: input.clone(),
                source,
            })?;
        tracing::debug!(source = %key, ?decision, "inspected");

        if decision == Decision::NotCandidate {
            report.stats.skipped += 1;
            continue;
        }
        let Some(fingerprint) = decision.into_fingerprint() else {
            report.stats.up_to_date += 1;
            continue;
        };
        let output = cache.resolve_output_path(
            &key,
            &layout.fragments_dir,
            &layout.fragment_prefix,
            &layout.fragment_extension,
        );
        tasks.push(GenerationTask {
            input: input.clone(),
            key,
            output,
            fingerprint,
        });
    }

    if tasks.is_empty() {
        return Ok(report);
    }
    report.regenerated = true;

    let workers = workers.max(1);
    tracing::info!(tasks = tasks.len(), workers, "dispatching generator");
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()?;
    let results = pool.install(|| {
        tasks
            .into_par_iter()
            .map(|task| {
                let result = generator.generate(&task.input, Path::new(&task.output));
                if let Some(tx) = &events {
                    let event = match &result {
                        Ok(()) => GenerationEvent::Generated {
                            source: task.key.clone(),
                            fragment: task.output.clone(),
                        },
                        Err(err) => GenerationEvent::Failed {
                            source: task.key.clone(),
                            reason: err.to_string(),
                        },
                    };
                    // Printer gone means nobody is listening; the result still counts.
                    let _ = tx.send(event);
                }
                (task, result)
            })
            .collect::<Vec<_>>()
    });

    for (task, result) in results {
        match result {
            Ok(()) => {
                report.stats.generated += 1;
                cache.upsert(task.key, task.fingerprint, task.output);
            }
            Err(err) => {
                report.stats.failed += 1;
                tracing::warn!(source = %task.key, error = %err, "generation failed");
                discard_partial(Path::new(&task.output));
                cache.invalidate(&task.key);
                report.failures.push(FailedFile {
                    source: task.key,
                    reason: err.to_string(),
                });
            }
        }
    }
    report.failures.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(report)
}

fn discard_partial(fragment: &Path) {
    if let Err(err) = std::fs::remove_file(fragment)
        && err.kind() != io::ErrorKind::NotFound
    {
        tracing::warn!(fragment = %fragment.display(), error = %err, "cannot remove partial fragment");
    }
}

/// Full compile method: cache load, [`compile`], cache save, combine.
///
/// The combined output is rewritten once every candidate has a current
/// fragment and fragments changed since it was last written, including
/// changes from earlier runs that had failures.
///
/// With `no_cache`, existing fragments are deleted and every candidate is
/// regenerated from an empty cache.
pub fn run_compile(
    inputs: &[PathBuf],
    layout: &MocLayout,
    marker: &str,
    generator: &impl Generator,
    workers: usize,
    no_cache: bool,
    events: Option<Sender<GenerationEvent>>,
) -> Result<CompileReport, CompileError> {
    std::fs::create_dir_all(&layout.fragments_dir).map_err(|source| CompileError::Prepare {
        path: layout.fragments_dir.clone(),
        source,
    })?;

    let mut cache = if no_cache {
        clear_fragments(layout)?;
        CacheManifest::empty()
    } else {
        CacheManifest::load(&layout.cache_path)?
    };
    tracing::debug!(entries = cache.len(), path = %layout.cache_path.display(), "cache loaded");

    let outcome = compile(inputs, &mut cache, layout, marker, generator, workers, events);
    if let Ok(report) = &outcome {
        cache.combine_pending |= report.regenerated;
    }
    // Persist whatever was committed, even if compile bailed out midway.
    let saved = cache.save(&layout.cache_path);
    let mut report = outcome?;
    saved?;

    if cache.combine_pending && report.failures.is_empty() {
        report.combined = Some(combine(
            &layout.fragments_dir,
            &layout.fragment_extension,
            &layout.output_file,
        )?);
        cache.combine_pending = false;
        cache.save(&layout.cache_path)?;
    }
    tracing::info!(stats = %report.stats, "compile finished");
    Ok(report)
}

fn clear_fragments(layout: &MocLayout) -> Result<(), CompileError> {
    let fragments = list_fragments(
        &layout.fragments_dir,
        &layout.fragment_extension,
        &layout.output_file,
    )?;
    for fragment in fragments {
        std::fs::remove_file(&fragment).map_err(|source| CompileError::Prepare {
            path: fragment.clone(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CompileTarget, MocConfig};
    use crate::generator::tests::{MockGenerator, mock_fragment};
    use std::fs;
    use std::sync::mpsc;
    use tempfile::TempDir;

    const MARKER: &str = "Q_OBJECT";

    struct Project {
        _tmp: TempDir,
        source: PathBuf,
        layout: MocLayout,
    }

    fn project() -> Project {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("proj");
        fs::create_dir_all(&source).unwrap();
        let target = CompileTarget {
            output_dir: tmp.path().join("build"),
            output_file: "moc_combined.cpp".into(),
            qt_bin_dir: tmp.path().join("qt/bin"),
        };
        let layout = MocLayout::new(&target, &MocConfig::default());
        Project {
            _tmp: tmp,
            source,
            layout,
        }
    }

    impl Project {
        fn header(&self, rel: &str, content: &str) -> PathBuf {
            let path = self.source.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
            path
        }

        fn run(&self, inputs: &[PathBuf], generator: &MockGenerator) -> CompileReport {
            run_compile(inputs, &self.layout, MARKER, generator, 4, false, None).unwrap()
        }

        fn combined(&self) -> String {
            fs::read_to_string(&self.layout.output_file).unwrap()
        }

        fn cache(&self) -> CacheManifest {
            CacheManifest::load(&self.layout.cache_path).unwrap()
        }
    }

    // =========================================================================
    // Check listing
    // =========================================================================

    #[test]
    fn check_lists_only_marked_headers() {
        let p = project();
        let a = p.header("a.h", "class A { Q_OBJECT };\n");
        let b = p.header("b.h", "struct B {};\n");

        let listed = list_candidates(&[a, b], &p.source, MARKER).unwrap();
        assert_eq!(listed, vec!["a.h"]);
    }

    #[test]
    fn check_keeps_subdirectories_in_listing() {
        let p = project();
        let a = p.header("ui/view.h", "Q_OBJECT\n");

        let listed = list_candidates(&[a], &p.source, MARKER).unwrap();
        assert_eq!(listed, vec!["ui/view.h"]);
    }

    #[test]
    fn check_missing_input_is_error() {
        let p = project();
        let result = list_candidates(&[p.source.join("gone.h")], &p.source, MARKER);
        assert!(matches!(result, Err(CompileError::Input { .. })));
    }

    // =========================================================================
    // First and repeated compiles
    // =========================================================================

    #[test]
    fn first_compile_generates_and_combines() {
        let p = project();
        let a = p.header("a.h", "class A { Q_OBJECT };\n");
        let b = p.header("b.h", "struct B {};\n");
        let generator = MockGenerator::new();

        let report = p.run(&[a.clone(), b], &generator);

        assert!(report.regenerated);
        assert_eq!(report.stats.generated, 1);
        assert_eq!(report.stats.skipped, 1);
        assert_eq!(report.combined, Some(1));

        let cache = p.cache();
        assert_eq!(cache.len(), 1);
        let entry = cache.get(&display_path(&a)).unwrap();
        assert!(entry.generated_path.ends_with("/moc/moc_a.moc"));
        assert_eq!(
            p.combined(),
            fs::read_to_string(&entry.generated_path).unwrap()
        );
        assert_eq!(p.combined(), mock_fragment(&a));
    }

    #[test]
    fn unchanged_second_compile_dispatches_nothing() {
        let p = project();
        let a = p.header("a.h", "class A { Q_OBJECT };\n");
        let first = MockGenerator::new();
        p.run(&[a.clone()], &first);
        let combined_before = fs::read(&p.layout.output_file).unwrap();
        let cache_before = fs::read(&p.layout.cache_path).unwrap();

        let second = MockGenerator::new();
        let report = p.run(&[a], &second);

        assert!(!report.regenerated);
        assert!(second.invocations().is_empty());
        assert_eq!(report.combined, None);
        assert_eq!(report.stats.up_to_date, 1);
        assert_eq!(fs::read(&p.layout.output_file).unwrap(), combined_before);
        assert_eq!(fs::read(&p.layout.cache_path).unwrap(), cache_before);
    }

    #[test]
    fn changed_header_keeps_its_fragment_path() {
        let p = project();
        let a = p.header("a.h", "class A { Q_OBJECT };\n");
        let generator = MockGenerator::new();
        p.run(&[a.clone()], &generator);
        let first_path = p.cache().get(&display_path(&a)).unwrap().generated_path.clone();

        p.header("a.h", "class A { Q_OBJECT int v; };\n");
        let report = p.run(&[a.clone()], &generator);
        let second_path = p.cache().get(&display_path(&a)).unwrap().generated_path.clone();

        assert_eq!(report.stats.generated, 1);
        assert_eq!(first_path, second_path);
        assert_eq!(p.combined(), mock_fragment(&a));
    }

    #[test]
    fn same_stem_in_different_directories_gets_distinct_fragments() {
        let p = project();
        let ui = p.header("ui/view.h", "Q_OBJECT ui\n");
        let core = p.header("core/view.h", "Q_OBJECT core\n");
        let generator = MockGenerator::new();

        let report = p.run(&[ui.clone(), core.clone()], &generator);

        assert_eq!(report.stats.generated, 2);
        let cache = p.cache();
        let ui_path = &cache.get(&display_path(&ui)).unwrap().generated_path;
        let core_path = &cache.get(&display_path(&core)).unwrap().generated_path;
        assert_ne!(ui_path, core_path);
        assert_eq!(report.combined, Some(2));
        let combined = p.combined();
        assert!(combined.contains("Q_OBJECT ui"));
        assert!(combined.contains("Q_OBJECT core"));
    }

    #[test]
    fn combined_output_is_sorted_by_fragment_path() {
        let p = project();
        let z = p.header("zeta.h", "Q_OBJECT z\n");
        let a = p.header("alpha.h", "Q_OBJECT a\n");
        let generator = MockGenerator::new();

        p.run(&[z.clone(), a.clone()], &generator);

        assert_eq!(
            p.combined(),
            format!("{}{}", mock_fragment(&a), mock_fragment(&z))
        );
    }

    #[test]
    fn duplicate_inputs_are_generated_once() {
        let p = project();
        let a = p.header("a.h", "Q_OBJECT\n");
        let generator = MockGenerator::new();

        let report = p.run(&[a.clone(), a.clone()], &generator);

        assert_eq!(generator.invocations().len(), 1);
        assert_eq!(report.combined, Some(1));
    }

    #[test]
    fn differently_spelled_inputs_share_one_fragment() {
        let p = project();
        p.header("a.h", "Q_OBJECT\n");
        fs::create_dir_all(p.source.join("ui")).unwrap();
        let inputs: Vec<PathBuf> = ["a.h", "./a.h", "ui/../a.h"]
            .iter()
            .map(|entry| crate::paths::resolve_input(&p.source, entry).unwrap())
            .collect();
        let generator = MockGenerator::new();

        let report = p.run(&inputs, &generator);

        assert_eq!(generator.invocations().len(), 1);
        assert_eq!(report.combined, Some(1));
        assert_eq!(p.cache().len(), 1);
        assert!(!p.layout.fragments_dir.join("moc_a_1.moc").exists());
    }

    #[test]
    fn only_changed_headers_are_regenerated() {
        let p = project();
        let a = p.header("a.h", "Q_OBJECT a\n");
        let b = p.header("b.h", "Q_OBJECT b\n");
        p.run(&[a.clone(), b.clone()], &MockGenerator::new());

        p.header("b.h", "Q_OBJECT b2\n");
        let generator = MockGenerator::new();
        let report = p.run(&[a.clone(), b.clone()], &generator);

        let invoked: Vec<PathBuf> = generator.invocations().into_iter().map(|(i, _)| i).collect();
        assert_eq!(invoked, vec![b.clone()]);
        assert_eq!(report.stats.up_to_date, 1);
        assert_eq!(report.stats.generated, 1);
        // Untouched fragments are still part of the combined output.
        assert!(p.combined().contains("Q_OBJECT a"));
        assert!(p.combined().contains("Q_OBJECT b2"));
    }

    #[test]
    fn single_worker_still_runs_everything() {
        let p = project();
        let inputs: Vec<PathBuf> = (0..6)
            .map(|i| p.header(&format!("h{i}.h"), &format!("Q_OBJECT {i}\n")))
            .collect();
        let generator = MockGenerator::new();

        let report =
            run_compile(&inputs, &p.layout, MARKER, &generator, 1, false, None).unwrap();

        assert_eq!(report.stats.generated, 6);
        assert_eq!(report.combined, Some(6));
    }

    // =========================================================================
    // Failures
    // =========================================================================

    #[test]
    fn failed_generation_is_not_committed_and_retried() {
        let p = project();
        let good = p.header("good.h", "Q_OBJECT good\n");
        let bad = p.header("bad.h", "Q_OBJECT bad\n");
        let generator = MockGenerator::failing_on(&["bad.h"]);

        let report = p.run(&[good.clone(), bad.clone()], &generator);

        assert_eq!(report.stats.generated, 1);
        assert_eq!(report.stats.failed, 1);
        assert_eq!(report.combined, None, "combine must not run after a failure");
        assert!(!p.layout.output_file.exists());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].source, display_path(&bad));
        assert!(matches!(
            report.ensure_success(),
            Err(CompileError::GenerationFailed(files)) if files == vec![display_path(&bad)]
        ));

        let cache = p.cache();
        assert!(cache.get(&display_path(&good)).is_some());
        assert!(cache.get(&display_path(&bad)).is_none());
        // Partial fragment was removed.
        assert!(!p.layout.fragments_dir.join("moc_bad.moc").exists());

        generator.heal();
        let retry = p.run(&[good, bad.clone()], &generator);
        assert_eq!(retry.stats.generated, 1);
        assert_eq!(retry.stats.up_to_date, 1);
        assert_eq!(retry.combined, Some(2));
        let retried = p.cache();
        assert!(
            retried
                .get(&display_path(&bad))
                .unwrap()
                .generated_path
                .ends_with("/moc_bad.moc")
        );
    }

    #[test]
    fn failed_regeneration_forgets_fingerprint_but_keeps_path() {
        let p = project();
        let a = p.header("a.h", "Q_OBJECT v1\n");
        p.run(&[a.clone()], &MockGenerator::new());
        let old = p.cache().get(&display_path(&a)).unwrap().clone();

        p.header("a.h", "Q_OBJECT v2\n");
        let generator = MockGenerator::failing_on(&["a.h"]);
        let report = p.run(&[a.clone()], &generator);

        assert_eq!(report.stats.failed, 1);
        let entry = p.cache().get(&display_path(&a)).unwrap().clone();
        assert!(entry.fingerprint.is_empty());
        assert_eq!(entry.generated_path, old.generated_path);
        assert!(!Path::new(&old.generated_path).exists());

        generator.heal();
        let retry = p.run(&[a.clone()], &generator);
        assert_eq!(retry.stats.generated, 1);
        assert_eq!(p.cache().get(&display_path(&a)).unwrap().generated_path, old.generated_path);
        assert_eq!(p.combined(), mock_fragment(&a));
    }

    #[test]
    fn header_reverted_after_failure_is_regenerated() {
        let p = project();
        let a = p.header("a.h", "Q_OBJECT a1\n");
        let b = p.header("b.h", "Q_OBJECT b1\n");
        p.run(&[a.clone(), b.clone()], &MockGenerator::new());

        p.header("a.h", "Q_OBJECT a2\n");
        p.header("b.h", "Q_OBJECT b2\n");
        let generator = MockGenerator::failing_on(&["b.h"]);
        let failed = p.run(&[a.clone(), b.clone()], &generator);
        assert_eq!(failed.stats.failed, 1);
        assert!(p.cache().combine_pending);

        // Back to the content the cache last saw succeed.
        p.header("b.h", "Q_OBJECT b1\n");
        generator.heal();
        let report = p.run(&[a.clone(), b.clone()], &generator);

        assert_eq!(report.stats.up_to_date, 1);
        assert_eq!(report.stats.generated, 1);
        assert_eq!(report.combined, Some(2));
        assert_eq!(p.combined(), format!("{}{}", mock_fragment(&a), mock_fragment(&b)));
        assert!(!p.cache().combine_pending);
    }

    #[test]
    fn pending_combine_runs_when_nothing_needs_regeneration() {
        let p = project();
        let a = p.header("a.h", "Q_OBJECT a1\n");
        let b = p.header("b.h", "Q_OBJECT b1\n");
        p.run(&[a.clone(), b.clone()], &MockGenerator::new());

        p.header("a.h", "Q_OBJECT a2\n");
        p.header("b.h", "Q_OBJECT b2\n");
        p.run(&[a.clone(), b.clone()], &MockGenerator::failing_on(&["b.h"]));

        // b.h dropped out of the target: only a.h is left, and it is current.
        let generator = MockGenerator::new();
        let report = p.run(&[a.clone()], &generator);

        assert!(generator.invocations().is_empty());
        assert!(!report.regenerated);
        assert_eq!(report.combined, Some(1));
        assert_eq!(p.combined(), mock_fragment(&a));

        let again = p.run(&[a], &generator);
        assert_eq!(again.combined, None);
    }

    #[test]
    fn missing_input_is_fatal_but_cache_is_saved() {
        let p = project();
        let a = p.header("a.h", "Q_OBJECT\n");
        p.run(&[a.clone()], &MockGenerator::new());

        let result = run_compile(
            &[a, p.source.join("gone.h")],
            &p.layout,
            MARKER,
            &MockGenerator::new(),
            2,
            false,
            None,
        );

        assert!(matches!(result, Err(CompileError::Input { .. })));
        assert_eq!(p.cache().len(), 1);
    }

    #[test]
    fn corrupt_cache_aborts_compile() {
        let p = project();
        let a = p.header("a.h", "Q_OBJECT\n");
        fs::create_dir_all(&p.layout.fragments_dir).unwrap();
        fs::write(&p.layout.cache_path, "{ nope").unwrap();

        let generator = MockGenerator::new();
        let result = run_compile(&[a], &p.layout, MARKER, &generator, 2, false, None);

        assert!(matches!(
            result,
            Err(CompileError::Cache(CacheError::Parse { .. }))
        ));
        assert!(generator.invocations().is_empty());
    }

    // =========================================================================
    // --no-cache and events
    // =========================================================================

    #[test]
    fn no_cache_clears_fragments_and_regenerates_all() {
        let p = project();
        let a = p.header("a.h", "Q_OBJECT\n");
        p.run(&[a.clone()], &MockGenerator::new());
        fs::write(p.layout.fragments_dir.join("moc_orphan.moc"), "orphan").unwrap();

        let generator = MockGenerator::new();
        let report =
            run_compile(&[a.clone()], &p.layout, MARKER, &generator, 2, true, None).unwrap();

        assert_eq!(generator.invocations().len(), 1);
        assert_eq!(report.combined, Some(1));
        assert!(!p.combined().contains("orphan"));
        assert!(
            p.cache()
                .get(&display_path(&a))
                .unwrap()
                .generated_path
                .ends_with("/moc_a.moc")
        );
    }

    #[test]
    fn events_report_each_task() {
        let p = project();
        let good = p.header("good.h", "Q_OBJECT\n");
        let bad = p.header("bad.h", "Q_OBJECT\n");
        let generator = MockGenerator::failing_on(&["bad.h"]);
        let (tx, rx) = mpsc::channel();

        run_compile(&[good.clone(), bad.clone()], &p.layout, MARKER, &generator, 2, false, Some(tx))
            .unwrap();

        let mut events: Vec<GenerationEvent> = rx.into_iter().collect();
        events.sort_by_key(|e| match e {
            GenerationEvent::Generated { source, .. } | GenerationEvent::Failed { source, .. } => {
                source.clone()
            }
        });
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], GenerationEvent::Failed { source, .. } if *source == display_path(&bad)));
        assert!(matches!(&events[1], GenerationEvent::Generated { source, .. } if *source == display_path(&good)));
    }
}
