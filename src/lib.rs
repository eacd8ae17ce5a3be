//! # qtgen
//!
//! Incremental moc/rcc helper for Qt projects built by a build system that
//! has no native Qt support. The build system calls `qtgen` twice per target:
//! once at configure time to learn which inputs matter, once at build time to
//! produce the generated code.
//!
//! ```text
//! qtgen moc --check   "a.h;b.h" --source-dir src            → a.h
//! qtgen moc --compile "a.h;b.h" --source-dir src \
//!           --output-dir build --output-file moc_all.cpp --qt-bin-dir /opt/qt/bin
//! qtgen rcc --check   "res/app.qrc" --source-dir src        → res/icons/open.png
//! ```
//!
//! # Architecture: Incremental moc
//!
//! ```text
//! inputs ─► detect ─► compile (rayon pool ─► moc) ─► cache save ─► combine
//!             ▲                                         │
//!             └──────────── cache (fingerprints) ◄──────┘
//! ```
//!
//! moc is run per header into its own fragment file; all fragments are then
//! concatenated into the one translation unit the build compiles. Between
//! runs a fingerprint cache records what each fragment was generated from,
//! so an unchanged header costs one hash and no process launch.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`marker`] | Does a header contain `Q_OBJECT` at all? |
//! | [`cache`] | Fingerprints, fragment-path assignment, JSON persistence |
//! | [`detect`] | Per-header regeneration decision |
//! | [`generator`] | `Generator` trait and the external moc process |
//! | [`compile`] | Candidate listing, parallel dispatch, commit-after-success |
//! | [`combine`] | Concatenate fragments into the combined output |
//! | [`resources`] | `.qrc` reference listing for rcc dependency tracking |
//! | [`config`] | Invocation validation and the optional TOML tool config |
//! | [`paths`] | Separator normalization and source-relative paths |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Content Fingerprints, Not Timestamps
//!
//! Build trees get restored from CI caches and checked out by git, both of
//! which reset mtimes. SHA-256 of the header bytes survives all of that.
//!
//! ## Commit After Success
//!
//! A cache entry is written only after moc returned success and left a
//! fragment behind. A crashed or failing moc run leaves the header looking
//! changed, so the next build retries it instead of silently combining a
//! stale or truncated fragment.
//!
//! ## Deterministic Combined Output
//!
//! Fragments are concatenated in path order and the cache is written with
//! sorted keys. Two runs over the same inputs produce the same bytes, which
//! keeps downstream compilers and ccache-style tools from rebuilding.
//!
//! ## No Cross-Process Locking
//!
//! One invocation owns an output directory at a time. Two concurrent runs
//! against the same directory may corrupt the cache; the build system is
//! expected to serialize them.

pub mod cache;
pub mod combine;
pub mod compile;
pub mod config;
pub mod detect;
pub mod generator;
pub mod marker;
pub mod output;
pub mod paths;
pub mod resources;
