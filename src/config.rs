//! Invocation and tool configuration.
//!
//! Two layers feed a run:
//!
//! 1. **The invocation**: what the build system passes on the command line:
//!    family (`moc`/`rcc`), method (`--check`/`--compile`), the `;`-separated
//!    input list and the directories. These are validated into an
//!    [`Invocation`] before any file is touched. A missing `--output-dir`
//!    is reported up front instead of halfway through a build.
//! 2. **The tool config**: an optional `--config` TOML file that adjusts
//!    how moc is driven. Every key has a default, so the file only needs the
//!    values it wants to change:
//!
//! ```toml
//! [moc]
//! tool = "moc"                      # Executable name inside --qt-bin-dir
//! marker = "Q_OBJECT"               # Headers without this are skipped
//! subdir = "moc"                    # Fragments live in <output-dir>/<subdir>
//! fragment_prefix = "moc_"
//! fragment_extension = "moc"
//! cache_file = ".qtgen-cache.json"  # Inside the fragments directory
//!
//! [processing]
//! max_processes = 4                 # Max parallel moc runs (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::paths::{absolute_path, resolve_input, to_standard_path};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Invalid invocation: {0}")]
    Invocation(String),
}

// =============================================================================
// Tool config (TOML)
// =============================================================================

/// Tool configuration loaded from an optional TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// How the moc family locates, names and caches its outputs.
    pub moc: MocConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

/// moc driving settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MocConfig {
    pub tool: String,
    pub marker: String,
    pub subdir: String,
    pub fragment_prefix: String,
    pub fragment_extension: String,
    pub cache_file: String,
}

impl Default for MocConfig {
    fn default() -> Self {
        Self {
            tool: "moc".to_string(),
            marker: "Q_OBJECT".to_string(),
            subdir: "moc".to_string(),
            fragment_prefix: "moc_".to_string(),
            fragment_extension: "moc".to_string(),
            cache_file: ".qtgen-cache.json".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel generator processes.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective worker count from config.
///
/// - `None` → use all available cores (1 if that cannot be determined)
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.min(cores))
        .unwrap_or(cores)
        .max(1)
}

impl ToolConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let moc = &self.moc;
        for (key, value) in [
            ("moc.tool", &moc.tool),
            ("moc.marker", &moc.marker),
            ("moc.subdir", &moc.subdir),
            ("moc.fragment_extension", &moc.fragment_extension),
            ("moc.cache_file", &moc.cache_file),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if moc.fragment_extension.starts_with('.') {
            return Err(ConfigError::Validation(
                "moc.fragment_extension must not start with '.'".into(),
            ));
        }
        if has_extension(&moc.cache_file, &moc.fragment_extension) {
            return Err(ConfigError::Validation(
                "moc.cache_file must not use the fragment extension".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn has_extension(name: &str, extension: &str) -> bool {
    Path::new(name).extension().and_then(|e| e.to_str()) == Some(extension)
}

/// Load the tool config.
///
/// With no path, the stock defaults apply. An explicit path must exist: a
/// build that names a config file it cannot read is misconfigured.
///
/// Keys missing from the file keep their defaults.
pub fn load_config(path: Option<&Path>) -> Result<ToolConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str::<ToolConfig>(&content)?
        }
        None => ToolConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# qtgen configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Pass the file with --config.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# moc
# ---------------------------------------------------------------------------
[moc]
# Executable name inside --qt-bin-dir (".exe" is appended on Windows).
tool = "moc"

# Headers are only handed to moc when a line contains this text.
marker = "Q_OBJECT"

# Fragments, the cache and the combined output live in <output-dir>/<subdir>.
subdir = "moc"

# Fragment file naming: <prefix><header stem>.<extension>
fragment_prefix = "moc_"
fragment_extension = "moc"

# Fingerprint cache, stored next to the fragments.
cache_file = ".qtgen-cache.json"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel moc processes.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

// =============================================================================
// Invocation
// =============================================================================

/// Which tool family an invocation drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Moc,
    Rcc,
}

/// What to do with the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// List the inputs that matter (headers needing moc, files a qrc references).
    Check,
    /// Generate and combine moc output.
    Compile,
}

/// Raw command-line values, before validation.
#[derive(Debug, Clone, Default)]
pub struct InvocationArgs {
    pub content: String,
    pub source_dir: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub output_file: Option<String>,
    pub qt_bin_dir: Option<PathBuf>,
    pub no_cache: bool,
}

/// Where the compile method reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileTarget {
    pub output_dir: PathBuf,
    pub output_file: String,
    pub qt_bin_dir: PathBuf,
}

/// A validated invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub family: Family,
    pub method: Method,
    pub source_dir: PathBuf,
    /// Input files resolved against `source_dir`, `/`-normalized, in order.
    pub inputs: Vec<PathBuf>,
    /// Present exactly when `method` is [`Method::Compile`].
    pub compile: Option<CompileTarget>,
    pub no_cache: bool,
}

impl Invocation {
    pub fn new(family: Family, method: Method, args: InvocationArgs) -> Result<Self, ConfigError> {
        if args.source_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invocation("--source-dir must not be empty".into()));
        }
        let io_err = |source| ConfigError::Io {
            path: args.source_dir.clone(),
            source,
        };
        let source_dir = absolute_path(&args.source_dir).map_err(io_err)?;

        let inputs = args
            .content
            .split(';')
            .filter(|entry| !entry.is_empty())
            .map(|entry| resolve_input(&source_dir, entry))
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_err)?;

        let compile = match (family, method) {
            (_, Method::Check) => None,
            (Family::Rcc, Method::Compile) => {
                return Err(ConfigError::Invocation(
                    "rcc only supports --check".into(),
                ));
            }
            (Family::Moc, Method::Compile) => Some(CompileTarget {
                output_dir: required(args.output_dir, "--output-dir")?,
                output_file: required(args.output_file, "--output-file")?,
                qt_bin_dir: required(args.qt_bin_dir, "--qt-bin-dir")?,
            }),
        };

        Ok(Self {
            family,
            method,
            source_dir,
            inputs,
            compile,
            no_cache: args.no_cache,
        })
    }
}

trait ArgValue {
    fn is_blank(&self) -> bool;
    fn normalized(self) -> Self;
}

impl ArgValue for PathBuf {
    fn is_blank(&self) -> bool {
        self.as_os_str().is_empty()
    }

    fn normalized(self) -> Self {
        PathBuf::from(to_standard_path(&self.to_string_lossy()))
    }
}

impl ArgValue for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }

    fn normalized(self) -> Self {
        to_standard_path(&self)
    }
}

fn required<T: ArgValue>(value: Option<T>, flag: &str) -> Result<T, ConfigError> {
    match value {
        Some(v) if !v.is_blank() => Ok(v.normalized()),
        _ => Err(ConfigError::Invocation(format!(
            "{flag} is required for --compile"
        ))),
    }
}

/// Concrete file locations for one moc compile run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MocLayout {
    /// Directory holding fragments, the cache and the combined output.
    pub fragments_dir: PathBuf,
    pub cache_path: PathBuf,
    pub output_file: PathBuf,
    pub fragment_prefix: String,
    pub fragment_extension: String,
}

impl MocLayout {
    pub fn new(target: &CompileTarget, moc: &MocConfig) -> Self {
        let fragments_dir = target.output_dir.join(&moc.subdir);
        Self {
            cache_path: fragments_dir.join(&moc.cache_file),
            output_file: fragments_dir.join(&target.output_file),
            fragments_dir,
            fragment_prefix: moc.fragment_prefix.clone(),
            fragment_extension: moc.fragment_extension.clone(),
        }
    }
}
