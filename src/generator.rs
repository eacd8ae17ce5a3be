//! The code generator seam.
//!
//! [`Generator`] is the one operation the compile stage needs from moc:
//! turn an input header into an output fragment. The production
//! implementation, [`ExternalTool`], spawns the Qt binary. Tests swap in a
//! recording mock so the incremental logic can be exercised without Qt.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: PathBuf,
        status: String,
        stderr: String,
    },
    #[error("generator reported success but wrote no output at {0}")]
    MissingOutput(PathBuf),
}

/// Produces one fragment from one input file.
///
/// Implementations are shared across worker threads.
pub trait Generator: Sync {
    fn generate(&self, input: &Path, output: &Path) -> Result<(), GeneratorError>;
}

/// A code generator executable invoked as `tool <input> -o <output>`.
#[derive(Debug, Clone)]
pub struct ExternalTool {
    program: PathBuf,
}

impl ExternalTool {
    /// Locate `tool` in `bin_dir`, adding the platform executable suffix.
    pub fn new(bin_dir: &Path, tool: &str) -> Self {
        let program = bin_dir.join(format!("{tool}{}", std::env::consts::EXE_SUFFIX));
        Self { program }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Generator for ExternalTool {
    fn generate(&self, input: &Path, output: &Path) -> Result<(), GeneratorError> {
        let result = Command::new(&self.program)
            .arg(input)
            .arg("-o")
            .arg(output)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| GeneratorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(GeneratorError::Failed {
                program: self.program.clone(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        if !output.exists() {
            return Err(GeneratorError::MissingOutput(output.to_path_buf()));
        }
        Ok(())
    }
}
