//! Error types for the bench pipeline.

use crate::parse::ParseError;
use benchrank_core::ExecError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for bench operations.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors from benchmarking solutions.
///
/// `NoBenchmarkNames`, `NoSolutions` and `Core` abort the command; the
/// remaining variants describe one solution and are logged and skipped.
#[derive(Debug, Error)]
pub enum BenchError {
    /// The test suite declares no benchmark functions.
    #[error("no benchmark names found in {}", suite_dir.display())]
    NoBenchmarkNames {
        /// Scanned suite directory.
        suite_dir: PathBuf,
    },

    /// No solution files to benchmark.
    #[error("no solutions found in {}", dir.display())]
    NoSolutions {
        /// Scanned exercise directory.
        dir: PathBuf,
    },

    /// Layout or pool failure.
    #[error(transparent)]
    Core(#[from] benchrank_core::Error),

    /// The ephemeral workspace could not be prepared.
    #[error("workspace for {solution}: {source}")]
    Workspace {
        /// Solution file name.
        solution: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The benchmark tool failed.
    #[error("benchmark of {solution}: {source}")]
    Exec {
        /// Solution file name.
        solution: String,
        /// Tool error.
        #[source]
        source: ExecError,
    },

    /// The tool's report had no usable results.
    #[error("report of {solution}: {source}")]
    Parse {
        /// Solution file name.
        solution: String,
        /// Parser error.
        #[source]
        source: ParseError,
    },
}

impl BenchError {
    /// Whether the error ends the whole command rather than one solution.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NoBenchmarkNames { .. } | Self::NoSolutions { .. } | Self::Core(_)
        )
    }
}
