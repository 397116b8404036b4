//! Benchmarking of a single solution.
//!
//! Every run gets its own temporary workspace holding the solution and
//! the top-level files of the shared test suite. The workspace is removed
//! when the run ends, whatever the outcome.

use crate::error::{BenchError, Result};
use crate::parse::parse_report;
use crate::size::code_size_of;
use crate::stats::SolutionStats;
use benchrank_core::exec::CommandRunner;
use benchrank_core::layout::top_level_files;
use benchrank_core::{Layout, Settings};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Module file written into workspaces that do not bring their own.
pub const GO_MOD: &str = "go.mod";

const GO_MOD_CONTENTS: &str = "module solution\n\ngo 1.13\n";

/// Stem of the solution file inside a workspace. Stored names carry the
/// author, which may end in a GOOS or GOARCH suffix the tool would skip.
pub const WORKSPACE_SOLUTION_STEM: &str = "solution";

/// Arguments running every benchmark with allocation statistics.
///
/// The tool's own `-timeout` stops the test binary; `None` passes `0`,
/// which disables it.
pub fn bench_args(timeout: Option<Duration>) -> Vec<String> {
    let timeout = timeout.map_or_else(|| "0".to_string(), |t| format!("{}s", t.as_secs()));
    ["test", "-bench", ".", "-benchmem", "-timeout"]
        .iter()
        .map(|s| s.to_string())
        .chain(std::iter::once(timeout))
        .collect()
}

/// Runs the benchmark tool against one solution at a time.
pub struct BenchRunner {
    runner: Arc<dyn CommandRunner>,
    tool: String,
    args: Vec<String>,
    workspace_name: String,
    suite_files: Vec<PathBuf>,
}

impl BenchRunner {
    /// Runner using the suite currently on disk.
    pub fn new(runner: Arc<dyn CommandRunner>, settings: &Settings, layout: &Layout) -> Result<Self> {
        let suite_files = top_level_files(&layout.suite_dir())?;
        Ok(Self {
            runner,
            tool: settings.bench_tool.clone(),
            args: bench_args(settings.bench_timeout()),
            workspace_name: format!("{}.{}", WORKSPACE_SOLUTION_STEM, layout.extension()),
            suite_files,
        })
    }

    /// Suite files copied into every workspace.
    pub fn suite_files(&self) -> &[PathBuf] {
        &self.suite_files
    }

    /// Benchmark the solution at `solution`.
    pub async fn bench(&self, solution: &Path) -> Result<SolutionStats> {
        let file_name = solution
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = solution
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());

        let workspace_err = |source: std::io::Error| BenchError::Workspace {
            solution: file_name.clone(),
            source,
        };

        let workspace = tempfile::Builder::new()
            .prefix("benchrank-")
            .tempdir()
            .map_err(workspace_err)?;
        debug!(solution = %file_name, workspace = %workspace.path().display(), "prepared workspace");

        tokio::fs::copy(solution, workspace.path().join(&self.workspace_name))
            .await
            .map_err(workspace_err)?;
        for file in &self.suite_files {
            if let Some(base) = file.file_name() {
                tokio::fs::copy(file, workspace.path().join(base))
                    .await
                    .map_err(workspace_err)?;
            }
        }

        let go_mod = workspace.path().join(GO_MOD);
        if !tokio::fs::try_exists(&go_mod).await.map_err(workspace_err)? {
            tokio::fs::write(&go_mod, GO_MOD_CONTENTS)
                .await
                .map_err(workspace_err)?;
        }

        let output = self
            .runner
            .run(&self.tool, workspace.path(), &self.args)
            .await
            .map_err(|source| BenchError::Exec {
                solution: file_name.clone(),
                source,
            })?;
        drop(workspace);

        let benchmarks = parse_report(&output).map_err(|source| BenchError::Parse {
            solution: file_name.clone(),
            source,
        })?;
        let code_size = code_size_of(solution).await.map_err(workspace_err)?;

        Ok(SolutionStats {
            name,
            benchmarks,
            code_size,
        })
    }
}

impl std::fmt::Debug for BenchRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchRunner")
            .field("tool", &self.tool)
            .field("args", &self.args)
            .field("workspace_name", &self.workspace_name)
            .field("suite_files", &self.suite_files)
            .finish()
    }
}
