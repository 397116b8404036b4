//! Benchmarking and ranking of downloaded solutions.
//!
//! Every downloaded solution is benchmarked against the shared test suite
//! on the worker pool. Results are then ranked per benchmark name.
//!
//! # Quick Start
//!
//! ```no_run
//! use benchrank_benchmarks::run_and_write;
//! use benchrank_core::exec::ProcessRunner;
//! use benchrank_core::{Layout, Settings, WorkerPool};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), benchrank_benchmarks::BenchError> {
//! let settings = Settings::for_exercise("leap");
//! let layout = Layout::new(&settings);
//! let pool = WorkerPool::new(settings.worker_count());
//! let runner = Arc::new(ProcessRunner::new(settings.bench_timeout()));
//!
//! let report = run_and_write(&settings, &layout, &pool, runner).await?;
//! println!("{}", report.render_text());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`suite`] - Benchmark names declared by the test suite
//! - [`runner`] - Isolated benchmark run of one solution
//! - [`parse`] - Tool report parsing
//! - [`size`] - Code size measurement
//! - [`stats`] - Results model and ranking order
//! - [`report`] - Rankings and text output
//! - [`io`] - JSON and markdown report files
//! - [`markdown`] - Markdown summary generation

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod error;
pub mod io;
pub mod markdown;
pub mod parse;
pub mod report;
pub mod runner;
pub mod size;
pub mod stats;
pub mod suite;

pub use error::{BenchError, Result};
pub use report::{BenchReport, Ranking};
pub use runner::BenchRunner;
pub use stats::{BenchmarkMetric, SolutionStats};

use benchrank_core::exec::CommandRunner;
use benchrank_core::{Layout, Settings, Task, WorkerPool};
use chrono::Utc;
use stats::StatsCollector;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Benchmark every downloaded solution and rank the results.
///
/// # Errors
///
/// Fails when the suite declares no benchmarks, when there are no
/// solutions, or when the layout cannot be read. A solution that fails to
/// benchmark is logged and left out of the report.
pub async fn run_bench(
    settings: &Settings,
    layout: &Layout,
    pool: &WorkerPool,
    runner: Arc<dyn CommandRunner>,
) -> Result<BenchReport> {
    let suite_dir = layout.suite_dir();
    let benchmarks = suite::benchmark_names(&suite_dir)?;
    if benchmarks.is_empty() {
        return Err(BenchError::NoBenchmarkNames { suite_dir });
    }
    info!(count = benchmarks.len(), "benchmark names found");

    let solutions = layout.solution_files()?;
    if solutions.is_empty() {
        return Err(BenchError::NoSolutions {
            dir: layout.exercise_dir().to_path_buf(),
        });
    }

    let bench = Arc::new(BenchRunner::new(runner, settings, layout)?);
    let collector = Arc::new(StatsCollector::new());
    let failed = Arc::new(AtomicUsize::new(0));

    let group = pool.group();
    for path in solutions {
        let bench = Arc::clone(&bench);
        let collector = Arc::clone(&collector);
        let failed = Arc::clone(&failed);
        let label = format!("bench {}", path.display());

        group
            .submit(Task::new(label, async move {
                match bench.bench(&path).await {
                    Ok(stats) => {
                        info!(solution = %stats.name, benchmarks = stats.benchmarks.len(), "benchmarked");
                        collector.push(stats);
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "benchmark failed, skipping");
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }))
            .await?;
    }
    let submitted = group.wait().await;

    let solutions = Arc::try_unwrap(collector)
        .map(StatsCollector::into_inner)
        .unwrap_or_else(|shared| shared.snapshot());
    let failed = failed.load(Ordering::Relaxed);
    info!(submitted, succeeded = solutions.len(), failed, "bench finished");

    Ok(BenchReport {
        track: settings.track.clone(),
        exercise: settings.exercise.clone(),
        generated_at: Utc::now(),
        rankings: report::rank_all(&solutions, &benchmarks),
        benchmarks,
        solutions,
        failed,
    })
}

/// Run [`run_bench`] and write the report files into the exercise
/// directory. A failed write is logged and does not fail the run.
pub async fn run_and_write(
    settings: &Settings,
    layout: &Layout,
    pool: &WorkerPool,
    runner: Arc<dyn CommandRunner>,
) -> Result<BenchReport> {
    let report = run_bench(settings, layout, pool, runner).await?;
    match io::write_all_outputs(&report, layout) {
        Ok(()) => info!(
            results = %layout.results_path().display(),
            summary = %layout.summary_path().display(),
            "report written"
        ),
        Err(e) => warn!(dir = %layout.exercise_dir().display(), error = %e, "failed to write report"),
    }
    Ok(report)
}
