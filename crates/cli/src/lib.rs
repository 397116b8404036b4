//! CLI for benchrank.
//!
//! This crate provides the `benchrank` command line: counting, downloading
//! and benchmarking the published solutions of one exercise, and removing
//! what was downloaded.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod logging;

use anyhow::Context;
use benchrank_benchmarks::run_and_write;
use benchrank_core::config::Overrides;
use benchrank_core::discover::discover;
use benchrank_core::download::download;
use benchrank_core::exec::ProcessRunner;
use benchrank_core::fetch::HttpFetcher;
use benchrank_core::{Layout, Settings, WorkerPool};
use clap::{ArgAction, Parser, Subcommand};
use logging::LogFormat;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Exit status for a failed command.
pub const EXIT_FAILURE: i32 = 1;

/// Exit status for an invalid invocation.
pub const EXIT_USAGE: i32 = 2;

/// Benchrank CLI.
#[derive(Parser, Debug)]
#[command(name = "benchrank")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Exercise slug, e.g. `leap`.
    #[arg(short, long, global = true)]
    pub exercise: Option<String>,

    /// Language track.
    #[arg(short, long, global = true)]
    pub track: Option<String>,

    /// Root directory for downloaded solutions.
    #[arg(short, long, global = true)]
    pub download_dir: Option<PathBuf>,

    /// Run tasks concurrently (`true`) or one at a time (`false`).
    #[arg(long, global = true, value_name = "BOOL", action = ArgAction::Set)]
    pub concurrency: Option<bool>,

    /// Number of workers when running concurrently.
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// Config file. Defaults to `benchrank.toml` when present.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log line format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Command-line values that override every other settings source.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            config_file: self.config.clone(),
            exercise: self.exercise.clone(),
            track: self.track.clone(),
            download_dir: self.download_dir.clone(),
            concurrency: self.concurrency,
            threads: self.threads,
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Print the number of published solutions.
    Total,

    /// Download every published solution and the shared test suite.
    ///
    /// Solutions are stored as `<root>/<track>/<exercise>/<id>-<author>.<ext>`
    /// and the suite under `<root>/<track>/<exercise>/test-suite/`.
    Download,

    /// Benchmark the downloaded solutions and print a ranking per benchmark.
    ///
    /// The full report is also written to `bench-results.json` and
    /// `bench-summary.md` in the exercise directory.
    Bench,

    /// Remove everything downloaded for the exercise.
    Clean,
}

/// Run the CLI with pre-parsed arguments.
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if the command fails.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load(cli.overrides()).context("invalid configuration")?;
    let layout = Layout::new(&settings);

    let pool = WorkerPool::new(settings.worker_count());
    info!(
        track = %settings.track,
        exercise = %settings.exercise,
        workers = pool.size(),
        "starting"
    );
    let result = dispatch(cli.command, &settings, &layout, &pool).await;
    pool.shutdown().await;
    result
}

async fn dispatch(
    command: Commands,
    settings: &Settings,
    layout: &Layout,
    pool: &WorkerPool,
) -> anyhow::Result<()> {
    match command {
        Commands::Total => {
            let fetcher = Arc::new(HttpFetcher::new(settings)?);
            let ids = discover(fetcher, pool)
                .await
                .context("solution discovery failed")?;
            println!("solutions total: {}", ids.len());
        }
        Commands::Download => {
            let fetcher = Arc::new(HttpFetcher::new(settings)?);
            let summary = download(fetcher, pool, layout, &settings.track)
                .await
                .context("download failed")?;
            println!("{} solutions downloaded", summary.stored);
        }
        Commands::Bench => {
            let runner = Arc::new(ProcessRunner::new(settings.bench_timeout()));
            let report = run_and_write(settings, layout, pool, runner)
                .await
                .context("bench failed")?;
            println!("{}", report.render_text());
        }
        Commands::Clean => {
            layout
                .clean()
                .with_context(|| format!("failed to clean {}", layout.exercise_dir().display()))?;
            println!("{} removed", layout.exercise_dir().display());
        }
    }
    Ok(())
}

/// Process exit status for an error returned by [`run`].
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<benchrank_core::Error>() {
        Some(benchrank_core::Error::InvalidConfig(_)) => EXIT_USAGE,
        _ => EXIT_FAILURE,
    }
}
