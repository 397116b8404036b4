// Copyright 2025 Benchrank Contributors
// SPDX-License-Identifier: Apache-2.0

//! Run configuration.
//!
//! A [`Settings`] value is built once per invocation and handed to every
//! component by reference. Sources are layered, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`benchrank.toml` unless a path is given)
//! 3. environment variables prefixed with `BENCHRANK_`
//! 4. explicit [`Overrides`], normally taken from command-line flags

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix for environment variables.
pub const ENV_PREFIX: &str = "BENCHRANK";

/// Config file looked up when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "benchrank.toml";

/// Settings for one command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Base address of the solutions site.
    pub host: String,
    /// Language track, e.g. `go`.
    pub track: String,
    /// Exercise slug.
    pub exercise: String,
    /// Root directory for downloaded solutions.
    pub download_dir: PathBuf,
    /// Run tasks on a pool of workers instead of one at a time.
    pub concurrency: bool,
    /// Explicit worker count. Defaults to the available parallelism.
    #[serde(default)]
    pub threads: Option<usize>,
    /// Per-request fetch timeout in seconds.
    pub fetch_timeout_secs: u64,
    /// Per-solution benchmark timeout in seconds. Zero disables it.
    pub bench_timeout_secs: u64,
    /// Benchmark tool of the track.
    pub bench_tool: String,
    /// File extension of solution sources.
    pub source_extension: String,
}

/// Values that take precedence over every other source.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Config file path. `None` looks for [`DEFAULT_CONFIG_FILE`].
    pub config_file: Option<PathBuf>,
    /// Exercise slug.
    pub exercise: Option<String>,
    /// Language track.
    pub track: Option<String>,
    /// Download root.
    pub download_dir: Option<PathBuf>,
    /// Concurrency toggle.
    pub concurrency: Option<bool>,
    /// Worker count.
    pub threads: Option<usize>,
}

impl Settings {
    /// Load settings from defaults, file, environment and overrides.
    pub fn load(overrides: Overrides) -> Result<Self> {
        let file = match &overrides.config_file {
            Some(path) => config::File::from(path.as_path()).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let builder = config::Config::builder()
            .set_default("host", "https://exercism.io")?
            .set_default("track", "go")?
            .set_default("exercise", "")?
            .set_default("download_dir", "./solutions")?
            .set_default("concurrency", true)?
            .set_default("fetch_timeout_secs", 5)?
            .set_default("bench_timeout_secs", 600)?
            .set_default("bench_tool", "go")?
            .set_default("source_extension", "go")?
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .set_override_option("exercise", overrides.exercise)?
            .set_override_option("track", overrides.track)?
            .set_override_option(
                "download_dir",
                overrides
                    .download_dir
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .set_override_option("concurrency", overrides.concurrency)?
            .set_override_option("threads", overrides.threads.map(|n| n as i64))?;

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Settings with defaults for the given exercise, without reading any
    /// file or environment variable.
    pub fn for_exercise(exercise: impl Into<String>) -> Self {
        Self {
            host: "https://exercism.io".to_string(),
            track: "go".to_string(),
            exercise: exercise.into(),
            download_dir: PathBuf::from("./solutions"),
            concurrency: true,
            threads: None,
            fetch_timeout_secs: 5,
            bench_timeout_secs: 600,
            bench_tool: "go".to_string(),
            source_extension: "go".to_string(),
        }
    }

    /// Set the download root.
    pub fn with_download_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.download_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Check that the settings can drive a command.
    pub fn validate(&self) -> Result<()> {
        if self.exercise.trim().is_empty() {
            return Err(Error::invalid_config("exercise name is required"));
        }
        if self.track.trim().is_empty() {
            return Err(Error::invalid_config("track name is required"));
        }
        if self.threads == Some(0) {
            return Err(Error::invalid_config("threads must be greater than zero"));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(Error::invalid_config(
                "fetch_timeout_secs must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Number of pool workers, and the pool's queue capacity.
    pub fn worker_count(&self) -> NonZeroUsize {
        if !self.concurrency {
            return NonZeroUsize::MIN;
        }
        self.threads
            .and_then(NonZeroUsize::new)
            .or_else(|| std::thread::available_parallelism().ok())
            .unwrap_or(NonZeroUsize::MIN)
    }

    /// Timeout applied to each page fetch.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Timeout applied to each benchmark run, if any.
    pub fn bench_timeout(&self) -> Option<Duration> {
        match self.bench_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
