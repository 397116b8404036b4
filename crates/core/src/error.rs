// Copyright 2025 Benchrank Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types shared by the core pipeline.
//!
//! Errors fall in two groups. Command-aborting errors (a missing pager
//! marker, an unusable configuration) are returned to the caller as
//! [`Error`]. Per-item failures ([`FetchError`], [`ExtractError`],
//! [`ExecError`]) are logged by the task that hit them and the item is
//! skipped.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Command-level error for core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Fetching a page failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The first result page has no usable page-count marker.
    #[error("no page count marker found on {url}")]
    NoPageCount {
        /// URL of the first result page.
        url: String,
    },

    /// Filesystem operation failed.
    #[error("{op} {}: {source}", path.display())]
    Io {
        /// Operation that failed.
        op: &'static str,
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The worker pool no longer accepts tasks.
    #[error("worker pool is closed")]
    PoolClosed,
}

impl Error {
    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Wrap an I/O error with the operation and path it concerns.
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::InvalidConfig(err.to_string())
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure to fetch one page. Always carries the URL that was requested.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be formed from the configured host and path.
    #[error("invalid url {url}: {reason}")]
    InvalidUrl {
        /// The URL text that failed to parse.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// Network, timeout or body read failure.
    #[error("download of {url} failed: {source}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("download of {url} failed: status code {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status.
        status: reqwest::StatusCode,
    },
}

impl FetchError {
    /// URL the failed request was sent to.
    pub fn url(&self) -> &str {
        match self {
            FetchError::InvalidUrl { url, .. }
            | FetchError::Transport { url, .. }
            | FetchError::Status { url, .. } => url,
        }
    }
}

/// A page did not contain an expected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// No author marker on the page.
    #[error("no author name")]
    NoAuthorName,

    /// No solution code region on the page.
    #[error("no solution code")]
    NoSolutionCode,

    /// No test suite region, or a region without any decodable file.
    #[error("no test suite")]
    NoTestSuite,
}

/// Failure to run an external tool.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The process could not be started or awaited.
    #[error("failed to run {tool}: {source}")]
    Spawn {
        /// Program name.
        tool: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The process exceeded its time limit and was killed.
    #[error("{tool} timed out after {}s", timeout.as_secs())]
    Timeout {
        /// Program name.
        tool: String,
        /// Limit that was exceeded.
        timeout: Duration,
    },

    /// The process exited unsuccessfully.
    #[error("{tool} exited with {status}")]
    Failed {
        /// Program name.
        tool: String,
        /// Exit status.
        status: ExitStatus,
        /// Combined stdout and stderr.
        output: String,
    },
}
