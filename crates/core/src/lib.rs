// Copyright 2025 Benchrank Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core pipeline for benchrank.
//!
//! This crate discovers the published solutions of one exercise, downloads
//! them with the shared test suite, and provides the worker pool every
//! fan-out step runs on.
//!
//! # Modules
//!
//! - [`config`] - Layered run configuration
//! - [`pool`] - Bounded worker pool and join barrier
//! - [`fetch`] - Page fetching over HTTP
//! - [`exec`] - External process execution with a time limit
//! - [`discover`] - Paginated identifier discovery
//! - [`extract`] - Marker-delimited field extraction
//! - [`download`] - Solution and test suite download
//! - [`layout`] - On-disk layout of downloaded files

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod discover;
pub mod download;
pub mod error;
pub mod exec;
pub mod extract;
pub mod fetch;
pub mod layout;
pub mod pool;

pub use config::Settings;
pub use error::{Error, ExecError, ExtractError, FetchError, Result};
pub use layout::Layout;
pub use pool::{Task, TaskGroup, WorkerPool};

use serde::{Deserialize, Serialize};

/// Identifier of one published solution: a 32-digit hex token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SolutionId(String);

impl SolutionId {
    /// Create a new solution ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SolutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
