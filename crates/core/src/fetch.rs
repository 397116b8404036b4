// Copyright 2025 Benchrank Contributors
// SPDX-License-Identifier: Apache-2.0

//! Page fetching.
//!
//! The pipeline only sees the [`Fetcher`] trait. [`HttpFetcher`] is the
//! production implementation: a plain HTTPS GET relative to the exercise's
//! base URL, bounded by a client-level timeout.

use crate::config::Settings;
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

/// Raw text of one fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Response body.
    pub text: String,
    /// URL the page was fetched from.
    pub url: String,
}

/// Source of raw page text for paths under one exercise.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `path` (relative to the exercise) with optional query pairs.
    async fn fetch(&self, path: &str, query: &[(String, String)]) -> Result<Page, FetchError>;
}

/// Query pairs selecting one result page.
pub fn page_query(page: u32) -> Vec<(String, String)> {
    vec![("page".to_string(), page.to_string())]
}

/// HTTP implementation of [`Fetcher`].
pub struct HttpFetcher {
    client: reqwest::Client,
    base: String,
}

impl HttpFetcher {
    /// Build a fetcher for the exercise named in `settings`.
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let base = format!(
            "{}/tracks/{}/exercises/{}",
            settings.host.trim_end_matches('/'),
            settings.track,
            settings.exercise
        );
        let client = reqwest::Client::builder()
            .timeout(settings.fetch_timeout())
            .build()
            .map_err(|source| FetchError::Transport {
                url: base.clone(),
                source,
            })?;
        Ok(Self { client, base })
    }

    /// Absolute URL for a path and query.
    pub fn url_for(&self, path: &str, query: &[(String, String)]) -> Result<Url, FetchError> {
        let raw = format!("{}/{}", self.base, path.trim_start_matches('/'));
        let mut url = Url::parse(&raw).map_err(|e| FetchError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, path: &str, query: &[(String, String)]) -> Result<Page, FetchError> {
        let url = self.url_for(path, query)?;
        let url_text = url.to_string();
        debug!(url = %url_text, "fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url_text.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url_text,
                status,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                url: url_text.clone(),
                source,
            })?;
        Ok(Page {
            text,
            url: url_text,
        })
    }
}
