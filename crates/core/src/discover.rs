// Copyright 2025 Benchrank Contributors
// SPDX-License-Identifier: Apache-2.0

//! Paginated discovery of solution identifiers.
//!
//! The first result page tells how many pages exist (the pager's "Last"
//! link). One scan task per page is then scheduled on the pool; each task
//! inserts the identifiers it finds into a shared [`IdentifierSet`].
//! Duplicates across pages collapse on insert.
//!
//! A missing page count aborts discovery. A page that fails to load, or
//! that yields nothing, is logged and contributes nothing, so on fetch
//! errors the result is a lower bound.

use crate::error::{Error, Result};
use crate::fetch::{page_query, Fetcher};
use crate::pool::{Task, WorkerPool};
use crate::SolutionId;
use dashmap::DashSet;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Path of the result listing, relative to the exercise.
pub const SOLUTIONS_PATH: &str = "solutions";

static PAGE_COUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"solutions\?page=([[:digit:]]+)">Last"#).expect("page count pattern is valid")
});

static SOLUTION_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"solutions/((?:[[:xdigit:]]{2}){16})").expect("solution path pattern is valid")
});

/// Concurrency-safe set of discovered identifiers.
#[derive(Debug, Default)]
pub struct IdentifierSet {
    ids: DashSet<SolutionId>,
}

impl IdentifierSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an identifier. Returns `false` if it was already present.
    pub fn insert(&self, id: SolutionId) -> bool {
        self.ids.insert(id)
    }

    /// Number of distinct identifiers.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifiers in ascending order.
    pub fn into_sorted_vec(self) -> Vec<SolutionId> {
        let mut ids: Vec<SolutionId> = self.ids.into_iter().collect();
        ids.sort();
        ids
    }
}

/// Total page count announced by the pager of a result page.
pub fn page_count(page: &str) -> Option<u32> {
    PAGE_COUNT_RE
        .captures(page)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Every identifier linked from a result page, in page order.
pub fn solution_ids(page: &str) -> impl Iterator<Item = SolutionId> + '_ {
    SOLUTION_PATH_RE
        .captures_iter(page)
        .filter_map(|caps| caps.get(1))
        .map(|m| SolutionId::new(m.as_str()))
}

/// Discover every solution identifier of the exercise.
pub async fn discover(fetcher: Arc<dyn Fetcher>, pool: &WorkerPool) -> Result<IdentifierSet> {
    let first = fetcher.fetch(SOLUTIONS_PATH, &[]).await?;
    let total = page_count(&first.text).ok_or_else(|| Error::NoPageCount {
        url: first.url.clone(),
    })?;
    info!(pages = total, "discovering solutions");

    let ids = Arc::new(IdentifierSet::new());
    let group = pool.group();
    for page in 1..=total {
        let fetcher = Arc::clone(&fetcher);
        let ids = Arc::clone(&ids);
        group
            .submit(Task::new(
                format!("scan page {}", page),
                scan_page(fetcher, ids, page),
            ))
            .await?;
    }
    let scanned = group.wait().await;
    debug!(pages = scanned, "all result pages scanned");

    // Every task holding a clone has finished; the set is ours again.
    let ids = Arc::try_unwrap(ids).unwrap_or_else(|shared| {
        let copy = IdentifierSet::new();
        for id in shared.ids.iter() {
            copy.insert(id.key().clone());
        }
        copy
    });
    Ok(ids)
}

async fn scan_page(fetcher: Arc<dyn Fetcher>, ids: Arc<IdentifierSet>, page: u32) {
    let content = match fetcher.fetch(SOLUTIONS_PATH, &page_query(page)).await {
        Ok(content) => content,
        Err(e) => {
            warn!(page, url = %e.url(), error = %e, "result page skipped");
            return;
        }
    };

    let mut found = 0usize;
    for id in solution_ids(&content.text) {
        found += 1;
        ids.insert(id);
    }
    if found == 0 {
        warn!(page, url = %content.url, "no solutions found on result page");
    } else {
        debug!(page, found, "result page scanned");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::fetch::{MockFetcher, Page};
    use mockall::predicate::eq;
    use std::num::NonZeroUsize;

    const A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaa1111";
    const B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbb2222";
    const C: &str = "cccccccccccccccccccccccccccc3333";

    fn pager(last: u32) -> String {
        format!("<a href=\"/tracks/go/exercises/leap/solutions?page={last}\">Last</a>")
    }

    fn listing(ids: &[&str]) -> String {
        ids.iter()
            .map(|id| format!("<a href=\"/tracks/go/exercises/leap/solutions/{id}\">x</a>"))
            .collect()
    }

    fn page(text: String) -> Page {
        Page {
            text,
            url: "https://exercism.io/tracks/go/exercises/leap/solutions".to_string(),
        }
    }

    fn pool() -> WorkerPool {
        WorkerPool::new(NonZeroUsize::new(3).unwrap())
    }

    #[test]
    fn test_page_count_parses_last_link() {
        assert_eq!(page_count(&pager(17)), Some(17));
        assert_eq!(page_count("<a href=\"solutions?page=2\">Next</a>"), None);
        assert_eq!(page_count("no pager"), None);
    }

    #[test]
    fn test_solution_ids_requires_full_hex_token() {
        let text = format!(
            "solutions/{A} solutions/0123 solutions/zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz {}",
            listing(&[B])
        );
        let ids: Vec<_> = solution_ids(&text).map(|id| id.to_string()).collect();
        assert_eq!(ids, vec![A.to_string(), B.to_string()]);
    }

    #[test]
    fn test_identifier_set_dedups() {
        let set = IdentifierSet::new();
        assert!(set.insert(SolutionId::new(A)));
        assert!(!set.insert(SolutionId::new(A)));
        assert!(set.insert(SolutionId::new(B)));
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.into_sorted_vec(),
            vec![SolutionId::new(A), SolutionId::new(B)]
        );
    }

    #[tokio::test]
    async fn test_discover_two_pages_with_duplicate() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|path, query| path.to_string() == SOLUTIONS_PATH && query.is_empty())
            .times(1)
            .returning(|_, _| Ok(page(format!("{}{}", listing(&[A]), pager(2)))));
        fetcher
            .expect_fetch()
            .with(eq(SOLUTIONS_PATH), eq(page_query(1)))
            .times(1)
            .returning(|_, _| Ok(page(format!("{}{}", listing(&[A, B]), pager(2)))));
        fetcher
            .expect_fetch()
            .with(eq(SOLUTIONS_PATH), eq(page_query(2)))
            .times(1)
            .returning(|_, _| Ok(page(listing(&[A]))));

        let pool = pool();
        let ids = discover(Arc::new(fetcher), &pool).await.unwrap();
        assert_eq!(ids.len(), 2);
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn test_discover_fetches_every_page_once() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|_, query| query.is_empty())
            .times(1)
            .returning(|_, _| Ok(page(pager(7))));
        for n in 1..=7u32 {
            let id = format!("{:032x}", n);
            fetcher
                .expect_fetch()
                .with(eq(SOLUTIONS_PATH), eq(page_query(n)))
                .times(1)
                .returning(move |_, _| Ok(page(listing(&[id.as_str()]))));
        }

        let pool = pool();
        let ids = discover(Arc::new(fetcher), &pool).await.unwrap();
        assert_eq!(ids.len(), 7);
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn test_discover_skips_failed_page() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|_, query| query.is_empty())
            .returning(|_, _| Ok(page(pager(3))));
        fetcher
            .expect_fetch()
            .with(eq(SOLUTIONS_PATH), eq(page_query(1)))
            .returning(|_, _| Ok(page(listing(&[A]))));
        fetcher
            .expect_fetch()
            .with(eq(SOLUTIONS_PATH), eq(page_query(2)))
            .returning(|_, _| {
                Err(FetchError::InvalidUrl {
                    url: "https://exercism.io/solutions?page=2".to_string(),
                    reason: "simulated".to_string(),
                })
            });
        fetcher
            .expect_fetch()
            .with(eq(SOLUTIONS_PATH), eq(page_query(3)))
            .returning(|_, _| Ok(page(listing(&[C]))));

        let pool = pool();
        let ids = discover(Arc::new(fetcher), &pool).await.unwrap();
        assert_eq!(
            ids.into_sorted_vec(),
            vec![SolutionId::new(A), SolutionId::new(C)]
        );
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn test_discover_without_pager_is_fatal() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .times(1)
            .returning(|_, _| Ok(page(listing(&[A]))));

        let pool = pool();
        let err = discover(Arc::new(fetcher), &pool).await.unwrap_err();
        assert!(matches!(err, Error::NoPageCount { .. }));
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn test_discover_first_page_error_is_fatal() {
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().times(1).returning(|_, _| {
            Err(FetchError::InvalidUrl {
                url: "bad".to_string(),
                reason: "simulated".to_string(),
            })
        });

        let pool = pool();
        let err = discover(Arc::new(fetcher), &pool).await.unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
        pool.shutdown().await;
    }
}
