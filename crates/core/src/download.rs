// Copyright 2025 Benchrank Contributors
// SPDX-License-Identifier: Apache-2.0

//! Download of solution sources and the shared test suite.

use crate::discover::{discover, SOLUTIONS_PATH};
use crate::error::{Error, Result};
use crate::extract::PageExtractor;
use crate::fetch::Fetcher;
use crate::layout::Layout;
use crate::pool::{Task, WorkerPool};
use crate::SolutionId;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a download run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DownloadSummary {
    /// Identifiers discovered.
    pub discovered: usize,
    /// Solutions written to disk.
    pub stored: usize,
    /// Test suite files written to disk.
    pub suite_files: usize,
}

/// Test files merged across pages. The first page to report a file wins.
#[derive(Debug, Default)]
pub struct SuiteCollector {
    files: DashMap<String, String>,
}

impl SuiteCollector {
    /// Add files whose names have not been seen yet.
    pub fn merge(&self, suite: impl IntoIterator<Item = (String, String)>) {
        for (name, code) in suite {
            self.files.entry(name).or_insert(code);
        }
    }

    /// Number of distinct files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no file has been collected.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files ordered by name.
    pub fn to_sorted(&self) -> BTreeMap<String, String> {
        self.files
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

struct DownloadContext {
    fetcher: Arc<dyn Fetcher>,
    extractor: PageExtractor,
    layout: Layout,
    suite: SuiteCollector,
    stored: AtomicUsize,
}

/// Discover all solutions, then fetch and store each one together with the
/// shared test suite.
pub async fn download(
    fetcher: Arc<dyn Fetcher>,
    pool: &WorkerPool,
    layout: &Layout,
    track: &str,
) -> Result<DownloadSummary> {
    let ids = discover(Arc::clone(&fetcher), pool).await?;
    let discovered = ids.len();

    let dir = layout.exercise_dir();
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::io("create", dir, e))?;

    let ctx = Arc::new(DownloadContext {
        fetcher,
        extractor: PageExtractor::new(track),
        layout: layout.clone(),
        suite: SuiteCollector::default(),
        stored: AtomicUsize::new(0),
    });

    let group = pool.group();
    for id in ids.into_sorted_vec() {
        let ctx = Arc::clone(&ctx);
        group
            .submit(Task::new(format!("download {}", id), store_solution(ctx, id)))
            .await?;
    }
    group.wait().await;

    let suite_files = write_suite(layout, &ctx.suite).await?;
    let summary = DownloadSummary {
        discovered,
        stored: ctx.stored.load(Ordering::SeqCst),
        suite_files,
    };
    info!(
        discovered = summary.discovered,
        stored = summary.stored,
        suite_files = summary.suite_files,
        "download finished"
    );
    Ok(summary)
}

async fn store_solution(ctx: Arc<DownloadContext>, id: SolutionId) {
    let path = format!("{}/{}", SOLUTIONS_PATH, id);
    let page = match ctx.fetcher.fetch(&path, &[]).await {
        Ok(page) => page,
        Err(e) => {
            warn!(%id, url = %e.url(), error = %e, "solution skipped");
            return;
        }
    };

    match ctx.extractor.test_suite(&page.text) {
        Ok(suite) => ctx.suite.merge(suite),
        Err(e) => debug!(%id, url = %page.url, error = %e, "page carries no test suite"),
    }

    let record = match ctx.extractor.solution(&id, &page.text) {
        Ok(record) => record,
        Err(e) => {
            warn!(%id, url = %page.url, error = %e, "solution skipped");
            return;
        }
    };

    let file = ctx.layout.solution_path(&record.id, Some(&record.author));
    if let Err(e) = tokio::fs::write(&file, record.code.as_bytes()).await {
        warn!(%id, path = %file.display(), error = %e, "write of solution failed");
        return;
    }
    ctx.stored.fetch_add(1, Ordering::SeqCst);
    info!(%id, author = %record.author, path = %file.display(), "solution stored");
}

async fn write_suite(layout: &Layout, suite: &SuiteCollector) -> Result<usize> {
    if suite.is_empty() {
        warn!("no test suite found on any solution page");
        return Ok(0);
    }

    let dir = layout.suite_dir();
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| Error::io("create", &dir, e))?;

    let mut written = 0;
    for (name, code) in suite.to_sorted() {
        // File names come from the page; never let one escape the suite dir.
        let Some(file_name) = std::path::Path::new(&name).file_name() else {
            warn!(name = %name, "test file with unusable name skipped");
            continue;
        };
        let path = dir.join(file_name);
        match tokio::fs::write(&path, code.as_bytes()).await {
            Ok(()) => written += 1,
            Err(e) => warn!(path = %path.display(), error = %e, "write of test file failed"),
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::error::FetchError;
    use crate::fetch::Page;
    use async_trait::async_trait;
    use std::collections::HashMap;

    const A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaa1111";
    const B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbb2222";
    const C: &str = "cccccccccccccccccccccccccccc3333";

    /// Serves canned pages keyed by path and query string.
    struct StaticSite {
        pages: HashMap<String, String>,
    }

    impl StaticSite {
        fn key(path: &str, query: &[(String, String)]) -> String {
            let query: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
            format!("{}?{}", path, query.join("&"))
        }
    }

    #[async_trait]
    impl Fetcher for StaticSite {
        async fn fetch(&self, path: &str, query: &[(String, String)]) -> std::result::Result<Page, FetchError> {
            let key = Self::key(path, query);
            match self.pages.get(&key) {
                Some(text) => Ok(Page {
                    text: text.clone(),
                    url: key,
                }),
                None => Err(FetchError::InvalidUrl {
                    url: key,
                    reason: "not served".to_string(),
                }),
            }
        }
    }

    fn solution_page(author: Option<&str>, code: &str, suite: &[(&str, &str)]) -> String {
        let mut page = String::new();
        if let Some(author) = author {
            page.push_str(&format!("<img alt='Avatar of {author}'>"));
        }
        page.push_str(&format!(
            "<pre class='line-numbers solution-code'><code class='language-go'>{code}</code></pre>"
        ));
        if !suite.is_empty() {
            page.push_str("<div class='pane pane-2 test-suite'>");
            for (name, code) in suite {
                page.push_str(&format!(
                    "<h3>{name}</h3><pre><code class='language-go'>{code}</code></pre>"
                ));
            }
            page.push_str("</div>");
        }
        page
    }

    fn site() -> StaticSite {
        let mut pages = HashMap::new();
        pages.insert(
            "solutions?".to_string(),
            "<a href=\"solutions?page=1\">Last</a>".to_string(),
        );
        pages.insert(
            "solutions?page=1".to_string(),
            format!("solutions/{A} solutions/{B} solutions/{C}"),
        );
        pages.insert(
            format!("solutions/{A}?"),
            solution_page(
                Some("alice"),
                "package leap // a &amp; b",
                &[("leap_test.go", "package leap // first")],
            ),
        );
        pages.insert(
            format!("solutions/{B}?"),
            solution_page(
                Some("bob"),
                "package leap",
                &[
                    ("leap_test.go", "package leap // second"),
                    ("cases_test.go", "package leap"),
                ],
            ),
        );
        // No author: the solution is skipped but its suite still counts.
        pages.insert(
            format!("solutions/{C}?"),
            solution_page(None, "package leap", &[("extra_test.go", "package leap")]),
        );
        StaticSite { pages }
    }

    #[test]
    fn test_suite_collector_first_writer_wins() {
        let collector = SuiteCollector::default();
        collector.merge(vec![("a_test.go".to_string(), "one".to_string())]);
        collector.merge(vec![
            ("a_test.go".to_string(), "two".to_string()),
            ("b_test.go".to_string(), "three".to_string()),
        ]);
        let files = collector.to_sorted();
        assert_eq!(files.len(), 2);
        assert_eq!(files["a_test.go"], "one");
        assert_eq!(files["b_test.go"], "three");
    }

    #[tokio::test]
    async fn test_download_stores_solutions_and_suite() {
        let root = tempfile::tempdir().unwrap();
        let settings = Settings::for_exercise("leap").with_download_dir(root.path());
        let layout = Layout::new(&settings);
        let pool = WorkerPool::serial();

        let summary = download(Arc::new(site()), &pool, &layout, &settings.track)
            .await
            .unwrap();
        pool.shutdown().await;

        assert_eq!(summary.discovered, 3);
        assert_eq!(summary.stored, 2);
        assert_eq!(summary.suite_files, 3);

        let alice = layout.solution_path(&SolutionId::new(A), Some("alice"));
        assert_eq!(
            std::fs::read_to_string(alice).unwrap(),
            "package leap // a & b"
        );
        assert!(layout
            .solution_path(&SolutionId::new(B), Some("bob"))
            .exists());
        assert!(!layout.solution_path(&SolutionId::new(C), None).exists());

        // Serial pool and sorted ids: A's page is merged first.
        let suite = layout.suite_dir();
        assert_eq!(
            std::fs::read_to_string(suite.join("leap_test.go")).unwrap(),
            "package leap // first"
        );
        assert!(suite.join("cases_test.go").exists());
        assert!(suite.join("extra_test.go").exists());
    }

    #[tokio::test]
    async fn test_download_unsafe_suite_name_stays_in_suite_dir() {
        let root = tempfile::tempdir().unwrap();
        let settings = Settings::for_exercise("leap").with_download_dir(root.path());
        let layout = Layout::new(&settings);
        std::fs::create_dir_all(layout.exercise_dir()).unwrap();

        let collector = SuiteCollector::default();
        collector.merge(vec![("../../escape.go".to_string(), "x".to_string())]);
        let written = write_suite(&layout, &collector).await.unwrap();

        assert_eq!(written, 1);
        assert!(layout.suite_dir().join("escape.go").exists());
        assert!(!root.path().join("escape.go").exists());
    }
}
