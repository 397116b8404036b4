// Copyright 2025 Benchrank Contributors
// SPDX-License-Identifier: Apache-2.0

//! Field extraction from solution pages.
//!
//! Pages are scanned as plain text. Every region is located the same way:
//! find a start marker, then the nearest end marker after it. That scan is
//! [`Markers::scan`]; the author name is the one field found by regular
//! expression instead.
//!
//! All extracted text is HTML-entity decoded. Extraction is pure: the same
//! page always yields the same value or the same [`ExtractError`].

use crate::error::ExtractError;
use crate::SolutionId;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static AUTHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Avatar of ([[:word:]-]+)").expect("author pattern is valid")
});

const TEST_SUITE_START: &str = "<div class='pane pane-2 test-suite'>";
const TEST_SUITE_END: &str = "</div>";
const FILE_NAME_START: &str = "<h3>";
const FILE_NAME_END: &str = "</h3>";
const SOLUTION_PRE: &str = "<pre class='line-numbers solution-code'>";
const CODE_END: &str = "</code>";

/// A start/end marker pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    start: String,
    end: String,
}

/// Text found between two markers, and the text after the end marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Found<'t> {
    /// Text strictly between the markers.
    pub inner: &'t str,
    /// Text following the end marker.
    pub rest: &'t str,
}

impl Markers {
    /// Marker pair from start and end strings.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Find the first start marker and the nearest end marker after it.
    pub fn scan<'t>(&self, text: &'t str) -> Option<Found<'t>> {
        let from = text.find(&self.start)? + self.start.len();
        let tail = &text[from..];
        let len = tail.find(&self.end)?;
        Some(Found {
            inner: &tail[..len],
            rest: &tail[len + self.end.len()..],
        })
    }
}

/// Test files by name.
pub type TestSuite = BTreeMap<String, String>;

/// Author and code of one solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionRecord {
    /// Solution identifier.
    pub id: SolutionId,
    /// Author's user name.
    pub author: String,
    /// Decoded source code.
    pub code: String,
}

/// Extracts fields from pages of one language track.
#[derive(Debug, Clone)]
pub struct PageExtractor {
    solution_code: Markers,
    test_suite: Markers,
    file_name: Markers,
    file_code: Markers,
}

impl PageExtractor {
    /// Extractor for pages rendered for `track`.
    pub fn new(track: &str) -> Self {
        let code_start = format!("<code class='language-{}'>", track);
        Self {
            solution_code: Markers::new(
                format!("{}{}", SOLUTION_PRE, code_start),
                format!("{}</pre>", CODE_END),
            ),
            test_suite: Markers::new(TEST_SUITE_START, TEST_SUITE_END),
            file_name: Markers::new(FILE_NAME_START, FILE_NAME_END),
            file_code: Markers::new(code_start, CODE_END),
        }
    }

    /// Author name from the avatar caption.
    pub fn author(&self, page: &str) -> Result<String, ExtractError> {
        AUTHOR_RE
            .captures(page)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or(ExtractError::NoAuthorName)
    }

    /// The solution's own source code.
    pub fn solution_code(&self, page: &str) -> Result<String, ExtractError> {
        self.solution_code
            .scan(page)
            .map(|found| decode(found.inner))
            .ok_or(ExtractError::NoSolutionCode)
    }

    /// Author and code together. Fails if either is missing.
    pub fn solution(&self, id: &SolutionId, page: &str) -> Result<SolutionRecord, ExtractError> {
        let author = self.author(page)?;
        let code = self.solution_code(page)?;
        Ok(SolutionRecord {
            id: id.clone(),
            author,
            code,
        })
    }

    /// Every (file name, code) pair inside the test suite pane.
    ///
    /// A name whose code region cannot be found, or a pane without any
    /// file, fails the whole suite. A repeated name keeps its first code.
    pub fn test_suite(&self, page: &str) -> Result<TestSuite, ExtractError> {
        let pane = self
            .test_suite
            .scan(page)
            .ok_or(ExtractError::NoTestSuite)?;

        let mut suite = TestSuite::new();
        let mut rest = pane.inner;
        while let Some(name) = self.file_name.scan(rest) {
            let code = self
                .file_code
                .scan(name.rest)
                .ok_or(ExtractError::NoTestSuite)?;
            suite
                .entry(decode(name.inner))
                .or_insert_with(|| decode(code.inner));
            rest = code.rest;
        }

        if suite.is_empty() {
            return Err(ExtractError::NoTestSuite);
        }
        Ok(suite)
    }
}

fn decode(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}
