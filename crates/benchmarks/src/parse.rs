//! Parsing of `go test -bench` reports.
//!
//! A report line looks like
//!
//! ```text
//! BenchmarkFoo-4    1000    523.4 ns/op    12.5 MB/s    128 B/op    3 allocs/op
//! ```
//!
//! The parallelism suffix (`-4`) and the iteration count are discarded.
//! Time per operation is mandatory; throughput and the memory pair are
//! optional and stay `None` when absent.

use crate::stats::BenchmarkMetric;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use thiserror::Error;

static REPORT_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(Benchmark\w*)(?:-[[:digit:]]+)?\s+[[:digit:]]+\s+",
        r"([[:digit:]]+(?:\.[[:digit:]]+)?) ns/op",
        r"(?:\s+([[:digit:]]+(?:\.[[:digit:]]+)?) MB/s)?",
        r"(?:\s+([[:digit:]]+) B/op\s+([[:digit:]]+) allocs/op)?",
    ))
    .expect("report line pattern is valid")
});

/// Errors from parsing one report.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// No line of the report carried benchmark results.
    #[error("no benchmarks")]
    NoBenchmarks,

    /// A captured number did not fit its type.
    #[error("invalid {field} value {value:?} for {benchmark}")]
    InvalidNumber {
        /// Benchmark the line belongs to.
        benchmark: String,
        /// Which column failed.
        field: &'static str,
        /// Captured text.
        value: String,
    },
}

/// Metrics by benchmark name. A repeated name keeps its last line.
pub fn parse_report(report: &str) -> Result<BTreeMap<String, BenchmarkMetric>, ParseError> {
    let mut metrics = BTreeMap::new();

    for caps in REPORT_LINE_RE.captures_iter(report) {
        let name = caps[1].to_string();
        let number = |idx: usize, field: &'static str| -> Result<Option<f64>, ParseError> {
            caps.get(idx)
                .map(|m| {
                    m.as_str().parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                        benchmark: name.clone(),
                        field,
                        value: m.as_str().to_string(),
                    })
                })
                .transpose()
        };
        let count = |idx: usize, field: &'static str| -> Result<Option<u64>, ParseError> {
            caps.get(idx)
                .map(|m| {
                    m.as_str().parse::<u64>().map_err(|_| ParseError::InvalidNumber {
                        benchmark: name.clone(),
                        field,
                        value: m.as_str().to_string(),
                    })
                })
                .transpose()
        };

        let time = number(2, "ns/op")?.ok_or(ParseError::NoBenchmarks)?;
        let metric = BenchmarkMetric {
            name: name.clone(),
            time,
            throughput: number(3, "MB/s")?,
            mem_bytes: count(4, "B/op")?,
            allocs: count(5, "allocs/op")?,
        };
        metrics.insert(name, metric);
    }

    if metrics.is_empty() {
        return Err(ParseError::NoBenchmarks);
    }
    Ok(metrics)
}
