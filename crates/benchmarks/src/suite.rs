//! Benchmark discovery in the shared test suite.

use benchrank_core::layout::top_level_files;
use benchrank_core::Error;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static BENCH_FUNC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bfunc\s+(Benchmark\w*)\s*\(").expect("benchmark function pattern is valid")
});

/// Benchmark function names declared in `source`, in order of appearance.
pub fn benchmark_names_in(source: &str) -> impl Iterator<Item = &str> {
    BENCH_FUNC_RE
        .captures_iter(source)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Benchmark names declared across the top-level files of a suite
/// directory, without duplicates, in first-seen order. Files are read in
/// name order.
pub fn benchmark_names(suite_dir: &Path) -> Result<Vec<String>, Error> {
    let mut files = top_level_files(suite_dir)?;
    files.sort();

    let mut names: Vec<String> = Vec::new();
    for file in files {
        let source =
            std::fs::read_to_string(&file).map_err(|e| Error::io("read", &file, e))?;
        for name in benchmark_names_in(&source) {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}
