//! Ranked results of one bench run.

use crate::stats::{sort_by_benchmark, BenchmarkMetric, SolutionStats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::warn;

/// One solution's place in a benchmark ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// 1-based position.
    pub rank: usize,
    /// Solution name.
    pub solution: String,
    /// The solution's result for the ranked benchmark.
    pub metric: BenchmarkMetric,
    /// Code size of the solution.
    pub code_size: usize,
}

/// Solutions ordered best-first for one benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    /// Benchmark name.
    pub benchmark: String,
    /// Entries, best first.
    pub entries: Vec<RankedEntry>,
}

impl Ranking {
    /// Rank every solution that reported `benchmark`.
    ///
    /// The input order is the tie-break order of last resort.
    pub fn build(stats: &[SolutionStats], benchmark: &str) -> Self {
        let mut sorted = stats.to_vec();
        sort_by_benchmark(&mut sorted, benchmark);

        let entries = sorted
            .into_iter()
            .filter_map(|s| {
                let metric = s.benchmarks.get(benchmark)?.clone();
                Some((s.name, metric, s.code_size))
            })
            .enumerate()
            .map(|(i, (solution, metric, code_size))| RankedEntry {
                rank: i + 1,
                solution,
                metric,
                code_size,
            })
            .collect();

        Self {
            benchmark: benchmark.to_string(),
            entries,
        }
    }

    /// Winner of the ranking.
    pub fn leader(&self) -> Option<&RankedEntry> {
        self.entries.first()
    }
}

/// Rankings for each benchmark name that at least one solution reported,
/// in the order the names are given.
pub fn rank_all(stats: &[SolutionStats], benchmarks: &[String]) -> Vec<Ranking> {
    benchmarks
        .iter()
        .filter_map(|name| {
            let ranking = Ranking::build(stats, name);
            if ranking.entries.is_empty() {
                warn!(benchmark = %name, "no solution reported benchmark");
                None
            } else {
                Some(ranking)
            }
        })
        .collect()
}

/// Complete outcome of benchmarking an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchReport {
    /// Language track.
    pub track: String,
    /// Exercise slug.
    pub exercise: String,
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
    /// Benchmark names declared by the test suite.
    pub benchmarks: Vec<String>,
    /// Results of every successfully benchmarked solution.
    pub solutions: Vec<SolutionStats>,
    /// Number of solutions whose benchmark failed.
    pub failed: usize,
    /// Per-benchmark rankings.
    pub rankings: Vec<Ranking>,
}

impl BenchReport {
    /// Plain-text ranking tables, one block per benchmark.
    pub fn render_text(&self) -> String {
        let mut output = String::new();
        for ranking in &self.rankings {
            writeln!(output, "{}", ranking.benchmark).unwrap();
            for entry in &ranking.entries {
                writeln!(
                    output,
                    "{:>4}. {:<48} {} {:>8} symbols",
                    entry.rank, entry.solution, entry.metric, entry.code_size
                )
                .unwrap();
            }
            writeln!(output).unwrap();
        }
        write!(
            output,
            "{} solutions benchmarked, {} failed",
            self.solutions.len(),
            self.failed
        )
        .unwrap();
        output
    }
}
