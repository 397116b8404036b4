//! Per-solution benchmark statistics and ranking.
//!
//! Solutions are ranked per benchmark by, in order of precedence:
//! time, throughput, bytes allocated, allocation count, code size. All
//! keys are ascending and each only breaks ties left by the previous one.
//! A missing optional value orders after every present one. The sort is
//! stable, so fully tied solutions keep their collection order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// Measurements of one benchmark for one solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMetric {
    /// Benchmark function name.
    pub name: String,
    /// Nanoseconds per operation.
    pub time: f64,
    /// Megabytes per second, when reported.
    pub throughput: Option<f64>,
    /// Bytes allocated per operation, when reported.
    pub mem_bytes: Option<u64>,
    /// Allocations per operation, when reported.
    pub allocs: Option<u64>,
}

impl std::fmt::Display for BenchmarkMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:15.1} ns", self.time)?;
        if let Some(throughput) = self.throughput {
            write!(f, " {:18.1} MB/s", throughput)?;
        }
        if let (Some(mem), Some(allocs)) = (self.mem_bytes, self.allocs) {
            write!(f, " {:15} B mem {:15} allocs", mem, allocs)?;
        }
        Ok(())
    }
}

/// All benchmark results of one solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionStats {
    /// Solution file stem, `<id>[-<author>]`.
    pub name: String,
    /// Metrics by benchmark name.
    pub benchmarks: BTreeMap<String, BenchmarkMetric>,
    /// Code symbols excluding whitespace and comments.
    pub code_size: usize,
}

impl SolutionStats {
    /// Metric for one benchmark, if the solution reported it.
    pub fn metric(&self, benchmark: &str) -> Option<&BenchmarkMetric> {
        self.benchmarks.get(benchmark)
    }
}

fn present_first<T>(a: Option<T>, b: Option<T>, cmp: impl FnOnce(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Compare two metrics of the same benchmark.
pub fn compare_metrics(a: &BenchmarkMetric, b: &BenchmarkMetric) -> Ordering {
    a.time
        .total_cmp(&b.time)
        .then_with(|| present_first(a.throughput, b.throughput, |x, y| x.total_cmp(&y)))
        .then_with(|| present_first(a.mem_bytes, b.mem_bytes, |x, y| x.cmp(&y)))
        .then_with(|| present_first(a.allocs, b.allocs, |x, y| x.cmp(&y)))
}

/// Stable sort of `stats` by their results for `benchmark`, then by code
/// size. Solutions that did not report the benchmark move to the end.
pub fn sort_by_benchmark(stats: &mut [SolutionStats], benchmark: &str) {
    stats.sort_by(|a, b| {
        match (a.metric(benchmark), b.metric(benchmark)) {
            (Some(x), Some(y)) => compare_metrics(x, y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| a.code_size.cmp(&b.code_size))
    });
}

/// Append-only collection shared by benchmark tasks.
#[derive(Debug, Default)]
pub struct StatsCollector {
    stats: Mutex<Vec<SolutionStats>>,
}

impl StatsCollector {
    /// Empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one solution's results.
    pub fn push(&self, stats: SolutionStats) {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(stats);
    }

    /// Number of collected solutions.
    pub fn len(&self) -> usize {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the collected results in append order.
    pub fn snapshot(&self) -> Vec<SolutionStats> {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Collected results in append order.
    pub fn into_inner(self) -> Vec<SolutionStats> {
        self.stats
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BENCH: &str = "BenchmarkFoo";

    fn metric(time: f64, throughput: Option<f64>, mem: Option<u64>, allocs: Option<u64>) -> BenchmarkMetric {
        BenchmarkMetric {
            name: BENCH.to_string(),
            time,
            throughput,
            mem_bytes: mem,
            allocs,
        }
    }

    fn solution(name: &str, m: BenchmarkMetric, size: usize) -> SolutionStats {
        let mut benchmarks = BTreeMap::new();
        benchmarks.insert(m.name.clone(), m);
        SolutionStats {
            name: name.to_string(),
            benchmarks,
            code_size: size,
        }
    }

    fn names(stats: &[SolutionStats]) -> Vec<&str> {
        stats.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_code_size_breaks_time_tie() {
        let mut stats = vec![
            solution("A", metric(5.0, None, None, None), 10),
            solution("B", metric(5.0, None, None, None), 5),
        ];
        sort_by_benchmark(&mut stats, BENCH);
        assert_eq!(names(&stats), vec!["B", "A"]);
    }

    #[test]
    fn test_sort_is_stable_for_full_ties() {
        let mut stats = vec![
            solution("A", metric(5.0, None, None, None), 5),
            solution("B", metric(5.0, None, None, None), 5),
            solution("C", metric(4.0, None, None, None), 5),
        ];
        sort_by_benchmark(&mut stats, BENCH);
        assert_eq!(names(&stats), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_tiers_apply_in_order() {
        let mut stats = vec![
            solution("slow", metric(9.0, Some(1.0), Some(0), Some(0)), 1),
            solution("more-allocs", metric(3.0, Some(1.0), Some(64), Some(4)), 1),
            solution("more-mem", metric(3.0, Some(1.0), Some(128), Some(1)), 1),
            solution("best", metric(3.0, Some(1.0), Some(64), Some(2)), 100),
            solution("low-throughput", metric(3.0, Some(0.5), Some(999), Some(9)), 500),
        ];
        sort_by_benchmark(&mut stats, BENCH);
        assert_eq!(
            names(&stats),
            vec!["low-throughput", "best", "more-allocs", "more-mem", "slow"]
        );
    }

    #[test]
    fn test_absent_throughput_sorts_after_present() {
        let absent = metric(5.0, None, Some(0), Some(0));
        let present = metric(5.0, Some(100.0), Some(0), Some(0));
        assert_eq!(compare_metrics(&present, &absent), Ordering::Less);
        assert_eq!(compare_metrics(&absent, &present), Ordering::Greater);

        let mut stats = vec![solution("absent", absent, 1), solution("present", present, 1)];
        sort_by_benchmark(&mut stats, BENCH);
        assert_eq!(names(&stats), vec!["present", "absent"]);
    }

    #[test]
    fn test_absent_memory_sorts_after_present() {
        let absent = metric(5.0, None, None, None);
        let present = metric(5.0, None, Some(1 << 20), Some(1000));
        assert_eq!(compare_metrics(&present, &absent), Ordering::Less);
    }

    #[test]
    fn test_missing_benchmark_moves_to_end() {
        let mut other = solution("other", metric(1.0, None, None, None), 1);
        other.benchmarks = BTreeMap::new();
        let mut stats = vec![other, solution("has", metric(50.0, None, None, None), 9)];
        sort_by_benchmark(&mut stats, BENCH);
        assert_eq!(names(&stats), vec!["has", "other"]);
    }

    #[test]
    fn test_metric_display() {
        let m = metric(523.4, None, Some(128), Some(3));
        let text = m.to_string();
        assert!(text.contains("523.4 ns"));
        assert!(text.contains("128 B mem"));
        assert!(text.contains("3 allocs"));
        assert!(!text.contains("MB/s"));
    }

    #[test]
    fn test_collector_keeps_append_order() {
        let collector = StatsCollector::new();
        assert!(collector.is_empty());
        collector.push(solution("first", metric(2.0, None, None, None), 1));
        collector.push(solution("second", metric(1.0, None, None, None), 1));
        assert_eq!(collector.len(), 2);
        assert_eq!(names(&collector.into_inner()), vec!["first", "second"]);
    }
}
