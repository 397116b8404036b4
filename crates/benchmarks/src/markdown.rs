//! Markdown summary of a bench report.

use crate::report::BenchReport;
use std::fmt::Write;

fn optional<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Generate a markdown summary with one table per benchmark.
pub fn generate_summary(report: &BenchReport) -> String {
    let mut output = String::new();

    writeln!(output, "# Benchmark Summary: {}/{}", report.track, report.exercise).unwrap();
    writeln!(output).unwrap();
    writeln!(output, "Generated: {}", report.generated_at.to_rfc3339()).unwrap();
    writeln!(output).unwrap();

    for ranking in &report.rankings {
        writeln!(output, "## {}", ranking.benchmark).unwrap();
        writeln!(output).unwrap();
        writeln!(output, "| Rank | Solution | ns/op | MB/s | B/op | allocs/op | Size |").unwrap();
        writeln!(output, "|------|----------|-------|------|------|-----------|------|").unwrap();
        for entry in &ranking.entries {
            let m = &entry.metric;
            writeln!(
                output,
                "| {} | {} | {:.1} | {} | {} | {} | {} |",
                entry.rank,
                entry.solution,
                m.time,
                optional(m.throughput.map(|t| format!("{:.1}", t))),
                optional(m.mem_bytes),
                optional(m.allocs),
                entry.code_size
            )
            .unwrap();
        }
        writeln!(output).unwrap();
    }

    let unranked: Vec<_> = report
        .benchmarks
        .iter()
        .filter(|name| !report.rankings.iter().any(|r| &r.benchmark == *name))
        .collect();
    if !unranked.is_empty() {
        writeln!(output, "## Not reported").unwrap();
        writeln!(output).unwrap();
        for name in unranked {
            writeln!(output, "- {}", name).unwrap();
        }
        writeln!(output).unwrap();
    }

    writeln!(output, "---").unwrap();
    writeln!(
        output,
        "Solutions benchmarked: {}, failed: {}",
        report.solutions.len(),
        report.failed
    )
    .unwrap();

    output
}
