//! I/O operations for bench reports.
//!
//! Reports are written next to the downloaded solutions as pretty JSON and
//! as a markdown summary.

use crate::markdown;
use crate::report::BenchReport;
use benchrank_core::Layout;
use std::fs;
use std::io;
use std::path::Path;

/// Write a report as pretty JSON.
pub fn write_report_json(report: &BenchReport, path: impl AsRef<Path>) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    fs::write(path, json)
}

/// Write the markdown summary of a report.
pub fn write_summary(report: &BenchReport, path: impl AsRef<Path>) -> io::Result<()> {
    fs::write(path, markdown::generate_summary(report))
}

/// Write both report files into the exercise directory.
pub fn write_all_outputs(report: &BenchReport, layout: &Layout) -> io::Result<()> {
    fs::create_dir_all(layout.exercise_dir())?;
    write_report_json(report, layout.results_path())?;
    write_summary(report, layout.summary_path())?;
    Ok(())
}
