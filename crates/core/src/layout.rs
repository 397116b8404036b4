// Copyright 2025 Benchrank Contributors
// SPDX-License-Identifier: Apache-2.0

//! On-disk layout of downloaded solutions.
//!
//! ```text
//! <root>/<track>/<exercise>/
//!   <id>[-<author>].<ext>     one file per solution
//!   test-suite/<file>         shared test files
//!   bench-results.json        last ranking, JSON
//!   bench-summary.md          last ranking, markdown
//! ```

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::SolutionId;
use std::path::{Path, PathBuf};
use tracing::info;

/// Directory holding the shared test files.
pub const TEST_SUITE_DIR: &str = "test-suite";

/// JSON ranking output file name.
pub const RESULTS_FILE: &str = "bench-results.json";

/// Markdown ranking output file name.
pub const SUMMARY_FILE: &str = "bench-summary.md";

/// Paths for one exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    exercise_dir: PathBuf,
    extension: String,
}

impl Layout {
    /// Layout for the exercise named in `settings`.
    pub fn new(settings: &Settings) -> Self {
        Self {
            exercise_dir: settings
                .download_dir
                .join(&settings.track)
                .join(&settings.exercise),
            extension: settings.source_extension.clone(),
        }
    }

    /// `<root>/<track>/<exercise>`.
    pub fn exercise_dir(&self) -> &Path {
        &self.exercise_dir
    }

    /// Directory of the shared test suite.
    pub fn suite_dir(&self) -> PathBuf {
        self.exercise_dir.join(TEST_SUITE_DIR)
    }

    /// Source file extension, without the dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// File a solution is stored in.
    pub fn solution_path(&self, id: &SolutionId, author: Option<&str>) -> PathBuf {
        let stem = match author {
            Some(author) if !author.is_empty() => format!("{}-{}", id, author),
            _ => id.to_string(),
        };
        self.exercise_dir
            .join(format!("{}.{}", stem, self.extension))
    }

    /// JSON ranking output.
    pub fn results_path(&self) -> PathBuf {
        self.exercise_dir.join(RESULTS_FILE)
    }

    /// Markdown ranking output.
    pub fn summary_path(&self) -> PathBuf {
        self.exercise_dir.join(SUMMARY_FILE)
    }

    /// Top-level regular files of the exercise dir with the source
    /// extension, sorted by name.
    pub fn solution_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = top_level_files(&self.exercise_dir)?
            .into_iter()
            .filter(|p| {
                p.extension()
                    .map_or(false, |ext| ext == self.extension.as_str())
            })
            .collect::<Vec<_>>();
        files.sort();
        Ok(files)
    }

    /// Remove everything downloaded for the exercise.
    ///
    /// A missing directory is not an error.
    pub fn clean(&self) -> Result<()> {
        match std::fs::remove_dir_all(&self.exercise_dir) {
            Ok(()) => {
                info!(path = %self.exercise_dir.display(), "removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io("remove", &self.exercise_dir, e)),
        }
    }
}

/// Regular files directly inside `dir`, in directory order.
///
/// Nested directories and anything that is not a regular file are skipped.
pub fn top_level_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::io("read dir", dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io("read dir", dir, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| Error::io("stat", entry.path(), e))?;
        if file_type.is_file() {
            files.push(entry.path());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(root: &Path) -> Layout {
        Layout::new(&Settings::for_exercise("two-fer").with_download_dir(root))
    }

    #[test]
    fn test_paths() {
        let layout = layout(Path::new("/data"));
        let id = SolutionId::new("0123456789abcdef0123456789abcdef");
        assert_eq!(layout.exercise_dir(), Path::new("/data/go/two-fer"));
        assert_eq!(layout.suite_dir(), Path::new("/data/go/two-fer/test-suite"));
        assert_eq!(
            layout.solution_path(&id, Some("gopher")),
            Path::new("/data/go/two-fer/0123456789abcdef0123456789abcdef-gopher.go")
        );
        assert_eq!(
            layout.solution_path(&id, None),
            Path::new("/data/go/two-fer/0123456789abcdef0123456789abcdef.go")
        );
    }

    #[test]
    fn test_solution_files_skips_dirs_and_other_extensions() {
        let root = tempfile::tempdir().unwrap();
        let layout = layout(root.path());
        std::fs::create_dir_all(layout.suite_dir()).unwrap();
        std::fs::write(layout.suite_dir().join("two_fer_test.go"), "").unwrap();
        std::fs::write(layout.exercise_dir().join("bbb.go"), "").unwrap();
        std::fs::write(layout.exercise_dir().join("aaa-x.go"), "").unwrap();
        std::fs::write(layout.results_path(), "{}").unwrap();

        let files = layout.solution_files().unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["aaa-x.go", "bbb.go"]);
    }

    #[test]
    fn test_solution_files_missing_dir_is_error() {
        let root = tempfile::tempdir().unwrap();
        assert!(layout(&root.path().join("absent")).solution_files().is_err());
    }

    #[test]
    fn test_clean_removes_tree_and_tolerates_missing() {
        let root = tempfile::tempdir().unwrap();
        let layout = layout(root.path());
        std::fs::create_dir_all(layout.suite_dir()).unwrap();
        std::fs::write(layout.suite_dir().join("a_test.go"), "x").unwrap();

        layout.clean().unwrap();
        assert!(!layout.exercise_dir().exists());
        layout.clean().unwrap();
    }
}
