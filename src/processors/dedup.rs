//! Removing rows whose leading identifier has already been seen.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use crate::core::loaders::{self, LoaderError, Row};
use crate::core::writers::{self, WriteError, WriteMode};

/// Field separator of the deduplicated files.
pub const FIELD_SEPARATOR: char = '\t';

/// Errors that can occur during deduplication.
#[derive(Debug, Error)]
pub enum DedupError {
    #[error(transparent)]
    Load(#[from] LoaderError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

impl DedupError {
    /// True when the file was not valid UTF-8 text rather than unreadable.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, DedupError::Load(e) if e.is_parse_error())
    }
}

/// Result type for deduplication.
pub type Result<T> = std::result::Result<T, DedupError>;

/// Outcome of a deduplication pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupReport {
    /// File that was deduplicated.
    pub path: PathBuf,
    /// Rows kept (first occurrence of each identifier).
    pub kept: usize,
    /// Rows dropped as repeats.
    pub dropped: usize,
}

/// Split a line on tabs. The newline stays inside the last field.
fn split_row(line: &str) -> Row {
    line.split(FIELD_SEPARATOR).map(str::to_string).collect()
}

/// Keep the first row for each identifier, in input order.
fn first_occurrences(lines: &[String]) -> Vec<Row> {
    let mut identifiers: HashSet<String> = HashSet::new();
    let mut rows = Vec::with_capacity(lines.len());

    for line in lines {
        let row = split_row(line);
        if identifiers.insert(row[0].clone()) {
            rows.push(row);
        }
    }

    rows
}

/// Remove rows with a repeated first field, rewriting `filepath` in place.
///
/// The file is truncated and rewritten directly, so a failure during the
/// write can lose data. Use [`remove_duplicates_with`] and
/// [`WriteMode::Atomic`] to replace the file by rename instead.
pub fn remove_duplicates(filepath: &Path) -> Result<DedupReport> {
    remove_duplicates_with(filepath, WriteMode::Truncate)
}

/// Remove rows with a repeated first field, replacing `filepath` per `mode`.
///
/// Each line is split on tabs and its first field is the identifier; a line
/// without tabs is its own identifier. Only the first row for each identifier
/// is kept. Kept rows are re-joined with tabs and written back to back, so the
/// line terminators read from the file are the only separators; a last line
/// without a newline is written without one.
///
/// # Errors
///
/// Returns `DedupError::Load` if the file cannot be read as UTF-8 text and
/// `DedupError::Write` if it cannot be rewritten.
pub fn remove_duplicates_with(filepath: &Path, mode: WriteMode) -> Result<DedupReport> {
    let lines = loaders::read_lines(filepath)?;
    let rows = first_occurrences(&lines);

    let sep = FIELD_SEPARATOR.to_string();
    let contents: String = rows.iter().map(|row| row.join(&sep)).collect();
    writers::write_text(filepath, &contents, mode)?;

    let report = DedupReport {
        path: filepath.to_path_buf(),
        kept: rows.len(),
        dropped: lines.len() - rows.len(),
    };
    info!(
        "{}: kept {} rows, dropped {} duplicates",
        filepath.display(),
        report.kept,
        report.dropped
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("rows.tsv");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_first_occurrence_wins() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "1\tA\n2\tB\n1\tC\n");

        let report = remove_duplicates(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "1\tA\n2\tB\n");
        assert_eq!(report.kept, 2);
        assert_eq!(report.dropped, 1);
    }

    #[test]
    fn test_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "a\t1\t2\nb\t3\na\t4\nc\t5\nb\t6\n");

        remove_duplicates(&path).unwrap();
        let once = fs::read_to_string(&path).unwrap();
        let report = remove_duplicates(&path).unwrap();
        let twice = fs::read_to_string(&path).unwrap();

        assert_eq!(once, "a\t1\t2\nb\t3\nc\t5\n");
        assert_eq!(once, twice);
        assert_eq!(report.dropped, 0);
    }

    #[test]
    fn test_line_terminators_preserved() {
        let dir = TempDir::new().unwrap();
        // Missing final newline and a CRLF line both survive untouched.
        let path = fixture(&dir, "x\tone\r\ny\ttwo\nx\tthree\nz\tlast");

        remove_duplicates(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "x\tone\r\ny\ttwo\nz\tlast");
    }

    #[test]
    fn test_lines_without_tabs_use_whole_line() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "solo\nsolo\nsolo\tx\n");

        let report = remove_duplicates(&path).unwrap();

        // "solo\n" and "solo" are different identifiers.
        assert_eq!(fs::read_to_string(&path).unwrap(), "solo\nsolo\tx\n");
        assert_eq!(report.kept, 2);
    }

    #[test]
    fn test_empty_identifier() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "\ta\n\tb\n");

        remove_duplicates(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "\ta\n");
    }

    #[test]
    fn test_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "");

        let report = remove_duplicates(&path).unwrap();

        assert_eq!(report.kept, 0);
        assert!(fs::read_to_string(&path).unwrap().is_empty());
    }

    #[test]
    fn test_atomic_mode() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "1\tA\n1\tB\n");

        remove_duplicates_with(&path, WriteMode::Atomic).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "1\tA\n");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_mode_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "1\tA\n1\tB\n");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        remove_duplicates_with(&path, WriteMode::Atomic).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rows.tsv");
        fs::write(&path, [0xff, 0xfe, b'\t', b'x', b'\n']).unwrap();

        let err = remove_duplicates(&path).unwrap_err();

        assert!(matches!(err, DedupError::Load(LoaderError::InvalidText { .. })));
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();

        let result = remove_duplicates(&dir.path().join("absent.tsv"));

        let err = result.unwrap_err();
        assert!(matches!(err, DedupError::Load(LoaderError::Io { .. })));
        assert!(!err.is_parse_error());
    }
}
