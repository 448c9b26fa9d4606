//! Merging every text or CSV file in a folder into a single output file.

use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

use crate::core::loaders::{self, LoaderError, Row};
use crate::core::writers::{self, WriteError, WriteMode};

/// Output file used by [`merge_text`] when the caller has no preference.
pub const DEFAULT_TEXT_OUTPUT: &str = "output_file.txt";

/// Output file used by [`merge_csv`] when the caller has no preference.
pub const DEFAULT_CSV_OUTPUT: &str = "output_file.csv";

/// Field delimiter used by [`merge_csv`] when the caller has no preference.
pub const DEFAULT_DELIMITER: char = ',';

/// Errors that can occur while merging a folder.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Input folder is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error(transparent)]
    Load(#[from] LoaderError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

impl MergeError {
    /// True when an input file was malformed rather than unreadable.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, MergeError::Load(e) if e.is_parse_error())
    }
}

/// Result type for merge operations.
pub type Result<T> = std::result::Result<T, MergeError>;

/// What a merge consumed and produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    /// Input files in the order they were merged.
    pub files: Vec<PathBuf>,
    /// Bytes written for text merges, rows written for CSV merges.
    pub records: usize,
    /// Path of the merged file.
    pub output: PathBuf,
}

fn collect_inputs(input_folder: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !input_folder.is_dir() {
        return Err(MergeError::NotADirectory(input_folder.to_path_buf()));
    }
    Ok(loaders::list_inputs(input_folder, extension)?)
}

/// Concatenate all `*.txt` files in `input_folder` into `output`.
///
/// Files are read in sorted path order and appended verbatim with no
/// separator. The output is only written once every input has been read, so
/// a read failure leaves no output behind.
///
/// # Errors
///
/// Returns an error if the folder cannot be listed, an input cannot be read
/// as UTF-8 text, or the output cannot be written.
pub fn merge_text(input_folder: &Path, output: &Path) -> Result<MergeReport> {
    let files = collect_inputs(input_folder, "txt")?;

    let mut combined = String::new();
    for file in &files {
        combined.push_str(&loaders::read_text(file)?);
    }

    writers::write_text(output, &combined, WriteMode::Truncate)?;

    info!(
        "Merged {} text files ({} bytes) -> {}",
        files.len(),
        combined.len(),
        output.display()
    );

    Ok(MergeReport {
        files,
        records: combined.len(),
        output: output.to_path_buf(),
    })
}

/// Concatenate the rows of all `*.csv` files in `input_folder` into `output`.
///
/// Every row of every file is kept, header rows included, so merging two
/// files that each start with a header yields two header rows. Rows are
/// re-serialized with the same delimiter and minimal quoting.
///
/// # Errors
///
/// Returns `Load(LoaderError::InvalidDelimiter)` before touching the
/// filesystem if `delimiter` is not a usable single ASCII character, a parse
/// error for malformed CSV, and an I/O error if an input or the output cannot
/// be accessed.
pub fn merge_csv(input_folder: &Path, output: &Path, delimiter: char) -> Result<MergeReport> {
    let delim = loaders::delimiter_byte(delimiter)?;
    let files = collect_inputs(input_folder, "csv")?;

    let mut combined: Vec<Row> = Vec::new();
    for file in &files {
        let rows = loaders::read_delimited(file, delim)?;
        debug!("{}: {} rows", file.display(), rows.len());
        combined.extend(rows);
    }

    let records = writers::write_delimited(output, &combined, delim, WriteMode::Truncate)?;

    info!(
        "Merged {} CSV files ({} rows) -> {}",
        files.len(),
        records,
        output.display()
    );

    Ok(MergeReport {
        files,
        records,
        output: output.to_path_buf(),
    })
}
