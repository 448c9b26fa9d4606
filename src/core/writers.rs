//! Writers for merged text, delimited rows and rewritten line files.
//!
//! Output can either truncate the destination and write into it directly,
//! or go to a temporary file in the same directory that is renamed over the
//! destination once everything has been written.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::{Terminator, WriterBuilder};
use tempfile::NamedTempFile;
use thiserror::Error;

use super::loaders::Row;

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// Failed to move the temporary file over the destination.
    #[error("failed to replace '{path}': {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// How the destination file is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Truncate the destination and write into it. A failure part way
    /// through leaves a truncated file.
    #[default]
    Truncate,
    /// Write a sibling temporary file, then rename it over the destination.
    Atomic,
}

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Creates a buffered writer for the given path.
fn create_buffered_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(BufWriter::new(file))
}

/// Open the destination according to `mode`, let `fill` write the body,
/// then flush and (for atomic mode) persist.
fn write_output<F>(path: &Path, mode: WriteMode, fill: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    ensure_parent_dirs(path)?;
    let path_str = path.display().to_string();

    match mode {
        WriteMode::Truncate => {
            let mut writer = create_buffered_writer(path)?;
            fill(&mut writer)?;
            writer.flush().map_err(|e| WriteError::WriteFile {
                path: path_str,
                source: e,
            })?;
        }
        WriteMode::Atomic => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let temp = NamedTempFile::new_in(dir).map_err(|e| WriteError::CreateFile {
                path: dir.display().to_string(),
                source: e,
            })?;

            let mut writer = BufWriter::new(temp);
            fill(&mut writer)?;

            let temp = writer.into_inner().map_err(|e| WriteError::WriteFile {
                path: path_str.clone(),
                source: e.into_error(),
            })?;

            // The replacement keeps the permissions of the file it replaces.
            if let Ok(metadata) = fs::metadata(path) {
                temp.as_file()
                    .set_permissions(metadata.permissions())
                    .map_err(|e| WriteError::WriteFile {
                        path: path_str.clone(),
                        source: e,
                    })?;
            }
            temp.persist(path).map_err(|e| WriteError::Persist {
                path: path_str,
                source: e.error,
            })?;
        }
    }

    Ok(())
}

/// Write `contents` to `path` verbatim.
///
/// Parent directories are created if needed. An empty string produces an
/// empty file.
pub fn write_text(path: &Path, contents: &str, mode: WriteMode) -> Result<()> {
    write_output(path, mode, |out| {
        out.write_all(contents.as_bytes())
            .map_err(|e| WriteError::WriteFile {
                path: path.display().to_string(),
                source: e,
            })
    })
}

/// Write rows as delimited text.
///
/// Fields are quoted only when they contain the delimiter, a quote or a
/// line break. Every row ends with `\r\n`, and an empty row is written as
/// the bare terminator. Rows may differ in length.
///
/// # Returns
///
/// The number of rows written.
pub fn write_delimited(path: &Path, rows: &[Row], delimiter: u8, mode: WriteMode) -> Result<usize> {
    write_output(path, mode, |out| {
        let path_str = path.display().to_string();
        let mut builder = WriterBuilder::new();
        builder
            .delimiter(delimiter)
            .terminator(Terminator::CRLF)
            .flexible(true);

        // csv writes an empty record as `""`, so empty rows bypass it and
        // each run of non-empty rows gets its own writer.
        for (i, run) in rows.split(|row| row.is_empty()).enumerate() {
            if i > 0 {
                out.write_all(b"\r\n").map_err(|e| WriteError::WriteFile {
                    path: path_str.clone(),
                    source: e,
                })?;
            }
            if run.is_empty() {
                continue;
            }

            let mut csv_writer = builder.from_writer(&mut *out);
            for row in run {
                csv_writer
                    .write_record(row)
                    .map_err(|e| WriteError::CsvError {
                        path: path_str.clone(),
                        source: e,
                    })?;
            }
            csv_writer.flush().map_err(|e| WriteError::WriteFile {
                path: path_str.clone(),
                source: e,
            })?;
        }

        Ok(())
    })?;

    Ok(rows.len())
}
