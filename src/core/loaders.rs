//! Loaders for the text, delimited and tab-separated inputs.
//!
//! Every loader reads its file fully into memory and releases the handle
//! before returning.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use log::debug;
use thiserror::Error;

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File is not valid UTF-8 text: {path}")]
    InvalidText { path: PathBuf },

    #[error("CSV parsing error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Unterminated quoted field in '{path}' starting on line {line}")]
    UnterminatedQuote { path: PathBuf, line: usize },

    #[error("Invalid delimiter {0:?}: must be a single ASCII character other than a quote or line break")]
    InvalidDelimiter(char),
}

impl LoaderError {
    /// True for malformed input, false for plain I/O failures.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            LoaderError::InvalidText { .. }
                | LoaderError::Csv { .. }
                | LoaderError::UnterminatedQuote { .. }
        )
    }

    fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::InvalidData {
            LoaderError::InvalidText {
                path: path.to_path_buf(),
            }
        } else {
            LoaderError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// A single parsed line of a delimited file.
pub type Row = Vec<String>;

/// Convert a field delimiter to the byte the CSV reader and writer expect.
pub fn delimiter_byte(delimiter: char) -> Result<u8> {
    match delimiter {
        '"' | '\n' | '\r' => Err(LoaderError::InvalidDelimiter(delimiter)),
        c if c.is_ascii() => Ok(c as u8),
        c => Err(LoaderError::InvalidDelimiter(c)),
    }
}

/// List the files directly inside `dir` whose name ends in `.{extension}`.
///
/// Matching is case-sensitive and hidden files (leading `.`) are skipped,
/// like a shell `*.ext` pattern. Subdirectories are never descended into.
/// Results are sorted by path so callers get a deterministic order.
pub fn list_inputs(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| LoaderError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LoaderError::io(dir, e))?;
        let path = entry.path();

        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| !name.starts_with('.'))
            .unwrap_or(false)
            && path.extension().map(|ext| ext == extension).unwrap_or(false);

        if matches && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    debug!("Found {} *.{} files in {}", files.len(), extension, dir.display());
    Ok(files)
}

/// Read a whole file as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| LoaderError::io(path, e))?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());

    String::from_utf8(bytes).map_err(|_| LoaderError::InvalidText {
        path: path.to_path_buf(),
    })
}

/// Read every row of a delimited file.
///
/// No header handling is applied: the first line comes back as an ordinary
/// row. Rows may have differing field counts. A blank line comes back as an
/// empty row.
///
/// # Errors
///
/// Returns `UnterminatedQuote` if a quoted field is still open at end of
/// file, `Csv` for other malformed input, and `Io` if the file cannot be read.
pub fn read_delimited(path: &Path, delimiter: u8) -> Result<Vec<Row>> {
    let bytes = fs::read(path).map_err(|e| LoaderError::io(path, e))?;

    let chunks = split_records(&bytes, delimiter).map_err(|line| LoaderError::UnterminatedQuote {
        path: path.to_path_buf(),
        line,
    })?;

    // The reader skips blank lines, so it yields one record per non-blank chunk.
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes.as_slice());
    let mut records = reader.records();

    let mut rows = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        if chunk.is_empty() {
            rows.push(Row::new());
            continue;
        }
        let Some(result) = records.next() else {
            break;
        };
        let record = result.map_err(|e| LoaderError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    debug!("Parsed {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Read a file line by line, keeping each line's trailing `\n`.
///
/// No newline translation is done; a `\r` before the `\n` stays in the line.
/// The last line has no terminator if the file does not end with one.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| LoaderError::io(path, e))?;
    let mut reader = BufReader::new(file);

    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        let n = reader
            .read_line(&mut line)
            .map_err(|e| LoaderError::io(path, e))?;
        if n == 0 {
            break;
        }
        lines.push(line);
    }

    debug!("Read {} lines from {}", lines.len(), path.display());
    Ok(lines)
}

/// Split raw delimited bytes into records, honouring quoted fields.
///
/// Each slice excludes its terminator (`\n`, `\r\n` or a lone `\r`), so a
/// blank line is an empty slice. A quote only opens a field when it is the
/// first byte of that field, and a doubled quote inside a quoted field is an
/// escape. If a quoted field is still open at end of input, returns the
/// 1-based line on which it started.
fn split_records(bytes: &[u8], delimiter: u8) -> std::result::Result<Vec<&[u8]>, usize> {
    let mut records = Vec::new();
    let mut line = 1;
    let mut start = 0;
    let mut field_start = true;
    let mut open_since: Option<usize> = None;

    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if open_since.is_some() {
            if b == b'"' {
                if bytes.get(i + 1) == Some(&b'"') {
                    i += 1;
                } else {
                    open_since = None;
                }
            } else if b == b'\n' {
                line += 1;
            }
        } else if b == b'"' && field_start {
            open_since = Some(line);
            field_start = false;
        } else if b == b'\n' || b == b'\r' {
            records.push(&bytes[start..i]);
            if b == b'\r' && bytes.get(i + 1) == Some(&b'\n') {
                i += 1;
            }
            if bytes[i] == b'\n' {
                line += 1;
            }
            start = i + 1;
            field_start = true;
        } else {
            field_start = b == delimiter;
        }
        i += 1;
    }

    if let Some(line) = open_since {
        return Err(line);
    }
    if start < bytes.len() {
        records.push(&bytes[start..]);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_list_inputs_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        for name in ["b.txt", "a.txt", "c.csv", ".hidden.txt", "upper.TXT", "notes.txt.bak"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::create_dir(dir.path().join("folder.txt")).unwrap();

        let files = list_inputs(dir.path(), "txt").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_list_inputs_missing_dir() {
        let dir = tempdir().unwrap();
        let result = list_inputs(&dir.path().join("nope"), "txt");
        assert!(matches!(result, Err(LoaderError::Io { .. })));
    }

    #[test]
    fn test_read_text_rejects_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0x66, 0x6f, 0xff, 0xfe]).unwrap();
        file.flush().unwrap();

        let err = read_text(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::InvalidText { .. }));
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_read_delimited_quoting() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "id,val\n1,\"a, b\"\n2,\"multi\nline\"\n3,\"say \"\"hi\"\"\"\n").unwrap();
        file.flush().unwrap();

        let rows = read_delimited(file.path(), b',').unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], vec!["id", "val"]);
        assert_eq!(rows[1], vec!["1", "a, b"]);
        assert_eq!(rows[2], vec!["2", "multi\nline"]);
        assert_eq!(rows[3], vec!["3", "say \"hi\""]);
    }

    #[test]
    fn test_read_delimited_custom_delimiter_and_ragged_rows() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "a;b;c").unwrap();
        writeln!(file, "1;2").unwrap();
        file.flush().unwrap();

        let rows = read_delimited(file.path(), b';').unwrap();
        assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["1", "2"]]);
    }

    #[test]
    fn test_read_delimited_unterminated_quote() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "id,val\n1,ok\n2,\"never closed\n3,x\n").unwrap();
        file.flush().unwrap();

        match read_delimited(file.path(), b',') {
            Err(LoaderError::UnterminatedQuote { line, .. }) => assert_eq!(line, 3),
            other => panic!("Expected UnterminatedQuote, got {:?}", other),
        }
    }

    #[test]
    fn test_read_delimited_keeps_blank_lines() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "id,val\n\n1,a\r\n\r\n2,\"x\n\ny\"\n").unwrap();
        file.flush().unwrap();

        let rows = read_delimited(file.path(), b',').unwrap();
        let expected: Vec<Row> = vec![
            vec!["id".into(), "val".into()],
            vec![],
            vec!["1".into(), "a".into()],
            vec![],
            vec!["2".into(), "x\n\ny".into()],
        ];
        assert_eq!(rows, expected);
    }

    #[test]
    fn test_split_records() {
        let records = split_records(b"a,b\"c\n\nd\re", b',').unwrap();
        assert_eq!(records, vec![&b"a,b\"c"[..], b"", b"d", b"e"]);

        assert_eq!(split_records(b"\"a\"\"\n", b','), Err(1));
        assert_eq!(split_records(b"x\n\"a\nb\"\n", b',').unwrap().len(), 2);
    }

    #[test]
    fn test_read_lines_keeps_terminators() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "1\tA\r\n2\tB\n3\tC").unwrap();
        file.flush().unwrap();

        let lines = read_lines(file.path()).unwrap();
        assert_eq!(lines, vec!["1\tA\r\n", "2\tB\n", "3\tC"]);
    }

    #[test]
    fn test_delimiter_byte() {
        assert_eq!(delimiter_byte(',').unwrap(), b',');
        assert_eq!(delimiter_byte('\t').unwrap(), b'\t');
        assert!(matches!(delimiter_byte('é'), Err(LoaderError::InvalidDelimiter('é'))));
        assert!(delimiter_byte('"').is_err());
    }
}
