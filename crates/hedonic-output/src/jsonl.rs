//! JSON-lines dataset sink and reader.

use crate::export::ExportError;
use hedonic_dataset::TrainingRecord;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Writes one compact JSON document per line.
#[derive(Debug)]
pub struct JsonLinesWriter<W: Write> {
    inner: W,
    count: usize,
}

impl JsonLinesWriter<BufWriter<File>> {
    /// Create (or truncate) `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self, ExportError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> JsonLinesWriter<W> {
    /// Wrap a writer.
    pub const fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    /// Append one document.
    ///
    /// # Errors
    ///
    /// Fails if serialization or the underlying write fails.
    pub fn write<T: Serialize>(&mut self, value: &T) -> Result<(), ExportError> {
        serde_json::to_writer(&mut self.inner, value)?;
        self.inner.write_all(b"\n")?;
        self.count += 1;
        Ok(())
    }

    /// Documents written so far.
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Flush and return the underlying writer.
    ///
    /// # Errors
    ///
    /// Fails if the final flush fails.
    pub fn finish(mut self) -> Result<W, ExportError> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Parse one document per non-blank line.
///
/// # Errors
///
/// Returns [`ExportError::InvalidLine`] for the first line that does not
/// parse, or [`ExportError::Io`] on a read failure.
pub fn parse_json_lines<T, R>(reader: R) -> Result<Vec<T>, ExportError>
where
    T: DeserializeOwned,
    R: BufRead,
{
    let mut out = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value = serde_json::from_str(&line).map_err(|source| ExportError::InvalidLine {
            line: i + 1,
            source,
        })?;
        out.push(value);
    }
    Ok(out)
}

/// Load a dataset previously written as JSON lines.
///
/// # Errors
///
/// Fails if the file cannot be opened or a line is not a training record.
pub fn read_json_lines(path: &Path) -> Result<Vec<TrainingRecord>, ExportError> {
    let file = File::open(path)?;
    parse_json_lines(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Cursor;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_writer_one_document_per_line() {
        let mut writer = JsonLinesWriter::new(Vec::new());
        writer.write(&Point { x: 1, y: 2 }).unwrap();
        writer.write(&Point { x: 3, y: 4 }).unwrap();
        assert_eq!(writer.count(), 2);

        let bytes = writer.finish().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "{\"x\":1,\"y\":2}\n{\"x\":3,\"y\":4}\n");
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let input = "{\"x\":1,\"y\":2}\n\n   \n{\"x\":3,\"y\":4}\n";
        let points: Vec<Point> = parse_json_lines(Cursor::new(input)).unwrap();
        assert_eq!(points, vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }]);
    }

    #[test]
    fn test_parse_reports_line_number() {
        let input = "{\"x\":1,\"y\":2}\nnot json\n";
        let err = parse_json_lines::<Point, _>(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, ExportError::InvalidLine { line: 2, .. }));
    }

    #[test]
    fn test_read_missing_file() {
        let path = std::env::temp_dir().join("hedonic_jsonl_missing_does_not_exist.jsonl");
        assert!(matches!(read_json_lines(&path), Err(ExportError::Io(_))));
    }
}
