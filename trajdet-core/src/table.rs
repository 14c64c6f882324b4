//! Comma-separated results tables
//!
//! A [`TableSink`] takes exactly one header row followed by data rows. Fields
//! are never quoted, so text containing a delimiter or line break is refused
//! instead of being written ambiguously.

use crate::error::DetectorError;
use crate::format::{format_real, parse_real};
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// One cell of a results row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    Text(&'a str),
    Real(f64),
    Integer(u64),
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Text(text) => f.write_str(text),
            Field::Real(value) => f.write_str(&format_real(*value)),
            Field::Integer(value) => write!(f, "{}", value),
        }
    }
}

impl<'a> From<&'a str> for Field<'a> {
    fn from(text: &'a str) -> Self {
        Field::Text(text)
    }
}

impl From<f64> for Field<'_> {
    fn from(value: f64) -> Self {
        Field::Real(value)
    }
}

impl From<u64> for Field<'_> {
    fn from(value: u64) -> Self {
        Field::Integer(value)
    }
}

/// Row-oriented CSV writer
pub struct TableSink<W: Write> {
    out: W,
    columns: Option<usize>,
    rows: usize,
}

impl TableSink<BufWriter<File>> {
    /// Create (or truncate) the file at `path`
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(TableSink::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> TableSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            columns: None,
            rows: 0,
        }
    }

    /// Write the header row. Must be called once, before any data row.
    pub fn write_header(&mut self, names: &[&str]) -> io::Result<()> {
        if self.columns.is_some() {
            return Err(invalid_input("header already written"));
        }
        if names.is_empty() {
            return Err(invalid_input("header must have at least one column"));
        }
        let fields: Vec<Field<'_>> = names.iter().map(|name| Field::Text(*name)).collect();
        self.write_fields(&fields)?;
        self.columns = Some(names.len());
        Ok(())
    }

    /// Write one data row with as many fields as the header has columns
    pub fn write_row(&mut self, fields: &[Field<'_>]) -> io::Result<()> {
        let columns = self
            .columns
            .ok_or_else(|| invalid_input("header must be written before rows"))?;
        if fields.len() != columns {
            return Err(invalid_input(&format!(
                "row has {} fields, header has {} columns",
                fields.len(),
                columns
            )));
        }
        self.write_fields(fields)?;
        self.rows += 1;
        Ok(())
    }

    /// Data rows written so far (the header is not counted)
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Flush and release the underlying writer.
    ///
    /// Dropping the sink also releases it, but only `close` reports a failed
    /// final flush.
    pub fn close(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_fields(&mut self, fields: &[Field<'_>]) -> io::Result<()> {
        let mut line = String::new();
        for (i, field) in fields.iter().enumerate() {
            if let Field::Text(text) = field {
                if text.contains(|c: char| c == ',' || c == '\n' || c == '\r') {
                    return Err(invalid_input(&format!(
                        "field '{}' contains a delimiter",
                        text.escape_debug()
                    )));
                }
            }
            if i > 0 {
                line.push(',');
            }
            line.push_str(&field.to_string());
        }
        line.push('\n');
        self.out.write_all(line.as_bytes())
    }
}

fn invalid_input(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message.to_string())
}

/// A results table read back from disk
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Read a table written by [`TableSink`]
    pub fn read(path: &Path) -> Result<Self, DetectorError> {
        let file = File::open(path).map_err(|e| DetectorError::io(path, e))?;
        Table::from_reader(BufReader::new(file), path)
    }

    /// Parse a table; `origin` is only used in error messages
    pub fn from_reader<R: BufRead>(reader: R, origin: &Path) -> Result<Self, DetectorError> {
        let mut header: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| DetectorError::io(origin, e))?;
            if line.is_empty() {
                continue;
            }
            let fields: Vec<String> = line.split(',').map(|s| s.trim().to_string()).collect();

            match header.as_ref().map(Vec::len) {
                None => header = Some(fields),
                Some(expected) => {
                    if fields.len() != expected {
                        return Err(DetectorError::Parse {
                            path: origin.to_path_buf(),
                            line: idx + 1,
                            message: format!(
                                "expected {} fields, found {}",
                                expected,
                                fields.len()
                            ),
                        });
                    }
                    rows.push(fields);
                }
            }
        }

        let header = header.ok_or_else(|| DetectorError::Parse {
            path: origin.to_path_buf(),
            line: 0,
            message: "empty table".to_string(),
        })?;

        Ok(Table { header, rows })
    }

    /// Column `column` parsed as reals
    pub fn real_column(&self, column: usize) -> Option<Vec<f64>> {
        self.rows
            .iter()
            .map(|row| row.get(column).and_then(|cell| parse_real(cell)))
            .collect()
    }

    /// Column `column` parsed as unsigned integers
    pub fn integer_column(&self, column: usize) -> Option<Vec<u64>> {
        self.rows
            .iter()
            .map(|row| row.get(column).and_then(|cell| cell.parse().ok()))
            .collect()
    }
}
