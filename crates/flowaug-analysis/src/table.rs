//! In-memory flow-record tables backed by CSV files
//!
//! A [`FlowTable`] keeps every cell as the text it was read with, so input
//! columns are written back unchanged. Numeric access goes through
//! [`FlowTable::numeric_column`], which parses on demand and maps empty or
//! unparseable cells to `NaN`.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//!
//! use flowaug_analysis::table::FlowTable;
//!
//! let csv = "Rate,Protocol\n10.5,TCP\n,UDP\n";
//! let table = FlowTable::from_reader(csv.as_bytes(), None, Path::new("inline.csv")).unwrap();
//!
//! assert_eq!(table.len(), 2);
//! let rate = table.numeric_column("Rate").unwrap();
//! assert_eq!(rate[0], 10.5);
//! assert!(rate[1].is_nan());
//! assert!(table.numeric_column("Tot size").is_none());
//! ```

use std::{
    fs::File,
    io,
    ops::Range,
    path::{Path, PathBuf},
};

/// Errors raised while reading or writing a [`FlowTable`]
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TableError {
    #[display("failed to open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[display("malformed CSV in {}: {source}", path.display())]
    Parse { path: PathBuf, source: csv::Error },
    #[display("no header row in {}", path.display())]
    MissingHeader { path: PathBuf },
    #[display(
        "line {line} of {} has {fields} fields but the header has {columns}",
        path.display()
    )]
    RowTooLong {
        path: PathBuf,
        line: u64,
        fields: usize,
        columns: usize,
    },
    #[display("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: csv::Error },
}

/// Ordered rows of text cells under a shared header
///
/// Every row has exactly as many cells as there are headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl FlowTable {
    /// Create an empty table with the given header
    #[must_use]
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: vec![],
        }
    }

    /// Read the whole CSV file at `path`
    pub fn read(path: &Path) -> Result<Self, TableError> {
        Self::read_prefix(path, None)
    }

    /// Read the header and at most `max_rows` data rows from `path`
    ///
    /// `None` reads every row.
    pub fn read_prefix(path: &Path, max_rows: Option<usize>) -> Result<Self, TableError> {
        let file = File::open(path).map_err(|source| TableError::Open {
            path: path.to_owned(),
            source,
        })?;
        Self::from_reader(io::BufReader::new(file), max_rows, path)
    }

    /// Parse CSV data from any reader
    ///
    /// `origin` only labels errors. Rows shorter than the header are padded with
    /// empty cells; rows longer than the header are rejected.
    pub fn from_reader<R>(
        reader: R,
        max_rows: Option<usize>,
        origin: &Path,
    ) -> Result<Self, TableError>
    where
        R: io::Read,
    {
        let parse_error = |source| TableError::Parse {
            path: origin.to_owned(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let headers = reader
            .headers()
            .map_err(parse_error)?
            .iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        if headers.is_empty() {
            return Err(TableError::MissingHeader {
                path: origin.to_owned(),
            });
        }

        let mut table = Self::new(headers);
        for record in reader.records().take(max_rows.unwrap_or(usize::MAX)) {
            let record = record.map_err(parse_error)?;
            if record.len() > table.headers.len() {
                return Err(TableError::RowTooLong {
                    path: origin.to_owned(),
                    line: record.position().map_or(0, csv::Position::line),
                    fields: record.len(),
                    columns: table.headers.len(),
                });
            }
            table.push_row(record.iter().map(str::to_owned).collect());
        }
        Ok(table)
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Parse a column as `f64`, or `None` if the column does not exist
    #[must_use]
    pub fn numeric_column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| parse_numeric(&row[idx])).collect())
    }

    /// Append a row, padding it with empty cells up to the header width
    pub fn push_row(&mut self, mut row: Vec<String>) {
        debug_assert!(row.len() <= self.headers.len());
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Append the rows of `other`, matching cells to this table's columns by name
    ///
    /// Columns missing from `other` become empty cells; columns only `other` has are dropped.
    pub fn extend_by_name(&mut self, other: &FlowTable) {
        let mapping = self
            .headers
            .iter()
            .map(|h| other.column_index(h))
            .collect::<Vec<_>>();
        for row in &other.rows {
            let cells = mapping
                .iter()
                .map(|idx| idx.map(|i| row[i].clone()).unwrap_or_default())
                .collect();
            self.rows.push(cells);
        }
    }

    /// Set a numeric column, replacing it in place if it already exists
    pub fn set_numeric_column(&mut self, name: &str, values: &[f64]) {
        debug_assert_eq!(values.len(), self.rows.len());
        let idx = self.column_index(name).unwrap_or_else(|| {
            self.headers.push(name.to_owned());
            for row in &mut self.rows {
                row.push(String::new());
            }
            self.headers.len() - 1
        });
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = format_numeric(*value);
        }
    }

    /// Write the header and the rows in `range` as CSV
    pub fn write_rows<W>(&self, writer: W, range: Range<usize>) -> Result<(), csv::Error>
    where
        W: io::Write,
    {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows[range] {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Create (or truncate) `path` and write the rows in `range` to it
    pub fn write_csv(&self, path: &Path, range: Range<usize>) -> Result<(), TableError> {
        let write_error = |source| TableError::Write {
            path: path.to_owned(),
            source,
        };
        let file = File::create(path).map_err(|e| write_error(e.into()))?;
        self.write_rows(io::BufWriter::new(file), range)
            .map_err(write_error)
    }
}

/// Parse a cell the way a numeric column reads it
///
/// Surrounding whitespace is ignored; anything unparseable is `NaN`.
#[must_use]
pub fn parse_numeric(cell: &str) -> f64 {
    cell.trim().parse().unwrap_or(f64::NAN)
}

/// Format a derived value for output
///
/// `NaN` becomes an empty cell. Finite values always carry a decimal point or exponent.
#[must_use]
pub fn format_numeric(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else if value == f64::INFINITY {
        "inf".to_owned()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_owned()
    } else {
        format!("{value:?}")
    }
}
