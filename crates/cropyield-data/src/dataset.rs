use crate::error::DataError;
use cropyield_core::FieldValue;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A delimited dataset with a fixed header and normalized cells.
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<FieldValue>>,
}

impl Dataset {
    /// Read a CSV file with a header row.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::NotFound(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Read CSV from any reader. Short rows are padded with missing cells,
    /// cells beyond the header width are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        let width = headers.len();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let mut row: Vec<FieldValue> = record
                .iter()
                .take(width)
                .map(FieldValue::from_raw)
                .collect();
            row.resize(width, FieldValue::Missing);
            rows.push(row);
        }

        Ok(Dataset { headers, rows })
    }

    /// Build a dataset from in-memory raw cells.
    pub fn from_raw_rows(headers: &[&str], rows: &[Vec<&str>]) -> Self {
        let width = headers.len();
        let rows = rows
            .iter()
            .map(|r| {
                let mut row: Vec<FieldValue> =
                    r.iter().take(width).map(|c| FieldValue::from_raw(c)).collect();
                row.resize(width, FieldValue::Missing);
                row
            })
            .collect();
        Dataset {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<FieldValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn n_columns(&self) -> usize {
        self.headers.len()
    }

    /// Position of a header; the last one wins if a name repeats.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().rposition(|h| h == name)
    }

    /// Values of one column, top to bottom.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &FieldValue> + '_ {
        self.rows.iter().map(move |r| &r[idx])
    }
}
