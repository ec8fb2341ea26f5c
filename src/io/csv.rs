//! Delimited numeric files
//!
//! Every non-empty line after the header lines is one row of the table.
//! All rows need the same number of values.
use std::fs;

use ndarray::Array2;

use crate::FileError;

use super::try_buffer;

/// Options for reading `.csv` tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Column separator
    pub delimiter: char,
    /// Number of lines at the start of the file that are skipped
    pub header_lines: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: ',',
            header_lines: 0,
        }
    }
}

/// Read the whole file `file_name` as one matrix, `table_name` is only used in messages
pub fn read_table(
    table_name: &str,
    file_name: &str,
    options: &CsvOptions,
) -> Result<Array2<f64>, FileError> {
    let content = fs::read_to_string(file_name).map_err(|source| FileError::Open {
        file: file_name.into(),
        source,
    })?;
    parse_table(&content, table_name, file_name, options)
}

pub fn parse_table(
    content: &str,
    table_name: &str,
    file_name: &str,
    options: &CsvOptions,
) -> Result<Array2<f64>, FileError> {
    let mut values = try_buffer::<f64>(content.len() / 2).ok_or_else(|| FileError::Allocation {
        table: table_name.into(),
        rows: 0,
        cols: 0,
        file: file_name.into(),
    })?;
    let mut rows = 0;
    let mut cols = None;

    for (line_nr, line) in content.lines().enumerate().skip(options.header_lines) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let start = values.len();
        for field in line.split(options.delimiter) {
            let value = field.trim().parse::<f64>().map_err(|_| FileError::Parse {
                line: line_nr + 1,
                table: table_name.into(),
                rows,
                cols: cols.unwrap_or(0),
                file: file_name.into(),
            })?;
            values.push(value);
        }
        let width = values.len() - start;
        if *cols.get_or_insert(width) != width {
            return Err(FileError::Parse {
                line: line_nr + 1,
                table: table_name.into(),
                rows,
                cols: cols.unwrap_or(0),
                file: file_name.into(),
            });
        }
        rows += 1;
    }

    let Some(cols) = cols else {
        return Err(FileError::TableNotFound {
            table: table_name.into(),
            file: file_name.into(),
        });
    };
    Array2::from_shape_vec((rows, cols), values).map_err(|_| FileError::Allocation {
        table: table_name.into(),
        rows,
        cols,
        file: file_name.into(),
    })
}
