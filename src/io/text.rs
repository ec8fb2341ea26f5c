//! Text table files
//!
//! ```text
//! #1
//! double tab1(3,2)   # comment
//!   0   0
//!   1   2.5
//!   2   3      # trailing comment
//! ```
//!
//! The first non-blank line starts with `#1`. A matrix starts with a
//! `double name(rows,cols)` or `float name(rows,cols)` header followed by
//! `rows * cols` numbers in row-major order. Numbers are separated by
//! spaces, tabs, commas or semicolons and may span several lines. Empty
//! lines and everything after a `#` are ignored.
use std::fs;

use ndarray::Array2;

use crate::FileError;

use super::try_buffer;

const DELIM_HEADER: &[char] = &[' ', '\t', '(', ',', ')'];
const DELIM_NUMBER: &[char] = &[' ', '\t', ',', ';'];

/// Read the matrix `table_name` from the text file `file_name`
pub fn read_table(table_name: &str, file_name: &str) -> Result<Array2<f64>, FileError> {
    let bytes = fs::read(file_name).map_err(|source| FileError::Open {
        file: file_name.into(),
        source,
    })?;
    parse_table(&String::from_utf8_lossy(&bytes), table_name, file_name)
}

/// Parse the matrix `table_name` from the content of a text table file,
/// `file_name` is only used in messages
pub fn parse_table(
    content: &str,
    table_name: &str,
    file_name: &str,
) -> Result<Array2<f64>, FileError> {
    let mut lines = content
        .lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .enumerate()
        .map(|(nr, line)| (nr + 1, line))
        .skip_while(|(_, line)| line.trim().is_empty());

    let (_, first) = lines
        .next()
        .ok_or_else(|| FileError::EmptyFile(file_name.into()))?;
    if !first.starts_with("#1") {
        return Err(FileError::MissingHeader {
            file: file_name.into(),
            found: first.chars().take(2).collect(),
        });
    }

    let (rows, cols) = loop {
        let Some((_, line)) = lines.next() else {
            return Err(FileError::TableNotFound {
                table: table_name.into(),
                file: file_name.into(),
            });
        };
        if let Some(dim) = parse_header(line, table_name) {
            break dim;
        }
    };

    let len = rows.checked_mul(cols).and_then(try_buffer::<f64>);
    let mut values = len.ok_or_else(|| FileError::Allocation {
        table: table_name.into(),
        rows,
        cols,
        file: file_name.into(),
    })?;
    let parse_err = |line: usize| FileError::Parse {
        line,
        table: table_name.into(),
        rows,
        cols,
        file: file_name.into(),
    };

    let total = rows * cols;
    while values.len() < total {
        let Some((line_nr, line)) = lines.next() else {
            return Err(FileError::UnexpectedEof {
                table: table_name.into(),
                rows,
                cols,
                file: file_name.into(),
            });
        };
        let line = line.trim_start_matches([' ', '\t']);
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        for token in line.split(DELIM_NUMBER).filter(|token| !token.is_empty()) {
            if token.starts_with('#') {
                break;
            }
            if values.len() == total {
                // values after the last row of the matrix
                return Err(parse_err(line_nr));
            }
            let value = token.parse::<f64>().map_err(|_| parse_err(line_nr))?;
            values.push(value);
        }
    }

    Array2::from_shape_vec((rows, cols), values).map_err(|_| FileError::Allocation {
        table: table_name.into(),
        rows,
        cols,
        file: file_name.into(),
    })
}

/// The dimensions of a `double|float name(rows,cols)` header of `table_name`
fn parse_header(line: &str, table_name: &str) -> Option<(usize, usize)> {
    let mut tokens = line.split(DELIM_HEADER).filter(|token| !token.is_empty());
    let data_type = tokens.next()?;
    if data_type != "double" && data_type != "float" {
        return None;
    }
    if tokens.next()? != table_name {
        return None;
    }
    let rows = tokens.next()?.parse().ok()?;
    let cols = tokens.next()?.parse().ok()?;
    Some((rows, cols))
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    const FILE: &str = "#1
# comment line
double tab0(2,2)
 0 1
 1 2
double tab1(3,2)   # header comment
  0   0
  1,  2.5    # trailing comment

\t2 ; 3
";

    #[test]
    fn find_table() {
        let tab = parse_table(FILE, "tab1", "test.txt").unwrap();
        assert_eq!(tab, array![[0.0, 0.0], [1.0, 2.5], [2.0, 3.0]]);
        let tab = parse_table(FILE, "tab0", "test.txt").unwrap();
        assert_eq!(tab, array![[0.0, 1.0], [1.0, 2.0]]);
    }

    #[test]
    fn values_across_lines() {
        let content = "#1\nfloat t(2,3)\n1 2\n3 4 5 6\n";
        let tab = parse_table(content, "t", "a.txt").unwrap();
        assert_eq!(tab, array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    }

    #[test]
    fn leading_blank_lines() {
        let content = "\n   \n#1\ndouble t(1,2)\n1e1 -2.5E-1\n";
        let tab = parse_table(content, "t", "a.txt").unwrap();
        assert_eq!(tab, array![[10.0, -0.25]]);
    }

    #[test]
    fn missing_format_line() {
        let err = parse_table("double t(1,2)\n1 2\n", "t", "a.txt").unwrap_err();
        assert!(matches!(err, FileError::MissingHeader { ref found, .. } if found == "do"));
        assert!(err.to_string().contains("\"a.txt\""));
        assert!(matches!(
            parse_table("", "t", "a.txt"),
            Err(FileError::EmptyFile(_))
        ));
    }

    #[test]
    fn table_not_found() {
        let err = parse_table(FILE, "tab2", "test.txt").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Table matrix \"tab2\" not found on file \"test.txt\"."
        );
    }

    #[test]
    fn bad_number() {
        let content = "#1\ndouble t(2,2)\n0 1\n1 2x\n";
        let err = parse_table(content, "t", "a.txt").unwrap_err();
        assert!(matches!(err, FileError::Parse { line: 4, .. }));
        assert_eq!(
            err.to_string(),
            "Error in line 4 when reading numeric data of matrix \"t(2,2)\" from file \"a.txt\""
        );
    }

    #[test]
    fn trailing_values() {
        let content = "#1\ndouble t(2,2)\n0 1\n1 2 3\n";
        let err = parse_table(content, "t", "a.txt").unwrap_err();
        assert!(matches!(err, FileError::Parse { line: 4, .. }));
    }

    #[test]
    fn end_of_file() {
        let content = "#1\ndouble t(2,2)\n0 1\n1\n";
        let err = parse_table(content, "t", "a.txt").unwrap_err();
        assert!(matches!(err, FileError::UnexpectedEof { rows: 2, cols: 2, .. }));
    }

    #[test]
    fn missing_file() {
        let err = read_table("t", "does/not/exist.txt").unwrap_err();
        assert!(matches!(err, FileError::Open { .. }));
    }
}
