//! The ndarray-tables crate provides table lookup and interpolation
//! for tabulated data stored in an [`ndarray::Array2`].
//!
//! Three kinds of tables are available:
//!  - [`Interp1D`] interpolates the columns of a table along its first column
//!  - [`Interp2D`] interpolates a grid stored with its coordinates in the
//!    first row and first column
//!  - [`TimeTable`] interpolates along a time column and reports time events
//!    at discontinuities, table ends and period boundaries
//!
//! Tables are created with builders and can be read from memory, from text
//! files, CSV files, MAT-files or from a user supplied [`io::TableProvider`].
//! The [`Smoothness`] selects constant, linear or Akima interpolation, the
//! [`Extrapolation`] decides what happens outside of the table.
//!
//! ```rust
//! # use ndarray_tables::*;
//! # use ndarray::*;
//! let table = array![
//!     [0.0, 0.0],
//!     [1.0, 2.0],
//!     [2.0, 3.0],
//! ];
//! let interpolator = Interp1DBuilder::new(table.view())
//!     .columns(&[2])
//!     .build()
//!     .unwrap();
//! assert_eq!(interpolator.value(1, 0.5).unwrap(), 1.0);
//! ```
use thiserror::Error;

pub mod interp1d;
pub mod interp2d;
pub mod io;
mod matrix;
pub mod time_table;
pub mod vector_extensions;

pub use interp1d::{Interp1D, Interp1DBuilder};
pub use interp2d::{Interp2D, Interp2DBuilder};
pub use matrix::{transpose_in_place, TableMatrix, TableSource};
pub use time_table::{TimeTable, TimeTableBuilder, NO_EVENT};

/// Errors raised while creating or re-reading a table
#[derive(Debug, Error)]
pub enum BuilderError {
    /// Not enough memory for the table or its spline coefficients
    #[error("not enough memory: {0}")]
    Allocation(String),
    /// The table does not have the dimensions required by its kind
    #[error("{0}")]
    ShapeError(String),
    /// The coordinates of the table are not (strictly) increasing
    #[error("{0}")]
    Monotonic(String),
    /// A periodic table with a period that is not positive
    #[error("{0}")]
    InvalidPeriod(String),
    /// A selected column does not exist in the table
    #[error("{0}")]
    ColumnOutOfRange(String),
    #[error("The file name for a table (= \"{0}\") is defined, but not the corresponding table name.")]
    FileWithoutTable(String),
    #[error("No table data is given for table \"{0}\".")]
    MissingTableData(String),
    #[error("Table \"{0}\" is requested from a provider, but no provider is given.")]
    MissingProvider(String),
    /// The provider could not deliver the table
    #[error("{0}")]
    Provider(String),
    #[error("Extrapolation {extrapolation:?} is not supported for {kind} tables.")]
    UnsupportedExtrapolation {
        extrapolation: Extrapolation,
        kind: &'static str,
    },
    #[error("Unknown smoothness kind {0}.")]
    UnknownSmoothness(i32),
    #[error("Unknown extrapolation kind {0}.")]
    UnknownExtrapolation(i32),
    #[error(transparent)]
    File(#[from] FileError),
}

/// Errors raised while reading or writing table files
#[derive(Debug, Error)]
pub enum FileError {
    #[error("Not possible to open file \"{file}\": {source}")]
    Open {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Error reading file \"{file}\": {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Error reading first line of file \"{0}\": End-Of-File reached.")]
    EmptyFile(String),
    #[error(
        "Error reading format and version information in first line of file \"{file}\": \
         \"#1\" expected, but \"{found}\" found."
    )]
    MissingHeader { file: String, found: String },
    #[error("Table matrix \"{table}\" not found on file \"{file}\".")]
    TableNotFound { table: String, file: String },
    #[error(
        "End-of-file reached when reading numeric data of matrix \"{table}({rows},{cols})\" \
         from file \"{file}\""
    )]
    UnexpectedEof {
        table: String,
        rows: usize,
        cols: usize,
        file: String,
    },
    #[error(
        "Error in line {line} when reading numeric data of matrix \"{table}({rows},{cols})\" \
         from file \"{file}\""
    )]
    Parse {
        line: usize,
        table: String,
        rows: usize,
        cols: usize,
        file: String,
    },
    #[error("Table array \"{table}\" has not the required rank 2.")]
    Rank { table: String },
    #[error("Table array \"{table}\" has not the required double precision class.")]
    NotDouble { table: String },
    #[error("Table array \"{table}\" must not be complex.")]
    Complex { table: String },
    #[error("Cannot read {requested} {axis} of array \"{table}({rows},{cols})\" from file \"{file}\"")]
    DimensionMismatch {
        requested: usize,
        axis: &'static str,
        table: String,
        rows: usize,
        cols: usize,
        file: String,
    },
    #[error("File \"{file}\" is not a valid MAT-file: {reason}")]
    InvalidMatFile { file: String, reason: String },
    #[error("File \"{0}\" does not have the \".mat\" extension")]
    NotMatFile(String),
    #[error("Invalid version \"{0}\" for MAT-file, expected \"4\", \"6\" or \"7\"")]
    InvalidVersion(String),
    #[error("Not enough memory for matrix \"{table}({rows},{cols})\" of file \"{file}\"")]
    Allocation {
        table: String,
        rows: usize,
        cols: usize,
        file: String,
    },
}

/// Errors raised while querying a table
#[derive(Debug, Error)]
pub enum InterpolateError {
    /// The query lies outside of the table and extrapolation is switched off
    #[error("{0}")]
    OutOfBounds(String),
    /// The 1-based column index is 0 or beyond the selected columns
    #[error("The column index {column} is not in the range 1..={count} of the selected columns.")]
    UnknownColumn { column: usize, count: usize },
}

/// How the table values are connected between the nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Smoothness {
    /// Linear interpolation between neighbouring nodes
    #[default]
    LinearSegments = 1,
    /// Akima spline, continuous first derivative
    ContinuousDerivative = 2,
    /// Piecewise constant, the value of the left node
    ConstantSegments = 3,
}

impl TryFrom<i32> for Smoothness {
    type Error = BuilderError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Smoothness::LinearSegments),
            2 => Ok(Smoothness::ContinuousDerivative),
            3 => Ok(Smoothness::ConstantSegments),
            _ => Err(BuilderError::UnknownSmoothness(code)),
        }
    }
}

/// What happens outside of the table definition range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extrapolation {
    /// Keep the value of the first or last node
    HoldLastPoint = 1,
    /// Continue with the slope at the table boundary
    LastTwoPoints = 2,
    /// Repeat the table periodically (time tables only)
    Periodic = 3,
    /// Queries outside of the table are an error
    NoExtrapolation = 4,
}

impl TryFrom<i32> for Extrapolation {
    type Error = BuilderError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Extrapolation::HoldLastPoint),
            2 => Ok(Extrapolation::LastTwoPoints),
            3 => Ok(Extrapolation::Periodic),
            4 => Ok(Extrapolation::NoExtrapolation),
            _ => Err(BuilderError::UnknownExtrapolation(code)),
        }
    }
}

/// Position of a query relative to the table definition range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    Left,
    InTable,
    Right,
}
