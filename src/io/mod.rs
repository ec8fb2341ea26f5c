//! Loading of table matrices
//!
//! A table is either given in memory, read from a file or requested from a
//! [`TableProvider`]. Which of these applies follows from the table and file
//! names, see [`table_source`].
//!
//! # File formats
//!  - text files, see [`text`]
//!  - CSV files (extension `.csv`), see [`csv`]
//!  - MATLAB MAT-files (extension `.mat`), see [`mat`]
use std::{borrow::Cow, fmt::Debug, path::Path};

use log::info;
use ndarray::{Array2, ArrayView2, CowArray};

use crate::{
    matrix::{transpose_in_place, TableMatrix},
    BuilderError, FileError, TableSource,
};

pub mod csv;
pub mod mat;
pub mod text;

pub use csv::CsvOptions;
pub use mat::{dim_double_array_2d, read_double_array_2d, write_double_array_2d, MatVersion};

/// The kind of table requested from a [`TableProvider`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Time = 0,
    OneDim = 1,
    TwoDim = 2,
}

/// A matrix delivered by a [`TableProvider`]
#[derive(Debug, Clone)]
pub struct ProvidedTable<'p> {
    pub rows: usize,
    pub cols: usize,
    /// `true` when `data` is stored column by column
    pub column_major: bool,
    pub data: Cow<'p, [f64]>,
}

/// A user supplied source of named tables.
///
/// Tables keep a reference to their provider, so it has to be `Sync`
/// for the tables to be `Send`.
pub trait TableProvider: Sync {
    fn provide(
        &self,
        table_name: &str,
        kind: TableKind,
    ) -> Result<ProvidedTable<'_>, Box<dyn std::error::Error + Send + Sync>>;
}

/// `false` for names that mean "not given": empty, only whitespace or `"NoName"`
pub fn is_valid_name(name: &str) -> bool {
    !(name.trim().is_empty() || name == "NoName")
}

/// Decide where the data of a table comes from.
///
/// | table name | file name | source |
/// |---|---|---|
/// | not given | not given | [`TableSource::InMemory`] |
/// | not given | given | error |
/// | given | not given | [`TableSource::Provider`] |
/// | given | given | [`TableSource::File`] |
pub fn table_source(table_name: &str, file_name: &str) -> Result<TableSource, BuilderError> {
    match (is_valid_name(table_name), is_valid_name(file_name)) {
        (false, false) => Ok(TableSource::InMemory),
        (false, true) => Err(BuilderError::FileWithoutTable(file_name.into())),
        (true, false) => Ok(TableSource::Provider),
        (true, true) => Ok(TableSource::File),
    }
}

/// Read the table `table_name` from `file_name`.
/// The format is selected by the file extension.
pub fn read_table_file(
    table_name: &str,
    file_name: &str,
    verbose: bool,
    csv_options: &CsvOptions,
) -> Result<Array2<f64>, FileError> {
    if verbose {
        info!("... loading \"{table_name}\" from \"{file_name}\"");
    }
    let ext = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    if ext.eq_ignore_ascii_case("mat") {
        mat::read_table(table_name, file_name)
    } else if ext.eq_ignore_ascii_case("csv") {
        csv::read_table(table_name, file_name, csv_options)
    } else {
        text::read_table(table_name, file_name)
    }
}

/// Allocate a buffer for `len` values without aborting on failure
pub(crate) fn try_buffer<T>(len: usize) -> Option<Vec<T>> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).ok()?;
    Some(buffer)
}

/// Where and how a table is loaded, shared by all table builders
#[derive(Clone)]
pub(crate) struct TableSpec<'a> {
    pub table_name: String,
    pub file_name: String,
    pub data: Option<ArrayView2<'a, f64>>,
    pub copy: bool,
    pub provider: Option<&'a dyn TableProvider>,
    pub verbose: bool,
    pub csv: CsvOptions,
}

impl Debug for TableSpec<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableSpec")
            .field("table_name", &self.table_name)
            .field("file_name", &self.file_name)
            .field("data", &self.data.map(|data| data.dim()))
            .field("copy", &self.copy)
            .field("provider", &self.provider.is_some())
            .field("verbose", &self.verbose)
            .field("csv", &self.csv)
            .finish()
    }
}

impl<'a> TableSpec<'a> {
    pub fn from_data(data: ArrayView2<'a, f64>) -> Self {
        TableSpec {
            table_name: "NoName".into(),
            file_name: "NoName".into(),
            data: Some(data),
            copy: true,
            provider: None,
            verbose: false,
            csv: CsvOptions::default(),
        }
    }

    pub fn from_file(table_name: &str, file_name: &str) -> Self {
        TableSpec {
            table_name: table_name.into(),
            file_name: file_name.into(),
            data: None,
            copy: true,
            provider: None,
            verbose: false,
            csv: CsvOptions::default(),
        }
    }

    pub fn from_provider(table_name: &str, provider: &'a dyn TableProvider) -> Self {
        TableSpec {
            provider: Some(provider),
            ..TableSpec::from_file(table_name, "NoName")
        }
    }

    /// Name used in messages
    pub fn display_name(&self) -> &str {
        if is_valid_name(&self.table_name) {
            &self.table_name
        } else {
            "NoName"
        }
    }

    pub fn load(&self, kind: TableKind) -> Result<TableMatrix<'a>, BuilderError> {
        match table_source(&self.table_name, &self.file_name)? {
            TableSource::File => {
                let data =
                    read_table_file(&self.table_name, &self.file_name, self.verbose, &self.csv)?;
                Ok(TableMatrix::new(data.into(), TableSource::File))
            }
            TableSource::Provider => {
                let provider = self
                    .provider
                    .ok_or_else(|| BuilderError::MissingProvider(self.table_name.clone()))?;
                let table = provider
                    .provide(&self.table_name, kind)
                    .map_err(|err| BuilderError::Provider(err.to_string()))?;
                provided_matrix(&self.table_name, table)
            }
            _ => {
                let data = self
                    .data
                    .ok_or_else(|| BuilderError::MissingTableData(self.display_name().into()))?;
                let data = if self.copy {
                    let mut buffer = try_buffer(data.len()).ok_or_else(|| {
                        BuilderError::Allocation(format!(
                            "copy of table \"{}({},{})\"",
                            self.display_name(),
                            data.nrows(),
                            data.ncols()
                        ))
                    })?;
                    buffer.extend(data.iter().copied());
                    let owned = Array2::from_shape_vec(data.raw_dim(), buffer)
                        .map_err(|err| BuilderError::ShapeError(err.to_string()))?;
                    CowArray::from(owned)
                } else {
                    CowArray::from(data)
                };
                Ok(TableMatrix::new(data, TableSource::InMemory))
            }
        }
    }
}

fn provided_matrix<'p>(
    table_name: &str,
    table: ProvidedTable<'p>,
) -> Result<TableMatrix<'p>, BuilderError> {
    let ProvidedTable {
        rows,
        cols,
        column_major,
        data,
    } = table;
    if data.len() != rows * cols {
        return Err(BuilderError::ShapeError(format!(
            "Table matrix \"{table_name}({rows},{cols})\" of the provider has {} values.",
            data.len()
        )));
    }
    let shape_err = |err: ndarray::ShapeError| BuilderError::ShapeError(err.to_string());
    if column_major {
        let mut data = data.into_owned();
        transpose_in_place(&mut data, cols, rows);
        let data = Array2::from_shape_vec((rows, cols), data).map_err(shape_err)?;
        return Ok(TableMatrix::new(data.into(), TableSource::ProviderTransposed));
    }
    let data = match data {
        Cow::Borrowed(slice) => {
            CowArray::from(ArrayView2::from_shape((rows, cols), slice).map_err(shape_err)?)
        }
        Cow::Owned(vec) => CowArray::from(Array2::from_shape_vec((rows, cols), vec).map_err(shape_err)?),
    };
    Ok(TableMatrix::new(data, TableSource::Provider))
}
