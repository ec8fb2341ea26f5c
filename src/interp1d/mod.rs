//! Interpolation of table columns along the first column
//!
//! # Interpolator
//!  - [`Interp1D`] The interpolator for all smoothness and extrapolation kinds
//!  - [`Interp1DBuilder`] Configure the interpolator
//!
//! The first column of the table holds the abscissa values `u`, which need to
//! be strictly increasing. The other columns are interpolated along it.
//! Which of them are used is configured with [`Interp1DBuilder::columns`],
//! queries then select a column by its 1-based position in that list.

use std::cell::Cell;

use log::debug;
use ndarray::{Array1, Array2, ArrayBase, ArrayView2, ArrayViewMut1, Axis, Data, Ix1, Zip};

use crate::{
    io::{CsvOptions, TableKind, TableProvider, TableSpec},
    vector_extensions::VectorExtensions,
    BuilderError, Extrapolation, InterpolateError, Position, Smoothness, TableMatrix, TableSource,
};

pub(crate) mod strategies;
pub(crate) use strategies::Strategy1D;

/// Interpolator for the columns of a table along its first column
///
/// The index of the last interval is memoized, so queries with slowly
/// changing arguments are answered without a search. This makes the
/// interpolator `Send` but not `Sync`.
#[derive(Debug)]
pub struct Interp1D<'a> {
    pub(crate) spec: TableSpec<'a>,
    pub(crate) table: TableMatrix<'a>,
    /// 1-based table columns
    pub(crate) columns: Vec<usize>,
    /// smoothness before a possible reduction for short tables
    pub(crate) requested: Smoothness,
    pub(crate) strategy: Strategy1D,
    pub(crate) extrapolation: Extrapolation,
    pub(crate) kind: TableKind,
    pub(crate) last: Cell<usize>,
}

impl<'a> Interp1D<'a> {
    /// Get the [`Interp1DBuilder`] for an in-memory table
    pub fn builder(table: ArrayView2<'a, f64>) -> Interp1DBuilder<'a> {
        Interp1DBuilder::new(table)
    }

    pub(crate) fn load(
        spec: TableSpec<'a>,
        kind: TableKind,
        columns: Option<Vec<usize>>,
        smoothness: Smoothness,
        extrapolation: Extrapolation,
    ) -> Result<Self, BuilderError> {
        let table = spec.load(kind)?;
        let columns = columns.unwrap_or_else(|| (2..=table.cols()).collect());
        let strategy = prepare(
            &table,
            spec.display_name(),
            kind,
            &columns,
            smoothness,
            extrapolation,
        )?;
        Ok(Interp1D {
            spec,
            table,
            columns,
            requested: smoothness,
            strategy,
            extrapolation,
            kind,
            last: Cell::new(0),
        })
    }

    /// Interpolated value of the selected column `i_col` (1-based) at `u`.
    ///
    /// ```rust
    /// # use ndarray_tables::*;
    /// # use ndarray::*;
    /// let table = array![
    ///     [0.0, 0.0, 1.0],
    ///     [1.0, 2.0, 0.5],
    ///     [2.0, 3.0, 1.0],
    /// ];
    /// let interpolator = Interp1DBuilder::new(table.view()).build().unwrap();
    /// assert_eq!(interpolator.value(1, 1.5).unwrap(), 2.5);
    /// assert_eq!(interpolator.value(2, 1.5).unwrap(), 0.75);
    /// // extrapolation with the last two points
    /// assert_eq!(interpolator.value(1, 3.0).unwrap(), 4.0);
    /// ```
    pub fn value(&self, i_col: usize, u: f64) -> Result<f64, InterpolateError> {
        let (sel, col) = self.select(i_col)?;
        let table = self.table.view();
        let (x, y) = (table.column(0), table.column(col));
        let n = x.len();
        if n == 1 {
            return Ok(y[0]);
        }

        match self.position(u) {
            Position::InTable => {
                let last = self.locate(u);
                Ok(self.strategy.interpolate(x, y, sel, last, u))
            }
            position => match self.extrapolation {
                Extrapolation::HoldLastPoint if position == Position::Left => Ok(y[0]),
                Extrapolation::HoldLastPoint => Ok(y[n - 1]),
                Extrapolation::NoExtrapolation => Err(self.out_of_bounds("The value u", u, position)),
                _ => Ok(self.strategy.extrapolate(x, y, sel, position, u)),
            },
        }
    }

    /// Derivative of [`value`](Interp1D::value) with respect to time,
    /// where `der_u` is the derivative of `u`.
    pub fn derivative(&self, i_col: usize, u: f64, der_u: f64) -> Result<f64, InterpolateError> {
        let (sel, col) = self.select(i_col)?;
        let table = self.table.view();
        let (x, y) = (table.column(0), table.column(col));
        if x.len() == 1 {
            return Ok(0.0);
        }

        let der_y = match self.position(u) {
            Position::InTable => {
                let last = self.locate(u);
                self.strategy.derivative(x, y, sel, last, u)
            }
            position => match self.extrapolation {
                Extrapolation::HoldLastPoint => 0.0,
                Extrapolation::NoExtrapolation => {
                    return Err(self.out_of_bounds("The value u", u, position))
                }
                _ => self.strategy.extrapolate_derivative(x, y, sel, position),
            },
        };
        Ok(der_y * der_u)
    }

    /// The values of all selected columns at `u`
    ///
    /// ```rust
    /// # use ndarray_tables::*;
    /// # use ndarray::*;
    /// let table = array![
    ///     [0.0, 0.0, 1.0],
    ///     [1.0, 2.0, 0.5],
    /// ];
    /// let interpolator = Interp1DBuilder::new(table.view()).build().unwrap();
    /// assert_eq!(interpolator.interp(0.5).unwrap(), array![1.0, 0.75]);
    /// ```
    pub fn interp(&self, u: f64) -> Result<Array1<f64>, InterpolateError> {
        let mut target = Array1::zeros(self.columns.len());
        self.interp_into(u, target.view_mut()).map(|_| target)
    }

    /// Like [`interp`](Interp1D::interp), but stores the values in `buffer`
    ///
    /// # Panics
    /// when the length of `buffer` is not the number of selected columns
    pub fn interp_into(
        &self,
        u: f64,
        mut buffer: ArrayViewMut1<'_, f64>,
    ) -> Result<(), InterpolateError> {
        assert_eq!(
            buffer.len(),
            self.columns.len(),
            "buffer length does not match the number of selected columns"
        );
        for (i, y) in buffer.iter_mut().enumerate() {
            *y = self.value(i + 1, u)?;
        }
        Ok(())
    }

    /// The values of all selected columns at all points in `us`,
    /// one row per point
    pub fn interp_array<S>(&self, us: &ArrayBase<S, Ix1>) -> Result<Array2<f64>, InterpolateError>
    where
        S: Data<Elem = f64>,
    {
        let mut ys = Array2::zeros((us.len(), self.columns.len()));
        let res = Zip::from(us)
            .and(ys.axis_iter_mut(Axis(0)))
            .fold_while(Ok(()), |_, &u, buf| match self.interp_into(u, buf) {
                Ok(_) => ndarray::FoldWhile::Continue(Ok(())),
                Err(e) => ndarray::FoldWhile::Done(Err(e)),
            })
            .into_inner();
        res.map(|_| ys)
    }

    pub fn minimum_abscissa(&self) -> f64 {
        self.table.view()[[0, 0]]
    }

    pub fn maximum_abscissa(&self) -> f64 {
        self.table.view()[[self.table.rows() - 1, 0]]
    }

    /// Read the table again from its file when `force` is set.
    /// Tables from other sources are not changed.
    ///
    /// On error the table keeps its previous data.
    pub fn read(&mut self, force: bool) -> Result<(), BuilderError> {
        if !force || self.table.source() != TableSource::File {
            return Ok(());
        }
        let table = self.spec.load(self.kind)?;
        self.strategy = prepare(
            &table,
            self.spec.display_name(),
            self.kind,
            &self.columns,
            self.requested,
            self.extrapolation,
        )?;
        self.table = table;
        self.last.set(0);
        Ok(())
    }

    pub fn table(&self) -> &TableMatrix<'a> {
        &self.table
    }

    pub fn source(&self) -> TableSource {
        self.table.source()
    }

    /// The smoothness used, [`Smoothness::ContinuousDerivative`] is reduced
    /// to [`Smoothness::LinearSegments`] for tables with less than 3 rows
    pub fn smoothness(&self) -> Smoothness {
        self.strategy.smoothness()
    }

    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }

    /// The selected 1-based table columns
    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    pub fn table_name(&self) -> &str {
        &self.spec.table_name
    }

    pub fn file_name(&self) -> &str {
        &self.spec.file_name
    }

    /// `(position in the selected columns, 0-based table column)` of `i_col`
    pub(crate) fn select(&self, i_col: usize) -> Result<(usize, usize), InterpolateError> {
        i_col
            .checked_sub(1)
            .and_then(|sel| self.columns.get(sel).map(|&col| (sel, col - 1)))
            .ok_or(InterpolateError::UnknownColumn {
                column: i_col,
                count: self.columns.len(),
            })
    }

    pub(crate) fn position(&self, u: f64) -> Position {
        if u < self.minimum_abscissa() {
            Position::Left
        } else if u > self.maximum_abscissa() {
            Position::Right
        } else {
            Position::InTable
        }
    }

    /// The interval of `u`, searched from the memoized interval
    pub(crate) fn locate(&self, u: f64) -> usize {
        let table = self.table.view();
        let last = table.column(0).find_index(self.last.get(), u);
        self.last.set(last);
        last
    }

    pub(crate) fn out_of_bounds(&self, what: &str, u: f64, position: Position) -> InterpolateError {
        let name = self.spec.display_name();
        let n = self.table.rows();
        if position == Position::Left {
            InterpolateError::OutOfBounds(format!(
                "Extrapolation error: {what} (={u}) must be greater or equal than the minimum \
                 abscissa value {name}(1,1) (={}).",
                self.minimum_abscissa()
            ))
        } else {
            InterpolateError::OutOfBounds(format!(
                "Extrapolation error: {what} (={u}) must be less or equal than the maximum \
                 abscissa value {name}({n},1) (={}).",
                self.maximum_abscissa()
            ))
        }
    }
}

/// Validate `table` for `kind` and build the strategy for the selected `columns`
pub(crate) fn prepare(
    table: &TableMatrix<'_>,
    name: &str,
    kind: TableKind,
    columns: &[usize],
    smoothness: Smoothness,
    extrapolation: Extrapolation,
) -> Result<Strategy1D, BuilderError> {
    let (rows, cols) = (table.rows(), table.cols());
    if rows < 1 || cols < 2 {
        let purpose = match kind {
            TableKind::Time => "time interpolation",
            _ => "1D-interpolation",
        };
        return Err(BuilderError::ShapeError(format!(
            "Table matrix \"{name}({rows},{cols})\" does not have appropriate dimensions for {purpose}."
        )));
    }

    let smoothness = if smoothness == Smoothness::ContinuousDerivative && rows < 3 {
        debug!("table \"{name}\" has {rows} rows, using linear segments instead of an Akima spline");
        Smoothness::LinearSegments
    } else {
        smoothness
    };

    let view = table.view();
    let x = view.column(0);
    if kind == TableKind::Time && extrapolation == Extrapolation::Periodic && x[rows - 1] - x[0] <= 0.0 {
        return Err(BuilderError::InvalidPeriod(format!(
            "Table matrix \"{name}\" does not have a positive period/cycle time for time \
             interpolation with periodic extrapolation."
        )));
    }

    let strict = kind != TableKind::Time || smoothness == Smoothness::ContinuousDerivative;
    if let Some(i) = x.first_violation(strict) {
        let (t0, t1) = (x[i], x[i + 1]);
        let (what, op) = if strict {
            ("strictly", ">=")
        } else {
            ("monotonically", ">")
        };
        return Err(BuilderError::Monotonic(format!(
            "The values of the first column of table \"{name}({rows},{cols})\" are not {what} \
             increasing because {name}({},1) (={t0}) {op} {name}({},1) (={t1}).",
            i + 1,
            i + 2
        )));
    }

    if let Some(&col) = columns.iter().find(|&&col| col < 1 || col > cols) {
        return Err(BuilderError::ColumnOutOfRange(format!(
            "The column index {col} is out of range for table matrix \"{name}({rows},{cols})\"."
        )));
    }

    let columns = columns.iter().map(|col| col - 1).collect::<Vec<_>>();
    Strategy1D::build(smoothness, view, &columns)
}

/// Create and configure an [`Interp1D`] interpolator.
///
/// # Default configuration
///  - all columns except the first one are selected
///  - [`Smoothness::LinearSegments`]
///  - [`Extrapolation::LastTwoPoints`]
///  - in-memory tables are copied
#[derive(Debug)]
pub struct Interp1DBuilder<'a> {
    spec: TableSpec<'a>,
    columns: Option<Vec<usize>>,
    smoothness: Smoothness,
    extrapolation: Extrapolation,
}

impl<'a> Interp1DBuilder<'a> {
    /// Create a new [`Interp1DBuilder`] for an in-memory table
    pub fn new(table: ArrayView2<'a, f64>) -> Self {
        Self::with_spec(TableSpec::from_data(table))
    }

    /// Read the table `table_name` from `file_name` on [`build`](Interp1DBuilder::build)
    pub fn from_file(table_name: &str, file_name: &str) -> Self {
        Self::with_spec(TableSpec::from_file(table_name, file_name))
    }

    /// Request the table `table_name` from `provider` on [`build`](Interp1DBuilder::build)
    pub fn from_provider(table_name: &str, provider: &'a dyn TableProvider) -> Self {
        Self::with_spec(TableSpec::from_provider(table_name, provider))
    }

    fn with_spec(spec: TableSpec<'a>) -> Self {
        Interp1DBuilder {
            spec,
            columns: None,
            smoothness: Smoothness::default(),
            extrapolation: Extrapolation::LastTwoPoints,
        }
    }

    /// Set the table name. Together with the file name it decides where
    /// the table is loaded from, see [`table_source`](crate::io::table_source).
    pub fn table_name(mut self, table_name: &str) -> Self {
        self.spec.table_name = table_name.into();
        self
    }

    pub fn file_name(mut self, file_name: &str) -> Self {
        self.spec.file_name = file_name.into();
        self
    }

    pub fn provider(mut self, provider: &'a dyn TableProvider) -> Self {
        self.spec.provider = Some(provider);
        self
    }

    /// Borrow in-memory data instead of copying it
    pub fn no_copy(mut self, no_copy: bool) -> Self {
        self.spec.copy = !no_copy;
        self
    }

    /// Log the loading of table files
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.spec.verbose = verbose;
        self
    }

    /// Options for tables read from `.csv` files
    pub fn csv_options(mut self, options: CsvOptions) -> Self {
        self.spec.csv = options;
        self
    }

    /// Select the 1-based table columns that are interpolated
    pub fn columns(mut self, columns: &[usize]) -> Self {
        self.columns = Some(columns.to_vec());
        self
    }

    pub fn smoothness(mut self, smoothness: Smoothness) -> Self {
        self.smoothness = smoothness;
        self
    }

    /// [`Extrapolation::Periodic`] is not supported and fails on build
    pub fn extrapolation(mut self, extrapolation: Extrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    /// Load and validate the table and create the configured [`Interp1D`]
    pub fn build(self) -> Result<Interp1D<'a>, BuilderError> {
        let Interp1DBuilder {
            spec,
            columns,
            smoothness,
            extrapolation,
        } = self;
        if extrapolation == Extrapolation::Periodic {
            return Err(BuilderError::UnsupportedExtrapolation {
                extrapolation,
                kind: "1D",
            });
        }
        Interp1D::load(spec, TableKind::OneDim, columns, smoothness, extrapolation)
    }
}
