//! Interpolation of a grid along two axes
//!
//! The table stores the grid with its coordinates:
//!
//! |          | `u2[0]`   | `u2[1]`   | ... |
//! |----------|-----------|-----------|-----|
//! | `u1[0]`  | `z[0, 0]` | `z[0, 1]` | ... |
//! | `u1[1]`  | `z[1, 0]` | `z[1, 1]` | ... |
//!
//! The element `table[[0, 0]]` is not used. Both coordinate vectors must be
//! strictly increasing.
//!
//! # Interpolator
//!  - [`Interp2D`] The interpolator for all smoothness kinds
//!  - [`Interp2DBuilder`] Configure the interpolator

use std::cell::Cell;

use log::debug;
use ndarray::{Array, ArrayBase, ArrayView1, ArrayView2, Data, Dimension, FoldWhile, Zip};

use crate::{
    io::{CsvOptions, TableKind, TableProvider, TableSpec},
    vector_extensions::VectorExtensions,
    BuilderError, Extrapolation, InterpolateError, Position, Smoothness, TableMatrix, TableSource,
};

pub(crate) mod strategies;
use strategies::{AxisQuery, Grid, Strategy2D};

/// Interpolator for a grid with two coordinate axes
///
/// Like [`Interp1D`](crate::Interp1D) the last cell is memoized per axis,
/// so the interpolator is `Send` but not `Sync`.
#[derive(Debug)]
pub struct Interp2D<'a> {
    spec: TableSpec<'a>,
    table: TableMatrix<'a>,
    requested: Smoothness,
    strategy: Strategy2D,
    extrapolation: Extrapolation,
    last1: Cell<usize>,
    last2: Cell<usize>,
}

impl<'a> Interp2D<'a> {
    /// Get the [`Interp2DBuilder`] for an in-memory table
    pub fn builder(table: ArrayView2<'a, f64>) -> Interp2DBuilder<'a> {
        Interp2DBuilder::new(table)
    }

    /// Interpolated value at `(u1, u2)`
    ///
    /// ```rust
    /// # use ndarray_tables::*;
    /// # use ndarray::*;
    /// let table = array![
    ///     [0.0, 1.0, 2.0],
    ///     [1.0, 1.0, 2.0],
    ///     [2.0, 3.0, 4.0],
    /// ];
    /// let interpolator = Interp2DBuilder::new(table.view()).build().unwrap();
    /// assert_eq!(interpolator.value(1.5, 1.5).unwrap(), 2.5);
    /// ```
    pub fn value(&self, u1: f64, u2: f64) -> Result<f64, InterpolateError> {
        self.evaluate(u1, u2).map(|(value, _)| value)
    }

    /// Derivative of [`value`](Interp2D::value) with respect to time,
    /// where `der_u1` and `der_u2` are the derivatives of `u1` and `u2`.
    ///
    /// Along an axis on which [`Extrapolation::HoldLastPoint`] holds the
    /// boundary value the derivative is zero.
    pub fn derivative(
        &self,
        u1: f64,
        u2: f64,
        der_u1: f64,
        der_u2: f64,
    ) -> Result<f64, InterpolateError> {
        self.evaluate(u1, u2)
            .map(|(_, [d1, d2])| d1 * der_u1 + d2 * der_u2)
    }

    /// The values at all points `(u1s[i], u2s[i])`
    ///
    /// # Panics
    /// when `u1s` and `u2s` differ in shape
    pub fn interp_array<S1, S2, D>(
        &self,
        u1s: &ArrayBase<S1, D>,
        u2s: &ArrayBase<S2, D>,
    ) -> Result<Array<f64, D>, InterpolateError>
    where
        S1: Data<Elem = f64>,
        S2: Data<Elem = f64>,
        D: Dimension,
    {
        assert_eq!(u1s.shape(), u2s.shape(), "query arrays differ in shape");
        let mut zs = Array::zeros(u1s.raw_dim());
        let res = Zip::from(&mut zs)
            .and(u1s)
            .and(u2s)
            .fold_while(Ok(()), |_, z, &u1, &u2| match self.value(u1, u2) {
                Ok(value) => {
                    *z = value;
                    FoldWhile::Continue(Ok(()))
                }
                Err(e) => FoldWhile::Done(Err(e)),
            })
            .into_inner();
        res.map(|_| zs)
    }

    /// `((u1_min, u1_max), (u2_min, u2_max))`
    pub fn domain(&self) -> ((f64, f64), (f64, f64)) {
        let grid = self.grid();
        let (n1, n2) = (grid.u1.len(), grid.u2.len());
        ((grid.u1[0], grid.u1[n1 - 1]), (grid.u2[0], grid.u2[n2 - 1]))
    }

    /// Read the table again from its file when `force` is set.
    /// Tables from other sources are not changed.
    ///
    /// On error the table keeps its previous data.
    pub fn read(&mut self, force: bool) -> Result<(), BuilderError> {
        if !force || self.table.source() != TableSource::File {
            return Ok(());
        }
        let table = self.spec.load(TableKind::TwoDim)?;
        self.strategy = prepare(&table, self.spec.display_name(), self.requested)?;
        self.table = table;
        self.last1.set(0);
        self.last2.set(0);
        Ok(())
    }

    pub fn table(&self) -> &TableMatrix<'a> {
        &self.table
    }

    pub fn source(&self) -> TableSource {
        self.table.source()
    }

    /// The smoothness used, [`Smoothness::ContinuousDerivative`] is reduced
    /// to [`Smoothness::LinearSegments`] for grids that are too small
    pub fn smoothness(&self) -> Smoothness {
        self.strategy.smoothness()
    }

    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }

    pub fn table_name(&self) -> &str {
        &self.spec.table_name
    }

    pub fn file_name(&self) -> &str {
        &self.spec.file_name
    }

    fn grid(&self) -> Grid<'_> {
        Grid::new(self.table.view())
    }

    fn evaluate(&self, u1: f64, u2: f64) -> Result<(f64, [f64; 2]), InterpolateError> {
        let grid = self.grid();
        if grid.z.len() == 1 {
            return Ok((grid.z[[0, 0]], [0.0, 0.0]));
        }

        let (q1, hold1) = self.axis_query(grid.u1, &self.last1, u1, 1)?;
        let (q2, hold2) = self.axis_query(grid.u2, &self.last2, u2, 2)?;
        let (value, [d1, d2]) = self.strategy.evaluate(&grid, q1, q2);
        let d1 = if hold1 { 0.0 } else { d1 };
        let d2 = if hold2 { 0.0 } else { d2 };
        Ok((value, [d1, d2]))
    }

    /// Locate `u` on the axis `coords` and apply the extrapolation.
    ///
    /// Returns the query and whether `u` was clamped to the boundary.
    fn axis_query(
        &self,
        coords: ArrayView1<'_, f64>,
        last: &Cell<usize>,
        u: f64,
        axis: usize,
    ) -> Result<(AxisQuery, bool), InterpolateError> {
        let n = coords.len();
        if n == 1 {
            let query = AxisQuery {
                u,
                cell: 0,
                position: Position::InTable,
            };
            return Ok((query, false));
        }

        let (min, max) = (coords[0], coords[n - 1]);
        let position = if u < min {
            Position::Left
        } else if u > max {
            Position::Right
        } else {
            Position::InTable
        };
        let (u, position, clamped) = match (position, self.extrapolation) {
            (Position::InTable, _) => (u, position, false),
            (_, Extrapolation::NoExtrapolation) => {
                return Err(self.out_of_bounds(axis, u, position, (min, max)))
            }
            (_, Extrapolation::HoldLastPoint) => (u.clamp(min, max), Position::InTable, true),
            _ => (u, position, false),
        };
        let cell = coords.find_index(last.get(), u);
        last.set(cell);
        Ok((AxisQuery { u, cell, position }, clamped))
    }

    fn out_of_bounds(&self, axis: usize, u: f64, position: Position, (min, max): (f64, f64)) -> InterpolateError {
        let name = self.spec.display_name();
        let (rows, cols) = (self.table.rows(), self.table.cols());
        let (first, last) = if axis == 1 {
            ("2,1".to_string(), format!("{rows},1"))
        } else {
            ("1,2".to_string(), format!("1,{cols}"))
        };
        if position == Position::Left {
            InterpolateError::OutOfBounds(format!(
                "Extrapolation error: The value u{axis} (={u}) must be greater or equal than the \
                 minimum abscissa value {name}({first}) (={min})."
            ))
        } else {
            InterpolateError::OutOfBounds(format!(
                "Extrapolation error: The value u{axis} (={u}) must be less or equal than the \
                 maximum abscissa value {name}({last}) (={max})."
            ))
        }
    }
}

/// Validate a 2D table and build the strategy
pub(crate) fn prepare(
    table: &TableMatrix<'_>,
    name: &str,
    smoothness: Smoothness,
) -> Result<Strategy2D, BuilderError> {
    let (rows, cols) = (table.rows(), table.cols());
    if rows < 2 || cols < 2 {
        return Err(BuilderError::ShapeError(format!(
            "Table matrix \"{name}({rows},{cols})\" does not have appropriate dimensions for 2D-interpolation."
        )));
    }

    let grid = Grid::new(table.view());
    if let Some(i) = grid.u1.first_violation(true) {
        return Err(BuilderError::Monotonic(format!(
            "The values of the first column of table \"{name}({rows},{cols})\" are not strictly \
             increasing because {name}({},1) (={}) >= {name}({},1) (={}).",
            i + 2,
            grid.u1[i],
            i + 3,
            grid.u1[i + 1]
        )));
    }
    if let Some(j) = grid.u2.first_violation(true) {
        return Err(BuilderError::Monotonic(format!(
            "The values of the first row of table \"{name}({rows},{cols})\" are not strictly \
             increasing because {name}(1,{}) (={}) >= {name}(1,{}) (={}).",
            j + 2,
            grid.u2[j],
            j + 3,
            grid.u2[j + 1]
        )));
    }

    let (n1, n2) = grid.z.dim();
    let smoothness = if smoothness == Smoothness::ContinuousDerivative
        && (n1 < 2 || n2 < 2 || (n1 == 2 && n2 == 2))
    {
        debug!("table \"{name}\" has a {n1}x{n2} grid, using linear segments instead of an Akima spline");
        Smoothness::LinearSegments
    } else {
        smoothness
    };
    Strategy2D::build(smoothness, &grid)
}

/// Create and configure an [`Interp2D`] interpolator.
///
/// # Default configuration
///  - [`Smoothness::LinearSegments`]
///  - [`Extrapolation::LastTwoPoints`]
///  - in-memory tables are copied
#[derive(Debug)]
pub struct Interp2DBuilder<'a> {
    spec: TableSpec<'a>,
    smoothness: Smoothness,
    extrapolation: Extrapolation,
}

impl<'a> Interp2DBuilder<'a> {
    /// Create a new [`Interp2DBuilder`] for an in-memory table
    pub fn new(table: ArrayView2<'a, f64>) -> Self {
        Self::with_spec(TableSpec::from_data(table))
    }

    /// Read the table `table_name` from `file_name` on [`build`](Interp2DBuilder::build)
    pub fn from_file(table_name: &str, file_name: &str) -> Self {
        Self::with_spec(TableSpec::from_file(table_name, file_name))
    }

    /// Request the table `table_name` from `provider` on [`build`](Interp2DBuilder::build)
    pub fn from_provider(table_name: &str, provider: &'a dyn TableProvider) -> Self {
        Self::with_spec(TableSpec::from_provider(table_name, provider))
    }

    fn with_spec(spec: TableSpec<'a>) -> Self {
        Interp2DBuilder {
            spec,
            smoothness: Smoothness::default(),
            extrapolation: Extrapolation::LastTwoPoints,
        }
    }

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

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.spec.verbose = verbose;
        self
    }

    pub fn csv_options(mut self, options: CsvOptions) -> Self {
        self.spec.csv = options;
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

    /// Load and validate the table and create the configured [`Interp2D`]
    pub fn build(self) -> Result<Interp2D<'a>, BuilderError> {
        let Interp2DBuilder {
            spec,
            smoothness,
            extrapolation,
        } = self;
        if extrapolation == Extrapolation::Periodic {
            return Err(BuilderError::UnsupportedExtrapolation {
                extrapolation,
                kind: "2D",
            });
        }
        let table = spec.load(TableKind::TwoDim)?;
        let strategy = prepare(&table, spec.display_name(), smoothness)?;
        Ok(Interp2D {
            spec,
            table,
            requested: smoothness,
            strategy,
            extrapolation,
            last1: Cell::new(0),
            last2: Cell::new(0),
        })
    }
}
