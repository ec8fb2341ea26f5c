use ndarray::{s, Array2, ArrayView1, ArrayView2};

use crate::{BuilderError, Position, Smoothness};

pub(crate) mod akima;
pub(crate) mod bilinear;

/// The parts of a 2D table: the coordinates `u1` from the first column,
/// the coordinates `u2` from the first row and the values `z` of the grid.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Grid<'v> {
    pub u1: ArrayView1<'v, f64>,
    pub u2: ArrayView1<'v, f64>,
    pub z: ArrayView2<'v, f64>,
}

impl<'v> Grid<'v> {
    /// Split a table with at least 2 rows and 2 columns
    pub fn new(table: ArrayView2<'v, f64>) -> Self {
        Grid {
            u1: table.slice_move(s![1.., 0]),
            u2: table.slice_move(s![0, 1..]),
            z: table.slice_move(s![1.., 1..]),
        }
    }
}

/// A query coordinate along one axis of the grid
#[derive(Debug, Clone, Copy)]
pub(crate) struct AxisQuery {
    pub u: f64,
    /// the cell `u[cell] <= u < u[cell + 1]`, `0` for an axis with a single node
    pub cell: usize,
    pub position: Position,
}

/// How the values between the nodes of a 2D table are computed
#[derive(Debug, Clone)]
pub(crate) enum Strategy2D {
    Constant,
    Linear,
    /// the 15 coefficients of the bicubic patch of every grid cell
    Akima(Array2<[f64; 15]>),
}

impl Strategy2D {
    /// the strategy for `smoothness`, `ContinuousDerivative` needs at least
    /// 2 nodes per axis and more than 2 along one of them
    pub fn build(smoothness: Smoothness, grid: &Grid<'_>) -> Result<Self, BuilderError> {
        Ok(match smoothness {
            Smoothness::ConstantSegments => Strategy2D::Constant,
            Smoothness::LinearSegments => Strategy2D::Linear,
            Smoothness::ContinuousDerivative => Strategy2D::Akima(akima::coefficients(grid)?),
        })
    }

    pub fn smoothness(&self) -> Smoothness {
        match self {
            Strategy2D::Constant => Smoothness::ConstantSegments,
            Strategy2D::Linear => Smoothness::LinearSegments,
            Strategy2D::Akima(_) => Smoothness::ContinuousDerivative,
        }
    }

    /// The value and the gradient `[dz/du1, dz/du2]` at `(q1.u, q2.u)`.
    ///
    /// Outside of the grid the boundary cell is continued, bilinearly or
    /// with the tangent plane of the boundary patch.
    pub fn evaluate(&self, grid: &Grid<'_>, q1: AxisQuery, q2: AxisQuery) -> (f64, [f64; 2]) {
        let inside = q1.position == Position::InTable && q2.position == Position::InTable;
        match self {
            Strategy2D::Constant if inside => {
                let i = right_inclusive(grid.u1, q1);
                let j = right_inclusive(grid.u2, q2);
                (grid.z[[i, j]], [0.0, 0.0])
            }
            Strategy2D::Akima(c) if inside => {
                let (i, j) = (q1.cell, q2.cell);
                akima::patch(
                    &c[[i, j]],
                    grid.z[[i, j]],
                    q1.u - grid.u1[i],
                    q2.u - grid.u2[j],
                )
            }
            Strategy2D::Akima(c) => akima::extrapolate(c, grid, q1, q2),
            _ => bilinear::evaluate(grid, q1, q2),
        }
    }
}

/// The node left of `q`, or the right node of its cell when `q` is on it
fn right_inclusive(u: ArrayView1<'_, f64>, q: AxisQuery) -> usize {
    if u.len() > 1 && q.u >= u[q.cell + 1] {
        q.cell + 1
    } else {
        q.cell
    }
}
