use crate::interp1d::strategies::linear::Linear;

use super::{AxisQuery, Grid};

/// A bilinear surface through the corner values `z[a][b]` at `(x[a], y[b])`
#[derive(Debug, Clone, Copy)]
pub(crate) struct Rectangle {
    pub x: [f64; 2],
    pub y: [f64; 2],
    pub z: [[f64; 2]; 2],
}

impl Rectangle {
    /// value and gradient at `(u1, u2)`, also outside of the rectangle
    pub fn evaluate(&self, u1: f64, u2: f64) -> (f64, [f64; 2]) {
        let Rectangle { x, y, z } = *self;
        let lower = Linear::calc_frac((x[0], z[0][0]), (x[1], z[1][0]), u1);
        let upper = Linear::calc_frac((x[0], z[0][1]), (x[1], z[1][1]), u1);
        let slope_lower = Linear::calc_slope((x[0], z[0][0]), (x[1], z[1][0]));
        let slope_upper = Linear::calc_slope((x[0], z[0][1]), (x[1], z[1][1]));
        (
            Linear::calc_frac((y[0], lower), (y[1], upper), u2),
            [
                Linear::calc_frac((y[0], slope_lower), (y[1], slope_upper), u2),
                Linear::calc_slope((y[0], lower), (y[1], upper)),
            ],
        )
    }
}

/// Bilinear interpolation in the cell of the queries, continued outside of the grid.
/// Along an axis with a single node the grid is constant.
pub(crate) fn evaluate(grid: &Grid<'_>, q1: AxisQuery, q2: AxisQuery) -> (f64, [f64; 2]) {
    let (n1, n2) = grid.z.dim();
    if n1 == 1 {
        let (_, value, slope) = Linear::along(grid.u2, grid.z.row(0), q2.cell, q2.u);
        return (value, [0.0, slope]);
    }
    if n2 == 1 {
        let (_, value, slope) = Linear::along(grid.u1, grid.z.column(0), q1.cell, q1.u);
        return (value, [slope, 0.0]);
    }

    let (i, j) = (q1.cell, q2.cell);
    let z = grid.z;
    Rectangle {
        x: [grid.u1[i], grid.u1[i + 1]],
        y: [grid.u2[j], grid.u2[j + 1]],
        z: [
            [z[[i, j]], z[[i, j + 1]]],
            [z[[i + 1, j]], z[[i + 1, j + 1]]],
        ],
    }
    .evaluate(q1.u, q2.u)
}
