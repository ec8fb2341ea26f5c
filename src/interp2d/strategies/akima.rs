//! Bivariate Akima interpolation
//!
//! Akima, Hiroshi. A method of bivariate interpolation and smooth surface
//! fitting based on local procedures. Comm. ACM 17, 1 (Jan. 1974), 18-20.
//!
//! Each grid cell holds a bicubic patch
//! `z00 + p4(v2) + ((p1(v2)*v1 + p2(v2))*v1 + p3(v2))*v1` in the cell-local
//! coordinates `v1 = u1 - u1[i]`, `v2 = u2 - u2[j]`, where `p1..p4` are cubics
//! in `v2` with the coefficients `c[0..4]`, `c[4..8]`, `c[8..12]` and
//! `c[12..15]` (without constant term).
use ndarray::{s, Array2, ArrayView1, ArrayViewMut1};

use crate::{io::try_buffer, BuilderError, Position};

use super::{bilinear::Rectangle, AxisQuery, Grid};

fn try_array<T: Clone>(shape: (usize, usize), fill: T, what: &str) -> Result<Array2<T>, BuilderError> {
    let len = shape.0 * shape.1;
    let alloc_err = || BuilderError::Allocation(format!("{what} ({}x{})", shape.0, shape.1));
    let mut buffer = try_buffer(len).ok_or_else(alloc_err)?;
    buffer.resize(len, fill);
    Array2::from_shape_vec(shape, buffer).map_err(|_| alloc_err())
}

/// The coordinates `u` with two extrapolated coordinates on each side
fn extended_axis(u: ArrayView1<'_, f64>) -> Result<Vec<f64>, BuilderError> {
    let n = u.len();
    let mut x = try_buffer(n + 4)
        .ok_or_else(|| BuilderError::Allocation(format!("{} extended coordinates", n + 4)))?;
    if n == 2 {
        x.extend([
            3.0 * u[0] - 2.0 * u[1],
            2.0 * u[0] - u[1],
            u[0],
            u[1],
            2.0 * u[1] - u[0],
            3.0 * u[1] - 2.0 * u[0],
        ]);
    } else {
        x.extend([2.0 * u[0] - u[2], u[0] + u[1] - u[2]]);
        x.extend(u.iter().copied());
        x.extend([u[n - 1] + u[n - 2] - u[n - 3], 2.0 * u[n - 1] - u[n - 3]]);
    }
    Ok(x)
}

/// The two values left of `z` at `x[0]` and `x[1]`, where `z` are the
/// values at `x[2..5]`
fn extrapolate_left(x: &[f64], z: [f64; 3]) -> [f64; 2] {
    let a = x[3] - x[4];
    let b = x[2] - x[3];
    let c = x[1] - x[2];
    if a == 0.0 || b == 0.0 || c == 0.0 {
        return [z[0], z[0]];
    }
    let d = x[0] - x[1];
    let e = z[1] - z[2];
    let f = z[0] - z[1];
    let z1 = c * (2.0 * f / b - e / a) + z[0];
    let z0 = z1 + d * ((z1 - z[0]) / c + f / b - e / a);
    [z0, z1]
}

/// The two values right of `z` at `x[3]` and `x[4]`, where `z` are the
/// values at `x[0..3]`
fn extrapolate_right(x: &[f64], z: [f64; 3]) -> [f64; 2] {
    let a = x[1] - x[0];
    let b = x[2] - x[1];
    let c = x[3] - x[2];
    if a == 0.0 || b == 0.0 || c == 0.0 {
        return [z[2], z[2]];
    }
    let d = x[4] - x[3];
    let e = z[1] - z[0];
    let f = z[2] - z[1];
    let z3 = c * (2.0 * f / b - e / a) + z[2];
    let z4 = z3 + d * ((z3 - z[2]) / c + f / b - e / a);
    [z3, z4]
}

/// Fill the two values at each end of `line`, which holds the `n` values
/// of the data nodes from index 2
fn extend_line(mut line: ArrayViewMut1<'_, f64>, x: &[f64], n: usize) {
    if n == 2 {
        let (z0, z1) = (line[2], line[3]);
        line[0] = 3.0 * z0 - 2.0 * z1;
        line[1] = 2.0 * z0 - z1;
        line[4] = 2.0 * z1 - z0;
        line[5] = 3.0 * z1 - 2.0 * z0;
    } else {
        let [z0, z1] = extrapolate_left(&x[..5], [line[2], line[3], line[4]]);
        line[0] = z0;
        line[1] = z1;
        let [z0, z1] = extrapolate_right(&x[n - 1..n + 4], [line[n - 1], line[n], line[n + 1]]);
        line[n + 2] = z0;
        line[n + 3] = z1;
    }
}

/// Weights of the slopes left and right of a node, `(1, 1)` when both vanish
fn weights(d0: f64, d1: f64, d2: f64, d3: f64) -> (f64, f64) {
    let (w_left, w_right) = ((d3 - d2).abs(), (d1 - d0).abs());
    if w_left == 0.0 && w_right == 0.0 {
        (1.0, 1.0)
    } else {
        (w_left, w_right)
    }
}

/// `[dz/du1, dz/du2, d2z/du1du2]` at every node of the grid
fn node_derivatives(grid: &Grid<'_>) -> Result<Array2<[f64; 3]>, BuilderError> {
    let (n1, n2) = grid.z.dim();
    let x = extended_axis(grid.u1)?;
    let y = extended_axis(grid.u2)?;

    let mut e = try_array((n1 + 4, n2 + 4), 0.0, "extended table")?;
    e.slice_mut(s![2..n1 + 2, 2..n2 + 2]).assign(&grid.z);
    for i in 2..n1 + 2 {
        extend_line(e.row_mut(i), &y, n2);
    }
    for j in 0..n2 + 4 {
        extend_line(e.column_mut(j), &x, n1);
    }

    let dx = |i: usize, j: usize| (e[[i, j]] - e[[i - 1, j]]) / (x[i] - x[i - 1]);
    let dy = |i: usize, j: usize| (e[[i, j]] - e[[i, j - 1]]) / (y[j] - y[j - 1]);

    let mut derivatives = try_array((n1, n2), [0.0; 3], "node derivatives")?;
    for i in 2..n1 + 2 {
        for j in 2..n2 + 2 {
            let (wx2, wx3) = weights(dx(i - 1, j), dx(i, j), dx(i + 1, j), dx(i + 2, j));
            let zx = (wx2 * dx(i, j) + wx3 * dx(i + 1, j)) / (wx2 + wx3);

            let (d32, d33) = (dy(i, j), dy(i, j + 1));
            let (wy2, wy3) = weights(dy(i, j - 1), d32, d33, dy(i, j + 2));
            let zy = (wy2 * d32 + wy3 * d33) / (wy2 + wy3);

            let e22 = (d32 - dy(i - 1, j)) / (x[i] - x[i - 1]);
            let e23 = (d33 - dy(i - 1, j + 1)) / (x[i] - x[i - 1]);
            let e32 = (dy(i + 1, j) - d32) / (x[i + 1] - x[i]);
            let e33 = (dy(i + 1, j + 1) - d33) / (x[i + 1] - x[i]);
            let zxy = (wx2 * (wy2 * e22 + wy3 * e23) + wx3 * (wy2 * e32 + wy3 * e33))
                / ((wx2 + wx3) * (wy2 + wy3));

            derivatives[[i - 2, j - 2]] = [zx, zy, zxy];
        }
    }
    Ok(derivatives)
}

/// The patch coefficients of every cell (axis 0 along `u1`, axis 1 along `u2`).
///
/// `grid` must have strictly increasing coordinates with at least 2 nodes per axis.
pub(crate) fn coefficients(grid: &Grid<'_>) -> Result<Array2<[f64; 15]>, BuilderError> {
    let (n1, n2) = grid.z.dim();
    debug_assert!(n1 >= 2 && n2 >= 2);
    let derivatives = node_derivatives(grid)?;
    let mut coeffs = try_array((n1 - 1, n2 - 1), [0.0; 15], "Akima patches")?;
    let z = grid.z;

    for i in 0..n1 - 1 {
        let dx = grid.u1[i + 1] - grid.u1[i];
        let dx_2 = dx * dx;
        let dx_3 = dx_2 * dx;
        for j in 0..n2 - 1 {
            let dy = grid.u2[j + 1] - grid.u2[j];
            let dy_2 = dy * dy;
            let dy_3 = dy_2 * dy;
            let (z00, z01) = (z[[i, j]], z[[i, j + 1]]);
            let (z10, z11) = (z[[i + 1, j]], z[[i + 1, j + 1]]);
            let node = derivatives[[i, j]];
            // derivatives scaled to the cell
            let scaled = |[zx, zy, zxy]: [f64; 3]| [zx * dx, zy * dy, zxy * dx * dy];
            let [zx00, zy00, sxy00] = scaled(node);
            let [zx01, zy01, sxy01] = scaled(derivatives[[i, j + 1]]);
            let [zx10, zy10, sxy10] = scaled(derivatives[[i + 1, j]]);
            let [zx11, zy11, sxy11] = scaled(derivatives[[i + 1, j + 1]]);

            let t1 = z00 - z10;
            let t2 = zx00 + zx10;
            let t3 = zy00 - zy10;
            let t4 = zy11 - zy01;
            let t5 = sxy00 + sxy10;
            let t6 = sxy11 + sxy01;
            let t7 = 2.0 * zx00 + zx10;
            let t8 = 2.0 * sxy00 + sxy10;
            let t9 = sxy11 + 2.0 * sxy01;
            let t10 = zx00 - zx01;
            let t11 = z00 - z01;
            let t12 = t1 + (z11 - z01);
            let t13 = t3 - t4;
            let t4 = 2.0 * t3 - t4;
            let t14 = 2.0 * t12 + (t2 - (zx11 + zx01));
            let t12 = 3.0 * t12 + (t7 - (zx11 + 2.0 * zx01));

            coeffs[[i, j]] = [
                (2.0 * t14 + (2.0 * t13 + (t5 + t6))) / (dx_3 * dy_3),
                -(3.0 * t14 + (2.0 * t4 + (2.0 * t5 + t6))) / (dx_3 * dy_2),
                (2.0 * t3 + t5) / (dx_3 * dy),
                (2.0 * t1 + t2) / dx_3,
                -(2.0 * t12 + (3.0 * t13 + (t8 + t9))) / (dx_2 * dy_3),
                (3.0 * t12 + (3.0 * t4 + (2.0 * t8 + t9))) / (dx_2 * dy_2),
                -(3.0 * t3 + t8) / (dx_2 * dy),
                -(3.0 * t1 + t7) / dx_2,
                (2.0 * t10 + (sxy00 + sxy01)) / (dx * dy_3),
                -(3.0 * t10 + (2.0 * sxy00 + sxy01)) / (dx * dy_2),
                node[2],
                node[0],
                (2.0 * t11 + (zy00 + zy01)) / dy_3,
                -(3.0 * t11 + (2.0 * zy00 + zy01)) / dy_2,
                node[1],
            ];
        }
    }
    Ok(coeffs)
}

/// Value and gradient of the patch `c` with corner value `z00` at the
/// cell-local coordinates `(v1, v2)`
pub(crate) fn patch(c: &[f64; 15], z00: f64, v1: f64, v2: f64) -> (f64, [f64; 2]) {
    let p = |k: usize| ((c[k] * v2 + c[k + 1]) * v2 + c[k + 2]) * v2;
    let dp = |k: usize| (3.0 * c[k] * v2 + 2.0 * c[k + 1]) * v2 + c[k + 2];
    let (p1, p2, p3) = (p(0) + c[3], p(4) + c[7], p(8) + c[11]);
    let value = z00 + p(12) + ((p1 * v1 + p2) * v1 + p3) * v1;
    let d1 = (3.0 * p1 * v1 + 2.0 * p2) * v1 + p3;
    let d2 = ((dp(0) * v1 + dp(4)) * v1 + dp(8)) * v1 + dp(12);
    (value, [d1, d2])
}

/// Bounds of the cell along one axis, a cell of the width of the boundary
/// cell outside of the grid, and the nodes its corners are anchored to
fn cell_bounds(u: ArrayView1<'_, f64>, q: AxisQuery) -> ([f64; 2], [usize; 2]) {
    let n = u.len();
    match q.position {
        Position::Left => ([2.0 * u[0] - u[1], u[0]], [0, 0]),
        Position::Right => ([u[n - 1], 2.0 * u[n - 1] - u[n - 2]], [n - 1, n - 1]),
        Position::InTable => ([u[q.cell], u[q.cell + 1]], [q.cell, q.cell + 1]),
    }
}

/// Continue the boundary patch outside of the grid.
///
/// The corner values of the cell containing the query are taken from the
/// tangent plane at the nearest grid node and interpolated bilinearly.
pub(crate) fn extrapolate(
    c: &Array2<[f64; 15]>,
    grid: &Grid<'_>,
    q1: AxisQuery,
    q2: AxisQuery,
) -> (f64, [f64; 2]) {
    let (i, j) = (q1.cell, q2.cell);
    let coeffs = &c[[i, j]];
    let (x, x_nodes) = cell_bounds(grid.u1, q1);
    let (y, y_nodes) = cell_bounds(grid.u2, q2);

    let mut z = [[0.0; 2]; 2];
    for a in 0..2 {
        for b in 0..2 {
            let (n, m) = (x_nodes[a], y_nodes[b]);
            let (v1, v2) = (grid.u1[n] - grid.u1[i], grid.u2[m] - grid.u2[j]);
            let (_, [d1, d2]) = patch(coeffs, grid.z[[i, j]], v1, v2);
            z[a][b] = grid.z[[n, m]] + d1 * (x[a] - grid.u1[n]) + d2 * (y[b] - grid.u2[m]);
        }
    }
    Rectangle { x, y, z }.evaluate(q1.u, q2.u)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    use super::*;

    /// table of `f` on the grid `u1 x u2`
    fn table(u1: &[f64], u2: &[f64], f: impl Fn(f64, f64) -> f64) -> Array2<f64> {
        let mut table = Array2::zeros((u1.len() + 1, u2.len() + 1));
        for (j, &y) in u2.iter().enumerate() {
            table[[0, j + 1]] = y;
        }
        for (i, &x) in u1.iter().enumerate() {
            table[[i + 1, 0]] = x;
            for (j, &y) in u2.iter().enumerate() {
                table[[i + 1, j + 1]] = f(x, y);
            }
        }
        table
    }

    fn eval(c: &Array2<[f64; 15]>, grid: &Grid<'_>, i: usize, j: usize, u1: f64, u2: f64) -> (f64, [f64; 2]) {
        patch(&c[[i, j]], grid.z[[i, j]], u1 - grid.u1[i], u2 - grid.u2[j])
    }

    #[test]
    fn extrapolated_lines() {
        let x = [-2.0, -1.0, 0.0, 1.0, 2.0];
        // 2*x + 1 at x[2..5]
        assert_eq!(extrapolate_left(&x, [1.0, 3.0, 5.0]), [-3.0, -1.0]);
        assert_eq!(extrapolate_right(&[0.0, 1.0, 2.0, 3.0, 4.0], [1.0, 3.0, 5.0]), [7.0, 9.0]);
        assert_eq!(extended_axis(array![1.0, 2.0].view()).unwrap(), vec![-1.0, 0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(
            extended_axis(array![0.0, 1.0, 3.0].view()).unwrap(),
            vec![-3.0, -2.0, 0.0, 1.0, 3.0, 4.0, 6.0]
        );
    }

    #[test]
    fn reproduces_bilinear_surface() {
        let table = table(&[1.0, 2.0, 4.0, 5.0], &[1.0, 3.0, 4.0], |x, y| 2.0 + x - y + x * y);
        let grid = Grid::new(table.view());
        let c = coefficients(&grid).unwrap();
        for &(i, j, u1, u2) in &[(0, 0, 1.5, 2.0), (1, 1, 3.0, 3.5), (2, 0, 4.25, 1.0)] {
            let (value, [d1, d2]) = eval(&c, &grid, i, j, u1, u2);
            assert_relative_eq!(value, 2.0 + u1 - u2 + u1 * u2, epsilon = 1e-10);
            assert_relative_eq!(d1, 1.0 + u2, epsilon = 1e-10);
            assert_relative_eq!(d2, u1 - 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn patches_meet_at_nodes() {
        let table = table(&[0.0, 1.0, 2.5, 3.0, 4.0], &[0.0, 0.5, 2.0, 3.0], |x, y| (x * y).sin() + x);
        let grid = Grid::new(table.view());
        let c = coefficients(&grid).unwrap();
        for i in 0..3 {
            for j in 0..2 {
                let (u1, u2) = (grid.u1[i + 1], grid.u2[j + 1]);
                let (right, grad_right) = eval(&c, &grid, i + 1, j + 1, u1, u2);
                let (left, grad_left) = eval(&c, &grid, i, j, u1, u2);
                assert_relative_eq!(right, grid.z[[i + 1, j + 1]], epsilon = 1e-10);
                assert_relative_eq!(left, right, epsilon = 1e-10);
                assert_relative_eq!(grad_left[0], grad_right[0], epsilon = 1e-9);
                assert_relative_eq!(grad_left[1], grad_right[1], epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn tangent_plane_outside() {
        let table = table(&[1.0, 2.0, 4.0], &[1.0, 3.0, 4.0], |x, y| x * y);
        let grid = Grid::new(table.view());
        let c = coefficients(&grid).unwrap();
        let left = |u, cell| AxisQuery {
            u,
            cell,
            position: Position::Left,
        };
        // corner: tangent plane at (1, 1)
        let (value, [d1, d2]) = extrapolate(&c, &grid, left(0.0, 0), left(0.0, 0));
        assert_relative_eq!(value, -1.0, epsilon = 1e-12);
        assert_relative_eq!(d1, 1.0, epsilon = 1e-12);
        assert_relative_eq!(d2, 1.0, epsilon = 1e-12);
        // edge: continued along u1
        let inside = AxisQuery {
            u: 2.0,
            cell: 0,
            position: Position::InTable,
        };
        let (value, _) = extrapolate(&c, &grid, left(0.5, 0), inside);
        assert_relative_eq!(value, 1.0, epsilon = 1e-12);
    }
}
