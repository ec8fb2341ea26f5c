//! Univariate Akima spline
//!
//! Akima, Hiroshi. A new method of interpolation and smooth curve fitting
//! based on local procedures. J. ACM 17, 4 (Oct. 1970), 589-602.
use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::{io::try_buffer, BuilderError};

/// Blend the slopes `d1` and `d2` of the neighbouring intervals into a node slope.
/// The weights come from the change of slope `d0 -> d1` and `d2 -> d3`.
pub(crate) fn node_slope(d0: f64, d1: f64, d2: f64, d3: f64) -> f64 {
    let t = (d3 - d2).abs() + (d1 - d0).abs();
    if t > 0.0 {
        let a = (d1 - d0).abs() / t;
        (1.0 - a) * d1 + a * d2
    } else {
        0.5 * d1 + 0.5 * d2
    }
}

/// Coefficients `[c0, c1, c2]` of the cubic `y0 + ((c0*u + c1)*u + c2)*u`
/// for every interval of `x` (axis 0) and every table column in `columns` (axis 1).
///
/// `x` must be strictly increasing with at least 3 values.
pub(crate) fn coefficients(
    x: ArrayView1<'_, f64>,
    table: ArrayView2<'_, f64>,
    columns: &[usize],
) -> Result<Array2<[f64; 3]>, BuilderError> {
    let n = x.len();
    debug_assert!(n > 2);
    let len = (n - 1) * columns.len();
    let alloc_err =
        || BuilderError::Allocation(format!("Akima spline with {len} coefficient sets"));
    let mut coeffs = try_buffer(len).ok_or_else(alloc_err)?;
    coeffs.resize(len, [0.0; 3]);
    let mut coeffs =
        Array2::from_shape_vec((n - 1, columns.len()), coeffs).map_err(|_| alloc_err())?;
    // divided differences with two extrapolated values on each side
    let mut d = try_buffer(n + 3).ok_or_else(alloc_err)?;
    d.resize(n + 3, 0.0);

    for (j, &col) in columns.iter().enumerate() {
        let y = table.column(col);
        for i in 0..n - 1 {
            d[i + 2] = (y[i + 1] - y[i]) / (x[i + 1] - x[i]);
        }
        d[0] = 3.0 * d[2] - 2.0 * d[3];
        d[1] = 2.0 * d[2] - d[3];
        d[n + 1] = 2.0 * d[n] - d[n - 1];
        d[n + 2] = 3.0 * d[n] - 2.0 * d[n - 1];

        for i in 0..n - 1 {
            let dx = x[i + 1] - x[i];
            let left = node_slope(d[i], d[i + 1], d[i + 2], d[i + 3]);
            let right = node_slope(d[i + 1], d[i + 2], d[i + 3], d[i + 4]);
            coeffs[[i, j]] = [
                (left + right - 2.0 * d[i + 2]) / (dx * dx),
                (3.0 * d[i + 2] - 2.0 * left - right) / dx,
                left,
            ];
        }
    }
    Ok(coeffs)
}
