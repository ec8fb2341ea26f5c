use ndarray::ArrayView1;

use crate::vector_extensions::{is_nearly_equal, VectorExtensions};

/// Straight lines through two nodes
#[derive(Debug)]
pub(crate) struct Linear;

impl Linear {
    /// linearly interpolate/exrapolate between two points
    pub(crate) fn calc_frac((x1, y1): (f64, f64), (x2, y2): (f64, f64), x: f64) -> f64 {
        let b = y1;
        let m = (y2 - y1) / (x2 - x1);
        m * (x - x1) + b
    }

    /// like [`calc_frac`](Linear::calc_frac), a vertical step yields `y2`
    pub(crate) fn calc_step((x1, y1): (f64, f64), (x2, y2): (f64, f64), x: f64) -> f64 {
        if is_nearly_equal(x1, x2) {
            y2
        } else {
            Self::calc_frac((x1, y1), (x2, y2), x)
        }
    }

    /// the slope between two points, `0` for a vertical step
    pub(crate) fn calc_slope((x1, y1): (f64, f64), (x2, y2): (f64, f64)) -> f64 {
        if is_nearly_equal(x1, x2) {
            0.0
        } else {
            (y2 - y1) / (x2 - x1)
        }
    }

    /// Interpolate `ys` over the strictly increasing `xs` at `x`,
    /// continuing the boundary segments outside of `xs`.
    /// The search for the interval starts at `last`.
    ///
    /// returns `(interval, value, slope)`
    pub(crate) fn along(
        xs: ArrayView1<'_, f64>,
        ys: ArrayView1<'_, f64>,
        last: usize,
        x: f64,
    ) -> (usize, f64, f64) {
        if xs.len() == 1 {
            return (0, ys[0], 0.0);
        }
        let idx = xs.find_index(last, x);
        let p1 = (xs[idx], ys[idx]);
        let p2 = (xs[idx + 1], ys[idx + 1]);
        (idx, Self::calc_frac(p1, p2, x), Self::calc_slope(p1, p2))
    }
}
