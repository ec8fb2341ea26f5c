use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::{BuilderError, Position, Smoothness};

pub(crate) mod akima;
pub(crate) mod linear;

use linear::Linear;

/// How the values between the nodes of a 1-axis table are computed.
///
/// `col` is the position of the column in the selected columns,
/// `last` the interval `x[last] <= x < x[last + 1]`.
#[derive(Debug, Clone)]
pub(crate) enum Strategy1D {
    Constant,
    Linear,
    /// `[c0, c1, c2]` per interval (axis 0) and selected column (axis 1)
    Akima(Array2<[f64; 3]>),
}

impl Strategy1D {
    /// the strategy for `smoothness`, `ContinuousDerivative` needs at least 3 rows
    pub fn build(
        smoothness: Smoothness,
        table: ArrayView2<'_, f64>,
        columns: &[usize],
    ) -> Result<Self, BuilderError> {
        Ok(match smoothness {
            Smoothness::ConstantSegments => Strategy1D::Constant,
            Smoothness::LinearSegments => Strategy1D::Linear,
            Smoothness::ContinuousDerivative => {
                Strategy1D::Akima(akima::coefficients(table.column(0), table, columns)?)
            }
        })
    }

    pub fn smoothness(&self) -> Smoothness {
        match self {
            Strategy1D::Constant => Smoothness::ConstantSegments,
            Strategy1D::Linear => Smoothness::LinearSegments,
            Strategy1D::Akima(_) => Smoothness::ContinuousDerivative,
        }
    }

    pub fn interpolate(
        &self,
        x: ArrayView1<'_, f64>,
        y: ArrayView1<'_, f64>,
        col: usize,
        last: usize,
        t: f64,
    ) -> f64 {
        match self {
            Strategy1D::Constant => {
                if t >= x[last + 1] {
                    y[last + 1]
                } else {
                    y[last]
                }
            }
            Strategy1D::Linear => {
                Linear::calc_step((x[last], y[last]), (x[last + 1], y[last + 1]), t)
            }
            Strategy1D::Akima(c) => {
                let [c0, c1, c2] = c[[last, col]];
                let u = t - x[last];
                y[last] + ((c0 * u + c1) * u + c2) * u
            }
        }
    }

    /// derivative with respect to `t`
    pub fn derivative(
        &self,
        x: ArrayView1<'_, f64>,
        y: ArrayView1<'_, f64>,
        col: usize,
        last: usize,
        t: f64,
    ) -> f64 {
        match self {
            Strategy1D::Constant => 0.0,
            Strategy1D::Linear => Linear::calc_slope((x[last], y[last]), (x[last + 1], y[last + 1])),
            Strategy1D::Akima(c) => {
                let [c0, c1, c2] = c[[last, col]];
                let u = t - x[last];
                (3.0 * c0 * u + 2.0 * c1) * u + c2
            }
        }
    }

    /// Slope at the first node (`Left`) or the last node (`Right`)
    fn boundary_slope(
        &self,
        x: ArrayView1<'_, f64>,
        y: ArrayView1<'_, f64>,
        col: usize,
        position: Position,
    ) -> f64 {
        let n = x.len();
        match (self, position) {
            (Strategy1D::Akima(c), Position::Left) => c[[0, col]][2],
            (Strategy1D::Akima(_), _) => self.derivative(x, y, col, n - 2, x[n - 1]),
            (_, Position::Left) => Linear::calc_slope((x[0], y[0]), (x[1], y[1])),
            _ => Linear::calc_slope((x[n - 2], y[n - 2]), (x[n - 1], y[n - 1])),
        }
    }

    /// Continue the table outside of its range with the slope at the boundary
    pub fn extrapolate(
        &self,
        x: ArrayView1<'_, f64>,
        y: ArrayView1<'_, f64>,
        col: usize,
        position: Position,
        t: f64,
    ) -> f64 {
        let n = x.len();
        if !matches!(self, Strategy1D::Akima(_)) {
            let last = if position == Position::Right { n - 2 } else { 0 };
            return Linear::calc_step((x[last], y[last]), (x[last + 1], y[last + 1]), t);
        }
        let i = if position == Position::Right { n - 1 } else { 0 };
        y[i] + self.boundary_slope(x, y, col, position) * (t - x[i])
    }

    /// derivative of [`extrapolate`](Strategy1D::extrapolate) with respect to `t`
    pub fn extrapolate_derivative(
        &self,
        x: ArrayView1<'_, f64>,
        y: ArrayView1<'_, f64>,
        col: usize,
        position: Position,
    ) -> f64 {
        self.boundary_slope(x, y, col, position)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn constant_is_right_inclusive() {
        let table = array![[0.0, 1.0], [1.0, 2.0], [2.0, 4.0]];
        let strat = Strategy1D::build(Smoothness::ConstantSegments, table.view(), &[1]).unwrap();
        let (x, y) = (table.column(0), table.column(1));
        assert_eq!(strat.interpolate(x, y, 0, 0, 0.5), 1.0);
        assert_eq!(strat.interpolate(x, y, 0, 0, 1.0), 2.0);
        assert_eq!(strat.derivative(x, y, 0, 0, 0.5), 0.0);
    }

    #[test]
    fn linear_extrapolation() {
        let table = array![[0.0, 1.0], [1.0, 2.0], [2.0, 4.0]];
        let strat = Strategy1D::build(Smoothness::LinearSegments, table.view(), &[1]).unwrap();
        let (x, y) = (table.column(0), table.column(1));
        assert_eq!(strat.extrapolate(x, y, 0, Position::Left, -1.0), 0.0);
        assert_eq!(strat.extrapolate(x, y, 0, Position::Right, 3.0), 6.0);
        assert_eq!(strat.extrapolate_derivative(x, y, 0, Position::Right), 2.0);
    }

    #[test]
    fn akima_extrapolation_is_tangent() {
        let table = array![[0.0, 0.0], [1.0, 2.0], [2.0, 3.0], [3.0, 5.0], [4.0, 7.0]];
        let strat =
            Strategy1D::build(Smoothness::ContinuousDerivative, table.view(), &[1]).unwrap();
        let (x, y) = (table.column(0), table.column(1));
        let slope = strat.derivative(x, y, 0, 3, 4.0);
        assert_relative_eq!(
            strat.extrapolate(x, y, 0, Position::Right, 5.0),
            7.0 + slope,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            strat.extrapolate_derivative(x, y, 0, Position::Left),
            strat.derivative(x, y, 0, 0, 0.0),
            epsilon = 1e-12
        );
    }
}
