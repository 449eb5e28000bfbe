//! Cubic-spline interpolation of the consumption policy over the capital grid.

use nalgebra::DVector;

use crate::error::{GrowthError, Result};
use crate::grid::CapitalGrid;

/// A natural cubic spline through a set of strictly increasing abscissae.
///
/// Natural boundary conditions set the second derivative to zero at both
/// endpoints, so a spline fitted through collinear points reproduces the line
/// exactly. With only two points the spline degrades to linear interpolation.
#[derive(Clone, Debug)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    second_derivatives: Vec<f64>,
}

impl CubicSpline {
    /// Fits a natural cubic spline through `(x, y)` pairs.
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(GrowthError::dimension_mismatch(
                "spline fit",
                x.len(),
                y.len(),
            ));
        }
        if x.len() < 2 {
            return Err(GrowthError::invalid_parameter("nodes", x.len() as f64));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(GrowthError::numerical("spline fit"));
        }
        for index in 1..x.len() {
            if x[index] <= x[index - 1] {
                return Err(GrowthError::NonIncreasingGrid { index });
            }
        }
        let second_derivatives = solve_natural_system(x, y);
        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            second_derivatives,
        })
    }

    /// Evaluates the spline at `x`.
    ///
    /// Outside the fitted span the spline is extended linearly along the
    /// tangent at the nearest endpoint, and the excursion is logged.
    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.x.len();
        let (lo, hi) = self.span();
        if x < lo {
            log::debug!(
                "evaluating spline outside its span: {} below [{}, {}]",
                x,
                lo,
                hi
            );
            return self.y[0] + self.derivative_in_segment(0, lo) * (x - lo);
        }
        if x > hi {
            log::debug!(
                "evaluating spline outside its span: {} above [{}, {}]",
                x,
                lo,
                hi
            );
            return self.y[n - 1] + self.derivative_in_segment(n - 2, hi) * (x - hi);
        }
        self.value_in_segment(self.segment_index(x), x)
    }

    /// First and last fitted abscissae.
    pub fn span(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    fn segment_index(&self, x: f64) -> usize {
        let upper = self.x.partition_point(|&node| node <= x);
        upper.clamp(1, self.x.len() - 1) - 1
    }

    fn value_in_segment(&self, i: usize, x: f64) -> f64 {
        let m = &self.second_derivatives;
        let h = self.x[i + 1] - self.x[i];
        let a = self.x[i + 1] - x;
        let b = x - self.x[i];
        m[i] * a * a * a / (6.0 * h)
            + m[i + 1] * b * b * b / (6.0 * h)
            + (self.y[i] / h - m[i] * h / 6.0) * a
            + (self.y[i + 1] / h - m[i + 1] * h / 6.0) * b
    }

    fn derivative_in_segment(&self, i: usize, x: f64) -> f64 {
        let m = &self.second_derivatives;
        let h = self.x[i + 1] - self.x[i];
        let a = self.x[i + 1] - x;
        let b = x - self.x[i];
        -m[i] * a * a / (2.0 * h) + m[i + 1] * b * b / (2.0 * h)
            - (self.y[i] / h - m[i] * h / 6.0)
            + (self.y[i + 1] / h - m[i + 1] * h / 6.0)
    }
}

/// Solves the tridiagonal system for the interior second derivatives.
///
/// The system is symmetric and strictly diagonally dominant, so the Thomas
/// sweep needs no pivoting. The endpoint second derivatives stay zero.
fn solve_natural_system(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut second_derivatives = vec![0.0; n];
    if n == 2 {
        return second_derivatives;
    }
    let interior = n - 2;
    let mut diag = vec![0.0; interior];
    let mut rhs = vec![0.0; interior];
    for i in 0..interior {
        let h_lo = x[i + 1] - x[i];
        let h_hi = x[i + 2] - x[i + 1];
        diag[i] = 2.0 * (h_lo + h_hi);
        rhs[i] = 6.0 * ((y[i + 2] - y[i + 1]) / h_hi - (y[i + 1] - y[i]) / h_lo);
    }
    for i in 1..interior {
        let coupling = x[i + 1] - x[i];
        let w = coupling / diag[i - 1];
        diag[i] -= w * coupling;
        rhs[i] -= w * rhs[i - 1];
    }
    let mut solution = vec![0.0; interior];
    solution[interior - 1] = rhs[interior - 1] / diag[interior - 1];
    for i in (0..interior - 1).rev() {
        let coupling = x[i + 2] - x[i + 1];
        solution[i] = (rhs[i] - coupling * solution[i + 1]) / diag[i];
    }
    second_derivatives[1..=interior].copy_from_slice(&solution);
    second_derivatives
}

/// The consumption policy as a function of the capital state.
///
/// Wraps a [`CubicSpline`] fitted through log-consumption values at the grid's
/// log-capital nodes, which keeps interpolated consumption strictly positive.
#[derive(Clone, Debug)]
pub struct PolicyFunction {
    spline: CubicSpline,
}

impl PolicyFunction {
    /// Fits the policy through one log-consumption value per grid node.
    pub fn fit(grid: &CapitalGrid, log_consumption: &DVector<f64>) -> Result<Self> {
        if log_consumption.len() != grid.len() {
            return Err(GrowthError::dimension_mismatch(
                "policy fit",
                grid.len(),
                log_consumption.len(),
            ));
        }
        let spline = CubicSpline::fit(grid.log_nodes(), log_consumption.as_slice())?;
        Ok(Self { spline })
    }

    /// Log consumption prescribed at a log capital stock.
    pub fn evaluate(&self, log_capital: f64) -> f64 {
        self.spline.evaluate(log_capital)
    }

    /// Consumption level prescribed at a capital level.
    pub fn consumption(&self, capital: f64) -> f64 {
        self.evaluate(capital.ln()).exp()
    }

    /// Log-capital span the policy was fitted over.
    pub fn log_span(&self) -> (f64, f64) {
        self.spline.span()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn spline_interpolates_the_fitted_nodes() {
        let x = [0.0, 0.7, 1.1, 2.3, 3.0];
        let y = [1.0, -0.4, 0.9, 2.2, -1.0];
        let spline = CubicSpline::fit(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert_relative_eq!(spline.evaluate(*xi), *yi, epsilon = 1e-12);
        }
    }

    #[test]
    fn collinear_data_reproduces_the_line_everywhere() {
        let x: Vec<f64> = (0..5).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        let spline = CubicSpline::fit(&x, &y).unwrap();
        for probe in [0.25, 1.5, 3.9, -1.0, 6.0] {
            assert_relative_eq!(spline.evaluate(probe), 2.0 * probe + 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn symmetric_hump_matches_the_closed_form_segment() {
        // With nodes (0,0), (1,1), (2,0) the single interior second
        // derivative is -3, giving S(0.5) = 0.6875.
        let spline = CubicSpline::fit(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]).unwrap();
        assert_relative_eq!(spline.evaluate(0.5), 0.6875, epsilon = 1e-12);
        assert_relative_eq!(spline.evaluate(1.5), 0.6875, epsilon = 1e-12);
    }

    #[test]
    fn two_nodes_degrade_to_linear_interpolation() {
        let spline = CubicSpline::fit(&[1.0, 3.0], &[2.0, 6.0]).unwrap();
        assert_relative_eq!(spline.evaluate(2.0), 4.0, epsilon = 1e-12);
        assert_relative_eq!(spline.evaluate(0.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn refitting_identical_inputs_evaluates_identically() {
        let x = [0.0, 0.7, 1.1, 2.3, 3.0];
        let y = [1.0, -0.4, 0.9, 2.2, -1.0];
        let first = CubicSpline::fit(&x, &y).unwrap();
        let second = CubicSpline::fit(&x, &y).unwrap();
        for probe in [0.1, 0.95, 1.7, 2.9, -0.5, 3.5] {
            assert_eq!(first.evaluate(probe), second.evaluate(probe));
        }
    }

    #[test]
    fn fit_rejects_malformed_inputs() {
        assert!(CubicSpline::fit(&[0.0, 1.0], &[1.0]).is_err());
        assert!(CubicSpline::fit(&[0.5], &[1.0]).is_err());
        assert!(CubicSpline::fit(&[0.0, 0.0, 1.0], &[1.0, 2.0, 3.0]).is_err());
        assert!(CubicSpline::fit(&[0.0, f64::NAN], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn out_of_span_evaluation_extends_the_endpoint_tangent() {
        let spline = CubicSpline::fit(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]).unwrap();
        // Tangent slope at both ends of the hump is +/- 1.5.
        assert_relative_eq!(spline.evaluate(-0.4), -0.6, epsilon = 1e-12);
        assert_relative_eq!(spline.evaluate(2.4), -0.6, epsilon = 1e-12);
    }

    #[test]
    fn policy_function_exponentiates_its_spline() {
        let grid = CapitalGrid::from_log_nodes(vec![-2.0, -1.8, -1.6, -1.4]).unwrap();
        let log_consumption = DVector::from_vec(vec![-1.2, -1.1, -1.0, -0.9]);
        let policy = PolicyFunction::fit(&grid, &log_consumption).unwrap();
        assert_relative_eq!(policy.evaluate(-1.8), -1.1, epsilon = 1e-12);
        let capital = (-1.7_f64).exp();
        assert_relative_eq!(
            policy.consumption(capital),
            policy.evaluate(-1.7).exp(),
            epsilon = 1e-12
        );
        let short = DVector::from_vec(vec![-1.2, -1.1]);
        assert!(PolicyFunction::fit(&grid, &short).is_err());
    }
}
