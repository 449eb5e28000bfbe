//! Damped Newton root-finding with finite-difference Jacobians.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{GrowthError, Result};

/// Options controlling the Newton root-finder.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonOptions {
    /// Sup-norm residual tolerance declaring a root found.
    pub tolerance: f64,
    /// Maximum number of Newton updates before giving up.
    pub max_iterations: usize,
    /// Relative base step for central finite differences.
    pub fd_step: f64,
    /// Maximum step halvings when a trial point cannot be evaluated.
    pub max_backtracks: usize,
}

impl Default for NewtonOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 50,
            fd_step: 1e-6,
            max_backtracks: 8,
        }
    }
}

impl NewtonOptions {
    /// Checks that every option lies in its admissible domain.
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(GrowthError::invalid_parameter(
                "tolerance",
                self.tolerance,
            ));
        }
        if self.max_iterations == 0 {
            return Err(GrowthError::invalid_parameter("max_iterations", 0.0));
        }
        if !self.fd_step.is_finite() || self.fd_step <= 0.0 {
            return Err(GrowthError::invalid_parameter("fd_step", self.fd_step));
        }
        Ok(())
    }
}

/// How a Newton solve ended.
#[derive(Clone, Debug, Serialize)]
pub struct NewtonSummary {
    /// Newton updates applied before the tolerance was met.
    pub iterations: usize,
    /// Sup norm of the residual at the returned root.
    pub residual_norm: f64,
}

/// Solves the square system `f(x) = 0` by damped Newton iteration.
///
/// The Jacobian is approximated column-by-column with central finite
/// differences, the columns evaluated in parallel; each linear step is solved
/// by LU factorization. When a trial point cannot be evaluated (the system
/// returns an error or a non-finite value) the step is halved up to
/// `max_backtracks` times before the failure is surfaced.
///
/// The system closure must accept any vector of the initial guess's length
/// and may reject points outside its domain by returning an error.
pub fn solve_system<F>(
    f: F,
    initial: &DVector<f64>,
    options: &NewtonOptions,
) -> Result<(DVector<f64>, NewtonSummary)>
where
    F: Fn(&DVector<f64>) -> Result<DVector<f64>> + Sync,
{
    options.validate()?;
    let mut x = initial.clone();
    let mut fx = evaluate(&f, &x)?;
    if fx.len() != x.len() {
        return Err(GrowthError::dimension_mismatch(
            "root system",
            x.len(),
            fx.len(),
        ));
    }
    for iteration in 0..options.max_iterations {
        let norm = fx.amax();
        if norm < options.tolerance {
            return Ok((
                x,
                NewtonSummary {
                    iterations: iteration,
                    residual_norm: norm,
                },
            ));
        }
        let jacobian = finite_difference_jacobian(&f, &x, options.fd_step)?;
        let delta = jacobian
            .lu()
            .solve(&(-&fx))
            .ok_or(GrowthError::SingularJacobian { iteration })?;
        if delta.iter().any(|v| !v.is_finite()) {
            return Err(GrowthError::numerical("newton step"));
        }
        let mut scale = 1.0;
        for attempt in 0..=options.max_backtracks {
            let candidate = &x + &delta * scale;
            match evaluate(&f, &candidate) {
                Ok(next) => {
                    x = candidate;
                    fx = next;
                    break;
                }
                Err(error) => {
                    if attempt == options.max_backtracks {
                        return Err(error);
                    }
                    scale *= 0.5;
                }
            }
        }
    }
    Err(GrowthError::RootFindDidNotConverge {
        iterations: options.max_iterations,
        residual_norm: fx.amax(),
    })
}

/// Central-difference Jacobian of `f` at `x`, one column per coordinate.
///
/// Each column perturbs its coordinate by `fd_step` scaled to the
/// coordinate's magnitude, with a floor of one so steps never vanish near
/// zero. Columns are independent, so they are evaluated in parallel.
fn finite_difference_jacobian<F>(
    f: &F,
    x: &DVector<f64>,
    fd_step: f64,
) -> Result<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> Result<DVector<f64>> + Sync,
{
    let columns = (0..x.len())
        .into_par_iter()
        .map(|j| {
            let step = fd_step * x[j].abs().max(1.0);
            let mut forward = x.clone();
            forward[j] += step;
            let mut backward = x.clone();
            backward[j] -= step;
            let hi = evaluate(f, &forward)?;
            let lo = evaluate(f, &backward)?;
            Ok((hi - lo) / (2.0 * step))
        })
        .collect::<Result<Vec<DVector<f64>>>>()?;
    Ok(DMatrix::from_columns(&columns))
}

fn evaluate<F>(f: &F, x: &DVector<f64>) -> Result<DVector<f64>>
where
    F: Fn(&DVector<f64>) -> Result<DVector<f64>> + Sync,
{
    let residual = f(x)?;
    if residual.iter().any(|v| !v.is_finite()) {
        return Err(GrowthError::numerical("residual evaluation"));
    }
    Ok(residual)
}
