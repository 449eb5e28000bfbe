//! Policy-iteration configuration and diagnostics.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{GrowthError, Result};
use crate::newton::NewtonOptions;

/// Configuration for the outer policy iteration that solves the Euler
/// equation on the grid.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IterationOptions {
    /// Supremum norm tolerance on the Euler residual for convergence.
    pub tolerance: f64,
    /// Maximum number of outer iterations allowed before aborting.
    pub max_iterations: usize,
    /// Options forwarded to the inner Newton root-finder.
    pub newton: NewtonOptions,
    /// Extra inner-solve attempts from a perturbed guess after a failure.
    pub guess_retries: usize,
    /// Standard deviation of the log-consumption perturbation per retry.
    pub retry_scale: f64,
    /// Seed for the retry perturbations, so reruns are reproducible.
    pub retry_seed: u64,
}

impl Default for IterationOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 100,
            newton: NewtonOptions::default(),
            guess_retries: 0,
            retry_scale: 1e-2,
            retry_seed: 0,
        }
    }
}

impl IterationOptions {
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
        if !self.retry_scale.is_finite() || self.retry_scale <= 0.0 {
            return Err(GrowthError::invalid_parameter(
                "retry_scale",
                self.retry_scale,
            ));
        }
        self.newton.validate()
    }
}

/// Diagnostics returned alongside a converged policy.
#[derive(Clone, Debug, Serialize)]
pub struct IterationSummary {
    /// Number of outer iterations performed.
    pub iterations: usize,
    /// Maximum absolute Euler residual at acceptance.
    pub max_residual: f64,
}

/// A policy that passed the Euler-residual acceptance test.
#[derive(Clone, Debug, Serialize)]
pub struct ConvergedPolicy {
    /// Log consumption at each grid node.
    pub policy: DVector<f64>,
    /// Euler residual of the policy under its own fitted interpolant.
    pub residual: DVector<f64>,
    /// How the iteration got there.
    pub summary: IterationSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_admissible() {
        let options = IterationOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.max_iterations, 100);
        assert_eq!(options.guess_retries, 0);
    }

    #[test]
    fn validation_rejects_out_of_domain_fields() {
        let mut options = IterationOptions::default();
        options.tolerance = 0.0;
        assert!(options.validate().is_err());

        let mut options = IterationOptions::default();
        options.max_iterations = 0;
        assert!(options.validate().is_err());

        let mut options = IterationOptions::default();
        options.newton.fd_step = f64::NAN;
        assert!(options.validate().is_err());
    }

    #[test]
    fn partial_json_fills_missing_fields_with_defaults() {
        let options: IterationOptions =
            serde_json::from_str(r#"{"tolerance": 1e-8, "newton": {"max_iterations": 25}}"#)
                .unwrap();
        assert_eq!(options.tolerance, 1e-8);
        assert_eq!(options.newton.max_iterations, 25);
        assert_eq!(options.newton.max_backtracks, NewtonOptions::default().max_backtracks);
        assert_eq!(options.max_iterations, 100);
    }
}
