//! Model primitives: technology, preferences, and the deterministic steady state.

use serde::Serialize;

use crate::error::{GrowthError, Result};

/// Parameters of the Brock–Mirman optimal growth model.
///
/// `alpha` is the capital share of the Cobb–Douglas technology `k^alpha`,
/// `beta` the discount factor, and `nu` the curvature of CRRA marginal
/// utility `c^(-nu)`. [`ModelParameters::new`] fixes `nu = 1` (log utility),
/// the case with a known closed-form policy;
/// [`with_curvature`](ModelParameters::with_curvature) opts into general CRRA
/// preferences.
///
/// Instances are immutable and validated once at construction; invalid values
/// are rejected, never clamped.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ModelParameters {
    alpha: f64,
    beta: f64,
    nu: f64,
}

impl ModelParameters {
    /// Creates log-utility model parameters, requiring `alpha` and `beta`
    /// strictly inside the unit interval.
    pub fn new(alpha: f64, beta: f64) -> Result<Self> {
        check_unit_interval("alpha", alpha)?;
        check_unit_interval("beta", beta)?;
        Ok(Self {
            alpha,
            beta,
            nu: 1.0,
        })
    }

    /// Replaces the utility curvature, opting into general CRRA preferences.
    ///
    /// The Euler residual uses the marginal-utility ratio, so any `nu > 0` is
    /// admissible; the analytic log-linear policy only exists for `nu = 1`.
    pub fn with_curvature(mut self, nu: f64) -> Result<Self> {
        if !nu.is_finite() || nu <= 0.0 {
            return Err(GrowthError::invalid_parameter("nu", nu));
        }
        self.nu = nu;
        Ok(self)
    }

    /// Capital share of the production technology.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Discount factor.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Curvature of marginal utility (`1` means log utility).
    pub fn curvature(&self) -> f64 {
        self.nu
    }

    /// Output produced from a capital stock: `capital^alpha`.
    ///
    /// The technology fully depreciates capital within the period, so output
    /// is the entire resource available for consumption and next-period
    /// capital. Domain: `capital > 0`.
    pub fn production(&self, capital: f64) -> f64 {
        capital.powf(self.alpha)
    }

    /// Capital carried into the next period: output minus consumption.
    ///
    /// The result can be non-positive when consumption exceeds output; callers
    /// must treat that as an infeasible state rather than taking its log.
    pub fn next_capital(&self, capital: f64, consumption: f64) -> f64 {
        self.production(capital) - consumption
    }

    /// Consumption implied by a capital transition: output minus next capital.
    ///
    /// Inverse relation of [`next_capital`](Self::next_capital).
    pub fn consumption(&self, capital_now: f64, capital_next: f64) -> f64 {
        self.production(capital_now) - capital_next
    }

    /// CRRA marginal utility `consumption^(-nu)`. Domain: `consumption > 0`.
    pub fn marginal_utility(&self, consumption: f64) -> f64 {
        consumption.powf(-self.nu)
    }

    /// Closed-form deterministic steady state of the capital transition.
    ///
    /// `kss = (alpha * beta)^(1 / (1 - alpha))` and `css = kss^alpha - kss`.
    /// Both are strictly positive for any parameters accepted by
    /// [`ModelParameters::new`], so no further checks are needed here.
    pub fn steady_state(&self) -> SteadyState {
        let capital = (self.alpha * self.beta).powf(1.0 / (1.0 - self.alpha));
        let consumption = self.production(capital) - capital;
        SteadyState {
            capital,
            consumption,
        }
    }
}

/// The capital/consumption pair at which the capital stock repeats itself.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SteadyState {
    /// Capital stock that the transition maps onto itself.
    pub capital: f64,
    /// Consumption that holds the capital stock at that level.
    pub consumption: f64,
}

impl SteadyState {
    /// Natural log of the steady-state capital stock.
    pub fn log_capital(&self) -> f64 {
        self.capital.ln()
    }

    /// Natural log of the steady-state consumption level.
    pub fn log_consumption(&self) -> f64 {
        self.consumption.ln()
    }
}

fn check_unit_interval(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 || value >= 1.0 {
        return Err(GrowthError::invalid_parameter(name, value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn constructor_rejects_out_of_domain_parameters() {
        assert!(ModelParameters::new(1.0, 0.96).is_err());
        assert!(ModelParameters::new(0.33, 0.0).is_err());
        assert!(ModelParameters::new(f64::NAN, 0.96).is_err());
        let params = ModelParameters::new(0.33, 0.96).unwrap();
        assert!(params.with_curvature(-2.0).is_err());
        assert!(params.with_curvature(0.0).is_err());
    }

    #[test]
    fn steady_state_is_a_fixed_point_of_the_transition() {
        for (alpha, beta) in [(0.33, 0.96), (0.5, 0.9), (0.2, 0.99), (0.7, 0.5)] {
            let params = ModelParameters::new(alpha, beta).unwrap();
            let ss = params.steady_state();
            assert!(ss.capital > 0.0 && ss.consumption > 0.0);
            assert_relative_eq!(
                params.next_capital(ss.capital, ss.consumption),
                ss.capital,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn production_is_strictly_increasing_in_capital() {
        let params = ModelParameters::new(0.33, 0.96).unwrap();
        let mut prev = params.production(0.05);
        for step in 1..50 {
            let capital = 0.05 + step as f64 * 0.1;
            let output = params.production(capital);
            assert!(output > prev);
            prev = output;
        }
    }

    #[test]
    fn consumption_inverts_the_capital_transition() {
        let params = ModelParameters::new(0.33, 0.96).unwrap();
        let capital = 0.2;
        let consumption = 0.3;
        let next = params.next_capital(capital, consumption);
        assert_relative_eq!(
            params.consumption(capital, next),
            consumption,
            epsilon = 1e-12
        );
    }

    #[test]
    fn log_utility_marginal_utility_is_reciprocal_consumption() {
        let params = ModelParameters::new(0.33, 0.96).unwrap();
        assert_relative_eq!(params.marginal_utility(0.4), 1.0 / 0.4, epsilon = 1e-12);
        let crra = params.with_curvature(2.0).unwrap();
        assert_relative_eq!(crra.marginal_utility(0.4), 0.4_f64.powf(-2.0), epsilon = 1e-12);
    }
}
