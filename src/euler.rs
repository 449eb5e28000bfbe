//! Euler-equation residuals and the policy time-iteration solver.

use nalgebra::DVector;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::{GrowthError, Result};
use crate::grid::CapitalGrid;
use crate::interp::PolicyFunction;
use crate::model::ModelParameters;
use crate::newton::solve_system;
use crate::solving::{ConvergedPolicy, IterationOptions, IterationSummary};

/// Computes the Euler-equation residual at every grid node for a candidate
/// log-consumption vector, reading continuation consumption off `policy`.
///
/// At node `i` the candidate consumes `exp(candidate[i])` out of the output
/// of the node's capital stock, carries the remainder forward, and the
/// residual measures how far discounted marginal returns are from equalizing
/// marginal utility across the two periods. A candidate that consumes at
/// least the entire output at some node has no feasible continuation and is
/// rejected.
pub fn euler_residual(
    params: &ModelParameters,
    grid: &CapitalGrid,
    policy: &PolicyFunction,
    candidate: &DVector<f64>,
) -> Result<DVector<f64>> {
    let n = grid.len();
    if candidate.len() != n {
        return Err(GrowthError::dimension_mismatch(
            "candidate length",
            n,
            candidate.len(),
        ));
    }

    let mut residual = DVector::zeros(n);
    for node in 0..n {
        let capital = grid.capital(node);
        let consumption = candidate[node].exp();
        let next_capital = params.next_capital(capital, consumption);
        if !next_capital.is_finite() || next_capital <= 0.0 {
            return Err(GrowthError::InfeasiblePath {
                node,
                capital,
                consumption,
            });
        }

        let next_consumption = policy.evaluate(next_capital.ln()).exp();
        let gross_return = params.alpha() * next_capital.powf(params.alpha() - 1.0);
        let ratio =
            params.marginal_utility(next_consumption) / params.marginal_utility(consumption);
        let value = params.beta() * ratio * gross_return - 1.0;
        if !value.is_finite() {
            return Err(GrowthError::numerical("euler residual"));
        }
        residual[node] = value;
    }

    Ok(residual)
}

/// Solves for the consumption policy by time iteration on the Euler equation.
///
/// Each pass freezes the interpolant fitted through the current candidate,
/// root-finds the candidate that zeroes the residual under it, refits the
/// interpolant through the solution, and re-evaluates the residual under the
/// refit. The iteration accepts once that residual is below tolerance in
/// supremum norm; candidate, interpolant, and residual are replaced wholesale
/// every pass. An initial guess that already passes the acceptance test
/// returns with zero iterations.
pub fn solve_policy(
    params: &ModelParameters,
    grid: &CapitalGrid,
    initial: &DVector<f64>,
    options: &IterationOptions,
) -> Result<ConvergedPolicy> {
    options.validate()?;
    if initial.len() != grid.len() {
        return Err(GrowthError::dimension_mismatch(
            "initial policy length",
            grid.len(),
            initial.len(),
        ));
    }

    let mut state = IterationState::fit(params, grid, initial.clone())?;
    let mut iteration = 0usize;

    while state.max_residual() >= options.tolerance {
        if iteration == options.max_iterations {
            let max_residual = state.max_residual();
            return Err(GrowthError::DidNotConverge {
                iterations: iteration,
                max_residual,
                policy: state.candidate,
                residual: state.residual,
            });
        }
        iteration += 1;

        let solved = solve_inner(
            params,
            grid,
            &state.interpolant,
            &state.candidate,
            options,
            iteration,
        )?;
        state = IterationState::fit(params, grid, solved)?;
        log::debug!(
            "policy iteration {} max residual {:e}",
            iteration,
            state.max_residual()
        );
    }

    let max_residual = state.max_residual();
    Ok(ConvergedPolicy {
        policy: state.candidate,
        residual: state.residual,
        summary: IterationSummary {
            iterations: iteration,
            max_residual,
        },
    })
}

/// Loop state: a candidate, its fitted interpolant, and its residual under
/// that interpolant. Rebuilt wholesale each iteration, never mutated in place.
struct IterationState {
    candidate: DVector<f64>,
    interpolant: PolicyFunction,
    residual: DVector<f64>,
}

impl IterationState {
    fn fit(params: &ModelParameters, grid: &CapitalGrid, candidate: DVector<f64>) -> Result<Self> {
        let interpolant = PolicyFunction::fit(grid, &candidate)?;
        let residual = euler_residual(params, grid, &interpolant, &candidate)?;
        Ok(Self {
            candidate,
            interpolant,
            residual,
        })
    }

    fn max_residual(&self) -> f64 {
        self.residual.amax()
    }
}

/// One inner root-find, retried from a perturbed guess when it fails.
fn solve_inner(
    params: &ModelParameters,
    grid: &CapitalGrid,
    interpolant: &PolicyFunction,
    guess: &DVector<f64>,
    options: &IterationOptions,
    iteration: usize,
) -> Result<DVector<f64>> {
    let system = |x: &DVector<f64>| euler_residual(params, grid, interpolant, x);
    let mut attempt = 0usize;
    loop {
        let start = if attempt == 0 {
            guess.clone()
        } else {
            perturbed_guess(guess, options, iteration, attempt)
        };
        match solve_system(&system, &start, &options.newton) {
            Ok((solved, _)) => return Ok(solved),
            Err(error) if attempt < options.guess_retries => {
                attempt += 1;
                log::warn!(
                    "inner solve failed at policy iteration {} ({}); retrying from a perturbed guess ({}/{})",
                    iteration,
                    error,
                    attempt,
                    options.guess_retries
                );
            }
            Err(error) => return Err(error),
        }
    }
}

/// Adds seeded Gaussian noise to a guess so retries are reproducible.
fn perturbed_guess(
    guess: &DVector<f64>,
    options: &IterationOptions,
    iteration: usize,
    attempt: usize,
) -> DVector<f64> {
    let seed = options
        .retry_seed
        .wrapping_add((iteration as u64) << 32)
        .wrapping_add(attempt as u64);
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut perturbed = guess.clone();
    for value in perturbed.iter_mut() {
        let shock: f64 = StandardNormal.sample(&mut rng);
        *value += options.retry_scale * shock;
    }
    perturbed
}
