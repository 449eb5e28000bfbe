//! High-level pipeline from model parameters to a solved consumption policy.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{GrowthError, Result};
use crate::euler::solve_policy;
use crate::grid::{CapitalGrid, DEFAULT_GRID_HALF_WIDTH, DEFAULT_GRID_NODES};
use crate::interp::PolicyFunction;
use crate::model::{ModelParameters, SteadyState};
use crate::solving::{IterationOptions, IterationSummary};

/// High-level wrapper bundling model parameters with a capital grid.
#[derive(Clone, Debug)]
pub struct GrowthProblem {
    params: ModelParameters,
    grid: CapitalGrid,
}

impl GrowthProblem {
    /// Pairs validated model parameters with a caller-supplied grid.
    pub fn new(params: ModelParameters, grid: CapitalGrid) -> Self {
        Self { params, grid }
    }

    /// Builds a problem on the default grid centered at the steady state.
    pub fn standard(params: ModelParameters) -> Result<Self> {
        let grid = CapitalGrid::around_steady_state(
            &params,
            DEFAULT_GRID_NODES,
            DEFAULT_GRID_HALF_WIDTH,
        )?;
        Ok(Self { params, grid })
    }

    /// Accessor for the model parameters.
    pub fn params(&self) -> &ModelParameters {
        &self.params
    }

    /// Accessor for the capital grid.
    pub fn grid(&self) -> &CapitalGrid {
        &self.grid
    }

    /// Solves for the consumption policy with default options.
    pub fn solve(&self) -> Result<PolicySolution> {
        self.solve_with_options(&SolveOptions::default())
    }

    /// Solves for the consumption policy under caller-supplied options.
    pub fn solve_with_options(&self, options: &SolveOptions) -> Result<PolicySolution> {
        let initial = options.initial_guess.resolve(&self.params, &self.grid)?;
        let converged = solve_policy(&self.params, &self.grid, &initial, &options.iteration)?;
        let interpolant = PolicyFunction::fit(&self.grid, &converged.policy)?;
        Ok(PolicySolution {
            policy: converged.policy,
            residual: converged.residual,
            summary: converged.summary,
            steady_state: self.params.steady_state(),
            interpolant,
        })
    }
}

/// Configuration knobs for a policy solve.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveOptions {
    /// Starting policy handed to the iteration.
    pub initial_guess: InitialGuess,
    /// Options for the outer policy iteration and inner root-finder.
    pub iteration: IterationOptions,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            initial_guess: InitialGuess::AnalyticLogLinear,
            iteration: IterationOptions::default(),
        }
    }
}

impl SolveOptions {
    /// Overrides the initial guess while keeping other defaults.
    pub fn with_initial_guess(mut self, initial_guess: InitialGuess) -> Self {
        self.initial_guess = initial_guess;
        self
    }

    /// Overrides the iteration options.
    pub fn with_iteration(mut self, iteration: IterationOptions) -> Self {
        self.iteration = iteration;
        self
    }
}

/// Starting policies for the iteration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum InitialGuess {
    /// The closed-form log-utility policy; exact when curvature is one and a
    /// warm start otherwise.
    AnalyticLogLinear,
    /// Steady-state consumption with a gentle tilt in log capital.
    SteadyStateAnchored,
    /// A custom vector of log consumption, one entry per grid node.
    Custom(DVector<f64>),
}

impl InitialGuess {
    fn resolve(&self, params: &ModelParameters, grid: &CapitalGrid) -> Result<DVector<f64>> {
        match self {
            Self::AnalyticLogLinear => {
                let level = (1.0 - params.alpha() * params.beta()).ln();
                Ok(DVector::from_iterator(
                    grid.len(),
                    grid.log_nodes().iter().map(|k| level + params.alpha() * k),
                ))
            }
            Self::SteadyStateAnchored => {
                let ss = params.steady_state();
                let (log_css, log_kss) = (ss.log_consumption(), ss.log_capital());
                Ok(DVector::from_iterator(
                    grid.len(),
                    grid.log_nodes()
                        .iter()
                        .map(|k| log_css + 0.01 * (k - log_kss)),
                ))
            }
            Self::Custom(guess) => {
                if guess.len() != grid.len() {
                    return Err(GrowthError::dimension_mismatch(
                        "custom guess length",
                        grid.len(),
                        guess.len(),
                    ));
                }
                Ok(guess.clone())
            }
        }
    }
}

/// Describes the result of a policy solve.
#[derive(Clone, Debug, Serialize)]
pub struct PolicySolution {
    /// Log consumption at each grid node.
    pub policy: DVector<f64>,
    /// Euler residual of the accepted policy under its own interpolant.
    pub residual: DVector<f64>,
    /// Diagnostics from the policy iteration.
    pub summary: IterationSummary,
    /// The deterministic steady state of the solved model.
    pub steady_state: SteadyState,
    #[serde(skip)]
    interpolant: PolicyFunction,
}

impl PolicySolution {
    /// Largest absolute Euler residual at the accepted policy.
    pub fn max_residual(&self) -> f64 {
        self.summary.max_residual
    }

    /// Log consumption prescribed at a log capital stock.
    pub fn log_consumption_at(&self, log_capital: f64) -> f64 {
        self.interpolant.evaluate(log_capital)
    }

    /// Consumption level prescribed at a capital level.
    pub fn consumption_at(&self, capital: f64) -> f64 {
        self.interpolant.consumption(capital)
    }

    /// The solved policy as an interpolant over the capital grid.
    pub fn interpolant(&self) -> &PolicyFunction {
        &self.interpolant
    }
}
