//! Numerical solution of the Brock–Mirman optimal growth model.
//!
//! This crate solves the deterministic single-agent optimal growth model with
//! Cobb–Douglas production and full depreciation by time iteration on the
//! Euler equation. It offers tools to
//!
//! - describe technology and preferences (`model` module),
//! - discretize the capital state in logs (`grid` module),
//! - interpolate consumption policies with natural cubic splines (`interp` module),
//! - root-find square nonlinear systems (`newton` module),
//! - iterate the Euler equation to a fixed point (`euler` module), and
//! - assemble a one-call solver (`problem` module).
//!
//! The implementation focuses on clarity and extensibility. Heavy inline
//! documentation and unit tests illustrate the essential ingredients of
//! projection methods: grid construction, spline interpolation, Newton
//! root-finding, and fixed-point acceptance. Under log utility the model has
//! a closed-form policy, which anchors the test suite end to end.
//!
//! # Quick start
//!
//! ```no_run
//! use bmrs::model::ModelParameters;
//! use bmrs::{GrowthProblem, InitialGuess, SolveOptions};
//!
//! let params = ModelParameters::new(0.33, 0.96).expect("valid parameters");
//! let problem = GrowthProblem::standard(params).expect("grid around the steady state");
//!
//! let options = SolveOptions::default().with_initial_guess(InitialGuess::SteadyStateAnchored);
//! let solution = problem.solve_with_options(&options).expect("converged");
//! println!(
//!     "max Euler residual {:.2e} after {} iterations",
//!     solution.max_residual(),
//!     solution.summary.iterations
//! );
//! for (node, log_k) in problem.grid().log_nodes().iter().enumerate() {
//!     println!("log k = {log_k:+.4}  log c = {:+.4}", solution.policy[node]);
//! }
//! ```
//!
//! The crate is still under heavy development. Stochastic productivity,
//! value-function methods, and adaptive grid refinement are tracked in the
//! public roadmap.

pub mod error;
pub mod euler;
pub mod grid;
pub mod interp;
pub mod model;
pub mod newton;
pub mod problem;
pub mod solving;

pub use problem::{GrowthProblem, InitialGuess, PolicySolution, SolveOptions};
pub use solving::{ConvergedPolicy, IterationOptions, IterationSummary};
