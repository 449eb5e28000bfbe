use nalgebra::DVector;
use thiserror::Error;

/// Unified error type for `bmrs` operations.
#[derive(Debug, Error)]
pub enum GrowthError {
    /// Raised when a model or solver parameter lies outside its admissible domain.
    #[error("parameter `{name}` is outside its admissible domain, found {value}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The value that was supplied.
        value: f64,
    },

    /// Raised when supplied vectors disagree with the grid dimension.
    #[error("dimension mismatch in {context}: expected {expected} but found {found}")]
    DimensionMismatch {
        /// Human-readable context describing the operation.
        context: &'static str,
        /// The required dimension, usually the grid size.
        expected: usize,
        /// The dimension that was actually supplied.
        found: usize,
    },

    /// Raised when grid nodes are not strictly increasing.
    #[error("grid nodes must be strictly increasing; node {index} does not exceed its predecessor")]
    NonIncreasingGrid { index: usize },

    /// Raised when a candidate policy implies non-positive next-period capital
    /// at some grid node. The whole candidate is rejected, never clamped.
    #[error(
        "infeasible path at grid node {node}: consumption {consumption} exhausts the output of capital {capital}"
    )]
    InfeasiblePath {
        node: usize,
        capital: f64,
        consumption: f64,
    },

    /// Raised when numerical routines produce NaN or infinity.
    #[error("encountered a non-finite value during {context}")]
    NumericalError { context: &'static str },

    /// Raised when the Newton step system cannot be solved.
    #[error("Jacobian is singular at Newton iteration {iteration}")]
    SingularJacobian { iteration: usize },

    /// Raised when the inner root-finder exhausts its iteration budget.
    #[error(
        "root-finder did not converge after {iterations} iterations; residual norm {residual_norm}"
    )]
    RootFindDidNotConverge {
        /// Number of Newton iterations performed before termination.
        iterations: usize,
        /// Sup-norm of the residual at the last iterate.
        residual_norm: f64,
    },

    /// Raised when the policy iteration reaches its cap without meeting
    /// tolerance. Carries the last candidate and its residual for diagnosis.
    #[error(
        "policy iteration did not converge after {iterations} iterations; max residual {max_residual}"
    )]
    DidNotConverge {
        /// Number of outer iterations performed.
        iterations: usize,
        /// Largest absolute Euler residual at the last candidate.
        max_residual: f64,
        /// The last candidate policy vector (log consumption per node).
        policy: DVector<f64>,
        /// The Euler residual of that candidate under its own interpolant.
        residual: DVector<f64>,
    },
}

impl GrowthError {
    /// Helper to reject a parameter value at construction time.
    pub fn invalid_parameter(name: &'static str, value: f64) -> Self {
        Self::InvalidParameter { name, value }
    }

    /// Helper to format a [`DimensionMismatch`](GrowthError::DimensionMismatch) error.
    pub fn dimension_mismatch(context: &'static str, expected: usize, found: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            found,
        }
    }

    /// Helper to flag a NaN or infinity escaping a numerical routine.
    pub fn numerical(context: &'static str) -> Self {
        Self::NumericalError { context }
    }
}

/// Type alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, GrowthError>;
