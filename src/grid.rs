//! Discretization of the capital state into a strictly increasing log grid.

use crate::error::{GrowthError, Result};
use crate::model::ModelParameters;

/// Default number of grid nodes.
pub const DEFAULT_GRID_NODES: usize = 5;

/// Default half-width of the grid around log steady-state capital.
pub const DEFAULT_GRID_HALF_WIDTH: f64 = 0.2;

/// A strictly increasing grid of log capital stocks.
///
/// The solver works in logs throughout: nodes are `log k` and the policy
/// candidates attached to them are `log c`. A grid always has at least two
/// nodes so that a policy interpolant can be fitted through it.
#[derive(Clone, Debug)]
pub struct CapitalGrid {
    log_nodes: Vec<f64>,
}

impl CapitalGrid {
    /// Builds an evenly spaced grid of `nodes` log-capital points centered on
    /// the model's log steady-state capital, extending `half_width` to each
    /// side.
    pub fn around_steady_state(
        params: &ModelParameters,
        nodes: usize,
        half_width: f64,
    ) -> Result<Self> {
        if nodes < 2 {
            return Err(GrowthError::invalid_parameter("nodes", nodes as f64));
        }
        if !half_width.is_finite() || half_width <= 0.0 {
            return Err(GrowthError::invalid_parameter("half_width", half_width));
        }
        let center = params.steady_state().log_capital();
        let step = 2.0 * half_width / (nodes - 1) as f64;
        let log_nodes = (0..nodes)
            .map(|i| center - half_width + i as f64 * step)
            .collect();
        Ok(Self { log_nodes })
    }

    /// Builds a grid from caller-supplied log-capital nodes.
    ///
    /// The nodes must be finite, strictly increasing, and at least two.
    pub fn from_log_nodes(log_nodes: Vec<f64>) -> Result<Self> {
        if log_nodes.len() < 2 {
            return Err(GrowthError::invalid_parameter(
                "log_nodes",
                log_nodes.len() as f64,
            ));
        }
        if log_nodes.iter().any(|v| !v.is_finite()) {
            return Err(GrowthError::numerical("grid construction"));
        }
        for index in 1..log_nodes.len() {
            if log_nodes[index] <= log_nodes[index - 1] {
                return Err(GrowthError::NonIncreasingGrid { index });
            }
        }
        Ok(Self { log_nodes })
    }

    /// Number of grid nodes.
    pub fn len(&self) -> usize {
        self.log_nodes.len()
    }

    /// Always `false`; a constructed grid has at least two nodes.
    pub fn is_empty(&self) -> bool {
        self.log_nodes.is_empty()
    }

    /// All log-capital nodes in increasing order.
    pub fn log_nodes(&self) -> &[f64] {
        &self.log_nodes
    }

    /// Log capital at node `index`.
    pub fn log_node(&self, index: usize) -> f64 {
        self.log_nodes[index]
    }

    /// Capital level at node `index`.
    pub fn capital(&self, index: usize) -> f64 {
        self.log_nodes[index].exp()
    }

    /// First and last log-capital nodes, the span a fitted policy interpolates
    /// over.
    pub fn log_span(&self) -> (f64, f64) {
        (
            self.log_nodes[0],
            self.log_nodes[self.log_nodes.len() - 1],
        )
    }
}
