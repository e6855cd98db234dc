//! # Errors
//!
//! $$
//! \text{Outcome} = \text{Ok}(\mathbf{w}) \mid \text{Err}(\text{kind})
//! $$
//!
//! Typed failure kinds for estimation and optimization. Every solve reports
//! its outcome as a value, so a frontier sweep can drop a single point and
//! keep going while data and feasibility problems abort the whole request.

use std::fmt::Display;

/// Failure kinds reported by the estimation and optimization APIs.
#[derive(Clone, Debug, PartialEq)]
pub enum OptimizeError {
  /// Fewer than two aligned return observations, or an empty asset universe.
  InsufficientData(String),
  /// Weight bounds are incompatible with full investment.
  InfeasibleConstraints(String),
  /// A specific solve did not terminate at a usable optimum.
  NonConvergence(String),
  /// Malformed arguments, e.g. dimension mismatches.
  InvalidInput(String),
}

impl Display for OptimizeError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      OptimizeError::InsufficientData(msg) => write!(f, "insufficient data: {msg}"),
      OptimizeError::InfeasibleConstraints(msg) => write!(f, "infeasible constraints: {msg}"),
      OptimizeError::NonConvergence(msg) => write!(f, "solver did not converge: {msg}"),
      OptimizeError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
    }
  }
}

impl std::error::Error for OptimizeError {}
