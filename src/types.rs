//! # Types
//!
//! $$
//! \mathbf{w}^\*=\arg\max_{\mathbf{w}} \frac{\mathbb E[R_p]-r_f}{\sigma_p}
//! $$
//!
//! Shared enums and result containers for portfolio optimization.

/// Periodic return definition applied to the price matrix.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ReturnMethod {
  /// `ln(P_t / P_{t-1})`
  #[default]
  Log,
  /// `P_t / P_{t-1} - 1`
  Simple,
}

impl ReturnMethod {
  /// Parse a string into a [`ReturnMethod`]; unknown values fall back to log.
  pub fn from_str(s: &str) -> Self {
    match s.to_lowercase().as_str() {
      "simple" | "arithmetic" | "pct" => Self::Simple,
      _ => Self::Log,
    }
  }
}

/// Risk/return profile of a fixed weight vector.
#[derive(Clone, Copy, Debug)]
pub struct PortfolioMetrics {
  /// Annualized expected portfolio return `w . mu`.
  pub expected_return: f64,
  /// Annualized portfolio volatility `sqrt(w' Sigma w)`.
  pub volatility: f64,
  /// Sharpe ratio `(expected_return - risk_free) / volatility`; NaN at zero volatility.
  pub sharpe: f64,
}

/// Output of a portfolio optimization run.
#[derive(Clone, Debug)]
pub struct PortfolioResult {
  /// Final portfolio weights.
  pub weights: Vec<f64>,
  /// Model expected portfolio return (annualized if inputs are annualized).
  pub expected_return: f64,
  /// Model portfolio volatility.
  pub volatility: f64,
  /// Sharpe ratio computed as `(expected_return - risk_free) / volatility`.
  pub sharpe: f64,
}

/// One solved point of the efficient frontier.
///
/// Weights are kept per point so a caller can overlay an externally supplied
/// portfolio against the frontier later.
#[derive(Clone, Debug)]
pub struct FrontierPoint {
  /// Target return the point was solved for.
  pub target_return: f64,
  /// Minimum volatility attainable at the target return.
  pub volatility: f64,
  /// Weights attaining that volatility.
  pub weights: Vec<f64>,
}
