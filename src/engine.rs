//! # Portfolio Engine
//!
//! $$
//! \text{prices} \to (\hat\mu, \hat\Sigma) \to
//! \{\mathbf{w}_{\min\sigma}, \mathbf{w}_{\max SR}, \text{frontier}\}
//! $$
//!
//! High-level orchestration for a full optimization request. The engine is
//! a thin stateless wrapper: nothing is cached between calls, and price
//! sourcing stays with the caller.

use ndarray::Array2;

use crate::error::OptimizeError;
use crate::frontier::efficient_frontier;
use crate::frontier::DEFAULT_FRONTIER_DENSITY;
use crate::performance::portfolio_performance;
use crate::returns::estimate_returns;
use crate::returns::ReturnEstimates;
use crate::solver::check_bounds;
use crate::solver::optimize_max_sharpe;
use crate::solver::optimize_min_variance;
use crate::types::FrontierPoint;
use crate::types::PortfolioMetrics;
use crate::types::PortfolioResult;
use crate::types::ReturnMethod;

/// Runtime configuration for [`PortfolioEngine`].
#[derive(Clone, Debug)]
pub struct PortfolioEngineConfig {
  /// Periodic return definition applied to the price matrix.
  pub return_method: ReturnMethod,
  /// Annualization factor (252 trading days by default).
  pub periods_per_year: f64,
  /// Annualized risk-free rate used in Sharpe computations.
  pub risk_free: f64,
  /// Number of frontier targets.
  pub frontier_density: usize,
  /// Per-asset `(lower, upper)` weight bounds; `None` means long-only `[0, 1]`.
  pub bounds: Option<Vec<(f64, f64)>>,
}

impl Default for PortfolioEngineConfig {
  fn default() -> Self {
    Self {
      return_method: ReturnMethod::Log,
      periods_per_year: 252.0,
      risk_free: 0.0,
      frontier_density: DEFAULT_FRONTIER_DENSITY,
      bounds: None,
    }
  }
}

/// Everything a presentation layer needs from one optimization request.
///
/// The two standalone portfolios are independent solves: one failing to
/// converge leaves the other (and the frontier) intact, so each is carried
/// as its own outcome value.
#[derive(Clone, Debug)]
pub struct OptimizationReport {
  /// Annualized statistics the request was solved against.
  pub estimates: ReturnEstimates,
  /// Minimum-variance portfolio, or why that solve failed.
  pub min_variance: Result<PortfolioResult, OptimizeError>,
  /// Maximum-Sharpe portfolio, or why that solve failed.
  pub max_sharpe: Result<PortfolioResult, OptimizeError>,
  /// Efficient frontier; may hold fewer points than requested.
  pub frontier: Vec<FrontierPoint>,
  /// Metrics of the externally supplied weights, when given.
  pub current: Option<PortfolioMetrics>,
}

/// Single entry-point engine for full optimization requests.
#[derive(Clone, Debug)]
pub struct PortfolioEngine {
  config: PortfolioEngineConfig,
}

impl PortfolioEngine {
  /// Construct a new engine with explicit configuration.
  pub fn new(config: PortfolioEngineConfig) -> Self {
    Self { config }
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &PortfolioEngineConfig {
    &self.config
  }

  fn resolve_bounds(&self, n: usize) -> Vec<(f64, f64)> {
    match &self.config.bounds {
      Some(b) => b.clone(),
      None => vec![(0.0, 1.0); n],
    }
  }

  /// Run the full request: estimate statistics, solve the two standalone
  /// portfolios, sweep the frontier, and evaluate optional current holdings.
  ///
  /// Data and feasibility problems abort the whole request; a solver that
  /// fails to converge only marks its own field. The call is synchronous
  /// and CPU-bound; an interactive caller should wrap it in its own
  /// timeout or cancellation.
  pub fn analyze(
    &self,
    prices: &Array2<f64>,
    current: Option<&[f64]>,
  ) -> Result<OptimizationReport, OptimizeError> {
    let estimates = estimate_returns(
      prices,
      self.config.return_method,
      self.config.periods_per_year,
    )?;
    let n = estimates.mu.len();
    let bounds = self.resolve_bounds(n);
    check_bounds(n, &bounds)?;

    let risk_free = self.config.risk_free;
    let min_variance = optimize_min_variance(&estimates.mu, &estimates.sigma, &bounds, risk_free);
    let max_sharpe = optimize_max_sharpe(&estimates.mu, &estimates.sigma, &bounds, risk_free);
    let frontier = efficient_frontier(
      &estimates.mu,
      &estimates.sigma,
      &bounds,
      risk_free,
      self.config.frontier_density,
    )?;

    let current = match current {
      Some(w) => {
        if w.len() != n {
          return Err(OptimizeError::InvalidInput(format!(
            "current portfolio has {} weights, expected {n}",
            w.len()
          )));
        }
        Some(portfolio_performance(
          w,
          &estimates.mu,
          &estimates.sigma,
          risk_free,
        ))
      }
      None => None,
    };

    Ok(OptimizationReport {
      estimates,
      min_variance,
      max_sharpe,
      frontier,
      current,
    })
  }

  /// Minimum-variance solve against already-estimated statistics.
  pub fn min_variance(&self, est: &ReturnEstimates) -> Result<PortfolioResult, OptimizeError> {
    let bounds = self.resolve_bounds(est.mu.len());
    optimize_min_variance(&est.mu, &est.sigma, &bounds, self.config.risk_free)
  }

  /// Maximum-Sharpe solve against already-estimated statistics.
  pub fn max_sharpe(&self, est: &ReturnEstimates) -> Result<PortfolioResult, OptimizeError> {
    let bounds = self.resolve_bounds(est.mu.len());
    optimize_max_sharpe(&est.mu, &est.sigma, &bounds, self.config.risk_free)
  }

  /// Frontier sweep against already-estimated statistics.
  pub fn frontier(&self, est: &ReturnEstimates) -> Result<Vec<FrontierPoint>, OptimizeError> {
    let bounds = self.resolve_bounds(est.mu.len());
    efficient_frontier(
      &est.mu,
      &est.sigma,
      &bounds,
      self.config.risk_free,
      self.config.frontier_density,
    )
  }

  /// Metrics of an externally supplied weight vector.
  pub fn evaluate(&self, est: &ReturnEstimates, weights: &[f64]) -> PortfolioMetrics {
    portfolio_performance(weights, &est.mu, &est.sigma, self.config.risk_free)
  }
}
