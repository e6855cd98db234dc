//! # Constrained Optimizers
//!
//! $$
//! \min_{\mathbf{w}} \ \mathbf{w}^\top \Sigma \mathbf{w}
//! \quad \text{s.t.} \quad \sum_i w_i = 1,\ l_i \le w_i \le u_i
//! $$
//!
//! Minimum-variance, maximum-Sharpe and target-return solves under full
//! investment and per-asset box bounds. The Nelder-Mead search runs over an
//! unconstrained parameter vector that is projected onto the feasible set
//! before every cost evaluation, so reported weights are always feasible.

use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::solver::neldermead::NelderMead;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;

use crate::error::OptimizeError;
use crate::performance::portfolio_performance;
use crate::types::PortfolioResult;

const SUM_TOL: f64 = 1e-9;
const SD_TOLERANCE: f64 = 1e-12;
const MAX_ITERS: u64 = 10_000;
/// Objective value substituted when a candidate's volatility is numerically
/// zero, steering the search away from degenerate portfolios.
const DEGENERATE_VOL_PENALTY: f64 = 1e6;
/// Weight of the quadratic penalty binding `w . mu` to a target return.
const RETURN_PENALTY: f64 = 1e6;
/// Acceptance tolerance on `|w . mu - target|` after a target-return solve.
pub(crate) const TARGET_RETURN_TOL: f64 = 1e-3;

/// Validate per-asset `(lower, upper)` bounds against the full-investment
/// constraint `sum(w) = 1`.
pub fn check_bounds(n: usize, bounds: &[(f64, f64)]) -> Result<(), OptimizeError> {
  if bounds.len() != n {
    return Err(OptimizeError::InvalidInput(format!(
      "expected {n} bound pairs, got {}",
      bounds.len()
    )));
  }

  let mut lower_sum = 0.0;
  let mut upper_sum = 0.0;
  for (i, &(lo, hi)) in bounds.iter().enumerate() {
    if !lo.is_finite() || !hi.is_finite() {
      return Err(OptimizeError::InvalidInput(format!(
        "bounds for asset {i} are not finite"
      )));
    }
    if lo > hi {
      return Err(OptimizeError::InfeasibleConstraints(format!(
        "asset {i} has lower bound {lo} above upper bound {hi}"
      )));
    }
    lower_sum += lo;
    upper_sum += hi;
  }

  if lower_sum > 1.0 + SUM_TOL {
    return Err(OptimizeError::InfeasibleConstraints(format!(
      "lower bounds sum to {lower_sum:.6}, above full investment"
    )));
  }
  if upper_sum < 1.0 - SUM_TOL {
    return Err(OptimizeError::InfeasibleConstraints(format!(
      "upper bounds sum to {upper_sum:.6}, below full investment"
    )));
  }

  Ok(())
}

/// Euclidean projection onto `{w : sum(w) = 1, l <= w <= u}`.
///
/// Solves `w_i = clamp(x_i - lambda, l_i, u_i)` for the shift `lambda` that
/// makes the weights sum to one. The sum is non-increasing in `lambda` and
/// the bracket covers `[sum(l), sum(u)]`, so bisection always lands on the
/// root. Requires bounds already validated by [`check_bounds`].
fn project_capped_simplex(x: &[f64], bounds: &[(f64, f64)]) -> Vec<f64> {
  let x_min = x.iter().cloned().fold(f64::INFINITY, f64::min);
  let x_max = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
  let l_min = bounds.iter().map(|b| b.0).fold(f64::INFINITY, f64::min);
  let u_max = bounds.iter().map(|b| b.1).fold(f64::NEG_INFINITY, f64::max);

  // at `lo` every weight clamps to its upper bound, at `hi` to its lower
  let mut lo = x_min - u_max;
  let mut hi = x_max - l_min;
  for _ in 0..100 {
    let mid = 0.5 * (lo + hi);
    let sum: f64 = x
      .iter()
      .zip(bounds.iter())
      .map(|(&xi, &(l, u))| (xi - mid).clamp(l, u))
      .sum();
    if sum > 1.0 {
      lo = mid;
    } else {
      hi = mid;
    }
  }

  let lambda = 0.5 * (lo + hi);
  let mut w: Vec<f64> = x
    .iter()
    .zip(bounds.iter())
    .map(|(&xi, &(l, u))| (xi - lambda).clamp(l, u))
    .collect();

  // spread any residual across strictly interior coordinates
  let residual = 1.0 - w.iter().sum::<f64>();
  if residual.abs() > 1e-12 {
    let free: Vec<usize> = (0..w.len())
      .filter(|&i| w[i] > bounds[i].0 + 1e-12 && w[i] < bounds[i].1 - 1e-12)
      .collect();
    if !free.is_empty() {
      let share = residual / free.len() as f64;
      for &i in &free {
        w[i] = (w[i] + share).clamp(bounds[i].0, bounds[i].1);
      }
    }
  }

  w
}

fn validate_problem(
  mu: &Array1<f64>,
  sigma: &Array2<f64>,
  bounds: &[(f64, f64)],
) -> Result<(), OptimizeError> {
  let n = mu.len();
  if n == 0 {
    return Err(OptimizeError::InsufficientData(
      "asset universe is empty".into(),
    ));
  }
  if sigma.nrows() != n || sigma.ncols() != n {
    return Err(OptimizeError::InvalidInput(format!(
      "covariance is {}x{}, expected {n}x{n}",
      sigma.nrows(),
      sigma.ncols()
    )));
  }
  check_bounds(n, bounds)
}

/// Run Nelder-Mead from the uniform-weight start and return the best
/// parameter vector found.
fn run_solver<C>(cost: C, n: usize) -> Result<Vec<f64>, OptimizeError>
where
  C: CostFunction<Param = Vec<f64>, Output = f64>,
{
  let x0 = vec![1.0 / n as f64; n];
  let mut simplex = Vec::with_capacity(n + 1);
  simplex.push(x0.clone());
  for i in 0..n {
    let mut point = x0.clone();
    point[i] += 1.0;
    simplex.push(point);
  }

  let solver = NelderMead::new(simplex)
    .with_sd_tolerance(SD_TOLERANCE)
    .map_err(|e| OptimizeError::NonConvergence(e.to_string()))?;

  let res = Executor::new(cost, solver)
    .configure(|state| state.max_iters(MAX_ITERS))
    .run()
    .map_err(|e| OptimizeError::NonConvergence(e.to_string()))?;

  res
    .state
    .best_param
    .ok_or_else(|| OptimizeError::NonConvergence("solver produced no parameter".into()))
}

fn result_from_weights(
  weights: Vec<f64>,
  mu: &Array1<f64>,
  sigma: &Array2<f64>,
  risk_free: f64,
) -> PortfolioResult {
  let metrics = portfolio_performance(&weights, mu, sigma, risk_free);
  PortfolioResult {
    weights,
    expected_return: metrics.expected_return,
    volatility: metrics.volatility,
    sharpe: metrics.sharpe,
  }
}

/// Minimum-variance portfolio under full investment and box bounds.
///
/// The objective is convex over a convex feasible set, so the local optimum
/// reached from the uniform start is the global one.
pub fn optimize_min_variance(
  mu: &Array1<f64>,
  sigma: &Array2<f64>,
  bounds: &[(f64, f64)],
  risk_free: f64,
) -> Result<PortfolioResult, OptimizeError> {
  validate_problem(mu, sigma, bounds)?;
  let n = mu.len();
  if n == 1 {
    return Ok(result_from_weights(vec![1.0], mu, sigma, risk_free));
  }

  struct MinVarCost {
    sigma: Array2<f64>,
    bounds: Vec<(f64, f64)>,
  }

  impl CostFunction for MinVarCost {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
      let w = project_capped_simplex(x, &self.bounds);
      let wv = ArrayView1::from(w.as_slice());
      Ok(wv.dot(&self.sigma.dot(&wv)))
    }
  }

  let cost = MinVarCost {
    sigma: sigma.clone(),
    bounds: bounds.to_vec(),
  };

  let best_x = run_solver(cost, n)?;
  let w = project_capped_simplex(&best_x, bounds);
  Ok(result_from_weights(w, mu, sigma, risk_free))
}

/// Maximum-Sharpe portfolio under full investment and box bounds.
///
/// The Sharpe objective is not convex in general, so the single solve from
/// the uniform start yields a local optimum that is accepted as the result.
/// Candidates with numerically zero volatility receive a large finite
/// penalty instead of a division by zero.
pub fn optimize_max_sharpe(
  mu: &Array1<f64>,
  sigma: &Array2<f64>,
  bounds: &[(f64, f64)],
  risk_free: f64,
) -> Result<PortfolioResult, OptimizeError> {
  validate_problem(mu, sigma, bounds)?;
  let n = mu.len();
  if n == 1 {
    return Ok(result_from_weights(vec![1.0], mu, sigma, risk_free));
  }

  struct SharpeCost {
    mu: Array1<f64>,
    sigma: Array2<f64>,
    bounds: Vec<(f64, f64)>,
    risk_free: f64,
  }

  impl CostFunction for SharpeCost {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
      let w = project_capped_simplex(x, &self.bounds);
      let wv = ArrayView1::from(w.as_slice());
      let variance = wv.dot(&self.sigma.dot(&wv));
      let volatility = variance.max(0.0).sqrt();
      if volatility < 1e-12 {
        return Ok(DEGENERATE_VOL_PENALTY);
      }
      Ok(-(wv.dot(&self.mu) - self.risk_free) / volatility)
    }
  }

  let cost = SharpeCost {
    mu: mu.clone(),
    sigma: sigma.clone(),
    bounds: bounds.to_vec(),
    risk_free,
  };

  let best_x = run_solver(cost, n)?;
  let w = project_capped_simplex(&best_x, bounds);
  Ok(result_from_weights(w, mu, sigma, risk_free))
}

/// Minimum-variance portfolio whose expected return is pinned to `target`.
///
/// The return equality is enforced through a quadratic penalty (the solve
/// itself stays box-and-simplex feasible via projection); a candidate whose
/// realized return misses the target by more than the acceptance tolerance
/// reports [`OptimizeError::NonConvergence`], which a frontier sweep treats
/// as an unreachable point.
pub fn optimize_target_return(
  mu: &Array1<f64>,
  sigma: &Array2<f64>,
  bounds: &[(f64, f64)],
  target_return: f64,
  risk_free: f64,
) -> Result<PortfolioResult, OptimizeError> {
  validate_problem(mu, sigma, bounds)?;
  if !target_return.is_finite() {
    return Err(OptimizeError::InvalidInput(format!(
      "target return must be finite, got {target_return}"
    )));
  }

  let n = mu.len();
  if n == 1 {
    if (mu[0] - target_return).abs() > TARGET_RETURN_TOL {
      return Err(OptimizeError::NonConvergence(format!(
        "target return {target_return:.6} unreachable with a single asset"
      )));
    }
    return Ok(result_from_weights(vec![1.0], mu, sigma, risk_free));
  }

  struct TargetReturnCost {
    mu: Array1<f64>,
    sigma: Array2<f64>,
    bounds: Vec<(f64, f64)>,
    target_return: f64,
  }

  impl CostFunction for TargetReturnCost {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
      let w = project_capped_simplex(x, &self.bounds);
      let wv = ArrayView1::from(w.as_slice());
      let variance = wv.dot(&self.sigma.dot(&wv));
      let miss = wv.dot(&self.mu) - self.target_return;
      Ok(variance + RETURN_PENALTY * miss * miss)
    }
  }

  let cost = TargetReturnCost {
    mu: mu.clone(),
    sigma: sigma.clone(),
    bounds: bounds.to_vec(),
    target_return,
  };

  let best_x = run_solver(cost, n)?;
  let w = project_capped_simplex(&best_x, bounds);
  let realized = ArrayView1::from(w.as_slice()).dot(mu);
  if (realized - target_return).abs() > TARGET_RETURN_TOL {
    return Err(OptimizeError::NonConvergence(format!(
      "target return {target_return:.6} unreachable under the given bounds"
    )));
  }

  Ok(result_from_weights(w, mu, sigma, risk_free))
}
