//! # Efficient Frontier
//!
//! $$
//! \sigma^\*(r) = \min_{\mathbf{w}} \sqrt{\mathbf{w}^\top \Sigma \mathbf{w}}
//! \quad \text{s.t.} \quad \mathbf{w}^\top \mu = r
//! $$
//!
//! Traces the frontier by sweeping target returns over `[min(mu), max(mu)]`
//! and solving an independent return-pinned QP per target. Targets the
//! bounds cannot reach are dropped and the sweep continues.

use ndarray::Array1;
use ndarray::Array2;
use rayon::prelude::*;
use tracing::debug;
use tracing::warn;

use crate::error::OptimizeError;
use crate::solver::check_bounds;
use crate::solver::optimize_target_return;
use crate::types::FrontierPoint;

/// Default number of frontier targets.
pub const DEFAULT_FRONTIER_DENSITY: usize = 30;

/// Sweep the efficient frontier.
///
/// Per-target solves are independent and run on the rayon pool; the result
/// keeps the natural ordering by increasing target return. A single
/// unreachable target drops only its own point, so the returned frontier
/// may hold fewer than `density` points. Infeasible bounds or an empty
/// universe abort the whole sweep.
pub fn efficient_frontier(
  mu: &Array1<f64>,
  sigma: &Array2<f64>,
  bounds: &[(f64, f64)],
  risk_free: f64,
  density: usize,
) -> Result<Vec<FrontierPoint>, OptimizeError> {
  let n = mu.len();
  if n == 0 {
    return Err(OptimizeError::InsufficientData(
      "asset universe is empty".into(),
    ));
  }
  check_bounds(n, bounds)?;
  if density == 0 {
    return Ok(Vec::new());
  }

  let lo = mu.iter().cloned().fold(f64::INFINITY, f64::min);
  let hi = mu.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
  let targets: Vec<f64> = if hi - lo < 1e-12 {
    vec![lo]
  } else {
    Array1::linspace(lo, hi, density).to_vec()
  };
  let requested = targets.len();

  // each solve gets its own cost carrying a copied target value, so no
  // point can observe another point's target
  let points: Vec<FrontierPoint> = targets
    .into_par_iter()
    .filter_map(|target_return| {
      match optimize_target_return(mu, sigma, bounds, target_return, risk_free) {
        Ok(res) => Some(FrontierPoint {
          target_return,
          volatility: res.volatility,
          weights: res.weights,
        }),
        Err(err) => {
          debug!("frontier point at {target_return:.6} dropped: {err}");
          None
        }
      }
    })
    .collect();

  if points.len() < requested {
    warn!(
      "dropped {} of {requested} frontier targets as unreachable",
      requested - points.len()
    );
  }

  Ok(points)
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;
  use tracing_test::traced_test;

  use super::*;
  use crate::solver::optimize_min_variance;

  fn long_only(n: usize) -> Vec<(f64, f64)> {
    vec![(0.0, 1.0); n]
  }

  #[test]
  fn frontier_points_are_feasible_and_ordered() {
    let mu = array![0.08, 0.12];
    let sigma = array![[0.04, 0.01], [0.01, 0.09]];
    let bounds = long_only(2);

    let points = efficient_frontier(&mu, &sigma, &bounds, 0.02, 15).unwrap();
    assert_eq!(points.len(), 15);

    for pair in points.windows(2) {
      assert!(pair[0].target_return <= pair[1].target_return);
    }
    for p in &points {
      let sum: f64 = p.weights.iter().sum();
      assert!((sum - 1.0).abs() < 1e-6);
      for &w in &p.weights {
        assert!((-1e-6..=1.0 + 1e-6).contains(&w));
      }
      assert!(p.volatility >= 0.0);
    }
  }

  #[test]
  fn upper_half_volatility_is_non_decreasing() {
    let mu = array![0.08, 0.12];
    let sigma = array![[0.04, 0.01], [0.01, 0.09]];
    let bounds = long_only(2);

    let min_var = optimize_min_variance(&mu, &sigma, &bounds, 0.02).unwrap();
    let points = efficient_frontier(&mu, &sigma, &bounds, 0.02, 15).unwrap();

    let upper: Vec<_> = points
      .iter()
      .filter(|p| p.target_return >= min_var.expected_return)
      .collect();
    assert!(upper.len() >= 2);
    for pair in upper.windows(2) {
      assert!(pair[0].volatility <= pair[1].volatility + 1e-6);
    }
  }

  #[test]
  fn perfectly_correlated_assets_give_a_straight_frontier() {
    // sigma1 = 0.2, sigma2 = 0.3, rho = 1: volatility is affine in return
    let mu = array![0.08, 0.12];
    let sigma = array![[0.04, 0.06], [0.06, 0.09]];

    let points = efficient_frontier(&mu, &sigma, &long_only(2), 0.0, 5).unwrap();
    assert_eq!(points.len(), 5);

    for p in &points {
      let w1 = (0.12 - p.target_return) / 0.04;
      let expected_vol = 0.2 * w1 + 0.3 * (1.0 - w1);
      assert_abs_diff_eq!(p.volatility, expected_vol, epsilon = 5e-3);
    }
  }

  #[traced_test]
  #[test]
  fn pinned_bounds_degenerate_to_a_single_point() {
    let mu = array![0.08, 0.12];
    let sigma = array![[0.04, 0.01], [0.01, 0.09]];
    let pinned = vec![(0.5, 0.5), (0.5, 0.5)];

    // only the 0.10 target is reachable; the four others are dropped
    let points = efficient_frontier(&mu, &sigma, &pinned, 0.02, 5).unwrap();
    assert_eq!(points.len(), 1);
    assert_abs_diff_eq!(points[0].target_return, 0.10, epsilon = 1e-9);
    assert_eq!(points[0].weights, vec![0.5, 0.5]);
    assert!(logs_contain("frontier targets as unreachable"));
  }

  #[test]
  fn infeasible_bounds_abort_the_sweep() {
    let mu = array![0.08, 0.12];
    let sigma = array![[0.04, 0.01], [0.01, 0.09]];
    let bounds = vec![(0.7, 1.0), (0.7, 1.0)];

    assert!(matches!(
      efficient_frontier(&mu, &sigma, &bounds, 0.0, 10),
      Err(OptimizeError::InfeasibleConstraints(_))
    ));
  }

  #[test]
  fn empty_universe_aborts_the_sweep() {
    let mu = Array1::<f64>::zeros(0);
    let sigma = Array2::<f64>::zeros((0, 0));
    assert!(matches!(
      efficient_frontier(&mu, &sigma, &[], 0.0, 10),
      Err(OptimizeError::InsufficientData(_))
    ));
  }

  #[test]
  fn zero_density_yields_an_empty_frontier() {
    let mu = array![0.08, 0.12];
    let sigma = array![[0.04, 0.01], [0.01, 0.09]];
    let points = efficient_frontier(&mu, &sigma, &long_only(2), 0.0, 0).unwrap();
    assert!(points.is_empty());
  }
}
