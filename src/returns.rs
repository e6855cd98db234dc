//! # Return Estimation
//!
//! $$
//! \hat\mu = \bar r \cdot k, \qquad \hat\Sigma = \operatorname{cov}(r) \cdot k
//! $$
//!
//! Converts a price matrix into aligned periodic returns and annualized
//! expected-return / covariance statistics. Rows with any missing entry are
//! dropped before differencing, so every asset shares one common calendar.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;
use ndarray_stats::CorrelationExt;

use crate::error::OptimizeError;
use crate::types::ReturnMethod;

/// Annualized statistics estimated from a cleaned price matrix.
#[derive(Clone, Debug)]
pub struct ReturnEstimates {
  /// Annualized expected return per asset.
  pub mu: Array1<f64>,
  /// Annualized sample covariance matrix (ddof = 1).
  pub sigma: Array2<f64>,
  /// Aligned periodic returns the statistics were computed from.
  pub returns: Array2<f64>,
  /// Number of return observations after cleaning.
  pub n_observations: usize,
}

/// A price is usable when it is finite and strictly positive; anything else
/// marks the whole row as missing.
fn price_is_valid(p: f64) -> bool {
  p.is_finite() && p > 0.0
}

/// Estimate annualized `(mu, Sigma)` from a `T x N` price matrix.
///
/// Rows containing any invalid entry are dropped entirely; returns are then
/// computed between consecutive surviving rows. Fewer than two aligned
/// return observations yield [`OptimizeError::InsufficientData`].
pub fn estimate_returns(
  prices: &Array2<f64>,
  method: ReturnMethod,
  periods_per_year: f64,
) -> Result<ReturnEstimates, OptimizeError> {
  let n_assets = prices.ncols();
  if n_assets == 0 {
    return Err(OptimizeError::InsufficientData(
      "price matrix has no assets".into(),
    ));
  }
  if !periods_per_year.is_finite() || periods_per_year <= 0.0 {
    return Err(OptimizeError::InvalidInput(format!(
      "periods_per_year must be positive, got {periods_per_year}"
    )));
  }

  let kept: Vec<usize> = prices
    .axis_iter(Axis(0))
    .enumerate()
    .filter(|(_, row)| row.iter().all(|&p| price_is_valid(p)))
    .map(|(t, _)| t)
    .collect();

  if kept.len() < 3 {
    return Err(OptimizeError::InsufficientData(format!(
      "{} usable price rows yield fewer than 2 return observations",
      kept.len()
    )));
  }

  let n_observations = kept.len() - 1;
  let mut data = Vec::with_capacity(n_observations * n_assets);
  for k in 1..kept.len() {
    let prev = kept[k - 1];
    let cur = kept[k];
    for j in 0..n_assets {
      let ratio = prices[[cur, j]] / prices[[prev, j]];
      data.push(match method {
        ReturnMethod::Log => ratio.ln(),
        ReturnMethod::Simple => ratio - 1.0,
      });
    }
  }

  let returns = Array2::from_shape_vec((n_observations, n_assets), data)
    .map_err(|e| OptimizeError::InvalidInput(e.to_string()))?;

  let mu = returns
    .mean_axis(Axis(0))
    .ok_or_else(|| OptimizeError::InsufficientData("no return observations".into()))?
    * periods_per_year;

  let sigma = returns
    .t()
    .cov(1.0)
    .map_err(|e| OptimizeError::InsufficientData(format!("covariance failed: {e}")))?
    * periods_per_year;

  Ok(ReturnEstimates {
    mu,
    sigma,
    returns,
    n_observations,
  })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;

  #[test]
  fn simple_returns_match_hand_computation() {
    let prices = array![[100.0, 200.0], [110.0, 190.0], [121.0, 209.0]];
    let est = estimate_returns(&prices, ReturnMethod::Simple, 252.0).unwrap();

    assert_eq!(est.n_observations, 2);
    assert_abs_diff_eq!(est.returns[[0, 0]], 0.10, epsilon = 1e-12);
    assert_abs_diff_eq!(est.returns[[1, 0]], 0.10, epsilon = 1e-12);
    assert_abs_diff_eq!(est.returns[[0, 1]], -0.05, epsilon = 1e-12);
    assert_abs_diff_eq!(est.returns[[1, 1]], 0.10, epsilon = 1e-12);

    // asset 0 has constant returns: zero variance, mu = 0.10 * 252
    assert_abs_diff_eq!(est.mu[0], 25.2, epsilon = 1e-9);
    assert_abs_diff_eq!(est.sigma[[0, 0]], 0.0, epsilon = 1e-12);

    // asset 1: mean 0.025, sample variance (0.075^2 + 0.075^2) / 1
    assert_abs_diff_eq!(est.mu[1], 0.025 * 252.0, epsilon = 1e-9);
    assert_abs_diff_eq!(est.sigma[[1, 1]], 0.075_f64.powi(2) * 2.0 * 252.0, epsilon = 1e-9);
  }

  #[test]
  fn log_returns_use_price_ratios() {
    let prices = array![[100.0], [110.0], [121.0]];
    let est = estimate_returns(&prices, ReturnMethod::Log, 252.0).unwrap();

    assert_abs_diff_eq!(est.returns[[0, 0]], 1.1_f64.ln(), epsilon = 1e-12);
    assert_abs_diff_eq!(est.returns[[1, 0]], 1.1_f64.ln(), epsilon = 1e-12);
    assert_abs_diff_eq!(est.mu[0], 1.1_f64.ln() * 252.0, epsilon = 1e-9);
  }

  #[test]
  fn rows_with_missing_values_are_dropped() {
    let clean = array![[100.0, 50.0], [110.0, 55.0], [121.0, 60.5]];
    let dirty = array![
      [100.0, 50.0],
      [105.0, f64::NAN],
      [110.0, 55.0],
      [-3.0, 57.0],
      [121.0, 60.5]
    ];

    let a = estimate_returns(&clean, ReturnMethod::Log, 252.0).unwrap();
    let b = estimate_returns(&dirty, ReturnMethod::Log, 252.0).unwrap();

    assert_eq!(b.n_observations, a.n_observations);
    assert_abs_diff_eq!(a.mu[0], b.mu[0], epsilon = 1e-12);
    assert_abs_diff_eq!(a.sigma[[0, 1]], b.sigma[[0, 1]], epsilon = 1e-12);
  }

  #[test]
  fn too_few_rows_is_insufficient_data() {
    let empty = Array2::<f64>::zeros((0, 2));
    assert!(matches!(
      estimate_returns(&empty, ReturnMethod::Log, 252.0),
      Err(OptimizeError::InsufficientData(_))
    ));

    let one = array![[100.0, 50.0]];
    assert!(matches!(
      estimate_returns(&one, ReturnMethod::Log, 252.0),
      Err(OptimizeError::InsufficientData(_))
    ));

    // two rows give a single return observation, not enough for covariance
    let two = array![[100.0, 50.0], [110.0, 55.0]];
    assert!(matches!(
      estimate_returns(&two, ReturnMethod::Log, 252.0),
      Err(OptimizeError::InsufficientData(_))
    ));
  }

  #[test]
  fn empty_universe_is_insufficient_data() {
    let prices = Array2::<f64>::zeros((10, 0));
    assert!(matches!(
      estimate_returns(&prices, ReturnMethod::Log, 252.0),
      Err(OptimizeError::InsufficientData(_))
    ));
  }

  #[test]
  fn invalid_periods_per_year_is_rejected() {
    let prices = array![[100.0], [110.0], [121.0]];
    assert!(matches!(
      estimate_returns(&prices, ReturnMethod::Log, 0.0),
      Err(OptimizeError::InvalidInput(_))
    ));
  }
}
