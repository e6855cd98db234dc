//! # Portfolio Performance
//!
//! $$
//! \sigma_p = \sqrt{\mathbf{w}^\top \Sigma \mathbf{w}}
//! $$

use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;

use crate::types::PortfolioMetrics;

/// Compute `(expected_return, volatility, sharpe)` for a fixed weight vector.
///
/// Pure and O(N^2). The Sharpe ratio is NaN when volatility is zero, since
/// excess return over no risk is undefined. Dimensions of `weights`, `mu`
/// and `sigma` must agree.
pub fn portfolio_performance(
  weights: &[f64],
  mu: &Array1<f64>,
  sigma: &Array2<f64>,
  risk_free: f64,
) -> PortfolioMetrics {
  let w = ArrayView1::from(weights);
  let expected_return = w.dot(mu);
  let variance = w.dot(&sigma.dot(&w));
  let volatility = variance.max(0.0).sqrt();
  let sharpe = if volatility > 0.0 {
    (expected_return - risk_free) / volatility
  } else {
    f64::NAN
  };

  PortfolioMetrics {
    expected_return,
    volatility,
    sharpe,
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;

  #[test]
  fn metrics_match_hand_computation() {
    let mu = array![0.08, 0.12];
    let sigma = array![[0.04, 0.01], [0.01, 0.09]];
    let m = portfolio_performance(&[0.5, 0.5], &mu, &sigma, 0.02);

    assert_abs_diff_eq!(m.expected_return, 0.10, epsilon = 1e-12);
    assert_abs_diff_eq!(m.volatility, 0.0375_f64.sqrt(), epsilon = 1e-12);
    assert_abs_diff_eq!(m.sharpe, 0.08 / 0.0375_f64.sqrt(), epsilon = 1e-12);
  }

  #[test]
  fn volatility_is_never_negative() {
    let mu = array![0.05];
    // tiny negative variance from rounding must clamp to zero
    let sigma = array![[-1e-18]];
    let m = portfolio_performance(&[1.0], &mu, &sigma, 0.0);

    assert_eq!(m.volatility, 0.0);
  }

  #[test]
  fn zero_volatility_sharpe_is_nan() {
    let mu = array![0.05, 0.07];
    let sigma = array![[0.0, 0.0], [0.0, 0.0]];
    let m = portfolio_performance(&[0.5, 0.5], &mu, &sigma, 0.02);

    assert_eq!(m.volatility, 0.0);
    assert!(m.sharpe.is_nan());
  }
}
