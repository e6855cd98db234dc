//! # frontier-rs
//!
//! $$
//! \min_{\mathbf{w}} \ \mathbf{w}^\top \Sigma \mathbf{w}
//! \quad \text{s.t.} \quad \sum_i w_i = 1,\ l_i \le w_i \le u_i
//! $$
//!
//! Mean-variance portfolio optimization: minimum-variance and maximum-Sharpe
//! portfolios plus the efficient frontier, under full investment and
//! per-asset weight bounds. The crate is a pure library boundary — price
//! sourcing and presentation belong to the caller, and every API is a
//! stateless function of `(prices | mu, Sigma, bounds, r_f)`.

pub mod engine;
pub mod error;
pub mod frontier;
pub mod performance;
pub mod returns;
pub mod solver;
pub mod types;

pub use engine::OptimizationReport;
pub use engine::PortfolioEngine;
pub use engine::PortfolioEngineConfig;
pub use error::OptimizeError;
pub use frontier::efficient_frontier;
pub use frontier::DEFAULT_FRONTIER_DENSITY;
pub use performance::portfolio_performance;
pub use returns::estimate_returns;
pub use returns::ReturnEstimates;
pub use solver::check_bounds;
pub use solver::optimize_max_sharpe;
pub use solver::optimize_min_variance;
pub use solver::optimize_target_return;
pub use types::FrontierPoint;
pub use types::PortfolioMetrics;
pub use types::PortfolioResult;
pub use types::ReturnMethod;
