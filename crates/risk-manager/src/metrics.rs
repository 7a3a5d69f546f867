//! Risk metric values

use serde::{Deserialize, Serialize};

/// Risk of a single position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionRisk {
    /// Unrealized PnL (sign-aware)
    pub pnl: f64,
    /// Standard deviation of returns over the position's price history
    pub volatility: f64,
    /// Absolute notional at the current price
    pub notional: f64,
    /// PnL as a fraction of entry notional
    pub return_pct: f64,
}

/// Aggregate risk of a position set
///
/// Always recomputed from the live positions; never cached across mutations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioRiskMetrics {
    /// Sum of absolute notionals
    pub total_exposure: f64,
    /// Size-weighted position volatility
    pub volatility: f64,
    /// Largest fractional peak-to-trough decline of account equity
    pub drawdown: f64,
    /// Sum of unrealized PnL
    pub unrealized_pnl: f64,
    /// Largest pairwise return correlation between positions
    pub max_correlation: f64,
    pub position_count: usize,
}

impl PortfolioRiskMetrics {
    /// Portfolio return variance
    pub fn variance(&self) -> f64 {
        self.volatility * self.volatility
    }

    pub fn is_empty(&self) -> bool {
        self.position_count == 0
    }
}
