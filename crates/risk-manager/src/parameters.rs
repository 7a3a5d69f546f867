//! Risk Parameters
//!
//! Configuration-level limits the risk engine validates against. These are
//! read-only to the engine; an agent replaces them only through its own
//! risk-update handling.

use kestrel_core::error::{ensure_finite, ensure_positive};
use kestrel_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Account-level limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskLimits {
    /// Maximum total notional across positions
    pub max_exposure: f64,
    /// Maximum notional / account balance
    pub max_leverage: f64,
    /// Account equity the leverage and drawdown are measured against
    pub account_balance: f64,
    /// Margin available for new positions
    pub available_margin: f64,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_exposure: 1_000_000.0,
            max_leverage: 2.0,
            account_balance: 100_000.0,
            available_margin: 100_000.0,
        }
    }
}

/// Risk engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Largest size a single trade may have
    pub max_position_size: f64,
    /// Largest portfolio return variance
    pub max_portfolio_var: f64,
    /// Largest fractional peak-to-trough decline
    pub max_drawdown: f64,
    /// Largest pairwise return correlation between positions
    pub correlation_limit: f64,
    pub risk_limits: RiskLimits,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_position_size: 0.1,
            max_portfolio_var: 0.2,
            max_drawdown: 0.15,        // 15%
            correlation_limit: 0.7,
            risk_limits: RiskLimits::default(),
        }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("max_position_size", self.max_position_size)?;
        ensure_positive("max_portfolio_var", self.max_portfolio_var)?;
        ensure_fraction("max_drawdown", self.max_drawdown)?;
        ensure_finite("correlation_limit", self.correlation_limit)?;
        if !(0.0..=1.0).contains(&self.correlation_limit) {
            return Err(Error::invalid(format!(
                "correlation_limit must be within [0, 1], got {}",
                self.correlation_limit
            )));
        }

        let limits = &self.risk_limits;
        ensure_positive("max_exposure", limits.max_exposure)?;
        ensure_positive("max_leverage", limits.max_leverage)?;
        ensure_positive("account_balance", limits.account_balance)?;
        ensure_finite("available_margin", limits.available_margin)?;
        if limits.available_margin < 0.0 {
            return Err(Error::invalid("available_margin must not be negative"));
        }
        Ok(())
    }
}

/// Value in (0, 1]
pub(crate) fn ensure_fraction(name: &str, value: f64) -> Result<f64> {
    ensure_positive(name, value)?;
    if value > 1.0 {
        return Err(Error::invalid(format!(
            "{name} must be within (0, 1], got {value}"
        )));
    }
    Ok(value)
}
