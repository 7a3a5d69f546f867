//! Trade Validation Types
//!
//! A limit breach is a normal outcome, not an error: validation returns a
//! `TradeDecision` that carries every violated limit and a readable reason.

use kestrel_core::Result;
use kestrel_core::error::{ensure_finite, ensure_positive};
use serde::{Deserialize, Serialize};

/// A trade proposed for validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeProposal {
    /// Size to trade (positive)
    pub size: f64,
    /// Expected fill price
    pub price: f64,
    /// Notional already held across open positions
    #[serde(default)]
    pub existing_exposure: f64,
}

impl TradeProposal {
    pub fn new(size: f64, price: f64) -> Self {
        Self {
            size,
            price,
            existing_exposure: 0.0,
        }
    }

    /// Builder: account for exposure already held
    pub fn with_existing_exposure(mut self, exposure: f64) -> Self {
        self.existing_exposure = exposure;
        self
    }

    pub fn notional(&self) -> f64 {
        (self.size * self.price).abs()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure_positive("trade size", self.size)?;
        ensure_positive("trade price", self.price)?;
        ensure_finite("existing_exposure", self.existing_exposure)?;
        Ok(())
    }
}

/// A breached limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum LimitViolation {
    PositionSize { requested: f64, limit: f64 },
    Exposure { requested: f64, limit: f64 },
    Leverage { requested: f64, limit: f64 },
    Margin { required: f64, available: f64 },
    PortfolioVariance { variance: f64, limit: f64 },
    Drawdown { drawdown: f64, limit: f64 },
    Correlation { correlation: f64, limit: f64 },
}

impl std::fmt::Display for LimitViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitViolation::PositionSize { requested, limit } => {
                write!(f, "Position size exceeds limit: {requested} > {limit}")
            }
            LimitViolation::Exposure { requested, limit } => {
                write!(f, "Exposure exceeds limit: {requested:.2} > {limit:.2}")
            }
            LimitViolation::Leverage { requested, limit } => {
                write!(f, "Leverage exceeds limit: {requested:.2}x > {limit:.2}x")
            }
            LimitViolation::Margin {
                required,
                available,
            } => write!(
                f,
                "Insufficient margin: required {required:.2}, available {available:.2}"
            ),
            LimitViolation::PortfolioVariance { variance, limit } => {
                write!(f, "Portfolio variance exceeds limit: {variance:.6} > {limit:.6}")
            }
            LimitViolation::Drawdown { drawdown, limit } => write!(
                f,
                "Drawdown exceeds limit: {:.2}% > {:.2}%",
                drawdown * 100.0,
                limit * 100.0
            ),
            LimitViolation::Correlation { correlation, limit } => {
                write!(f, "Correlation exceeds limit: {correlation:.2} > {limit:.2}")
            }
        }
    }
}

/// Result of validating a trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDecision {
    pub accepted: bool,
    pub reason: String,
    pub violations: Vec<LimitViolation>,
}

impl TradeDecision {
    pub fn accept() -> Self {
        Self {
            accepted: true,
            reason: "Trade within limits".to_string(),
            violations: Vec::new(),
        }
    }

    pub fn reject(violations: Vec<LimitViolation>) -> Self {
        let reason = violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            accepted: false,
            reason,
            violations,
        }
    }

    /// `(accepted, reason)` pair
    pub fn into_parts(self) -> (bool, String) {
        (self.accepted, self.reason)
    }
}
