//! Signal Generator Trait
//!
//! Defines the interface every strategy implements, the context the
//! runtime passes in, and the limit overrides a risk update can apply.

use kestrel_core::error::ensure_positive;
use kestrel_core::{Error, MarketWindow, Position, Result, Signal};
use kestrel_regime::RegimeAssessment;
use serde::{Deserialize, Serialize};

/// Runtime state a strategy may take into account
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalContext {
    /// Volatility reported by the latest portfolio risk metrics
    pub recent_volatility: Option<f64>,
}

impl SignalContext {
    pub fn with_recent_volatility(volatility: f64) -> Self {
        Self {
            recent_volatility: Some(volatility),
        }
    }
}

/// Strategy-specific indicator behind a signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Indicator {
    /// Latest price against the reference mean
    Deviation {
        mean: f64,
        std_dev: f64,
        z_score: f64,
        average_volume: f64,
    },
    /// Fractional change across the window
    Momentum { momentum: f64, volatility: f64 },
}

/// Output of `analyze_market`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub regime: RegimeAssessment,
    pub indicator: Indicator,
    /// Latest price in the window
    pub price: f64,
}

/// Limit overrides carried by a risk update; absent fields stay unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskOverrides {
    pub momentum_threshold: Option<f64>,
    pub position_size: Option<f64>,
    pub max_position_size: Option<f64>,
    pub max_positions: Option<usize>,
    pub risk_per_trade: Option<f64>,
    pub max_drawdown: Option<f64>,
}

impl RiskOverrides {
    pub fn is_empty(&self) -> bool {
        *self == RiskOverrides::default()
    }

    /// Every present value must be finite and positive
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("momentum_threshold", self.momentum_threshold),
            ("position_size", self.position_size),
            ("max_position_size", self.max_position_size),
            ("risk_per_trade", self.risk_per_trade),
            ("max_drawdown", self.max_drawdown),
        ];
        for (name, value) in values {
            if let Some(value) = value {
                ensure_positive(name, value)?;
            }
        }
        if self.max_positions == Some(0) {
            return Err(Error::invalid("max_positions must be positive"));
        }
        Ok(())
    }
}

/// Strategy trait - implement this for your trading strategy
///
/// Implementations are pure with respect to their inputs: the same window
/// and context always produce the same analysis and signal.
pub trait SignalGenerator: Send {
    /// Strategy name for logging
    fn name(&self) -> &str;

    /// Classify the regime and compute the strategy's indicator
    fn analyze_market(&self, window: &MarketWindow) -> Result<MarketAnalysis>;

    /// One signal, or `None` when there is no actionable edge
    fn generate_signal(&self, window: &MarketWindow, ctx: &SignalContext)
    -> Result<Option<Signal>>;

    /// Has the strategy's exit condition been met for an open position?
    fn should_exit(&self, position: &Position, window: &MarketWindow) -> Result<bool>;

    /// Upper bound on any signal's size
    fn max_position_size(&self) -> f64;

    /// Merge overrides into live parameters, returning the names applied
    fn apply_overrides(&mut self, overrides: &RiskOverrides) -> Vec<&'static str>;
}

/// Keep derived stop/target prices strictly positive
pub(crate) fn floor_price(price: f64, reference: f64) -> f64 {
    price.max(reference * 0.01)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_from_json() {
        let overrides: RiskOverrides =
            serde_json::from_str(r#"{"momentum_threshold": 0.03, "position_size": 0.15}"#)
                .unwrap();
        assert_eq!(overrides.momentum_threshold, Some(0.03));
        assert_eq!(overrides.position_size, Some(0.15));
        assert_eq!(overrides.max_positions, None);
        assert!(!overrides.is_empty());
        assert!(overrides.validate().is_ok());
    }

    #[test]
    fn test_overrides_validation() {
        let overrides = RiskOverrides {
            position_size: Some(-0.1),
            ..Default::default()
        };
        assert!(overrides.validate().is_err());

        let overrides = RiskOverrides {
            max_positions: Some(0),
            ..Default::default()
        };
        assert!(overrides.validate().is_err());
        assert!(RiskOverrides::default().is_empty());
    }

    #[test]
    fn test_floor_price() {
        assert_eq!(floor_price(95.0, 100.0), 95.0);
        assert_eq!(floor_price(-5.0, 100.0), 1.0);
    }
}
