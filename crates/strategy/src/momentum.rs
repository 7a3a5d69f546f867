//! Momentum Strategy
//!
//! Follows the direction of the move across the observed window:
//! - Momentum is `(last - first) / first`
//! - A magnitude at or above `momentum_threshold` is actionable
//! - Size grows with an agreeing trend and shrinks in volatile markets
//! - Exits when momentum reverses past the threshold

use crate::strategy::{
    Indicator, MarketAnalysis, RiskOverrides, SignalContext, SignalGenerator, floor_price,
};
use kestrel_core::error::ensure_positive;
use kestrel_core::{Direction, Error, MarketWindow, Position, Result, Signal, stats};
use kestrel_regime::{RegimeAssessment, RegimeConfig, RegimeDetector, StatisticalRegimeDetector};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Configuration for momentum trading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    pub strategy_id: String,
    /// Minimum |momentum| to act on
    pub momentum_threshold: f64,
    /// Base size before regime scaling
    pub position_size: f64,
    pub max_position_size: f64,
    /// Shrink size when recent portfolio volatility runs hot
    pub volatility_adjustment: bool,
    pub regime_config: RegimeConfig,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            strategy_id: "momentum".to_string(),
            momentum_threshold: 0.02,
            position_size: 0.1,
            max_position_size: 0.3,
            volatility_adjustment: true,
            regime_config: RegimeConfig::default(),
        }
    }
}

impl MomentumConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("momentum_threshold", self.momentum_threshold)?;
        ensure_positive("position_size", self.position_size)?;
        ensure_positive("max_position_size", self.max_position_size)?;
        if self.position_size > self.max_position_size {
            return Err(Error::invalid(format!(
                "position_size {} exceeds max_position_size {}",
                self.position_size, self.max_position_size
            )));
        }
        self.regime_config.validate()
    }
}

/// Trend-following strategy on window momentum
pub struct MomentumStrategy {
    config: MomentumConfig,
    detector: StatisticalRegimeDetector,
}

impl MomentumStrategy {
    pub fn new(config: MomentumConfig) -> Result<Self> {
        config.validate()?;
        let detector = StatisticalRegimeDetector::new(config.regime_config.clone());
        Ok(Self { config, detector })
    }

    pub fn config(&self) -> &MomentumConfig {
        &self.config
    }

    pub fn momentum_threshold(&self) -> f64 {
        self.config.momentum_threshold
    }

    pub fn base_position_size(&self) -> f64 {
        self.config.position_size
    }

    /// Fractional change from the first to the last price
    pub fn calculate_momentum(prices: &[f64]) -> Result<f64> {
        if prices.len() < 2 {
            return Err(Error::InsufficientData {
                required: 2,
                available: prices.len(),
            });
        }
        Ok(stats::net_change(prices))
    }

    /// Size for a signal in `direction`, capped at the configured maximum
    pub fn position_size(
        &self,
        direction: Direction,
        regime: &RegimeAssessment,
        recent_volatility: Option<f64>,
    ) -> f64 {
        let mut size = self.config.position_size;

        if regime.trades_with_trend(direction) {
            size *= 1.5;
        }
        if regime.is_high_volatility() {
            size *= 0.5;
        }

        let threshold = self.config.regime_config.volatility_threshold;
        let elevated =
            recent_volatility.filter(|v| self.config.volatility_adjustment && *v > threshold);
        if let Some(volatility) = elevated {
            size *= threshold / volatility;
        }

        size.min(self.config.max_position_size)
    }

    fn confidence(&self, direction: Direction, momentum: f64, regime: &RegimeAssessment) -> f64 {
        let threshold = self.config.momentum_threshold;
        let strength = ((momentum.abs() - threshold) / threshold).clamp(0.0, 1.0);
        let mut confidence = 0.5 + 0.4 * strength;

        if regime.trades_with_trend(direction) {
            confidence *= 1.1;
        } else if regime.trades_against_trend(direction) {
            confidence *= 0.7;
        }
        if regime.is_high_volatility() {
            confidence *= 0.8;
        }

        confidence.clamp(0.0, 1.0)
    }
}

impl SignalGenerator for MomentumStrategy {
    fn name(&self) -> &str {
        "Momentum"
    }

    fn analyze_market(&self, window: &MarketWindow) -> Result<MarketAnalysis> {
        let regime = self.detector.analyze_regime(window)?;
        let momentum = Self::calculate_momentum(window.prices())?;

        Ok(MarketAnalysis {
            regime,
            indicator: Indicator::Momentum {
                momentum,
                volatility: stats::return_volatility(window.prices()),
            },
            price: window.last_price(),
        })
    }

    fn generate_signal(
        &self,
        window: &MarketWindow,
        ctx: &SignalContext,
    ) -> Result<Option<Signal>> {
        let regime = self.detector.analyze_regime(window)?;
        let momentum = Self::calculate_momentum(window.prices())?;

        let threshold = self.config.momentum_threshold;
        let direction = match Direction::from_sign(momentum) {
            Some(direction) if momentum.abs() >= threshold => direction,
            _ => {
                debug!(
                    "[Momentum] {} no signal: momentum={:.4} threshold={:.4}",
                    self.config.strategy_id, momentum, threshold
                );
                return Ok(None);
            }
        };

        let price = window.last_price();
        let volatility = stats::return_volatility(window.prices());
        let distance = price * (2.0 * volatility).max(threshold);
        let (stop_loss, target_price) = match direction {
            Direction::Long => (floor_price(price - distance, price), price + 2.0 * distance),
            Direction::Short => (
                price + distance,
                floor_price(price - 2.0 * distance, price),
            ),
        };

        let signal = Signal {
            direction,
            position_size: self.position_size(direction, &regime, ctx.recent_volatility),
            confidence: self.confidence(direction, momentum, &regime),
            stop_loss,
            target_price,
            entry_price: price,
        };

        info!(
            "[Momentum] {} {} signal: momentum={:.4}, price={:.4}, regime={} ({:?}), size={:.4}, confidence={:.3}",
            self.config.strategy_id,
            direction,
            momentum,
            price,
            regime.regime,
            regime.trend_direction,
            signal.position_size,
            signal.confidence
        );

        Ok(Some(signal))
    }

    fn should_exit(&self, position: &Position, window: &MarketWindow) -> Result<bool> {
        let momentum = Self::calculate_momentum(window.prices())?;
        let reversed = momentum * position.side.sign() < 0.0;
        Ok(reversed && momentum.abs() >= self.config.momentum_threshold)
    }

    fn max_position_size(&self) -> f64 {
        self.config.max_position_size
    }

    fn apply_overrides(&mut self, overrides: &RiskOverrides) -> Vec<&'static str> {
        let mut applied = Vec::new();
        if let Some(threshold) = overrides.momentum_threshold {
            self.config.momentum_threshold = threshold;
            applied.push("momentum_threshold");
        }
        if let Some(size) = overrides.position_size {
            self.config.position_size = size;
            applied.push("position_size");
        }
        if let Some(max) = overrides.max_position_size {
            self.config.max_position_size = max;
            applied.push("max_position_size");
        }
        applied
    }
}
