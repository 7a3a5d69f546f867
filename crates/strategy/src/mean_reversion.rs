//! Mean Reversion Strategy
//!
//! A regime-adaptive strategy that:
//! - Measures how far the latest price sits from the mean of the preceding
//!   `lookback_period` prices, in standard deviations
//! - Sells when price is stretched above the mean (expects reversion down)
//! - Buys when price is stretched below the mean (expects reversion up)
//! - Sizes down against trends and in volatile markets, up on volume
//! - Exits when price reverts to within `exit_std` of the mean

use crate::strategy::{
    Indicator, MarketAnalysis, RiskOverrides, SignalContext, SignalGenerator, floor_price,
};
use kestrel_core::error::ensure_positive;
use kestrel_core::{Direction, Error, MarketWindow, Position, Result, Signal, stats};
use kestrel_regime::{
    MarketRegime, RegimeAssessment, RegimeConfig, RegimeDetector, StatisticalRegimeDetector,
    VolumeProfile,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Configuration for mean reversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeanReversionConfig {
    /// Strategy identity for logging
    pub strategy_id: String,
    /// Base size before regime and volume scaling
    pub position_size: f64,
    /// Hard cap on any signal's size
    pub max_position_size: f64,
    /// Deviation (in standard deviations) needed to enter
    pub entry_std: f64,
    /// Deviation (in standard deviations) at which a position exits
    pub exit_std: f64,
    /// Prices the reference mean and deviation cover
    pub lookback_period: usize,
    /// Average volume below which confidence is scaled down
    pub min_volume: f64,
    pub regime_config: RegimeConfig,
}

impl Default for MeanReversionConfig {
    fn default() -> Self {
        Self {
            strategy_id: "mean-reversion".to_string(),
            position_size: 0.1,
            max_position_size: 0.3,
            entry_std: 2.0, // 2σ stretch to enter
            exit_std: 0.5,  // back within 0.5σ to exit
            lookback_period: 20,
            min_volume: 1_000_000.0,
            regime_config: RegimeConfig::default(),
        }
    }
}

impl MeanReversionConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("position_size", self.position_size)?;
        ensure_positive("max_position_size", self.max_position_size)?;
        if self.position_size > self.max_position_size {
            return Err(Error::invalid(format!(
                "position_size {} exceeds max_position_size {}",
                self.position_size, self.max_position_size
            )));
        }
        ensure_positive("entry_std", self.entry_std)?;
        ensure_positive("exit_std", self.exit_std)?;
        if self.exit_std >= self.entry_std {
            return Err(Error::invalid("exit_std must be below entry_std"));
        }
        if self.lookback_period < 2 {
            return Err(Error::invalid("lookback_period must be at least 2"));
        }
        if !self.min_volume.is_finite() || self.min_volume < 0.0 {
            return Err(Error::invalid("min_volume must be finite and non-negative"));
        }
        self.regime_config.validate()
    }
}

/// Reference statistics over the prices preceding the latest one
#[derive(Debug, Clone, Copy)]
struct Reversion {
    mean: f64,
    std_dev: f64,
    z_score: f64,
    average_volume: f64,
}

/// Mean reversion strategy
pub struct MeanReversionStrategy {
    config: MeanReversionConfig,
    detector: StatisticalRegimeDetector,
}

impl MeanReversionStrategy {
    /// Create a new mean reversion strategy
    pub fn new(config: MeanReversionConfig) -> Result<Self> {
        config.validate()?;
        let detector = StatisticalRegimeDetector::new(config.regime_config.clone());
        Ok(Self { config, detector })
    }

    pub fn config(&self) -> &MeanReversionConfig {
        &self.config
    }

    pub fn base_position_size(&self) -> f64 {
        self.config.position_size
    }

    fn reversion(&self, window: &MarketWindow) -> Result<Reversion> {
        let lookback = self.config.lookback_period;
        window.require(lookback + 1)?;

        let reference = window.prices_before_last(lookback);
        let mean = stats::mean(reference);
        let std_dev = stats::std_dev(reference);
        let z_score = if std_dev > 0.0 {
            (window.last_price() - mean) / std_dev
        } else {
            0.0
        };

        Ok(Reversion {
            mean,
            std_dev,
            z_score,
            average_volume: stats::mean(window.volumes_before_last(lookback)),
        })
    }

    /// Size scaled by regime and volume, capped at the configured maximum
    fn scaled_size(&self, regime: &RegimeAssessment) -> f64 {
        let regime_factor = match regime.regime {
            MarketRegime::RangeBound => 1.0,
            // Fading an active trend is riskier
            MarketRegime::Trending => 0.6,
            MarketRegime::HighVolatility => 0.5,
        };
        let volume_factor = match regime.volume_profile {
            VolumeProfile::High => 1.25,
            VolumeProfile::Normal => 1.0,
            VolumeProfile::Low => 0.75,
        };

        (self.config.position_size * regime_factor * volume_factor)
            .min(self.config.max_position_size)
    }

    fn confidence(
        &self,
        direction: Direction,
        z_score: f64,
        average_volume: f64,
        regime: &RegimeAssessment,
    ) -> f64 {
        let entry = self.config.entry_std;
        let strength = ((z_score.abs() - entry) / entry).clamp(0.0, 1.0);
        let mut confidence = 0.6 + 0.3 * strength;

        confidence *= match regime.regime {
            MarketRegime::RangeBound => 1.0,
            MarketRegime::HighVolatility => 0.75,
            MarketRegime::Trending if regime.trades_against_trend(direction) => 0.7,
            MarketRegime::Trending => 0.85,
        };
        confidence *= match regime.volume_profile {
            VolumeProfile::High => 1.15,
            VolumeProfile::Normal => 1.0,
            VolumeProfile::Low => 0.8,
        };

        // Thin markets revert less reliably
        if self.config.min_volume > 0.0 && average_volume < self.config.min_volume {
            confidence *= average_volume / self.config.min_volume;
        }

        confidence.clamp(0.0, 1.0)
    }
}

impl SignalGenerator for MeanReversionStrategy {
    fn name(&self) -> &str {
        "MeanReversion"
    }

    fn analyze_market(&self, window: &MarketWindow) -> Result<MarketAnalysis> {
        let regime = self.detector.analyze_regime(window)?;
        let reversion = self.reversion(window)?;

        Ok(MarketAnalysis {
            regime,
            indicator: Indicator::Deviation {
                mean: reversion.mean,
                std_dev: reversion.std_dev,
                z_score: reversion.z_score,
                average_volume: reversion.average_volume,
            },
            price: window.last_price(),
        })
    }

    fn generate_signal(
        &self,
        window: &MarketWindow,
        _ctx: &SignalContext,
    ) -> Result<Option<Signal>> {
        let regime = self.detector.analyze_regime(window)?;
        let Reversion {
            mean,
            std_dev,
            z_score,
            average_volume,
        } = self.reversion(window)?;

        if std_dev <= 0.0 || z_score.abs() < self.config.entry_std {
            debug!(
                "[MeanReversion] {} no signal: z={:.2}",
                self.config.strategy_id, z_score
            );
            return Ok(None);
        }

        // Price above the mean -> SELL, below -> BUY
        let direction = if z_score > 0.0 {
            Direction::Short
        } else {
            Direction::Long
        };
        let price = window.last_price();

        // Wider stop for the same nominal risk when the market is noisier
        let widen = match regime.regime {
            MarketRegime::RangeBound => 1.0,
            MarketRegime::Trending => 1.25,
            MarketRegime::HighVolatility => 1.5,
        };
        let stop_distance = self.config.entry_std * std_dev * widen;
        let exit_band = self.config.exit_std * std_dev;
        let (stop_loss, target_price) = match direction {
            Direction::Short => (price + stop_distance, mean + exit_band),
            Direction::Long => (
                floor_price(price - stop_distance, price),
                floor_price(mean - exit_band, price),
            ),
        };

        let signal = Signal {
            direction,
            position_size: self.scaled_size(&regime),
            confidence: self.confidence(direction, z_score, average_volume, &regime),
            stop_loss,
            target_price,
            entry_price: price,
        };

        info!(
            "[MeanReversion] {} {} signal: z={:.2}, price={:.4}, mean={:.4}, regime={}, size={:.4}, confidence={:.3}",
            self.config.strategy_id,
            direction,
            z_score,
            price,
            mean,
            regime.regime,
            signal.position_size,
            signal.confidence
        );

        Ok(Some(signal))
    }

    fn should_exit(&self, _position: &Position, window: &MarketWindow) -> Result<bool> {
        let reversion = self.reversion(window)?;
        Ok((window.last_price() - reversion.mean).abs() <= self.config.exit_std * reversion.std_dev)
    }

    fn max_position_size(&self) -> f64 {
        self.config.max_position_size
    }

    /// `momentum_threshold` has no meaning here and is left out of the result
    fn apply_overrides(&mut self, overrides: &RiskOverrides) -> Vec<&'static str> {
        let mut applied = Vec::new();
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
