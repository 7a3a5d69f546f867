//! Statistical Regime Classifier
//!
//! Classifies the lookback window in priority order:
//!
//! 1. Trending: a mostly one-directional path (efficiency at or above
//!    `MIN_TREND_EFFICIENCY`) with a non-zero net move, however small
//! 2. High volatility: return dispersion beyond the volatility threshold
//! 3. Range bound: everything else
//!
//! Trend confidence starts just above one half and grows with efficiency and
//! with the efficiency-weighted move measured against the trend threshold.
//! Volatility confidence grows with the dispersion past its threshold. For
//! range-bound windows it grows with the distance below the nearest threshold.

use crate::config::RegimeConfig;
use crate::domain::{MarketRegime, RegimeAssessment, RsiLevels, TrendDirection, VolumeProfile};
use crate::protocol::RegimeDetector;
use kestrel_core::{MarketWindow, Result, stats};
use log::debug;

/// Minimum efficiency ratio for a move to count as a trend
pub const MIN_TREND_EFFICIENCY: f64 = 0.5;
/// Volume ratio at or above which volume is high
pub const HIGH_VOLUME_RATIO: f64 = 2.0;
/// Volume ratio at or below which volume is low
pub const LOW_VOLUME_RATIO: f64 = 0.5;

/// Regime classifier driven by window statistics
#[derive(Debug, Clone, Default)]
pub struct StatisticalRegimeDetector {
    config: RegimeConfig,
}

impl StatisticalRegimeDetector {
    pub fn new(config: RegimeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RegimeConfig {
        &self.config
    }

    /// Compare the latest volume with the trailing average before it
    pub fn volume_profile(&self, window: &MarketWindow) -> VolumeProfile {
        let trailing = window.volumes_before_last(self.config.volume_ma_period);
        let average = stats::mean(trailing);
        if trailing.is_empty() || average <= 0.0 {
            return VolumeProfile::Normal;
        }

        let ratio = window.last_volume() / average;
        if ratio >= HIGH_VOLUME_RATIO {
            VolumeProfile::High
        } else if ratio <= LOW_VOLUME_RATIO {
            VolumeProfile::Low
        } else {
            VolumeProfile::Normal
        }
    }
}

/// Confidence for a statistic that cleared its threshold by `ratio` (>= 1)
fn separation_confidence(ratio: f64) -> f64 {
    if ratio <= 0.0 {
        return 0.0;
    }
    (1.0 - 0.5 / ratio).clamp(0.0, 1.0)
}

/// Confidence for a trend; strictly above 0.5 for any efficient, non-zero move
fn trend_confidence(efficiency: f64, trend_ratio: f64) -> f64 {
    let saturation = trend_ratio / (1.0 + trend_ratio);
    (0.5 + 0.5 * efficiency * saturation).clamp(0.0, 1.0)
}

impl RegimeDetector for StatisticalRegimeDetector {
    fn analyze_regime(&self, window: &MarketWindow) -> Result<RegimeAssessment> {
        window.require(self.config.lookback_period)?;

        let prices = window.recent_prices(self.config.lookback_period);
        let efficiency = stats::efficiency_ratio(prices);
        let trend_strength = stats::net_change(prices) * efficiency;
        let volatility = stats::return_volatility(prices);

        let trend_ratio = trend_strength.abs() / self.config.trend_strength_threshold;
        let volatility_ratio = volatility / self.config.volatility_threshold;

        let (regime, trend_direction, confidence) =
            if efficiency >= MIN_TREND_EFFICIENCY && trend_strength != 0.0 {
                let direction = if trend_strength > 0.0 {
                    TrendDirection::Bullish
                } else {
                    TrendDirection::Bearish
                };
                (
                    MarketRegime::Trending,
                    direction,
                    trend_confidence(efficiency, trend_ratio),
                )
            } else if volatility_ratio > 1.0 {
                (
                    MarketRegime::HighVolatility,
                    TrendDirection::None,
                    separation_confidence(volatility_ratio),
                )
            } else {
                let nearest = volatility_ratio.max(efficiency / MIN_TREND_EFFICIENCY);
                (
                    MarketRegime::RangeBound,
                    TrendDirection::None,
                    (1.0 - nearest / 2.0).clamp(0.0, 1.0),
                )
            };

        let rsi_levels = match regime {
            MarketRegime::Trending => RsiLevels::TIGHT,
            MarketRegime::HighVolatility | MarketRegime::RangeBound => RsiLevels::WIDE,
        };
        let volume_profile = self.volume_profile(window);

        debug!(
            "[Regime] {} ({:?}) confidence={:.3} strength={:.5} efficiency={:.3} volatility={:.5} volume={:?}",
            regime, trend_direction, confidence, trend_strength, efficiency, volatility, volume_profile
        );

        Ok(RegimeAssessment {
            regime,
            trend_direction,
            confidence,
            rsi_levels,
            volume_profile,
            trend_strength,
            volatility,
        })
    }

    fn name(&self) -> &str {
        "statistical"
    }
}
