//! Market Regime Types
//!
//! Closed enumerations for everything the classifier reports, and the
//! assessment value that bundles them.

use kestrel_core::Direction;
use serde::{Deserialize, Serialize};

/// Market regime classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketRegime {
    /// Strong directional trend
    Trending,
    /// Dispersion of returns above threshold
    HighVolatility,
    /// No dominant trend, orderly dispersion
    RangeBound,
}

impl std::fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketRegime::Trending => write!(f, "trending"),
            MarketRegime::HighVolatility => write!(f, "high_volatility"),
            MarketRegime::RangeBound => write!(f, "range_bound"),
        }
    }
}

/// Direction of the dominant trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Bullish,
    Bearish,
    None,
}

impl TrendDirection {
    /// Does a trade in `direction` go with this trend?
    pub fn agrees_with(&self, direction: Direction) -> bool {
        matches!(
            (self, direction),
            (TrendDirection::Bullish, Direction::Long) | (TrendDirection::Bearish, Direction::Short)
        )
    }

    /// Does a trade in `direction` go against this trend?
    pub fn opposes(&self, direction: Direction) -> bool {
        matches!(
            (self, direction),
            (TrendDirection::Bullish, Direction::Short) | (TrendDirection::Bearish, Direction::Long)
        )
    }
}

/// Latest volume relative to its trailing average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeProfile {
    High,
    Normal,
    Low,
}

/// Oscillator overbought/oversold bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RsiLevels {
    pub lower: u8,
    pub upper: u8,
}

impl RsiLevels {
    /// Default bands
    pub const WIDE: RsiLevels = RsiLevels {
        lower: 20,
        upper: 80,
    };
    /// Bands used while a trend dominates - triggers sooner
    pub const TIGHT: RsiLevels = RsiLevels {
        lower: 40,
        upper: 60,
    };

    pub fn as_tuple(&self) -> (u8, u8) {
        (self.lower, self.upper)
    }
}

/// Output of one classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeAssessment {
    pub regime: MarketRegime,
    pub trend_direction: TrendDirection,
    /// How clearly the window falls into `regime` (0.0 - 1.0)
    pub confidence: f64,
    pub rsi_levels: RsiLevels,
    pub volume_profile: VolumeProfile,
    /// Signed trend statistic the decision was based on
    pub trend_strength: f64,
    /// Standard deviation of returns over the lookback
    pub volatility: f64,
}

impl RegimeAssessment {
    pub fn is_trending(&self) -> bool {
        self.regime == MarketRegime::Trending
    }

    pub fn is_high_volatility(&self) -> bool {
        self.regime == MarketRegime::HighVolatility
    }

    pub fn is_range_bound(&self) -> bool {
        self.regime == MarketRegime::RangeBound
    }

    /// Trending, and the trend runs against `direction`
    pub fn trades_against_trend(&self, direction: Direction) -> bool {
        self.is_trending() && self.trend_direction.opposes(direction)
    }

    /// Trending, and the trend runs with `direction`
    pub fn trades_with_trend(&self, direction: Direction) -> bool {
        self.is_trending() && self.trend_direction.agrees_with(direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_agreement() {
        assert!(TrendDirection::Bullish.agrees_with(Direction::Long));
        assert!(TrendDirection::Bearish.agrees_with(Direction::Short));
        assert!(TrendDirection::Bullish.opposes(Direction::Short));
        assert!(!TrendDirection::None.agrees_with(Direction::Long));
        assert!(!TrendDirection::None.opposes(Direction::Long));
    }

    #[test]
    fn test_rsi_levels() {
        assert_eq!(RsiLevels::WIDE.as_tuple(), (20, 80));
        assert_eq!(RsiLevels::TIGHT.as_tuple(), (40, 60));
    }

    #[test]
    fn test_regime_serde_names() {
        let json = serde_json::to_string(&MarketRegime::HighVolatility).unwrap();
        assert_eq!(json, "\"high_volatility\"");
        assert_eq!(MarketRegime::RangeBound.to_string(), "range_bound");
        let profile: VolumeProfile = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(profile, VolumeProfile::Low);
    }

    #[test]
    fn test_assessment_trend_helpers() {
        let assessment = RegimeAssessment {
            regime: MarketRegime::Trending,
            trend_direction: TrendDirection::Bearish,
            confidence: 0.9,
            rsi_levels: RsiLevels::TIGHT,
            volume_profile: VolumeProfile::Normal,
            trend_strength: -0.05,
            volatility: 0.001,
        };
        assert!(assessment.trades_against_trend(Direction::Long));
        assert!(assessment.trades_with_trend(Direction::Short));
        assert!(!assessment.is_range_bound());
    }
}
