//! Regime Detection Protocol

use crate::domain::RegimeAssessment;
use kestrel_core::{MarketWindow, Result};

/// Regime detection interface
///
/// Implementations are pure functions of the window and their own
/// configuration, so one instance can be shared across agents.
pub trait RegimeDetector: Send + Sync {
    /// Classify the current regime of `window`
    fn analyze_regime(&self, window: &MarketWindow) -> Result<RegimeAssessment>;

    /// Get the model name for logging/debugging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarketRegime, RsiLevels, TrendDirection, VolumeProfile};

    struct FixedDetector;

    impl RegimeDetector for FixedDetector {
        fn analyze_regime(&self, _window: &MarketWindow) -> Result<RegimeAssessment> {
            Ok(RegimeAssessment {
                regime: MarketRegime::RangeBound,
                trend_direction: TrendDirection::None,
                confidence: 1.0,
                rsi_levels: RsiLevels::WIDE,
                volume_profile: VolumeProfile::Normal,
                trend_strength: 0.0,
                volatility: 0.0,
            })
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_trait_object() {
        let detector: Box<dyn RegimeDetector> = Box::new(FixedDetector);
        let window = MarketWindow::with_flat_volume(vec![100.0, 101.0], 1.0).unwrap();
        let assessment = detector.analyze_regime(&window).unwrap();
        assert_eq!(assessment.regime, MarketRegime::RangeBound);
        assert_eq!(detector.name(), "fixed");
    }
}
