//! Regime classifier configuration

use kestrel_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the regime classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeConfig {
    /// Number of recent prices the trend and volatility statistics cover
    pub lookback_period: usize,
    /// Return standard deviation above which the market is volatile
    pub volatility_threshold: f64,
    /// Efficiency-weighted move at which trend confidence reaches 0.75
    pub trend_strength_threshold: f64,
    /// Trailing volumes averaged for the volume profile
    pub volume_ma_period: usize,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            lookback_period: 20,
            volatility_threshold: 0.02,    // 2% return dispersion
            trend_strength_threshold: 0.01, // 1% efficient net move
            volume_ma_period: 14,
        }
    }
}

impl RegimeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.lookback_period < 2 {
            return Err(Error::invalid(format!(
                "lookback_period must be at least 2, got {}",
                self.lookback_period
            )));
        }
        if self.volume_ma_period == 0 {
            return Err(Error::invalid("volume_ma_period must be positive"));
        }
        kestrel_core::error::ensure_positive("volatility_threshold", self.volatility_threshold)?;
        kestrel_core::error::ensure_positive(
            "trend_strength_threshold",
            self.trend_strength_threshold,
        )?;
        Ok(())
    }
}
