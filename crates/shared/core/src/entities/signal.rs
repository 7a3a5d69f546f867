//! Signal - what strategies output
//!
//! A strategy either returns one fully populated signal or nothing.

use crate::entities::Direction;
use crate::error::{Error, Result, ensure_finite, ensure_positive};
use serde::{Deserialize, Serialize};

/// Trade signal from a strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Which way to trade
    pub direction: Direction,
    /// Size to trade, bounded by the strategy's maximum
    pub position_size: f64,
    /// Confidence in the signal (0.0 - 1.0)
    pub confidence: f64,
    /// Protective stop price
    pub stop_loss: f64,
    /// Profit target price
    pub target_price: f64,
    /// Price the signal was generated at
    pub entry_price: f64,
}

impl Signal {
    /// Distance between entry and stop
    pub fn stop_distance(&self) -> f64 {
        (self.entry_price - self.stop_loss).abs()
    }

    pub fn is_long(&self) -> bool {
        self.direction == Direction::Long
    }

    pub fn is_short(&self) -> bool {
        self.direction == Direction::Short
    }

    /// Check every field is finite and inside its domain
    pub fn validate(&self) -> Result<()> {
        ensure_positive("position_size", self.position_size)?;
        ensure_finite("confidence", self.confidence)?;
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(Error::InvalidInput(format!(
                "confidence must be within [0, 1], got {}",
                self.confidence
            )));
        }
        ensure_positive("stop_loss", self.stop_loss)?;
        ensure_positive("target_price", self.target_price)?;
        ensure_positive("entry_price", self.entry_price)?;
        Ok(())
    }
}
