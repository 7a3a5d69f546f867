//! Market window - immutable price/volume snapshot
//!
//! Every analysis call receives a `MarketWindow`. Construction validates the
//! series once, so downstream statistics never see mismatched lengths,
//! non-finite numbers or non-positive prices.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Ordered price and volume observations, most recent last
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct MarketWindow {
    prices: Vec<f64>,
    volumes: Vec<f64>,
}

/// Unvalidated wire form
#[derive(Deserialize)]
struct RawWindow {
    prices: Vec<f64>,
    volumes: Vec<f64>,
}

impl TryFrom<RawWindow> for MarketWindow {
    type Error = Error;

    fn try_from(raw: RawWindow) -> Result<Self> {
        MarketWindow::new(raw.prices, raw.volumes)
    }
}

impl MarketWindow {
    /// Create a validated window
    pub fn new(prices: Vec<f64>, volumes: Vec<f64>) -> Result<Self> {
        if prices.is_empty() {
            return Err(Error::InsufficientData {
                required: 1,
                available: 0,
            });
        }
        if prices.len() != volumes.len() {
            return Err(Error::InvalidInput(format!(
                "price and volume series differ in length: {} vs {}",
                prices.len(),
                volumes.len()
            )));
        }
        if let Some((i, p)) = prices
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(Error::InvalidInput(format!(
                "price[{i}] must be finite and positive, got {p}"
            )));
        }
        if let Some((i, v)) = volumes
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(Error::InvalidInput(format!(
                "volume[{i}] must be finite and non-negative, got {v}"
            )));
        }

        Ok(Self { prices, volumes })
    }

    /// Window with a constant volume for every price
    pub fn with_flat_volume(prices: Vec<f64>, volume: f64) -> Result<Self> {
        let volumes = vec![volume; prices.len()];
        Self::new(prices, volumes)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    /// Most recent price
    pub fn last_price(&self) -> f64 {
        self.prices[self.prices.len() - 1]
    }

    /// Most recent volume
    pub fn last_volume(&self) -> f64 {
        self.volumes[self.volumes.len() - 1]
    }

    /// Fail with `InsufficientData` unless at least `required` observations exist
    pub fn require(&self, required: usize) -> Result<()> {
        if self.len() < required {
            return Err(Error::InsufficientData {
                required,
                available: self.len(),
            });
        }
        Ok(())
    }

    /// The most recent `n` prices (all of them if fewer exist)
    pub fn recent_prices(&self, n: usize) -> &[f64] {
        &self.prices[self.len().saturating_sub(n)..]
    }

    /// The `n` prices preceding the latest observation
    pub fn prices_before_last(&self, n: usize) -> &[f64] {
        let end = self.len() - 1;
        &self.prices[end.saturating_sub(n)..end]
    }

    /// The `n` volumes preceding the latest observation
    pub fn volumes_before_last(&self, n: usize) -> &[f64] {
        let end = self.len() - 1;
        &self.volumes[end.saturating_sub(n)..end]
    }
}
