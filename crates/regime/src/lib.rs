//! Kestrel Regime Classifier
//!
//! Turns a price/volume window into a regime classification:
//!
//! - **Trending**: strong, consistent directional move over the lookback
//! - **High volatility**: dispersion of returns above threshold
//! - **Range bound**: neither of the above
//!
//! Alongside the regime the assessment carries a confidence, oscillator
//! bands adapted to the regime, and a volume profile for the latest bar.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kestrel_regime::{RegimeConfig, RegimeDetector, StatisticalRegimeDetector};
//!
//! let detector = StatisticalRegimeDetector::new(RegimeConfig::default());
//! let assessment = detector.analyze_regime(&window)?;
//! if assessment.is_trending() { /* ... */ }
//! ```

pub mod classifier;
pub mod config;
pub mod domain;
pub mod protocol;

// Re-export main types
pub use classifier::StatisticalRegimeDetector;
pub use config::RegimeConfig;
pub use domain::{MarketRegime, RegimeAssessment, RsiLevels, TrendDirection, VolumeProfile};
pub use protocol::RegimeDetector;
