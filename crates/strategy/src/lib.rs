//! Kestrel Strategy Framework
//!
//! Regime-adaptive signal generators:
//! - Mean reversion: fade stretched prices back toward their recent mean
//! - Momentum: follow the net move across the window
//!
//! Both classify the market regime first and let it shape size,
//! confidence and the stop/target bracket of every signal.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kestrel_strategy::{MomentumConfig, MomentumStrategy, SignalContext, SignalGenerator};
//!
//! let strategy = MomentumStrategy::new(MomentumConfig::default())?;
//! if let Some(signal) = strategy.generate_signal(&window, &SignalContext::default())? {
//!     println!("{} {:.2}", signal.direction, signal.position_size);
//! }
//! ```

pub mod mean_reversion;
pub mod momentum;
pub mod strategy;

// Re-export main types
pub use mean_reversion::{MeanReversionConfig, MeanReversionStrategy};
pub use momentum::{MomentumConfig, MomentumStrategy};
pub use strategy::{Indicator, MarketAnalysis, RiskOverrides, SignalContext, SignalGenerator};
