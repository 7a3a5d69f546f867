//! Kestrel Risk Engine
//!
//! Scores the risk of individual positions and of the aggregate portfolio,
//! and gates proposed trades against configured limits:
//!
//! - **Position Risk**: PnL and return volatility per position
//! - **Portfolio Risk**: Exposure, volatility, drawdown, correlation
//! - **Trade Validation**: Size, exposure, leverage and margin limits
//! - **Risk Score**: A single scalar gate for downstream decisions
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Risk Manager                         │
//! │                                                             │
//! │  Position ──────► Position Risk ──┐                         │
//! │                                   ├──► Portfolio Metrics    │
//! │  Positions ───────────────────────┘          │              │
//! │                                              ▼              │
//! │  Trade Proposal ──► Limits ──────────► TradeDecision        │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine holds configuration only. Limit breaches come back as
//! `LimitViolation` values inside a `TradeDecision`, never as errors.

pub mod manager;
pub mod metrics;
pub mod parameters;
pub mod validation;

// Re-export main types
pub use manager::RiskManager;
pub use metrics::{PortfolioRiskMetrics, PositionRisk};
pub use parameters::{RiskConfig, RiskLimits};
pub use validation::{LimitViolation, TradeDecision, TradeProposal};
