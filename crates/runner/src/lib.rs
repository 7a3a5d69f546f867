//! Kestrel Runner - Message-Driven Trading Agents
//!
//! Wires the regime classifier, a signal generator and the risk engine into
//! one stateful agent per trading identity:
//!
//! - **Agent**: Lifecycle (`initialize`, `process_message`, `shutdown`)
//! - **Messages**: Market data, risk updates, emergency stops
//! - **Handle**: One tokio task per agent behind a bounded channel
//!
//! ## Architecture
//!
//! ```text
//!   market data ─┐
//!   risk update ─┼──► AgentHandle ──► channel ──► TradingAgent
//!   emergency ───┘                                    │
//!                                     ┌───────────────┼───────────────┐
//!                                     ▼               ▼               ▼
//!                               SignalGenerator   RiskManager     Positions
//!                               (regime + signal) (validate)      (open/close)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kestrel_runner::{AgentConfig, AgentMessage, MomentumAgent, spawn_agent};
//!
//! let agent = MomentumAgent::momentum("momentum-1", AgentConfig::default())?;
//! let (handle, task) = spawn_agent(agent, 64);
//! let outcome = handle.send(AgentMessage::emergency_stop("ops", "halt")).await?;
//! assert_eq!(outcome.status(), "emergency_stop_executed");
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod handle;
pub mod messages;

// Re-export main types
pub use agent::{Agent, AgentState, MomentumAgent, PerformanceMetrics, TradingAgent};
pub use config::{AgentConfig, AgentLimits};
pub use error::{ConfigError, RuntimeError};
pub use handle::{AgentHandle, spawn_agent};
pub use messages::{
    AgentMessage, ClosedPosition, EmergencyStopPayload, MarketDataPayload, MessageKind, Outcome,
    RiskUpdatePayload, TradeAction,
};
