//! Agent Messages
//!
//! Inbound messages carry a sender, a kind, a JSON payload, a priority and
//! a timestamp. Each processed message yields one `Outcome` whose
//! serialized form always carries a `status` key.

use crate::error::RuntimeError;
use chrono::{DateTime, Utc};
use kestrel_core::{Direction, ExitReason, MarketWindow};
use kestrel_strategy::RiskOverrides;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message kind
///
/// Unknown kinds are kept verbatim so the agent can acknowledge and skip them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageKind {
    MarketData,
    RiskUpdate,
    EmergencyStop,
    Unknown(String),
}

impl MessageKind {
    pub fn as_str(&self) -> &str {
        match self {
            MessageKind::MarketData => "market_data",
            MessageKind::RiskUpdate => "risk_update",
            MessageKind::EmergencyStop => "emergency_stop",
            MessageKind::Unknown(kind) => kind,
        }
    }
}

impl From<String> for MessageKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "market_data" => MessageKind::MarketData,
            "risk_update" => MessageKind::RiskUpdate,
            "emergency_stop" => MessageKind::EmergencyStop,
            _ => MessageKind::Unknown(kind),
        }
    }
}

impl From<&str> for MessageKind {
    fn from(kind: &str) -> Self {
        MessageKind::from(kind.to_string())
    }
}

impl From<MessageKind> for String {
    fn from(kind: MessageKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound agent message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub sender: String,
    pub message_type: MessageKind,
    pub content: serde_json::Value,
    /// Informational only; messages are handled in arrival order
    #[serde(default)]
    pub priority: u8,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl AgentMessage {
    pub fn new(
        sender: impl Into<String>,
        message_type: impl Into<MessageKind>,
        content: serde_json::Value,
    ) -> Self {
        Self {
            sender: sender.into(),
            message_type: message_type.into(),
            content,
            priority: 1,
            timestamp: Utc::now(),
        }
    }

    /// Builder: set priority
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn market_data(sender: impl Into<String>, data: &MarketDataPayload) -> Self {
        Self::new(sender, MessageKind::MarketData, to_content(data))
    }

    pub fn risk_update(sender: impl Into<String>, overrides: RiskOverrides) -> Self {
        let payload = RiskUpdatePayload {
            risk_limits: overrides,
        };
        Self::new(sender, MessageKind::RiskUpdate, to_content(&payload)).with_priority(2)
    }

    pub fn emergency_stop(sender: impl Into<String>, reason: impl Into<String>) -> Self {
        let payload = EmergencyStopPayload {
            reason: Some(reason.into()),
            severity: Some("high".to_string()),
        };
        Self::new(sender, MessageKind::EmergencyStop, to_content(&payload)).with_priority(3)
    }

    /// Decode the content as `T`, reporting failures against this message's kind
    pub fn payload<T: serde::de::DeserializeOwned>(&self) -> Result<T, RuntimeError> {
        serde_json::from_value(self.content.clone())
            .map_err(|e| RuntimeError::invalid_message(self.message_type.as_str(), e))
    }
}

fn to_content<T: Serialize>(payload: &T) -> serde_json::Value {
    serde_json::to_value(payload).unwrap_or(serde_json::Value::Null)
}

/// Content of a `market_data` message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDataPayload {
    /// Latest traded price; defaults to the last price in the history
    pub price: Option<f64>,
    pub price_history: Vec<f64>,
    /// Per-price volumes; when absent every volume is zero
    pub volume_history: Vec<f64>,
}

impl MarketDataPayload {
    pub fn new(price_history: Vec<f64>, volume_history: Vec<f64>) -> Self {
        Self {
            price: price_history.last().copied(),
            price_history,
            volume_history,
        }
    }

    /// Builder: set the latest price explicitly
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn window(&self) -> Result<MarketWindow, RuntimeError> {
        let window = if self.volume_history.is_empty() {
            MarketWindow::with_flat_volume(self.price_history.clone(), 0.0)
        } else {
            MarketWindow::new(self.price_history.clone(), self.volume_history.clone())
        };
        window.map_err(|e| RuntimeError::invalid_message(MessageKind::MarketData.as_str(), e))
    }

    /// Price positions are marked at
    pub fn mark_price(&self, window: &MarketWindow) -> Result<f64, RuntimeError> {
        match self.price {
            Some(price) if price.is_finite() && price > 0.0 => Ok(price),
            Some(price) => Err(RuntimeError::invalid_message(
                MessageKind::MarketData.as_str(),
                format!("price must be positive and finite, got {price}"),
            )),
            None => Ok(window.last_price()),
        }
    }
}

/// Content of a `risk_update` message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskUpdatePayload {
    pub risk_limits: RiskOverrides,
}

/// Content of an `emergency_stop` message; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencyStopPayload {
    pub reason: Option<String>,
    pub severity: Option<String>,
}

/// A position closed while handling a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedPosition {
    pub position_id: Uuid,
    pub side: Direction,
    pub size: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
    pub reason: ExitReason,
}

/// What a market-data message did to the position set
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TradeAction {
    Opened {
        position_id: Uuid,
        direction: Direction,
        size: f64,
        entry_price: f64,
        confidence: f64,
    },
    /// At the position cap, the latest same-side position had its bracket refreshed
    Adjusted {
        position_id: Uuid,
        stop_loss: f64,
        target_price: f64,
    },
    Hold {
        reason: String,
    },
    /// The risk engine refused the trade
    Rejected {
        reason: String,
    },
}

impl TradeAction {
    pub fn hold(reason: impl Into<String>) -> Self {
        TradeAction::Hold {
            reason: reason.into(),
        }
    }

    pub fn is_opened(&self) -> bool {
        matches!(self, TradeAction::Opened { .. })
    }
}

/// Result of processing one message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Processed {
        #[serde(flatten)]
        action: TradeAction,
        closed_positions: Vec<ClosedPosition>,
    },
    RiskUpdated {
        applied: Vec<String>,
    },
    /// Every position removed; those the risk engine could not value are
    /// listed by id without a realized PnL
    EmergencyStopExecuted {
        closed_positions: Vec<ClosedPosition>,
        unvalued_positions: Vec<Uuid>,
    },
    /// Unknown message kind, acknowledged without effect
    Ignored {
        message_type: String,
    },
}

impl Outcome {
    pub fn status(&self) -> &'static str {
        match self {
            Outcome::Processed { .. } => "processed",
            Outcome::RiskUpdated { .. } => "risk_updated",
            Outcome::EmergencyStopExecuted { .. } => "emergency_stop_executed",
            Outcome::Ignored { .. } => "ignored",
        }
    }

    pub fn action(&self) -> Option<&TradeAction> {
        match self {
            Outcome::Processed { action, .. } => Some(action),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        to_content(self)
    }
}
