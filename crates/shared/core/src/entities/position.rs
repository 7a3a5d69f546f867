use crate::entities::{Direction, Signal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a position's bracket closed it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TargetReached,
    StrategyExit,
    EmergencyStop,
}

/// An open position held by one agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Unique position identifier
    pub id: Uuid,

    /// Position side (long/short)
    pub side: Direction,

    /// Size (always positive)
    pub size: f64,

    /// Entry price
    pub entry_price: f64,

    /// Latest marked price
    pub current_price: f64,

    /// Prices observed since entry, most recent last
    pub price_history: Vec<f64>,

    /// Protective stop, if any
    pub stop_loss: Option<f64>,

    /// Profit target, if any
    pub target_price: Option<f64>,

    /// When the position was opened
    pub opened_at: DateTime<Utc>,

    /// Last mark time
    pub updated_at: DateTime<Utc>,
}

impl Position {
    /// Open a position at `entry_price` with no bracket
    pub fn new(side: Direction, entry_price: f64, size: f64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            side,
            size,
            entry_price,
            current_price: entry_price,
            price_history: vec![entry_price],
            stop_loss: None,
            target_price: None,
            opened_at: now,
            updated_at: now,
        }
    }

    /// Open a position from an accepted signal
    pub fn from_signal(signal: &Signal, entry_price: f64, size: f64) -> Self {
        Self::new(signal.direction, entry_price, size)
            .with_bracket(signal.stop_loss, signal.target_price)
    }

    /// Builder: set stop and target
    pub fn with_bracket(mut self, stop_loss: f64, target_price: f64) -> Self {
        self.stop_loss = Some(stop_loss);
        self.target_price = Some(target_price);
        self
    }

    /// Builder: replace the price history; the last entry becomes the current price
    pub fn with_history(mut self, history: Vec<f64>) -> Self {
        if let Some(&last) = history.last() {
            self.current_price = last;
        }
        self.price_history = history;
        self
    }

    /// Record a new market price
    pub fn mark(&mut self, price: f64) {
        self.current_price = price;
        self.price_history.push(price);
        self.updated_at = Utc::now();
    }

    /// Unrealized PnL at the current price (sign-aware)
    pub fn unrealized_pnl(&self) -> f64 {
        (self.current_price - self.entry_price) * self.size * self.side.sign()
    }

    /// Absolute notional at the current price
    pub fn notional(&self) -> f64 {
        (self.current_price * self.size).abs()
    }

    /// Check the stop/target bracket against the current price
    pub fn bracket_hit(&self) -> Option<ExitReason> {
        let price = self.current_price;
        match self.side {
            Direction::Long => {
                if self.stop_loss.is_some_and(|stop| price <= stop) {
                    Some(ExitReason::StopLoss)
                } else if self.target_price.is_some_and(|target| price >= target) {
                    Some(ExitReason::TargetReached)
                } else {
                    None
                }
            }
            Direction::Short => {
                if self.stop_loss.is_some_and(|stop| price >= stop) {
                    Some(ExitReason::StopLoss)
                } else if self.target_price.is_some_and(|target| price <= target) {
                    Some(ExitReason::TargetReached)
                } else {
                    None
                }
            }
        }
    }
}
