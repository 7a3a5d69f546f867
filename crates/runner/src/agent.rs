//! Trading Agent - Runs a signal generator and manages its positions
//!
//! Each agent owns:
//! - Its open positions and the latest portfolio risk metrics
//! - The latest classified regime
//! - Performance counters
//! - Live limits, replaced in place by risk updates
//!
//! Messages are handled one at a time, each to completion, so there is no
//! concurrent mutation of an agent's state.

use crate::config::{AgentConfig, AgentLimits};
use crate::error::{ConfigError, RuntimeError};
use crate::messages::{
    AgentMessage, ClosedPosition, EmergencyStopPayload, MarketDataPayload, MessageKind, Outcome,
    RiskUpdatePayload, TradeAction,
};
use async_trait::async_trait;
use kestrel_core::{ExitReason, MarketWindow, Position, Signal};
use kestrel_regime::RegimeAssessment;
use kestrel_risk_manager::{PortfolioRiskMetrics, RiskManager, TradeProposal};
use kestrel_strategy::{MomentumStrategy, SignalContext, SignalGenerator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Agent lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Initialized,
    Running,
    ShutDown,
}

/// Message-driven agent lifecycle
#[async_trait]
pub trait Agent: Send {
    fn id(&self) -> &str;

    /// Establish starting state from configuration
    async fn initialize(&mut self) -> Result<(), RuntimeError>;

    /// Handle one message to completion
    async fn process_message(&mut self, message: AgentMessage) -> Result<Outcome, RuntimeError>;

    /// Release resources; safe to call more than once
    async fn shutdown(&mut self);
}

/// Limits the agent enforces itself, whatever its strategy supports
const AGENT_ENFORCED_LIMITS: [&str; 4] = [
    "max_position_size",
    "max_positions",
    "risk_per_trade",
    "max_drawdown",
];

/// Trade and PnL counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Positions opened
    pub total_trades: u64,
    pub closed_trades: u64,
    /// Closed with positive realized PnL
    pub winning_trades: u64,
    /// Realized PnL
    pub total_pnl: f64,
}

impl PerformanceMetrics {
    pub fn win_rate(&self) -> f64 {
        if self.closed_trades == 0 {
            0.0
        } else {
            self.winning_trades as f64 / self.closed_trades as f64
        }
    }

    fn record_close(&mut self, pnl: f64) {
        self.closed_trades += 1;
        self.total_pnl += pnl;
        if pnl > 0.0 {
            self.winning_trades += 1;
        }
    }
}

/// Agent running a signal generator against the risk engine
pub struct TradingAgent<S: SignalGenerator> {
    id: String,
    config: AgentConfig,
    strategy: S,
    risk: Arc<RiskManager>,
    limits: AgentLimits,
    positions: Vec<Position>,
    risk_metrics: PortfolioRiskMetrics,
    regime: Option<RegimeAssessment>,
    performance: PerformanceMetrics,
    state: AgentState,
    emergency_stopped: bool,
}

/// Agent trading window momentum
pub type MomentumAgent = TradingAgent<MomentumStrategy>;

impl MomentumAgent {
    /// Momentum agent with strategy parameters taken from `config`
    pub fn momentum(id: impl Into<String>, config: AgentConfig) -> Result<Self, ConfigError> {
        let id = id.into();
        let strategy = MomentumStrategy::new(config.momentum_config(&id))?;
        Self::new(id, config, strategy)
    }
}

impl<S: SignalGenerator> TradingAgent<S> {
    pub fn new(id: impl Into<String>, config: AgentConfig, strategy: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let risk = Arc::new(RiskManager::new(config.risk.clone()));

        Ok(Self {
            id: id.into(),
            limits: AgentLimits::from_config(&config),
            config,
            strategy,
            risk,
            positions: Vec::new(),
            risk_metrics: PortfolioRiskMetrics::default(),
            regime: None,
            performance: PerformanceMetrics::default(),
            state: AgentState::Initialized,
            emergency_stopped: false,
        })
    }

    /// Builder: share a risk engine between agents
    pub fn with_risk_manager(mut self, risk: Arc<RiskManager>) -> Self {
        self.risk = risk;
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn limits(&self) -> &AgentLimits {
        &self.limits
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn risk_metrics(&self) -> &PortfolioRiskMetrics {
        &self.risk_metrics
    }

    pub fn regime(&self) -> Option<&RegimeAssessment> {
        self.regime.as_ref()
    }

    pub fn performance(&self) -> &PerformanceMetrics {
        &self.performance
    }

    pub fn is_emergency_stopped(&self) -> bool {
        self.emergency_stopped
    }

    fn refresh_risk_metrics(&mut self) -> Result<(), RuntimeError> {
        self.risk_metrics = self.risk.calculate_portfolio_risk(&self.positions)?;
        Ok(())
    }

    /// Remove the position at `index`, realizing its PnL
    fn close_position(
        &mut self,
        index: usize,
        reason: ExitReason,
    ) -> Result<ClosedPosition, RuntimeError> {
        let pnl = self.risk.calculate_position_risk(&self.positions[index])?.pnl;
        let position = self.positions.remove(index);
        Ok(self.realize(position, pnl, reason))
    }

    fn realize(&mut self, position: Position, pnl: f64, reason: ExitReason) -> ClosedPosition {
        self.performance.record_close(pnl);

        log::info!(
            "[{}] Closed {} {:.4} @ {:.4} ({:?}), pnl={:.4}",
            self.id,
            position.side,
            position.size,
            position.current_price,
            reason,
            pnl
        );

        ClosedPosition {
            position_id: position.id,
            side: position.side,
            size: position.size,
            entry_price: position.entry_price,
            exit_price: position.current_price,
            pnl,
            reason,
        }
    }

    /// Close positions whose bracket was hit or whose exit condition holds
    fn close_exited_positions(
        &mut self,
        window: &MarketWindow,
    ) -> Result<Vec<ClosedPosition>, RuntimeError> {
        let mut closed = Vec::new();
        let mut index = 0;
        while index < self.positions.len() {
            let position = &self.positions[index];
            let reason = match position.bracket_hit() {
                Some(reason) => Some(reason),
                None => match self.strategy.should_exit(position, window) {
                    Ok(true) => Some(ExitReason::StrategyExit),
                    Ok(false) => None,
                    Err(e) if e.is_insufficient_data() => None,
                    Err(e) => return Err(e.into()),
                },
            };

            match reason {
                Some(reason) => closed.push(self.close_position(index, reason)?),
                None => index += 1,
            }
        }
        Ok(closed)
    }

    /// Size after the agent's own limits and the per-trade risk budget
    fn sized(&self, signal: &Signal) -> f64 {
        let mut size = signal.position_size.min(self.limits.max_position_size);

        let stop_distance = signal.stop_distance();
        if stop_distance > 0.0 {
            let budget = self.limits.risk_per_trade * self.config.risk.risk_limits.account_balance;
            size = size.min(budget / stop_distance);
        }
        size
    }

    fn handle_market_data(&mut self, message: &AgentMessage) -> Result<Outcome, RuntimeError> {
        let payload: MarketDataPayload = message.payload()?;
        let window = payload.window()?;
        let price = payload.mark_price(&window)?;

        for position in &mut self.positions {
            position.mark(price);
        }
        let closed_positions = self.close_exited_positions(&window)?;

        let action = self.decide(&window, price)?;
        self.refresh_risk_metrics()?;

        Ok(Outcome::Processed {
            action,
            closed_positions,
        })
    }

    /// Analyze the window and open, adjust or hold
    ///
    /// Positions stack up to `max_positions` in either direction. At the cap a
    /// signal refreshes the bracket of the latest position on its side.
    fn decide(&mut self, window: &MarketWindow, price: f64) -> Result<TradeAction, RuntimeError> {
        let analysis = match self.strategy.analyze_market(window) {
            Ok(analysis) => analysis,
            Err(e) if e.is_insufficient_data() => {
                log::debug!("[{}] {}", self.id, e);
                return Ok(TradeAction::hold(e.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        self.regime = Some(analysis.regime);

        if self.emergency_stopped {
            return Ok(TradeAction::hold("emergency stop active"));
        }

        self.refresh_risk_metrics()?;
        if self.risk_metrics.drawdown > self.limits.max_drawdown {
            log::warn!(
                "[{}] Drawdown {:.4} exceeds {:.4}, not opening",
                self.id,
                self.risk_metrics.drawdown,
                self.limits.max_drawdown
            );
            return Ok(TradeAction::hold("max drawdown exceeded"));
        }

        let ctx = SignalContext::with_recent_volatility(self.risk_metrics.volatility);
        let Some(signal) = self.strategy.generate_signal(window, &ctx)? else {
            return Ok(TradeAction::hold("no signal"));
        };

        if self.positions.len() >= self.limits.max_positions {
            let latest = self
                .positions
                .iter_mut()
                .rev()
                .find(|p| p.side == signal.direction);
            let Some(position) = latest else {
                return Ok(TradeAction::hold("max positions reached"));
            };

            position.stop_loss = Some(signal.stop_loss);
            position.target_price = Some(signal.target_price);
            log::debug!(
                "[{}] Adjusted {} bracket: stop={:.4} target={:.4}",
                self.id,
                position.id,
                signal.stop_loss,
                signal.target_price
            );
            return Ok(TradeAction::Adjusted {
                position_id: position.id,
                stop_loss: signal.stop_loss,
                target_price: signal.target_price,
            });
        }

        let size = self.sized(&signal);
        let exposure: f64 = self.positions.iter().map(Position::notional).sum();
        let proposal = TradeProposal::new(size, price).with_existing_exposure(exposure);
        let decision = self.risk.validate_trade(&proposal)?;
        if !decision.accepted {
            log::warn!("[{}] Trade rejected: {}", self.id, decision.reason);
            return Ok(TradeAction::Rejected {
                reason: decision.reason,
            });
        }

        let position = Position::from_signal(&signal, price, size);
        self.performance.total_trades += 1;
        log::info!(
            "[{}] Opened {} {:.4} @ {:.4} (stop={:.4}, target={:.4}, confidence={:.3})",
            self.id,
            signal.direction,
            size,
            price,
            signal.stop_loss,
            signal.target_price,
            signal.confidence
        );

        let action = TradeAction::Opened {
            position_id: position.id,
            direction: signal.direction,
            size,
            entry_price: price,
            confidence: signal.confidence,
        };
        self.positions.push(position);
        Ok(action)
    }

    fn handle_risk_update(&mut self, message: &AgentMessage) -> Result<Outcome, RuntimeError> {
        let payload: RiskUpdatePayload = message.payload()?;
        let (limits, merged) = self
            .limits
            .merged(&payload.risk_limits)
            .map_err(|e| RuntimeError::invalid_message(MessageKind::RiskUpdate.as_str(), e))?;

        self.limits = limits;
        let strategy_applied = self.strategy.apply_overrides(&payload.risk_limits);
        let (applied, unused): (Vec<_>, Vec<_>) = merged
            .into_iter()
            .partition(|name| {
                AGENT_ENFORCED_LIMITS.contains(name) || strategy_applied.contains(name)
            });
        if !unused.is_empty() {
            log::warn!(
                "[{}] {} strategy ignores overrides: {:?}",
                self.id,
                self.strategy.name(),
                unused
            );
        }
        log::info!("[{}] Risk limits updated: {:?}", self.id, applied);

        Ok(Outcome::RiskUpdated {
            applied: applied.into_iter().map(String::from).collect(),
        })
    }

    fn handle_emergency_stop(&mut self, message: &AgentMessage) -> Result<Outcome, RuntimeError> {
        // Never refuse a stop over its payload
        let payload: EmergencyStopPayload = message.payload().unwrap_or_default();
        log::warn!(
            "[{}] EMERGENCY STOP from {}: {} (severity: {})",
            self.id,
            message.sender,
            payload.reason.as_deref().unwrap_or("unspecified"),
            payload.severity.as_deref().unwrap_or("unspecified")
        );

        self.emergency_stopped = true;
        let mut closed_positions = Vec::with_capacity(self.positions.len());
        let mut unvalued_positions = Vec::new();
        for position in std::mem::take(&mut self.positions) {
            match self.risk.calculate_position_risk(&position) {
                Ok(risk) => {
                    let closed = self.realize(position, risk.pnl, ExitReason::EmergencyStop);
                    closed_positions.push(closed);
                }
                Err(e) => {
                    log::error!(
                        "[{}] Closed {} without a PnL: {}",
                        self.id,
                        position.id,
                        e
                    );
                    unvalued_positions.push(position.id);
                }
            }
        }
        self.risk_metrics = PortfolioRiskMetrics::default();

        Ok(Outcome::EmergencyStopExecuted {
            closed_positions,
            unvalued_positions,
        })
    }
}

#[async_trait]
impl<S: SignalGenerator> Agent for TradingAgent<S> {
    fn id(&self) -> &str {
        &self.id
    }

    async fn initialize(&mut self) -> Result<(), RuntimeError> {
        self.limits = AgentLimits::from_config(&self.config);
        self.strategy.apply_overrides(&self.limits.as_overrides());
        self.emergency_stopped = false;
        self.refresh_risk_metrics()?;
        self.state = AgentState::Running;

        log::info!(
            "[{}] Agent started ({} strategy, {} open positions)",
            self.id,
            self.strategy.name(),
            self.positions.len()
        );
        Ok(())
    }

    async fn process_message(&mut self, message: AgentMessage) -> Result<Outcome, RuntimeError> {
        if self.state != AgentState::Running {
            return Err(RuntimeError::NotRunning(self.state));
        }

        log::debug!(
            "[{}] {} from {} (priority {}, sent {})",
            self.id,
            message.message_type,
            message.sender,
            message.priority,
            message.timestamp
        );

        match &message.message_type {
            MessageKind::MarketData => self.handle_market_data(&message),
            MessageKind::RiskUpdate => self.handle_risk_update(&message),
            MessageKind::EmergencyStop => self.handle_emergency_stop(&message),
            MessageKind::Unknown(kind) => {
                log::debug!("[{}] Ignoring unknown message type {}", self.id, kind);
                Ok(Outcome::Ignored {
                    message_type: kind.clone(),
                })
            }
        }
    }

    async fn shutdown(&mut self) {
        if self.state == AgentState::ShutDown {
            return;
        }
        self.state = AgentState::ShutDown;
        log::info!(
            "[{}] Agent stopped: {} trades, {} wins, pnl={:.4}",
            self.id,
            self.performance.total_trades,
            self.performance.winning_trades,
            self.performance.total_pnl
        );
    }
}
