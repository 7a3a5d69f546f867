//! Risk Manager
//!
//! Stateless risk engine:
//! - Scores single positions (PnL, volatility)
//! - Aggregates portfolio risk (exposure, volatility, drawdown, correlation)
//! - Validates proposed trades against configured limits
//!
//! Every method takes its inputs as arguments and only reads the
//! configuration, so one instance can be shared between agents without locks.

use crate::metrics::{PortfolioRiskMetrics, PositionRisk};
use crate::parameters::RiskConfig;
use crate::validation::{LimitViolation, TradeDecision, TradeProposal};
use kestrel_core::error::{ensure_finite, ensure_positive};
use kestrel_core::{Error, Position, Result, stats};
use log::{debug, warn};

/// Risk engine
#[derive(Debug, Clone, Default)]
pub struct RiskManager {
    config: RiskConfig,
}

impl RiskManager {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Reject positions with missing or non-finite risk-critical fields
    fn validate_position(position: &Position) -> Result<()> {
        ensure_positive("entry_price", position.entry_price)?;
        ensure_positive("current_price", position.current_price)?;
        ensure_positive("size", position.size)?;
        if position.price_history.is_empty() {
            return Err(Error::invalid(format!(
                "position {} has no price history",
                position.id
            )));
        }
        for price in &position.price_history {
            ensure_positive("price_history", *price)?;
        }
        Ok(())
    }

    /// Risk metrics for one position
    pub fn calculate_position_risk(&self, position: &Position) -> Result<PositionRisk> {
        Self::validate_position(position)?;

        let pnl = position.unrealized_pnl();
        let entry_notional = position.entry_price * position.size;

        Ok(PositionRisk {
            pnl,
            volatility: stats::return_volatility(&position.price_history),
            notional: position.notional(),
            return_pct: pnl / entry_notional,
        })
    }

    /// Aggregate risk over the live position set
    pub fn calculate_portfolio_risk(&self, positions: &[Position]) -> Result<PortfolioRiskMetrics> {
        let mut metrics = PortfolioRiskMetrics {
            position_count: positions.len(),
            ..Default::default()
        };
        if positions.is_empty() {
            return Ok(metrics);
        }

        let mut weighted_volatility = 0.0;
        let mut total_size = 0.0;
        for position in positions {
            let risk = self.calculate_position_risk(position)?;
            metrics.total_exposure += risk.notional;
            metrics.unrealized_pnl += risk.pnl;
            weighted_volatility += risk.volatility * position.size;
            total_size += position.size;
        }

        metrics.volatility = if total_size > 0.0 {
            weighted_volatility / total_size
        } else {
            0.0
        };
        metrics.drawdown = self.equity_drawdown(positions);
        metrics.max_correlation = Self::max_pairwise_correlation(positions);

        debug!(
            "[RISK] Portfolio: {} positions, exposure={:.2}, volatility={:.5}, drawdown={:.5}",
            metrics.position_count, metrics.total_exposure, metrics.volatility, metrics.drawdown
        );

        Ok(metrics)
    }

    /// Peak-to-trough decline of account equity along the positions' price paths.
    ///
    /// Histories are aligned on their most recent observation; a position
    /// contributes nothing before its history starts.
    fn equity_drawdown(&self, positions: &[Position]) -> f64 {
        let balance = self.config.risk_limits.account_balance;
        let steps = positions
            .iter()
            .map(|p| p.price_history.len())
            .max()
            .unwrap_or(0);

        let mut peak = f64::MIN;
        let mut max_drawdown = 0.0_f64;
        for t in 0..steps {
            let pnl: f64 = positions
                .iter()
                .filter_map(|p| {
                    let offset = steps - p.price_history.len();
                    let price = *p.price_history.get(t.checked_sub(offset)?)?;
                    Some((price - p.entry_price) * p.size * p.side.sign())
                })
                .sum();

            let equity = balance + pnl;
            peak = peak.max(equity);
            if peak > 0.0 {
                max_drawdown = max_drawdown.max((peak - equity) / peak);
            }
        }
        max_drawdown
    }

    /// Largest return correlation between any two positions
    fn max_pairwise_correlation(positions: &[Position]) -> f64 {
        let returns: Vec<Vec<f64>> = positions
            .iter()
            .map(|p| stats::simple_returns(&p.price_history))
            .collect();

        let mut max_correlation = 0.0_f64;
        for (i, a) in returns.iter().enumerate() {
            for b in &returns[i + 1..] {
                max_correlation = max_correlation.max(stats::correlation(a, b));
            }
        }
        max_correlation
    }

    /// Validate a proposed trade against every configured limit
    pub fn validate_trade(&self, trade: &TradeProposal) -> Result<TradeDecision> {
        trade.validate()?;

        let limits = &self.config.risk_limits;
        let notional = trade.notional();
        let total_exposure = trade.existing_exposure + notional;
        let required_margin = notional / limits.max_leverage;
        let leverage = total_exposure / limits.account_balance;

        let mut violations = Vec::new();

        if trade.size > self.config.max_position_size {
            violations.push(LimitViolation::PositionSize {
                requested: trade.size,
                limit: self.config.max_position_size,
            });
        }
        if total_exposure > limits.max_exposure {
            violations.push(LimitViolation::Exposure {
                requested: total_exposure,
                limit: limits.max_exposure,
            });
        }
        if leverage > limits.max_leverage {
            violations.push(LimitViolation::Leverage {
                requested: leverage,
                limit: limits.max_leverage,
            });
        }
        if required_margin > limits.available_margin {
            violations.push(LimitViolation::Margin {
                required: required_margin,
                available: limits.available_margin,
            });
        }

        if violations.is_empty() {
            Ok(TradeDecision::accept())
        } else {
            let decision = TradeDecision::reject(violations);
            warn!("[RISK] Trade rejected: {}", decision.reason);
            Ok(decision)
        }
    }

    /// Portfolio-level limits breached by `metrics`
    pub fn check_portfolio(&self, metrics: &PortfolioRiskMetrics) -> Vec<LimitViolation> {
        let mut violations = Vec::new();

        if metrics.variance() > self.config.max_portfolio_var {
            violations.push(LimitViolation::PortfolioVariance {
                variance: metrics.variance(),
                limit: self.config.max_portfolio_var,
            });
        }
        if metrics.drawdown > self.config.max_drawdown {
            violations.push(LimitViolation::Drawdown {
                drawdown: metrics.drawdown,
                limit: self.config.max_drawdown,
            });
        }
        if metrics.max_correlation > self.config.correlation_limit {
            violations.push(LimitViolation::Correlation {
                correlation: metrics.max_correlation,
                limit: self.config.correlation_limit,
            });
        }

        violations
    }

    /// Blend two risk inputs into one score in [0, 1].
    ///
    /// Arithmetic mean, so the score is symmetric in its arguments.
    pub fn risk_score(&self, position_risk: f64, portfolio_risk: f64) -> Result<f64> {
        ensure_finite("position_risk", position_risk)?;
        ensure_finite("portfolio_risk", portfolio_risk)?;
        Ok(((position_risk + portfolio_risk) / 2.0).clamp(0.0, 1.0))
    }
}
