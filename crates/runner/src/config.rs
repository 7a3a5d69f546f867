//! Agent configuration and live limits

use crate::error::ConfigError;
use kestrel_core::error::ensure_positive;
use kestrel_core::{Error, Result};
use kestrel_regime::RegimeConfig;
use kestrel_risk_manager::RiskConfig;
use kestrel_strategy::{MomentumConfig, RiskOverrides};
use serde::{Deserialize, Serialize};

/// Agent configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Minimum |momentum| the agent acts on
    pub momentum_threshold: f64,
    /// Base position size
    pub position_size: f64,
    /// Largest size any single position may have
    pub max_position_size: f64,
    /// Open positions allowed at once
    pub max_positions: usize,
    /// Fraction of account balance risked between entry and stop
    pub risk_per_trade: f64,
    /// Portfolio drawdown beyond which no new positions open
    pub max_drawdown: f64,
    /// Shrink size when portfolio volatility runs hot
    pub volatility_adjustment: bool,
    #[serde(alias = "regime_config")]
    pub regime: RegimeConfig,
    pub risk: RiskConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            momentum_threshold: 0.02,
            position_size: 0.1,
            max_position_size: 0.3,
            max_positions: 3,
            risk_per_trade: 0.02,
            max_drawdown: 0.2,
            volatility_adjustment: true,
            regime: RegimeConfig::default(),
            risk: RiskConfig {
                max_position_size: 0.3,
                ..Default::default()
            },
        }
    }
}

impl AgentConfig {
    /// Parse and validate configuration from a JSON string
    pub fn from_json(json: &str) -> std::result::Result<Self, ConfigError> {
        let config: AgentConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        AgentLimits::from_config(self).validate()?;
        self.regime.validate()?;
        self.risk.validate()?;
        Ok(())
    }

    /// Momentum strategy parameters for an agent called `agent_id`
    pub fn momentum_config(&self, agent_id: &str) -> MomentumConfig {
        MomentumConfig {
            strategy_id: agent_id.to_string(),
            momentum_threshold: self.momentum_threshold,
            position_size: self.position_size,
            max_position_size: self.max_position_size,
            volatility_adjustment: self.volatility_adjustment,
            regime_config: self.regime.clone(),
        }
    }
}

/// Limits a running agent enforces; replaced in place by risk updates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentLimits {
    pub momentum_threshold: f64,
    pub position_size: f64,
    pub max_position_size: f64,
    pub max_positions: usize,
    pub risk_per_trade: f64,
    pub max_drawdown: f64,
}

impl AgentLimits {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            momentum_threshold: config.momentum_threshold,
            position_size: config.position_size,
            max_position_size: config.max_position_size,
            max_positions: config.max_positions,
            risk_per_trade: config.risk_per_trade,
            max_drawdown: config.max_drawdown,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("momentum_threshold", self.momentum_threshold)?;
        ensure_positive("position_size", self.position_size)?;
        ensure_positive("max_position_size", self.max_position_size)?;
        if self.position_size > self.max_position_size {
            return Err(Error::invalid(format!(
                "position_size {} exceeds max_position_size {}",
                self.position_size, self.max_position_size
            )));
        }
        if self.max_positions == 0 {
            return Err(Error::invalid("max_positions must be positive"));
        }
        for (name, value) in [
            ("risk_per_trade", self.risk_per_trade),
            ("max_drawdown", self.max_drawdown),
        ] {
            ensure_positive(name, value)?;
            if value > 1.0 {
                return Err(Error::invalid(format!("{name} must be at most 1, got {value}")));
            }
        }
        Ok(())
    }

    /// Limits with `overrides` applied, validated as a whole
    pub fn merged(&self, overrides: &RiskOverrides) -> Result<(Self, Vec<&'static str>)> {
        overrides.validate()?;

        let mut limits = *self;
        let mut applied = Vec::new();
        if let Some(value) = overrides.momentum_threshold {
            limits.momentum_threshold = value;
            applied.push("momentum_threshold");
        }
        if let Some(value) = overrides.position_size {
            limits.position_size = value;
            applied.push("position_size");
        }
        if let Some(value) = overrides.max_position_size {
            limits.max_position_size = value;
            applied.push("max_position_size");
        }
        if let Some(value) = overrides.max_positions {
            limits.max_positions = value;
            applied.push("max_positions");
        }
        if let Some(value) = overrides.risk_per_trade {
            limits.risk_per_trade = value;
            applied.push("risk_per_trade");
        }
        if let Some(value) = overrides.max_drawdown {
            limits.max_drawdown = value;
            applied.push("max_drawdown");
        }

        limits.validate()?;
        Ok((limits, applied))
    }

    /// These limits as a full set of overrides
    pub fn as_overrides(&self) -> RiskOverrides {
        RiskOverrides {
            momentum_threshold: Some(self.momentum_threshold),
            position_size: Some(self.position_size),
            max_position_size: Some(self.max_position_size),
            max_positions: Some(self.max_positions),
            risk_per_trade: Some(self.risk_per_trade),
            max_drawdown: Some(self.max_drawdown),
        }
    }
}
