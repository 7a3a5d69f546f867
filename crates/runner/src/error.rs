//! Runtime and configuration errors

use crate::agent::AgentState;
use thiserror::Error;

/// Failure while an agent handles a message
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Agent is not running (state: {0:?})")]
    NotRunning(AgentState),

    #[error("Analysis failed: {0}")]
    Analysis(#[from] kestrel_core::Error),

    #[error("Invalid {kind} message: {reason}")]
    InvalidMessage { kind: String, reason: String },

    #[error("Agent channel closed")]
    ChannelClosed,
}

impl RuntimeError {
    pub fn invalid_message(kind: impl Into<String>, reason: impl ToString) -> Self {
        RuntimeError::InvalidMessage {
            kind: kind.into(),
            reason: reason.to_string(),
        }
    }
}

/// Agent configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl From<kestrel_core::Error> for ConfigError {
    fn from(err: kestrel_core::Error) -> Self {
        ConfigError::Invalid(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RuntimeError::invalid_message("market_data", "empty price_history");
        assert_eq!(err.to_string(), "Invalid market_data message: empty price_history");

        let err: RuntimeError = kestrel_core::Error::InsufficientData {
            required: 20,
            available: 3,
        }
        .into();
        assert!(err.to_string().contains("required 20"));
    }
}
