//! Analysis errors shared by every component

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Insufficient data: required {required} observations, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Error::InvalidInput(reason.into())
    }

    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Error::InsufficientData { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reject non-finite numbers
pub fn ensure_finite(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidInput(format!("{name} must be finite, got {value}")))
    }
}

/// Reject non-finite and non-positive numbers
pub fn ensure_positive(name: &str, value: f64) -> Result<f64> {
    ensure_finite(name, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidInput(format!("{name} must be positive, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite("price", 1.5), Ok(1.5));
        assert!(ensure_finite("price", f64::NAN).is_err());
        assert!(ensure_finite("price", f64::INFINITY).is_err());
    }

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive("size", 0.1).is_ok());
        assert!(ensure_positive("size", 0.0).is_err());
        assert!(ensure_positive("size", -1.0).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = Error::InsufficientData {
            required: 20,
            available: 3,
        };
        assert!(err.is_insufficient_data());
        assert_eq!(
            err.to_string(),
            "Insufficient data: required 20 observations, got 3"
        );
    }
}
