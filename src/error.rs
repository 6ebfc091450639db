//! Error types for projection, loading and market-data lookups

use thiserror::Error;

/// Precondition violations detected before a projection starts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid holding '{identifier}': {reason}")]
    InvalidHolding { identifier: String, reason: String },
}

impl ProjectionError {
    pub(crate) fn holding(identifier: &str, reason: impl Into<String>) -> Self {
        ProjectionError::InvalidHolding {
            identifier: identifier.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failures while reading portfolios, quotes or configs from disk
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("row {line}: {reason}")]
    InvalidRow { line: u64, reason: String },

    #[error(transparent)]
    Invalid(#[from] ProjectionError),
}

/// Failures from a market-data provider for a single ticker
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    #[error("no quote for '{0}'")]
    NotFound(String),

    #[error("invalid quote for '{ticker}': {reason}")]
    InvalidQuote { ticker: String, reason: String },

    #[error("provider unavailable for '{ticker}': {reason}")]
    Unavailable { ticker: String, reason: String },
}

impl MarketDataError {
    /// Whether a retry could plausibly succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, MarketDataError::Unavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = ProjectionError::InvalidConfiguration("horizon_periods must be at least 1".into());
        assert_eq!(err.to_string(), "invalid configuration: horizon_periods must be at least 1");

        let err = ProjectionError::holding("SCHD", "price must be positive");
        assert_eq!(err.to_string(), "invalid holding 'SCHD': price must be positive");
    }

    #[test]
    fn test_only_unavailable_is_transient() {
        assert!(MarketDataError::Unavailable { ticker: "O".into(), reason: "timeout".into() }.is_transient());
        assert!(!MarketDataError::NotFound("O".into()).is_transient());
        assert!(!MarketDataError::InvalidQuote { ticker: "O".into(), reason: "zero price".into() }.is_transient());
    }
}
