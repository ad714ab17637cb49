//! Domain error types.

/// Top-level error type for the screener.
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("required artifact not found at {path}")]
    MissingArtifact { path: String },

    #[error("data source error for {symbol}: {reason}")]
    DataSource { symbol: String, reason: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("missing metric for {symbol}: {metric}")]
    MissingMetric { symbol: String, metric: String },

    #[error("storage error at {path}: {reason}")]
    Storage { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScreenerError {
    /// Errors scoped to a single symbol. These degrade to "no record for this
    /// symbol" and never abort a batch.
    pub fn is_per_symbol(&self) -> bool {
        matches!(
            self,
            ScreenerError::DataSource { .. }
                | ScreenerError::InsufficientData { .. }
                | ScreenerError::MissingMetric { .. }
        )
    }

    pub fn data_source(symbol: &str, reason: impl std::fmt::Display) -> Self {
        ScreenerError::DataSource {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<&ScreenerError> for std::process::ExitCode {
    fn from(err: &ScreenerError) -> Self {
        let code: u8 = match err {
            ScreenerError::Io(_) | ScreenerError::Storage { .. } => 1,
            ScreenerError::ConfigParse { .. }
            | ScreenerError::ConfigMissing { .. }
            | ScreenerError::ConfigInvalid { .. } => 2,
            ScreenerError::Database { .. } | ScreenerError::DatabaseQuery { .. } => 3,
            ScreenerError::DataSource { .. }
            | ScreenerError::InsufficientData { .. }
            | ScreenerError::MissingMetric { .. } => 5,
            ScreenerError::MissingArtifact { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_symbol_classification() {
        assert!(ScreenerError::data_source("AAPL", "timeout").is_per_symbol());
        assert!(
            ScreenerError::InsufficientData {
                symbol: "AAPL".into(),
                bars: 59,
                minimum: 60,
            }
            .is_per_symbol()
        );
        assert!(
            ScreenerError::MissingMetric {
                symbol: "AAPL".into(),
                metric: "trailingPE".into(),
            }
            .is_per_symbol()
        );
        assert!(
            !ScreenerError::MissingArtifact {
                path: "data/validated_symbols.yaml".into(),
            }
            .is_per_symbol()
        );
        assert!(
            !ScreenerError::Storage {
                path: "data".into(),
                reason: "read-only".into(),
            }
            .is_per_symbol()
        );
    }

    #[test]
    fn display_includes_symbol_and_cause() {
        let err = ScreenerError::data_source("XOM", "connection reset");
        assert_eq!(err.to_string(), "data source error for XOM: connection reset");

        let err = ScreenerError::InsufficientData {
            symbol: "NEW".into(),
            bars: 59,
            minimum: 60,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data for NEW: have 59 bars, need 60"
        );
    }
}
