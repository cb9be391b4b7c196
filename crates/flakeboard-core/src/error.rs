//! Error types for the flake report pipeline.

/// Pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum FlakeError {
    /// Configuration is missing a field or holds an invalid value.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Cache directory could not be created, scanned or written.
    #[error("cache error: {message}")]
    Cache { message: String },

    /// Network error (transport failure or non-success status).
    #[error("network error: {message}")]
    Network { message: String },

    /// Search service returned a body that is not the expected JSON shape.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// A job URL does not have enough path segments to derive its build log URL.
    #[error("cannot derive build log URL from {url}: {reason}")]
    UrlParse { url: String, reason: String },

    /// A bracketed timestamp was found in a log header but did not parse.
    #[error("invalid run timestamp {raw:?}: {reason}")]
    Timestamp { raw: String, reason: String },
}

impl FlakeError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Cache { .. } => 2,

            // Transport
            Self::Network { .. } => 3,
            Self::InvalidResponse { .. } => 3,

            // Per-item anomalies that escaped the aggregation policy
            Self::UrlParse { .. } => 4,
            Self::Timestamp { .. } => 4,
        }
    }

    /// Whether the error belongs to a single job rather than the whole run.
    pub fn is_per_item(&self) -> bool {
        matches!(
            self,
            Self::UrlParse { .. } | Self::Timestamp { .. } | Self::Network { .. }
        )
    }
}

impl From<reqwest::Error> for FlakeError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for pipeline operations.
pub type FlakeResult<T> = Result<T, FlakeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_group_by_stage() {
        let config = FlakeError::Config {
            message: "repoOrg is empty".to_string(),
        };
        let network = FlakeError::Network {
            message: "HTTP 502".to_string(),
        };
        let url = FlakeError::UrlParse {
            url: "nope".to_string(),
            reason: "no '/'".to_string(),
        };

        assert_eq!(config.exit_code(), 2);
        assert_eq!(network.exit_code(), 3);
        assert_eq!(url.exit_code(), 4);
        assert!(url.is_per_item());
        assert!(!config.is_per_item());
    }

    #[test]
    fn test_display_includes_context() {
        let err = FlakeError::Timestamp {
            raw: "[yesterday]".to_string(),
            reason: "input contains invalid characters".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid run timestamp \"[yesterday]\": input contains invalid characters"
        );
    }
}
