//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business rule failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration errors raised while building buckets and backends.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid bucket '{name}': {reason}")]
    InvalidBucket { name: String, reason: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}
