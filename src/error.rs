//! Error types for the clinic finder.

use std::path::PathBuf;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Ranking error: {0}")]
    Rank(#[from] RankError),

    #[error("Intent error: {0}")]
    Intent(#[from] IntentError),

    #[error("State store error: {0}")]
    Store(#[from] StoreError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Catalog loading errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Malformed catalog record ({reason}): {line}")]
    MalformedRecord { line: String, reason: String },

    #[error("Catalog unavailable at {}: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog contains no usable records")]
    Empty,
}

/// Ranking errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Intent recognition errors.
#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    #[error("Recognizer {name} failed: {reason}")]
    RecognitionFailed { name: String, reason: String },

    #[error("Invalid rule pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Conversation state store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Serialization error for key {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },
}

/// Result type alias for the clinic finder.
pub type Result<T> = std::result::Result<T, Error>;
