//! Error types for readsieve

/// Result type alias using readsieve's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for readsieve operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Classifier construction errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Data source (instrument stream) errors
    #[error("data source error: {0}")]
    Source(String),

    /// Raw signal decoding errors
    #[error("signal error: {0}")]
    Signal(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file parse errors
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new data source error
    pub fn data_source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create a new signal error
    pub fn signal(msg: impl Into<String>) -> Self {
        Self::Signal(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
