//! Error types for the comment responder

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing required configuration: {0}")]
    ConfigurationMissing(String),

    #[error("Comment source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Generation failed on {model}: {detail}")]
    GenerationFailure { model: String, detail: String },

    #[error("Failed to publish reply: {0}")]
    PublishFailure(String),

    #[error("Dedup store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("MySQL error: {0}")]
    MySqlError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a failed generation attempt on one model tier.
    pub fn generation(model: &str, detail: impl Into<String>) -> Self {
        Error::GenerationFailure {
            model: model.to_string(),
            detail: detail.into(),
        }
    }
}

impl From<mysql_async::Error> for Error {
    fn from(err: mysql_async::Error) -> Self {
        Error::MySqlError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}
