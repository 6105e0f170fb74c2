//! Unified error type for the feriados service.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A holiday source could not be reached or answered non-2xx.
    #[error("source unavailable ({name}): {reason}")]
    SourceUnavailable { name: &'static str, reason: String },

    /// A source answered, but the payload did not match the expected shape.
    #[error("malformed response from {name}: {reason}")]
    MalformedResponse { name: &'static str, reason: String },

    /// A credential or setting required by a source is absent. Treated as
    /// "source disabled", never as a startup failure.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
