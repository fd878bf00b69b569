//! Unified error type for anatomy-poster.

use std::path::PathBuf;

use thiserror::Error;

/// Error code the Images API uses when an account hits its hard spending cap.
pub const BILLING_HARD_LIMIT: &str = "billing_hard_limit_reached";

/// Errors that can occur while generating or composing a poster.
#[derive(Debug, Error)]
pub enum PosterError {
    /// The image API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code (0 for replayed failures).
        status: u16,
        /// Machine-readable error code from the response body, if any.
        code: Option<String>,
        /// Error message from the API.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Image decoding, encoding or conversion error.
    #[error("Image error: {0}")]
    Image(String),

    /// The frame template could not be loaded.
    #[error("Could not load mockup template {}: {reason}", path.display())]
    TemplateNotFound {
        /// Configured template path.
        path: PathBuf,
        /// Underlying load failure.
        reason: String,
    },

    /// No API key supplied.
    #[error("No API key for {provider}. Set {env_var} or add it to config file.")]
    MissingApiKey {
        /// The provider name.
        provider: String,
        /// The environment variable name.
        env_var: String,
    },

    /// A batch run produced nothing.
    #[error("Batch failed: {0}")]
    Batch(String),

    /// Writing the batch log failed.
    #[error("CSV log error: {0}")]
    Csv(#[from] csv::Error),
}

impl PosterError {
    /// Whether this error reports an exhausted billing limit.
    ///
    /// Prefers the structured error code; the message is only inspected when
    /// the response carried no code at all.
    #[must_use]
    pub fn is_billing_limit(&self) -> bool {
        match self {
            Self::Api { code: Some(code), .. } => code == BILLING_HARD_LIMIT,
            Self::Api { code: None, message, .. } => message.contains("billing_hard_limit"),
            _ => false,
        }
    }
}
