use thiserror::Error;

use crate::completion::CompletionError;
use crate::config::API_KEY_ENV;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// The display was destroyed before the operation was issued.
    #[error("display has already been destroyed")]
    Lifecycle,

    #[error("failed to encode completion request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to start translation worker: {0}")]
    Worker(#[source] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("API key is empty; set {}", API_KEY_ENV)]
    MissingCredential,

    #[error("API key contains characters that cannot be sent in an HTTP header")]
    InvalidCredential,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed {shape} body (HTTP {status}): {source}")]
    Malformed {
        status: u16,
        shape: &'static str,
        source: serde_json::Error,
    },

    #[error("completion result contained no choices")]
    NoChoices,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("page i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("page is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),

    #[error("page location is not a local file: {0}")]
    NotLocal(String),
}
