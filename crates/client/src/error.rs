use gsb_core::error::ConsoleError;

/// Errors from the HTTP adapter layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The base URL is not usable as an API root.
    #[error("invalid base URL '{url}': {reason}")]
    BaseUrl { url: String, reason: String },

    /// A success body did not have the expected shape.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A normalised console error (API, transport, or local config).
    #[error(transparent)]
    Console(#[from] ConsoleError),
}

impl From<ClientError> for ConsoleError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Console(inner) => inner,
            ClientError::BaseUrl { .. } => ConsoleError::ConfigValidation(err.to_string()),
            other => ConsoleError::Transport(other.to_string()),
        }
    }
}
