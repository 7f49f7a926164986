/// Errors surfaced to the console's output region or ops banner.
///
/// `ConfigParse` and `ConfigValidation` are raised locally, before any
/// request is issued. `Transport` and `Api` come back from the remote
/// service. A validate call answering `valid: false` is not an error;
/// see [`crate::response::ValidationOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    /// Network failure, or a non-success status with a non-JSON body.
    #[error("{0}")]
    Transport(String),

    /// Non-success status with a JSON body.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// A free-form structured-text field does not parse.
    #[error("{0}")]
    ConfigParse(String),

    /// A well-formed draft violates a mode-specific precondition.
    #[error("{0}")]
    ConfigValidation(String),
}

impl ConsoleError {
    /// True for errors raised before any network call.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::ConfigParse(_) | Self::ConfigValidation(_))
    }
}
