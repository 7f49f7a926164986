//! CLI error types and exit codes
//!
//! - 0: Success
//! - 1: The service reported an error that was already printed
//! - 2: Configuration error
//! - 3: Network error
//! - 4: Invalid draft or input
//! - 5: Server error

use gsb_client::error::ClientError;
use gsb_core::error::ConsoleError;

use crate::config::ConfigError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),

    /// The output panel already carries the message.
    #[error("request reported an error")]
    Reported,
}

impl From<ConsoleError> for CliError {
    fn from(err: ConsoleError) -> Self {
        match err {
            ConsoleError::Transport(message) => Self::Network(message),
            ConsoleError::Api { status, message } => Self::Api { status, message },
            ConsoleError::ConfigParse(message) | ConsoleError::ConfigValidation(message) => {
                Self::Input(message)
            }
        }
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        ConsoleError::from(err).into()
    }
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Reported | Self::Io(_) | Self::Output(_) => 1,
            Self::Config(_) => 2,
            Self::Network(_) => 3,
            Self::Input(_) => 4,
            Self::Api { .. } => 5,
        }
    }

    /// Print to stderr unless already shown.
    pub fn print(&self) {
        if !matches!(self, Self::Reported) {
            eprintln!("Error: {self}");
        }
    }
}
