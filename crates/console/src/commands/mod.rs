//! Subcommand implementations.

pub mod ops;
pub mod studio;

use gsb_client::api::ConsoleApi;

use crate::cli::Commands;
use crate::config::{ConfigError, ConsoleConfig};
use crate::error::CliResult;

pub async fn execute(command: Commands, config: &ConsoleConfig) -> CliResult<()> {
    match command {
        Commands::Ops(args) => ops::execute(args, config).await,
        Commands::Studio(args) => studio::execute(args, config).await,
    }
}

/// HTTP client for the configured service. A bad base URL is a
/// configuration error.
pub(crate) fn connect(config: &ConsoleConfig) -> CliResult<ConsoleApi> {
    ConsoleApi::new(&config.base_url, config.request_timeout).map_err(|e| {
        tracing::debug!(error = %e, "Rejected base URL");
        ConfigError {
            var: "GSB_BASE_URL",
            value: config.base_url.clone(),
            expected: "an http(s) URL",
        }
        .into()
    })
}
