use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gsb_console::cli::Cli;
use gsb_console::config::ConsoleConfig;
use gsb_console::error::CliResult;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gsb_console=info,gsb_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Exit from inside the runtime: a pending stdin read must not hold up
    // runtime shutdown.
    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = ConsoleConfig::from_env()?.with_overrides(&cli.global);
    tracing::debug!(base_url = %config.base_url, "Console configured");
    gsb_console::commands::execute(cli.command, &config).await
}
