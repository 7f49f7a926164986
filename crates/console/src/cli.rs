//! Command-line definition.

use clap::{Args, Parser, Subcommand};

use crate::commands::ops::OpsArgs;
use crate::commands::studio::StudioArgs;

/// gsb console - connector operations and authoring
#[derive(Parser, Debug)]
#[command(name = "gsb-console")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags that override the environment for any subcommand.
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Base URL of the catalog/execution service (overrides GSB_BASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Ops refresh interval in milliseconds (overrides GSB_REFRESH_MS)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub refresh_ms: Option<u64>,

    /// Default run page size (overrides GSB_DEFAULT_LIMIT_RUNS)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit_runs: Option<u32>,

    /// Request timeout in seconds (overrides GSB_REQUEST_TIMEOUT_SECS)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch fleet, connector or run health
    Ops(OpsArgs),

    /// Author connector drafts and browse the catalog
    Studio(StudioArgs),
}
