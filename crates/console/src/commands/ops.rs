//! `ops` commands: fleet snapshot, connector detail and run detail.

use std::io::Write;

use clap::{Args, Subcommand};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use gsb_client::controller::{OpsController, OpsSource};
use gsb_client::poller;
use gsb_core::ops::{OpsQueryState, OpsTarget};

use crate::config::ConsoleConfig;
use crate::error::CliResult;
use crate::input;
use crate::render::{self, TerminalDisplay};

/// Operations views
#[derive(Args, Debug)]
pub struct OpsArgs {
    #[command(subcommand)]
    pub target: OpsTargetArg,

    /// Initial query string, e.g. `status=failed&offset_runs=25`
    #[arg(long, global = true, default_value = "")]
    pub query: String,

    /// Fetch once, print and exit
    #[arg(long, global = true)]
    pub once: bool,

    /// Print the view model as JSON and exit
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum OpsTargetArg {
    /// Fleet-wide summary, connectors and recent runs
    Snapshot,
    /// One connector's health and run history
    Connector { connector_id: String },
    /// A single run
    Run { run_id: String },
}

impl OpsTargetArg {
    pub fn target(&self) -> OpsTarget {
        match self {
            Self::Snapshot => OpsTarget::Snapshot,
            Self::Connector { connector_id } => OpsTarget::Connector(connector_id.clone()),
            Self::Run { run_id } => OpsTarget::Run(run_id.clone()),
        }
    }
}

pub async fn execute(args: OpsArgs, config: &ConsoleConfig) -> CliResult<()> {
    let api = super::connect(config)?;
    let state = OpsQueryState::hydrate(args.target.target(), &args.query, config.default_limit_runs);
    let mut controller = OpsController::new(state);

    if args.once || args.json {
        fetch_once(&api, &mut controller, args.json, &mut std::io::stdout().lock()).await
    } else {
        watch(&api, &mut controller, config).await;
        Ok(())
    }
}

/// One fetch through the controller. A failure is returned rather than
/// shown as a banner, since there is no earlier view to keep.
pub async fn fetch_once<S, W>(
    source: &S,
    controller: &mut OpsController,
    json: bool,
    out: &mut W,
) -> CliResult<()>
where
    S: OpsSource,
    W: Write,
{
    let request = controller.poll();
    let result = source.fetch(&request.state).await;
    let failure = result.as_ref().err().cloned();
    controller.complete_now(&request, result);
    if let Some(err) = failure {
        return Err(err.into());
    }

    if let Some(view) = controller.view() {
        if json {
            writeln!(out, "{}", serde_json::to_string_pretty(view)?)?;
        } else {
            writeln!(out, "Location: {}\n{}", controller.location(), render::view(view))?;
        }
    }
    Ok(())
}

/// Poll until `q`, end of the command stream, or Ctrl-C.
async fn watch<S: OpsSource>(source: &S, controller: &mut OpsController, config: &ConsoleConfig) {
    let cancel = CancellationToken::new();
    let (commands_tx, commands_rx) = mpsc::channel(16);

    let reader = tokio::spawn(input::read_commands(
        BufReader::new(tokio::io::stdin()),
        commands_tx,
        cancel.clone(),
    ));
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    eprintln!("{}", input::HELP);
    let mut display = TerminalDisplay::new(std::io::stdout());
    poller::run(source, controller, &mut display, commands_rx, config.refresh, cancel.clone()).await;

    cancel.cancel();
    reader.abort();
    interrupt.abort();
}
