//! `studio` commands: catalog, editor layout and the draft wizard.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use gsb_client::api::ConsoleApi;
use gsb_client::pipeline::StudioPipeline;
use gsb_core::catalog::{CatalogQuery, DEFAULT_CATALOG_LIMIT};
use gsb_core::draft::{ConnectorDraft, Mode};
use gsb_core::error::ConsoleError;
use gsb_core::form::DraftForm;
use gsb_core::mode::{resolve, AuthMode};
use gsb_core::proposal::{ProposalAction, WizardMode};
use gsb_core::response::{OutputPanel, ResponseBody, ValidationOutcome};

use crate::config::ConsoleConfig;
use crate::error::{CliError, CliResult};
use crate::render;

/// Connector authoring
#[derive(Args, Debug)]
pub struct StudioArgs {
    #[command(subcommand)]
    pub command: StudioCommands,
}

#[derive(Subcommand, Debug)]
pub enum StudioCommands {
    /// List connectors in the catalog
    Catalog(CatalogArgs),
    /// Show visible field groups and defaults for a mode
    Fields(FieldsArgs),
    /// Validate a draft against the catalog service
    Validate(DraftArgs),
    /// Preview the first mapped document of a draft
    Preview(DraftArgs),
    /// Submit a change proposal
    Propose(ProposeArgs),
    /// Trigger an immediate run of a stored connector
    RunNow { connector_id: String },
}

/// Arguments for the catalog command
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Filter by last run status
    #[arg(long, default_value = "")]
    pub status: String,

    /// Filter by connector mode
    #[arg(long, default_value = "")]
    pub mode: String,

    /// Free-text search
    #[arg(long, default_value = "")]
    pub q: String,

    /// Page size
    #[arg(long, default_value_t = DEFAULT_CATALOG_LIMIT, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: u32,

    /// Items to skip
    #[arg(long, default_value_t = 0)]
    pub offset: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CatalogArgs {
    fn query(&self) -> CatalogQuery {
        CatalogQuery {
            status: self.status.clone(),
            mode: self.mode.clone(),
            q: self.q.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Arguments for the fields command
#[derive(Args, Debug)]
pub struct FieldsArgs {
    /// Connector mode
    #[arg(long, value_parser = parse_mode)]
    pub mode: Mode,

    /// REST auth sub-mode
    #[arg(long, default_value = "static_bearer", value_parser = parse_auth_mode)]
    pub auth: AuthMode,
}

/// How the draft is opened and edited
#[derive(Args, Debug)]
pub struct DraftArgs {
    /// Wizard mode: create, edit, clone, delete, pause, resume or run
    #[arg(long, default_value = "create")]
    pub wizard: WizardMode,

    /// Stored connector to open (every wizard mode except create)
    #[arg(long)]
    pub connector: Option<String>,

    /// Switch the draft to this mode
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<Mode>,

    /// Start from a draft JSON file instead of the catalog
    #[arg(long, value_name = "FILE")]
    pub draft: Option<PathBuf>,

    /// Set an editor field, e.g. `source.url=https://api.local/items` (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,
}

/// Arguments for the propose command
#[derive(Args, Debug)]
pub struct ProposeArgs {
    #[command(flatten)]
    pub draft: DraftArgs,

    /// Proposal action; defaults to the wizard mode's action
    #[arg(long)]
    pub action: Option<ProposalAction>,
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    Mode::from_str_value(s.trim())
}

fn parse_auth_mode(s: &str) -> Result<AuthMode, String> {
    AuthMode::from_str_value(s.trim())
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))
}

pub async fn execute(args: StudioArgs, config: &ConsoleConfig) -> CliResult<()> {
    let api = super::connect(config)?;
    let stdout = std::io::stdout();
    run(args.command, &api, &mut stdout.lock()).await
}

/// Run one studio command against `api`, printing to `out`.
pub async fn run<W: Write>(command: StudioCommands, api: &ConsoleApi, out: &mut W) -> CliResult<()> {
    let pipeline = StudioPipeline::new(api);
    match command {
        StudioCommands::Catalog(args) => {
            let page = api.catalog(&args.query()).await?;
            if args.json {
                writeln!(out, "{}", serde_json::to_string_pretty(&page)?)?;
            } else {
                writeln!(out, "{}", render::catalog(&page))?;
            }
            Ok(())
        }
        StudioCommands::Fields(args) => {
            writeln!(out, "{}", render::layout(&resolve(args.mode, args.auth)))?;
            Ok(())
        }
        StudioCommands::Validate(args) => {
            let form = open_form(&pipeline, &args).await?;
            show_validation(pipeline.validate(&form).await, out)
        }
        StudioCommands::Preview(args) => {
            let form = open_form(&pipeline, &args).await?;
            show(pipeline.preview(&form).await, out)
        }
        StudioCommands::Propose(args) => propose(&pipeline, args, out).await,
        StudioCommands::RunNow { connector_id } => show(pipeline.run_now(&connector_id).await, out),
    }
}

async fn propose<W: Write>(pipeline: &StudioPipeline<'_>, args: ProposeArgs, out: &mut W) -> CliResult<()> {
    let wizard = args.draft.wizard;
    let Some(action) = args.action.or(wizard.proposal_action()) else {
        // The run wizard fires Run Now and never builds a draft.
        let connector_id = args
            .draft
            .connector
            .as_deref()
            .ok_or_else(|| CliError::Input("--connector is required for the run wizard".into()))?;
        return show(pipeline.run_now(connector_id).await, out);
    };

    let form = open_form(pipeline, &args.draft).await?;
    // A new connector is identified by its draft name; a clone names its source.
    let connector_id = match action {
        ProposalAction::Create => None,
        _ => args.draft.connector.as_deref(),
    };
    show(pipeline.propose(&form, action, connector_id).await, out)
}

/// Build the editor form from a draft file or the wizard, then apply the
/// mode switch and `--set` edits in order.
pub async fn open_form(pipeline: &StudioPipeline<'_>, args: &DraftArgs) -> CliResult<DraftForm> {
    let mut form = match &args.draft {
        Some(path) => DraftForm::from_draft(&args.wizard.hydrate(read_draft(path).await?)),
        None => pipeline.load(args.wizard, args.connector.as_deref()).await?,
    };
    if let Some(mode) = args.mode {
        if mode != form.mode() {
            form.set_mode(mode);
        }
    }
    for (key, value) in &args.set {
        form.set_field(key, value)?;
    }
    Ok(form)
}

async fn read_draft(path: &Path) -> CliResult<ConnectorDraft> {
    let text = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&text).map_err(|e| {
        ConsoleError::ConfigParse(format!("Draft file {} is invalid: {e}", path.display())).into()
    })
}

/// Print the output panel; an error-styled reply fails the command after
/// printing. A failed request is returned as its own error instead.
fn show<W: Write>(panel: OutputPanel, out: &mut W) -> CliResult<()> {
    if let Some(err) = panel.failure {
        return Err(err.into());
    }
    writeln!(out, "{}", panel.text)?;
    if panel.is_error {
        Err(CliError::Reported)
    } else {
        Ok(())
    }
}

/// Like [`show`], listing validation errors and warnings above the payload.
fn show_validation<W: Write>(panel: OutputPanel, out: &mut W) -> CliResult<()> {
    let outcome = serde_json::from_str(&panel.text)
        .ok()
        .and_then(|value| ValidationOutcome::from_body(&ResponseBody::Json(value)));
    if let Some(outcome) = outcome {
        for line in outcome.messages() {
            writeln!(out, "{line}")?;
        }
    }
    show(panel, out)
}
