//! Plain-text layout of view models for the terminal.
//!
//! Everything here formats strings that `gsb-core` already computed; no
//! value is reformatted or recomputed.

use std::io::Write;

use gsb_client::poller::OpsDisplay;
use gsb_core::catalog::{catalog_summary, CatalogPage, CatalogRow};
use gsb_core::mode::ModeLayout;
use gsb_core::ops::view::{ConnectorDetailView, PagerView, RunDetailView, SnapshotView};
use gsb_core::ops::ViewModel;

/// Render one ops screen.
pub fn view(view: &ViewModel) -> String {
    match view {
        ViewModel::Snapshot(snapshot) => render_snapshot(snapshot),
        ViewModel::ConnectorDetail(detail) => render_connector(detail),
        ViewModel::RunDetail(run) => render_run(run),
    }
}

pub fn banner(text: &str) -> String {
    format!("! {text}")
}

/// Pager label followed by the controls currently offered.
pub fn pager(pager: &PagerView) -> String {
    let mut line = pager.label.clone();
    if pager.prev_enabled {
        line.push_str("   [p] prev");
    }
    if pager.next_enabled {
        line.push_str("   [n] next");
    }
    line
}

fn render_snapshot(view: &SnapshotView) -> String {
    let kpis = &view.kpis;
    let mut out = format!(
        "Success rate: {}   Total runs: {}   Pending batches: {}   Max freshness lag: {}\n{}\n",
        kpis.success_rate, kpis.total_runs, kpis.pending_batches, kpis.max_freshness, kpis.generated,
    );

    out.push_str("\nConnectors\n");
    out.push_str(&table(
        &["CONNECTOR", "MODE", "STATUS", "LAST RUN", "FRESHNESS", "PENDING"],
        view.connectors
            .iter()
            .map(|row| {
                vec![
                    row.connector.text.clone(),
                    row.mode.clone(),
                    row.status.label.clone(),
                    row.last_run.text().to_string(),
                    row.freshness.clone(),
                    row.pending_batches.clone(),
                ]
            })
            .collect(),
    ));

    out.push_str("\nRecent runs\n");
    out.push_str(&table(
        &["RUN", "CONNECTOR", "STATUS", "STARTED", "DURATION", "UPSERTS", "DELETES", "LOGS"],
        view.runs
            .iter()
            .map(|row| {
                vec![
                    row.run.text.clone(),
                    row.connector.text.clone(),
                    row.status.label.clone(),
                    row.started.clone(),
                    row.duration.clone(),
                    row.upserts.clone(),
                    row.deletes.clone(),
                    row.logs.text(),
                ]
            })
            .collect(),
    ));
    out.push_str(&pager(&view.pager));
    out
}

fn render_connector(view: &ConnectorDetailView) -> String {
    let mut out = format!(
        "Connector {}   Mode: {}   Status: {}\nFreshness lag: {}   Pending batches: {}\n{}\n\nRuns\n",
        view.connector_id,
        view.mode,
        view.status.label,
        view.freshness,
        view.pending_batches,
        view.updated,
    );
    out.push_str(&table(
        &["RUN", "STATUS", "STARTED", "FINISHED", "DURATION", "ERROR", "LOGS"],
        view.runs
            .iter()
            .map(|row| {
                vec![
                    row.run.text.clone(),
                    row.status.label.clone(),
                    row.started.clone(),
                    row.finished.clone(),
                    row.duration.clone(),
                    row.error_class.clone(),
                    row.logs.text(),
                ]
            })
            .collect(),
    ));
    out.push_str(&pager(&view.pager));
    out
}

fn render_run(view: &RunDetailView) -> String {
    let mut fields = vec![
        ("Run", view.run_id.clone()),
        ("Status", view.status.label.clone()),
        ("Connector", view.connector.clone()),
        ("Duration", view.duration.clone()),
        ("Started", view.started.clone()),
        ("Finished", view.finished.clone()),
        ("Error class", view.error_class.clone()),
        ("Error message", view.error_message.clone()),
        ("Mutations", view.mutation_counts.clone()),
    ];
    if let Some(url) = &view.splunk_url {
        fields.push(("Splunk", url.clone()));
    }
    if let Some(url) = &view.kestra_url {
        fields.push(("Kestra", url.clone()));
    }
    key_values(&fields)
}

/// Catalog table with the per-row wizard actions and a `a-b of n` footer.
pub fn catalog(page: &CatalogPage) -> String {
    let rows: Vec<CatalogRow> = page.items.iter().map(CatalogRow::from_item).collect();
    let actions = rows
        .first()
        .map(|row| {
            row.actions
                .iter()
                .map(|mode| format!("{mode:?}").to_lowercase())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    let mut out = table(
        &["CONNECTOR", "MODE", "SCHEDULE", "ENABLED", "SOURCE", "STATUS", "LAST RUN", "STARTED"],
        rows.iter()
            .map(|row| {
                vec![
                    row.connector_id.clone(),
                    row.mode.clone(),
                    row.schedule.clone(),
                    row.enabled.to_string(),
                    row.source_type.clone(),
                    row.status.label.clone(),
                    row.last_run_id.clone(),
                    row.last_started.clone(),
                ]
            })
            .collect(),
    );
    out.push_str(&catalog_summary(page));
    if !actions.is_empty() {
        out.push_str(&format!("\nActions per connector: {actions}"));
    }
    out
}

/// Editor layout for `studio fields`.
pub fn layout(layout: &ModeLayout) -> String {
    let groups = layout
        .visible
        .iter()
        .map(|group| format!("{group:?}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut fields = vec![
        ("Mode", layout.mode.as_str().to_string()),
        ("Auth", layout.auth_mode.as_str().to_string()),
        ("Source types", layout.source_types.join(", ")),
        ("Visible groups", groups),
    ];
    for (field, value) in &layout.defaults {
        fields.push(("Default", format!("{field:?} = {value}")));
    }
    key_values(&fields)
}

/// Left-aligned columns sized to their widest cell; trailing blanks trimmed.
fn table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(headers.to_vec());
    if rows.is_empty() {
        out.push_str("(none)\n");
    }
    for row in &rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out
}

fn key_values(fields: &[(&str, String)]) -> String {
    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0) + 1;
    fields
        .iter()
        .map(|(key, value)| format!("{:<width$} {value}", format!("{key}:")))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Terminal display
// ---------------------------------------------------------------------------

/// [`OpsDisplay`] that prints each render as a block of text.
pub struct TerminalDisplay<W: Write> {
    out: W,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "Failed to write ops view");
        }
    }
}

impl<W: Write> OpsDisplay for TerminalDisplay<W> {
    fn location_changed(&mut self, location: &str) {
        self.emit(&format!("Location: {location}"));
    }

    fn render(&mut self, current: Option<&ViewModel>, banner_text: Option<&str>) {
        let mut block = String::from("----");
        if let Some(text) = banner_text {
            block.push('\n');
            block.push_str(&banner(text));
        }
        if let Some(view_model) = current {
            block.push('\n');
            block.push_str(&view(view_model));
        }
        self.emit(&block);
    }
}
