//! Pure rendering of ops payloads into display-ready view models.
//!
//! [`render`] does no I/O and owns no state; the terminal printer in
//! `gsb-console` only lays out the strings produced here.

use serde::Serialize;

use crate::ops::format::{
    format_date, format_seconds, format_timestamp, page_summary, StatusBadge, NOT_AVAILABLE,
};
use crate::ops::models::{
    ConnectorDetail, ConnectorSummary, OpsPayload, OpsSnapshot, Page, RunLinks, RunRecord,
};
use crate::types::Timestamp;

/// Placeholder for empty text cells.
pub const EMPTY_CELL: &str = "-";

/// A hyperlink in a table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub text: String,
    pub href: String,
}

impl Link {
    pub fn connector(id: &str) -> Self {
        Self {
            text: id.to_string(),
            href: format!("/ops/connectors/{id}"),
        }
    }

    pub fn run(id: &str) -> Self {
        Self {
            text: id.to_string(),
            href: format!("/ops/runs/{id}"),
        }
    }
}

/// Either plain text or a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Link(Link),
}

impl Cell {
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Link(link) => &link.text,
        }
    }
}

/// External log links for a run; renders as `Splunk | Kestra` or `-`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogLinks(pub Vec<Link>);

impl LogLinks {
    pub fn from_links(links: &RunLinks) -> Self {
        let mut out = Vec::new();
        if let Some(url) = links.splunk_url.as_deref().filter(|u| !u.is_empty()) {
            out.push(Link {
                text: "Splunk".into(),
                href: url.to_string(),
            });
        }
        if let Some(url) = links.kestra_url.as_deref().filter(|u| !u.is_empty()) {
            out.push(Link {
                text: "Kestra".into(),
                href: url.to_string(),
            });
        }
        Self(out)
    }

    pub fn text(&self) -> String {
        if self.0.is_empty() {
            EMPTY_CELL.to_string()
        } else {
            self.0
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join(" | ")
        }
    }
}

/// Run pager controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagerView {
    /// `Runs: <page summary>`.
    pub label: String,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl PagerView {
    pub fn from_page(page: Option<&Page>) -> Self {
        Self {
            label: format!("Runs: {}", page_summary(page)),
            prev_enabled: page.is_some_and(|p| p.offset_runs > 0),
            next_enabled: page.is_some_and(|p| p.has_more),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KpiStrip {
    pub success_rate: String,
    pub total_runs: String,
    pub pending_batches: String,
    pub max_freshness: String,
    pub generated: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectorRow {
    pub connector: Link,
    pub mode: String,
    pub status: StatusBadge,
    pub last_run: Cell,
    pub freshness: String,
    pub pending_batches: String,
}

impl ConnectorRow {
    fn from_summary(row: &ConnectorSummary) -> Self {
        Self {
            connector: Link::connector(&row.connector_id),
            mode: text_or(row.mode.as_deref(), NOT_AVAILABLE),
            status: StatusBadge::new(row.last_status.as_deref()),
            last_run: match row.last_run_id.as_deref() {
                Some(id) if !id.is_empty() => Cell::Link(Link::run(id)),
                _ => Cell::Text(NOT_AVAILABLE.into()),
            },
            freshness: format_seconds(row.freshness_lag_seconds),
            pending_batches: row.pending_push_batches.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRow {
    pub run: Link,
    pub connector: Link,
    pub status: StatusBadge,
    pub started: String,
    pub duration: String,
    pub upserts: String,
    pub deletes: String,
    pub logs: LogLinks,
}

impl RunRow {
    fn from_record(run: &RunRecord) -> Self {
        Self {
            run: Link::run(&run.run_id),
            connector: Link::connector(&run.connector_id),
            status: StatusBadge::new(run.status.as_deref()),
            started: format_date(run.started_at.as_deref()),
            duration: format_seconds(run.duration_seconds),
            upserts: run.upserts_count.to_string(),
            deletes: run.deletes_count.to_string(),
            logs: LogLinks::from_links(&run.links),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotView {
    pub kpis: KpiStrip,
    pub connectors: Vec<ConnectorRow>,
    pub runs: Vec<RunRow>,
    pub pager: PagerView,
}

fn render_snapshot(payload: &OpsSnapshot) -> SnapshotView {
    let summary = &payload.summary;
    let success_rate = if summary.success_rate_percent.is_finite() {
        summary.success_rate_percent
    } else {
        0.0
    };
    SnapshotView {
        kpis: KpiStrip {
            success_rate: format!("{success_rate:.1}%"),
            total_runs: summary.total_runs.to_string(),
            pending_batches: summary.pending_push_batches.to_string(),
            max_freshness: format_seconds(summary.freshness_lag_seconds_max),
            generated: format!("Generated: {}", format_date(summary.generated_at.as_deref())),
        },
        connectors: payload.connectors.iter().map(ConnectorRow::from_summary).collect(),
        runs: payload.recent_runs.iter().map(RunRow::from_record).collect(),
        pager: PagerView::from_page(payload.runs_page.as_ref()),
    }
}

// ---------------------------------------------------------------------------
// Connector detail
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectorRunRow {
    pub run: Link,
    pub status: StatusBadge,
    pub started: String,
    pub finished: String,
    pub duration: String,
    pub error_class: String,
    pub logs: LogLinks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectorDetailView {
    pub connector_id: String,
    pub mode: String,
    pub status: StatusBadge,
    pub freshness: String,
    pub pending_batches: String,
    /// `Updated: <render time>`.
    pub updated: String,
    pub runs: Vec<ConnectorRunRow>,
    pub pager: PagerView,
}

fn render_connector(payload: &ConnectorDetail, now: &Timestamp) -> ConnectorDetailView {
    let connector = &payload.connector;
    ConnectorDetailView {
        connector_id: connector.connector_id.clone(),
        mode: text_or(connector.mode.as_deref(), NOT_AVAILABLE),
        status: StatusBadge::new(connector.last_status.as_deref()),
        freshness: format_seconds(connector.freshness_lag_seconds),
        pending_batches: connector.pending_push_batches.to_string(),
        updated: format!("Updated: {}", format_timestamp(now)),
        runs: payload
            .recent_runs
            .iter()
            .map(|run| ConnectorRunRow {
                run: Link::run(&run.run_id),
                status: StatusBadge::new(run.status.as_deref()),
                started: format_date(run.started_at.as_deref()),
                finished: format_date(run.finished_at.as_deref()),
                duration: format_seconds(run.duration_seconds),
                error_class: text_or(run.error_class.as_deref(), EMPTY_CELL),
                logs: LogLinks::from_links(&run.links),
            })
            .collect(),
        pager: PagerView::from_page(payload.runs_page.as_ref()),
    }
}

// ---------------------------------------------------------------------------
// Run detail
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunDetailView {
    pub run_id: String,
    pub status: StatusBadge,
    pub connector: String,
    pub duration: String,
    pub started: String,
    pub finished: String,
    pub error_class: String,
    pub error_message: String,
    /// `upserts=<u>, deletes=<d>`.
    pub mutation_counts: String,
    pub splunk_url: Option<String>,
    pub kestra_url: Option<String>,
}

fn render_run(run: &RunRecord) -> RunDetailView {
    RunDetailView {
        run_id: run.run_id.clone(),
        status: StatusBadge::new(run.status.as_deref()),
        connector: text_or(Some(run.connector_id.as_str()), NOT_AVAILABLE),
        duration: format_seconds(run.duration_seconds),
        started: format_date(run.started_at.as_deref()),
        finished: format_date(run.finished_at.as_deref()),
        error_class: text_or(run.error_class.as_deref(), EMPTY_CELL),
        error_message: text_or(run.error_message.as_deref(), EMPTY_CELL),
        mutation_counts: format!(
            "upserts={}, deletes={}",
            run.upserts_count, run.deletes_count
        ),
        splunk_url: run.links.splunk_url.clone().filter(|u| !u.is_empty()),
        kestra_url: run.links.kestra_url.clone().filter(|u| !u.is_empty()),
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Display model for one ops screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "kebab-case")]
pub enum ViewModel {
    Snapshot(SnapshotView),
    ConnectorDetail(ConnectorDetailView),
    RunDetail(RunDetailView),
}

impl ViewModel {
    /// Run pager of the view; run detail has none.
    pub fn pager(&self) -> Option<&PagerView> {
        match self {
            Self::Snapshot(view) => Some(&view.pager),
            Self::ConnectorDetail(view) => Some(&view.pager),
            Self::RunDetail(_) => None,
        }
    }
}

/// Render a decoded payload. `now` stamps the connector-detail view.
pub fn render(payload: &OpsPayload, now: &Timestamp) -> ViewModel {
    match payload {
        OpsPayload::Snapshot(snapshot) => ViewModel::Snapshot(render_snapshot(snapshot)),
        OpsPayload::Connector(detail) => ViewModel::ConnectorDetail(render_connector(detail, now)),
        OpsPayload::Run(run) => ViewModel::RunDetail(render_run(run)),
    }
}

fn text_or(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::ops::format::RunStatus;
    use crate::ops::query::OpsView;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
    }

    fn snapshot_payload() -> OpsPayload {
        OpsPayload::decode(
            OpsView::Snapshot,
            json!({
                "summary": {
                    "window_hours": 168,
                    "total_runs": 42,
                    "success_rate_percent": 92.857,
                    "freshness_lag_seconds_max": 125,
                    "pending_push_batches": 3,
                    "generated_at": "2026-10-19T08:59:59.500Z"
                },
                "connectors": [
                    {"connector_id": "acme-orders", "mode": "sql_pull", "last_status": "success",
                     "last_run_id": "r-2", "freshness_lag_seconds": 59},
                    {"connector_id": "kb"}
                ],
                "recent_runs": [
                    {"run_id": "r-2", "connector_id": "acme-orders", "status": "SUCCESS",
                     "started_at": "2026-10-19T08:00:00Z", "duration_seconds": 60,
                     "upserts_count": 10, "deletes_count": 1,
                     "links": {"splunk_url": "https://splunk.local/r-2", "kestra_url": "https://kestra.local/r-2"}}
                ],
                "runs_page": {"offset_runs": 25, "limit_runs": 25, "total_runs": 42, "has_more": false}
            }),
        )
        .unwrap()
    }

    #[test]
    fn snapshot_renders_kpis_rows_and_pager() {
        let ViewModel::Snapshot(view) = render(&snapshot_payload(), &now()) else {
            panic!("expected snapshot view");
        };
        assert_eq!(view.kpis.success_rate, "92.9%");
        assert_eq!(view.kpis.max_freshness, "2m 5s");
        assert_eq!(view.kpis.generated, "Generated: 2026-10-19T08:59:59Z");

        let first = &view.connectors[0];
        assert_eq!(first.connector.href, "/ops/connectors/acme-orders");
        assert_eq!(first.status.status, RunStatus::Success);
        assert_eq!(first.last_run, Cell::Link(Link::run("r-2")));
        assert_eq!(first.freshness, "59s");

        let sparse = &view.connectors[1];
        assert_eq!(sparse.mode, "n/a");
        assert_eq!(sparse.last_run.text(), "n/a");
        assert_eq!(sparse.status.label, "UNKNOWN");

        assert_eq!(view.runs[0].logs.text(), "Splunk | Kestra");
        assert_eq!(view.runs[0].duration, "1m 0s");

        assert_eq!(view.pager.label, "Runs: 26-42 of 42");
        assert!(view.pager.prev_enabled);
        assert!(!view.pager.next_enabled);
    }

    #[test]
    fn connector_detail_stamps_render_time() {
        let payload = OpsPayload::Connector(ConnectorDetail {
            connector: ConnectorSummary {
                connector_id: "kb".into(),
                last_status: Some("FAILED".into()),
                ..ConnectorSummary::default()
            },
            recent_runs: vec![RunRecord {
                run_id: "r-7".into(),
                connector_id: "kb".into(),
                ..RunRecord::default()
            }],
            runs_page: Some(Page::new(0, 25, 1)),
            status_filter: None,
        });
        let ViewModel::ConnectorDetail(view) = render(&payload, &now()) else {
            panic!("expected connector view");
        };
        assert_eq!(view.updated, "Updated: 2026-10-19T09:00:00Z");
        assert_eq!(view.status.status, RunStatus::Failed);
        assert_eq!(view.runs[0].error_class, "-");
        assert_eq!(view.runs[0].logs.text(), "-");
        assert_eq!(view.runs[0].finished, "n/a");
        assert!(!view.pager.prev_enabled);
        assert!(!view.pager.next_enabled);
    }

    #[test]
    fn run_detail_defaults_missing_errors() {
        let payload = OpsPayload::Run(RunRecord {
            run_id: "r-1".into(),
            connector_id: "acme-orders".into(),
            upserts_count: 3,
            links: RunLinks {
                splunk_url: Some(String::new()),
                kestra_url: Some("https://kestra.local/r-1".into()),
            },
            ..RunRecord::default()
        });
        let ViewModel::RunDetail(view) = render(&payload, &now()) else {
            panic!("expected run view");
        };
        assert_eq!(view.mutation_counts, "upserts=3, deletes=0");
        assert_eq!(view.error_message, "-");
        assert_eq!(view.status.label, "UNKNOWN");
        assert!(view.splunk_url.is_none());
        assert_eq!(view.kestra_url.as_deref(), Some("https://kestra.local/r-1"));
    }

    #[test]
    fn missing_page_disables_both_buttons() {
        let pager = PagerView::from_page(None);
        assert_eq!(pager.label, "Runs: No runs");
        assert!(!pager.prev_enabled && !pager.next_enabled);
    }
}
