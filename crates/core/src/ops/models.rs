//! Ops payload shapes as served by `/v1/ops/*`.
//!
//! Every field is defaulted so a payload missing optional data still
//! decodes; a poll must never fail on a sparse row.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConsoleError;
use crate::ops::query::OpsView;
use crate::types::{ConnectorId, RunId};

/// Fleet-wide aggregates for the snapshot window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsSummary {
    pub window_hours: u32,
    pub total_runs: u64,
    pub successful_runs: u64,
    pub failed_runs: u64,
    pub running_runs: u64,
    pub success_rate_percent: f64,
    pub mttr_seconds: Option<f64>,
    pub freshness_lag_seconds_max: Option<f64>,
    pub pending_push_batches: u64,
    /// Kept as served so unparsable values can be shown verbatim.
    pub generated_at: Option<String>,
}

/// Health row for one connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorSummary {
    pub connector_id: ConnectorId,
    pub mode: Option<String>,
    pub schedule: Option<String>,
    pub schedule_enabled: bool,
    pub source_type: Option<String>,
    pub last_status: Option<String>,
    pub last_run_id: Option<RunId>,
    pub last_started_at: Option<String>,
    pub last_finished_at: Option<String>,
    pub last_error_class: Option<String>,
    pub checkpoint_watermark: Option<String>,
    pub checkpoint_updated_at: Option<String>,
    pub freshness_lag_seconds: Option<f64>,
    pub pending_push_batches: u64,
}

impl Default for ConnectorSummary {
    fn default() -> Self {
        Self {
            connector_id: ConnectorId::new(),
            mode: None,
            schedule: None,
            schedule_enabled: true,
            source_type: None,
            last_status: None,
            last_run_id: None,
            last_started_at: None,
            last_finished_at: None,
            last_error_class: None,
            checkpoint_watermark: None,
            checkpoint_updated_at: None,
            freshness_lag_seconds: None,
            pending_push_batches: 0,
        }
    }
}

/// External log locations for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunLinks {
    pub splunk_url: Option<String>,
    pub kestra_url: Option<String>,
}

/// One execution of a connector. The run-detail endpoint serves the same
/// shape flattened at the top level, plus `error_message`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunRecord {
    pub run_id: RunId,
    pub connector_id: ConnectorId,
    pub status: Option<String>,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub duration_seconds: Option<f64>,
    pub upserts_count: u64,
    pub deletes_count: u64,
    pub error_class: Option<String>,
    pub error_message: Option<String>,
    pub links: RunLinks,
}

/// Position of the current run page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    pub offset_runs: u64,
    pub limit_runs: u64,
    pub total_runs: u64,
    pub has_more: bool,
}

impl Page {
    /// Page with `has_more` derived from the other three fields.
    pub fn new(offset_runs: u64, limit_runs: u64, total_runs: u64) -> Self {
        Self {
            offset_runs,
            limit_runs,
            total_runs,
            has_more: compute_has_more(offset_runs, limit_runs, total_runs),
        }
    }
}

/// `offset + limit < total`.
pub fn compute_has_more(offset_runs: u64, limit_runs: u64, total_runs: u64) -> bool {
    offset_runs.saturating_add(limit_runs) < total_runs
}

/// Body of `GET /v1/ops/snapshot`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsSnapshot {
    pub summary: OpsSummary,
    pub connectors: Vec<ConnectorSummary>,
    pub recent_runs: Vec<RunRecord>,
    pub runs_page: Option<Page>,
}

/// Body of `GET /v1/ops/connectors/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorDetail {
    pub connector: ConnectorSummary,
    pub recent_runs: Vec<RunRecord>,
    pub runs_page: Option<Page>,
    pub status_filter: Option<String>,
}

/// A decoded ops response, one variant per view.
#[derive(Debug, Clone, PartialEq)]
pub enum OpsPayload {
    Snapshot(OpsSnapshot),
    Connector(ConnectorDetail),
    Run(RunRecord),
}

impl OpsPayload {
    /// Decode a JSON body for `view`.
    ///
    /// A body of the wrong shape is reported as a transport failure; it
    /// surfaces in the ops banner like any other failed poll.
    pub fn decode(view: OpsView, body: Value) -> Result<Self, ConsoleError> {
        let invalid = |e: serde_json::Error| {
            ConsoleError::Transport(format!("invalid {} payload: {e}", view.as_str()))
        };
        match view {
            OpsView::Snapshot => serde_json::from_value(body).map(Self::Snapshot).map_err(invalid),
            OpsView::ConnectorDetail => {
                serde_json::from_value(body).map(Self::Connector).map_err(invalid)
            }
            OpsView::RunDetail => serde_json::from_value(body).map(Self::Run).map_err(invalid),
        }
    }

    pub fn view(&self) -> OpsView {
        match self {
            Self::Snapshot(_) => OpsView::Snapshot,
            Self::Connector(_) => OpsView::ConnectorDetail,
            Self::Run(_) => OpsView::RunDetail,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
