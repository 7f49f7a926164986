//! Ops query state and its named transitions.
//!
//! The state is the single source of truth for what the ops views fetch.
//! It is hydrated once from a query string, changed only through
//! [`OpsQueryState::apply`], and re-encoded after every transition so the
//! location always mirrors what is on screen.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConsoleError;
use crate::types::{ConnectorId, RunId};

/// Default reporting window for the fleet snapshot.
pub const DEFAULT_WINDOW_HOURS: u32 = 168;

/// Default page size when configuration does not override it.
pub const DEFAULT_LIMIT_RUNS: u32 = 25;

/// Which ops screen is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpsView {
    Snapshot,
    ConnectorDetail,
    RunDetail,
}

impl OpsView {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::ConnectorDetail => "connector-detail",
            Self::RunDetail => "run-detail",
        }
    }
}

impl FromStr for OpsView {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "snapshot" => Ok(Self::Snapshot),
            "connector-detail" => Ok(Self::ConnectorDetail),
            "run-detail" => Ok(Self::RunDetail),
            other => Err(ConsoleError::ConfigValidation(format!(
                "Unknown ops view '{other}'. Must be one of: snapshot, connector-detail, run-detail"
            ))),
        }
    }
}

/// The resource an ops view is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OpsTarget {
    Snapshot,
    Connector(ConnectorId),
    Run(RunId),
}

impl OpsTarget {
    pub fn view(&self) -> OpsView {
        match self {
            Self::Snapshot => OpsView::Snapshot,
            Self::Connector(_) => OpsView::ConnectorDetail,
            Self::Run(_) => OpsView::RunDetail,
        }
    }

    /// Path segments of the read endpoint, e.g. `["v1", "ops", "snapshot"]`.
    pub fn api_segments(&self) -> Vec<&str> {
        match self {
            Self::Snapshot => vec!["v1", "ops", "snapshot"],
            Self::Connector(id) => vec!["v1", "ops", "connectors", id.as_str()],
            Self::Run(id) => vec!["v1", "ops", "runs", id.as_str()],
        }
    }

    /// Console page path for this target.
    pub fn page_path(&self) -> String {
        match self {
            Self::Snapshot => "/ops".to_string(),
            Self::Connector(id) => format!("/ops/connectors/{id}"),
            Self::Run(id) => format!("/ops/runs/{id}"),
        }
    }
}

/// Filter values submitted by an `Apply`.
///
/// Fields a view does not filter on are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub window_hours: Option<u32>,
    pub status: String,
    pub connector_id: String,
}

/// A named change to the query state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    ApplyFilters(Filters),
    Reset,
    Prev,
    Next,
}

/// Pagination and filter state of one ops view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpsQueryState {
    pub target: OpsTarget,
    pub limit_runs: u32,
    pub offset_runs: u64,
    pub window_hours: u32,
    /// Upper-cased; empty means no filter.
    pub status: String,
    /// Empty means no filter.
    pub connector_id: String,
}

impl OpsQueryState {
    /// Fresh state with the configured page size.
    pub fn new(target: OpsTarget, default_limit_runs: u32) -> Self {
        Self {
            target,
            limit_runs: default_limit_runs.max(1),
            offset_runs: 0,
            window_hours: DEFAULT_WINDOW_HOURS,
            status: String::new(),
            connector_id: String::new(),
        }
    }

    pub fn view(&self) -> OpsView {
        self.target.view()
    }

    /// Hydrate from a query string (with or without the leading `?`).
    ///
    /// Missing, empty or non-finite numbers fall back to their defaults;
    /// the results are then clamped to `limit_runs >= 1`,
    /// `offset_runs >= 0` and `window_hours >= 1`. Parameters a view
    /// does not use are ignored.
    pub fn hydrate(target: OpsTarget, query: &str, default_limit_runs: u32) -> Self {
        let mut state = Self::new(target, default_limit_runs);
        let params: Vec<(String, String)> =
            url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
                .into_owned()
                .collect();
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        state.limit_runs =
            read_number(get("limit_runs"), f64::from(state.limit_runs)).max(1.0) as u32;
        state.offset_runs = read_number(get("offset_runs"), 0.0).max(0.0) as u64;

        match state.view() {
            OpsView::Snapshot => {
                state.window_hours =
                    read_number(get("window_hours"), f64::from(DEFAULT_WINDOW_HOURS)).max(1.0)
                        as u32;
                state.status = get("status").unwrap_or_default().to_uppercase();
                state.connector_id = get("connector_id").unwrap_or_default().to_string();
            }
            OpsView::ConnectorDetail => {
                state.status = get("status").unwrap_or_default().to_uppercase();
            }
            OpsView::RunDetail => {}
        }
        state
    }

    /// Return the state after `transition`. Never mutates `self`.
    pub fn apply(&self, transition: Transition) -> Self {
        let mut next = self.clone();
        match transition {
            Transition::ApplyFilters(filters) => {
                match next.view() {
                    OpsView::Snapshot => {
                        if let Some(hours) = filters.window_hours {
                            next.window_hours = hours.max(1);
                        }
                        next.status = filters.status.trim().to_uppercase();
                        next.connector_id = filters.connector_id.trim().to_string();
                    }
                    OpsView::ConnectorDetail => {
                        next.status = filters.status.trim().to_uppercase();
                    }
                    OpsView::RunDetail => {}
                }
                next.offset_runs = 0;
            }
            Transition::Reset => {
                if next.view() == OpsView::Snapshot {
                    next.window_hours = DEFAULT_WINDOW_HOURS;
                    next.connector_id.clear();
                }
                next.status.clear();
                next.offset_runs = 0;
            }
            Transition::Prev => {
                next.offset_runs = next.offset_runs.saturating_sub(u64::from(next.limit_runs));
            }
            Transition::Next => {
                next.offset_runs = next.offset_runs.saturating_add(u64::from(next.limit_runs));
            }
        }
        next
    }

    /// Ordered query parameters sent to the read endpoint.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        match self.view() {
            OpsView::Snapshot => {
                pairs.push(("window_hours", self.window_hours.to_string()));
                pairs.push(("limit_runs", self.limit_runs.to_string()));
                pairs.push(("offset_runs", self.offset_runs.to_string()));
                if !self.status.is_empty() {
                    pairs.push(("status", self.status.clone()));
                }
                if !self.connector_id.is_empty() {
                    pairs.push(("connector_id", self.connector_id.clone()));
                }
            }
            OpsView::ConnectorDetail => {
                pairs.push(("limit_runs", self.limit_runs.to_string()));
                pairs.push(("offset_runs", self.offset_runs.to_string()));
                if !self.status.is_empty() {
                    pairs.push(("status", self.status.clone()));
                }
            }
            OpsView::RunDetail => {}
        }
        pairs
    }

    /// URL-encoded query string without the leading `?`.
    pub fn to_query(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs())
            .finish()
    }

    /// Shareable location: page path plus query string.
    pub fn location(&self) -> String {
        let query = self.to_query();
        let path = self.target.page_path();
        if query.is_empty() {
            path
        } else {
            format!("{path}?{query}")
        }
    }
}

fn read_number(raw: Option<&str>, fallback: f64) -> f64 {
    match raw.map(str::trim) {
        None | Some("") => fallback,
        Some(text) => match text.parse::<f64>() {
            Ok(value) if value.is_finite() => value.trunc(),
            _ => fallback,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
