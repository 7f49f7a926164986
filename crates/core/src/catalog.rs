//! Connector catalog listing for the studio landing page.

use serde::{Deserialize, Serialize};

use crate::ops::format::{format_date, StatusBadge, NOT_AVAILABLE};
use crate::proposal::WizardMode;
use crate::types::{ConnectorId, RunId};

/// Page size used when the caller does not pick one.
pub const DEFAULT_CATALOG_LIMIT: u32 = 50;

/// One connector in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub connector_id: ConnectorId,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default = "default_true")]
    pub schedule_enabled: bool,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub last_status: Option<String>,
    #[serde(default)]
    pub last_run_id: Option<RunId>,
    #[serde(default)]
    pub last_started_at: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Body of `GET /v1/studio/catalog`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogPage {
    pub items: Vec<CatalogItem>,
    pub total: u64,
    pub limit: u32,
    pub offset: u64,
}

/// Catalog filters; empty strings are not sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub status: String,
    pub mode: String,
    pub q: String,
    pub limit: u32,
    pub offset: u64,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            status: String::new(),
            mode: String::new(),
            q: String::new(),
            limit: DEFAULT_CATALOG_LIMIT,
            offset: 0,
        }
    }
}

impl CatalogQuery {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        for (key, value) in [("status", &self.status), ("mode", &self.mode), ("q", &self.q)] {
            let value = value.trim();
            if !value.is_empty() {
                pairs.push((key, value.to_string()));
            }
        }
        pairs.push(("limit", self.limit.max(1).to_string()));
        pairs.push(("offset", self.offset.to_string()));
        pairs
    }
}

/// Wizard actions offered on every catalog row.
pub const ROW_ACTIONS: [WizardMode; 6] = [
    WizardMode::Edit,
    WizardMode::Clone,
    WizardMode::Pause,
    WizardMode::Resume,
    WizardMode::Delete,
    WizardMode::Run,
];

/// Display row for one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub connector_id: String,
    pub mode: String,
    pub schedule: String,
    pub enabled: &'static str,
    pub source_type: String,
    pub status: StatusBadge,
    pub last_run_id: String,
    pub last_started: String,
    pub actions: Vec<WizardMode>,
}

impl CatalogRow {
    pub fn from_item(item: &CatalogItem) -> Self {
        let or_na = |v: &Option<String>| {
            v.as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(NOT_AVAILABLE)
                .to_string()
        };
        Self {
            connector_id: item.connector_id.clone(),
            mode: if item.mode.is_empty() {
                NOT_AVAILABLE.to_string()
            } else {
                item.mode.clone()
            },
            schedule: or_na(&item.schedule),
            enabled: if item.schedule_enabled { "yes" } else { "no" },
            source_type: or_na(&item.source_type),
            status: StatusBadge::new(item.last_status.as_deref()),
            last_run_id: or_na(&item.last_run_id),
            last_started: format_date(item.last_started_at.as_deref()),
            actions: ROW_ACTIONS.to_vec(),
        }
    }
}

/// `<start>-<end> of <total>` for the catalog footer.
pub fn catalog_summary(page: &CatalogPage) -> String {
    if page.total == 0 || page.items.is_empty() {
        return "No connectors".to_string();
    }
    let start = page.offset + 1;
    let end = page.offset + page.items.len() as u64;
    format!("{start}-{end} of {}", page.total)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn query_skips_blank_filters() {
        let query = CatalogQuery {
            mode: "rest_pull".into(),
            q: "  ".into(),
            ..CatalogQuery::default()
        };
        assert_eq!(
            query.query_pairs(),
            vec![
                ("mode", "rest_pull".to_string()),
                ("limit", "50".to_string()),
                ("offset", "0".to_string()),
            ]
        );
    }

    #[test]
    fn row_fills_placeholders() {
        let page: CatalogPage = serde_json::from_value(json!({
            "items": [{"connector_id": "acme-orders", "mode": "sql_pull", "schedule_enabled": false,
                       "last_started_at": "2026-10-18T23:00:00+00:00"}],
            "total": 1, "limit": 50, "offset": 0
        }))
        .unwrap();
        let row = CatalogRow::from_item(&page.items[0]);
        assert_eq!(row.schedule, "n/a");
        assert_eq!(row.enabled, "no");
        assert_eq!(row.status.label, "UNKNOWN");
        assert_eq!(row.last_started, "2026-10-18T23:00:00Z");
        assert!(row.actions.contains(&WizardMode::Run));
        assert_eq!(catalog_summary(&page), "1-1 of 1");
    }
}
