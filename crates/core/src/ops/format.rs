//! Status classification and display formatting for the ops views.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::ops::models::Page;
use crate::types::Timestamp;

/// Placeholder for absent values.
pub const NOT_AVAILABLE: &str = "n/a";

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Normalised run status, used for badge styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Success,
    Failed,
    Running,
    Unknown,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Running => "RUNNING",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Case-insensitive, total: anything unrecognised is `Unknown`.
pub fn classify(status: Option<&str>) -> RunStatus {
    let Some(status) = status else {
        return RunStatus::Unknown;
    };
    match status.trim().to_ascii_lowercase().as_str() {
        "success" => RunStatus::Success,
        "failed" => RunStatus::Failed,
        "running" => RunStatus::Running,
        _ => RunStatus::Unknown,
    }
}

/// A status label as served, with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: String,
    pub status: RunStatus,
}

impl StatusBadge {
    /// Blank or absent statuses are labelled `UNKNOWN`.
    pub fn new(status: Option<&str>) -> Self {
        let label = match status {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => RunStatus::Unknown.as_str().to_string(),
        };
        Self {
            label,
            status: classify(status),
        }
    }
}

/// `59s`, `1m 0s`, `2m 5s`; absent or non-finite is `n/a`.
pub fn format_seconds(value: Option<f64>) -> String {
    match value {
        Some(total) if total.is_finite() => {
            if total < 60.0 {
                format!("{total}s")
            } else {
                let mins = (total / 60.0).floor();
                let secs = total % 60.0;
                format!("{mins}m {secs}s")
            }
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// ISO-8601 UTC without sub-seconds, e.g. `2026-03-01T12:00:05Z`.
///
/// Accepts RFC 3339 with any offset, or a naive timestamp taken as UTC.
/// Input that does not parse is returned verbatim; absent or blank is
/// `n/a`.
pub fn format_date(value: Option<&str>) -> String {
    let raw = match value.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return NOT_AVAILABLE.to_string(),
    };
    match parse_timestamp(raw) {
        Some(ts) => format_timestamp(&ts),
        None => value.unwrap_or(raw).to_string(),
    }
}

pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format(DATE_FORMAT).to_string()
}

fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// `No runs`, or `<start>-<end> of <total>` with a one-based start.
pub fn page_summary(page: Option<&Page>) -> String {
    match page {
        Some(page) if page.total_runs > 0 => {
            let start = page.offset_runs + 1;
            let end = (page.offset_runs + page.limit_runs).min(page.total_runs);
            format!("{start}-{end} of {}", page.total_runs)
        }
        _ => "No runs".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
