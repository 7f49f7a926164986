//! Response normalisation shared by the studio pipeline and the ops views.
//!
//! Every HTTP reply is reduced to either a [`ResponseBody`] (success) or a
//! [`ConsoleError`] (`Transport` or `Api`) before anything renders it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConsoleError;

/// Fallback message when a JSON error body is `null`.
pub const REQUEST_FAILED: &str = "Request failed";

/// A decoded success body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// Pretty-printed JSON, or the text verbatim.
    pub fn render(&self) -> String {
        match self {
            Self::Json(value) => pretty(value),
            Self::Text(text) => text.clone(),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }
}

/// Whether a `Content-Type` header denotes a JSON body.
pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false)
}

/// Normalise a completed HTTP exchange.
///
/// A JSON content type whose body does not parse is treated as text.
pub fn normalize_response(
    status: u16,
    content_type: Option<&str>,
    body: &str,
) -> Result<ResponseBody, ConsoleError> {
    let success = (200..300).contains(&status);
    let json = if is_json_content_type(content_type) {
        serde_json::from_str::<Value>(body).ok()
    } else {
        None
    };

    match (success, json) {
        (true, Some(value)) => Ok(ResponseBody::Json(value)),
        (true, None) => Ok(ResponseBody::Text(body.to_string())),
        (false, Some(value)) => Err(ConsoleError::Api {
            status,
            message: error_message(&value),
        }),
        (false, None) => {
            let message = if body.trim().is_empty() {
                format!("request failed ({status})")
            } else {
                body.to_string()
            };
            Err(ConsoleError::Transport(message))
        }
    }
}

/// Message for a JSON error body: `detail` when present, else the body.
pub fn error_message(body: &Value) -> String {
    match body {
        Value::Null => REQUEST_FAILED.to_string(),
        Value::Object(map) => match map.get("detail") {
            Some(Value::String(detail)) => detail.clone(),
            Some(Value::Null) | None => pretty(body),
            Some(detail) => pretty(detail),
        },
        Value::String(text) => text.clone(),
        other => pretty(other),
    }
}

/// Two-space indented JSON.
pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

// ---------------------------------------------------------------------------
// Output panel
// ---------------------------------------------------------------------------

/// The studio output region: rendered text plus error styling.
///
/// `failure` is set when the panel shows an error instead of a reply, so
/// an error-styled `valid: false` answer stays distinguishable from a
/// request that never produced one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPanel {
    pub text: String,
    pub is_error: bool,
    pub failure: Option<ConsoleError>,
}

impl OutputPanel {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
            failure: None,
        }
    }

    /// Error-styled reply from the service.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
            failure: None,
        }
    }

    /// Success body rendered verbatim.
    pub fn from_body(body: &ResponseBody) -> Self {
        Self::ok(body.render())
    }

    /// Error replaces the whole output region.
    pub fn from_error(err: &ConsoleError) -> Self {
        Self {
            failure: Some(err.clone()),
            ..Self::error(err.to_string())
        }
    }
}

/// Decoded `POST /v1/studio/connectors/validate` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<Value>,
    #[serde(default)]
    pub warnings: Vec<Value>,
    #[serde(default)]
    pub normalized: Option<Value>,
}

impl ValidationOutcome {
    /// Read the outcome out of a success body; `None` if it has another shape.
    pub fn from_body(body: &ResponseBody) -> Option<Self> {
        let value = body.as_json()?;
        value.get("valid")?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Render a validate reply. `valid: false` is error-styled even though
    /// the request itself succeeded; the rest of the body is not consulted.
    pub fn panel(body: &ResponseBody) -> OutputPanel {
        let invalid = body.as_json().and_then(|v| v.get("valid")) == Some(&Value::Bool(false));
        if invalid {
            OutputPanel::error(body.render())
        } else {
            OutputPanel::from_body(body)
        }
    }

    /// Flat error and warning lines for terminal listing.
    pub fn messages(&self) -> Vec<String> {
        let errors = self.errors.iter().map(|e| format!("error: {}", scalar_text(e)));
        let warnings = self.warnings.iter().map(|w| format!("warning: {}", scalar_text(w)));
        errors.chain(warnings).collect()
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
