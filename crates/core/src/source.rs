//! Source config builder: editor fields to a mode-keyed [`SourceConfig`].

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::draft::{
    value_to_text, ClientAuthMethod, FileFormat, FilePullSource, GrantType, Mode,
    OAuthClientCredentials, RestAuth, RestPullSource, RestPushSource, SourceConfig, SqlSource,
    SqlSourceType,
};
use crate::error::ConsoleError;
use crate::form::{non_empty, split_list, DraftForm};
use crate::mode::{source_types_for, AuthMode};

/// Build the source block for the form's current mode.
///
/// Pure: reads only the fields of the selected mode, so the result can
/// never carry another mode's values. Structured-text fields that do not
/// parse fail with [`ConsoleError::ConfigParse`]; missing mode
/// preconditions fail with [`ConsoleError::ConfigValidation`].
pub fn build_source_config(form: &DraftForm) -> Result<SourceConfig, ConsoleError> {
    match form.mode() {
        Mode::SqlPull => {
            let source_type = SqlSourceType::from_str_value(form.source_type.trim())
                .map_err(ConsoleError::ConfigValidation)?;
            Ok(SourceConfig::SqlPull(SqlSource {
                source_type,
                secret_ref: form.secret_ref.trim().to_string(),
                query: form.sql.query.trim().to_string(),
                watermark_field: form.watermark_field.trim().to_string(),
            }))
        }
        Mode::RestPull => {
            check_fixed_source_type(form)?;
            let rest = &form.rest;
            let auth = match rest.auth_mode {
                AuthMode::StaticBearer => RestAuth::StaticBearer,
                AuthMode::OauthClientCredentials => {
                    RestAuth::OAuthClientCredentials(build_oauth(form)?)
                }
            };
            Ok(SourceConfig::RestPull(RestPullSource {
                secret_ref: form.secret_ref.trim().to_string(),
                url: rest.url.trim().to_string(),
                method: rest.method.trim().to_ascii_uppercase(),
                watermark_field: form.watermark_field.trim().to_string(),
                payload: parse_payload(&rest.payload)?,
                pagination_cursor_field: non_empty(&rest.pagination_cursor_field),
                pagination_next_cursor_json_path: non_empty(
                    &rest.pagination_next_cursor_json_path,
                ),
                headers: parse_headers(&rest.headers)?,
                auth,
            }))
        }
        Mode::RestPush => {
            check_fixed_source_type(form)?;
            Ok(SourceConfig::RestPush(RestPushSource {
                secret_ref: form.secret_ref.trim().to_string(),
            }))
        }
        Mode::FilePull => {
            check_fixed_source_type(form)?;
            if form.file.path.trim().is_empty() {
                return Err(ConsoleError::ConfigValidation(
                    "file_pull requires source.path".into(),
                ));
            }
            let format = FileFormat::from_str_value(form.file.format.trim())
                .map_err(ConsoleError::ConfigValidation)?;
            Ok(SourceConfig::FilePull(FilePullSource {
                path: form.file.path.trim().to_string(),
                glob: form.file.glob.trim().to_string(),
                format,
                watermark_field: form.watermark_field.trim().to_string(),
            }))
        }
    }
}

/// Modes with a single source type; blank is filled by the defaults.
fn check_fixed_source_type(form: &DraftForm) -> Result<(), ConsoleError> {
    let allowed = source_types_for(form.mode());
    let source_type = form.source_type.trim();
    if source_type.is_empty() || allowed.contains(&source_type) {
        return Ok(());
    }
    Err(ConsoleError::ConfigValidation(format!(
        "{} requires source.type '{}', got '{source_type}'",
        form.mode().as_str(),
        allowed.join("', '"),
    )))
}

fn build_oauth(form: &DraftForm) -> Result<OAuthClientCredentials, ConsoleError> {
    let oauth = &form.rest.oauth;
    let token_url = oauth.token_url.trim();
    if token_url.is_empty() {
        return Err(ConsoleError::ConfigValidation(
            "OAuth client credentials require tokenUrl".into(),
        ));
    }
    let client_id = oauth.client_id.trim();
    if client_id.is_empty() {
        return Err(ConsoleError::ConfigValidation(
            "OAuth client credentials require clientId".into(),
        ));
    }
    let client_auth_method = match oauth.client_auth_method.trim() {
        "" => ClientAuthMethod::default(),
        other => ClientAuthMethod::from_str_value(other).map_err(ConsoleError::ConfigValidation)?,
    };

    Ok(OAuthClientCredentials {
        grant_type: GrantType::ClientCredentials,
        token_url: token_url.to_string(),
        client_id: client_id.to_string(),
        client_auth_method,
        scopes: split_list(&oauth.scopes),
        audience: non_empty(&oauth.audience),
        client_secret_ref: non_empty(&oauth.client_secret_ref),
    })
}

/// Parse payload text. Blank and `null` both mean no payload.
pub fn parse_payload(text: &str) -> Result<Option<Map<String, Value>>, ConsoleError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ConsoleError::ConfigParse(format!("Payload JSON is invalid: {e}")))?;
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        _ => Err(ConsoleError::ConfigParse(
            "Payload JSON must be an object or null".into(),
        )),
    }
}

/// Parse headers text into a string map. Blank means no headers.
pub fn parse_headers(text: &str) -> Result<BTreeMap<String, String>, ConsoleError> {
    if text.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ConsoleError::ConfigParse(format!("Headers JSON is invalid: {e}")))?;
    let Value::Object(map) = value else {
        return Err(ConsoleError::ConfigParse(
            "Headers JSON must be an object".into(),
        ));
    };
    Ok(map.iter().map(|(k, v)| (k.clone(), value_to_text(v))).collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn rest_form() -> DraftForm {
        let mut form = DraftForm::new(Mode::RestPull).with_defaults();
        form.secret_ref = "kb-token".into();
        form
    }

    // -- sql / rest exclusivity ----------------------------------------------

    #[test]
    fn sql_source_carries_no_rest_fields() {
        let mut form = DraftForm::new(Mode::SqlPull).with_defaults();
        form.secret_ref = "db".into();
        let source = build_source_config(&form).unwrap();
        let wire = source.to_wire();
        assert_eq!(wire["type"], "postgres");
        for key in ["url", "payload", "paginationCursorField", "paginationNextCursorJsonPath"] {
            assert!(wire[key].is_null(), "{key} should be null");
        }
        assert!(wire.get("oauth").is_none());
    }

    #[test]
    fn rest_source_carries_no_query() {
        let source = build_source_config(&rest_form()).unwrap();
        let wire = source.to_wire();
        assert_eq!(wire["type"], "http");
        assert!(wire["query"].is_null());
        assert_eq!(wire["headers"], serde_json::json!({}));
        assert!(wire["payload"].is_null());
    }

    #[test]
    fn sql_form_rejects_http_source_type() {
        let mut form = DraftForm::new(Mode::SqlPull).with_defaults();
        form.source_type = "http".into();
        assert_matches!(
            build_source_config(&form),
            Err(ConsoleError::ConfigValidation(msg)) if msg.contains("sql_pull")
        );
    }

    // -- payload / headers ---------------------------------------------------

    #[test]
    fn headers_must_be_an_object() {
        let mut form = rest_form();
        form.rest.headers = "[1, 2]".into();
        assert_eq!(
            build_source_config(&form),
            Err(ConsoleError::ConfigParse("Headers JSON must be an object".into()))
        );
    }

    #[test]
    fn malformed_headers_report_parse_error() {
        let mut form = rest_form();
        form.rest.headers = "{not json".into();
        assert_matches!(
            build_source_config(&form),
            Err(ConsoleError::ConfigParse(msg)) if msg.starts_with("Headers JSON is invalid")
        );
    }

    #[test]
    fn header_values_are_coerced_to_text() {
        let headers = parse_headers(r#"{"X-Retries": 3, "X-Debug": true, "X-Tenant": "acme"}"#)
            .unwrap();
        assert_eq!(headers["X-Retries"], "3");
        assert_eq!(headers["X-Debug"], "true");
        assert_eq!(headers["X-Tenant"], "acme");
    }

    #[test]
    fn payload_accepts_object_or_null() {
        assert_eq!(parse_payload("null").unwrap(), None);
        assert_eq!(parse_payload("  ").unwrap(), None);
        assert!(parse_payload(r#"{"limit": 10}"#).unwrap().is_some());
        assert_eq!(
            parse_payload("[1]"),
            Err(ConsoleError::ConfigParse(
                "Payload JSON must be an object or null".into()
            ))
        );
    }

    // -- oauth ---------------------------------------------------------------

    #[test]
    fn oauth_requires_token_url_then_client_id() {
        let mut form = rest_form();
        form.set_auth_mode(AuthMode::OauthClientCredentials);
        assert_matches!(
            build_source_config(&form),
            Err(ConsoleError::ConfigValidation(msg)) if msg.contains("tokenUrl")
        );

        form.rest.oauth.token_url = "https://auth.local/token".into();
        form.rest.oauth.client_id = "   ".into();
        assert_matches!(
            build_source_config(&form),
            Err(ConsoleError::ConfigValidation(msg)) if msg.contains("clientId")
        );
    }

    #[test]
    fn oauth_block_omits_absent_client_secret_ref() {
        let mut form = rest_form();
        form.set_auth_mode(AuthMode::OauthClientCredentials);
        form.rest.oauth.token_url = "https://auth.local/token".into();
        form.rest.oauth.client_id = "bridge".into();
        form.rest.oauth.scopes = "api.read,api.write".into();

        let wire = build_source_config(&form).unwrap().to_wire();
        let oauth = &wire["oauth"];
        assert_eq!(oauth["grantType"], "client_credentials");
        assert_eq!(oauth["clientAuthMethod"], "client_secret_post");
        assert_eq!(oauth["scopes"], serde_json::json!(["api.read", "api.write"]));
        assert!(oauth["audience"].is_null());
        assert!(oauth.get("clientSecretRef").is_none());
    }

    #[test]
    fn static_bearer_ignores_hidden_oauth_values() {
        let mut form = rest_form();
        form.rest.oauth.client_id = "left-over".into();
        let wire = build_source_config(&form).unwrap().to_wire();
        assert!(wire.get("oauth").is_none());
    }

    // -- other modes ---------------------------------------------------------

    #[test]
    fn file_pull_requires_path() {
        let mut form = DraftForm::new(Mode::FilePull).with_defaults();
        assert_matches!(build_source_config(&form), Err(ConsoleError::ConfigValidation(_)));
        form.file.path = "./runtime/sources/hr".into();
        let wire = build_source_config(&form).unwrap().to_wire();
        assert_eq!(wire["glob"], "*.csv");
        assert_eq!(wire["format"], "csv");
        assert_eq!(wire["watermarkField"], "updated_at");
    }

    #[test]
    fn rest_push_keeps_only_secret_ref() {
        let mut form = DraftForm::new(Mode::RestPush).with_defaults();
        form.secret_ref = "push-secret".into();
        let wire = build_source_config(&form).unwrap().to_wire();
        assert_eq!(wire, serde_json::json!({"type": "http", "secretRef": "push-secret"}));
    }

    #[test]
    fn fixed_source_type_modes_reject_foreign_types() {
        let mut rest = rest_form();
        rest.set_field("source.type", "postgres").unwrap();
        assert_matches!(
            build_source_config(&rest),
            Err(ConsoleError::ConfigValidation(msg)) if msg.contains("'http'") && msg.contains("postgres")
        );

        let mut push = DraftForm::new(Mode::RestPush).with_defaults();
        push.source_type = "file".into();
        assert_matches!(build_source_config(&push), Err(ConsoleError::ConfigValidation(_)));

        let mut file = DraftForm::new(Mode::FilePull).with_defaults();
        file.file.path = "./runtime/sources/hr".into();
        file.source_type = "http".into();
        assert_matches!(build_source_config(&file), Err(ConsoleError::ConfigValidation(_)));
        file.source_type = "file".into();
        assert!(build_source_config(&file).is_ok());
    }
}
