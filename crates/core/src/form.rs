//! Editable field state behind the connector wizard.
//!
//! [`DraftForm`] holds raw field text exactly as the operator typed it.
//! Mode and auth switching go through [`DraftForm::set_mode`] and
//! [`DraftForm::set_auth_mode`]; [`DraftForm::build_draft`] turns the
//! current values into a [`ConnectorDraft`] without touching the form.

use crate::draft::{
    ConnectorDraft, ConnectorSpec, DeletePolicy, DraftMetadata, GeminiConfig, MappingConfig,
    Mode, OutputConfig, OutputFormat, ReconciliationConfig, RestAuth, ScheduleConfig,
    SourceConfig,
};
use crate::error::ConsoleError;
use crate::mode::{resolve, AuthMode, DefaultField, ModeLayout};
use crate::source::build_source_config;

// ---------------------------------------------------------------------------
// Field groups
// ---------------------------------------------------------------------------

/// SQL-only fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlFields {
    pub query: String,
}

/// OAuth client-credentials fields. Kept while the auth selector is on
/// static bearer so toggling back restores them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuthFields {
    pub token_url: String,
    pub client_id: String,
    pub client_auth_method: String,
    /// Comma or whitespace separated.
    pub scopes: String,
    pub audience: String,
    pub client_secret_ref: String,
}

/// REST-only fields, including the auth sub-form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestFields {
    pub url: String,
    pub method: String,
    /// Free-form JSON text; empty means null.
    pub payload: String,
    /// Free-form JSON text; empty means `{}`.
    pub headers: String,
    pub pagination_cursor_field: String,
    pub pagination_next_cursor_json_path: String,
    pub auth_mode: AuthMode,
    pub oauth: OAuthFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileFields {
    pub path: String,
    pub glob: String,
    pub format: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingFields {
    pub id_field: String,
    pub title_field: String,
    pub content_template: String,
    pub uri_template: String,
    pub mime_type: String,
    pub acl_users_field: String,
    pub acl_groups_field: String,
    /// Comma separated.
    pub metadata_fields: String,
}

/// Raw wizard state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftForm {
    pub name: String,
    mode: Mode,
    pub schedule_cron: String,
    pub schedule_enabled: bool,
    pub source_type: String,
    pub secret_ref: String,
    pub watermark_field: String,
    pub sql: SqlFields,
    pub rest: RestFields,
    pub file: FileFields,
    pub mapping: MappingFields,
    pub output_bucket: String,
    pub output_prefix: String,
    pub output_format: String,
    pub gemini_project_id: String,
    pub gemini_location: String,
    pub gemini_data_store_id: String,
    pub delete_policy: String,
}

impl Default for DraftForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            mode: Mode::default(),
            schedule_cron: String::new(),
            schedule_enabled: true,
            source_type: String::new(),
            secret_ref: String::new(),
            watermark_field: String::new(),
            sql: SqlFields::default(),
            rest: RestFields::default(),
            file: FileFields::default(),
            mapping: MappingFields::default(),
            output_bucket: String::new(),
            output_prefix: String::new(),
            output_format: String::new(),
            gemini_project_id: String::new(),
            gemini_location: String::new(),
            gemini_data_store_id: String::new(),
            delete_policy: String::new(),
        }
    }
}

impl DraftForm {
    /// Empty form for a new connector in the given mode.
    pub fn new(mode: Mode) -> Self {
        let mut form = Self::default();
        form.set_mode(mode);
        form
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.rest.auth_mode
    }

    /// Visibility and defaults for the current mode and auth sub-mode.
    pub fn layout(&self) -> ModeLayout {
        resolve(self.mode, self.rest.auth_mode)
    }

    /// Switch connector mode.
    ///
    /// Field groups owned only by the modes being left are rebuilt empty,
    /// so no stale values survive into the new mode. The source-type
    /// selector falls back to the first allowed value when the current
    /// one is not valid for `mode`.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode != Mode::SqlPull {
            self.sql = SqlFields::default();
        }
        if mode != Mode::RestPull {
            self.rest = RestFields::default();
        }
        if mode != Mode::FilePull {
            self.file = FileFields::default();
        }
        self.mode = mode;

        let layout = self.layout();
        if !layout.allows_source_type(&self.source_type) {
            self.source_type = layout.first_source_type().to_string();
        }
    }

    /// Switch the REST auth sub-mode. OAuth values are hidden, not cleared.
    pub fn set_auth_mode(&mut self, auth_mode: AuthMode) {
        self.rest.auth_mode = auth_mode;
    }

    /// Fill empty fields with the defaults for the current layout.
    ///
    /// Never overwrites a non-empty value; applying twice is the same as
    /// applying once.
    pub fn apply_defaults(&mut self) {
        for (field, value) in self.layout().defaults {
            let slot = self.default_slot(field);
            if slot.trim().is_empty() {
                *slot = value.to_string();
            }
        }
    }

    /// Copy of this form with defaults applied.
    pub fn with_defaults(&self) -> Self {
        let mut form = self.clone();
        form.apply_defaults();
        form
    }

    fn default_slot(&mut self, field: DefaultField) -> &mut String {
        match field {
            DefaultField::SourceType => &mut self.source_type,
            DefaultField::Query => &mut self.sql.query,
            DefaultField::Url => &mut self.rest.url,
            DefaultField::Method => &mut self.rest.method,
            DefaultField::WatermarkField => &mut self.watermark_field,
            DefaultField::FileGlob => &mut self.file.glob,
            DefaultField::FileFormat => &mut self.file.format,
            DefaultField::ClientAuthMethod => &mut self.rest.oauth.client_auth_method,
            DefaultField::MimeType => &mut self.mapping.mime_type,
            DefaultField::OutputFormat => &mut self.output_format,
            DefaultField::DeletePolicy => &mut self.delete_policy,
        }
    }

    /// Assemble a normalised draft from the current field values.
    ///
    /// Defaults are applied to a copy first. Fails before any network
    /// call when a structured-text field does not parse or a mode
    /// precondition is not met.
    pub fn build_draft(&self) -> Result<ConnectorDraft, ConsoleError> {
        let form = self.with_defaults();
        let source = build_source_config(&form)?;

        let delete_policy = DeletePolicy::from_str_value(form.delete_policy.trim())
            .map_err(ConsoleError::ConfigValidation)?;
        if form.output_format.trim() != crate::mode::DEFAULT_OUTPUT_FORMAT {
            return Err(ConsoleError::ConfigValidation(format!(
                "Invalid output format '{}'. Must be: ndjson",
                form.output_format.trim()
            )));
        }

        let mapping = MappingConfig {
            id_field: form.mapping.id_field.trim().to_string(),
            title_field: form.mapping.title_field.trim().to_string(),
            content_template: form.mapping.content_template.clone(),
            uri_template: non_empty(&form.mapping.uri_template),
            mime_type: form.mapping.mime_type.trim().to_string(),
            acl_users_field: non_empty(&form.mapping.acl_users_field),
            acl_groups_field: non_empty(&form.mapping.acl_groups_field),
            metadata_fields: split_commas(&form.mapping.metadata_fields),
        };

        Ok(ConnectorDraft {
            metadata: DraftMetadata {
                name: form.name.trim().to_string(),
            },
            spec: ConnectorSpec {
                source,
                mapping,
                output: OutputConfig {
                    bucket: form.output_bucket.trim().to_string(),
                    prefix: form.output_prefix.trim().to_string(),
                    format: OutputFormat::Ndjson,
                },
                gemini: GeminiConfig {
                    project_id: form.gemini_project_id.trim().to_string(),
                    location: form.gemini_location.trim().to_string(),
                    data_store_id: form.gemini_data_store_id.trim().to_string(),
                },
                reconciliation: ReconciliationConfig { delete_policy },
            },
            schedule: ScheduleConfig {
                cron: form.schedule_cron.trim().to_string(),
                enabled: form.schedule_enabled,
            },
        })
    }

    /// Load an existing draft into the editor.
    pub fn from_draft(draft: &ConnectorDraft) -> Self {
        let mut form = Self {
            name: draft.metadata.name.clone(),
            mode: draft.mode(),
            schedule_cron: draft.schedule.cron.clone(),
            schedule_enabled: draft.schedule.enabled,
            ..Self::default()
        };

        match &draft.spec.source {
            SourceConfig::SqlPull(sql) => {
                form.source_type = sql.source_type.as_str().to_string();
                form.secret_ref = sql.secret_ref.clone();
                form.watermark_field = sql.watermark_field.clone();
                form.sql.query = sql.query.clone();
            }
            SourceConfig::RestPull(rest) => {
                form.source_type = crate::draft::HTTP_SOURCE_TYPE.to_string();
                form.secret_ref = rest.secret_ref.clone();
                form.watermark_field = rest.watermark_field.clone();
                form.rest.url = rest.url.clone();
                form.rest.method = rest.method.clone();
                form.rest.payload = rest
                    .payload
                    .as_ref()
                    .and_then(|p| serde_json::to_string_pretty(p).ok())
                    .unwrap_or_default();
                form.rest.headers = if rest.headers.is_empty() {
                    String::new()
                } else {
                    serde_json::to_string_pretty(&rest.headers).unwrap_or_default()
                };
                form.rest.pagination_cursor_field =
                    rest.pagination_cursor_field.clone().unwrap_or_default();
                form.rest.pagination_next_cursor_json_path = rest
                    .pagination_next_cursor_json_path
                    .clone()
                    .unwrap_or_default();
                if let RestAuth::OAuthClientCredentials(oauth) = &rest.auth {
                    form.rest.auth_mode = AuthMode::OauthClientCredentials;
                    form.rest.oauth = OAuthFields {
                        token_url: oauth.token_url.clone(),
                        client_id: oauth.client_id.clone(),
                        client_auth_method: oauth.client_auth_method.as_str().to_string(),
                        scopes: oauth.scopes.join(", "),
                        audience: oauth.audience.clone().unwrap_or_default(),
                        client_secret_ref: oauth.client_secret_ref.clone().unwrap_or_default(),
                    };
                }
            }
            SourceConfig::RestPush(push) => {
                form.source_type = crate::draft::HTTP_SOURCE_TYPE.to_string();
                form.secret_ref = push.secret_ref.clone();
            }
            SourceConfig::FilePull(file) => {
                form.source_type = crate::draft::FILE_SOURCE_TYPE.to_string();
                form.watermark_field = file.watermark_field.clone();
                form.file = FileFields {
                    path: file.path.clone(),
                    glob: file.glob.clone(),
                    format: file.format.as_str().to_string(),
                };
            }
        }

        let mapping = &draft.spec.mapping;
        form.mapping = MappingFields {
            id_field: mapping.id_field.clone(),
            title_field: mapping.title_field.clone(),
            content_template: mapping.content_template.clone(),
            uri_template: mapping.uri_template.clone().unwrap_or_default(),
            mime_type: mapping.mime_type.clone(),
            acl_users_field: mapping.acl_users_field.clone().unwrap_or_default(),
            acl_groups_field: mapping.acl_groups_field.clone().unwrap_or_default(),
            metadata_fields: mapping.metadata_fields.join(", "),
        };
        form.output_bucket = draft.spec.output.bucket.clone();
        form.output_prefix = draft.spec.output.prefix.clone();
        form.output_format = crate::mode::DEFAULT_OUTPUT_FORMAT.to_string();
        form.gemini_project_id = draft.spec.gemini.project_id.clone();
        form.gemini_location = draft.spec.gemini.location.clone();
        form.gemini_data_store_id = draft.spec.gemini.data_store_id.clone();
        form.delete_policy = draft.spec.reconciliation.delete_policy.as_str().to_string();
        form
    }

    /// Set a field by its editor key, e.g. `source.url` or `mode`.
    ///
    /// `mode` and `source.auth` go through the switching rules.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), ConsoleError> {
        let invalid = ConsoleError::ConfigValidation;
        match key {
            "name" => self.name = value.to_string(),
            "mode" => self.set_mode(Mode::from_str_value(value.trim()).map_err(invalid)?),
            "schedule.cron" => self.schedule_cron = value.to_string(),
            "schedule.enabled" => {
                self.schedule_enabled = parse_bool(value).ok_or_else(|| {
                    invalid(format!("schedule.enabled must be true or false, got '{value}'"))
                })?
            }
            "source.type" => self.source_type = value.to_string(),
            "source.secretRef" => self.secret_ref = value.to_string(),
            "source.watermarkField" => self.watermark_field = value.to_string(),
            "source.query" => self.sql.query = value.to_string(),
            "source.url" => self.rest.url = value.to_string(),
            "source.method" => self.rest.method = value.to_string(),
            "source.payload" => self.rest.payload = value.to_string(),
            "source.headers" => self.rest.headers = value.to_string(),
            "source.paginationCursorField" => self.rest.pagination_cursor_field = value.to_string(),
            "source.paginationNextCursorJsonPath" => {
                self.rest.pagination_next_cursor_json_path = value.to_string()
            }
            "source.auth" => {
                self.set_auth_mode(AuthMode::from_str_value(value.trim()).map_err(invalid)?)
            }
            "oauth.tokenUrl" => self.rest.oauth.token_url = value.to_string(),
            "oauth.clientId" => self.rest.oauth.client_id = value.to_string(),
            "oauth.clientAuthMethod" => self.rest.oauth.client_auth_method = value.to_string(),
            "oauth.scopes" => self.rest.oauth.scopes = value.to_string(),
            "oauth.audience" => self.rest.oauth.audience = value.to_string(),
            "oauth.clientSecretRef" => self.rest.oauth.client_secret_ref = value.to_string(),
            "source.path" => self.file.path = value.to_string(),
            "source.glob" => self.file.glob = value.to_string(),
            "source.format" => self.file.format = value.to_string(),
            "mapping.idField" => self.mapping.id_field = value.to_string(),
            "mapping.titleField" => self.mapping.title_field = value.to_string(),
            "mapping.contentTemplate" => self.mapping.content_template = value.to_string(),
            "mapping.uriTemplate" => self.mapping.uri_template = value.to_string(),
            "mapping.mimeType" => self.mapping.mime_type = value.to_string(),
            "mapping.aclUsersField" => self.mapping.acl_users_field = value.to_string(),
            "mapping.aclGroupsField" => self.mapping.acl_groups_field = value.to_string(),
            "mapping.metadataFields" => self.mapping.metadata_fields = value.to_string(),
            "output.bucket" => self.output_bucket = value.to_string(),
            "output.prefix" => self.output_prefix = value.to_string(),
            "output.format" => self.output_format = value.to_string(),
            "gemini.projectId" => self.gemini_project_id = value.to_string(),
            "gemini.location" => self.gemini_location = value.to_string(),
            "gemini.dataStoreId" => self.gemini_data_store_id = value.to_string(),
            "reconciliation.deletePolicy" => self.delete_policy = value.to_string(),
            _ => return Err(invalid(format!("Unknown draft field '{key}'"))),
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Trimmed value, or `None` when blank.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split a comma/whitespace separated list, dropping empty entries.
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Split a comma separated list of field names; names may contain spaces.
pub(crate) fn split_commas(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::draft::SqlSourceType;

    fn filled_sql_form() -> DraftForm {
        let mut form = DraftForm::new(Mode::SqlPull);
        form.name = "acme-orders".into();
        form.schedule_cron = "0 */3 * * *".into();
        form.secret_ref = "acme-db".into();
        form.mapping.id_field = "order_id".into();
        form.mapping.title_field = "title".into();
        form.mapping.content_template = "{{ title }}".into();
        form.output_bucket = "gs://acme".into();
        form.output_prefix = "orders".into();
        form.gemini_project_id = "acme-project".into();
        form.gemini_location = "global".into();
        form.gemini_data_store_id = "orders-ds".into();
        form
    }

    // -- defaults ------------------------------------------------------------

    #[test]
    fn defaults_fill_only_empty_fields() {
        let mut form = filled_sql_form();
        form.sql.query = "SELECT 1".into();
        form.apply_defaults();
        assert_eq!(form.sql.query, "SELECT 1");
        assert_eq!(form.watermark_field, "updated_at");
        assert_eq!(form.delete_policy, "auto_delete_missing");
        assert_eq!(form.output_format, "ndjson");
        assert_eq!(form.mapping.mime_type, "text/plain");
    }

    #[test]
    fn defaults_are_idempotent_for_every_mode() {
        for mode in [Mode::SqlPull, Mode::RestPull, Mode::RestPush, Mode::FilePull] {
            for auth in [AuthMode::StaticBearer, AuthMode::OauthClientCredentials] {
                let mut form = DraftForm::new(mode);
                form.set_auth_mode(auth);
                let once = form.with_defaults();
                let twice = once.with_defaults();
                assert_eq!(once, twice, "mode {mode} auth {auth:?}");
            }
        }
    }

    #[test]
    fn rest_defaults_fill_request_fields() {
        let form = DraftForm::new(Mode::RestPull).with_defaults();
        assert_eq!(form.rest.url, "https://source.example/api/items");
        assert_eq!(form.rest.method, "GET");
        assert_eq!(form.source_type, "http");
        assert!(form.rest.oauth.client_auth_method.is_empty());
    }

    // -- mode switching ------------------------------------------------------

    #[test]
    fn switching_mode_resets_invalid_source_type() {
        let mut form = DraftForm::new(Mode::SqlPull);
        form.source_type = "oracle".into();
        form.set_mode(Mode::RestPull);
        assert_eq!(form.source_type, "http");
        form.set_mode(Mode::SqlPull);
        assert_eq!(form.source_type, "postgres");
    }

    #[test]
    fn switching_between_rest_modes_keeps_valid_source_type() {
        let mut form = DraftForm::new(Mode::RestPull);
        form.set_mode(Mode::RestPush);
        assert_eq!(form.source_type, "http");
    }

    #[test]
    fn toggling_auth_mode_preserves_oauth_values() {
        let mut form = DraftForm::new(Mode::RestPull);
        form.set_auth_mode(AuthMode::OauthClientCredentials);
        form.rest.oauth.token_url = "https://auth.local/token".into();
        form.rest.oauth.client_id = "bridge".into();

        form.set_auth_mode(AuthMode::StaticBearer);
        assert!(!form.layout().is_visible(crate::mode::FieldGroup::OAuth));
        form.set_auth_mode(AuthMode::OauthClientCredentials);

        assert_eq!(form.rest.oauth.token_url, "https://auth.local/token");
        assert_eq!(form.rest.oauth.client_id, "bridge");
    }

    #[test]
    fn leaving_rest_pull_drops_rest_and_oauth_values() {
        let mut form = DraftForm::new(Mode::RestPull);
        form.rest.url = "https://kb.local".into();
        form.set_auth_mode(AuthMode::OauthClientCredentials);
        form.rest.oauth.client_id = "bridge".into();

        form.set_mode(Mode::SqlPull);
        form.set_mode(Mode::RestPull);

        assert_eq!(form.rest, RestFields::default());
        assert_eq!(form.auth_mode(), AuthMode::StaticBearer);
    }

    #[test]
    fn leaving_sql_pull_drops_query() {
        let mut form = filled_sql_form();
        form.sql.query = "SELECT * FROM orders".into();
        form.set_mode(Mode::RestPull);
        assert!(form.sql.query.is_empty());
    }

    // -- build / hydrate -----------------------------------------------------

    #[test]
    fn build_draft_applies_defaults_without_mutating_form() {
        let form = filled_sql_form();
        let draft = form.build_draft().unwrap();
        assert!(form.sql.query.is_empty());
        match &draft.spec.source {
            SourceConfig::SqlPull(sql) => {
                assert_eq!(sql.source_type, SqlSourceType::Postgres);
                assert_eq!(sql.query, crate::mode::DEFAULT_SQL_QUERY);
            }
            other => panic!("expected sql source, got {other:?}"),
        }
        assert_eq!(draft.name(), "acme-orders");
    }

    #[test]
    fn build_draft_rejects_unknown_delete_policy() {
        let mut form = filled_sql_form();
        form.delete_policy = "delete_everything".into();
        assert_matches!(form.build_draft(), Err(ConsoleError::ConfigValidation(_)));
    }

    #[test]
    fn hydrated_form_rebuilds_the_same_draft() {
        let mut form = DraftForm::new(Mode::RestPull);
        form.name = "kb".into();
        form.rest.headers = r#"{"X-Tenant": "acme"}"#.into();
        form.rest.payload = r#"{"limit": 100}"#.into();
        form.set_auth_mode(AuthMode::OauthClientCredentials);
        form.rest.oauth.token_url = "https://auth.local/token".into();
        form.rest.oauth.client_id = "bridge".into();
        form.rest.oauth.scopes = "api.read api.write".into();
        form.mapping.metadata_fields = "team, region".into();

        let draft = form.build_draft().unwrap();
        let rebuilt = DraftForm::from_draft(&draft).build_draft().unwrap();
        assert_eq!(draft, rebuilt);
    }

    #[test]
    fn set_field_routes_mode_through_switching_rules() {
        let mut form = filled_sql_form();
        form.set_field("source.query", "SELECT 2").unwrap();
        form.set_field("mode", "rest_pull").unwrap();
        assert_eq!(form.mode(), Mode::RestPull);
        assert!(form.sql.query.is_empty());
        assert_matches!(
            form.set_field("source.nope", "x"),
            Err(ConsoleError::ConfigValidation(msg)) if msg.contains("source.nope")
        );
        assert_matches!(form.set_field("mode", "kafka"), Err(ConsoleError::ConfigValidation(_)));
    }

    #[test]
    fn split_list_accepts_commas_and_spaces() {
        assert_eq!(split_list("a, b  c,,d"), vec!["a", "b", "c", "d"]);
        assert!(split_list("  ").is_empty());
    }

    #[test]
    fn metadata_fields_split_on_commas_only() {
        let mut form = DraftForm::new(Mode::SqlPull);
        form.name = "acme-orders".into();
        form.secret_ref = "acme-db".into();
        form.mapping.metadata_fields = "region, order status,,sku ".into();
        let draft = form.build_draft().unwrap();
        assert_eq!(draft.spec.mapping.metadata_fields, vec!["region", "order status", "sku"]);
        assert!(split_commas(" , ").is_empty());
    }
}
