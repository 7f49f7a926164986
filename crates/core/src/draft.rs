//! Connector draft schema and its wire format.
//!
//! A draft is the unpersisted edit of a connector configuration. The
//! source block is a sum type keyed by [`Mode`], so a draft can never
//! carry fields of two modes at once. On the wire `spec.mode` and
//! `spec.source` are sibling keys; [`ConnectorSpec`] converts through
//! [`SpecWire`] to keep that shape while the Rust side stays tagged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const MODE_SQL_PULL: &str = "sql_pull";
pub const MODE_REST_PULL: &str = "rest_pull";
pub const MODE_REST_PUSH: &str = "rest_push";
pub const MODE_FILE_PULL: &str = "file_pull";

/// All valid connector modes, in selector order.
pub const VALID_MODES: &[&str] = &[MODE_SQL_PULL, MODE_REST_PULL, MODE_REST_PUSH, MODE_FILE_PULL];

/// Source types accepted by `sql_pull`, in selector order.
pub const SQL_SOURCE_TYPES: &[&str] = &["postgres", "mysql", "mssql", "oracle"];

/// Source type used by both REST modes.
pub const HTTP_SOURCE_TYPE: &str = "http";

/// Source type used by `file_pull`.
pub const FILE_SOURCE_TYPE: &str = "file";

/// Default mime type for mapped documents.
pub const DEFAULT_MIME_TYPE: &str = "text/plain";

/// Suffix appended to the connector name when a draft is cloned.
pub const CLONE_SUFFIX: &str = "-copy";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Connector integration pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    SqlPull,
    RestPull,
    RestPush,
    FilePull,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SqlPull => MODE_SQL_PULL,
            Self::RestPull => MODE_REST_PULL,
            Self::RestPush => MODE_REST_PUSH,
            Self::FilePull => MODE_FILE_PULL,
        }
    }

    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            MODE_SQL_PULL => Ok(Self::SqlPull),
            MODE_REST_PULL => Ok(Self::RestPull),
            MODE_REST_PUSH => Ok(Self::RestPush),
            MODE_FILE_PULL => Ok(Self::FilePull),
            _ => Err(format!(
                "Invalid mode '{s}'. Must be one of: {}",
                VALID_MODES.join(", ")
            )),
        }
    }

    /// Pull connectors run on a schedule; push connectors are fed by callers.
    pub fn is_scheduled(&self) -> bool {
        !matches!(self, Self::RestPush)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database engine behind a `sql_pull` source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlSourceType {
    Postgres,
    Mysql,
    Mssql,
    Oracle,
}

impl SqlSourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
            Self::Mssql => "mssql",
            Self::Oracle => "oracle",
        }
    }

    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            "postgres" => Ok(Self::Postgres),
            "mysql" => Ok(Self::Mysql),
            "mssql" => Ok(Self::Mssql),
            "oracle" => Ok(Self::Oracle),
            _ => Err(format!(
                "Source type '{s}' is not valid for {MODE_SQL_PULL}. Must be one of: {}",
                SQL_SOURCE_TYPES.join(", ")
            )),
        }
    }
}

/// How the token endpoint authenticates the OAuth client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
    #[default]
    ClientSecretPost,
    ClientSecretBasic,
}

impl ClientAuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientSecretPost => "client_secret_post",
            Self::ClientSecretBasic => "client_secret_basic",
        }
    }

    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            "client_secret_post" => Ok(Self::ClientSecretPost),
            "client_secret_basic" => Ok(Self::ClientSecretBasic),
            _ => Err(format!(
                "Invalid client auth method '{s}'. Must be one of: client_secret_post, client_secret_basic"
            )),
        }
    }
}

/// The only grant the console can author.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantType {
    #[default]
    #[serde(rename = "client_credentials")]
    ClientCredentials,
}

/// Format of files picked up by a `file_pull` connector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    #[default]
    Csv,
    Json,
    Ndjson,
}

impl FileFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Ndjson => "ndjson",
        }
    }

    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!(
                "Invalid file format '{s}'. Must be one of: csv, json, ndjson"
            )),
        }
    }
}

/// Staging format written to the output bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Ndjson,
}

/// What happens to destination records missing from a fresh pull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    #[default]
    AutoDeleteMissing,
    SoftDeleteOnly,
    NeverDelete,
}

impl DeletePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoDeleteMissing => "auto_delete_missing",
            Self::SoftDeleteOnly => "soft_delete_only",
            Self::NeverDelete => "never_delete",
        }
    }

    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            "auto_delete_missing" => Ok(Self::AutoDeleteMissing),
            "soft_delete_only" => Ok(Self::SoftDeleteOnly),
            "never_delete" => Ok(Self::NeverDelete),
            _ => Err(format!(
                "Invalid delete policy '{s}'. Must be one of: auto_delete_missing, soft_delete_only, never_delete"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Source variants
// ---------------------------------------------------------------------------

/// OAuth client-credentials settings for a `rest_pull` source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthClientCredentials {
    #[serde(default)]
    pub grant_type: GrantType,
    pub token_url: String,
    pub client_id: String,
    #[serde(default)]
    pub client_auth_method: ClientAuthMethod,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub audience: Option<String>,
    /// Falls back to the source `secretRef` when absent; omitted from the
    /// wire rather than sent as null.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret_ref: Option<String>,
}

/// Authentication for a `rest_pull` source.
#[derive(Debug, Clone, PartialEq)]
pub enum RestAuth {
    /// Bearer token resolved from the source `secretRef`.
    StaticBearer,
    OAuthClientCredentials(OAuthClientCredentials),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlSource {
    pub source_type: SqlSourceType,
    pub secret_ref: String,
    pub query: String,
    pub watermark_field: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestPullSource {
    pub secret_ref: String,
    pub url: String,
    pub method: String,
    pub watermark_field: String,
    pub payload: Option<Map<String, Value>>,
    pub pagination_cursor_field: Option<String>,
    pub pagination_next_cursor_json_path: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub auth: RestAuth,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestPushSource {
    pub secret_ref: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilePullSource {
    pub path: String,
    pub glob: String,
    pub format: FileFormat,
    pub watermark_field: String,
}

/// Mode-polymorphic source block. Exactly one shape per draft.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    SqlPull(SqlSource),
    RestPull(RestPullSource),
    RestPush(RestPushSource),
    FilePull(FilePullSource),
}

impl SourceConfig {
    pub fn mode(&self) -> Mode {
        match self {
            Self::SqlPull(_) => Mode::SqlPull,
            Self::RestPull(_) => Mode::RestPull,
            Self::RestPush(_) => Mode::RestPush,
            Self::FilePull(_) => Mode::FilePull,
        }
    }

    /// Serialize to the wire object expected under `spec.source`.
    ///
    /// Fields owned by other modes are written as explicit nulls for the
    /// pull modes so the backend can see they were cleared.
    pub fn to_wire(&self) -> Value {
        let mut obj = Map::new();
        match self {
            Self::SqlPull(sql) => {
                obj.insert("type".into(), sql.source_type.as_str().into());
                obj.insert("secretRef".into(), sql.secret_ref.clone().into());
                obj.insert("query".into(), sql.query.clone().into());
                obj.insert("watermarkField".into(), sql.watermark_field.clone().into());
                for key in REST_ONLY_KEYS {
                    obj.insert((*key).into(), Value::Null);
                }
            }
            Self::RestPull(rest) => {
                obj.insert("type".into(), HTTP_SOURCE_TYPE.into());
                obj.insert("secretRef".into(), rest.secret_ref.clone().into());
                obj.insert("url".into(), rest.url.clone().into());
                obj.insert("method".into(), rest.method.clone().into());
                obj.insert("watermarkField".into(), rest.watermark_field.clone().into());
                obj.insert(
                    "payload".into(),
                    rest.payload.clone().map(Value::Object).unwrap_or(Value::Null),
                );
                obj.insert(
                    "paginationCursorField".into(),
                    opt_string(&rest.pagination_cursor_field),
                );
                obj.insert(
                    "paginationNextCursorJsonPath".into(),
                    opt_string(&rest.pagination_next_cursor_json_path),
                );
                let headers: Map<String, Value> = rest
                    .headers
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect();
                obj.insert("headers".into(), Value::Object(headers));
                if let RestAuth::OAuthClientCredentials(oauth) = &rest.auth {
                    // Serializing a plain derive struct into a Value cannot fail.
                    obj.insert(
                        "oauth".into(),
                        serde_json::to_value(oauth).unwrap_or(Value::Null),
                    );
                }
                obj.insert("query".into(), Value::Null);
            }
            Self::RestPush(push) => {
                obj.insert("type".into(), HTTP_SOURCE_TYPE.into());
                obj.insert("secretRef".into(), push.secret_ref.clone().into());
            }
            Self::FilePull(file) => {
                obj.insert("type".into(), FILE_SOURCE_TYPE.into());
                obj.insert("path".into(), file.path.clone().into());
                obj.insert("glob".into(), file.glob.clone().into());
                obj.insert("format".into(), file.format.as_str().into());
                obj.insert("watermarkField".into(), file.watermark_field.clone().into());
            }
        }
        Value::Object(obj)
    }

    /// Read a `spec.source` object for the given mode.
    ///
    /// Tolerant of missing optional keys so catalog entries authored by
    /// hand still hydrate into the editor.
    pub fn from_wire(mode: Mode, value: Value) -> Result<Self, String> {
        match mode {
            Mode::SqlPull => {
                let raw: SqlSourceWire = serde_json::from_value(value)
                    .map_err(|e| format!("Invalid {MODE_SQL_PULL} source: {e}"))?;
                Ok(Self::SqlPull(SqlSource {
                    source_type: SqlSourceType::from_str_value(&raw.source_type)?,
                    secret_ref: raw.secret_ref,
                    query: raw.query.unwrap_or_default(),
                    watermark_field: raw.watermark_field.unwrap_or_default(),
                }))
            }
            Mode::RestPull => {
                let raw: RestPullWire = serde_json::from_value(value)
                    .map_err(|e| format!("Invalid {MODE_REST_PULL} source: {e}"))?;
                let auth = match raw.oauth {
                    Some(oauth) => RestAuth::OAuthClientCredentials(oauth),
                    None => RestAuth::StaticBearer,
                };
                Ok(Self::RestPull(RestPullSource {
                    secret_ref: raw.secret_ref,
                    url: raw.url.unwrap_or_default(),
                    method: raw.method.unwrap_or_default(),
                    watermark_field: raw.watermark_field.unwrap_or_default(),
                    payload: raw.payload,
                    pagination_cursor_field: raw.pagination_cursor_field,
                    pagination_next_cursor_json_path: raw.pagination_next_cursor_json_path,
                    headers: raw
                        .headers
                        .into_iter()
                        .map(|(k, v)| (k, value_to_text(&v)))
                        .collect(),
                    auth,
                }))
            }
            Mode::RestPush => {
                let raw: RestPushWire = serde_json::from_value(value)
                    .map_err(|e| format!("Invalid {MODE_REST_PUSH} source: {e}"))?;
                Ok(Self::RestPush(RestPushSource {
                    secret_ref: raw.secret_ref,
                }))
            }
            Mode::FilePull => {
                let raw: FilePullWire = serde_json::from_value(value)
                    .map_err(|e| format!("Invalid {MODE_FILE_PULL} source: {e}"))?;
                Ok(Self::FilePull(FilePullSource {
                    path: raw.path,
                    glob: raw.glob.unwrap_or_default(),
                    format: raw.format.unwrap_or_default(),
                    watermark_field: raw.watermark_field.unwrap_or_default(),
                }))
            }
        }
    }
}

/// REST-only keys nulled out of a SQL source.
const REST_ONLY_KEYS: &[&str] = &[
    "url",
    "payload",
    "paginationCursorField",
    "paginationNextCursorJsonPath",
];

fn opt_string(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}

/// Coerce a JSON scalar to header text. Strings are taken verbatim.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SqlSourceWire {
    #[serde(rename = "type")]
    source_type: String,
    #[serde(default)]
    secret_ref: String,
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    watermark_field: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestPullWire {
    #[serde(default)]
    secret_ref: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    watermark_field: Option<String>,
    #[serde(default)]
    payload: Option<Map<String, Value>>,
    #[serde(default)]
    pagination_cursor_field: Option<String>,
    #[serde(default)]
    pagination_next_cursor_json_path: Option<String>,
    #[serde(default)]
    headers: BTreeMap<String, Value>,
    #[serde(default)]
    oauth: Option<OAuthClientCredentials>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestPushWire {
    #[serde(default)]
    secret_ref: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilePullWire {
    #[serde(default)]
    path: String,
    #[serde(default)]
    glob: Option<String>,
    #[serde(default)]
    format: Option<FileFormat>,
    #[serde(default)]
    watermark_field: Option<String>,
}

// ---------------------------------------------------------------------------
// Draft structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingConfig {
    pub id_field: String,
    pub title_field: String,
    pub content_template: String,
    #[serde(default)]
    pub uri_template: Option<String>,
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
    #[serde(default)]
    pub acl_users_field: Option<String>,
    #[serde(default)]
    pub acl_groups_field: Option<String>,
    #[serde(default)]
    pub metadata_fields: Vec<String>,
}

fn default_mime_type() -> String {
    DEFAULT_MIME_TYPE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub bucket: String,
    pub prefix: String,
    #[serde(default)]
    pub format: OutputFormat,
}

/// Destination datastore coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiConfig {
    pub project_id: String,
    pub location: String,
    pub data_store_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationConfig {
    #[serde(default)]
    pub delete_policy: DeletePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SpecWire", into = "SpecWire")]
pub struct ConnectorSpec {
    pub source: SourceConfig,
    pub mapping: MappingConfig,
    pub output: OutputConfig,
    pub gemini: GeminiConfig,
    pub reconciliation: ReconciliationConfig,
}

impl ConnectorSpec {
    pub fn mode(&self) -> Mode {
        self.source.mode()
    }
}

/// Wire shape of `spec`: `mode` and `source` as sibling keys.
#[derive(Serialize, Deserialize)]
pub struct SpecWire {
    mode: Mode,
    source: Value,
    mapping: MappingConfig,
    output: OutputConfig,
    gemini: GeminiConfig,
    #[serde(default)]
    reconciliation: ReconciliationConfig,
}

impl TryFrom<SpecWire> for ConnectorSpec {
    type Error = String;

    fn try_from(wire: SpecWire) -> Result<Self, Self::Error> {
        Ok(Self {
            source: SourceConfig::from_wire(wire.mode, wire.source)?,
            mapping: wire.mapping,
            output: wire.output,
            gemini: wire.gemini,
            reconciliation: wire.reconciliation,
        })
    }
}

impl From<ConnectorSpec> for SpecWire {
    fn from(spec: ConnectorSpec) -> Self {
        Self {
            mode: spec.source.mode(),
            source: spec.source.to_wire(),
            mapping: spec.mapping,
            output: spec.output,
            gemini: spec.gemini,
            reconciliation: spec.reconciliation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftMetadata {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub cron: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// In-progress edit of a connector, identified by `metadata.name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorDraft {
    pub metadata: DraftMetadata,
    pub spec: ConnectorSpec,
    pub schedule: ScheduleConfig,
}

impl ConnectorDraft {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn mode(&self) -> Mode {
        self.spec.mode()
    }

    /// Copy of this draft under a new name, as used by the clone wizard.
    pub fn cloned_as_copy(&self) -> Self {
        let mut copy = self.clone();
        copy.metadata.name = format!("{}{CLONE_SUFFIX}", self.metadata.name);
        copy
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sql_draft_json() -> Value {
        json!({
            "metadata": {"name": "studio-hr"},
            "spec": {
                "mode": "sql_pull",
                "source": {
                    "type": "postgres",
                    "secretRef": "hr-db-credentials",
                    "query": "SELECT * FROM employees WHERE updated_at > :watermark",
                    "watermarkField": "updated_at"
                },
                "mapping": {
                    "idField": "employee_id",
                    "titleField": "full_name",
                    "contentTemplate": "{{ full_name }}"
                },
                "output": {"bucket": "file://./local-bucket", "prefix": "studio-hr", "format": "ndjson"},
                "gemini": {"projectId": "my-project", "location": "global", "dataStoreId": "hr-ds"},
                "reconciliation": {"deletePolicy": "auto_delete_missing"}
            },
            "schedule": {"cron": "0 */3 * * *", "enabled": true}
        })
    }

    fn rest_oauth_draft_json() -> Value {
        json!({
            "metadata": {"name": "studio-kb"},
            "spec": {
                "mode": "rest_pull",
                "source": {
                    "type": "http",
                    "secretRef": "kb-api-token",
                    "url": "https://kb.local/articles",
                    "method": "GET",
                    "watermarkField": "updated_at",
                    "headers": {"X-Tenant": "acme", "X-Retries": 3},
                    "oauth": {
                        "grantType": "client_credentials",
                        "tokenUrl": "https://auth.local/token",
                        "clientId": "bridge-client",
                        "clientSecretRef": "kb-oauth-client-secret",
                        "scopes": ["api.read"],
                        "audience": "knowledge-api",
                        "clientAuthMethod": "client_secret_post"
                    }
                },
                "mapping": {"idField": "article_id", "titleField": "title", "contentTemplate": "{{ title }}"},
                "output": {"bucket": "b", "prefix": "p"},
                "gemini": {"projectId": "p", "location": "global", "dataStoreId": "kb-ds"}
            },
            "schedule": {"cron": "*/30 * * * *", "enabled": true}
        })
    }

    #[test]
    fn mode_round_trips_through_str() {
        for mode in VALID_MODES {
            assert_eq!(Mode::from_str_value(mode).unwrap().as_str(), *mode);
        }
        assert!(Mode::from_str_value("kafka_pull").is_err());
    }

    #[test]
    fn sql_draft_deserializes_with_defaults() {
        let draft: ConnectorDraft = serde_json::from_value(sql_draft_json()).unwrap();
        assert_eq!(draft.mode(), Mode::SqlPull);
        assert_eq!(draft.spec.mapping.mime_type, "text/plain");
        assert!(draft.spec.mapping.metadata_fields.is_empty());
        match &draft.spec.source {
            SourceConfig::SqlPull(sql) => {
                assert_eq!(sql.source_type, SqlSourceType::Postgres);
                assert_eq!(sql.watermark_field, "updated_at");
            }
            other => panic!("expected sql source, got {other:?}"),
        }
    }

    #[test]
    fn sql_source_nulls_rest_fields_on_the_wire() {
        let draft: ConnectorDraft = serde_json::from_value(sql_draft_json()).unwrap();
        let wire = serde_json::to_value(&draft).unwrap();
        let source = &wire["spec"]["source"];
        assert_eq!(wire["spec"]["mode"], "sql_pull");
        assert!(source["url"].is_null());
        assert!(source["payload"].is_null());
        assert!(source["paginationCursorField"].is_null());
        assert!(source.get("headers").is_none());
        assert!(source.get("oauth").is_none());
    }

    #[test]
    fn rest_source_coerces_header_values_and_keeps_oauth() {
        let draft: ConnectorDraft = serde_json::from_value(rest_oauth_draft_json()).unwrap();
        let SourceConfig::RestPull(rest) = &draft.spec.source else {
            panic!("expected rest source");
        };
        assert_eq!(rest.headers["X-Retries"], "3");
        let RestAuth::OAuthClientCredentials(oauth) = &rest.auth else {
            panic!("expected oauth auth");
        };
        assert_eq!(oauth.client_id, "bridge-client");
        assert_eq!(oauth.client_auth_method, ClientAuthMethod::ClientSecretPost);

        let wire = serde_json::to_value(&draft).unwrap();
        assert!(wire["spec"]["source"]["query"].is_null());
        assert_eq!(wire["spec"]["source"]["oauth"]["grantType"], "client_credentials");
        assert_eq!(wire["spec"]["reconciliation"]["deletePolicy"], "auto_delete_missing");
        assert_eq!(wire["spec"]["output"]["format"], "ndjson");
    }

    #[test]
    fn absent_client_secret_ref_is_omitted_not_null() {
        let oauth = OAuthClientCredentials {
            grant_type: GrantType::ClientCredentials,
            token_url: "https://auth.local/token".into(),
            client_id: "bridge".into(),
            client_auth_method: ClientAuthMethod::ClientSecretBasic,
            scopes: vec![],
            audience: None,
            client_secret_ref: None,
        };
        let wire = serde_json::to_value(&oauth).unwrap();
        assert!(wire.get("clientSecretRef").is_none());
        assert!(wire["audience"].is_null());
    }

    #[test]
    fn static_bearer_rest_source_has_no_oauth_block() {
        let mut raw = rest_oauth_draft_json();
        raw["spec"]["source"].as_object_mut().unwrap().remove("oauth");
        let draft: ConnectorDraft = serde_json::from_value(raw).unwrap();
        let SourceConfig::RestPull(rest) = &draft.spec.source else {
            panic!("expected rest source");
        };
        assert_eq!(rest.auth, RestAuth::StaticBearer);
        let wire = serde_json::to_value(&draft).unwrap();
        assert!(wire["spec"]["source"].get("oauth").is_none());
    }

    #[test]
    fn sql_mode_rejects_http_source_type() {
        let mut raw = sql_draft_json();
        raw["spec"]["source"]["type"] = json!("http");
        let err = serde_json::from_value::<ConnectorDraft>(raw).unwrap_err();
        assert!(err.to_string().contains("not valid for sql_pull"));
    }

    #[test]
    fn clone_appends_copy_suffix() {
        let draft: ConnectorDraft = serde_json::from_value(sql_draft_json()).unwrap();
        let copy = draft.cloned_as_copy();
        assert_eq!(copy.name(), "studio-hr-copy");
        assert_eq!(copy.spec, draft.spec);
    }

    #[test]
    fn file_pull_source_reads_placeholder_shape() {
        let source = SourceConfig::from_wire(
            Mode::FilePull,
            json!({"type": "file", "path": "./runtime/sources/hr"}),
        )
        .unwrap();
        let SourceConfig::FilePull(file) = &source else {
            panic!("expected file source");
        };
        assert_eq!(file.format, FileFormat::Csv);
        assert_eq!(source.to_wire()["type"], "file");
    }
}
