//! Mode resolver: field visibility, allowed source types and defaults.
//!
//! [`resolve`] is a pure function of `(mode, auth_mode)`. The editor in
//! [`crate::form`] applies the returned defaults only to empty fields.

use serde::{Deserialize, Serialize};

use crate::draft::{Mode, FILE_SOURCE_TYPE, HTTP_SOURCE_TYPE, SQL_SOURCE_TYPES};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const AUTH_STATIC_BEARER: &str = "static_bearer";
pub const AUTH_OAUTH_CLIENT_CREDENTIALS: &str = "oauth_client_credentials";

pub const DEFAULT_SQL_QUERY: &str = "SELECT * FROM source_table WHERE updated_at > :watermark";
pub const DEFAULT_REST_URL: &str = "https://source.example/api/items";
pub const DEFAULT_REST_METHOD: &str = "GET";
pub const DEFAULT_WATERMARK_FIELD: &str = "updated_at";
pub const DEFAULT_FILE_GLOB: &str = "*.csv";
pub const DEFAULT_FILE_FORMAT: &str = "csv";
pub const DEFAULT_CLIENT_AUTH_METHOD: &str = "client_secret_post";
pub const DEFAULT_OUTPUT_FORMAT: &str = "ndjson";
pub const DEFAULT_DELETE_POLICY: &str = "auto_delete_missing";
pub const DEFAULT_MIME_TYPE: &str = crate::draft::DEFAULT_MIME_TYPE;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Authentication sub-mode of a `rest_pull` source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    #[default]
    StaticBearer,
    OauthClientCredentials,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StaticBearer => AUTH_STATIC_BEARER,
            Self::OauthClientCredentials => AUTH_OAUTH_CLIENT_CREDENTIALS,
        }
    }

    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            AUTH_STATIC_BEARER => Ok(Self::StaticBearer),
            AUTH_OAUTH_CLIENT_CREDENTIALS => Ok(Self::OauthClientCredentials),
            _ => Err(format!(
                "Invalid auth mode '{s}'. Must be one of: {AUTH_STATIC_BEARER}, {AUTH_OAUTH_CLIENT_CREDENTIALS}"
            )),
        }
    }
}

/// A group of editor fields shown or hidden together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    /// Name, mode and schedule.
    Identity,
    /// Source type selector and secret reference.
    SourceCredentials,
    SqlQuery,
    RestRequest,
    RestPagination,
    /// The auth sub-mode selector.
    RestAuth,
    OAuth,
    FileLocation,
    /// Watermark column used for incremental pulls.
    Watermark,
    Mapping,
    Output,
    Destination,
    Reconciliation,
}

/// A single defaultable editor field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultField {
    SourceType,
    Query,
    Url,
    Method,
    WatermarkField,
    FileGlob,
    FileFormat,
    ClientAuthMethod,
    MimeType,
    OutputFormat,
    DeletePolicy,
}

/// What the editor should show and pre-fill for a mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeLayout {
    pub mode: Mode,
    pub auth_mode: AuthMode,
    pub visible: Vec<FieldGroup>,
    pub source_types: &'static [&'static str],
    /// Values written only into fields that are currently empty.
    pub defaults: Vec<(DefaultField, &'static str)>,
}

impl ModeLayout {
    pub fn is_visible(&self, group: FieldGroup) -> bool {
        self.visible.contains(&group)
    }

    pub fn allows_source_type(&self, source_type: &str) -> bool {
        self.source_types.contains(&source_type)
    }

    /// First entry of the source-type selector.
    pub fn first_source_type(&self) -> &'static str {
        self.source_types[0]
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

const HTTP_ONLY: &[&str] = &[HTTP_SOURCE_TYPE];
const FILE_ONLY: &[&str] = &[FILE_SOURCE_TYPE];

/// Allowed source types for a mode, in selector order.
pub fn source_types_for(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::SqlPull => SQL_SOURCE_TYPES,
        Mode::RestPull | Mode::RestPush => HTTP_ONLY,
        Mode::FilePull => FILE_ONLY,
    }
}

/// Derive visibility, source types and defaults for `(mode, auth_mode)`.
///
/// `auth_mode` only matters for `rest_pull`; other modes ignore it.
pub fn resolve(mode: Mode, auth_mode: AuthMode) -> ModeLayout {
    use FieldGroup::*;

    let source_types = source_types_for(mode);
    let mut visible = vec![Identity];
    let mut defaults = vec![(DefaultField::SourceType, source_types[0])];

    match mode {
        Mode::SqlPull => {
            visible.extend([SourceCredentials, SqlQuery, Watermark]);
            defaults.push((DefaultField::Query, DEFAULT_SQL_QUERY));
            defaults.push((DefaultField::WatermarkField, DEFAULT_WATERMARK_FIELD));
        }
        Mode::RestPull => {
            visible.extend([SourceCredentials, RestRequest, RestPagination, RestAuth, Watermark]);
            defaults.push((DefaultField::Url, DEFAULT_REST_URL));
            defaults.push((DefaultField::Method, DEFAULT_REST_METHOD));
            defaults.push((DefaultField::WatermarkField, DEFAULT_WATERMARK_FIELD));
            if auth_mode == AuthMode::OauthClientCredentials {
                visible.push(OAuth);
                defaults.push((DefaultField::ClientAuthMethod, DEFAULT_CLIENT_AUTH_METHOD));
            }
        }
        Mode::RestPush => {
            visible.push(SourceCredentials);
        }
        Mode::FilePull => {
            visible.extend([FileLocation, Watermark]);
            defaults.push((DefaultField::FileGlob, DEFAULT_FILE_GLOB));
            defaults.push((DefaultField::FileFormat, DEFAULT_FILE_FORMAT));
            defaults.push((DefaultField::WatermarkField, DEFAULT_WATERMARK_FIELD));
        }
    }

    visible.extend([Mapping, Output, Destination, Reconciliation]);
    defaults.push((DefaultField::MimeType, DEFAULT_MIME_TYPE));
    defaults.push((DefaultField::OutputFormat, DEFAULT_OUTPUT_FORMAT));
    defaults.push((DefaultField::DeletePolicy, DEFAULT_DELETE_POLICY));

    ModeLayout {
        mode,
        auth_mode,
        visible,
        source_types,
        defaults,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
