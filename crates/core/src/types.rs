/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Catalog-unique connector identifier (`metadata.name`).
pub type ConnectorId = String;

/// Run identifier assigned by the execution service.
pub type RunId = String;
