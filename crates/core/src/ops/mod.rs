//! Operations read-model: run history, connector health and the query
//! state that drives the paginated ops views.

pub mod format;
pub mod models;
pub mod query;
pub mod view;

pub use format::{classify, format_date, format_seconds, page_summary, RunStatus};
pub use models::{ConnectorDetail, ConnectorSummary, OpsPayload, OpsSnapshot, OpsSummary, Page, RunLinks, RunRecord};
pub use query::{Filters, OpsQueryState, OpsTarget, OpsView, Transition};
pub use view::{render, ViewModel};
