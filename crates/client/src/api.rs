//! REST client for the catalog and execution service.
//!
//! Wraps the `/v1/ops/*` read endpoints and the `/v1/studio/*` authoring
//! endpoints using [`reqwest`]. Every reply goes through
//! [`normalize_response`] so callers only ever see a decoded body or a
//! [`ConsoleError`].

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use url::Url;

use gsb_core::catalog::{CatalogPage, CatalogQuery};
use gsb_core::draft::ConnectorDraft;
use gsb_core::ops::{OpsPayload, OpsQueryState};
use gsb_core::proposal::{DraftEnvelope, ProposalRequest};
use gsb_core::response::{normalize_response, ResponseBody};

use crate::error::ClientError;

/// HTTP client for one console backend.
#[derive(Debug, Clone)]
pub struct ConsoleApi {
    client: reqwest::Client,
    base_url: Url,
}

impl ConsoleApi {
    /// Create a client for `base_url`, e.g. `http://localhost:8000`.
    ///
    /// `timeout` bounds each request; `None` keeps the transport default.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self::with_client(builder.build()?, base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        let base_url = parse_base_url(base_url)?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the payload for the state's current view and query.
    pub async fn fetch_ops(&self, state: &OpsQueryState) -> Result<OpsPayload, ClientError> {
        let mut url = self.endpoint(&state.target.api_segments());
        let pairs = state.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        tracing::debug!(url = %url, view = state.view().as_str(), "Fetching ops data");

        let body = self.send(self.client.get(url)).await?;
        let value = into_json(body)?;
        Ok(OpsPayload::decode(state.view(), value)?)
    }

    /// `GET /v1/studio/connectors/{id}`, unwrapping the `{draft}` envelope.
    pub async fn fetch_draft(&self, connector_id: &str) -> Result<ConnectorDraft, ClientError> {
        let url = self.endpoint(&["v1", "studio", "connectors", connector_id]);
        let body = self.send(self.client.get(url)).await?;
        let envelope: DraftEnvelope = serde_json::from_value(into_json(body)?)?;
        Ok(envelope.draft)
    }

    pub async fn validate_draft(&self, draft: &ConnectorDraft) -> Result<ResponseBody, ClientError> {
        self.post_json(&["v1", "studio", "connectors", "validate"], &DraftRef { draft })
            .await
    }

    pub async fn preview_draft(&self, draft: &ConnectorDraft) -> Result<ResponseBody, ClientError> {
        self.post_json(&["v1", "studio", "connectors", "preview"], &DraftRef { draft })
            .await
    }

    pub async fn propose(&self, request: &ProposalRequest) -> Result<ResponseBody, ClientError> {
        tracing::info!(
            action = %request.action,
            connector_id = %request.connector_id,
            with_draft = request.draft.is_some(),
            "Submitting proposal",
        );
        self.post_json(&["v1", "studio", "connectors", "propose"], request)
            .await
    }

    /// `POST /v1/studio/connectors/{id}/run-now` with no body.
    pub async fn run_now(&self, connector_id: &str) -> Result<ResponseBody, ClientError> {
        let url = self.endpoint(&["v1", "studio", "connectors", connector_id, "run-now"]);
        tracing::info!(connector_id, "Triggering run now");
        self.send(self.client.post(url)).await
    }

    pub async fn catalog(&self, query: &CatalogQuery) -> Result<CatalogPage, ClientError> {
        let mut url = self.endpoint(&["v1", "studio", "catalog"]);
        url.query_pairs_mut().extend_pairs(query.query_pairs());
        let body = self.send(self.client.get(url)).await?;
        Ok(serde_json::from_value(into_json(body)?)?)
    }

    // ---- private helpers ----

    /// Base URL with `segments` appended; each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `parse_base_url` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &T,
    ) -> Result<ResponseBody, ClientError> {
        let url = self.endpoint(segments);
        self.send(self.client.post(url).json(body)).await
    }

    /// Send a request and normalise the reply.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<ResponseBody, ClientError> {
        let response = request.header(ACCEPT, "application/json").send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let text = response.text().await?;

        normalize_response(status, content_type.as_deref(), &text).map_err(|err| {
            tracing::warn!(status, error = %err, "Request failed");
            ClientError::Console(err)
        })
    }
}

#[derive(Serialize)]
struct DraftRef<'a> {
    draft: &'a ConnectorDraft,
}

fn into_json(body: ResponseBody) -> Result<serde_json::Value, ClientError> {
    match body {
        ResponseBody::Json(value) => Ok(value),
        ResponseBody::Text(text) => {
            // A success reply without a JSON content type may still carry JSON.
            Ok(serde_json::from_str(&text)?)
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let url = Url::parse(raw.trim()).map_err(|e| ClientError::BaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::BaseUrl {
            url: raw.to_string(),
            reason: "expected an http(s) URL".into(),
        });
    }
    Ok(url)
}
