//! Ops view controller: query state, request fencing and the last
//! rendered view.
//!
//! Every fetch is tagged with a sequence number and the generation of the
//! query state it was issued for. Transitions bump the generation, so a
//! response fetched for an older filter or page is dropped, and a response
//! older than one already applied is dropped too. Failed polls keep the
//! last good view and only set the banner.

use async_trait::async_trait;
use chrono::Utc;

use gsb_core::error::ConsoleError;
use gsb_core::ops::{render, OpsPayload, OpsQueryState, Transition, ViewModel};
use gsb_core::types::Timestamp;

use crate::api::ConsoleApi;

/// Prefix of the banner shown when a poll fails.
pub const REFRESH_FAILED_PREFIX: &str = "Unable to refresh ops data";

/// Where ops payloads come from.
#[async_trait]
pub trait OpsSource: Send + Sync {
    async fn fetch(&self, state: &OpsQueryState) -> Result<OpsPayload, ConsoleError>;
}

#[async_trait]
impl OpsSource for ConsoleApi {
    async fn fetch(&self, state: &OpsQueryState) -> Result<OpsPayload, ConsoleError> {
        self.fetch_ops(state).await.map_err(ConsoleError::from)
    }
}

/// A fetch issued by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpsRequest {
    pub seq: u64,
    pub generation: u64,
    pub state: OpsQueryState,
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// New payload rendered, banner cleared.
    Applied,
    /// Banner set, previous view kept.
    Failed,
    /// Superseded by a newer request or a later transition; ignored.
    Stale,
}

/// Single-threaded owner of one ops view's state.
#[derive(Debug)]
pub struct OpsController {
    state: OpsQueryState,
    generation: u64,
    next_seq: u64,
    last_applied_seq: u64,
    view: Option<ViewModel>,
    banner: Option<String>,
}

impl OpsController {
    pub fn new(state: OpsQueryState) -> Self {
        Self {
            state,
            generation: 0,
            next_seq: 0,
            last_applied_seq: 0,
            view: None,
            banner: None,
        }
    }

    pub fn state(&self) -> &OpsQueryState {
        &self.state
    }

    /// Current shareable location (page path plus query).
    pub fn location(&self) -> String {
        self.state.location()
    }

    pub fn view(&self) -> Option<&ViewModel> {
        self.view.as_ref()
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Whether `transition` is offered right now.
    ///
    /// `Prev` and `Next` follow the last rendered pager and are unavailable
    /// before the first render; filters and reset always are.
    pub fn allows(&self, transition: &Transition) -> bool {
        let pager = self.view.as_ref().and_then(ViewModel::pager);
        match transition {
            Transition::Prev => pager.is_some_and(|p| p.prev_enabled),
            Transition::Next => pager.is_some_and(|p| p.next_enabled),
            Transition::ApplyFilters(_) | Transition::Reset => true,
        }
    }

    /// Request for a periodic refresh with the latest state.
    pub fn poll(&mut self) -> OpsRequest {
        self.issue()
    }

    /// Apply a transition and return the immediate fetch it triggers.
    pub fn transition(&mut self, transition: Transition) -> OpsRequest {
        self.state = self.state.apply(transition);
        self.generation += 1;
        tracing::debug!(
            location = %self.state.location(),
            generation = self.generation,
            "Ops state changed",
        );
        self.issue()
    }

    /// Record the outcome of `request`.
    pub fn complete(
        &mut self,
        request: &OpsRequest,
        result: Result<OpsPayload, ConsoleError>,
        now: &Timestamp,
    ) -> Completion {
        if request.generation != self.generation || request.seq <= self.last_applied_seq {
            tracing::debug!(
                seq = request.seq,
                generation = request.generation,
                current_generation = self.generation,
                last_applied = self.last_applied_seq,
                "Dropping stale ops response",
            );
            return Completion::Stale;
        }
        self.last_applied_seq = request.seq;

        match result {
            Ok(payload) => {
                self.view = Some(render(&payload, now));
                self.banner = None;
                Completion::Applied
            }
            Err(err) => {
                tracing::warn!(error = %err, "Ops refresh failed");
                self.banner = Some(format!("{REFRESH_FAILED_PREFIX}: {err}"));
                Completion::Failed
            }
        }
    }

    /// [`complete`](Self::complete) stamped with the current time.
    pub fn complete_now(
        &mut self,
        request: &OpsRequest,
        result: Result<OpsPayload, ConsoleError>,
    ) -> Completion {
        self.complete(request, result, &Utc::now())
    }

    fn issue(&mut self) -> OpsRequest {
        self.next_seq += 1;
        OpsRequest {
            seq: self.next_seq,
            generation: self.generation,
            state: self.state.clone(),
        }
    }
}
