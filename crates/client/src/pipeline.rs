//! Validate / preview / propose pipeline for the studio wizard.
//!
//! Each step builds the draft from the current form first; a local
//! `ConfigParse` or `ConfigValidation` failure is rendered straight into
//! the output panel without issuing a request.

use gsb_core::error::ConsoleError;
use gsb_core::form::DraftForm;
use gsb_core::proposal::{ProposalAction, ProposalRequest, WizardMode};
use gsb_core::response::{OutputPanel, ValidationOutcome};

use crate::api::ConsoleApi;

/// Studio actions bound to one backend.
pub struct StudioPipeline<'a> {
    api: &'a ConsoleApi,
}

impl<'a> StudioPipeline<'a> {
    pub fn new(api: &'a ConsoleApi) -> Self {
        Self { api }
    }

    /// Open the wizard: an empty form for `create`, otherwise the stored
    /// draft (renamed with `-copy` for `clone`).
    pub async fn load(
        &self,
        mode: WizardMode,
        connector_id: Option<&str>,
    ) -> Result<DraftForm, ConsoleError> {
        if !mode.loads_existing() {
            return Ok(DraftForm::default().with_defaults());
        }
        let connector_id = connector_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ConsoleError::ConfigValidation("A connector id is required to open an existing draft".into())
            })?;
        let draft = self.api.fetch_draft(connector_id).await?;
        tracing::debug!(connector_id, mode = ?mode, "Loaded draft");
        Ok(DraftForm::from_draft(&mode.hydrate(draft)))
    }

    /// Validate the draft. `valid: false` renders error-styled.
    pub async fn validate(&self, form: &DraftForm) -> OutputPanel {
        let draft = match form.build_draft() {
            Ok(draft) => draft,
            Err(err) => return local_failure(&err),
        };
        match self.api.validate_draft(&draft).await {
            Ok(body) => ValidationOutcome::panel(&body),
            Err(err) => remote_failure(err.into()),
        }
    }

    /// Preview the first mapped document; rendered verbatim.
    pub async fn preview(&self, form: &DraftForm) -> OutputPanel {
        let draft = match form.build_draft() {
            Ok(draft) => draft,
            Err(err) => return local_failure(&err),
        };
        match self.api.preview_draft(&draft).await {
            Ok(body) => OutputPanel::from_body(&body),
            Err(err) => remote_failure(err.into()),
        }
    }

    /// Submit a proposal for `action`.
    ///
    /// The form is only built when the action sends a draft or no
    /// `connector_id` was given.
    pub async fn propose(
        &self,
        form: &DraftForm,
        action: ProposalAction,
        connector_id: Option<&str>,
    ) -> OutputPanel {
        let request = match build_proposal(form, action, connector_id) {
            Ok(request) => request,
            Err(err) => return local_failure(&err),
        };
        match self.api.propose(&request).await {
            Ok(body) => OutputPanel::from_body(&body),
            Err(err) => remote_failure(err.into()),
        }
    }

    /// Fire Run Now for a stored connector; the draft is not involved.
    pub async fn run_now(&self, connector_id: &str) -> OutputPanel {
        match self.api.run_now(connector_id).await {
            Ok(body) => OutputPanel::from_body(&body),
            Err(err) => remote_failure(err.into()),
        }
    }
}

fn build_proposal(
    form: &DraftForm,
    action: ProposalAction,
    connector_id: Option<&str>,
) -> Result<ProposalRequest, ConsoleError> {
    let has_id = connector_id.is_some_and(|id| !id.trim().is_empty());
    let draft = if action.carries_draft() || !has_id {
        Some(form.build_draft()?)
    } else {
        None
    };
    ProposalRequest::new(action, connector_id, draft)
}

fn local_failure(err: &ConsoleError) -> OutputPanel {
    tracing::debug!(error = %err, "Draft rejected before sending");
    OutputPanel::from_error(err)
}

fn remote_failure(err: ConsoleError) -> OutputPanel {
    OutputPanel::from_error(&err)
}

#[cfg(test)]
mod tests {
    use gsb_core::draft::Mode;

    use super::*;

    #[test]
    fn pause_with_id_skips_draft_build() {
        let mut form = DraftForm::new(Mode::RestPull);
        form.rest.headers = "[]".into();
        let request = build_proposal(&form, ProposalAction::Pause, Some("kb")).unwrap();
        assert!(request.draft.is_none());
        assert_eq!(request.connector_id, "kb");
    }

    #[test]
    fn pause_without_id_needs_the_draft_name() {
        let mut form = DraftForm::new(Mode::SqlPull);
        form.name = "acme-orders".into();
        let request = build_proposal(&form, ProposalAction::Pause, None).unwrap();
        assert_eq!(request.connector_id, "acme-orders");
        assert!(request.draft.is_none());
    }
}
