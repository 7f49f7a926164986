//! Proposal actions, wizard modes and request bodies for the studio API.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::draft::ConnectorDraft;
use crate::error::ConsoleError;
use crate::types::ConnectorId;

/// Closed set of catalog changes a proposal can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalAction {
    Create,
    Edit,
    Clone,
    Delete,
    Pause,
    Resume,
}

impl ProposalAction {
    pub const ALL: [ProposalAction; 6] = [
        Self::Create,
        Self::Edit,
        Self::Clone,
        Self::Delete,
        Self::Pause,
        Self::Resume,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Clone => "clone",
            Self::Delete => "delete",
            Self::Pause => "pause",
            Self::Resume => "resume",
        }
    }

    /// Only actions that write a connector definition send the draft.
    pub fn carries_draft(&self) -> bool {
        matches!(self, Self::Create | Self::Edit | Self::Clone)
    }
}

impl FromStr for ProposalAction {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == needle)
            .ok_or_else(|| {
                ConsoleError::ConfigValidation(format!(
                    "Unknown proposal action '{s}'. Must be one of: create, edit, clone, delete, pause, resume"
                ))
            })
    }
}

impl std::fmt::Display for ProposalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the studio wizard was opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WizardMode {
    #[default]
    Create,
    Edit,
    Clone,
    Delete,
    Pause,
    Resume,
    /// Triggers Run Now and never builds a draft.
    Run,
}

impl WizardMode {
    /// Proposal sent when the wizard is submitted; `Run` has none.
    pub fn proposal_action(&self) -> Option<ProposalAction> {
        match self {
            Self::Create => Some(ProposalAction::Create),
            Self::Edit => Some(ProposalAction::Edit),
            Self::Clone => Some(ProposalAction::Clone),
            Self::Delete => Some(ProposalAction::Delete),
            Self::Pause => Some(ProposalAction::Pause),
            Self::Resume => Some(ProposalAction::Resume),
            Self::Run => None,
        }
    }

    /// Every mode except `create` starts from an existing catalog draft.
    pub fn loads_existing(&self) -> bool {
        !matches!(self, Self::Create)
    }

    /// Prepare a fetched draft for editing in this mode.
    pub fn hydrate(&self, draft: ConnectorDraft) -> ConnectorDraft {
        match self {
            Self::Clone => draft.cloned_as_copy(),
            _ => draft,
        }
    }
}

impl FromStr for WizardMode {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "edit" => Ok(Self::Edit),
            "clone" => Ok(Self::Clone),
            "delete" => Ok(Self::Delete),
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "run" => Ok(Self::Run),
            _ => Err(ConsoleError::ConfigValidation(format!(
                "Unknown wizard mode '{s}'. Must be one of: create, edit, clone, delete, pause, resume, run"
            ))),
        }
    }
}

/// Body of `POST /v1/studio/connectors/validate` and `/preview`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftEnvelope {
    pub draft: ConnectorDraft,
}

/// Body of `POST /v1/studio/connectors/propose`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalRequest {
    pub action: ProposalAction,
    pub connector_id: ConnectorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<ConnectorDraft>,
}

impl ProposalRequest {
    /// Build a proposal for `action`.
    ///
    /// `connector_id` falls back to the draft name when blank. The draft
    /// is attached only for create, edit and clone, and is required for
    /// them.
    pub fn new(
        action: ProposalAction,
        connector_id: Option<&str>,
        draft: Option<ConnectorDraft>,
    ) -> Result<Self, ConsoleError> {
        let connector_id = connector_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .or_else(|| draft.as_ref().map(|d| d.name().trim()))
            .unwrap_or_default()
            .to_string();
        if connector_id.is_empty() {
            return Err(ConsoleError::ConfigValidation(
                "Proposal requires a connector id or a draft name".into(),
            ));
        }
        let draft = if action.carries_draft() {
            Some(draft.ok_or_else(|| {
                ConsoleError::ConfigValidation(format!("Proposal action '{action}' requires a draft"))
            })?)
        } else {
            None
        };
        Ok(Self {
            action,
            connector_id,
            draft,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
