//! Resume and kill requests against flow executions.
//!
//! Each command is a projection of [`AdmissionController::admit`] onto one
//! [`ActionType`]. This module turns outcomes into [`ActionError`]s; choosing
//! a transport status code for them is left to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::admission::{AdmissionController, AdmissionOutcome};
use crate::types::{ActionType, FlowIdentity};

/// Raw flow execution key as received from a client, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStatusId {
    pub flow_group: String,
    pub flow_name: String,
    pub flow_execution_id: i64,
}

impl FlowStatusId {
    pub fn new(
        flow_group: impl Into<String>,
        flow_name: impl Into<String>,
        flow_execution_id: i64,
    ) -> Self {
        Self {
            flow_group: flow_group.into(),
            flow_name: flow_name.into(),
            flow_execution_id,
        }
    }

    fn to_identity(&self) -> Result<FlowIdentity, ActionError> {
        FlowIdentity::new(
            self.flow_group.clone(),
            self.flow_name.clone(),
            self.flow_execution_id,
        )
        .map_err(|e| ActionError::InvalidRequest(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error(
        "There is already a pending {action_type} action for this flow. \
         Please wait to resubmit and wait for action to be completed."
    )]
    AlreadyPending { action_type: ActionType },

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    StoreFailure(String),
}

/// Explicit acknowledgement returned by a successful kill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KillStatus {
    Ok,
}

#[derive(Clone)]
pub struct ActionRequestHandler {
    controller: AdmissionController,
}

impl ActionRequestHandler {
    pub fn new(controller: AdmissionController) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &AdmissionController {
        &self.controller
    }

    /// Queue a resume of a failed or paused flow execution.
    pub fn resume(&self, id: &FlowStatusId) -> Result<(), ActionError> {
        self.submit(id, ActionType::Resume)
    }

    /// Queue a kill of a running flow execution.
    pub fn kill(&self, id: &FlowStatusId) -> Result<KillStatus, ActionError> {
        self.submit(id, ActionType::Kill)?;
        Ok(KillStatus::Ok)
    }

    /// Admit `action_type` for the flow execution named by `id`.
    pub fn submit(&self, id: &FlowStatusId, action_type: ActionType) -> Result<(), ActionError> {
        let flow = id.to_identity()?;
        match self.controller.admit(&flow, action_type) {
            AdmissionOutcome::Accepted => Ok(()),
            AdmissionOutcome::AlreadyPending => Err(ActionError::AlreadyPending { action_type }),
            AdmissionOutcome::StoreFailure(cause) => {
                tracing::warn!(
                    flow_group = flow.flow_group(),
                    flow_name = flow.flow_name(),
                    flow_execution_id = flow.flow_execution_id(),
                    action = %action_type,
                    error = %cause,
                    "failed to add dag action to dag action store"
                );
                Err(ActionError::StoreFailure(cause))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
