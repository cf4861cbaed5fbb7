//! Exactly-once admission of DAG actions.
//!
//! `admit` checks the store for a pending action and inserts one if absent.
//! The existence check is only a fast path: two admitters can both see
//! "absent", so the store's refusal of a duplicate insert is what decides the
//! winner. Losers always get `AlreadyPending`.
//!
//! The controller is leadership-agnostic. Standby replicas admit exactly like
//! the leader; only the execution engine gates on leadership.

use std::fmt;
use std::sync::Arc;

use crate::error::FlowctlError;
use crate::store::DagActionStore;
use crate::types::{ActionType, FlowIdentity};

/// Result of one admission attempt. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// A new pending action was recorded.
    Accepted,
    /// An action of this type is already pending for the flow execution.
    AlreadyPending,
    /// The store could not be read or written; nothing was committed.
    StoreFailure(String),
}

impl AdmissionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl fmt::Display for AdmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => f.write_str("accepted"),
            Self::AlreadyPending => f.write_str("already pending"),
            Self::StoreFailure(cause) => write!(f, "store failure: {cause}"),
        }
    }
}

/// Holds nothing but a shared store handle; clone freely.
#[derive(Clone)]
pub struct AdmissionController {
    store: Arc<dyn DagActionStore>,
}

impl AdmissionController {
    pub fn new(store: Arc<dyn DagActionStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DagActionStore> {
        &self.store
    }

    pub fn admit(&self, flow: &FlowIdentity, action_type: ActionType) -> AdmissionOutcome {
        match self.store.exists(flow, action_type) {
            Ok(true) => {
                tracing::debug!(%flow, action = %action_type, "dag action already pending");
                return AdmissionOutcome::AlreadyPending;
            }
            Ok(false) => {}
            Err(e) => return AdmissionOutcome::StoreFailure(e.to_string()),
        }

        match self.store.add_dag_action(flow, action_type) {
            Ok(_) => {
                tracing::info!(%flow, action = %action_type, "dag action admitted");
                AdmissionOutcome::Accepted
            }
            Err(FlowctlError::DuplicateDagAction { .. }) => {
                tracing::debug!(
                    %flow,
                    action = %action_type,
                    "lost admission race to a concurrent request"
                );
                AdmissionOutcome::AlreadyPending
            }
            Err(e) => AdmissionOutcome::StoreFailure(e.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
