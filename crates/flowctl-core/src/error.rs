use thiserror::Error;

use crate::types::{ActionType, FlowIdentity};

#[derive(Debug, Error)]
pub enum FlowctlError {
    #[error("not initialized: run 'flowctl init'")]
    NotInitialized,

    #[error("invalid flow identity: {0}")]
    InvalidFlowIdentity(String),

    #[error("invalid action type '{0}': expected one of RESUME, KILL, LAUNCH")]
    InvalidActionType(String),

    /// The store already holds a pending action for this key.
    #[error("dag action already exists: {action_type} for {flow}")]
    DuplicateDagAction {
        flow: FlowIdentity,
        action_type: ActionType,
    },

    #[error("dag action store error: {0}")]
    ActionStore(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlowctlError>;
