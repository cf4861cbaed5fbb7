use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FlowctlError, Result};

// ---------------------------------------------------------------------------
// FlowIdentity
// ---------------------------------------------------------------------------

/// One execution instance of a named flow.
///
/// Fields are private so that every `FlowIdentity` in circulation has passed
/// validation; use [`FlowIdentity::new`] to construct one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowIdentity {
    flow_group: String,
    flow_name: String,
    flow_execution_id: i64,
}

impl FlowIdentity {
    pub fn new(
        flow_group: impl Into<String>,
        flow_name: impl Into<String>,
        flow_execution_id: i64,
    ) -> Result<Self> {
        let flow_group = flow_group.into();
        let flow_name = flow_name.into();
        validate_segment("flow group", &flow_group)?;
        validate_segment("flow name", &flow_name)?;
        if flow_execution_id < 0 {
            return Err(FlowctlError::InvalidFlowIdentity(format!(
                "flow execution id must be non-negative, got {flow_execution_id}"
            )));
        }
        Ok(Self {
            flow_group,
            flow_name,
            flow_execution_id,
        })
    }

    pub fn flow_group(&self) -> &str {
        &self.flow_group
    }

    pub fn flow_name(&self) -> &str {
        &self.flow_name
    }

    pub fn flow_execution_id(&self) -> i64 {
        self.flow_execution_id
    }

    /// The execution id as stored in the durable key schema.
    pub fn execution_id_str(&self) -> String {
        self.flow_execution_id.to_string()
    }
}

fn validate_segment(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FlowctlError::InvalidFlowIdentity(format!(
            "{what} must not be empty"
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(FlowctlError::InvalidFlowIdentity(format!(
            "{what} '{}' contains control characters",
            value.escape_default()
        )));
    }
    Ok(())
}

impl fmt::Display for FlowIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.flow_group, self.flow_name, self.flow_execution_id
        )
    }
}

// ---------------------------------------------------------------------------
// ActionType
// ---------------------------------------------------------------------------

/// Administrative command that can be queued against a flow execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Resume,
    Kill,
    Launch,
}

impl ActionType {
    pub fn all() -> &'static [ActionType] {
        &[ActionType::Resume, ActionType::Kill, ActionType::Launch]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::Resume => "RESUME",
            ActionType::Kill => "KILL",
            ActionType::Launch => "LAUNCH",
        }
    }

    /// Single-byte tag used in the redb key encoding. Never reuse a value.
    pub(crate) fn tag(self) -> u8 {
        match self {
            ActionType::Resume => 1,
            ActionType::Kill => 2,
            ActionType::Launch => 3,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionType {
    type Err = FlowctlError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RESUME" => Ok(ActionType::Resume),
            "KILL" => Ok(ActionType::Kill),
            "LAUNCH" => Ok(ActionType::Launch),
            _ => Err(FlowctlError::InvalidActionType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// DagAction
// ---------------------------------------------------------------------------

/// A durably recorded administrative command pending against a flow execution.
///
/// The key is `(flow, action_type)`; `created_at` is informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagAction {
    pub flow: FlowIdentity,
    pub action_type: ActionType,
    pub created_at: DateTime<Utc>,
}

impl DagAction {
    pub fn new(flow: FlowIdentity, action_type: ActionType) -> Self {
        Self {
            flow,
            action_type,
            created_at: Utc::now(),
        }
    }

    pub fn key(&self) -> (&FlowIdentity, ActionType) {
        (&self.flow, self.action_type)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn flow_identity_accepts_valid_parts() {
        let flow = FlowIdentity::new("g", "f", 100).unwrap();
        assert_eq!(flow.flow_group(), "g");
        assert_eq!(flow.flow_name(), "f");
        assert_eq!(flow.flow_execution_id(), 100);
        assert_eq!(flow.execution_id_str(), "100");
        assert_eq!(flow.to_string(), "g/f/100");
    }

    #[test]
    fn flow_identity_rejects_blank_group() {
        let err = FlowIdentity::new("  ", "f", 1).unwrap_err();
        assert!(matches!(err, FlowctlError::InvalidFlowIdentity(_)));
    }

    #[test]
    fn flow_identity_rejects_empty_name() {
        assert!(FlowIdentity::new("g", "", 1).is_err());
    }

    #[test]
    fn flow_identity_rejects_negative_execution_id() {
        let err = FlowIdentity::new("g", "f", -1).unwrap_err();
        assert!(err.to_string().contains("non-negative"), "got: {err}");
    }

    #[test]
    fn flow_identity_rejects_control_characters() {
        assert!(FlowIdentity::new("g\0", "f", 1).is_err());
        assert!(FlowIdentity::new("g", "f\n", 1).is_err());
    }

    #[test]
    fn action_type_parses_case_insensitively() {
        assert_eq!(ActionType::from_str("resume").unwrap(), ActionType::Resume);
        assert_eq!(ActionType::from_str("KILL").unwrap(), ActionType::Kill);
        assert_eq!(ActionType::from_str("Launch").unwrap(), ActionType::Launch);
        assert!(matches!(
            ActionType::from_str("retry"),
            Err(FlowctlError::InvalidActionType(_))
        ));
    }

    #[test]
    fn action_type_serializes_upper_case() {
        let json = serde_json::to_string(&ActionType::Resume).unwrap();
        assert_eq!(json, "\"RESUME\"");
    }

    #[test]
    fn action_type_tags_are_distinct() {
        let mut tags: Vec<u8> = ActionType::all().iter().map(|a| a.tag()).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), ActionType::all().len());
    }
}
