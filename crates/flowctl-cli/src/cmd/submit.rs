use flowctl_core::{
    ActionRequestHandler, ActionType, AdmissionController, FlowStatusId, KillStatus,
};
use std::path::Path;

use crate::output::print_json;

fn handler(root: &Path) -> anyhow::Result<ActionRequestHandler> {
    let (_, store) = super::open_store(root)?;
    Ok(ActionRequestHandler::new(AdmissionController::new(store)))
}

pub fn resume(
    root: &Path,
    flow_group: String,
    flow_name: String,
    flow_execution_id: i64,
    json: bool,
) -> anyhow::Result<()> {
    let id = FlowStatusId::new(flow_group, flow_name, flow_execution_id);
    handler(root)?.resume(&id)?;
    report(&id, ActionType::Resume, None, json)
}

pub fn kill(
    root: &Path,
    flow_group: String,
    flow_name: String,
    flow_execution_id: i64,
    json: bool,
) -> anyhow::Result<()> {
    let id = FlowStatusId::new(flow_group, flow_name, flow_execution_id);
    let status = handler(root)?.kill(&id)?;
    report(&id, ActionType::Kill, Some(status), json)
}

fn report(
    id: &FlowStatusId,
    action_type: ActionType,
    status: Option<KillStatus>,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        let mut value = serde_json::json!({
            "flow_group": id.flow_group,
            "flow_name": id.flow_name,
            "flow_execution_id": id.flow_execution_id,
            "action": action_type,
        });
        if let Some(status) = status {
            value["status"] = serde_json::json!(status);
        }
        print_json(&value)?;
    } else {
        println!(
            "Queued {action_type} for {}/{}/{}",
            id.flow_group, id.flow_name, id.flow_execution_id
        );
    }
    Ok(())
}
