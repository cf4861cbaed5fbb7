use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use flowctl_core::{ActionType, FlowStatusId};

use super::{parse_execution_id, run_admission};
use crate::error::AppError;
use crate::state::AppState;

fn flow_status_id(group: String, name: String, execution_id: &str) -> Result<FlowStatusId, AppError> {
    Ok(FlowStatusId::new(group, name, parse_execution_id(execution_id)?))
}

/// POST /api/flows/{group}/{name}/{execution_id}/resume: queue a resume.
pub async fn resume_flow(
    State(app): State<AppState>,
    Path((group, name, execution_id)): Path<(String, String, String)>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let id = flow_status_id(group, name, &execution_id)?;
    let handler = app.handler.clone();
    let submitted = id.clone();
    run_admission(&app, &id, ActionType::Resume, move || handler.resume(&submitted)).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "flow_group": id.flow_group,
            "flow_name": id.flow_name,
            "flow_execution_id": id.flow_execution_id,
            "action": ActionType::Resume,
        })),
    ))
}

/// DELETE /api/flows/{group}/{name}/{execution_id}: queue a kill.
pub async fn kill_flow(
    State(app): State<AppState>,
    Path((group, name, execution_id)): Path<(String, String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = flow_status_id(group, name, &execution_id)?;
    let handler = app.handler.clone();
    let submitted = id.clone();
    let status =
        run_admission(&app, &id, ActionType::Kill, move || handler.kill(&submitted)).await?;

    Ok(Json(serde_json::json!({
        "status": status,
        "flow_group": id.flow_group,
        "flow_name": id.flow_name,
        "flow_execution_id": id.flow_execution_id,
        "action": ActionType::Kill,
    })))
}
