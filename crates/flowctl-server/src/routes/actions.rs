use axum::extract::State;
use axum::Json;

use super::run_blocking;
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/actions: all pending dag actions, oldest first.
pub async fn list_actions(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store().clone();
    let actions = run_blocking(&app, move || store.list_dag_actions()).await?;

    let list: Vec<serde_json::Value> = actions
        .iter()
        .map(|a| {
            serde_json::json!({
                "flow_group": a.flow.flow_group(),
                "flow_name": a.flow.flow_name(),
                "flow_execution_id": a.flow.flow_execution_id(),
                "action": a.action_type,
                "created_at": a.created_at,
            })
        })
        .collect();
    Ok(Json(serde_json::json!(list)))
}
