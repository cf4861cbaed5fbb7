pub mod actions;
pub mod flows;
pub mod leadership;

use std::time::Duration;

use flowctl_core::{ActionError, ActionType, FlowStatusId};

use crate::error::AppError;
use crate::state::AppState;

/// Run a blocking store call off the async runtime, bounded by the configured
/// store timeout.
///
/// A timeout is reported as a store failure: the call may still commit after
/// we give up, so the caller must not be told it succeeded.
pub(crate) async fn run_blocking<T, E, F>(app: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<anyhow::Error> + Send + 'static,
{
    bounded(app, f, |timeout| {
        tracing::warn!(
            replica_id = %app.replica_id,
            timeout_ms = timeout.as_millis() as u64,
            "dag action store call timed out"
        );
        AppError::store_failure(format!(
            "dag action store did not respond within {}ms",
            timeout.as_millis()
        ))
    })
    .await
}

/// [`run_blocking`] for an admission on behalf of `id`. A timeout is logged
/// and reported with the flow and action it was recording.
pub(crate) async fn run_admission<T, F>(
    app: &AppState,
    id: &FlowStatusId,
    action_type: ActionType,
    f: F,
) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, ActionError> + Send + 'static,
    T: Send + 'static,
{
    bounded(app, f, |timeout| {
        tracing::warn!(
            replica_id = %app.replica_id,
            flow_group = %id.flow_group,
            flow_name = %id.flow_name,
            flow_execution_id = id.flow_execution_id,
            action = %action_type,
            timeout_ms = timeout.as_millis() as u64,
            "dag action store call timed out"
        );
        AppError::store_failure(format!(
            "dag action store did not respond within {}ms while recording {action_type} for \
             {}/{}/{}; the action may or may not have been recorded",
            timeout.as_millis(),
            id.flow_group,
            id.flow_name,
            id.flow_execution_id
        ))
    })
    .await
}

async fn bounded<T, E, F>(
    app: &AppState,
    f: F,
    on_timeout: impl FnOnce(Duration) -> AppError,
) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<anyhow::Error> + Send + 'static,
{
    let timeout = app.store_timeout;
    let task = tokio::task::spawn_blocking(f);
    match tokio::time::timeout(timeout, task).await {
        Ok(joined) => {
            let result = joined.map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;
            result.map_err(AppError::from)
        }
        Err(_) => Err(on_timeout(timeout)),
    }
}

/// Parse the `{execution_id}` path segment.
pub(crate) fn parse_execution_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>().map_err(|_| {
        AppError::bad_request(format!(
            "flow execution id '{raw}' is not an integer"
        ))
    })
}
