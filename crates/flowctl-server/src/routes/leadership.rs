use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use std::convert::Infallible;
use tokio_stream::StreamExt as _;

use crate::leadership::leadership_stream;
use crate::state::AppState;

fn role(is_leader: bool) -> &'static str {
    if is_leader {
        "leader"
    } else {
        "standby"
    }
}

/// GET /api/leadership: whether this replica is the active leader.
pub async fn get_leadership(State(app): State<AppState>) -> Json<serde_json::Value> {
    let is_leader = app.leadership.is_leader();
    Json(serde_json::json!({
        "replica_id": app.replica_id,
        "is_leader": is_leader,
        "role": role(is_leader),
    }))
}

/// GET /api/leadership/events: SSE stream emitting `leadership` on every
/// transition, starting with the current role.
pub async fn leadership_events(
    State(app): State<AppState>,
) -> impl axum::response::IntoResponse {
    let stream = leadership_stream(app.leadership.as_ref()).map(|is_leader| {
        Ok::<Event, Infallible>(Event::default().event("leadership").data(role(is_leader)))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
