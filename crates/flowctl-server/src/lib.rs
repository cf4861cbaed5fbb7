pub mod error;
pub mod leadership;
pub mod routes;
pub mod state;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Flow execution commands
        .route(
            "/api/flows/{group}/{name}/{execution_id}/resume",
            post(routes::flows::resume_flow),
        )
        .route(
            "/api/flows/{group}/{name}/{execution_id}",
            delete(routes::flows::kill_flow),
        )
        // Pending actions
        .route("/api/actions", get(routes::actions::list_actions))
        // Leadership
        .route("/api/leadership", get(routes::leadership::get_leadership))
        .route(
            "/api/leadership/events",
            get(routes::leadership::leadership_events),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the action server on `port`.
pub async fn serve(app_state: AppState, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(app_state, listener).await
}

/// Start the action server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(app_state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let replica_id = app_state.replica_id.clone();
    let is_leader = app_state.leadership.is_leader();
    let app = build_router(app_state);

    tracing::info!(
        replica_id = %replica_id,
        is_leader,
        "flowctl server listening on http://localhost:{actual_port}"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
