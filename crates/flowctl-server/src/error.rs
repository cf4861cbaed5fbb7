use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use flowctl_core::{ActionError, FlowctlError};

// ---------------------------------------------------------------------------
// Internal sentinel for explicit 400 Bad Request errors
// ---------------------------------------------------------------------------

/// Private sentinel error type used to carry an explicit HTTP 400 through
/// the `anyhow::Error` chain for input rejected before reaching the core.
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
///
/// Both duplicate resume and duplicate kill answer 409 Conflict.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }

    /// Construct a 500 for a store call whose outcome is unknown or failed.
    pub fn store_failure(msg: impl Into<String>) -> Self {
        Self(ActionError::StoreFailure(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(b) = self.0.downcast_ref::<BadRequestError>() {
            let body = serde_json::json!({ "error": b.0.clone() });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }

        let status = if let Some(e) = self.0.downcast_ref::<ActionError>() {
            match e {
                ActionError::AlreadyPending { .. } => StatusCode::CONFLICT,
                ActionError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                ActionError::StoreFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else if let Some(e) = self.0.downcast_ref::<FlowctlError>() {
            match e {
                FlowctlError::InvalidFlowIdentity(_) | FlowctlError::InvalidActionType(_) => {
                    StatusCode::BAD_REQUEST
                }
                FlowctlError::DuplicateDagAction { .. } => StatusCode::CONFLICT,
                FlowctlError::NotInitialized
                | FlowctlError::ActionStore(_)
                | FlowctlError::Io(_)
                | FlowctlError::Yaml(_)
                | FlowctlError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use flowctl_core::ActionType;

    #[test]
    fn already_pending_resume_maps_to_409() {
        let err = AppError(
            ActionError::AlreadyPending {
                action_type: ActionType::Resume,
            }
            .into(),
        );
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn already_pending_kill_maps_to_409() {
        let err = AppError(
            ActionError::AlreadyPending {
                action_type: ActionType::Kill,
            }
            .into(),
        );
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn invalid_request_maps_to_400() {
        let err = AppError(ActionError::InvalidRequest("flow group must not be empty".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_failure_maps_to_500() {
        let err = AppError::store_failure("connection refused");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bad_request_constructor_maps_to_400() {
        let err = AppError::bad_request("flow execution id 'abc' is not an integer");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_action_type_maps_to_400() {
        let err = AppError(FlowctlError::InvalidActionType("RETRY".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn action_store_error_maps_to_500() {
        let err = AppError(FlowctlError::ActionStore("disk full".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn non_flowctl_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_body_contains_error_field() {
        let err = AppError::store_failure("disk full");
        let response = err.into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(
            ct.to_str().unwrap().contains("application/json"),
            "expected JSON content type, got {:?}",
            ct
        );
    }
}
