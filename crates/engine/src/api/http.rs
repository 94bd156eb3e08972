//! HTTP routes.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use improvstudio_domain::SceneState;
use improvstudio_shared::{ErrorCode, ErrorResponse, TurnRequest, TurnResponse, TURN_PATH};
use std::sync::Arc;

use crate::app::App;
use crate::use_cases::turn::TurnError;

/// Upper bound on a request body.
///
/// Clients send the whole scene, inlined audio included, with every turn.
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route(TURN_PATH, post(process_turn))
        .route("/api/scene/new", get(new_scene))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
}

async fn health() -> &'static str {
    "OK"
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn process_turn(
    State(app): State<Arc<App>>,
    payload: Result<Json<TurnRequest>, JsonRejection>,
) -> Result<Json<TurnResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let outcome = app
        .use_cases
        .turn
        .process
        .execute(request.scene_state.as_ref(), &request.user_command)
        .await?;

    Ok(Json(TurnResponse {
        scene_state: outcome.scene_state,
        new_lines: outcome.new_lines,
    }))
}

async fn new_scene(State(app): State<Arc<App>>) -> Json<SceneState> {
    Json(app.use_cases.turn.start_scene.execute())
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(ErrorCode::NotFound, "Not found")),
            )
                .into_response(),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(ErrorCode::BadRequest, msg)),
            )
                .into_response(),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::turn_failed()),
                )
                    .into_response()
            }
        }
    }
}

impl From<TurnError> for ApiError {
    fn from(e: TurnError) -> Self {
        if e.is_client_error() {
            ApiError::BadRequest(e.to_string())
        } else {
            ApiError::Internal(e.to_string())
        }
    }
}
