use axum::{extract::State, http::StatusCode, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::extract::{Json, Path};
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;
use crate::error::AppError;

const MAX_BODY_CHARS: usize = 4096;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub to_username: String,
    #[serde(default)]
    pub body: String,
}

/// POST /messages (requires auth)
pub async fn send_message(
    State(state): State<AppState>,
    Extension(AuthUser(from)): Extension<AuthUser>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let to = req.to_username.trim();
    if to.is_empty() {
        return Err(AppError::Validation("to_username required".to_string()));
    }
    if req.body.is_empty() || req.body.chars().count() > MAX_BODY_CHARS {
        return Err(AppError::Validation(format!(
            "Message must be 1-{} characters",
            MAX_BODY_CHARS
        )));
    }

    let message = state.messages.send(&from, to, &req.body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "message": message }))))
}

/// GET /messages/:id (requires auth as sender or recipient)
pub async fn get_message(
    State(state): State<AppState>,
    Extension(AuthUser(requester)): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let message = state.messages.get(id, &requester).await?;
    Ok(Json(json!({ "message": message })))
}

/// POST /messages/:id/read (requires auth as recipient)
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(AuthUser(requester)): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let receipt = state.messages.mark_read(id, &requester).await?;
    Ok(Json(json!({ "message": receipt })))
}
