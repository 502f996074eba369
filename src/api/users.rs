use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::api::extract::{Json, Path};
use crate::api::middleware::{ensure_correct_user, AuthUser};
use crate::api::state::AppState;
use crate::error::AppError;

/// GET /users (requires auth)
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let users = state.identity.list_all().await?;
    Ok(Json(json!({ "users": users })))
}

/// GET /users/:username (requires auth as that user)
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(username): Path<String>,
) -> Result<Json<Value>, AppError> {
    ensure_correct_user(&auth, &username)?;
    let user = state.identity.get(&username).await?;
    Ok(Json(json!({ "user": user })))
}

/// GET /users/:username/from (requires auth as that user)
pub async fn messages_from(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(username): Path<String>,
) -> Result<Json<Value>, AppError> {
    ensure_correct_user(&auth, &username)?;
    let messages = state.messages.list_from(&username).await?;
    Ok(Json(json!({ "messages": messages })))
}

/// GET /users/:username/to (requires auth as that user)
pub async fn messages_to(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(username): Path<String>,
) -> Result<Json<Value>, AppError> {
    ensure_correct_user(&auth, &username)?;
    let messages = state.messages.list_to(&username).await?;
    Ok(Json(json!({ "messages": messages })))
}
