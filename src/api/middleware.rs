use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::api::state::AppState;
use crate::error::AppError;

/// Username resolved from the bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::InvalidToken("Missing Authorization header".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::InvalidToken("Invalid Authorization format".to_string()))
}

/// Authentication middleware - resolves session tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let username = state.tokens.resolve(bearer_token(request.headers())?)?;

    request.extensions_mut().insert(AuthUser(username));

    Ok(next.run(request).await)
}

/// Routes scoped to `/users/:username` are only for that user.
pub fn ensure_correct_user(auth: &AuthUser, username: &str) -> Result<(), AppError> {
    if auth.0 != username {
        return Err(AppError::Unauthorized(
            "Cannot access another user's data".to_string(),
        ));
    }
    Ok(())
}
