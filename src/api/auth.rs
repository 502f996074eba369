use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::api::extract::Json;
use crate::api::state::AppState;
use crate::error::AppError;
use crate::service::Registration;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: i64,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub expires_at: i64,
}

/// Both fields are required; the username is trimmed.
fn validate_credentials(username: &str, password: &str) -> Result<String, AppError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Username and password required".to_string(),
        ));
    }
    Ok(username.to_string())
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let username = validate_credentials(&req.username, &req.password)?;

    let user = state
        .identity
        .register(Registration {
            username,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
        })
        .await?;

    let issued = state.tokens.issue(&user.username)?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            token: issued.token,
            expires_at: issued.expires_at,
        }),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let username = validate_credentials(&req.username, &req.password)?;

    if !state
        .identity
        .authenticate_and_touch(&username, &req.password)
        .await?
    {
        tracing::info!(username = %username, "failed login");
        return Err(AppError::InvalidCredentials);
    }

    let issued = state.tokens.issue(&username)?;

    Ok(Json(LoginResponse {
        message: "Logged in!".to_string(),
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}
