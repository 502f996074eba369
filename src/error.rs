use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("Username taken: {0}")]
    DuplicateIdentity(String),

    #[error("Invalid username/password")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) | AppError::UnknownUser(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateIdentity(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::InvalidToken(_)
            | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Crypto(_)
            | AppError::Database(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match &self {
            // Driver text stays in the logs.
            AppError::Database(err) => {
                tracing::error!("Database failure: {}", err);
                "Database error".to_string()
            }
            AppError::Crypto(_) | AppError::Config(_) | AppError::Internal(_) => {
                tracing::error!("{}", self);
                self.to_string()
            }
            _ => self.to_string(),
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_categories() {
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::UnknownUser("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::DuplicateIdentity("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidToken("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
