use crate::db::StoreError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Email already in use")]
    EmailTaken,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Not authorized, no token")]
    MissingToken,
    #[error("Not authorized, token failed")]
    InvalidToken,
    #[error("Password hashing error: {0}")]
    PasswordHash(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[derive(Error, Debug)]
pub enum VoteError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Already voted")]
    AlreadyVoted,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::InvalidRequest(_) | AuthError::EmailTaken => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials | AuthError::MissingToken | AuthError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::PasswordHash(_) | AuthError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            error!("auth request failed: {}", self);
            return error_response(status, "Server error");
        }

        error_response(status, &self.to_string())
    }
}

impl IntoResponse for VoteError {
    fn into_response(self) -> Response {
        match &self {
            VoteError::InvalidRequest(_) | VoteError::AlreadyVoted => {
                error_response(StatusCode::BAD_REQUEST, &self.to_string())
            }
            VoteError::DatabaseError(_) => {
                error!("vote request failed: {}", self);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        match error {
            // signup's email index; login maps token collisions itself
            StoreError::UniqueViolation => AuthError::EmailTaken,
            StoreError::UserNotFound => AuthError::InvalidToken,
            StoreError::Database(e) => AuthError::DatabaseError(e.to_string()),
        }
    }
}

impl From<StoreError> for VoteError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::UniqueViolation => VoteError::AlreadyVoted,
            other => VoteError::DatabaseError(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::InvalidRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for VoteError {
    fn from(rejection: JsonRejection) -> Self {
        VoteError::InvalidRequest(rejection.body_text())
    }
}

impl From<bcrypt::BcryptError> for AuthError {
    fn from(error: bcrypt::BcryptError) -> Self {
        AuthError::PasswordHash(error.to_string())
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(error: tokio::task::JoinError) -> Self {
        AuthError::PasswordHash(error.to_string())
    }
}
