use crate::db::{NewUser, StoreError};
use crate::error::AuthError;
use crate::middleware::CurrentUser;
use crate::startup::AppState;
use axum::{
    extract::{Extension, Json, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

const SESSION_TOKEN_BYTES: usize = 32;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub message: String,
    pub session_token: String,
}

/// 32 bytes from the OS RNG, hex encoded.
pub fn generate_session_token() -> String {
    let mut buf = [0u8; SESSION_TOKEN_BYTES];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn require_field(value: &str, field: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::InvalidRequest(format!("{field} is required")));
    }
    Ok(())
}

async fn hash_password(password: String, cost: u32) -> Result<String, AuthError> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(valid)
}

pub async fn signup(
    Extension(app_state): Extension<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload?;

    require_field(&payload.name, "name")?;
    require_field(&payload.email, "email")?;
    require_field(&payload.password, "password")?;

    let email = normalize_email(&payload.email);

    if app_state.store.find_user_by_email(&email).await?.is_some() {
        return Err(AuthError::EmailTaken);
    }

    let password_hash = hash_password(payload.password, app_state.bcrypt_cost).await?;
    let session_token = generate_session_token();

    // a concurrent signup with the same email loses on the unique index
    let user = app_state
        .store
        .create_user(NewUser {
            name: payload.name.trim().to_string(),
            email,
            password_hash,
            session_token: session_token.clone(),
        })
        .await?;

    info!("user {} signed up", user.id);

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            message: "Signup successful".to_string(),
            session_token,
        }),
    ))
}

pub async fn login(
    Extension(app_state): Extension<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload?;

    require_field(&payload.email, "email")?;
    require_field(&payload.password, "password")?;

    let email = normalize_email(&payload.email);

    let Some(user) = app_state.store.find_user_by_email(&email).await? else {
        warn!("login attempt for unknown email");
        return Err(AuthError::InvalidCredentials);
    };

    if !verify_password(payload.password, user.password_hash.clone()).await? {
        warn!("login attempt with wrong password for user {}", user.id);
        return Err(AuthError::InvalidCredentials);
    }

    let session_token = generate_session_token();
    app_state
        .store
        .set_session_token(user.id, &session_token)
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation => {
                AuthError::DatabaseError("session token collision".to_string())
            }
            other => other.into(),
        })?;

    info!("user {} logged in", user.id);

    Ok((
        StatusCode::OK,
        Json(SessionResponse {
            message: "Login successful".to_string(),
            session_token,
        }),
    ))
}

pub async fn logout(
    Extension(app_state): Extension<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AuthError> {
    let cleared = app_state
        .store
        .clear_session_token(current_user.id, &current_user.session_token)
        .await?;

    if cleared {
        info!("user {} logged out", current_user.id);
    } else {
        info!("user {} logged out of a session already replaced", current_user.id);
    }

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Logout successful" })),
    ))
}

pub async fn check(Extension(_current_user): Extension<CurrentUser>) -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "message": "Authenticated" })))
}
