use crate::error::AuthError;
use crate::startup::AppState;
use axum::{
    extract::{Extension, Request},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

/// The user resolved from the session token, attached to every request that
/// passes [`require_session`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub session_token: String,
}

/// Reads the raw session token from the `Authorization` header. A `Bearer `
/// prefix is accepted but not required.
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => value,
    };
    (!token.is_empty()).then_some(token)
}

pub async fn require_session(
    Extension(app_state): Extension<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = session_token_from_headers(req.headers())
        .ok_or(AuthError::MissingToken)?
        .to_string();

    let user = app_state
        .store
        .find_user_by_token(&token)
        .await?
        .ok_or_else(|| {
            warn!("rejected request with unknown session token");
            AuthError::InvalidToken
        })?;

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        session_token: token,
    });

    Ok(next.run(req).await)
}
