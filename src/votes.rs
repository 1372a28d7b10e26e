use crate::db::Choice;
use crate::error::VoteError;
use crate::middleware::CurrentUser;
use crate::startup::AppState;
use axum::{
    extract::{Extension, Json, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    pub choice: Choice,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStatusResponse {
    pub has_voted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<Choice>,
}

#[derive(Debug, Serialize)]
pub struct AmendmentResponse {
    pub title: String,
    pub description: String,
}

/// Record the caller's single vote. There is no pre-check: the store's
/// uniqueness rule decides, so two racing submissions cannot both succeed.
pub async fn submit_vote(
    Extension(app_state): Extension<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    payload: Result<Json<CastVoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, VoteError> {
    let Json(payload) = payload?;

    match app_state
        .store
        .create_vote(current_user.id, payload.choice)
        .await
    {
        Ok(vote) => {
            info!("user {} voted {}", current_user.id, vote.choice);
            Ok((StatusCode::OK, Json(json!({ "message": "Vote recorded" }))))
        }
        Err(e) => {
            let e = VoteError::from(e);
            if matches!(e, VoteError::AlreadyVoted) {
                warn!("user {} tried to vote twice", current_user.id);
            }
            Err(e)
        }
    }
}

pub async fn check_vote(
    Extension(app_state): Extension<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, VoteError> {
    let vote = app_state.store.find_vote_by_user(current_user.id).await?;

    let response = VoteStatusResponse {
        has_voted: vote.is_some(),
        choice: vote.map(|v| v.choice),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Text of the amendment on the ballot. Public, the page shows it before login completes.
pub async fn amendment(Extension(app_state): Extension<AppState>) -> impl IntoResponse {
    Json(AmendmentResponse {
        title: app_state.amendment.title.clone(),
        description: app_state.amendment.description.clone(),
    })
}
