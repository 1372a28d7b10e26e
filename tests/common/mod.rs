#![allow(dead_code)]

use amendment_vote::config::Amendment;
use amendment_vote::db::{Choice, MemoryStore, NewUser, Store, StoreError, User, Vote};
use amendment_vote::{AppState, router};
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_app() -> Router {
    app_with_store(Arc::new(MemoryStore::new()))
}

pub fn app_with_store(store: Arc<dyn Store>) -> Router {
    let state = AppState::new(
        store,
        Amendment {
            title: "Article 7 Amendment".to_string(),
            description: "Lowers the voting age to sixteen.".to_string(),
        },
        TEST_BCRYPT_COST,
    );
    router(state)
}

/// Which store operations [`FailingStore`] breaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Failure {
    /// Every operation returns a database error.
    Everything,
    /// User operations work, vote operations return a database error.
    Votes,
    /// Replacing a session token reports a unique violation.
    TokenCollision,
}

/// Memory store with selected operations failing.
pub struct FailingStore {
    inner: MemoryStore,
    failure: Failure,
}

impl FailingStore {
    pub fn new(failure: Failure) -> Self {
        FailingStore {
            inner: MemoryStore::new(),
            failure,
        }
    }

    fn check(&self, affected: bool) -> Result<(), StoreError> {
        if self.failure == Failure::Everything || affected {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.check(false)?;
        self.inner.find_user_by_email(email).await
    }

    async fn find_user_by_token(&self, session_token: &str) -> Result<Option<User>, StoreError> {
        self.check(false)?;
        self.inner.find_user_by_token(session_token).await
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        self.check(false)?;
        self.inner.create_user(new_user).await
    }

    async fn set_session_token(&self, user_id: Uuid, session_token: &str) -> Result<(), StoreError> {
        self.check(false)?;
        if self.failure == Failure::TokenCollision {
            return Err(StoreError::UniqueViolation);
        }
        self.inner.set_session_token(user_id, session_token).await
    }

    async fn clear_session_token(
        &self,
        user_id: Uuid,
        expected_token: &str,
    ) -> Result<bool, StoreError> {
        self.check(false)?;
        self.inner.clear_session_token(user_id, expected_token).await
    }

    async fn create_vote(&self, user_id: Uuid, choice: Choice) -> Result<Vote, StoreError> {
        self.check(self.failure == Failure::Votes)?;
        self.inner.create_vote(user_id, choice).await
    }

    async fn find_vote_by_user(&self, user_id: Uuid) -> Result<Option<Vote>, StoreError> {
        self.check(self.failure == Failure::Votes)?;
        self.inner.find_vote_by_user(user_id).await
    }
}

/// Asserts a 500 whose body is only the generic message.
pub fn assert_server_error(status: StatusCode, body: &Value) {
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, &json!({ "message": "Server error" }));
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("response");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

pub async fn signup(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/v1/auth/signup",
        None,
        Some(json!({ "name": "Test Voter", "email": email, "password": password })),
    )
    .await
}

pub async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await
}

/// Signs up a fresh user and returns the issued session token.
pub async fn signed_up_token(app: &Router, email: &str) -> String {
    let (status, body) = signup(app, email, "correct horse").await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
    body["sessionToken"]
        .as_str()
        .expect("sessionToken")
        .to_string()
}
