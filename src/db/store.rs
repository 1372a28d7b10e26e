use crate::db::connection::DbPool;
use crate::db::models::{Choice, NewUser, User, Vote};
use crate::db::repositories;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("unique constraint violated")]
    UniqueViolation,
    #[error("user not found")]
    UserNotFound,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                StoreError::UniqueViolation
            }
            sqlx::Error::RowNotFound => StoreError::UserNotFound,
            _ => StoreError::Database(error),
        }
    }
}

/// Persistence for users, their session tokens and their single vote.
///
/// Implementations must reject a second vote for the same user with
/// [`StoreError::UniqueViolation`] atomically, without relying on the caller
/// to check first.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_token(&self, session_token: &str) -> Result<Option<User>, StoreError>;

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Overwrites the stored token, ending any earlier session.
    async fn set_session_token(&self, user_id: Uuid, session_token: &str) -> Result<(), StoreError>;

    /// Clears the token only if it is still `expected_token`, so ending one
    /// session never revokes a newer login. Returns whether it was cleared.
    async fn clear_session_token(
        &self,
        user_id: Uuid,
        expected_token: &str,
    ) -> Result<bool, StoreError>;

    async fn create_vote(&self, user_id: Uuid, choice: Choice) -> Result<Vote, StoreError>;

    async fn find_vote_by_user(&self, user_id: Uuid) -> Result<Option<Vote>, StoreError>;
}

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        PgStore { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(repositories::get_user_by_email(&self.pool, email).await?)
    }

    async fn find_user_by_token(&self, session_token: &str) -> Result<Option<User>, StoreError> {
        Ok(repositories::get_user_by_session_token(&self.pool, session_token).await?)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        Ok(repositories::create_user(&self.pool, &new_user).await?)
    }

    async fn set_session_token(&self, user_id: Uuid, session_token: &str) -> Result<(), StoreError> {
        Ok(repositories::update_session_token(&self.pool, user_id, session_token).await?)
    }

    async fn clear_session_token(
        &self,
        user_id: Uuid,
        expected_token: &str,
    ) -> Result<bool, StoreError> {
        Ok(repositories::clear_session_token(&self.pool, user_id, expected_token).await?)
    }

    async fn create_vote(&self, user_id: Uuid, choice: Choice) -> Result<Vote, StoreError> {
        Ok(repositories::cast_vote(&self.pool, user_id, choice).await?)
    }

    async fn find_vote_by_user(&self, user_id: Uuid) -> Result<Option<Vote>, StoreError> {
        Ok(repositories::get_user_vote(&self.pool, user_id).await?)
    }
}
