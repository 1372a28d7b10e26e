use crate::db::models::{Choice, NewUser, User, Vote};
use crate::db::store::{Store, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Data {
    users: HashMap<Uuid, User>,
    email_to_id: HashMap<String, Uuid>,
    token_to_id: HashMap<String, Uuid>,
    votes: HashMap<Uuid, Vote>,
}

/// Process-local store. Every operation runs under one lock, so the
/// uniqueness checks and the inserts they guard cannot interleave.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<Data>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let data = self.data.lock().await;
        Ok(data
            .email_to_id
            .get(email)
            .and_then(|id| data.users.get(id))
            .cloned())
    }

    async fn find_user_by_token(&self, session_token: &str) -> Result<Option<User>, StoreError> {
        let data = self.data.lock().await;
        Ok(data
            .token_to_id
            .get(session_token)
            .and_then(|id| data.users.get(id))
            .cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut data = self.data.lock().await;

        if data.email_to_id.contains_key(&new_user.email)
            || data.token_to_id.contains_key(&new_user.session_token)
        {
            return Err(StoreError::UniqueViolation);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            session_token: Some(new_user.session_token),
            created_at: Utc::now(),
        };

        data.email_to_id.insert(user.email.clone(), user.id);
        if let Some(token) = &user.session_token {
            data.token_to_id.insert(token.clone(), user.id);
        }
        data.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn set_session_token(&self, user_id: Uuid, session_token: &str) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;

        if data
            .token_to_id
            .get(session_token)
            .is_some_and(|owner| *owner != user_id)
        {
            return Err(StoreError::UniqueViolation);
        }

        let Data {
            users, token_to_id, ..
        } = &mut *data;

        let user = users.get_mut(&user_id).ok_or(StoreError::UserNotFound)?;

        if let Some(old) = user.session_token.take() {
            token_to_id.remove(&old);
        }
        token_to_id.insert(session_token.to_string(), user_id);
        user.session_token = Some(session_token.to_string());

        Ok(())
    }

    async fn clear_session_token(
        &self,
        user_id: Uuid,
        expected_token: &str,
    ) -> Result<bool, StoreError> {
        let mut data = self.data.lock().await;

        let Data {
            users, token_to_id, ..
        } = &mut *data;

        let user = users.get_mut(&user_id).ok_or(StoreError::UserNotFound)?;

        if user.session_token.as_deref() != Some(expected_token) {
            return Ok(false);
        }

        user.session_token = None;
        token_to_id.remove(expected_token);

        Ok(true)
    }

    async fn create_vote(&self, user_id: Uuid, choice: Choice) -> Result<Vote, StoreError> {
        let mut data = self.data.lock().await;

        if !data.users.contains_key(&user_id) {
            return Err(StoreError::UserNotFound);
        }
        if data.votes.contains_key(&user_id) {
            return Err(StoreError::UniqueViolation);
        }

        let vote = Vote {
            id: Uuid::new_v4(),
            user_id,
            choice,
            created_at: Utc::now(),
        };
        data.votes.insert(user_id, vote.clone());

        Ok(vote)
    }

    async fn find_vote_by_user(&self, user_id: Uuid) -> Result<Option<Vote>, StoreError> {
        let data = self.data.lock().await;
        Ok(data.votes.get(&user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, token: &str) -> NewUser {
        NewUser {
            name: "Ada".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            session_token: token.to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_unique_violation() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@example.com", "t1")).await.unwrap();

        let err = store
            .create_user(new_user("a@example.com", "t2"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation));
    }

    #[tokio::test]
    async fn replacing_token_drops_the_old_one() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("a@example.com", "old")).await.unwrap();

        store.set_session_token(user.id, "new").await.unwrap();

        assert!(store.find_user_by_token("old").await.unwrap().is_none());
        let found = store.find_user_by_token("new").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn clearing_token_logs_out() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("a@example.com", "tok")).await.unwrap();

        assert!(store.clear_session_token(user.id, "tok").await.unwrap());

        assert!(store.find_user_by_token("tok").await.unwrap().is_none());
        let found = store.find_user_by_email("a@example.com").await.unwrap().unwrap();
        assert!(found.session_token.is_none());
    }

    #[tokio::test]
    async fn clearing_a_stale_token_keeps_the_newer_session() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("a@example.com", "first")).await.unwrap();
        store.set_session_token(user.id, "second").await.unwrap();

        assert!(!store.clear_session_token(user.id, "first").await.unwrap());

        let found = store.find_user_by_token("second").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn second_vote_keeps_first_choice() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("a@example.com", "tok")).await.unwrap();

        store.create_vote(user.id, Choice::Yes).await.unwrap();
        let err = store.create_vote(user.id, Choice::No).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation));

        let vote = store.find_vote_by_user(user.id).await.unwrap().unwrap();
        assert_eq!(vote.choice, Choice::Yes);
    }

    #[tokio::test]
    async fn vote_for_unknown_user_is_rejected() {
        let store = MemoryStore::new();
        let err = store.create_vote(Uuid::new_v4(), Choice::No).await.unwrap_err();
        assert!(matches!(err, StoreError::UserNotFound));
    }
}
