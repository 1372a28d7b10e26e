use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub session_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to insert a user; the id and timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub session_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "NO")]
    No,
}

impl Choice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::Yes => "YES",
            Choice::No => "NO",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid choice: {0}")]
pub struct InvalidChoice(pub String);

impl FromStr for Choice {
    type Err = InvalidChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "YES" => Ok(Choice::Yes),
            "NO" => Ok(Choice::No),
            other => Err(InvalidChoice(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Vote {
    pub id: Uuid,
    pub user_id: Uuid,
    pub choice: Choice,
    pub created_at: DateTime<Utc>,
}
