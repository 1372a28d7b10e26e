use crate::db::connection::DbPool;
use crate::db::models::{NewUser, User};
use sqlx::Error;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, name, email, password_hash, session_token, created_at";

pub async fn get_user_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn get_user_by_session_token(
    pool: &DbPool,
    session_token: &str,
) -> Result<Option<User>, Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE session_token = $1"
    ))
    .bind(session_token)
    .fetch_optional(pool)
    .await
}

pub async fn create_user(pool: &DbPool, new_user: &NewUser) -> Result<User, Error> {
    let user_id = Uuid::new_v4();

    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (id, name, email, password_hash, session_token) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
    ))
    .bind(user_id)
    .bind(&new_user.name)
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .bind(&new_user.session_token)
    .fetch_one(pool)
    .await
}

pub async fn update_session_token(
    pool: &DbPool,
    user_id: Uuid,
    session_token: &str,
) -> Result<(), Error> {
    let result = sqlx::query("UPDATE users SET session_token = $1 WHERE id = $2")
        .bind(session_token)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::RowNotFound);
    }

    Ok(())
}

/// Compare-and-clear: a token replaced by a later login is left alone.
pub async fn clear_session_token(
    pool: &DbPool,
    user_id: Uuid,
    expected_token: &str,
) -> Result<bool, Error> {
    let result = sqlx::query(
        "UPDATE users SET session_token = NULL WHERE id = $1 AND session_token = $2",
    )
    .bind(user_id)
    .bind(expected_token)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
