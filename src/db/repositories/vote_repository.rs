use crate::db::connection::DbPool;
use crate::db::models::{Choice, Vote};
use sqlx::postgres::PgRow;
use sqlx::{Error, Row};
use uuid::Uuid;

fn vote_from_row(row: &PgRow) -> Result<Vote, Error> {
    let choice: String = row.try_get("choice")?;
    let choice = choice
        .parse::<Choice>()
        .map_err(|e| Error::Decode(Box::new(e)))?;

    Ok(Vote {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        choice,
        created_at: row.try_get("created_at")?,
    })
}

/// Plain insert: a second vote by the same user fails on the `votes.user_id`
/// unique constraint, and the caller maps that to "already voted".
pub async fn cast_vote(pool: &DbPool, user_id: Uuid, choice: Choice) -> Result<Vote, Error> {
    let vote_id = Uuid::new_v4();

    let row = sqlx::query(
        "INSERT INTO votes (id, user_id, choice) VALUES ($1, $2, $3) \
         RETURNING id, user_id, choice, created_at",
    )
    .bind(vote_id)
    .bind(user_id)
    .bind(choice.as_str())
    .fetch_one(pool)
    .await?;

    vote_from_row(&row)
}

pub async fn get_user_vote(pool: &DbPool, user_id: Uuid) -> Result<Option<Vote>, Error> {
    let row = sqlx::query("SELECT id, user_id, choice, created_at FROM votes WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(vote_from_row).transpose()
}
