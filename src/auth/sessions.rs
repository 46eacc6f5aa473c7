//! Session registry: the per-user set of currently-valid issued tokens.
//!
//! A token authenticates a request only while it is present here, so logout
//! is a row deletion; the signed token itself stays cryptographically valid
//! but stops being accepted.

use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq)]
pub enum RevokeOutcome {
    Revoked,
    NotFound,
}

pub async fn register(
    db: &PgPool,
    user_id: Uuid,
    access: &str,
    token: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_tokens (user_id, access, token)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, token) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(access)
    .bind(token)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn revoke(db: &PgPool, user_id: Uuid, token: &str) -> sqlx::Result<RevokeOutcome> {
    let result = sqlx::query(
        r#"
        DELETE FROM user_tokens
        WHERE user_id = $1 AND token = $2
        "#,
    )
    .bind(user_id)
    .bind(token)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        Ok(RevokeOutcome::NotFound)
    } else {
        Ok(RevokeOutcome::Revoked)
    }
}

pub async fn is_active(db: &PgPool, user_id: Uuid, token: &str) -> sqlx::Result<bool> {
    let (exists,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM user_tokens
            WHERE user_id = $1 AND token = $2
        )
        "#,
    )
    .bind(user_id)
    .bind(token)
    .fetch_one(db)
    .await?;
    Ok(exists)
}
