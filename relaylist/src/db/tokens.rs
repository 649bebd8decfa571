//! Spotify user token persistence
//!
//! Relaylist is single-user: the table holds at most one token row.

use relaylist_common::db::StoredToken;
use relaylist_common::Result;
use sqlx::SqlitePool;

/// Replace the stored user token
pub async fn save_user_token(pool: &SqlitePool, token: &StoredToken) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM user_auth")
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO user_auth (user_id, access_token, refresh_token, token_expiry, scope)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&token.user_id)
    .bind(&token.access_token)
    .bind(&token.refresh_token)
    .bind(&token.token_expiry)
    .bind(&token.scope)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn load_user_token(pool: &SqlitePool) -> Result<Option<StoredToken>> {
    let token = sqlx::query_as::<_, StoredToken>(
        r#"
        SELECT user_id, access_token, refresh_token, token_expiry, scope
        FROM user_auth
        ORDER BY id DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(token)
}

pub async fn clear_user_token(pool: &SqlitePool) -> Result<()> {
    sqlx::query("DELETE FROM user_auth").execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaylist_common::db::init_database;

    fn token(access: &str) -> StoredToken {
        StoredToken {
            user_id: None,
            access_token: access.to_string(),
            refresh_token: Some("refresh".to_string()),
            token_expiry: "2030-01-01T00:00:00+00:00".to_string(),
            scope: Some("user-top-read".to_string()),
        }
    }

    #[tokio::test]
    async fn test_save_replaces_previous_token() {
        let temp_dir = tempfile::tempdir().unwrap();
        let pool = init_database(&temp_dir.path().join("test.db")).await.unwrap();

        assert!(load_user_token(&pool).await.unwrap().is_none());

        save_user_token(&pool, &token("first")).await.unwrap();
        save_user_token(&pool, &token("second")).await.unwrap();

        let loaded = load_user_token(&pool).await.unwrap().unwrap();
        assert_eq!(loaded.access_token, "second");
        assert_eq!(loaded.refresh_token.as_deref(), Some("refresh"));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_auth")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);

        clear_user_token(&pool).await.unwrap();
        assert!(load_user_token(&pool).await.unwrap().is_none());
    }
}
