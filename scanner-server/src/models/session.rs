//! Wallet session model

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WalletSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub wallet_address: String,
    pub session_start: DateTime<Utc>,
    pub session_end: Option<DateTime<Utc>>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl WalletSession {
    pub async fn start(
        pool: &PgPool,
        user_id: Uuid,
        wallet_address: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, WalletSession>(
            r#"
            INSERT INTO wallet_sessions (user_id, wallet_address, ip_address, user_agent)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#
        )
        .bind(user_id)
        .bind(wallet_address)
        .bind(ip_address)
        .bind(user_agent)
        .fetch_one(pool)
        .await
    }

    /// Close every open session of the user. Returns how many were closed.
    pub async fn end_open(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE wallet_sessions SET session_end = NOW() WHERE user_id = $1 AND session_end IS NULL"
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use crate::models::User;

    #[tokio::test]
    async fn test_end_open_closes_every_open_session() {
        let Some(pool) = test_pool().await else { return };
        let wallet = format!("principal-{}", Uuid::new_v4());
        let (user, _) = User::find_or_create(&pool, &wallet, "icp").await.unwrap();

        let first = WalletSession::start(&pool, user.id, &wallet, Some("10.0.0.1"), None).await.unwrap();
        WalletSession::start(&pool, user.id, &wallet, None, Some("test-agent")).await.unwrap();
        assert!(first.session_end.is_none());
        assert_eq!(first.ip_address.as_deref(), Some("10.0.0.1"));

        assert_eq!(WalletSession::end_open(&pool, user.id).await.unwrap(), 2);
        assert_eq!(WalletSession::end_open(&pool, user.id).await.unwrap(), 0);
    }
}
