//! Scan comment model (append-only)

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub scan_id: Uuid,
    pub user_id: Uuid,
    pub comment_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment with its author's public identity
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub comment: Comment,
    pub wallet_address: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    #[validate(length(max = 2000))]
    pub comment_text: String,
}

impl Comment {
    pub async fn create(
        pool: &PgPool,
        scan_id: Uuid,
        user_id: Uuid,
        comment_text: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (scan_id, user_id, comment_text)
            VALUES ($1, $2, $3)
            RETURNING *
            "#
        )
        .bind(scan_id)
        .bind(user_id)
        .bind(comment_text)
        .fetch_one(pool)
        .await
    }

    pub async fn list_by_scan(pool: &PgPool, scan_id: Uuid) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT c.*, u.wallet_address, u.display_name
            FROM comments c
            JOIN users u ON c.user_id = u.id
            WHERE c.scan_id = $1
            ORDER BY c.created_at DESC
            "#
        )
        .bind(scan_id)
        .fetch_all(pool)
        .await
    }
}
