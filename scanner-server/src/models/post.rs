//! Community post model

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub is_pinned: bool,
    pub likes_count: i32,
    pub comments_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PostComment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Author columns joined onto posts and post comments
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Author {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PostWithAuthor {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub post: Post,
    #[sqlx(flatten)]
    pub author: Author,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PostCommentWithAuthor {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub comment: PostComment,
    #[sqlx(flatten)]
    pub author: Author,
}

/// Body for both new posts and new post comments, at most 5000 characters
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostContent {
    #[validate(length(max = 5000))]
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggle {
    pub liked: bool,
    pub likes_count: i32,
}

impl Post {
    pub async fn create(pool: &PgPool, user_id: Uuid, content: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (user_id, content)
            VALUES ($1, $2)
            RETURNING *
            "#
        )
        .bind(user_id)
        .bind(content)
        .fetch_one(pool)
        .await
    }

    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Pinned first, then newest
    pub async fn list(pool: &PgPool) -> Result<Vec<PostWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, PostWithAuthor>(
            r#"
            SELECT p.*, u.username, u.display_name, u.avatar_url
            FROM posts p
            JOIN users u ON p.user_id = u.id
            ORDER BY p.is_pinned DESC, p.created_at DESC
            "#
        )
        .fetch_all(pool)
        .await
    }

    /// Like if not liked yet, unlike otherwise. The counter moves in the
    /// same transaction as the like row.
    pub async fn toggle_like(pool: &PgPool, post_id: Uuid, user_id: Uuid) -> Result<LikeToggle, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let liked = removed == 0;
        let mut delta: i32 = if liked { 0 } else { -1 };
        if liked {
            let inserted = sqlx::query(
                "INSERT INTO post_likes (post_id, user_id) VALUES ($1, $2) ON CONFLICT (post_id, user_id) DO NOTHING"
            )
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            // Zero when a parallel request already liked it
            if inserted == 1 {
                delta = 1;
            }
        }

        let likes_count: i32 = sqlx::query_scalar(
            r#"
            UPDATE posts
            SET likes_count = GREATEST(likes_count + $2, 0), updated_at = NOW()
            WHERE id = $1
            RETURNING likes_count
            "#
        )
        .bind(post_id)
        .bind(delta)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(LikeToggle { liked, likes_count })
    }
}

impl PostComment {
    pub async fn create(pool: &PgPool, post_id: Uuid, user_id: Uuid, content: &str) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let comment = sqlx::query_as::<_, PostComment>(
            r#"
            INSERT INTO post_comments (post_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING *
            "#
        )
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE posts SET comments_count = comments_count + 1, updated_at = NOW() WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(comment)
    }

    pub async fn list_by_post(pool: &PgPool, post_id: Uuid) -> Result<Vec<PostCommentWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, PostCommentWithAuthor>(
            r#"
            SELECT c.*, u.username, u.display_name, u.avatar_url
            FROM post_comments c
            JOIN users u ON c.user_id = u.id
            WHERE c.post_id = $1
            ORDER BY c.created_at DESC
            "#
        )
        .bind(post_id)
        .fetch_all(pool)
        .await
    }
}
