//! Community post handlers

use axum::{extract::{State, Path}, Json};
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, AppResult, AppError};
use crate::models::{CreatePostContent, LikeToggle, Post, PostComment, PostCommentWithAuthor, PostWithAuthor};
use crate::middleware::auth::UserContext;

/// Trimmed, non-empty, bounded body
fn content_of(req: &CreatePostContent) -> AppResult<&str> {
    req.validate()?;
    let content = req.content.trim();
    if content.is_empty() {
        return Err(AppError::ValidationError("Content cannot be empty".to_string()));
    }
    Ok(content)
}

async fn ensure_post(state: &AppState, post_id: Uuid) -> AppResult<()> {
    if !Post::exists(&state.pool, post_id).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }
    Ok(())
}

pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PostWithAuthor>>> {
    Ok(Json(Post::list(&state.pool).await?))
}

pub async fn create(
    State(state): State<AppState>,
    user: UserContext,
    Json(req): Json<CreatePostContent>,
) -> AppResult<Json<Post>> {
    let content = content_of(&req)?;
    let post = Post::create(&state.pool, user.user_id, content).await?;

    tracing::info!("Post {} created by {}", post.id, user.user_id);

    Ok(Json(post))
}

/// Like / unlike
pub async fn toggle_like(
    State(state): State<AppState>,
    user: UserContext,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<LikeToggle>> {
    ensure_post(&state, post_id).await?;
    Ok(Json(Post::toggle_like(&state.pool, post_id, user.user_id).await?))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<Vec<PostCommentWithAuthor>>> {
    Ok(Json(PostComment::list_by_post(&state.pool, post_id).await?))
}

pub async fn create_comment(
    State(state): State<AppState>,
    user: UserContext,
    Path(post_id): Path<Uuid>,
    Json(req): Json<CreatePostContent>,
) -> AppResult<Json<PostComment>> {
    let content = content_of(&req)?;
    ensure_post(&state, post_id).await?;

    let comment = PostComment::create(&state.pool, post_id, user.user_id, content).await?;
    Ok(Json(comment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_is_trimmed_and_required() {
        let req = CreatePostContent { content: "  hello  ".into() };
        assert_eq!(content_of(&req).unwrap(), "hello");

        let blank = CreatePostContent { content: " \n ".into() };
        assert!(matches!(content_of(&blank), Err(AppError::ValidationError(_))));
    }
}
