//! Community handlers: votes and comments on scans
//!
//! None of these touch a scan's score or status.

use axum::{extract::{State, Path}, Json};
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, AppResult, AppError};
use crate::models::{CastVote, Comment, CommentWithAuthor, CreateComment, ScanRecord, Vote, VoteTally};
use crate::middleware::auth::UserContext;

async fn ensure_scan(state: &AppState, scan_id: Uuid) -> AppResult<()> {
    if !ScanRecord::exists(&state.pool, scan_id).await? {
        return Err(AppError::NotFound("Scan not found".to_string()));
    }
    Ok(())
}

/// Cast or replace the caller's vote
pub async fn vote(
    State(state): State<AppState>,
    user: UserContext,
    Path(scan_id): Path<Uuid>,
    Json(req): Json<CastVote>,
) -> AppResult<Json<Vote>> {
    ensure_scan(&state, scan_id).await?;

    let vote = Vote::upsert(&state.pool, scan_id, user.user_id, req.vote_type).await?;

    tracing::debug!("Vote {} on scan {} by {}", req.vote_type.as_str(), scan_id, user.user_id);

    Ok(Json(vote))
}

/// Vote counts for a scan
pub async fn tally(
    State(state): State<AppState>,
    Path(scan_id): Path<Uuid>,
) -> AppResult<Json<VoteTally>> {
    ensure_scan(&state, scan_id).await?;
    Ok(Json(Vote::tally(&state.pool, scan_id).await?))
}

/// Comments for a scan, newest first
pub async fn list_comments(
    State(state): State<AppState>,
    Path(scan_id): Path<Uuid>,
) -> AppResult<Json<Vec<CommentWithAuthor>>> {
    Ok(Json(Comment::list_by_scan(&state.pool, scan_id).await?))
}

/// Append a comment
pub async fn create_comment(
    State(state): State<AppState>,
    user: UserContext,
    Path(scan_id): Path<Uuid>,
    Json(req): Json<CreateComment>,
) -> AppResult<Json<Comment>> {
    req.validate()?;
    let text = req.comment_text.trim();
    if text.is_empty() {
        return Err(AppError::ValidationError("Comment cannot be empty".to_string()));
    }

    ensure_scan(&state, scan_id).await?;

    let comment = Comment::create(&state.pool, scan_id, user.user_id, text).await?;
    Ok(Json(comment))
}
