//! Analytics handlers

use axum::{extract::State, Json};
use serde::Serialize;
use sqlx::Row;

use crate::{AppState, AppResult};
use crate::logic::types::ScanStatus;
use crate::models::ScanRecord;

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct StatusBreakdown {
    pub safe: i64,
    pub suspicious: i64,
    pub scam: i64,
    pub pending: i64,
}

impl StatusBreakdown {
    fn from_counts(counts: &[(ScanStatus, i64)]) -> Self {
        let mut breakdown = Self::default();
        for (status, count) in counts {
            match status {
                ScanStatus::Safe => breakdown.safe = *count,
                ScanStatus::Suspicious => breakdown.suspicious = *count,
                ScanStatus::Scam => breakdown.scam = *count,
                ScanStatus::Pending => breakdown.pending = *count,
            }
        }
        breakdown
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsOverview {
    pub total_scans: i64,
    pub scans_last_24h: i64,
    pub flagged_scans: i64,
    pub by_status: StatusBreakdown,
    pub total_users: i64,
    pub total_votes: i64,
    pub total_comments: i64,
    pub total_posts: i64,
}

/// Aggregate counts for the analytics page
pub async fn overview(
    State(state): State<AppState>,
) -> AppResult<Json<AnalyticsOverview>> {
    let row = sqlx::query(
        r#"
        SELECT
            COUNT(*) as total,
            COUNT(*) FILTER (WHERE created_at > NOW() - INTERVAL '24 hours') as recent,
            COUNT(*) FILTER (WHERE is_flagged) as flagged
        FROM search_results
        "#
    )
    .fetch_one(&state.pool)
    .await?;

    let total_scans: i64 = row.get("total");
    let scans_last_24h: i64 = row.get("recent");
    let flagged_scans: i64 = row.get("flagged");

    let status_counts = ScanRecord::count_by_status(&state.pool).await?;

    let community = sqlx::query(
        r#"
        SELECT
            (SELECT COUNT(*) FROM users) as users,
            (SELECT COUNT(*) FROM votes) as votes,
            (SELECT COUNT(*) FROM comments) as comments,
            (SELECT COUNT(*) FROM posts) as posts
        "#
    )
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(AnalyticsOverview {
        total_scans,
        scans_last_24h,
        flagged_scans,
        by_status: StatusBreakdown::from_counts(&status_counts),
        total_users: community.get("users"),
        total_votes: community.get("votes"),
        total_comments: community.get("comments"),
        total_posts: community.get("posts"),
    }))
}
