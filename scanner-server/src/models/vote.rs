//! Vote model

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::logic::types::VoteType;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Vote {
    pub id: Uuid,
    pub scan_id: Uuid,
    pub user_id: Uuid,
    pub vote_type: VoteType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVote {
    pub vote_type: VoteType,
}

/// Per-scan vote counts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VoteTally {
    pub safe: i64,
    pub scam: i64,
    pub unsure: i64,
    pub total: i64,
}

impl VoteTally {
    pub fn from_counts(counts: impl IntoIterator<Item = (VoteType, i64)>) -> Self {
        let mut tally = Self::default();
        for (vote_type, count) in counts {
            match vote_type {
                VoteType::Safe => tally.safe += count,
                VoteType::Scam => tally.scam += count,
                VoteType::Unsure => tally.unsure += count,
            }
            tally.total += count;
        }
        tally
    }
}

impl Vote {
    /// One vote per user per scan; a second call replaces the first.
    pub async fn upsert(
        pool: &PgPool,
        scan_id: Uuid,
        user_id: Uuid,
        vote_type: VoteType,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Vote>(
            r#"
            INSERT INTO votes (scan_id, user_id, vote_type)
            VALUES ($1, $2, $3)
            ON CONFLICT (scan_id, user_id) DO UPDATE SET
                vote_type = EXCLUDED.vote_type,
                updated_at = NOW()
            RETURNING *
            "#
        )
        .bind(scan_id)
        .bind(user_id)
        .bind(vote_type)
        .fetch_one(pool)
        .await
    }

    pub async fn tally(pool: &PgPool, scan_id: Uuid) -> Result<VoteTally, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT vote_type, COUNT(*) as count
            FROM votes
            WHERE scan_id = $1
            GROUP BY vote_type
            "#
        )
        .bind(scan_id)
        .fetch_all(pool)
        .await?;

        Ok(VoteTally::from_counts(rows.into_iter().map(|r| {
            (r.get::<VoteType, _>("vote_type"), r.get::<i64, _>("count"))
        })))
    }
}
