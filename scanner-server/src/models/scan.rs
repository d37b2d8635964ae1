//! Scan record model (`search_results`)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

use crate::logic::resolver::ScanStore;
use crate::logic::types::{InputType, RiskAssessment, ScanStatus, SearchSnippet};
use crate::AppResult;

/// Results per listing page
pub const RESULTS_PER_PAGE: i64 = 10;

/// Scans returned by the "latest" feed
pub const LATEST_LIMIT: i64 = 3;

/// Persisted scan. Column names are the wire format every reader relies on.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScanRecord {
    pub id: Uuid,
    pub input_type: InputType,
    pub input_value: String,
    pub result_summary: Option<String>,
    pub scan_time: DateTime<Utc>,
    pub google_snippets: Option<serde_json::Value>,
    pub is_flagged: Option<bool>,
    pub scan_status: Option<ScanStatus>,
    pub flagged_keywords: Option<Vec<String>>,
    pub risk_score: Option<i32>,
    pub submitted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload built by the resolver
#[derive(Debug, Clone)]
pub struct NewScan {
    pub input_type: InputType,
    pub input_value: String,
    pub submitted_by: Option<Uuid>,
    pub risk_score: i32,
    pub scan_status: ScanStatus,
    pub flagged_keywords: Vec<String>,
    pub is_flagged: bool,
    pub result_summary: String,
    pub search_snippets: Vec<SearchSnippet>,
}

impl NewScan {
    pub fn new(
        input_type: InputType,
        input_value: String,
        submitted_by: Option<Uuid>,
        assessment: RiskAssessment,
    ) -> Self {
        Self {
            input_type,
            input_value,
            submitted_by,
            risk_score: assessment.risk_score,
            scan_status: assessment.scan_status,
            flagged_keywords: assessment.flagged_keywords,
            is_flagged: assessment.is_flagged,
            result_summary: assessment.result_summary.to_string(),
            search_snippets: assessment.search_snippets,
        }
    }
}

/// Scan plus the submitter's public names, for listings
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ScanListItem {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub scan: ScanRecord,
    pub display_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ScanFilter {
    pub page: Option<i64>,
    pub search: Option<String>,
    pub status: Option<String>,
}

impl ScanFilter {
    /// 1-based page, clamped
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * RESULTS_PER_PAGE
    }

    /// `None` means no status filter ("all" or absent)
    pub fn status(&self) -> Result<Option<ScanStatus>, String> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => Ok(None),
            Some(s) => s.parse().map(Some),
        }
    }

    /// ILIKE pattern for the search term, wildcards escaped
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanPage {
    pub results: Vec<ScanListItem>,
    pub total_count: i64,
    pub page: i64,
    pub per_page: i64,
}

fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl ScanRecord {
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ScanRecord>("SELECT * FROM search_results WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_input(
        pool: &PgPool,
        input_type: InputType,
        input_value: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ScanRecord>(
            "SELECT * FROM search_results WHERE input_type = $1 AND input_value = $2"
        )
        .bind(input_type)
        .bind(input_value)
        .fetch_optional(pool)
        .await
    }

    /// Insert unless the key already exists. Returns the row and whether
    /// this call created it.
    pub async fn insert_or_get(pool: &PgPool, data: NewScan) -> Result<(Self, bool), sqlx::Error> {
        let inserted = sqlx::query_as::<_, ScanRecord>(
            r#"
            INSERT INTO search_results
                (input_type, input_value, result_summary, submitted_by, google_snippets,
                 is_flagged, scan_status, flagged_keywords, risk_score)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (input_type, input_value) DO NOTHING
            RETURNING *
            "#
        )
        .bind(data.input_type)
        .bind(&data.input_value)
        .bind(&data.result_summary)
        .bind(data.submitted_by)
        .bind(Json(&data.search_snippets))
        .bind(data.is_flagged)
        .bind(data.scan_status)
        .bind(&data.flagged_keywords)
        .bind(data.risk_score)
        .fetch_optional(pool)
        .await?;

        if let Some(record) = inserted {
            return Ok((record, true));
        }

        // Lost the race: another request inserted the same key first
        let existing = sqlx::query_as::<_, ScanRecord>(
            "SELECT * FROM search_results WHERE input_type = $1 AND input_value = $2"
        )
        .bind(data.input_type)
        .bind(&data.input_value)
        .fetch_one(pool)
        .await?;

        Ok((existing, false))
    }

    pub async fn list(pool: &PgPool, filter: &ScanFilter, status: Option<ScanStatus>) -> Result<ScanPage, sqlx::Error> {
        let pattern = filter.search_pattern();

        let results = sqlx::query_as::<_, ScanListItem>(
            r#"
            SELECT s.*, u.display_name, u.username
            FROM search_results s
            LEFT JOIN users u ON s.submitted_by = u.id
            WHERE ($1::text IS NULL OR s.input_value ILIKE $1)
              AND ($2::scan_status IS NULL OR s.scan_status = $2)
            ORDER BY s.created_at DESC
            LIMIT $3 OFFSET $4
            "#
        )
        .bind(&pattern)
        .bind(status)
        .bind(RESULTS_PER_PAGE)
        .bind(filter.offset())
        .fetch_all(pool)
        .await?;

        let total_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM search_results s
            WHERE ($1::text IS NULL OR s.input_value ILIKE $1)
              AND ($2::scan_status IS NULL OR s.scan_status = $2)
            "#
        )
        .bind(&pattern)
        .bind(status)
        .fetch_one(pool)
        .await?;

        Ok(ScanPage {
            results,
            total_count,
            page: filter.page(),
            per_page: RESULTS_PER_PAGE,
        })
    }

    pub async fn latest(pool: &PgPool) -> Result<Vec<ScanListItem>, sqlx::Error> {
        sqlx::query_as::<_, ScanListItem>(
            r#"
            SELECT s.*, u.display_name, u.username
            FROM search_results s
            LEFT JOIN users u ON s.submitted_by = u.id
            ORDER BY s.created_at DESC
            LIMIT $1
            "#
        )
        .bind(LATEST_LIMIT)
        .fetch_all(pool)
        .await
    }

    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<(ScanStatus, i64)>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT scan_status, COUNT(*) as count
            FROM search_results
            WHERE scan_status IS NOT NULL
            GROUP BY scan_status
            "#
        )
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|r| {
            (r.get::<ScanStatus, _>("scan_status"), r.get::<i64, _>("count"))
        }).collect())
    }

    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM search_results WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }
}

/// `ScanStore` backed by the `search_results` table
#[derive(Clone)]
pub struct PgScanStore {
    pool: PgPool,
}

impl PgScanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[axum::async_trait]
impl ScanStore for PgScanStore {
    async fn find_by_input(&self, input_type: InputType, input_value: &str) -> AppResult<Option<ScanRecord>> {
        Ok(ScanRecord::find_by_input(&self.pool, input_type, input_value).await?)
    }

    async fn insert_or_get(&self, scan: NewScan) -> AppResult<(ScanRecord, bool)> {
        Ok(ScanRecord::insert_or_get(&self.pool, scan).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use crate::logic::resolver::ScanResolver;
    use crate::logic::scoring::assess;
    use std::sync::Arc;

    #[test]
    fn test_filter_pagination() {
        let filter = ScanFilter::default();
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.offset(), 0);

        let filter = ScanFilter { page: Some(3), ..Default::default() };
        assert_eq!(filter.offset(), 20);

        let filter = ScanFilter { page: Some(-4), ..Default::default() };
        assert_eq!(filter.page(), 1);
    }

    #[test]
    fn test_filter_status() {
        let all = ScanFilter { status: Some("all".into()), ..Default::default() };
        assert_eq!(all.status(), Ok(None));

        let scam = ScanFilter { status: Some("scam".into()), ..Default::default() };
        assert_eq!(scam.status(), Ok(Some(ScanStatus::Scam)));

        let bad = ScanFilter { status: Some("evil".into()), ..Default::default() };
        assert!(bad.status().is_err());
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        let filter = ScanFilter { search: Some(" 100%_sure ".into()), ..Default::default() };
        assert_eq!(filter.search_pattern().as_deref(), Some("%100\\%\\_sure%"));

        let blank = ScanFilter { search: Some("   ".into()), ..Default::default() };
        assert_eq!(blank.search_pattern(), None);
    }

    #[tokio::test]
    async fn test_insert_or_get_conflict_returns_first_row() {
        let Some(pool) = test_pool().await else { return };
        let value = format!("0xLegit{}", Uuid::new_v4().simple());

        let first = NewScan::new(InputType::Wallet, value.clone(), None, assess(&value));
        let (record, created) = ScanRecord::insert_or_get(&pool, first).await.unwrap();
        assert!(created);
        assert_eq!(record.risk_score, Some(25));

        // A second insert for the same key with a different score keeps the first
        let mut second = NewScan::new(InputType::Wallet, value.clone(), None, assess("scam"));
        second.risk_score = 85;
        let (existing, created) = ScanRecord::insert_or_get(&pool, second).await.unwrap();
        assert!(!created);
        assert_eq!(existing.id, record.id);
        assert_eq!(existing.risk_score, Some(25));

        // Same value under another type is a separate key
        let token = NewScan::new(InputType::Token, value.clone(), None, assess(&value));
        let (other, created) = ScanRecord::insert_or_get(&pool, token).await.unwrap();
        assert!(created);
        assert_ne!(other.id, record.id);
    }

    #[tokio::test]
    async fn test_concurrent_resolves_share_one_row() {
        let Some(pool) = test_pool().await else { return };
        let resolver = ScanResolver::new(Arc::new(PgScanStore::new(pool.clone())));
        let value = Arc::new(format!("https://airdrop-{}.example", Uuid::new_v4().simple()));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let resolver = resolver.clone();
                let value = value.clone();
                tokio::spawn(async move { resolver.resolve(InputType::Dapp, &value, None).await })
            })
            .collect();

        let mut ids = Vec::new();
        let mut created = 0;
        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            if outcome.is_new_scan {
                created += 1;
            }
            ids.push(outcome.record.id);
        }

        assert_eq!(created, 1);
        assert!(ids.iter().all(|id| *id == ids[0]));

        let rows: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM search_results WHERE input_type = 'dapp' AND input_value = $1"
        )
        .bind(value.as_str())
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(rows, 1);
    }
}
