//! Scan Resolver
//!
//! One canonical record per `(input_type, input_value)`. A key that was
//! scanned before is returned untouched: the first score is permanent.
//! New keys are scored and inserted through `ScanStore::insert_or_get`,
//! which must be atomic per key so concurrent submissions converge on a
//! single row.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::rules::MAX_INPUT_BYTES;
use super::scoring::assess;
use super::types::InputType;
use crate::models::{NewScan, ScanRecord};
use crate::{AppError, AppResult};

/// Persistence seam for the resolver
#[axum::async_trait]
pub trait ScanStore: Send + Sync {
    /// Exact, case-sensitive lookup
    async fn find_by_input(&self, input_type: InputType, input_value: &str) -> AppResult<Option<ScanRecord>>;

    /// Insert, or return the row that already holds this key.
    /// The flag is `true` only when this call created the row.
    async fn insert_or_get(&self, scan: NewScan) -> AppResult<(ScanRecord, bool)>;
}

/// Resolver result, shaped for the scan endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutcome {
    #[serde(rename = "scanResult")]
    pub record: ScanRecord,
    pub is_new_scan: bool,
}

#[derive(Clone)]
pub struct ScanResolver {
    store: Arc<dyn ScanStore>,
}

impl ScanResolver {
    pub fn new(store: Arc<dyn ScanStore>) -> Self {
        Self { store }
    }

    /// Return the canonical scan for this input, creating it if needed.
    ///
    /// `input_value` is expected trimmed; it is matched byte-for-byte.
    /// Values over `MAX_INPUT_BYTES` are rejected before touching the store.
    pub async fn resolve(
        &self,
        input_type: InputType,
        input_value: &str,
        submitted_by: Option<Uuid>,
    ) -> AppResult<ScanOutcome> {
        if input_value.len() > MAX_INPUT_BYTES {
            return Err(AppError::ValidationError(format!(
                "Input value exceeds {} bytes",
                MAX_INPUT_BYTES
            )));
        }

        if let Some(record) = self.store.find_by_input(input_type, input_value).await? {
            tracing::debug!("Scan cache hit: {} {}", input_type, record.id);
            return Ok(ScanOutcome { record, is_new_scan: false });
        }

        let assessment = assess(input_value);
        tracing::debug!(
            "Scoring new {} input: score={} status={}",
            input_type, assessment.risk_score, assessment.scan_status
        );

        let scan = NewScan::new(input_type, input_value.to_string(), submitted_by, assessment);
        let (record, created) = self.store.insert_or_get(scan).await?;

        if created {
            tracing::info!(
                "New scan {} ({}): {:?}",
                record.id, input_type, record.scan_status
            );
        } else {
            tracing::debug!("Concurrent insert for {} resolved to {}", input_type, record.id);
        }

        Ok(ScanOutcome { record, is_new_scan: created })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::logic::types::ScanStatus;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory store with the same per-key atomicity as the table's
    /// unique constraint.
    #[derive(Default)]
    pub(crate) struct MemoryScanStore {
        rows: Mutex<HashMap<(InputType, String), ScanRecord>>,
        pub inserts: AtomicUsize,
        pub fail: bool,
    }

    impl MemoryScanStore {
        pub fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    #[axum::async_trait]
    impl ScanStore for MemoryScanStore {
        async fn find_by_input(&self, input_type: InputType, input_value: &str) -> AppResult<Option<ScanRecord>> {
            if self.fail {
                return Err(AppError::DatabaseError("connection refused".to_string()));
            }
            // Yield so concurrent callers interleave between lookup and insert
            tokio::task::yield_now().await;
            let rows = self.rows.lock().unwrap();
            Ok(rows.get(&(input_type, input_value.to_string())).cloned())
        }

        async fn insert_or_get(&self, scan: NewScan) -> AppResult<(ScanRecord, bool)> {
            tokio::task::yield_now().await;
            let mut rows = self.rows.lock().unwrap();
            let key = (scan.input_type, scan.input_value.clone());
            if let Some(existing) = rows.get(&key) {
                return Ok((existing.clone(), false));
            }

            let now = Utc::now();
            let record = ScanRecord {
                id: Uuid::new_v4(),
                input_type: scan.input_type,
                input_value: scan.input_value,
                result_summary: Some(scan.result_summary),
                scan_time: now,
                google_snippets: serde_json::to_value(&scan.search_snippets).ok(),
                is_flagged: Some(scan.is_flagged),
                scan_status: Some(scan.scan_status),
                flagged_keywords: Some(scan.flagged_keywords),
                risk_score: Some(scan.risk_score),
                submitted_by: scan.submitted_by,
                created_at: now,
                updated_at: now,
            };
            rows.insert(key, record.clone());
            self.inserts.fetch_add(1, Ordering::SeqCst);
            Ok((record, true))
        }
    }

    fn resolver() -> (ScanResolver, Arc<MemoryScanStore>) {
        let store = Arc::new(MemoryScanStore::default());
        (ScanResolver::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_scores_new_inputs() {
        let (resolver, _) = resolver();

        let scam = resolver.resolve(InputType::Wallet, "this-is-a-scam-address", None).await.unwrap();
        assert!(scam.is_new_scan);
        assert_eq!(scam.record.risk_score, Some(85));
        assert_eq!(scam.record.scan_status, Some(ScanStatus::Scam));

        let short = resolver.resolve(InputType::Wallet, "short", None).await.unwrap();
        assert_eq!(short.record.risk_score, Some(55));
        assert_eq!(short.record.scan_status, Some(ScanStatus::Suspicious));

        let safe = resolver.resolve(InputType::Wallet, "0xLegitLongAddressValue", None).await.unwrap();
        assert_eq!(safe.record.risk_score, Some(25));
        assert_eq!(safe.record.scan_status, Some(ScanStatus::Safe));
        assert_eq!(safe.record.flagged_keywords, Some(vec![]));
    }

    #[tokio::test]
    async fn test_repeat_lookup_returns_same_record() {
        let (resolver, store) = resolver();
        let user = Some(Uuid::new_v4());

        let first = resolver.resolve(InputType::Token, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", user).await.unwrap();
        let second = resolver.resolve(InputType::Token, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", None).await.unwrap();

        assert!(first.is_new_scan);
        assert!(!second.is_new_scan);
        assert_eq!(first.record.id, second.record.id);
        assert_eq!(second.record.submitted_by, user);
        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_key_includes_input_type_and_case() {
        let (resolver, store) = resolver();

        let wallet = resolver.resolve(InputType::Wallet, "SameValueHere1", None).await.unwrap();
        let token = resolver.resolve(InputType::Token, "SameValueHere1", None).await.unwrap();
        let lower = resolver.resolve(InputType::Wallet, "samevaluehere1", None).await.unwrap();

        assert_ne!(wallet.record.id, token.record.id);
        assert_ne!(wallet.record.id, lower.record.id);
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_resolves_create_one_record() {
        let (resolver, store) = resolver();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let resolver = resolver.clone();
                tokio::spawn(async move {
                    resolver.resolve(InputType::Dapp, "https://claim-airdrop.example", None).await
                })
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
        assert_eq!(store.len(), 1);
        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = Arc::new(MemoryScanStore { fail: true, ..Default::default() });
        let resolver = ScanResolver::new(store.clone());

        let result = resolver.resolve(InputType::Wallet, "0xLegitLongAddressValue", None).await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_oversized_value_is_rejected_by_bytes() {
        let (resolver, store) = resolver();

        // 683 three-byte characters: short in chars, over the byte cap
        let cjk = "\u{5B89}".repeat(683);
        assert!(cjk.chars().count() < MAX_INPUT_BYTES);
        let result = resolver.resolve(InputType::Wallet, &cjk, None).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert_eq!(store.len(), 0);

        let at_cap = "a".repeat(MAX_INPUT_BYTES);
        assert!(resolver.resolve(InputType::Wallet, &at_cap, None).await.unwrap().is_new_scan);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_outcome_wire_shape() {
        let (resolver, _) = resolver();
        let outcome = tokio_test::block_on(resolver.resolve(InputType::Wallet, "short", None)).unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["isNewScan"], true);
        assert_eq!(json["scanResult"]["input_type"], "wallet");
        assert_eq!(json["scanResult"]["scan_status"], "suspicious");
        assert_eq!(json["scanResult"]["flagged_keywords"][0], "suspicious");
    }
}
