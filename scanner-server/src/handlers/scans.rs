//! Scan handlers

use axum::{extract::{State, Path, Query}, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, AppResult, AppError};
use crate::logic::classifier::classify;
use crate::logic::resolver::ScanOutcome;
use crate::logic::types::{InputType, ValidationResult};
use crate::models::{ScanFilter, ScanListItem, ScanPage, ScanRecord};
use crate::middleware::auth::UserContext;

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub input: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub input_type: InputType,
    /// Byte length is capped by the resolver
    pub input_value: String,
}

/// Classify an input as the user types
pub async fn validate(
    Json(req): Json<ValidateRequest>,
) -> Json<ValidationResult> {
    Json(classify(&req.input))
}

/// Resolve a scan: cached record or a freshly scored one
pub async fn create(
    State(state): State<AppState>,
    user: UserContext,
    Json(mut req): Json<ScanRequest>,
) -> AppResult<Json<ScanOutcome>> {
    req.input_value = req.input_value.trim().to_string();
    if req.input_value.is_empty() {
        return Err(AppError::ValidationError("Missing required fields".to_string()));
    }
    let outcome = state
        .resolver
        .resolve(req.input_type, &req.input_value, Some(user.user_id))
        .await?;

    Ok(Json(outcome))
}

/// Paged, filterable scan listing
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ScanFilter>,
) -> AppResult<Json<ScanPage>> {
    let status = filter.status().map_err(AppError::ValidationError)?;
    let page = ScanRecord::list(&state.pool, &filter, status).await?;
    Ok(Json(page))
}

/// Newest scans for the landing feed
pub async fn latest(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ScanListItem>>> {
    Ok(Json(ScanRecord::latest(&state.pool).await?))
}

/// Get single scan
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ScanRecord>> {
    let scan = ScanRecord::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Scan not found".to_string()))?;

    Ok(Json(scan))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_request_parsing() {
        let req: ScanRequest =
            serde_json::from_str(r#"{"inputType":"token","inputValue":" 0xabc "}"#).unwrap();
        assert_eq!(req.input_type, InputType::Token);
        assert_eq!(req.input_value, " 0xabc ");

        assert!(serde_json::from_str::<ScanRequest>(r#"{"inputType":"nft","inputValue":"x"}"#).is_err());
    }
}
