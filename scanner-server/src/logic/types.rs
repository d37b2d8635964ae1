//! Scanner Types
//!
//! Core types shared by the classifier, the scoring rules and the resolver.
//! Data structures and their wire/storage names.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// INPUT TYPE
// ============================================================================

/// What the user asked us to scan.
///
/// Stored as the Postgres enum `input_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "input_type", rename_all = "lowercase")]
pub enum InputType {
    Wallet,
    Token,
    Dapp,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wallet => "wallet",
            Self::Token => "token",
            Self::Dapp => "dapp",
        }
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wallet" => Ok(Self::Wallet),
            "token" => Ok(Self::Token),
            "dapp" => Ok(Self::Dapp),
            other => Err(format!("Unknown input type '{}'", other)),
        }
    }
}

// ============================================================================
// SCAN STATUS
// ============================================================================

/// Verdict stored on a scan record. Set once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "scan_status", rename_all = "lowercase")]
pub enum ScanStatus {
    Safe,
    Suspicious,
    Scam,
    /// Never produced by the scorer; kept so older rows still decode.
    Pending,
}

impl ScanStatus {
    pub const ALL: [ScanStatus; 4] = [Self::Safe, Self::Suspicious, Self::Scam, Self::Pending];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Suspicious => "suspicious",
            Self::Scam => "scam",
            Self::Pending => "pending",
        }
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown scan status '{}'", s))
    }
}

// ============================================================================
// VOTE TYPE
// ============================================================================

/// Community opinion on a scan. Kept apart from `ScanStatus` on purpose:
/// votes never rewrite the stored verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "vote_type", rename_all = "lowercase")]
pub enum VoteType {
    Safe,
    Scam,
    Unsure,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Scam => "scam",
            Self::Unsure => "unsure",
        }
    }
}

// ============================================================================
// CLASSIFIER OUTPUT
// ============================================================================

/// Best-guess category for a raw input. Advisory only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(rename = "type")]
    pub input_type: Option<InputType>,
    pub confidence: f32,
    pub message: String,
}

impl ValidationResult {
    pub fn valid(input_type: InputType, confidence: f32, message: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            input_type: Some(input_type),
            confidence,
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            input_type: None,
            confidence: 0.0,
            message: message.into(),
        }
    }
}

// ============================================================================
// SCORING OUTPUT
// ============================================================================

/// Simulated search hit persisted alongside a scan (`google_snippets`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSnippet {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

/// Everything the scorer decides about a new input.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub risk_score: i32,
    pub scan_status: ScanStatus,
    pub flagged_keywords: Vec<String>,
    pub is_flagged: bool,
    pub result_summary: &'static str,
    pub search_snippets: Vec<SearchSnippet>,
}
