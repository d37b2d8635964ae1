//! Classification & Scoring Rules
//!
//! Confidence values, score thresholds and canned texts.
//! Constants only; scoring and classification read them.

// ============================================================================
// CLASSIFIER CONFIDENCES
// ============================================================================

pub const URL_CONFIDENCE: f32 = 0.95;
pub const ETH_WALLET_CONFIDENCE: f32 = 0.80;
/// `0xA` / `0xD` prefix heuristic. Has no on-chain basis.
pub const ETH_TOKEN_CONFIDENCE: f32 = 0.70;
pub const BITCOIN_CONFIDENCE: f32 = 0.90;
pub const SOLANA_CONFIDENCE: f32 = 0.75;
pub const CARDANO_CONFIDENCE: f32 = 0.90;
pub const UNKNOWN_FORMAT_CONFIDENCE: f32 = 0.30;

/// Fallback accepts alphanumeric strings strictly longer than this.
pub const UNKNOWN_FORMAT_MIN_LEN: usize = 10;

// ============================================================================
// CLASSIFIER MESSAGES
// ============================================================================

pub const MSG_EMPTY: &str = "Input cannot be empty";
pub const MSG_DAPP: &str = "Valid DApp URL detected";
pub const MSG_ETH_TOKEN: &str = "Likely token contract address";
pub const MSG_ETH_WALLET: &str = "Valid Ethereum wallet address";
pub const MSG_BITCOIN: &str = "Valid Bitcoin address detected";
pub const MSG_SOLANA: &str = "Possible Solana wallet address";
pub const MSG_CARDANO: &str = "Valid Cardano wallet address";
pub const MSG_UNKNOWN_FORMAT: &str = "Possible wallet address (unknown format)";
pub const MSG_INVALID: &str =
    "Invalid format - please enter a valid wallet address, token contract, or DApp URL";

// ============================================================================
// RISK SCORES
// ============================================================================

pub const BASE_RISK_SCORE: i32 = 25;
pub const SCAM_RISK_SCORE: i32 = 85;
pub const SUSPICIOUS_RISK_SCORE: i32 = 55;

/// Score at or above this = Scam
pub const SCAM_THRESHOLD: i32 = 80;
/// Score at or above this = Suspicious
pub const SUSPICIOUS_THRESHOLD: i32 = 50;

/// Values shorter than this are suspicious on their own. Counted in UTF-16
/// code units so stored scores keep matching earlier clients.
pub const MIN_TRUSTED_LEN: usize = 10;

/// Largest scan value, in bytes, the `(input_type, input_value)` index accepts
/// with room to spare.
pub const MAX_INPUT_BYTES: usize = 2048;

// ============================================================================
// KEYWORDS
// ============================================================================

/// Checked in order; every one that appears is recorded.
pub const SCAM_KEYWORDS: [&str; 2] = ["scam", "fake"];

pub const SUSPICIOUS_KEYWORD: &str = "test";

/// Recorded in `flagged_keywords` when the suspicious branch fires.
pub const SUSPICIOUS_MARKER: &str = "suspicious";

// ============================================================================
// SUMMARIES
// ============================================================================

pub const SUMMARY_SCAM: &str =
    "HIGH RISK: Multiple indicators suggest this may be a scam. Do not interact.";
pub const SUMMARY_SUSPICIOUS: &str =
    "CAUTION: Some suspicious patterns detected. Proceed with extreme caution.";
pub const SUMMARY_SAFE: &str =
    "Analysis shows no major red flags, but always verify independently.";

pub const SNIPPET_WARNING: &str =
    "Multiple users have reported this address as suspicious. Exercise extreme caution.";
pub const SNIPPET_NEUTRAL: &str = "No major red flags found in community reports.";
pub const SNIPPET_URL_BASE: &str = "https://example.com/analysis/";
