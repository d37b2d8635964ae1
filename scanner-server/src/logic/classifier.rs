//! Input Classifier
//!
//! Guesses whether a raw string is a wallet, a token contract or a DApp URL.
//! Pure and synchronous. Pattern families are tried in a fixed order and the
//! first hit wins, so the order below is part of the contract.
//!
//! The result is a UX hint (tab pre-selection, submit gate). Nothing
//! downstream treats it as ground truth.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use super::rules::*;
use super::types::{InputType, ValidationResult};

// ============================================================================
// PATTERNS
// ============================================================================

static ETH_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("valid regex"));

static ETH_TOKEN_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[aAdD]").expect("valid regex"));

static BTC_LEGACY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^1[a-km-zA-HJ-NP-Z1-9]{25,34}$").expect("valid regex"));

static BTC_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^3[a-km-zA-HJ-NP-Z1-9]{25,34}$").expect("valid regex"));

static BTC_BECH32: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^bc1[a-z0-9]{39,59}$").expect("valid regex"));

static SOLANA_BASE58: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").expect("valid regex"));

static CARDANO_BECH32: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^addr1[a-z0-9]{50,}$").expect("valid regex"));

static ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").expect("valid regex"));

// ============================================================================
// MAIN CLASSIFICATION FUNCTION
// ============================================================================

/// Classify a raw input. Never fails: bad input yields an invalid result.
pub fn classify(input: &str) -> ValidationResult {
    let input = input.trim();

    if input.is_empty() {
        return ValidationResult::invalid(MSG_EMPTY);
    }

    if is_http_url(input) {
        return ValidationResult::valid(InputType::Dapp, URL_CONFIDENCE, MSG_DAPP);
    }

    if ETH_ADDRESS.is_match(input) {
        return classify_ethereum_address(input);
    }

    if is_bitcoin_address(input) {
        return ValidationResult::valid(InputType::Wallet, BITCOIN_CONFIDENCE, MSG_BITCOIN);
    }

    if let Some(result) = classify_other_chain(input) {
        return result;
    }

    if input.chars().count() > UNKNOWN_FORMAT_MIN_LEN && ALPHANUMERIC.is_match(input) {
        return ValidationResult::valid(
            InputType::Wallet,
            UNKNOWN_FORMAT_CONFIDENCE,
            MSG_UNKNOWN_FORMAT,
        );
    }

    ValidationResult::invalid(MSG_INVALID)
}

// ============================================================================
// PATTERN FAMILIES
// ============================================================================

fn is_http_url(input: &str) -> bool {
    Url::parse(input)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Wallet vs token for a well-formed hex address.
///
/// Known-weak heuristic: a `0xA`/`0xa`/`0xD`/`0xd` prefix means "token".
/// Kept as-is for compatibility with stored classifications.
fn classify_ethereum_address(address: &str) -> ValidationResult {
    if ETH_TOKEN_PREFIX.is_match(address) {
        ValidationResult::valid(InputType::Token, ETH_TOKEN_CONFIDENCE, MSG_ETH_TOKEN)
    } else {
        ValidationResult::valid(InputType::Wallet, ETH_WALLET_CONFIDENCE, MSG_ETH_WALLET)
    }
}

/// P2PKH, P2SH or bech32.
fn is_bitcoin_address(address: &str) -> bool {
    BTC_LEGACY.is_match(address) || BTC_SCRIPT.is_match(address) || BTC_BECH32.is_match(address)
}

fn classify_other_chain(address: &str) -> Option<ValidationResult> {
    if SOLANA_BASE58.is_match(address) {
        return Some(ValidationResult::valid(InputType::Wallet, SOLANA_CONFIDENCE, MSG_SOLANA));
    }

    if CARDANO_BECH32.is_match(address) {
        return Some(ValidationResult::valid(InputType::Wallet, CARDANO_CONFIDENCE, MSG_CARDANO));
    }

    None
}

// ============================================================================
// TESTS
// ============================================================================
