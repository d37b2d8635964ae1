//! Scan Scoring
//!
//! Assigns a risk score to an input that has never been scanned before.
//! Keyword checks run against the input string itself; the "search" step is
//! simulated and only shapes the snippet list stored with the record.

use super::rules::*;
use super::types::{RiskAssessment, ScanStatus, SearchSnippet};

/// Score a raw input value.
///
/// Branches are exclusive and checked in order:
/// scam keywords, then "test"/short input, then the base score.
pub fn assess(input_value: &str) -> RiskAssessment {
    let lowered = input_value.to_lowercase();

    let mut risk_score = BASE_RISK_SCORE;
    let mut flagged_keywords = Vec::new();
    let mut is_flagged = false;

    let scam_hits: Vec<&str> = SCAM_KEYWORDS
        .iter()
        .copied()
        .filter(|keyword| lowered.contains(*keyword))
        .collect();

    if !scam_hits.is_empty() {
        flagged_keywords.extend(scam_hits.into_iter().map(str::to_string));
        is_flagged = true;
        risk_score = SCAM_RISK_SCORE;
    } else if lowered.contains(SUSPICIOUS_KEYWORD) || input_value.encode_utf16().count() < MIN_TRUSTED_LEN {
        flagged_keywords.push(SUSPICIOUS_MARKER.to_string());
        risk_score = SUSPICIOUS_RISK_SCORE;
    }

    let scan_status = status_for_score(risk_score);

    RiskAssessment {
        risk_score,
        scan_status,
        flagged_keywords,
        is_flagged,
        result_summary: summary_for(scan_status),
        search_snippets: simulated_snippets(input_value, &lowered),
    }
}

/// Map a 0-100 score onto a stored verdict.
pub fn status_for_score(risk_score: i32) -> ScanStatus {
    if risk_score >= SCAM_THRESHOLD {
        ScanStatus::Scam
    } else if risk_score >= SUSPICIOUS_THRESHOLD {
        ScanStatus::Suspicious
    } else {
        ScanStatus::Safe
    }
}

/// Canned summary for a verdict.
pub fn summary_for(status: ScanStatus) -> &'static str {
    match status {
        ScanStatus::Scam => SUMMARY_SCAM,
        ScanStatus::Suspicious => SUMMARY_SUSPICIOUS,
        ScanStatus::Safe | ScanStatus::Pending => SUMMARY_SAFE,
    }
}

fn simulated_snippets(input_value: &str, lowered: &str) -> Vec<SearchSnippet> {
    let snippet = if lowered.contains("scam") {
        SNIPPET_WARNING
    } else {
        SNIPPET_NEUTRAL
    };

    vec![SearchSnippet {
        title: format!("Analysis of {}", input_value),
        snippet: snippet.to_string(),
        url: format!("{}{}", SNIPPET_URL_BASE, input_value),
    }]
}
