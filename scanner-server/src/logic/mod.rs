//! Scanner Logic
//!
//! Pure decision code, no HTTP and no SQL.
//!
//! ## Structure
//! - `types`: InputType, ScanStatus, VoteType, ValidationResult, RiskAssessment
//! - `rules`: confidences, thresholds, keywords and canned texts
//! - `classifier`: guesses the category of a raw input (advisory only)
//! - `scoring`: risk score / status / summary for a new input
//! - `resolver`: one canonical scan per input, behind the `ScanStore` seam

pub mod types;
pub mod rules;
pub mod classifier;
pub mod scoring;
pub mod resolver;
