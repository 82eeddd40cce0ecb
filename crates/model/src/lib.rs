//! Core domain model for PetClause listing compliance analysis.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `ListingText`: The validated, trimmed listing copy submitted by a user
//! - `Jurisdiction`: A city/locale identifier selecting ordinance text
//! - `Ordinance`: Reference legal text for a jurisdiction
//! - `AnalysisResult`: The structured compliance verdict

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Placeholder rewrite used when the engine produced nothing usable.
pub const UNAVAILABLE_PLACEHOLDER: &str =
    "Analysis unavailable. The compliance engine did not return a usable rewrite; please try again.";

/// Errors raised while validating caller input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Listing text is empty")]
    EmptyInput,
    #[error("Jurisdiction is empty")]
    EmptyJurisdiction,
}

/// Listing advertisement copy, trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ListingText(String);

impl ListingText {
    /// Validate raw user input. Blank or whitespace-only text is rejected.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyInput);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ListingText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A city or locale identifier.
///
/// The display name keeps the caller's spelling (trimmed); `key()` is the
/// normalized form used for table lookups, so "san  francisco" and
/// "San Francisco" select the same ordinance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Jurisdiction(String);

impl Jurisdiction {
    pub fn new(name: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyJurisdiction);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Name as supplied by the caller.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Normalized lookup key: lowercase, single-spaced.
    pub fn key(&self) -> String {
        self.0
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl PartialEq for Jurisdiction {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Jurisdiction {}

impl std::hash::Hash for Jurisdiction {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Jurisdiction-scoped reference text (statute excerpts, summaries).
///
/// Immutable once retrieved from an ordinance source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordinance {
    jurisdiction: Jurisdiction,
    text: String,
}

impl Ordinance {
    pub fn new(jurisdiction: Jurisdiction, text: impl Into<String>) -> Self {
        Self {
            jurisdiction,
            text: text.into(),
        }
    }

    pub fn jurisdiction(&self) -> &Jurisdiction {
        &self.jurisdiction
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// The analyzer's structured verdict for one listing.
///
/// Fields are private so a result cannot be altered after creation and the
/// confidence is always within `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AnalysisResultWire")]
pub struct AnalysisResult {
    confidence: u8,
    risky_phrases: Vec<String>,
    fixed_listing: String,
    citations: Vec<String>,
}

/// Deserialization shape; confidence is clamped on the way in.
#[derive(Deserialize)]
struct AnalysisResultWire {
    #[serde(default)]
    confidence: i64,
    #[serde(default)]
    risky_phrases: Vec<String>,
    #[serde(default)]
    fixed_listing: String,
    #[serde(default)]
    citations: Vec<String>,
}

impl From<AnalysisResultWire> for AnalysisResult {
    fn from(wire: AnalysisResultWire) -> Self {
        Self::new(
            wire.confidence,
            wire.risky_phrases,
            wire.fixed_listing,
            wire.citations,
        )
    }
}

impl AnalysisResult {
    /// Build a result, clamping `confidence` into `[0, 100]`.
    pub fn new(
        confidence: i64,
        risky_phrases: Vec<String>,
        fixed_listing: impl Into<String>,
        citations: Vec<String>,
    ) -> Self {
        Self {
            confidence: confidence.clamp(0, 100) as u8,
            risky_phrases,
            fixed_listing: fixed_listing.into(),
            citations,
        }
    }

    /// The degraded-but-valid result returned when engine output is unusable.
    pub fn unavailable() -> Self {
        Self::new(0, Vec::new(), UNAVAILABLE_PLACEHOLDER, Vec::new())
    }

    pub fn confidence(&self) -> u8 {
        self.confidence
    }

    pub fn risky_phrases(&self) -> &[String] {
        &self.risky_phrases
    }

    pub fn fixed_listing(&self) -> &str {
        &self.fixed_listing
    }

    pub fn citations(&self) -> &[String] {
        &self.citations
    }

    pub fn risk_count(&self) -> usize {
        self.risky_phrases.len()
    }

    /// Zero confidence with nothing flagged is a failure state, not a
    /// clean bill of health.
    pub fn is_degraded(&self) -> bool {
        self.confidence == 0 && self.risky_phrases.is_empty()
    }

    /// The analyzer asserted the listing is compliant.
    pub fn is_compliant(&self) -> bool {
        self.risky_phrases.is_empty() && !self.is_degraded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_listing_rejects_blank() {
        assert_eq!(ListingText::new(""), Err(ValidationError::EmptyInput));
        assert_eq!(ListingText::new("  \n\t "), Err(ValidationError::EmptyInput));
    }

    #[test]
    fn test_listing_trims() {
        let listing = ListingText::new("  Pets welcome.\n").unwrap();
        assert_eq!(listing.as_str(), "Pets welcome.");
    }

    #[test]
    fn test_jurisdiction_key_normalizes() {
        let a = Jurisdiction::new("  San   Francisco ").unwrap();
        let b = Jurisdiction::new("san francisco").unwrap();
        assert_eq!(a.key(), "san francisco");
        assert_eq!(a.name(), "San   Francisco");
        assert_eq!(a, b);
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(AnalysisResult::new(250, vec![], "", vec![]).confidence(), 100);
        assert_eq!(AnalysisResult::new(-4, vec![], "", vec![]).confidence(), 0);
    }

    #[test]
    fn test_degraded_is_not_compliant() {
        let result = AnalysisResult::unavailable();
        assert!(result.is_degraded());
        assert!(!result.is_compliant());
        assert_eq!(result.fixed_listing(), UNAVAILABLE_PLACEHOLDER);
    }

    #[test]
    fn test_compliant_verdict() {
        let result = AnalysisResult::new(92, vec![], "Pets welcome.", vec![]);
        assert!(result.is_compliant());
        assert!(!result.is_degraded());
    }

    #[test]
    fn test_result_serialization() {
        let result = AnalysisResult::new(
            70,
            vec!["No pit bulls".to_string()],
            "Pets welcome.",
            vec!["D.R.M.C. 8-67".to_string()],
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["risky_phrases"][0], "No pit bulls");
        assert_eq!(json["fixed_listing"], "Pets welcome.");

        let parsed: AnalysisResult = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_deserialize_clamps_and_defaults() {
        let parsed: AnalysisResult = serde_json::from_str(r#"{"confidence": 140}"#).unwrap();
        assert_eq!(parsed.confidence(), 100);
        assert!(parsed.risky_phrases().is_empty());
        assert_eq!(parsed.fixed_listing(), "");
    }
}
