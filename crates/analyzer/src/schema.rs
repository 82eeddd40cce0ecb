//! Response schema enforcement.
//!
//! Engine output is untrusted text that nominally encodes a JSON object.
//! `parse_response` recovers the object (stripping code fences and
//! surrounding prose) and coerces each field:
//!
//! | field           | accepted                                   | default |
//! |-----------------|--------------------------------------------|---------|
//! | `confidence`    | integer, float, numeric string, "85%"      | `0`     |
//! | `risky_phrases` | list of scalars, single string             | `[]`    |
//! | `fixed_listing` | string, list of lines                      | `""`    |
//! | `citations`     | list of scalars, single string             | `[]`    |
//!
//! Only an outermost object is considered, and it must carry at least one
//! schema key. A nested item is never mistaken for the whole response, so a
//! truncated or broken reply degrades instead of losing its flagged phrases.
//!
//! Confidence is clamped into `[0, 100]`; a decimal value in `(0, 1]`
//! (`0.9`, `1.0`) is read as a ratio. Blank and duplicate list entries are
//! dropped. camelCase keys are accepted alongside snake_case.

use petclause_model::AnalysisResult;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Upper bound on top-level candidate objects tried in one response.
const MAX_OBJECT_CANDIDATES: usize = 16;

const CONFIDENCE_KEYS: &[&str] = &["confidence", "confidence_score", "score"];
const RISKY_KEYS: &[&str] = &["risky_phrases", "riskyPhrases", "risks"];
const FIXED_KEYS: &[&str] = &["fixed_listing", "fixedListing", "compliant_listing"];
const CITATION_KEYS: &[&str] = &["citations", "sources"];

/// Reasons a response could not be recovered as an object at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Empty response")]
    Empty,
    #[error("No JSON object found in response")]
    NoObject,
    #[error("JSON object has none of the expected fields")]
    MissingFields,
}

/// Parse and coerce raw engine text into a schema-valid result.
pub fn parse_response(raw: &str) -> Result<AnalysisResult, SchemaError> {
    if raw.trim().is_empty() {
        return Err(SchemaError::Empty);
    }

    let object = find_object(raw)?;

    let confidence = coerce_confidence(field(&object, CONFIDENCE_KEYS));
    let risky_phrases = coerce_list(field(&object, RISKY_KEYS));
    let fixed_listing = coerce_text(field(&object, FIXED_KEYS));
    let citations = coerce_list(field(&object, CITATION_KEYS));

    debug!(
        confidence,
        risky = risky_phrases.len(),
        citations = citations.len(),
        fixed_chars = fixed_listing.len(),
        "Parsed engine response"
    );

    Ok(AnalysisResult::new(confidence, risky_phrases, fixed_listing, citations))
}

/// Locate the first top-level `{...}` span that parses as a JSON object
/// with at least one schema key.
///
/// Braces inside an earlier candidate are never candidates themselves, and
/// the search stops at the first top-level object that never closes.
fn find_object(raw: &str) -> Result<Map<String, Value>, SchemaError> {
    let mut from = 0;
    let mut unrecognized = false;

    for _ in 0..MAX_OBJECT_CANDIDATES {
        let Some(offset) = raw[from..].find('{') else {
            break;
        };
        let start = from + offset;
        let Some(len) = balanced_end(&raw[start..]) else {
            debug!(start, "Response object never closes");
            break;
        };

        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&raw[start..start + len]) {
            if has_schema_key(&map) {
                return Ok(map);
            }
            unrecognized = true;
        }
        from = start + len;
    }

    Err(if unrecognized {
        SchemaError::MissingFields
    } else {
        SchemaError::NoObject
    })
}

fn has_schema_key(object: &Map<String, Value>) -> bool {
    [CONFIDENCE_KEYS, RISKY_KEYS, FIXED_KEYS, CITATION_KEYS]
        .iter()
        .any(|keys| field(object, keys).is_some())
}

/// Byte length of the brace-balanced prefix of `s` (which starts with `{`),
/// honoring string literals and escapes. `None` when the object never closes.
fn balanced_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn field<'a>(object: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| object.get(*name))
}

fn coerce_confidence(value: Option<&Value>) -> i64 {
    // (value, written as a decimal ratio)
    let number = match value {
        Some(Value::Number(n)) => n.as_f64().map(|f| (f, n.is_f64())),
        Some(Value::String(s)) => {
            let s = s.trim();
            let percent = s.ends_with('%');
            let digits = s.trim_end_matches('%').trim();
            digits
                .parse::<f64>()
                .ok()
                .map(|f| (f, !percent && digits.contains('.')))
        }
        _ => None,
    };

    match number {
        Some((n, decimal)) if n.is_finite() => {
            let scaled = if decimal && n > 0.0 && n <= 1.0 { n * 100.0 } else { n };
            scaled.round().clamp(0.0, 100.0) as i64
        }
        _ => 0,
    }
}

fn coerce_list(value: Option<&Value>) -> Vec<String> {
    let items: Vec<String> = match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(other) => scalar_text(other).into_iter().collect(),
        None => Vec::new(),
    };

    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

/// Text of a scalar list entry. Objects contribute their first text-like
/// field (`phrase`, `text`, `citation`, ...); nulls and nested lists are
/// skipped.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => ["phrase", "text", "citation", "source", "reference"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        Value::Null | Value::Array(_) => None,
    }
}

fn coerce_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(lines)) => lines
            .iter()
            .filter_map(scalar_text)
            .collect::<Vec<_>>()
            .join("\n"),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const VALID: &str = r#"{
        "confidence": 88,
        "risky_phrases": ["No aggressive breeds", "$500 non-refundable pet deposit"],
        "fixed_listing": "Pets welcome. Refundable pet deposit up to $300.",
        "citations": ["DRMC 8-67", "Colorado HB 23-1068"]
    }"#;

    const VALID_OBJECT_ITEMS: &str = r#"{
        "confidence": 35,
        "risky_phrases": [
            {"phrase": "No aggressive breeds", "confidence": 95},
            {"text": "$500 non-refundable pet deposit", "score": 90}
        ],
        "fixed_listing": "Pets welcome. Refundable pet deposit up to $300.",
        "citations": [{"citation": "DRMC 8-67"}]
    }"#;

    #[test]
    fn test_valid_response() {
        let result = parse_response(VALID).unwrap();
        assert_eq!(result.confidence(), 88);
        assert_eq!(
            result.risky_phrases(),
            &["No aggressive breeds", "$500 non-refundable pet deposit"]
        );
        assert_eq!(result.fixed_listing(), "Pets welcome. Refundable pet deposit up to $300.");
        assert_eq!(result.citations(), &["DRMC 8-67", "Colorado HB 23-1068"]);
    }

    #[test]
    fn test_code_fence_and_prose() {
        let raw = format!("Here is the analysis:\n```json\n{}\n```\nLet me know!", VALID);
        assert_eq!(parse_response(&raw).unwrap(), parse_response(VALID).unwrap());
    }

    #[test]
    fn test_braces_inside_strings() {
        let raw = r#"{"confidence": 70, "fixed_listing": "Use {curly} words } freely", "risky_phrases": []}"#;
        let result = parse_response(raw).unwrap();
        assert_eq!(result.fixed_listing(), "Use {curly} words } freely");
    }

    #[test]
    fn test_missing_fields_default() {
        let result = parse_response(r#"{"confidence": 95}"#).unwrap();
        assert_eq!(result.confidence(), 95);
        assert!(result.risky_phrases().is_empty());
        assert_eq!(result.fixed_listing(), "");
        assert!(result.citations().is_empty());
    }

    #[test]
    fn test_confidence_coercion() {
        let c = |raw: &str| parse_response(raw).unwrap().confidence();
        assert_eq!(c(r#"{"confidence": "85%"}"#), 85);
        assert_eq!(c(r#"{"confidence": " 72 "}"#), 72);
        assert_eq!(c(r#"{"confidence": 0.9}"#), 90);
        assert_eq!(c(r#"{"confidence": 0.99}"#), 99);
        assert_eq!(c(r#"{"confidence": 1.0}"#), 100);
        assert_eq!(c(r#"{"confidence": "0.75"}"#), 75);
        assert_eq!(c(r#"{"confidence": 1}"#), 1);
        assert_eq!(c(r#"{"confidence": "1"}"#), 1);
        assert_eq!(c(r#"{"confidence": "0.5%"}"#), 1);
        assert_eq!(c(r#"{"confidence": 180}"#), 100);
        assert_eq!(c(r#"{"confidence": -3}"#), 0);
        assert_eq!(c(r#"{"confidence": "high"}"#), 0);
        assert_eq!(c(r#"{"confidence": null}"#), 0);
        assert_eq!(c(r#"{"confidence": [50]}"#), 0);
    }

    #[test]
    fn test_list_coercion() {
        let raw = r#"{
            "risky_phrases": "No pit bulls",
            "citations": ["  ", "FHA", null, 3604, "FHA", {"citation": "HUD FHEO-2020-01"}, ["nested"]]
        }"#;
        let result = parse_response(raw).unwrap();
        assert_eq!(result.risky_phrases(), &["No pit bulls"]);
        assert_eq!(result.citations(), &["FHA", "3604", "HUD FHEO-2020-01"]);
    }

    #[test]
    fn test_camel_case_keys() {
        let raw = r#"{"confidence": 60, "riskyPhrases": ["max 1 pet"], "fixedListing": "Pets welcome."}"#;
        let result = parse_response(raw).unwrap();
        assert_eq!(result.risky_phrases(), &["max 1 pet"]);
        assert_eq!(result.fixed_listing(), "Pets welcome.");
    }

    #[test]
    fn test_fixed_listing_as_lines() {
        let raw = r#"{"fixed_listing": ["Pets welcome.", "Service animals exempt."]}"#;
        let result = parse_response(raw).unwrap();
        assert_eq!(result.fixed_listing(), "Pets welcome.\nService animals exempt.");
    }

    #[test]
    fn test_unrecoverable() {
        assert_eq!(parse_response(""), Err(SchemaError::Empty));
        assert_eq!(parse_response("   \n"), Err(SchemaError::Empty));
        assert_eq!(parse_response("I cannot help with that."), Err(SchemaError::NoObject));
        assert_eq!(parse_response(r#"{"confidence": 88, "risky_"#), Err(SchemaError::NoObject));
        assert_eq!(parse_response("[1, 2, 3]"), Err(SchemaError::NoObject));
        assert_eq!(parse_response("{not json}"), Err(SchemaError::NoObject));
        assert_eq!(
            parse_response(r#"{"error": "rate limited"}"#),
            Err(SchemaError::MissingFields)
        );
    }

    #[test]
    fn test_truncated_reply_with_object_items() {
        let raw = r#"{"confidence": 40, "risky_phrases": [{"phrase": "No aggressive breeds", "confidence": 95}], "fixed_listing": "Pets welcome. Refundable dep"#;
        assert_eq!(parse_response(raw), Err(SchemaError::NoObject));
    }

    #[test]
    fn test_trailing_comma_reply_with_object_items() {
        let raw = r#"{"confidence": 30, "risky_phrases": [{"text": "No pit bulls", "score": 90}], "fixed_listing": "Pets welcome.", "citations": ["DRMC 8-67"],}"#;
        assert_eq!(parse_response(raw), Err(SchemaError::NoObject));
    }

    #[test]
    fn test_object_items_in_valid_reply() {
        let raw = r#"{"confidence": 40, "risky_phrases": [{"phrase": "No aggressive breeds", "confidence": 95}]}"#;
        let result = parse_response(raw).unwrap();
        assert_eq!(result.confidence(), 40);
        assert_eq!(result.risky_phrases(), &["No aggressive breeds"]);
    }

    #[test]
    fn test_skips_unrecognized_object() {
        let raw = r#"Context: {"note": "draft"} Answer: {"confidence": 55, "risky_phrases": ["no cats"]}"#;
        assert_eq!(parse_response(raw).unwrap().confidence(), 55);
    }

    #[test]
    fn test_skips_non_object_candidate() {
        let raw = r#"Template: {fields} then {"confidence": 40, "risky_phrases": ["no cats"]}"#;
        let result = parse_response(raw).unwrap();
        assert_eq!(result.confidence(), 40);
        assert_eq!(result.risky_phrases(), &["no cats"]);
    }

    mod proptests {
        use super::{VALID, VALID_OBJECT_ITEMS};
        use crate::schema::parse_response;
        use proptest::prelude::*;

        fn check_fields(raw: &str) -> Result<(), TestCaseError> {
            // Err is the degrade signal; Ok must be fully schema-valid.
            if let Ok(result) = parse_response(raw) {
                prop_assert!(result.confidence() <= 100);
                prop_assert!(result.risky_phrases().iter().all(|p| !p.trim().is_empty()));
                prop_assert!(result.citations().iter().all(|c| !c.trim().is_empty()));
            }
            Ok(())
        }

        proptest! {
            /// Arbitrary text never panics and never yields an invalid result
            #[test]
            fn arbitrary_text(raw in ".{0,400}") {
                check_fields(&raw)?;
            }

            /// JSON-flavoured noise
            #[test]
            fn json_like_noise(raw in r#"[{}\[\]":,0-9a-z_ \\]{0,200}"#) {
                check_fields(&raw)?;
            }

            /// Every truncation of a valid response is handled
            #[test]
            fn truncated_valid(cut in 0usize..VALID.len()) {
                check_fields(&VALID[..cut])?;
            }

            /// A reply cut before its closing brace never reads as compliant
            #[test]
            fn unclosed_reply_is_never_compliant(cut in 0usize..VALID.len()) {
                let outcome = parse_response(&VALID[..cut]);
                prop_assert!(outcome.map_or(true, |result| !result.is_compliant()));
            }

            /// Same, when list items are objects carrying their own scores
            #[test]
            fn unclosed_reply_with_object_items_is_never_compliant(
                cut in 0usize..VALID_OBJECT_ITEMS.len()
            ) {
                let outcome = parse_response(&VALID_OBJECT_ITEMS[..cut]);
                prop_assert!(outcome.map_or(true, |result| !result.is_compliant()));
            }

            /// Single-byte corruption of a valid response is handled
            #[test]
            fn garbled_valid(pos in 0usize..VALID.len(), byte in 0x20u8..0x7f) {
                let mut bytes = VALID.as_bytes().to_vec();
                bytes[pos] = byte;
                let garbled = String::from_utf8_lossy(&bytes).into_owned();
                check_fields(&garbled)?;
            }

            /// Arbitrary confidence values always land in range
            #[test]
            fn confidence_in_range(value in proptest::num::f64::ANY) {
                let raw = format!(r#"{{"confidence": "{}"}}"#, value);
                if let Ok(result) = parse_response(&raw) {
                    prop_assert!(result.confidence() <= 100);
                }
            }
        }
    }
}
