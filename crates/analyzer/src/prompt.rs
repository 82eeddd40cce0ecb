//! Reasoning request construction.

use petclause_model::{ListingText, Ordinance};
use petclause_text::truncate_utf8;
use tracing::warn;

/// The object shape the engine is told to return.
pub const RESPONSE_SCHEMA: &str = r#"{
  "confidence": <integer 0-100, your certainty that the flagged risks and the rewrite are accurate and complete>,
  "risky_phrases": [<exact excerpt copied from the listing that violates the ordinance>, ...],
  "fixed_listing": "<the complete rewritten listing>",
  "citations": ["<ordinance section, statute or doctrine supporting a flagged risk>", ...]
}"#;

/// Build the single prompt sent to the engine for one listing.
///
/// Listing and ordinance are each cut to `max_content_chars` bytes.
pub fn build_prompt(listing: &ListingText, ordinance: &Ordinance, max_content_chars: usize) -> String {
    let listing_text = clip("listing", listing.as_str(), max_content_chars);
    let ordinance_text = clip("ordinance", ordinance.text(), max_content_chars);
    let jurisdiction = ordinance.jurisdiction().name();

    format!(
        r#"You are a fair-housing compliance reviewer. Check the rental listing below for pet-related clauses that violate the {jurisdiction} ordinance text or the federal rules it includes.

Rules:
1. Judge ONLY against the ORDINANCE TEXT provided. Do not rely on general knowledge of other jurisdictions.
2. Every entry in "risky_phrases" must be an exact excerpt copied from the LISTING. If nothing violates the ordinance, return an empty list.
3. Every citation must name a section, statute or doctrine that appears in the ORDINANCE TEXT and supports a flagged phrase.
4. "fixed_listing" must be the COMPLETE listing rewritten so that it complies, ready to publish as-is. Keep every compliant sentence, replace or remove only non-compliant language, and do not add commentary, notes or markdown.
5. Respond with ONE JSON object and nothing else, exactly in this shape:
{schema}

ORDINANCE TEXT ({jurisdiction}):
<<<
{ordinance_text}
>>>

LISTING:
<<<
{listing_text}
>>>"#,
        jurisdiction = jurisdiction,
        schema = RESPONSE_SCHEMA,
        ordinance_text = ordinance_text,
        listing_text = listing_text,
    )
}

fn clip<'a>(what: &str, text: &'a str, max: usize) -> &'a str {
    let clipped = truncate_utf8(text, max);
    if clipped.len() < text.len() {
        warn!(what, original = text.len(), kept = clipped.len(), "Truncating prompt content");
    }
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use petclause_model::Jurisdiction;

    fn ordinance() -> Ordinance {
        Ordinance::new(
            Jurisdiction::new("Denver").unwrap(),
            "DRMC 8-67: no breed-based restrictions.",
        )
    }

    #[test]
    fn test_prompt_contains_inputs() {
        let listing = ListingText::new("No aggressive breeds.").unwrap();
        let prompt = build_prompt(&listing, &ordinance(), 10_000);

        assert!(prompt.contains("No aggressive breeds."));
        assert!(prompt.contains("DRMC 8-67: no breed-based restrictions."));
        assert!(prompt.contains("Denver"));
    }

    #[test]
    fn test_prompt_demands_schema() {
        let listing = ListingText::new("Pets welcome.").unwrap();
        let prompt = build_prompt(&listing, &ordinance(), 10_000);

        for field in ["confidence", "risky_phrases", "fixed_listing", "citations"] {
            assert!(prompt.contains(field), "prompt should name {}", field);
        }
        assert!(prompt.contains("ONLY against the ORDINANCE TEXT"));
        assert!(prompt.contains("COMPLETE listing"));
    }

    #[test]
    fn test_prompt_truncates_content() {
        let long = "pets ".repeat(1000);
        let listing = ListingText::new(&long).unwrap();
        let prompt = build_prompt(&listing, &ordinance(), 50);

        assert!(!prompt.contains(long.trim()));
        assert!(prompt.contains(&long[..50]));
    }
}
