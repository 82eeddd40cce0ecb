//! Text utilities shared by the analyzer, presentation and report crates.
//!
//! Provides pure functions:
//! - Text normalization for comparison
//! - Phrase grounding (does a flagged phrase actually occur in the listing?)
//! - UTF-8 safe truncation
//! - Word wrapping by character count or measured width

use serde::{Deserialize, Serialize};

/// How a flagged phrase relates to the listing it was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grounding {
    /// Occurs exactly (case-insensitive) in the listing
    Verbatim,
    /// Occurs once punctuation and spacing are ignored
    Normalized,
    /// Not found in the listing; the engine paraphrased or invented it
    Ungrounded,
}

/// Normalize text for comparison.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Check whether `phrase` is an excerpt of `listing`.
pub fn ground_phrase(listing: &str, phrase: &str) -> Grounding {
    let phrase = phrase.trim();
    if phrase.is_empty() {
        return Grounding::Ungrounded;
    }

    if listing.to_lowercase().contains(&phrase.to_lowercase()) {
        return Grounding::Verbatim;
    }

    let phrase_norm = normalize_text(phrase);
    if phrase_norm.is_empty() {
        return Grounding::Ungrounded;
    }

    // Pad with spaces so "pet" does not match inside "carpet".
    let listing_norm = format!(" {} ", normalize_text(listing));
    if listing_norm.contains(&format!(" {} ", phrase_norm)) {
        Grounding::Normalized
    } else {
        Grounding::Ungrounded
    }
}

/// Truncate to at most `max_bytes`, backing off to a char boundary.
pub fn truncate_utf8(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Wrap text to lines of at most `width` characters.
///
/// Explicit line breaks are kept (blank lines included). Words longer than
/// `width` are split across lines. No text is dropped.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    wrap_measured(text, width.max(1), |_| 1)
}

/// Wrap text so the summed `char_width` of every line stays within
/// `max_width`, for proportional fonts.
///
/// Same rules as [`wrap`]; a single character wider than `max_width` still
/// gets a line of its own.
pub fn wrap_measured<F>(text: &str, max_width: usize, char_width: F) -> Vec<String>
where
    F: Fn(char) -> usize,
{
    let space = char_width(' ');
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width: usize = word.chars().map(&char_width).sum();

            if !current.is_empty() {
                if current_width + space + word_width <= max_width {
                    current.push(' ');
                    current.push_str(word);
                    current_width += space + word_width;
                    continue;
                }
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }

            if word_width <= max_width {
                current.push_str(word);
                current_width = word_width;
                continue;
            }

            // Hard-split words that can never fit on one line
            for c in word.chars() {
                let w = char_width(c);
                if !current.is_empty() && current_width + w > max_width {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push(c);
                current_width += w;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}
