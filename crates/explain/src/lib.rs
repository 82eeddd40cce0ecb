//! Presentation of analysis results.
//!
//! Converts an `AnalysisResult` into what a front end shows: a compliance
//! band for the score, a verdict headline, grounded risky phrases, and the
//! fixed listing gated by `has_full_access` (full text, or a teaser).

use petclause_model::{AnalysisResult, ListingText};
use petclause_text::ground_phrase;
use serde::{Deserialize, Serialize};

pub use petclause_text::Grounding;

pub const DISCLAIMER: &str = "Automated guidance only; not legal advice.";

/// Shown in place of the rewrite when access is limited and the rewrite is empty.
const DEFAULT_TEASER: &str = "Pets welcome with the following restrictions...";

const TEASER_SUFFIX: &str = "... [rest hidden — unlock full version below]";

/// Lines of the rewrite visible without full access.
const TEASER_LINES: usize = 2;

/// Score band for the compliance confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceBand {
    /// 80 and above
    Compliant,
    /// 50 to 79
    NeedsReview,
    /// Below 50
    HighRisk,
}

impl ComplianceBand {
    pub fn from_confidence(confidence: u8) -> Self {
        if confidence >= 80 {
            Self::Compliant
        } else if confidence >= 50 {
            Self::NeedsReview
        } else {
            Self::HighRisk
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Compliant => "Compliant",
            Self::NeedsReview => "Needs Review",
            Self::HighRisk => "High Risk",
        }
    }

    /// Badge colour (hex).
    pub fn color(&self) -> &'static str {
        match self {
            Self::Compliant => "#4CAF50",
            Self::NeedsReview => "#FF9800",
            Self::HighRisk => "#F44336",
        }
    }
}

/// Overall outcome of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "risks", rename_all = "snake_case")]
pub enum Verdict {
    /// No risky phrases and a real (non-degraded) answer
    Compliant,
    /// At least one risky phrase
    ViolationsFound(usize),
    /// The engine gave nothing usable
    Unavailable,
}

impl Verdict {
    pub fn of(result: &AnalysisResult) -> Self {
        if result.is_degraded() {
            Self::Unavailable
        } else if result.is_compliant() {
            Self::Compliant
        } else {
            Self::ViolationsFound(result.risk_count())
        }
    }

    pub fn headline(&self) -> String {
        match self {
            Self::Compliant => "No major violations detected — looks compliant!".to_string(),
            Self::ViolationsFound(1) => "1 risky or illegal phrase found".to_string(),
            Self::ViolationsFound(n) => format!("{} risky or illegal phrases found", n),
            Self::Unavailable => {
                "Analysis unavailable — the compliance check could not be completed. Please try again."
                    .to_string()
            }
        }
    }
}

/// A risky phrase and whether it was found in the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedPhrase {
    pub text: String,
    pub grounding: Grounding,
}

/// The rewrite as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "access", content = "text", rename_all = "snake_case")]
pub enum FixedListingView {
    Full(String),
    Teaser(String),
}

impl FixedListingView {
    pub fn text(&self) -> &str {
        match self {
            Self::Full(text) | Self::Teaser(text) => text,
        }
    }
}

/// Everything a front end needs to render one scan result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultView {
    pub score: u8,
    pub band: ComplianceBand,
    pub risk_count: usize,
    pub verdict: Verdict,
    pub headline: String,
    pub risky_phrases: Vec<FlaggedPhrase>,
    pub fixed_listing: FixedListingView,
    /// Withheld without full access
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<String>>,
    pub share_text: String,
    pub disclaimer: String,
}

/// Build the view of a result for one listing.
pub fn present(result: &AnalysisResult, listing: &ListingText, has_full_access: bool) -> ResultView {
    let verdict = Verdict::of(result);

    let risky_phrases = result
        .risky_phrases()
        .iter()
        .map(|phrase| FlaggedPhrase {
            text: phrase.clone(),
            grounding: ground_phrase(listing.as_str(), phrase),
        })
        .collect();

    let fixed_listing = if has_full_access {
        FixedListingView::Full(result.fixed_listing().to_string())
    } else {
        FixedListingView::Teaser(teaser(result.fixed_listing()))
    };

    ResultView {
        score: result.confidence(),
        band: ComplianceBand::from_confidence(result.confidence()),
        risk_count: result.risk_count(),
        verdict,
        headline: verdict.headline(),
        risky_phrases,
        fixed_listing,
        citations: has_full_access.then(|| result.citations().to_vec()),
        share_text: share_text(result.risk_count()),
        disclaimer: DISCLAIMER.to_string(),
    }
}

/// First lines of the rewrite followed by a "rest hidden" marker.
pub fn teaser(fixed_listing: &str) -> String {
    let trimmed = fixed_listing.trim();
    let head = if trimmed.is_empty() {
        DEFAULT_TEASER.to_string()
    } else {
        trimmed
            .lines()
            .take(TEASER_LINES)
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!("{}\n\n{}", head, TEASER_SUFFIX)
}

/// Social share blurb.
pub fn share_text(risk_count: usize) -> String {
    format!(
        "Just scanned my rental listing with @PetClauseAI — caught {} illegal pet clauses!",
        risk_count
    )
}

/// One-line risk summary for logs and plain-text output.
pub fn summarize(result: &AnalysisResult) -> String {
    let verdict = Verdict::of(result);
    match verdict {
        Verdict::Unavailable => "UNAVAILABLE: analysis could not be completed".to_string(),
        _ => format!(
            "{} ({}%): {}",
            ComplianceBand::from_confidence(result.confidence()).label().to_uppercase(),
            result.confidence(),
            verdict.headline()
        ),
    }
}
