//! PDF compliance report.
//!
//! Renders the original listing, the flagged clauses, the compliant rewrite
//! and the supporting citations into a paginated PDF. Output depends only on
//! the input, so the same input and timestamp give identical bytes.

mod encoding;
mod layout;
mod metrics;

use chrono::{DateTime, Utc};
use layout::{Font, Layout, PAGE_HEIGHT, PAGE_WIDTH};
use lopdf::content::Content;
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use petclause_model::{AnalysisResult, ListingText};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const REPORT_TITLE: &str = "PetClause AI – Compliance Report";

const FOOTER_NOTE: &str = "Automated guidance only; not legal advice.";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("pdf encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Content of one report.
#[derive(Debug, Clone)]
pub struct ReportInput<'a> {
    pub listing: &'a str,
    pub fixed_listing: &'a str,
    pub risky_phrases: &'a [String],
    pub citations: &'a [String],
    pub jurisdiction: Option<&'a str>,
    pub generated_at: DateTime<Utc>,
}

impl<'a> ReportInput<'a> {
    pub fn from_result(
        listing: &'a ListingText,
        result: &'a AnalysisResult,
        jurisdiction: Option<&'a str>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            listing: listing.as_str(),
            fixed_listing: result.fixed_listing(),
            risky_phrases: result.risky_phrases(),
            citations: result.citations(),
            jurisdiction,
            generated_at,
        }
    }
}

/// Suggested file name, e.g. `PetClause_Report_Denver_20261019-142311.pdf`.
pub fn default_file_name(jurisdiction: Option<&str>, generated_at: DateTime<Utc>) -> String {
    let place: String = jurisdiction
        .unwrap_or("Listing")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    let place = if place.is_empty() { "Listing".to_string() } else { place };
    format!(
        "PetClause_Report_{}_{}.pdf",
        place,
        generated_at.format("%Y%m%d-%H%M%S")
    )
}

fn lay_out(input: &ReportInput) -> Layout {
    let mut layout = Layout::new();
    layout.title(REPORT_TITLE);
    if let Some(place) = input.jurisdiction {
        layout.label(&format!("Jurisdiction: {}", place));
    }

    layout.heading("Original Listing");
    layout.paragraph(input.listing);

    layout.heading("Risky Clauses Found");
    if input.risky_phrases.is_empty() {
        layout.paragraph("No risky or illegal clauses were identified.");
    } else {
        for phrase in input.risky_phrases {
            layout.bullet(phrase);
        }
    }

    layout.heading("Compliant Version");
    if input.fixed_listing.trim().is_empty() {
        layout.paragraph("No rewrite was produced.");
    } else {
        layout.block(input.fixed_listing);
    }

    layout.heading("Legal Sources & Citations");
    if input.citations.is_empty() {
        layout.paragraph("No citations were returned for this analysis.");
    } else {
        for citation in input.citations {
            layout.bullet(citation);
        }
    }

    let unmappable = unmappable_chars(input);
    if unmappable > 0 {
        warn!(unmappable, "Report text has characters the PDF fonts cannot show");
        layout.gap(10);
        layout.paragraph(&format!(
            "Note: {} character(s) outside the Western European character set are shown as \"?\".",
            unmappable
        ));
    }
    layout
}

fn unmappable_chars(input: &ReportInput) -> usize {
    let fields = [input.listing, input.fixed_listing]
        .into_iter()
        .chain(input.jurisdiction)
        .chain(input.risky_phrases.iter().map(String::as_str))
        .chain(input.citations.iter().map(String::as_str));
    fields.map(encoding::unmappable_count).sum()
}

/// Render the report to PDF bytes.
pub fn render(input: &ReportInput) -> Result<Vec<u8>, ReportError> {
    let stamp = input.generated_at.format("%Y-%m-%d %H:%M").to_string();
    let pages = lay_out(input).finish(|n, total| {
        format!(
            "Generated {} UTC | {} | Page {} of {}",
            stamp, FOOTER_NOTE, n, total
        )
    });

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = lopdf::Dictionary::new();
    for font in Font::ALL {
        let id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource(), Object::Reference(id));
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let mut kids = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations }.encode()?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let created = input.generated_at.format("D:%Y%m%d%H%M%SZ").to_string();
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(encoding::to_win_ansi(REPORT_TITLE), StringFormat::Literal),
        "Producer" => Object::String(b"PetClause".to_vec(), StringFormat::Literal),
        "CreationDate" => Object::String(created.into_bytes(), StringFormat::Literal),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.trailer.set("Info", Object::Reference(info_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    debug!(pages = count, bytes = buffer.len(), "Rendered report");
    Ok(buffer)
}

/// Render the report and write it to `path`.
pub fn write_report(path: &Path, input: &ReportInput) -> Result<(), ReportError> {
    let bytes = render(input)?;
    std::fs::write(path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "Wrote compliance report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::from_win_ansi;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, hour, 23, 11).unwrap()
    }

    fn input<'a>(
        fixed: &'a str,
        risky: &'a [String],
        citations: &'a [String],
        place: Option<&'a str>,
    ) -> ReportInput<'a> {
        ReportInput {
            listing: "No pit bulls. $500 non-refundable pet deposit.",
            fixed_listing: fixed,
            risky_phrases: risky,
            citations,
            jurisdiction: place,
            generated_at: at(14),
        }
    }

    /// Text shown on each page, one string per Tj.
    fn page_texts(bytes: &[u8]) -> Vec<Vec<String>> {
        let doc = Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|&page_id| {
                let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
                content
                    .operations
                    .iter()
                    .filter(|op| op.operator == "Tj")
                    .filter_map(|op| match op.operands.first() {
                        Some(Object::String(bytes, _)) => Some(from_win_ansi(bytes)),
                        _ => None,
                    })
                    .collect()
            })
            .collect()
    }

    fn all_text(bytes: &[u8]) -> Vec<String> {
        page_texts(bytes).into_iter().flatten().collect()
    }

    #[test]
    fn test_sections_in_order() {
        let risky = vec!["No pit bulls".to_string()];
        let citations = vec!["Denver Revised Municipal Code 8-67".to_string()];
        let pdf = render(&input("Pets welcome.", &risky, &citations, Some("Denver"))).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));

        let text = all_text(&pdf);
        let pos = |needle: &str| text.iter().position(|t| t == needle).unwrap();
        assert_eq!(pos(REPORT_TITLE), 0);
        assert_eq!(pos("Jurisdiction: Denver"), 1);
        assert!(pos("Original Listing") < pos("Risky Clauses Found"));
        assert!(pos("Risky Clauses Found") < pos("No pit bulls"));
        assert!(pos("No pit bulls") < pos("Compliant Version"));
        assert!(pos("Compliant Version") < pos("Pets welcome."));
        assert!(pos("Pets welcome.") < pos("Legal Sources & Citations"));
        assert!(text.contains(&"Denver Revised Municipal Code 8-67".to_string()));
        assert_eq!(text.iter().filter(|t| *t == "•").count(), 2);
    }

    #[test]
    fn test_long_rewrite_is_complete() {
        let fixed: String = (1..=150)
            .map(|i| format!("Clause {}: pets are welcome under reasonable terms.", i))
            .collect::<Vec<_>>()
            .join("\n");
        let pdf = render(&input(&fixed, &[], &[], None)).unwrap();
        let pages = page_texts(&pdf);
        assert!(pages.len() > 2);

        let text: Vec<String> = pages.iter().flatten().cloned().collect();
        for i in 1..=150 {
            let line = format!("Clause {}: pets are welcome under reasonable terms.", i);
            assert!(text.contains(&line), "missing {}", line);
        }
        let total = pages.len();
        for (i, page) in pages.iter().enumerate() {
            let footer = page.last().unwrap();
            assert!(footer.ends_with(&format!("Page {} of {}", i + 1, total)));
            assert!(footer.starts_with("Generated 2026-10-19 14:23 UTC"));
        }
    }

    #[test]
    fn test_empty_sections_have_fallbacks() {
        let pdf = render(&input("  ", &[], &[], None)).unwrap();
        let text = all_text(&pdf);
        assert!(text.contains(&"No risky or illegal clauses were identified.".to_string()));
        assert!(text.contains(&"No rewrite was produced.".to_string()));
        assert!(text.contains(&"No citations were returned for this analysis.".to_string()));
        assert!(!text.iter().any(|t| t.starts_with("Jurisdiction:")));
    }

    #[test]
    fn test_deterministic_output() {
        let risky = vec!["No cats".to_string()];
        let a = render(&input("Cats welcome.", &risky, &[], Some("Austin"))).unwrap();
        let b = render(&input("Cats welcome.", &risky, &[], Some("Austin"))).unwrap();
        assert_eq!(a, b);

        let mut later = input("Cats welcome.", &risky, &[], Some("Austin"));
        later.generated_at = at(15);
        assert_ne!(a, render(&later).unwrap());
    }

    #[test]
    fn test_non_ascii_text() {
        let risky = vec!["“No dogs” – ever".to_string()];
        let pdf = render(&input("Café pets welcome.", &risky, &[], None)).unwrap();
        let text = all_text(&pdf);
        assert!(text.contains(&"“No dogs” – ever".to_string()));
        assert!(!text.iter().any(|t| t.starts_with("Note:")));
        assert!(text.contains(&"Café pets welcome.".to_string()));
    }

    #[test]
    fn test_all_caps_text_stays_on_page() {
        let shout = "NO PIT BULLS, ROTTWEILERS, DOBERMANS, GERMAN SHEPHERDS OR WOLF HYBRIDS ALLOWED ON THE PROPERTY";
        let risky = vec![shout.to_string()];
        let citations = vec![format!("{} (SEE DRMC 8-67)", shout)];
        let mut report = input(shout, &risky, &citations, Some("Denver"));
        report.listing = shout;
        let pdf = render(&report).unwrap();

        let doc = Document::load_mem(&pdf).unwrap();
        for &page_id in doc.get_pages().values() {
            let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
            for (text, end) in crate::layout::tests::line_ends(&content.operations) {
                assert!(end <= crate::layout::RIGHT * 1000, "{:?} ends at {}pt", text, end / 1000);
            }
        }
        assert!(all_text(&pdf).iter().any(|t| t.ends_with("ALLOWED ON THE PROPERTY")));
    }

    #[test]
    fn test_unmappable_text_is_noted() {
        let risky = vec!["Домашние животные запрещены".to_string()];
        let pdf = render(&input("Pets welcome.", &risky, &[], None)).unwrap();
        let text = all_text(&pdf);
        assert!(text.iter().any(|t| t.starts_with("Note: 25 character(s)")));
    }

    #[test]
    fn test_from_result() {
        let listing = ListingText::new("No birds.").unwrap();
        let result = AnalysisResult::new(40, vec!["No birds".into()], "Birds welcome.", vec![]);
        let report = ReportInput::from_result(&listing, &result, Some("Seattle"), at(9));
        assert_eq!(report.listing, "No birds.");
        assert_eq!(report.risky_phrases, &["No birds".to_string()]);
        assert!(render(&report).is_ok());
    }

    #[test]
    fn test_default_file_name() {
        assert_eq!(
            default_file_name(Some("San Francisco"), at(14)),
            "PetClause_Report_San_Francisco_20261019-142311.pdf"
        );
        assert_eq!(
            default_file_name(None, at(14)),
            "PetClause_Report_Listing_20261019-142311.pdf"
        );
    }

    #[test]
    fn test_write_report() {
        let path = std::env::temp_dir().join(format!("petclause-report-{}.pdf", std::process::id()));
        write_report(&path, &input("Pets welcome.", &[], &[], None)).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
