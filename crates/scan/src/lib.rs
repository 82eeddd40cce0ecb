//! Scan pipeline.
//!
//! One scan is: validate the listing, resolve the city to an ordinance,
//! analyze. Validation and lookup outcomes are settled here and never reach
//! the analyzer; an unsupported city is reported separately from a lookup
//! store that is down, because the user is told different things.

use petclause_analyzer::{AnalysisFailure, Analyzer};
use petclause_engine::ReasoningEngine;
use petclause_explain::{present, ResultView};
use petclause_model::{AnalysisResult, Jurisdiction, ListingText, Ordinance, ValidationError};
use petclause_ordinance::{LookupError, OrdinanceSource};
use serde::Serialize;
use std::future::Future;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("No ordinance registered for {0}")]
    UnsupportedJurisdiction(Jurisdiction),

    #[error(transparent)]
    LookupUnavailable(#[from] LookupError),

    #[error(transparent)]
    Analysis(#[from] AnalysisFailure),
}

impl ScanError {
    /// Text to show the person who ran the scan.
    pub fn user_message(&self) -> String {
        match self {
            Self::Invalid(ValidationError::EmptyInput) => "Please paste your listing first.".to_string(),
            Self::Invalid(ValidationError::EmptyJurisdiction) => "Please choose a city.".to_string(),
            Self::UnsupportedJurisdiction(city) => {
                format!("Ordinance for {} coming soon! Check back in 24h.", city)
            }
            Self::LookupUnavailable(_) => {
                "Ordinance data is temporarily unavailable. Please try again.".to_string()
            }
            Self::Analysis(_) => {
                "The compliance check could not be completed. Please try again.".to_string()
            }
        }
    }

    /// Whether the same scan may succeed if repeated unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LookupUnavailable(_) | Self::Analysis(_))
    }
}

/// A completed scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub listing: ListingText,
    pub jurisdiction: Jurisdiction,
    pub result: AnalysisResult,
}

impl ScanReport {
    pub fn view(&self, has_full_access: bool) -> ResultView {
        present(&self.result, &self.listing, has_full_access)
    }
}

/// Runs scans against one ordinance source and one analyzer.
pub struct Scanner<S, E> {
    source: S,
    analyzer: Analyzer<E>,
}

impl<S: OrdinanceSource, E: ReasoningEngine> Scanner<S, E> {
    pub fn new(source: S, analyzer: Analyzer<E>) -> Self {
        Self { source, analyzer }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn analyzer(&self) -> &Analyzer<E> {
        &self.analyzer
    }

    /// Cities the source can answer for.
    pub fn supported_jurisdictions(&self) -> Result<Vec<Jurisdiction>, ScanError> {
        Ok(self.source.jurisdictions()?)
    }

    /// Resolve a city name to its ordinance.
    pub fn lookup(&self, city: &str) -> Result<Ordinance, ScanError> {
        let jurisdiction = Jurisdiction::new(city)?;
        match self.source.lookup(&jurisdiction) {
            Ok(Some(ordinance)) => Ok(ordinance),
            Ok(None) => {
                info!(jurisdiction = %jurisdiction, source = self.source.name(), "Unsupported jurisdiction");
                Err(ScanError::UnsupportedJurisdiction(jurisdiction))
            }
            Err(e) => {
                warn!(jurisdiction = %jurisdiction, source = self.source.name(), error = %e, "Ordinance lookup failed");
                Err(e.into())
            }
        }
    }

    pub async fn scan(&self, listing: &str, city: &str) -> Result<ScanReport, ScanError> {
        self.scan_with_cancel(listing, city, std::future::pending())
            .await
    }

    /// Scan, abandoning the engine call once `cancel` resolves.
    pub async fn scan_with_cancel<C>(
        &self,
        listing: &str,
        city: &str,
        cancel: C,
    ) -> Result<ScanReport, ScanError>
    where
        C: Future<Output = ()>,
    {
        let listing = ListingText::new(listing)?;
        let ordinance = self.lookup(city)?;
        let result = self
            .analyzer
            .analyze_with_cancel(&listing, &ordinance, cancel)
            .await?;

        Ok(ScanReport {
            listing,
            jurisdiction: ordinance.jurisdiction().clone(),
            result,
        })
    }
}
