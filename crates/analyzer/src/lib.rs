//! Listing compliance analyzer.
//!
//! Combines a listing and its jurisdiction's ordinance into one reasoning
//! request, sends it to a `ReasoningEngine` and enforces the response
//! schema. Every call is an independent transaction:
//!
//! constructing-request → awaiting-response → parsing → validated | failed
//!
//! Failure policy:
//! - Transport failures (unreachable, timeout, 408/429/5xx) are retried
//!   with exponential backoff, then surface as `AnalysisFailure`.
//! - Non-retryable rejections and malformed envelopes fail immediately.
//! - Content that arrives but cannot be recovered as an object yields
//!   `AnalysisResult::unavailable()` (confidence 0, placeholder rewrite).
//!
//! Engine output is generative: identical inputs may produce different
//! results. Only the schema is guaranteed.

pub mod prompt;
pub mod schema;

use petclause_engine::{EngineError, ReasoningEngine};
use petclause_model::{AnalysisResult, ListingText, Ordinance};
use petclause_text::{ground_phrase, Grounding};
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Configuration for the analyzer.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Bound on a single engine call
    pub timeout: Duration,
    /// Additional attempts after the first transient failure
    pub max_retries: u32,
    /// Delay before the first retry; doubles each retry
    pub retry_base_delay: Duration,
    /// Ceiling for the retry delay
    pub max_retry_delay: Duration,
    /// Bytes of listing and of ordinance text included in the prompt
    pub max_content_chars: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(1000),
            max_retry_delay: Duration::from_secs(30),
            max_content_chars: 12_000,
        }
    }
}

/// The single failure kind callers see from `analyze`.
#[derive(Debug, Error)]
#[error("Analysis failed after {attempts} attempt(s): {source}")]
pub struct AnalysisFailure {
    attempts: u32,
    #[source]
    source: EngineError,
}

impl AnalysisFailure {
    /// Engine calls issued before giving up.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The last engine error.
    pub fn cause(&self) -> &EngineError {
        &self.source
    }
}

/// Exponential backoff: `base * 2^attempt`, capped at `max`.
pub fn backoff_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt)).min(max)
}

/// Stateless listing analyzer over a reasoning engine.
pub struct Analyzer<E> {
    engine: E,
    config: AnalyzerConfig,
}

impl<E: ReasoningEngine> Analyzer<E> {
    pub fn new(engine: E, config: AnalyzerConfig) -> Self {
        Self { engine, config }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze a listing against ordinance text.
    pub async fn analyze(
        &self,
        listing: &ListingText,
        ordinance: &Ordinance,
    ) -> Result<AnalysisResult, AnalysisFailure> {
        self.analyze_with_cancel(listing, ordinance, std::future::pending())
            .await
    }

    /// Analyze, abandoning the in-flight engine call once `cancel` resolves.
    ///
    /// The engine future is dropped on cancellation, which closes its
    /// connection.
    pub async fn analyze_with_cancel<C>(
        &self,
        listing: &ListingText,
        ordinance: &Ordinance,
        cancel: C,
    ) -> Result<AnalysisResult, AnalysisFailure>
    where
        C: Future<Output = ()>,
    {
        let jurisdiction = ordinance.jurisdiction().name();
        debug!(jurisdiction, engine = self.engine.name(), "Constructing reasoning request");
        let prompt = prompt::build_prompt(listing, ordinance, self.config.max_content_chars);

        let attempts = AtomicU32::new(0);
        tokio::pin!(cancel);

        let raw = tokio::select! {
            biased;
            _ = &mut cancel => {
                warn!(jurisdiction, "Analysis cancelled");
                return Err(AnalysisFailure {
                    attempts: attempts.load(Ordering::Relaxed),
                    source: EngineError::Cancelled,
                });
            }
            outcome = self.invoke_with_retry(&prompt, &attempts) => outcome?,
        };

        debug!(jurisdiction, raw_chars = raw.len(), "Parsing engine response");
        let result = match schema::parse_response(&raw) {
            Ok(result) => result,
            Err(e) => {
                warn!(jurisdiction, error = %e, "Engine output unusable; returning degraded result");
                return Ok(AnalysisResult::unavailable());
            }
        };

        for phrase in result.risky_phrases() {
            if ground_phrase(listing.as_str(), phrase) == Grounding::Ungrounded {
                warn!(jurisdiction, phrase = %phrase, "Flagged phrase not found in listing");
            }
        }

        info!(
            jurisdiction,
            confidence = result.confidence(),
            risks = result.risk_count(),
            citations = result.citations().len(),
            "Analysis validated"
        );

        Ok(result)
    }

    async fn invoke_with_retry(
        &self,
        prompt: &str,
        attempts: &AtomicU32,
    ) -> Result<String, AnalysisFailure> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            attempts.store(attempt, Ordering::Relaxed);
            debug!(attempt, "Awaiting engine response");

            let outcome = match tokio::time::timeout(self.config.timeout, self.engine.invoke(prompt)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(EngineError::Timeout(self.config.timeout)),
            };

            match outcome {
                Ok(raw) => return Ok(raw),
                Err(e) if e.is_transient() && attempt <= self.config.max_retries => {
                    let wait = backoff_delay(
                        attempt - 1,
                        self.config.retry_base_delay,
                        self.config.max_retry_delay,
                    );
                    warn!(attempt, error = %e, wait = ?wait, "Engine call failed; retrying");
                    tokio::time::sleep(wait).await;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Engine call failed; giving up");
                    return Err(AnalysisFailure {
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }
}
