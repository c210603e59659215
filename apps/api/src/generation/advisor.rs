//! Advice Generator: one LLM call per listing, results kept in listing order.
//!
//! `FailurePolicy::Abort` stops at the first failed listing.
//! `FailurePolicy::BestEffort` records the failure and carries on.
//! With `concurrency > 1` several prompts are in flight at once; results are still
//! yielded by position, so the report order never depends on completion order.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::generation::prompts::build_prompt;
use crate::listings::models::ListingSet;
use crate::llm_client::{LlmError, TextGenerator};
use crate::resume::ResumeText;
use crate::trace::TraceSink;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// All-or-nothing: the first failure aborts the batch.
    #[default]
    Abort,
    /// Every listing is attempted; failures are reported alongside successes.
    BestEffort,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" | "all_or_nothing" => Ok(FailurePolicy::Abort),
            "best_effort" | "best-effort" => Ok(FailurePolicy::BestEffort),
            other => Err(format!(
                "unknown failure policy '{other}' (expected 'abort' or 'best_effort')"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AdviceOptions {
    pub policy: FailurePolicy,
    pub concurrency: usize,
}

impl Default for AdviceOptions {
    fn default() -> Self {
        Self {
            policy: FailurePolicy::Abort,
            concurrency: 1,
        }
    }
}

impl From<&Config> for AdviceOptions {
    fn from(config: &Config) -> Self {
        Self {
            policy: config.failure_policy,
            concurrency: config.generation_concurrency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdviceOutcome {
    Ok { advice: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingAdvice {
    pub key: String,
    pub job_title: String,
    pub employer: String,
    #[serde(flatten)]
    pub outcome: AdviceOutcome,
}

impl ListingAdvice {
    pub fn advice(&self) -> Option<&str> {
        match &self.outcome {
            AdviceOutcome::Ok { advice } => Some(advice),
            AdviceOutcome::Failed { .. } => None,
        }
    }
}

/// Per-listing advice for one pipeline run, in listing order.
#[derive(Debug, Clone, Serialize)]
pub struct AdviceReport {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub results: Vec<ListingAdvice>,
}

impl Default for AdviceReport {
    fn default() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            results: Vec::new(),
        }
    }
}

impl AdviceReport {
    /// Successful responses concatenated directly, with no separator.
    pub fn combined_text(&self) -> String {
        self.results.iter().filter_map(|r| r.advice()).collect()
    }

    pub fn failure_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, AdviceOutcome::Failed { .. }))
            .count()
    }
}

/// Generates advice for every listing. An empty set makes no generator calls.
pub async fn generate_advice(
    generator: &dyn TextGenerator,
    resume: &ResumeText,
    listings: &ListingSet,
    options: &AdviceOptions,
    trace: &TraceSink,
) -> Result<AdviceReport, AppError> {
    let mut report = AdviceReport::default();

    if listings.is_empty() {
        info!("No listings to advise on");
        return Ok(report);
    }

    info!(
        "Generating advice for {} listings (policy={:?}, concurrency={})",
        listings.len(),
        options.policy,
        options.concurrency
    );

    // Prompts are built up front; each future then owns its prompt.
    let pending: Vec<_> = listings
        .iter()
        .map(|(key, listing)| {
            let prompt = build_prompt(resume, listing);
            async move {
                debug!("Submitting prompt for '{key}' ({} chars)", prompt.len());
                let result = generator.generate(&prompt).await;
                (key, listing, result)
            }
        })
        .collect();

    let mut outcomes = stream::iter(pending).buffered(options.concurrency.max(1));

    while let Some((key, listing, result)) = outcomes.next().await {
        let outcome = match result {
            Ok(advice) => {
                trace.append_advice(&advice).await;
                AdviceOutcome::Ok { advice }
            }
            Err(e) => {
                warn!("Advice generation failed for '{key}': {e}");
                if options.policy == FailurePolicy::Abort {
                    return Err(abort_error(key, e));
                }
                AdviceOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        report.results.push(ListingAdvice {
            key: key.to_string(),
            job_title: listing.job_title.clone(),
            employer: listing.employer.clone(),
            outcome,
        });
    }

    info!(
        "Advice generated: {} ok, {} failed",
        report.results.len() - report.failure_count(),
        report.failure_count()
    );
    Ok(report)
}

fn abort_error(key: &str, e: LlmError) -> AppError {
    match &e {
        LlmError::Timeout(_) => AppError::Timeout(format!("advice for '{key}': {e}")),
        _ => AppError::Generation {
            listing: key.to_string(),
            reason: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{listing_set, FakeGenerator};
    use std::time::Duration;

    fn resume() -> ResumeText {
        ResumeText::from_paragraphs(["Experienced engineer.", "Skilled in X."])
    }

    #[tokio::test]
    async fn test_empty_listing_set_makes_no_calls() {
        let generator = FakeGenerator::echo_employer();
        let report = generate_advice(
            &generator,
            &resume(),
            &ListingSet::new(),
            &AdviceOptions::default(),
            &TraceSink::disabled(),
        )
        .await
        .unwrap();

        assert_eq!(report.combined_text(), "");
        assert!(report.results.is_empty());
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_two_listings_concatenate_without_separator() {
        let generator = FakeGenerator::echo_employer();
        let listings = listing_set(&[("Analyst", "Alpha"), ("Engineer", "Beta")]);

        let report = generate_advice(
            &generator,
            &resume(),
            &listings,
            &AdviceOptions::default(),
            &TraceSink::disabled(),
        )
        .await
        .unwrap();

        assert_eq!(report.combined_text(), "advice for Alphaadvice for Beta");
        assert_eq!(report.results[0].key, "1. Analyst");
        assert_eq!(report.results[1].key, "2. Engineer");
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_abort_policy_stops_at_first_failure() {
        let generator = FakeGenerator::echo_employer().failing_for("Beta");
        let listings = listing_set(&[("A", "Alpha"), ("B", "Beta"), ("C", "Gamma")]);

        let err = generate_advice(
            &generator,
            &resume(),
            &listings,
            &AdviceOptions::default(),
            &TraceSink::disabled(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Generation { ref listing, .. } if listing == "2. B"));
        assert_eq!(generator.calls(), 2, "third listing must not be submitted");
    }

    #[tokio::test]
    async fn test_best_effort_records_failure_and_continues() {
        let generator = FakeGenerator::echo_employer().failing_for("Beta");
        let listings = listing_set(&[("A", "Alpha"), ("B", "Beta"), ("C", "Gamma")]);
        let options = AdviceOptions {
            policy: FailurePolicy::BestEffort,
            concurrency: 1,
        };

        let report = generate_advice(
            &generator,
            &resume(),
            &listings,
            &options,
            &TraceSink::disabled(),
        )
        .await
        .unwrap();

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.failure_count(), 1);
        assert!(matches!(report.results[1].outcome, AdviceOutcome::Failed { .. }));
        assert_eq!(report.combined_text(), "advice for Alphaadvice for Gamma");
    }

    #[tokio::test]
    async fn test_timeout_under_abort_is_timeout_error() {
        let generator = FakeGenerator::echo_employer().timing_out_for("Alpha");
        let listings = listing_set(&[("A", "Alpha")]);

        let err = generate_advice(
            &generator,
            &resume(),
            &listings,
            &AdviceOptions::default(),
            &TraceSink::disabled(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_parallel_generation_keeps_listing_order() {
        // First listing answers slowest; output must still follow listing order.
        let generator = FakeGenerator::echo_employer()
            .with_delay("Alpha", Duration::from_millis(60))
            .with_delay("Beta", Duration::from_millis(30));
        let listings = listing_set(&[("A", "Alpha"), ("B", "Beta"), ("C", "Gamma")]);
        let options = AdviceOptions {
            policy: FailurePolicy::Abort,
            concurrency: 3,
        };

        let report = generate_advice(
            &generator,
            &resume(),
            &listings,
            &options,
            &TraceSink::disabled(),
        )
        .await
        .unwrap();

        assert_eq!(
            report.combined_text(),
            "advice for Alphaadvice for Betaadvice for Gamma"
        );
    }

    #[tokio::test]
    async fn test_prompts_carry_title_and_employer() {
        let generator = FakeGenerator::echo_employer();
        let listings = listing_set(&[("Data Analyst", "Acme")]);

        generate_advice(
            &generator,
            &resume(),
            &listings,
            &AdviceOptions::default(),
            &TraceSink::disabled(),
        )
        .await
        .unwrap();

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Data Analyst at Acme"));
        assert!(prompts[0].contains("Experienced engineer.\nSkilled in X."));
    }

    #[tokio::test]
    async fn test_successful_advice_is_appended_to_trace_log() {
        let dir = tempfile::tempdir().unwrap();
        let generator = FakeGenerator::echo_employer();
        let listings = listing_set(&[("A", "Alpha"), ("B", "Beta")]);

        generate_advice(
            &generator,
            &resume(),
            &listings,
            &AdviceOptions::default(),
            &TraceSink::new(Some(dir.path().to_path_buf())),
        )
        .await
        .unwrap();

        let log =
            std::fs::read_to_string(dir.path().join(crate::trace::ADVICE_LOG_FILE)).unwrap();
        assert_eq!(log, "advice for Alphaadvice for Beta");
    }

    #[test]
    fn test_failure_policy_parsing() {
        assert_eq!("abort".parse::<FailurePolicy>(), Ok(FailurePolicy::Abort));
        assert_eq!(
            "Best-Effort".parse::<FailurePolicy>(),
            Ok(FailurePolicy::BestEffort)
        );
        assert!("retry".parse::<FailurePolicy>().is_err());
    }

    #[test]
    fn test_report_serializes_outcome_status() {
        let report = AdviceReport {
            results: vec![ListingAdvice {
                key: "1. A".into(),
                job_title: "A".into(),
                employer: "Alpha".into(),
                outcome: AdviceOutcome::Failed {
                    reason: "boom".into(),
                },
            }],
            ..AdviceReport::default()
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["results"][0]["status"], "failed");
        assert_eq!(value["results"][0]["reason"], "boom");
    }
}
