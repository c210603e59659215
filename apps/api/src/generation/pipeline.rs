//! Advice pipeline: runs one request end to end.
//!
//! Flow: extract résumé → search listings → normalize → generate advice.
//!
//! The résumé is parsed first so an unreadable upload fails before any
//! outbound call is made.

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::generation::advisor::{generate_advice, AdviceOptions, AdviceReport, FailurePolicy};
use crate::listings::fetcher::SearchQuery;
use crate::listings::models::{ListingSet, SkippedListing};
use crate::listings::normalizer::{normalize_listings, normalize_listings_lenient};
use crate::resume::extractor::extract_resume;
use crate::resume::ResumeText;
use crate::state::AppState;
use crate::trace::NORMALIZED_LISTINGS_FILE;

/// Inputs collected from the job search form.
#[derive(Debug, Clone)]
pub struct AdviceRequest {
    pub job_title: String,
    pub location: String,
    /// Overrides the configured search country when set.
    pub country: Option<String>,
    pub resume: Bytes,
}

impl AdviceRequest {
    pub fn search_query(&self, default_country: &str) -> SearchQuery {
        let country = self
            .country
            .clone()
            .unwrap_or_else(|| default_country.to_string());
        SearchQuery::for_role(&self.job_title, &self.location, country)
    }
}

/// Listings found for a query, plus any the lenient normalizer dropped.
#[derive(Debug, Clone, Serialize)]
pub struct FetchedListings {
    pub query: SearchQuery,
    pub listings: ListingSet,
    pub skipped: Vec<SkippedListing>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub query: SearchQuery,
    pub skipped_listings: Vec<SkippedListing>,
    #[serde(flatten)]
    pub report: AdviceReport,
}

impl PipelineOutput {
    pub fn combined_text(&self) -> String {
        self.report.combined_text()
    }
}

/// Searches and normalizes. Under `Abort` one malformed listing fails the search;
/// under `BestEffort` it is skipped and reported.
pub async fn fetch_listings(
    state: &AppState,
    query: SearchQuery,
) -> Result<FetchedListings, AppError> {
    let raw = state.listings.search(&query).await?;

    let (listings, skipped) = match state.config.failure_policy {
        FailurePolicy::Abort => (normalize_listings(&raw)?, Vec::new()),
        FailurePolicy::BestEffort => normalize_listings_lenient(&raw),
    };

    debug!("Listing keys: {:?}", listings.keys().collect::<Vec<_>>());
    state.trace.write_json(NORMALIZED_LISTINGS_FILE, &listings).await;

    Ok(FetchedListings {
        query,
        listings,
        skipped,
    })
}

/// Runs the résumé extractor on the blocking pool.
pub async fn extract_resume_blocking(resume: Bytes) -> Result<ResumeText, AppError> {
    tokio::task::spawn_blocking(move || extract_resume(&resume))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("resume extraction task failed: {e}")))?
}

pub async fn run_pipeline(
    state: &AppState,
    request: AdviceRequest,
) -> Result<PipelineOutput, AppError> {
    if request.job_title.trim().is_empty() {
        return Err(AppError::Validation("job_title cannot be empty".to_string()));
    }

    let resume = extract_resume_blocking(request.resume.clone()).await?;
    info!(
        "Resume extracted: {} paragraphs",
        resume.paragraphs().len()
    );

    let query = request.search_query(&state.config.search_country);
    let fetched = fetch_listings(state, query).await?;
    info!(
        "Found {} listings for {:?} ({} skipped)",
        fetched.listings.len(),
        fetched.query.query,
        fetched.skipped.len()
    );

    let report = generate_advice(
        state.generator.as_ref(),
        &resume,
        &fetched.listings,
        &AdviceOptions::from(&state.config),
        &state.trace,
    )
    .await?;

    Ok(PipelineOutput {
        query: fetched.query,
        skipped_listings: fetched.skipped,
        report,
    })
}
