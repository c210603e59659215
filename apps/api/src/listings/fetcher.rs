//! Listing Fetcher: queries the JSearch API for job listings.
//!
//! `ListingSource` is the seam; `JSearchClient` is the RapidAPI-backed implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::Config;
use crate::errors::AppError;
use crate::listings::models::RawListing;
use crate::listings::normalizer::listings_from_response;
use crate::trace::{TraceSink, SEARCH_RESPONSE_FILE};

/// Longest upstream error body echoed back in an error message.
const MAX_ERROR_BODY: usize = 300;

/// A free-text job search, e.g. `"Data Analyst in Washington, DC"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchQuery {
    pub query: String,
    pub country: String,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            country: country.into(),
        }
    }

    /// Builds `"<title> in <location>"`, or just the title when no location is given.
    pub fn for_role(job_title: &str, location: &str, country: impl Into<String>) -> Self {
        let job_title = job_title.trim();
        let location = location.trim();
        let query = if location.is_empty() {
            job_title.to_string()
        } else {
            format!("{job_title} in {location}")
        };
        Self::new(query, country)
    }
}

#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawListing>, AppError>;
}

/// JSearch (RapidAPI) client. One page of results, all posting dates.
#[derive(Clone)]
pub struct JSearchClient {
    client: Client,
    base_url: String,
    host: String,
    api_key: String,
    trace: TraceSink,
}

impl JSearchClient {
    pub fn new(config: &Config, trace: TraceSink) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(config.search_timeout).build()?,
            base_url: config.jsearch_base_url.trim_end_matches('/').to_string(),
            host: config.jsearch_host.clone(),
            api_key: config.jsearch_api_key.clone(),
            trace,
        })
    }
}

#[async_trait]
impl ListingSource for JSearchClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawListing>, AppError> {
        info!("Searching listings: {:?} ({})", query.query, query.country);

        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.host)
            .query(&[
                ("query", query.query.as_str()),
                ("page", "1"),
                ("num_pages", "1"),
                ("country", query.country.as_str()),
                ("date_posted", "all"),
            ])
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        let body = response.text().await.map_err(request_error)?;

        if !status.is_success() {
            return Err(AppError::Network(format!(
                "job search returned {status}: {}",
                truncate(&body, MAX_ERROR_BODY)
            )));
        }

        let body: Value = serde_json::from_str(&body)
            .map_err(|e| AppError::Format(format!("job search body is not JSON: {e}")))?;

        self.trace.write_json(SEARCH_RESPONSE_FILE, &body).await;

        let listings = listings_from_response(body)?;
        debug!("Job search returned {} listings", listings.len());
        Ok(listings)
    }
}

fn request_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(format!("job search: {e}"))
    } else {
        AppError::Network(format!("job search: {e}"))
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
