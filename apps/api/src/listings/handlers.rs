use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::generation::pipeline::{fetch_listings, FetchedListings};
use crate::listings::fetcher::SearchQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListingSearchRequest {
    pub job_title: String,
    #[serde(default)]
    pub location: String,
    pub country: Option<String>,
}

/// POST /api/v1/listings
///
/// Searches and normalizes listings without generating advice.
pub async fn handle_search_listings(
    State(state): State<AppState>,
    Json(request): Json<ListingSearchRequest>,
) -> Result<Json<FetchedListings>, AppError> {
    if request.job_title.trim().is_empty() {
        return Err(AppError::Validation("job_title cannot be empty".to_string()));
    }

    let country = request
        .country
        .unwrap_or_else(|| state.config.search_country.clone());
    let query = SearchQuery::for_role(&request.job_title, &request.location, country);

    Ok(Json(fetch_listings(&state, query).await?))
}
