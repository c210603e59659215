//! Listing Normalizer: projects raw search records into `NormalizedListing`s.
//!
//! Required fields must be present and non-null. The two highlight lists are
//! optional: a missing list is `Highlight::Absent`, never an error.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::listings::models::{
    ApplyOption, Highlight, ListingSet, NormalizedListing, RawListing, SkippedListing,
};

#[derive(Debug, Deserialize)]
struct ListingRecord {
    job_title: Option<String>,
    employer_name: Option<String>,
    job_employment_type: Option<String>,
    apply_options: Option<Vec<ApplyOption>>,
    job_description: Option<String>,
    job_location: Option<String>,
    job_highlights: Option<JobHighlights>,
}

#[derive(Debug, Deserialize)]
struct JobHighlights {
    #[serde(rename = "Qualifications")]
    qualifications: Option<Vec<String>>,
    #[serde(rename = "Responsibilities")]
    responsibilities: Option<Vec<String>>,
}

/// Pulls the listing array out of a search API response body.
/// A body without a `data` array is a format error, not an empty result.
pub fn listings_from_response(body: Value) -> Result<Vec<RawListing>, AppError> {
    let mut body = match body {
        Value::Object(map) => map,
        other => {
            return Err(AppError::Format(format!(
                "search response is not a JSON object (got {})",
                json_kind(&other)
            )))
        }
    };

    match body.remove("data") {
        Some(Value::Array(listings)) => Ok(listings),
        Some(other) => Err(AppError::Format(format!(
            "search response 'data' is {}, expected an array",
            json_kind(&other)
        ))),
        None => Err(AppError::Format(
            "search response has no 'data' field".to_string(),
        )),
    }
}

/// Normalizes one raw listing. `position` is 1-based and only used in errors.
pub fn normalize_listing(position: usize, raw: &RawListing) -> Result<NormalizedListing, AppError> {
    let record = ListingRecord::deserialize(raw)
        .map_err(|e| AppError::Format(format!("listing {position}: {e}")))?;

    let (qualifications, responsibilities) = match record.job_highlights {
        Some(highlights) => (
            Highlight::from(highlights.qualifications),
            Highlight::from(highlights.responsibilities),
        ),
        None => (Highlight::Absent, Highlight::Absent),
    };

    let apply_options = required(record.apply_options, position, "apply_options")?;
    debug!(
        "Listing {position} publishers: {:?}",
        apply_options
            .iter()
            .filter_map(ApplyOption::publisher)
            .collect::<Vec<_>>()
    );

    Ok(NormalizedListing {
        job_title: required(record.job_title, position, "job_title")?,
        employer: required(record.employer_name, position, "employer_name")?,
        employment_type: required(record.job_employment_type, position, "job_employment_type")?,
        apply_options,
        description: required(record.job_description, position, "job_description")?,
        location: required(record.job_location, position, "job_location")?,
        qualifications,
        responsibilities,
    })
}

/// Normalizes every listing; the first bad listing fails the whole batch.
pub fn normalize_listings(raw: &[RawListing]) -> Result<ListingSet, AppError> {
    let mut set = ListingSet::new();
    for (i, listing) in raw.iter().enumerate() {
        set.push(normalize_listing(i + 1, listing)?);
    }
    debug!("Normalized {} listings", set.len());
    Ok(set)
}

/// Normalizes what it can and reports the rest. Survivors are numbered consecutively.
pub fn normalize_listings_lenient(raw: &[RawListing]) -> (ListingSet, Vec<SkippedListing>) {
    let mut set = ListingSet::new();
    let mut skipped = Vec::new();

    for (i, listing) in raw.iter().enumerate() {
        match normalize_listing(i + 1, listing) {
            Ok(normalized) => {
                set.push(normalized);
            }
            Err(e) => {
                warn!("Skipping listing {}: {e}", i + 1);
                skipped.push(SkippedListing {
                    position: i + 1,
                    reason: e.to_string(),
                });
            }
        }
    }

    debug!(
        "Normalized {} listings, skipped {}",
        set.len(),
        skipped.len()
    );
    (set, skipped)
}

fn required<T>(value: Option<T>, index: usize, field: &'static str) -> Result<T, AppError> {
    value.ok_or(AppError::MissingField { index, field })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
