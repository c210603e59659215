use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// One record from the search API's `data` array, left untyped until normalization.
pub type RawListing = serde_json::Value;

/// A place to apply for a listing, kept exactly as the search API sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplyOption(serde_json::Value);

impl ApplyOption {
    /// The publisher name, when the entry carries one as a string.
    pub fn publisher(&self) -> Option<&str> {
        self.0.get("publisher").and_then(serde_json::Value::as_str)
    }
}

/// An optional highlight list from the listing.
///
/// `Absent` means the search API never sent the list; `Present(vec![])` means it
/// sent an empty one. Serialized as `null` and `[]` respectively.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Highlight {
    Present(Vec<String>),
    #[default]
    Absent,
}

#[cfg(test)]
impl Highlight {
    pub fn is_absent(&self) -> bool {
        matches!(self, Highlight::Absent)
    }

    pub fn items(&self) -> Option<&[String]> {
        match self {
            Highlight::Present(items) => Some(items),
            Highlight::Absent => None,
        }
    }
}

impl From<Option<Vec<String>>> for Highlight {
    fn from(value: Option<Vec<String>>) -> Self {
        value.map(Highlight::Present).unwrap_or_default()
    }
}

impl Serialize for Highlight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Highlight::Present(items) => items.serialize(serializer),
            Highlight::Absent => serializer.serialize_none(),
        }
    }
}

/// Fixed-schema view of a single listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedListing {
    pub job_title: String,
    pub employer: String,
    pub employment_type: String,
    pub apply_options: Vec<ApplyOption>,
    pub description: String,
    pub location: String,
    pub qualifications: Highlight,
    pub responsibilities: Highlight,
}

/// Listings keyed by `"<position>. <title>"`, in search API order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingSet {
    entries: Vec<(String, NormalizedListing)>,
}

impl ListingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listing, keyed by its 1-based position in the set.
    pub fn push(&mut self, listing: NormalizedListing) -> &str {
        let key = format!("{}. {}", self.entries.len() + 1, listing.job_title);
        self.entries.push((key, listing));
        &self.entries[self.entries.len() - 1].0
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NormalizedListing)> {
        self.entries.iter().map(|(key, listing)| (key.as_str(), listing))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

impl Serialize for ListingSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, listing) in &self.entries {
            map.serialize_entry(key, listing)?;
        }
        map.end()
    }
}

/// A listing the lenient normalizer dropped, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedListing {
    /// 1-based position in the search response.
    pub position: usize,
    pub reason: String,
}
