//! Shared fixtures for unit tests: fake backends, listing builders, DOCX builders.

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use zip::write::SimpleFileOptions;

use crate::config::Config;
use crate::errors::AppError;
use crate::generation::prompts::GAP_STEP;
use crate::listings::fetcher::{ListingSource, SearchQuery};
use crate::listings::models::{Highlight, ListingSet, NormalizedListing, RawListing};
use crate::llm_client::{LlmError, TextGenerator};
use crate::state::AppState;
use crate::trace::TraceSink;

pub fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("JSEARCH_API_KEY".to_string(), "js-key".to_string()),
        ("GEMINI_API_KEY".to_string(), "gm-key".to_string()),
    ]);
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

pub fn test_state(
    config: Config,
    listings: Arc<dyn ListingSource>,
    generator: Arc<dyn TextGenerator>,
) -> AppState {
    AppState {
        config,
        listings,
        generator,
        trace: TraceSink::disabled(),
    }
}

pub fn raw_listing(title: &str, employer: &str) -> RawListing {
    json!({
        "job_title": title,
        "employer_name": employer,
        "job_employment_type": "FULLTIME",
        "apply_options": [{"publisher": "LinkedIn", "apply_link": "https://linkedin.example/jobs/1"}],
        "job_description": format!("{title} role at {employer}"),
        "job_location": "Remote",
        "job_highlights": {"Qualifications": ["SQL"]}
    })
}

pub fn listing_set(pairs: &[(&str, &str)]) -> ListingSet {
    let mut set = ListingSet::new();
    for (title, employer) in pairs {
        set.push(NormalizedListing {
            job_title: title.to_string(),
            employer: employer.to_string(),
            employment_type: "FULLTIME".to_string(),
            apply_options: vec![],
            description: String::new(),
            location: "Remote".to_string(),
            qualifications: Highlight::Absent,
            responsibilities: Highlight::Absent,
        });
    }
    set
}

/// Listing source returning a fixed result and counting searches.
pub struct FakeListingSource {
    result: Result<Vec<RawListing>, String>,
    queries: Mutex<Vec<SearchQuery>>,
}

impl FakeListingSource {
    pub fn returning(listings: Vec<RawListing>) -> Self {
        Self {
            result: Ok(listings),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ListingSource for FakeListingSource {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawListing>, AppError> {
        self.queries.lock().unwrap().push(query.clone());
        self.result.clone().map_err(AppError::Network)
    }
}

/// Generator answering `"advice for <employer>"`, with per-employer failures and delays.
#[derive(Default)]
pub struct FakeGenerator {
    failing: Vec<String>,
    timing_out: Vec<String>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn echo_employer() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, employer: &str) -> Self {
        self.failing.push(employer.to_string());
        self
    }

    pub fn timing_out_for(mut self, employer: &str) -> Self {
        self.timing_out.push(employer.to_string());
        self
    }

    pub fn with_delay(mut self, employer: &str, delay: Duration) -> Self {
        self.delays.insert(employer.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

fn employer_in(prompt: &str) -> String {
    prompt
        .split_once(GAP_STEP)
        .and_then(|(_, rest)| rest.lines().next())
        .and_then(|line| line.rsplit_once(" at "))
        .map(|(_, employer)| employer.to_string())
        .unwrap_or_default()
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        let employer = employer_in(prompt);
        if let Some(delay) = self.delays.get(&employer) {
            tokio::time::sleep(*delay).await;
        }
        if self.timing_out.contains(&employer) {
            return Err(LlmError::Timeout(Duration::from_millis(60_000)));
        }
        if self.failing.contains(&employer) {
            return Err(LlmError::Api {
                status: 500,
                message: format!("model overloaded for {employer}"),
            });
        }
        Ok(format!("advice for {employer}"))
    }
}

/// Accepts connections and never answers; returns its base URL.
pub async fn silent_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

pub fn zip_with_entry(name: &str, contents: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(name, SimpleFileOptions::default())
        .unwrap();
    writer.write_all(contents.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

/// Wraps `body` in a minimal WordprocessingML document and zips it as a .docx.
pub fn docx_from_body(body: &str) -> Vec<u8> {
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    );
    zip_with_entry("word/document.xml", &xml)
}

/// One paragraph per entry; an empty entry becomes an empty `<w:p/>`.
pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| {
            if p.is_empty() {
                "<w:p/>".to_string()
            } else {
                format!(r#"<w:p><w:r><w:t xml:space="preserve">{p}</w:t></w:r></w:p>"#)
            }
        })
        .collect();
    docx_from_body(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employer_in_reads_gap_step() {
        let prompt = format!("preamble\n\n{GAP_STEP}Analyst at Acme Corp\nStep 3: ...");
        assert_eq!(employer_in(&prompt), "Acme Corp");
    }
}
