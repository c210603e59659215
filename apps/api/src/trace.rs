//! Optional on-disk tracing of pipeline artifacts: the raw search response,
//! the normalized listing set, and an append-only advice log.
//!
//! Write failures are logged and never fail a request.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

pub const SEARCH_RESPONSE_FILE: &str = "search_response.json";
pub const NORMALIZED_LISTINGS_FILE: &str = "normalized_listings.json";
pub const ADVICE_LOG_FILE: &str = "advice_log.txt";

#[derive(Debug, Clone, Default)]
pub struct TraceSink {
    dir: Option<PathBuf>,
}

impl TraceSink {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    /// Overwrites `file_name` in the trace directory with pretty-printed JSON.
    pub async fn write_json<T: Serialize>(&self, file_name: &str, value: &T) {
        let Some(dir) = &self.dir else { return };

        let body = match serde_json::to_vec_pretty(value) {
            Ok(body) => body,
            Err(e) => {
                warn!("Could not serialize trace file {file_name}: {e}");
                return;
            }
        };

        let path = dir.join(file_name);
        let result = async {
            tokio::fs::create_dir_all(dir).await?;
            tokio::fs::write(&path, body).await
        }
        .await;

        match result {
            Ok(()) => debug!("Wrote trace file {}", path.display()),
            Err(e) => warn!("Could not write trace file {}: {e}", path.display()),
        }
    }

    /// Appends one advice response to the advice log, with no separator.
    pub async fn append_advice(&self, text: &str) {
        let Some(dir) = &self.dir else { return };

        let path = dir.join(ADVICE_LOG_FILE);
        if let Err(e) = append(dir, &path, text).await {
            warn!("Could not append to advice log {}: {e}", path.display());
        }
    }
}

async fn append(dir: &Path, path: &Path, text: &str) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(text.as_bytes()).await?;
    file.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_disabled_sink_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let sink = TraceSink::disabled();
        sink.write_json(SEARCH_RESPONSE_FILE, &json!({"data": []})).await;
        sink.append_advice("advice").await;
        assert!(!sink.is_enabled());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_write_json_creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let trace_dir = dir.path().join("nested");
        let sink = TraceSink::new(Some(trace_dir.clone()));

        sink.write_json(SEARCH_RESPONSE_FILE, &json!({"data": [1]})).await;
        sink.write_json(SEARCH_RESPONSE_FILE, &json!({"data": [2]})).await;

        let written = std::fs::read_to_string(trace_dir.join(SEARCH_RESPONSE_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value, json!({"data": [2]}));
    }

    #[tokio::test]
    async fn test_advice_log_appends_without_separator() {
        let dir = tempfile::tempdir().unwrap();
        let sink = TraceSink::new(Some(dir.path().to_path_buf()));

        sink.append_advice("first").await;
        sink.append_advice("second").await;

        let log = std::fs::read_to_string(dir.path().join(ADVICE_LOG_FILE)).unwrap();
        assert_eq!(log, "firstsecond");
    }
}
