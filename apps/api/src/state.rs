use std::sync::Arc;

use crate::config::Config;
use crate::listings::fetcher::ListingSource;
use crate::llm_client::TextGenerator;
use crate::trace::TraceSink;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once in `main`; there are no process-wide client singletons.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Job search backend. Default: `JSearchClient`.
    pub listings: Arc<dyn ListingSource>,
    /// Advice generation backend. Default: `LlmClient` (Gemini).
    pub generator: Arc<dyn TextGenerator>,
    pub trace: TraceSink,
}
