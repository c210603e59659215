mod config;
mod errors;
mod generation;
mod listings;
mod llm_client;
mod resume;
mod routes;
mod state;
mod trace;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::listings::fetcher::JSearchClient;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::trace::TraceSink;

#[tokio::main]
async fn main() -> Result<()> {
    // Missing API keys are fatal
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobgap v{}", env!("CARGO_PKG_VERSION"));

    let trace = TraceSink::new(config.trace_dir.clone());
    if trace.is_enabled() {
        info!("Tracing pipeline artifacts to {:?}", config.trace_dir);
    }

    let listings = JSearchClient::new(&config, trace.clone())?;
    info!(
        "Listing search initialized (country: {}, timeout: {:?})",
        config.search_country, config.search_timeout
    );

    let generator = LlmClient::new(&config)?;
    info!(
        "LLM client initialized (model: {}, timeout: {:?}, concurrency: {}, policy: {:?})",
        generator.model(),
        config.generation_timeout,
        config.generation_concurrency,
        config.failure_policy
    );

    let state = AppState {
        config: config.clone(),
        listings: Arc::new(listings),
        generator: Arc::new(generator),
        trace,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
