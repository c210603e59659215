// Advice generation: prompt assembly, per-listing LLM calls, end-to-end pipeline.
// All LLM calls go through llm_client::TextGenerator. No direct API calls here.

pub mod advisor;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
