// Job listings: search API client, raw → normalized projection, listing search endpoint.

pub mod fetcher;
pub mod handlers;
pub mod models;
pub mod normalizer;
