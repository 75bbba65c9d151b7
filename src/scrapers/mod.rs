//! Listing crawl, detail enrichment and the HTTP layer beneath them.

mod crawl;
mod enrich;
mod http_client;
mod pacing;
pub mod parser;

pub use crawl::{CrawlOutcome, Crawler};
pub use enrich::DetailEnricher;
pub use http_client::{Fetch, HttpFetcher};
pub use pacing::Pacing;
