//! Orchestration of crawl, reconciliation, enrichment and broadcast.

mod orchestrator;

pub use orchestrator::ScrapeOrchestrator;
