//! Error taxonomy for the crawl, store and delivery layers.

use thiserror::Error;

/// A single outbound page fetch failed.
///
/// Retry policy belongs to callers; the fetch layer never retries.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not complete (connection, DNS, timeout).
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The server answered with a non-2xx status.
    #[error("unexpected HTTP status {status} for {url}")]
    Http { status: u16, url: String },
}

/// Delivery of a notification to one subscriber failed.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The recipient revoked access to the delivery channel. Terminal:
    /// the subscriber is pruned and the send is never retried.
    #[error("recipient revoked access")]
    Revoked,
    /// Any other delivery failure. Logged and skipped without removal.
    #[error("delivery failed: {0}")]
    Transient(String),
}

/// A persistent-store operation failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("malformed stored record: {0}")]
    Corrupt(String),
}
