//! petwatch - petition monitoring and notification system.
//!
//! Crawls the public petition listing, reconciles records against the local
//! store, enriches newly appeared petitions from their detail pages and fans
//! out notifications to subscribers.

// Model types use `from_str` methods that return Option<Self>,
// not Result<Self, Error> as std::str::FromStr requires.
#![allow(clippy::should_implement_trait)]

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod repository;
pub mod scrapers;
pub mod services;
pub mod utils;
