//! Pagination-driven listing crawl.

use std::sync::Arc;

use tracing::{info, warn};
use url::Url;

use crate::models::{PetitionListing, ScrapeRequest};
use crate::scrapers::parser::parse_listing;
use crate::scrapers::{Fetch, Pacing};

/// Result of one listing crawl.
///
/// A truncated outcome is still a valid partial result: a fetch failure
/// aborts the remaining pagination, never the records already collected.
/// The flag lets operators distinguish "no more petitions" from "site
/// became unreachable".
#[derive(Debug)]
pub struct CrawlOutcome {
    pub records: Vec<PetitionListing>,
    pub truncated: bool,
}

/// Drives fetch + parse across successive listing pages until an empty
/// page is observed, with mandatory politeness pacing between pages.
pub struct Crawler {
    fetcher: Arc<dyn Fetch>,
    base: Url,
    pacing: Pacing,
}

impl Crawler {
    pub fn new(
        fetcher: Arc<dyn Fetch>,
        base_url: &str,
        pacing: Pacing,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            fetcher,
            base: Url::parse(base_url)?,
            pacing,
        })
    }

    /// Listing URL for one page of the given request.
    pub fn page_url(&self, request: &ScrapeRequest, page: u32) -> String {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("status", request.status.as_str())
            .append_pair("sort", &request.sort)
            .append_pair("order", request.order.as_str())
            .append_pair("page", &page.to_string());
        url.to_string()
    }

    /// Crawl all pages of the request, concatenating their records.
    pub async fn crawl(&self, request: &ScrapeRequest) -> CrawlOutcome {
        let mut records = Vec::new();
        let mut page = 1u32;

        loop {
            let url = self.page_url(request, page);
            let html = match self.fetcher.fetch_text(&url).await {
                Ok(html) => html,
                Err(err) => {
                    warn!(
                        status = request.status.as_str(),
                        page,
                        collected = records.len(),
                        error = %err,
                        "listing fetch failed; aborting remaining pages"
                    );
                    return CrawlOutcome {
                        records,
                        truncated: true,
                    };
                }
            };

            let batch = parse_listing(&html, &self.base);
            info!(
                status = request.status.as_str(),
                sort = %request.sort,
                order = request.order.as_str(),
                page,
                count = batch.len(),
                "listing page scraped"
            );

            if batch.is_empty() {
                break;
            }
            records.extend(batch);

            self.pacing.wait().await;
            page += 1;
        }

        CrawlOutcome {
            records,
            truncated: false,
        }
    }
}
