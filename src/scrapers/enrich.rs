//! Detail-page enrichment.

use std::sync::Arc;

use tracing::{info, warn};

use crate::models::PetitionDetail;
use crate::scrapers::parser::parse_detail;
use crate::scrapers::Fetch;

/// Fetches a petition's detail page and extracts the fields unavailable on
/// the listing page.
///
/// A fetch failure degrades to an empty detail rather than an error;
/// callers must treat empty fields as "enrichment unavailable", not as a
/// reliable absence signal.
pub struct DetailEnricher {
    fetcher: Arc<dyn Fetch>,
}

impl DetailEnricher {
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self { fetcher }
    }

    pub async fn enrich(&self, link: &str, number: &str) -> PetitionDetail {
        match self.fetcher.fetch_text(link).await {
            Ok(html) => {
                let detail = parse_detail(&html);
                info!(number, url = link, "petition details scraped");
                detail
            }
            Err(err) => {
                warn!(
                    number,
                    url = link,
                    error = %err,
                    "detail fetch failed; details left empty"
                );
                PetitionDetail::default()
            }
        }
    }
}
