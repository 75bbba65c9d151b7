//! The scrape pipeline.
//!
//! One orchestrator run is: crawl every listing page of a status, reconcile
//! the batch into the store, then walk the records the store decided were
//! newly created, enriching and broadcasting each. The store's insert
//! decision is the only "is this new" signal; the orchestrator never checks
//! existence itself.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::StoreError;
use crate::models::{PetitionStatus, ScrapeRequest};
use crate::notify::NotificationFanout;
use crate::repository::PetitionRepository;
use crate::scrapers::{Crawler, DetailEnricher, Pacing};

pub struct ScrapeOrchestrator {
    crawler: Crawler,
    enricher: DetailEnricher,
    petitions: Arc<dyn PetitionRepository>,
    /// Absent when no delivery channel is configured; enrichment still runs.
    fanout: Option<NotificationFanout>,
    /// Status whose new records trigger enrichment and broadcast.
    tracked_status: PetitionStatus,
    /// Stored free-text label equivalent to the tracked status, used to
    /// select backfill candidates.
    tracked_status_label: String,
    record_pacing: Pacing,
    backfill_pacing: Pacing,
}

impl ScrapeOrchestrator {
    pub fn new(
        crawler: Crawler,
        enricher: DetailEnricher,
        petitions: Arc<dyn PetitionRepository>,
        fanout: Option<NotificationFanout>,
        tracked_status_label: String,
        record_pacing: Pacing,
        backfill_pacing: Pacing,
    ) -> Self {
        Self {
            crawler,
            enricher,
            petitions,
            fanout,
            tracked_status: PetitionStatus::Active,
            tracked_status_label,
            record_pacing,
            backfill_pacing,
        }
    }

    /// Crawl one status and reconcile the result. Newly created records of
    /// the tracked status are enriched and broadcast, one at a time, with
    /// pacing between records.
    pub async fn scrape_by_status(&self, status: PetitionStatus) -> Result<(), StoreError> {
        let request = ScrapeRequest::by_status(status);
        let outcome = self.crawler.crawl(&request).await;
        if outcome.truncated {
            warn!(
                status = status.as_str(),
                collected = outcome.records.len(),
                "crawl truncated; reconciling partial batch"
            );
        }

        let created = self.petitions.upsert_batch(&outcome.records).await?;
        info!(
            status = status.as_str(),
            scraped = outcome.records.len(),
            created = created.len(),
            "batch reconciled"
        );

        if status != self.tracked_status {
            return Ok(());
        }

        for (index, number) in created.iter().enumerate() {
            if index > 0 {
                self.record_pacing.wait().await;
            }
            self.enrich_and_notify(number).await?;
        }

        Ok(())
    }

    /// Re-attempt enrichment for stored records of the tracked status whose
    /// detail fields are still empty. No notifications are sent; these
    /// records were already broadcast when first seen.
    pub async fn backfill_missing_details(&self) -> Result<(), StoreError> {
        let candidates = self
            .petitions
            .missing_details(&self.tracked_status_label)
            .await?;
        info!(count = candidates.len(), "detail backfill started");

        for (index, petition) in candidates.iter().enumerate() {
            if index > 0 {
                self.backfill_pacing.wait().await;
            }

            let detail = self.enricher.enrich(&petition.link, &petition.number).await;
            if detail.is_empty() {
                continue;
            }
            self.petitions
                .merge_details(&petition.number, &detail)
                .await?;
        }

        Ok(())
    }

    async fn enrich_and_notify(&self, number: &str) -> Result<(), StoreError> {
        let Some(petition) = self.petitions.get(number).await? else {
            // The record was just inserted; absence here means the store
            // changed underneath us.
            warn!(number, "newly created record vanished before enrichment");
            return Ok(());
        };

        let detail = self.enricher.enrich(&petition.link, number).await;
        if !detail.is_empty() {
            self.petitions.merge_details(number, &detail).await?;
        }

        let Some(fanout) = &self.fanout else {
            info!(number, "no delivery channel configured; skipping broadcast");
            return Ok(());
        };

        // Broadcast the enriched state when the merge succeeded, the
        // pre-enrichment state otherwise.
        let current = self.petitions.get(number).await?.unwrap_or(petition);
        let outcome = fanout.broadcast(&current).await?;
        info!(
            number,
            delivered = outcome.delivered,
            pruned = outcome.pruned,
            skipped = outcome.skipped,
            "new petition broadcast"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::error::{DeliveryError, FetchError};
    use crate::models::{Petition, PetitionListing, Subscriber};
    use crate::notify::Notifier;
    use crate::repository::{InMemoryPetitionRepository, InMemorySubscriberRepository};
    use crate::scrapers::Fetch;

    /// Serves canned bodies by URL substring; listing pages and detail
    /// pages live in the same map.
    struct MapFetcher {
        routes: HashMap<String, String>,
    }

    #[async_trait]
    impl Fetch for MapFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
            for (needle, body) in &self.routes {
                if url.contains(needle) {
                    return Ok(body.clone());
                }
            }
            Err(FetchError::Http {
                status: 404,
                url: url.to_string(),
            })
        }
    }

    struct CountingNotifier {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        async fn send_petition(
            &self,
            _subscriber: &Subscriber,
            petition: &Petition,
        ) -> Result<(), DeliveryError> {
            self.sent.lock().unwrap().push(petition.number.clone());
            Ok(())
        }
    }

    fn listing_page(numbers: &[&str]) -> String {
        let items: String = numbers
            .iter()
            .map(|number| {
                format!(
                    r#"<div class="pet_item">
                         <a class="pet_link" href="/petition/{number}">Petition {number}</a>
                         <span class="pet_number">22/{number}</span>
                         <div class="pet_status">Триває збір підписів</div>
                       </div>"#
                )
            })
            .collect();
        format!("<html><body>{items}</body></html>")
    }

    fn detail_page(creator: &str) -> String {
        format!(
            r#"<html><body>
                 <div class="pet_date">Ініціатор: {creator}</div>
                 <div class="article"><p>Body text.</p></div>
               </body></html>"#
        )
    }

    struct Harness {
        orchestrator: ScrapeOrchestrator,
        petitions: Arc<InMemoryPetitionRepository>,
        notifier: Arc<CountingNotifier>,
    }

    async fn harness(routes: Vec<(&str, String)>) -> Harness {
        let fetcher = Arc::new(MapFetcher {
            routes: routes
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        });
        let petitions = Arc::new(InMemoryPetitionRepository::new());
        let subscribers = Arc::new(InMemorySubscriberRepository::new());
        subscribers.add(Subscriber::new(7)).await;
        let notifier = Arc::new(CountingNotifier {
            sent: Mutex::new(Vec::new()),
        });

        let fanout = NotificationFanout::new(notifier.clone(), subscribers, Pacing::none());
        let orchestrator = ScrapeOrchestrator::new(
            Crawler::new(
                fetcher.clone(),
                "https://petition.example.test",
                Pacing::none(),
            )
            .unwrap(),
            DetailEnricher::new(fetcher),
            petitions.clone(),
            Some(fanout),
            "Триває збір підписів".to_string(),
            Pacing::none(),
            Pacing::none(),
        );

        Harness {
            orchestrator,
            petitions,
            notifier,
        }
    }

    #[tokio::test]
    async fn test_new_records_are_enriched_and_broadcast() {
        let harness = harness(vec![
            ("page=1", listing_page(&["001"])),
            ("page=2", listing_page(&[])),
            ("/petition/001", detail_page("Taras")),
        ])
        .await;

        harness
            .orchestrator
            .scrape_by_status(PetitionStatus::Active)
            .await
            .unwrap();

        let stored = harness.petitions.get("22/001").await.unwrap().unwrap();
        assert_eq!(stored.creator.as_deref(), Some("Taras"));
        assert_eq!(stored.body_text.as_deref(), Some("Body text."));
        assert_eq!(*harness.notifier.sent.lock().unwrap(), vec!["22/001"]);
    }

    #[tokio::test]
    async fn test_rescrape_of_known_records_is_silent() {
        let harness = harness(vec![
            ("page=1", listing_page(&["001"])),
            ("page=2", listing_page(&[])),
            ("/petition/001", detail_page("Taras")),
        ])
        .await;

        for _ in 0..2 {
            harness
                .orchestrator
                .scrape_by_status(PetitionStatus::Active)
                .await
                .unwrap();
        }

        assert_eq!(
            harness.notifier.sent.lock().unwrap().len(),
            1,
            "only the first sighting notifies"
        );
    }

    #[tokio::test]
    async fn test_untracked_status_skips_enrichment() {
        let harness = harness(vec![
            ("page=1", listing_page(&["002"])),
            ("page=2", listing_page(&[])),
            ("/petition/002", detail_page("Lesya")),
        ])
        .await;

        harness
            .orchestrator
            .scrape_by_status(PetitionStatus::Processed)
            .await
            .unwrap();

        let stored = harness.petitions.get("22/002").await.unwrap().unwrap();
        assert!(stored.creator.is_none());
        assert!(harness.notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_enrichment_still_broadcasts_listing_state() {
        // No detail route: the detail fetch 404s and enrichment degrades
        // to empty, which is never persisted.
        let harness = harness(vec![
            ("page=1", listing_page(&["003"])),
            ("page=2", listing_page(&[])),
        ])
        .await;

        harness
            .orchestrator
            .scrape_by_status(PetitionStatus::Active)
            .await
            .unwrap();

        let stored = harness.petitions.get("22/003").await.unwrap().unwrap();
        assert!(stored.creator.is_none());
        assert!(stored.needs_details());
        assert_eq!(*harness.notifier.sent.lock().unwrap(), vec!["22/003"]);
    }

    #[tokio::test]
    async fn test_backfill_fills_missing_details_without_broadcast() {
        // The detail page is reachable, but the record is seeded directly
        // into the store with empty details, as if its first enrichment
        // attempt had failed.
        let harness = harness(vec![("/petition/004", detail_page("Ivan"))]).await;

        let listing = PetitionListing {
            number: "22/004".to_string(),
            tag: "ecology".to_string(),
            title: "Petition 004".to_string(),
            status: "Триває збір підписів".to_string(),
            vote_count: "10".to_string(),
            link: "https://petition.example.test/petition/004".to_string(),
            published_at: "01.01.2024".to_string(),
            answered_at: None,
            countdown: None,
        };
        harness.petitions.upsert_batch(&[listing]).await.unwrap();

        harness.orchestrator.backfill_missing_details().await.unwrap();

        let stored = harness.petitions.get("22/004").await.unwrap().unwrap();
        assert_eq!(stored.creator.as_deref(), Some("Ivan"));
        assert!(!stored.needs_details());
        assert!(
            harness.notifier.sent.lock().unwrap().is_empty(),
            "backfill never notifies"
        );
    }
}
