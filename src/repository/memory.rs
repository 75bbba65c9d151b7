//! In-memory repositories for tests and dry runs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::{Petition, PetitionDetail, PetitionListing, Subscriber};
use crate::repository::{PetitionRepository, SubscriberRepository};

#[derive(Default)]
pub struct InMemoryPetitionRepository {
    records: RwLock<BTreeMap<String, Petition>>,
}

impl InMemoryPetitionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PetitionRepository for InMemoryPetitionRepository {
    async fn upsert_batch(&self, records: &[PetitionListing]) -> Result<Vec<String>, StoreError> {
        let mut store = self.records.write().await;
        let mut created = Vec::new();
        for listing in records {
            let now = Utc::now();
            match store.get_mut(&listing.number) {
                Some(existing) => existing.apply_listing(listing.clone(), now),
                None => {
                    created.push(listing.number.clone());
                    store.insert(
                        listing.number.clone(),
                        Petition::from_listing(listing.clone(), now),
                    );
                }
            }
        }
        Ok(created)
    }

    async fn merge_details(
        &self,
        number: &str,
        detail: &PetitionDetail,
    ) -> Result<(), StoreError> {
        let mut store = self.records.write().await;
        if let Some(petition) = store.get_mut(number) {
            petition.apply_detail(detail, Utc::now());
        }
        Ok(())
    }

    async fn get(&self, number: &str) -> Result<Option<Petition>, StoreError> {
        Ok(self.records.read().await.get(number).cloned())
    }

    async fn missing_details(&self, status_label: &str) -> Result<Vec<Petition>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|petition| petition.status == status_label && petition.needs_details())
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemorySubscriberRepository {
    subscribers: RwLock<BTreeMap<i64, Subscriber>>,
}

impl InMemorySubscriberRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, subscriber: Subscriber) {
        self.subscribers
            .write()
            .await
            .insert(subscriber.id, subscriber);
    }
}

#[async_trait]
impl SubscriberRepository for InMemorySubscriberRepository {
    async fn list(&self) -> Result<Vec<Subscriber>, StoreError> {
        Ok(self.subscribers.read().await.values().cloned().collect())
    }

    async fn remove(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.subscribers.write().await.remove(&id).is_some())
    }
}
