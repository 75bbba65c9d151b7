//! Persistence boundaries.
//!
//! The store technology is a collaborator, not a feature of this subsystem:
//! components talk to these traits and any durable keyed store can sit
//! behind them. A SQLite implementation ships for real runs and an
//! in-memory one for tests.

mod memory;
mod sqlite;

use async_trait::async_trait;

pub use memory::{InMemoryPetitionRepository, InMemorySubscriberRepository};
pub use sqlite::SqliteStore;

use crate::error::StoreError;
use crate::models::{Petition, PetitionDetail, PetitionListing, Subscriber};

/// Petition records keyed by their natural `number`.
#[async_trait]
pub trait PetitionRepository: Send + Sync {
    /// Reconcile a scraped batch: insert unseen records, refresh listing
    /// fields of known ones. Returns the numbers that took the insert path,
    /// in batch order. The decision must come from the storage layer's own
    /// atomic insert-or-overwrite, never from a prior existence check.
    async fn upsert_batch(&self, records: &[PetitionListing]) -> Result<Vec<String>, StoreError>;

    /// Additively merge detail fields into an existing record. Listing
    /// fields are never touched; empty detail fields never overwrite
    /// populated ones.
    async fn merge_details(
        &self,
        number: &str,
        detail: &PetitionDetail,
    ) -> Result<(), StoreError>;

    async fn get(&self, number: &str) -> Result<Option<Petition>, StoreError>;

    /// All records carrying the given status label whose detail fields are
    /// still missing or empty.
    async fn missing_details(&self, status_label: &str) -> Result<Vec<Petition>, StoreError>;
}

/// The subscriber set, owned by the conversational bot layer. This
/// subsystem only snapshots it for broadcasts and prunes dead entries.
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Subscriber>, StoreError>;

    /// Remove a permanently unreachable subscriber. Returns whether an
    /// entry was actually deleted.
    async fn remove(&self, id: i64) -> Result<bool, StoreError>;
}
