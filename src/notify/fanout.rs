//! Rate-paced broadcast with dead-subscriber pruning.

use std::sync::Arc;

use tracing::{error, warn};

use crate::error::{DeliveryError, StoreError};
use crate::models::Petition;
use crate::notify::Notifier;
use crate::repository::SubscriberRepository;
use crate::scrapers::Pacing;

/// Outcome of one broadcast.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// Subscribers the notification reached.
    pub delivered: usize,
    /// Subscribers removed because delivery is permanently impossible.
    pub pruned: usize,
    /// Subscribers skipped on a transient failure; not retried this run.
    pub skipped: usize,
}

/// Delivers one petition's notification to every current subscriber.
///
/// The subscriber set is read once at the start of a broadcast; additions
/// made while the broadcast runs are picked up by the next one. Delivery to
/// each subscriber is independent: a failure never aborts the rest.
pub struct NotificationFanout {
    notifier: Arc<dyn Notifier>,
    subscribers: Arc<dyn SubscriberRepository>,
    pacing: Pacing,
}

impl NotificationFanout {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        subscribers: Arc<dyn SubscriberRepository>,
        pacing: Pacing,
    ) -> Self {
        Self {
            notifier,
            subscribers,
            pacing,
        }
    }

    pub async fn broadcast(&self, petition: &Petition) -> Result<BroadcastOutcome, StoreError> {
        let snapshot = self.subscribers.list().await?;
        let mut outcome = BroadcastOutcome::default();

        for (index, subscriber) in snapshot.iter().enumerate() {
            if index > 0 {
                self.pacing.wait().await;
            }

            match self.notifier.send_petition(subscriber, petition).await {
                Ok(()) => outcome.delivered += 1,
                Err(DeliveryError::Revoked) => {
                    warn!(
                        subscriber = subscriber.id,
                        number = %petition.number,
                        "subscriber revoked access; pruning"
                    );
                    match self.subscribers.remove(subscriber.id).await {
                        Ok(_) => outcome.pruned += 1,
                        Err(err) => {
                            error!(
                                subscriber = subscriber.id,
                                error = %err,
                                "failed to prune revoked subscriber"
                            );
                            outcome.skipped += 1;
                        }
                    }
                }
                Err(err) => {
                    warn!(
                        subscriber = subscriber.id,
                        number = %petition.number,
                        error = %err,
                        "delivery failed; skipping subscriber"
                    );
                    outcome.skipped += 1;
                }
            }
        }

        Ok(outcome)
    }
}
