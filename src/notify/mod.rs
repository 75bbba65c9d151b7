//! Notification rendering, delivery and fan-out.

pub mod callback;
mod fanout;
pub mod template;
mod telegram;

use async_trait::async_trait;

pub use fanout::{BroadcastOutcome, NotificationFanout};
pub use telegram::TelegramNotifier;

use crate::error::DeliveryError;
use crate::models::{Petition, Subscriber};

/// One delivery channel endpoint.
///
/// Implementations decide how a petition is rendered for their channel;
/// the fan-out only cares about the delivery error taxonomy.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_petition(
        &self,
        subscriber: &Subscriber,
        petition: &Petition,
    ) -> Result<(), DeliveryError>;
}
