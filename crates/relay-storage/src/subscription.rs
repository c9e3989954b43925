use async_trait::async_trait;
use uuid::Uuid;

use relay_core::Subscription;

use crate::error::StorageError;

/// Storage for subscriptions. Filter groups and cloud-event filter groups are
/// owned inline on the `Subscription` value, so "update" replaces them
/// atomically along with everything else.
#[async_trait]
pub trait SubscriptionStorage: Send + Sync {
    async fn create(&self, subscription: Subscription) -> Result<Subscription, StorageError>;

    async fn get(&self, id: Uuid) -> Result<Option<Subscription>, StorageError>;

    /// Replaces the subscription wholesale, including its filter groups.
    async fn update(&self, subscription: Subscription) -> Result<Subscription, StorageError>;

    /// Deletes the subscription and cascades to its delivery responses.
    async fn delete(&self, id: Uuid) -> Result<(), StorageError>;

    async fn list(&self) -> Result<Vec<Subscription>, StorageError>;

    /// Subscriptions with at least one FilterGroup targeting `channel_name`.
    async fn list_for_channel(&self, channel_name: &str) -> Result<Vec<Subscription>, StorageError>;

    /// Subscriptions with `send_cloudevents = true` and at least one
    /// CloudEventFilterGroup.
    async fn list_cloudevent_subscribers(&self) -> Result<Vec<Subscription>, StorageError>;
}
