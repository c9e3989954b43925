use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use relay_core::Subscription;
use relay_storage::{StorageError, SubscriptionStorage};

#[derive(Debug, Default)]
pub struct MemorySubscriptionStorage {
    subscriptions: DashMap<Uuid, Subscription>,
}

impl MemorySubscriptionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStorage for MemorySubscriptionStorage {
    async fn create(&self, subscription: Subscription) -> Result<Subscription, StorageError> {
        self.subscriptions
            .insert(subscription.id, subscription.clone());
        Ok(subscription)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Subscription>, StorageError> {
        Ok(self.subscriptions.get(&id).map(|r| r.clone()))
    }

    async fn update(&self, subscription: Subscription) -> Result<Subscription, StorageError> {
        if !self.subscriptions.contains_key(&subscription.id) {
            return Err(StorageError::NotFound);
        }
        self.subscriptions
            .insert(subscription.id, subscription.clone());
        Ok(subscription)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StorageError> {
        self.subscriptions
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Subscription>, StorageError> {
        Ok(self.subscriptions.iter().map(|r| r.value().clone()).collect())
    }

    async fn list_for_channel(&self, channel_name: &str) -> Result<Vec<Subscription>, StorageError> {
        Ok(self
            .subscriptions
            .iter()
            .filter(|r| {
                r.value()
                    .filter_groups
                    .iter()
                    .any(|g| g.channel_name == channel_name)
            })
            .map(|r| r.value().clone())
            .collect())
    }

    async fn list_cloudevent_subscribers(&self) -> Result<Vec<Subscription>, StorageError> {
        Ok(self
            .subscriptions
            .iter()
            .filter(|r| r.value().send_cloudevents && !r.value().cloud_event_filter_groups.is_empty())
            .map(|r| r.value().clone())
            .collect())
    }
}
