use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;
use uuid::Uuid;

use relay_core::{CloudEventRecord, DeliveryResponse, NotificationRecord};
use relay_storage::{AuditStorage, StorageError};

#[derive(Debug, Default)]
pub struct MemoryAuditStorage {
    notifications: DashMap<Uuid, NotificationRecord>,
    cloudevents: DashMap<Uuid, CloudEventRecord>,
    cloudevent_dedup: DashMap<(String, String), Uuid>,
    responses: DashMap<Uuid, DeliveryResponse>,
}

impl MemoryAuditStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditStorage for MemoryAuditStorage {
    async fn put_notification(&self, record: NotificationRecord) -> Result<(), StorageError> {
        self.notifications.insert(record.id, record);
        Ok(())
    }

    async fn get_notification(&self, id: Uuid) -> Result<Option<NotificationRecord>, StorageError> {
        Ok(self.notifications.get(&id).map(|r| r.clone()))
    }

    async fn put_cloudevent(&self, record: CloudEventRecord) -> Result<(), StorageError> {
        let dedup_key = (record.event.id.clone(), record.event.source.clone());
        if self.cloudevent_dedup.contains_key(&dedup_key) {
            return Err(StorageError::Conflict(format!(
                "duplicate cloudevent (id={}, source={})",
                dedup_key.0, dedup_key.1
            )));
        }
        self.cloudevent_dedup.insert(dedup_key, record.id);
        self.cloudevents.insert(record.id, record);
        Ok(())
    }

    async fn get_cloudevent(&self, id: Uuid) -> Result<Option<CloudEventRecord>, StorageError> {
        Ok(self.cloudevents.get(&id).map(|r| r.clone()))
    }

    async fn cloudevent_exists(&self, event_id: &str, source: &str) -> Result<bool, StorageError> {
        Ok(self
            .cloudevent_dedup
            .contains_key(&(event_id.to_string(), source.to_string())))
    }

    async fn put_delivery_response(&self, response: DeliveryResponse) -> Result<(), StorageError> {
        self.responses.insert(response.id, response);
        Ok(())
    }

    async fn list_delivery_responses(
        &self,
        parent_id: Uuid,
    ) -> Result<Vec<DeliveryResponse>, StorageError> {
        Ok(self
            .responses
            .iter()
            .filter(|r| r.value().parent.id() == parent_id)
            .map(|r| r.value().clone())
            .collect())
    }

    async fn purge_older_than(&self, older_than: OffsetDateTime) -> Result<u64, StorageError> {
        let mut removed = 0u64;

        let stale_notifications: Vec<Uuid> = self
            .notifications
            .iter()
            .filter(|r| r.value().created_at < older_than)
            .map(|r| *r.key())
            .collect();
        for id in &stale_notifications {
            self.notifications.remove(id);
            self.purge_responses_for_parent(*id);
            removed += 1;
        }

        let stale_cloudevents: Vec<(Uuid, (String, String))> = self
            .cloudevents
            .iter()
            .filter(|r| r.value().received_at < older_than)
            .map(|r| {
                let ev = &r.value().event;
                (*r.key(), (ev.id.clone(), ev.source.clone()))
            })
            .collect();
        for (id, dedup_key) in &stale_cloudevents {
            self.cloudevents.remove(id);
            self.cloudevent_dedup.remove(dedup_key);
            self.purge_responses_for_parent(*id);
            removed += 1;
        }

        Ok(removed)
    }

    async fn purge_responses_for_subscription(&self, subscription_id: Uuid) -> Result<u64, StorageError> {
        let stale: Vec<Uuid> = self
            .responses
            .iter()
            .filter(|r| r.value().subscription_id == subscription_id)
            .map(|r| *r.key())
            .collect();
        for id in &stale {
            self.responses.remove(id);
        }
        Ok(stale.len() as u64)
    }
}

impl MemoryAuditStorage {
    fn purge_responses_for_parent(&self, parent_id: Uuid) {
        let stale: Vec<Uuid> = self
            .responses
            .iter()
            .filter(|r| r.value().parent.id() == parent_id)
            .map(|r| *r.key())
            .collect();
        for id in &stale {
            self.responses.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::AuditParent;

    #[tokio::test]
    async fn duplicate_cloudevent_is_rejected() {
        let storage = MemoryAuditStorage::new();
        let event = relay_core::CloudEvent {
            id: "evt-1".into(),
            source: "urn:example".into(),
            specversion: "1.0".into(),
            event_type: "example.thing.created".into(),
            datacontenttype: None,
            dataschema: None,
            subject: None,
            time: None,
            data: None,
        };
        let record = CloudEventRecord::new(event.clone());
        storage.put_cloudevent(record).await.unwrap();

        let dup = CloudEventRecord::new(event);
        let err = storage.put_cloudevent(dup).await;
        assert!(matches!(err, Err(StorageError::Conflict(_))));
    }

    #[tokio::test]
    async fn list_delivery_responses_filters_by_parent() {
        let storage = MemoryAuditStorage::new();
        let parent = AuditParent::Notification(Uuid::new_v4());
        let response = DeliveryResponse::success(parent, Uuid::new_v4(), 1, 200);
        storage.put_delivery_response(response.clone()).await.unwrap();

        let found = storage.list_delivery_responses(parent.id()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, response.id);
    }
}
