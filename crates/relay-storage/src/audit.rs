use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use relay_core::{CloudEventRecord, DeliveryResponse, NotificationRecord};

use crate::error::StorageError;

/// Storage for ingested notification/cloud-event audit rows and their
/// per-attempt delivery responses.
///
/// NotificationRecord and CloudEventRecord are append-only: there is no
/// `update`, only `put` (create) and read-backs for resend/admin tooling.
#[async_trait]
pub trait AuditStorage: Send + Sync {
    async fn put_notification(&self, record: NotificationRecord) -> Result<(), StorageError>;

    async fn get_notification(&self, id: Uuid) -> Result<Option<NotificationRecord>, StorageError>;

    /// `(event_id, source)` is unique; a duplicate insert is a conflict.
    async fn put_cloudevent(&self, record: CloudEventRecord) -> Result<(), StorageError>;

    async fn get_cloudevent(&self, id: Uuid) -> Result<Option<CloudEventRecord>, StorageError>;

    async fn cloudevent_exists(&self, event_id: &str, source: &str) -> Result<bool, StorageError>;

    async fn put_delivery_response(&self, response: DeliveryResponse) -> Result<(), StorageError>;

    async fn list_delivery_responses(
        &self,
        parent_id: Uuid,
    ) -> Result<Vec<DeliveryResponse>, StorageError>;

    /// Deletes audit rows (and their delivery responses) older than
    /// `older_than`, for the retention cleanup job. Returns the count removed.
    async fn purge_older_than(&self, older_than: OffsetDateTime) -> Result<u64, StorageError>;

    /// Cascades from subscription deletion: drops delivery responses for
    /// `subscription_id`.
    async fn purge_responses_for_subscription(&self, subscription_id: Uuid) -> Result<u64, StorageError>;
}
