use time::OffsetDateTime;

use relay_storage::{AuditStorage, StorageError};

/// Deletes NotificationRecords and CloudEventRecords (and their cascaded
/// DeliveryResponses) older than `retention_days` (spec §4.7). Intended to
/// run at most monthly.
pub async fn purge_expired_records(audit: &dyn AuditStorage, retention_days: u32) -> Result<u64, StorageError> {
    let cutoff = OffsetDateTime::now_utc() - time::Duration::days(retention_days as i64);
    audit.purge_older_than(cutoff).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::NotificationPayload;
    use relay_storage_memory::MemoryAuditStorage;
    use std::collections::BTreeMap;
    use time::macros::datetime;

    #[tokio::test]
    async fn purges_records_older_than_retention() {
        let audit = MemoryAuditStorage::new();
        let old_payload = NotificationPayload {
            kanaal: "zaken".into(),
            hoofd_object: "https://example.com/1".into(),
            resource: "status".into(),
            resource_url: "https://example.com/statussen/1".into(),
            actie: "create".into(),
            aanmaakdatum: datetime!(2000-01-01 00:00:00 UTC),
            kenmerken: BTreeMap::new(),
            source: None,
        };
        audit
            .put_notification(relay_core::NotificationRecord::new("zaken", old_payload))
            .await
            .unwrap();

        let removed = purge_expired_records(&audit, 30).await.unwrap();
        assert_eq!(removed, 1);
    }
}
