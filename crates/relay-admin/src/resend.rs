use uuid::Uuid;

use relay_core::{AuditParent, ScheduledWork, WorkKind};
use relay_storage::{AuditStorage, ScheduledWorkStorage};

use crate::error::AdminError;

/// Which audit row to resend.
#[derive(Debug, Clone, Copy)]
pub enum ResendTarget {
    Notification(Uuid),
    CloudEvent(Uuid),
}

/// Re-enqueues a fresh [`ScheduledWork`] (`attempt = 0`) carrying the
/// original payload of a prior notification or CloudEvent (spec §4.8).
/// `only_subscriber`, if set, scopes delivery to that one subscriber instead
/// of resolving targets fresh.
pub async fn resend(
    audit: &dyn AuditStorage,
    work: &dyn ScheduledWorkStorage,
    target: ResendTarget,
    only_subscriber: Option<Uuid>,
) -> Result<Uuid, AdminError> {
    let mut scheduled = match target {
        ResendTarget::Notification(id) => {
            let record = audit
                .get_notification(id)
                .await?
                .ok_or(AdminError::RecordNotFound(id))?;
            let payload = serde_json::to_value(&record.forwarded_msg)?;
            ScheduledWork::new(WorkKind::Notification, payload, Some(AuditParent::Notification(id)))
        }
        ResendTarget::CloudEvent(id) => {
            let record = audit
                .get_cloudevent(id)
                .await?
                .ok_or(AdminError::RecordNotFound(id))?;
            let payload = serde_json::to_value(&record.event)?;
            ScheduledWork::new(WorkKind::CloudEvent, payload, Some(AuditParent::CloudEvent(id)))
        }
    };

    if let Some(subscriber) = only_subscriber {
        scheduled.target_subscriptions = vec![subscriber];
    }

    let id = scheduled.id;
    work.put(scheduled).await?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::{CloudEvent, NotificationPayload, NotificationRecord};
    use relay_storage_memory::{MemoryAuditStorage, MemoryScheduledWorkStorage};
    use std::collections::BTreeMap;
    use time::macros::datetime;

    #[tokio::test]
    async fn resend_notification_starts_at_attempt_zero() {
        let audit = MemoryAuditStorage::new();
        let work = MemoryScheduledWorkStorage::new();

        let payload = NotificationPayload {
            kanaal: "zaken".into(),
            hoofd_object: "https://example.com/zaken/1".into(),
            resource: "status".into(),
            resource_url: "https://example.com/statussen/1".into(),
            actie: "create".into(),
            aanmaakdatum: datetime!(2026-01-01 00:00:00 UTC),
            kenmerken: BTreeMap::new(),
            source: None,
        };
        let record = NotificationRecord::new("zaken", payload);
        let record_id = record.id;
        audit.put_notification(record).await.unwrap();

        let work_id = resend(&audit, &work, ResendTarget::Notification(record_id), None)
            .await
            .unwrap();

        let row = work.get(work_id).await.unwrap().unwrap();
        assert_eq!(row.attempt, 0);
        assert!(row.target_subscriptions.is_empty());
    }

    #[tokio::test]
    async fn resend_scoped_to_one_subscriber() {
        let audit = MemoryAuditStorage::new();
        let work = MemoryScheduledWorkStorage::new();

        let event = CloudEvent {
            id: "evt-1".into(),
            source: "urn:example".into(),
            specversion: "1.0".into(),
            event_type: "example.created".into(),
            datacontenttype: None,
            dataschema: None,
            subject: None,
            time: None,
            data: None,
        };
        let record = relay_core::CloudEventRecord::new(event);
        let record_id = record.id;
        audit.put_cloudevent(record).await.unwrap();

        let subscriber = Uuid::new_v4();
        let work_id = resend(&audit, &work, ResendTarget::CloudEvent(record_id), Some(subscriber))
            .await
            .unwrap();

        let row = work.get(work_id).await.unwrap().unwrap();
        assert_eq!(row.target_subscriptions, vec![subscriber]);
    }

    #[tokio::test]
    async fn missing_record_is_an_error() {
        let audit = MemoryAuditStorage::new();
        let work = MemoryScheduledWorkStorage::new();
        let err = resend(&audit, &work, ResendTarget::Notification(Uuid::new_v4()), None).await;
        assert!(matches!(err, Err(AdminError::RecordNotFound(_))));
    }
}
