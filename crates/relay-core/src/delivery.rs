use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Which kind of event a [`ScheduledWork`] row carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkKind {
    Notification,
    CloudEvent,
}

/// The audit row a [`ScheduledWork`] traces back to, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuditParent {
    Notification(Uuid),
    CloudEvent(Uuid),
}

impl AuditParent {
    pub fn id(&self) -> Uuid {
        match self {
            AuditParent::Notification(id) | AuditParent::CloudEvent(id) => *id,
        }
    }
}

/// A unit of work in the delivery pipeline (spec §3, §4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledWork {
    pub id: Uuid,
    pub kind: WorkKind,
    pub payload: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<AuditParent>,
    #[serde(with = "time::serde::rfc3339")]
    pub execute_after: OffsetDateTime,
    pub attempt: u32,
    /// Empty means "resolve target subscribers fresh at dispatch time";
    /// non-empty means this row is a retry carrying only the subscribers
    /// that failed last time.
    pub target_subscriptions: Vec<Uuid>,
}

impl ScheduledWork {
    pub fn new(kind: WorkKind, payload: serde_json::Value, parent: Option<AuditParent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            payload,
            parent,
            execute_after: OffsetDateTime::now_utc(),
            attempt: 0,
            target_subscriptions: Vec::new(),
        }
    }

    pub fn is_retry(&self) -> bool {
        !self.target_subscriptions.is_empty()
    }
}

/// One attempt's outcome for one (event, subscriber) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResponse {
    pub id: Uuid,
    pub parent: AuditParent,
    pub subscription_id: Uuid,
    pub attempt: u32,
    pub response_status: Option<u16>,
    pub exception: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Exception strings on a [`DeliveryResponse`] are truncated to this many
/// characters (spec §3, "DeliveryResponse" row).
pub const EXCEPTION_MAX_LEN: usize = 1000;

/// Truncates `s` to at most [`EXCEPTION_MAX_LEN`] chars, splitting on a char
/// boundary.
pub fn truncate_exception(s: impl Into<String>) -> String {
    let s = s.into();
    if s.len() <= EXCEPTION_MAX_LEN {
        return s;
    }
    let mut end = EXCEPTION_MAX_LEN;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

impl DeliveryResponse {
    pub fn success(parent: AuditParent, subscription_id: Uuid, attempt: u32, status: u16) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent,
            subscription_id,
            attempt,
            response_status: Some(status),
            exception: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn failure_status(
        parent: AuditParent,
        subscription_id: Uuid,
        attempt: u32,
        status: u16,
        exception: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent,
            subscription_id,
            attempt,
            response_status: Some(status),
            exception: Some(truncate_exception(exception)),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn failure_transport(
        parent: AuditParent,
        subscription_id: Uuid,
        attempt: u32,
        exception: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent,
            subscription_id,
            attempt,
            response_status: None,
            exception: Some(truncate_exception(exception)),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_exceptions() {
        let long = "x".repeat(2000);
        let truncated = truncate_exception(long);
        assert_eq!(truncated.len(), EXCEPTION_MAX_LEN);
    }

    #[test]
    fn leaves_short_exceptions_untouched() {
        assert_eq!(truncate_exception("boom"), "boom");
    }

    #[test]
    fn scheduled_work_starts_fresh() {
        let work = ScheduledWork::new(WorkKind::Notification, serde_json::json!({}), None);
        assert_eq!(work.attempt, 0);
        assert!(!work.is_retry());
    }
}
