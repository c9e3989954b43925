use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A publisher-supplied "notification" envelope (spec §4.2). `kenmerken`
/// values are strings; the wire format is camelCase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub kanaal: String,
    pub hoofd_object: String,
    pub resource: String,
    pub resource_url: String,
    pub actie: String,
    #[serde(with = "time::serde::rfc3339")]
    pub aanmaakdatum: OffsetDateTime,
    pub kenmerken: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Audit record of an ingested notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: Uuid,
    pub channel_name: String,
    pub forwarded_msg: NotificationPayload,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl NotificationRecord {
    pub fn new(channel_name: impl Into<String>, forwarded_msg: NotificationPayload) -> Self {
        let created_at = forwarded_msg.aanmaakdatum;
        Self {
            id: Uuid::new_v4(),
            channel_name: channel_name.into(),
            forwarded_msg,
            created_at,
        }
    }
}
