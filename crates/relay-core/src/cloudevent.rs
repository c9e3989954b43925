use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

/// A CloudEvents v1.0 envelope (spec §1, §4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudEvent {
    pub id: String,
    pub source: String,
    pub specversion: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datacontenttype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataschema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Free-form payload: object, string, or null. Matching only ever reads
    /// it as an object; other shapes match only filter-less groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl CloudEvent {
    /// The `data` object as a key→value map for matching purposes, or an
    /// empty map if `data` is absent, null, or not an object.
    pub fn data_as_object(&self) -> serde_json::Map<String, Value> {
        match &self.data {
            Some(Value::Object(map)) => map.clone(),
            _ => serde_json::Map::new(),
        }
    }
}

/// Audit record of an ingested CloudEvent. `(event_id, source)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudEventRecord {
    pub id: Uuid,
    pub event: CloudEvent,
    /// Server-assigned ingest time, independent of the event's own optional
    /// `time` field. Retention purges key off this, not `event.time`.
    #[serde(with = "time::serde::rfc3339")]
    pub received_at: OffsetDateTime,
}

impl CloudEventRecord {
    pub fn new(event: CloudEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            event,
            received_at: OffsetDateTime::now_utc(),
        }
    }
}
