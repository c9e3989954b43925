use serde_json::Value;
use uuid::Uuid;

use relay_core::{CloudEvent, CoreError, NotificationPayload};

/// Pure transform of a notification payload into a CloudEvents v1.0 envelope
/// (spec §4.6). `source` is required; callers must have already rejected
/// notifications that lack it when a CloudEvents subscriber matched.
pub fn notification_to_cloudevent(
    payload: &NotificationPayload,
    specversion: &str,
) -> Result<CloudEvent, CoreError> {
    let source = payload
        .source
        .clone()
        .ok_or(CoreError::MissingSource)?;

    let event_type = format!(
        "nl.overheid.{}.{}.{}",
        payload.kanaal, payload.resource, payload.actie
    );

    let subject = payload
        .resource_url
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    let time = payload
        .aanmaakdatum
        .format(&time::macros::format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]Z"
        ))
        .map_err(|e| CoreError::InvalidField {
            field: "aanmaakdatum".into(),
            message: e.to_string(),
        })?;

    let mut data = serde_json::Map::new();
    for (key, value) in &payload.kenmerken {
        data.insert(key.clone(), Value::String(value.clone()));
    }
    data.insert("hoofdObject".to_string(), Value::String(payload.hoofd_object.clone()));

    Ok(CloudEvent {
        id: Uuid::new_v4().to_string(),
        source,
        specversion: specversion.to_string(),
        event_type,
        datacontenttype: Some("application/json".to_string()),
        dataschema: None,
        subject,
        time: Some(time),
        data: Some(Value::Object(data)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use time::macros::datetime;

    fn sample_payload() -> NotificationPayload {
        NotificationPayload {
            kanaal: "zaken".into(),
            hoofd_object: "https://api.example.com/zaken/1".into(),
            resource: "status".into(),
            resource_url: "https://api.example.com/statussen/42".into(),
            actie: "create".into(),
            aanmaakdatum: datetime!(2026-01-15 10:30:00 UTC),
            kenmerken: BTreeMap::from([("bron".to_string(), "XYZ".to_string())]),
            source: Some("urn:nld:oin:00000001823288444000:systeem:SOME-SYSTEM".into()),
        }
    }

    #[test]
    fn builds_expected_type_and_subject() {
        let event = notification_to_cloudevent(&sample_payload(), "1.0").unwrap();
        assert_eq!(event.event_type, "nl.overheid.zaken.status.create");
        assert_eq!(event.subject, Some("42".to_string()));
        assert_eq!(event.time.as_deref(), Some("2026-01-15T10:30:00Z"));
    }

    #[test]
    fn merges_kenmerken_with_hoofd_object() {
        let event = notification_to_cloudevent(&sample_payload(), "1.0").unwrap();
        let data = event.data_as_object();
        assert_eq!(data.get("bron").and_then(Value::as_str), Some("XYZ"));
        assert_eq!(
            data.get("hoofdObject").and_then(Value::as_str),
            Some("https://api.example.com/zaken/1")
        );
    }

    #[test]
    fn missing_source_is_rejected() {
        let mut payload = sample_payload();
        payload.source = None;
        let err = notification_to_cloudevent(&payload, "1.0");
        assert!(matches!(err, Err(CoreError::MissingSource)));
    }
}
