use std::collections::{BTreeMap, HashSet};

use serde_json::Value;
use uuid::Uuid;

use relay_core::Subscription;

use crate::key_match::filters_match;

/// Matches a CloudEvent against candidate subscriptions.
///
/// `candidates` should already be narrowed to subscribers with
/// `send_cloudevents = true` (see
/// `SubscriptionStorage::list_cloudevent_subscribers`). A group matches iff
/// its `type_substring` is a substring of `event_type` and its filters pass
/// the shared per-key rule against `data`.
pub fn matching_subscriptions(
    event_type: &str,
    data: &serde_json::Map<String, Value>,
    candidates: &[Subscription],
) -> Vec<Uuid> {
    let data_attrs: BTreeMap<String, String> = data
        .iter()
        .map(|(k, v)| (k.clone(), value_to_match_string(v)))
        .collect();

    let mut matched = HashSet::new();

    for sub in candidates {
        let hits = sub.cloud_event_filter_groups.iter().any(|group| {
            event_type.contains(&group.type_substring)
                && filters_match(
                    group.filters.iter().map(|f| (f.key.as_str(), f.value.as_str())),
                    &data_attrs,
                )
        });
        if hits {
            matched.insert(sub.id);
        }
    }

    matched.into_iter().collect()
}

/// Renders a JSON value as the string the matching rule compares against.
/// Strings pass through as-is; everything else uses its JSON rendering.
fn value_to_match_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::{AuthProfile, CloudEventFilter, CloudEventFilterGroup};
    use serde_json::json;

    fn sub_with_group(type_substring: &str, filters: Vec<CloudEventFilter>) -> Subscription {
        let mut sub = Subscription::new("https://example.com/hook", AuthProfile::NoAuth, "client-a");
        sub.send_cloudevents = true;
        sub.cloud_event_filter_groups
            .push(CloudEventFilterGroup::new(type_substring, filters));
        sub
    }

    #[test]
    fn matches_on_type_substring_and_filter() {
        let sub = sub_with_group("zaak.created", vec![CloudEventFilter::new("bron", "XYZ")]);
        let data = json!({"bron": "XYZ"}).as_object().unwrap().clone();
        let matched = matching_subscriptions("nl.overheid.zaak.created.v1", &data, &[sub.clone()]);
        assert_eq!(matched, vec![sub.id]);
    }

    #[test]
    fn non_matching_type_substring_excludes() {
        let sub = sub_with_group("document.created", vec![]);
        let data = serde_json::Map::new();
        let matched = matching_subscriptions("nl.overheid.zaak.created.v1", &data, &[sub]);
        assert!(matched.is_empty());
    }

    #[test]
    fn empty_data_still_matches_filterless_groups() {
        let sub = sub_with_group("zaak", vec![]);
        let data = serde_json::Map::new();
        let matched = matching_subscriptions("zaak.created", &data, &[sub.clone()]);
        assert_eq!(matched, vec![sub.id]);
    }
}
