use std::collections::{BTreeMap, HashSet};

use uuid::Uuid;

use relay_core::Subscription;

use crate::key_match::filters_match;

/// Matches a notification against candidate subscriptions.
///
/// `candidates` should already be narrowed to subscriptions with at least one
/// FilterGroup targeting `channel_name` (see
/// `SubscriptionStorage::list_for_channel`), so this only re-checks the
/// per-key rule, not the channel name.
pub fn matching_subscriptions(
    channel_name: &str,
    attributes: &BTreeMap<String, String>,
    candidates: &[Subscription],
) -> Vec<Uuid> {
    let mut matched = HashSet::new();

    for sub in candidates {
        let hits = sub
            .filter_groups
            .iter()
            .filter(|group| group.channel_name == channel_name)
            .any(|group| {
                filters_match(
                    group.filters.iter().map(|f| (f.key.as_str(), f.value.as_str())),
                    attributes,
                )
            });
        if hits {
            matched.insert(sub.id);
        }
    }

    matched.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::{AuthProfile, Filter, FilterGroup};

    fn sub_with_group(channel: &str, filters: Vec<Filter>) -> Subscription {
        let mut sub = Subscription::new("https://example.com/hook", AuthProfile::NoAuth, "client-a");
        sub.filter_groups.push(FilterGroup::new(channel, filters));
        sub
    }

    #[test]
    fn matches_when_filter_group_matches() {
        let sub = sub_with_group("zaken", vec![Filter::new("bron", "XYZ")]);
        let attrs: BTreeMap<String, String> = [("bron".to_string(), "XYZ".to_string())].into();
        let matched = matching_subscriptions("zaken", &attrs, &[sub.clone()]);
        assert_eq!(matched, vec![sub.id]);
    }

    #[test]
    fn ignores_groups_for_other_channels() {
        let sub = sub_with_group("other", vec![]);
        let attrs = BTreeMap::new();
        let matched = matching_subscriptions("zaken", &attrs, &[sub]);
        assert!(matched.is_empty());
    }

    #[test]
    fn empty_filter_group_matches_everything_on_channel() {
        let sub = sub_with_group("zaken", vec![]);
        let attrs: BTreeMap<String, String> = [("bron".to_string(), "anything".to_string())].into();
        let matched = matching_subscriptions("zaken", &attrs, &[sub.clone()]);
        assert_eq!(matched, vec![sub.id]);
    }
}
