use std::collections::BTreeMap;

use relay_core::to_lower_camel_case;

/// The shared per-key matching rule (spec §4.1): for every key in
/// `group_filters` that is also present in `event_attrs`, the filter value
/// must be `"*"` or equal to the event's value. Keys present in the filter
/// but absent from the event are ignored. An empty filter set always matches.
///
/// Both sides' keys are normalized to lowerCamelCase before comparison.
pub fn filters_match<'a>(
    group_filters: impl Iterator<Item = (&'a str, &'a str)>,
    event_attrs: &BTreeMap<String, String>,
) -> bool {
    let normalized_attrs: BTreeMap<String, &str> = event_attrs
        .iter()
        .map(|(k, v)| (to_lower_camel_case(k), v.as_str()))
        .collect();

    for (key, value) in group_filters {
        let key = to_lower_camel_case(key);
        if let Some(event_value) = normalized_attrs.get(&key) {
            if value != "*" && value != *event_value {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn empty_filters_always_match() {
        assert!(filters_match(std::iter::empty(), &attrs(&[("bron", "XYZ")])));
    }

    #[test]
    fn wildcard_matches_anything() {
        assert!(filters_match([("bron", "*")].into_iter(), &attrs(&[("bron", "XYZ")])));
    }

    #[test]
    fn missing_event_key_is_ignored() {
        assert!(filters_match([("zaaktype", "abc")].into_iter(), &attrs(&[("bron", "XYZ")])));
    }

    #[test]
    fn mismatched_value_fails() {
        assert!(!filters_match([("bron", "ABC")].into_iter(), &attrs(&[("bron", "XYZ")])));
    }

    #[test]
    fn snake_case_filter_key_matches_camel_event_key() {
        assert!(filters_match(
            [("some_key", "v1")].into_iter(),
            &attrs(&[("someKey", "v1")])
        ));
    }
}
