use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// A named pub/sub topic with a schema of permitted attribute keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    /// Ordered set of permitted attribute keys ("filter keys"). Order is
    /// preserved for display purposes only; matching treats this as a set.
    pub filter_keys: Vec<String>,
}

impl Channel {
    pub fn new(name: impl Into<String>, filter_keys: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            documentation_url: None,
            filter_keys,
        }
    }

    /// The channel-schema consistency check (spec §4.1): accepts iff the
    /// channel's permitted-key set is a subset or a superset of `submitted_keys`.
    pub fn check_key_consistency<'a>(
        &self,
        submitted_keys: impl Iterator<Item = &'a str>,
    ) -> Result<(), CoreError> {
        use std::collections::HashSet;

        let chan_keys: HashSet<&str> = self.filter_keys.iter().map(String::as_str).collect();
        let sub_keys: HashSet<&str> = submitted_keys.collect();

        let chan_subset_of_sub = chan_keys.is_subset(&sub_keys);
        let sub_subset_of_chan = sub_keys.is_subset(&chan_keys);

        if chan_subset_of_sub || sub_subset_of_chan {
            Ok(())
        } else {
            Err(CoreError::InconsistentFilters)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subset_passes() {
        let chan = Channel::new("zaken", vec!["bron".into(), "zaaktype".into()]);
        assert!(chan
            .check_key_consistency(["bron", "zaaktype", "extra"].into_iter())
            .is_ok());
    }

    #[test]
    fn superset_passes() {
        let chan = Channel::new("zaken", vec!["bron".into(), "zaaktype".into(), "extra".into()]);
        assert!(chan.check_key_consistency(["bron"].into_iter()).is_ok());
    }

    #[test]
    fn disjoint_fails() {
        let chan = Channel::new("zaken", vec!["bron".into()]);
        assert!(chan.check_key_consistency(["other"].into_iter()).is_err());
    }

    #[test]
    fn empty_channel_keys_always_passes() {
        let chan = Channel::new("zaken", vec![]);
        assert!(chan.check_key_consistency(["anything"].into_iter()).is_ok());
    }
}
