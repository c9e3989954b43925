use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A consumer's commitment to receive events matching its filters.
///
/// Filter groups and cloud-event filter groups are owned directly by the
/// subscription (an "arena" model, per the design notes): there is no
/// separate aggregate for them, and replacing a subscription's filters is a
/// matter of swapping out these vectors wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub callback_url: String,
    pub auth: AuthProfile,
    pub client_id: String,
    pub send_cloudevents: bool,
    pub filter_groups: Vec<FilterGroup>,
    pub cloud_event_filter_groups: Vec<CloudEventFilterGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_certificate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_certificate: Option<ClientCertificate>,
}

impl Subscription {
    pub fn new(callback_url: impl Into<String>, auth: AuthProfile, client_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            callback_url: callback_url.into(),
            auth,
            client_id: client_id.into(),
            send_cloudevents: false,
            filter_groups: Vec::new(),
            cloud_event_filter_groups: Vec::new(),
            server_certificate: None,
            client_certificate: None,
        }
    }
}

/// A client certificate for mutual TLS against a subscriber's callback URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCertificate {
    pub certificate_pem: String,
    pub private_key_pem: String,
}

/// Subscriber authentication profile (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "authType", rename_all = "snake_case")]
pub enum AuthProfile {
    NoAuth,
    /// `header_value` already includes the scheme, e.g. `"Bearer abc123"`.
    ApiKey { header_value: String },
    /// Mints an HS256 JWT per request from `client_id` + `secret`.
    Zgw {
        client_id: String,
        secret: String,
        user_id: String,
        user_representation: String,
    },
    /// `client_credentials` grant against `token_url`; tokens are cached
    /// until near-expiry by the delivery worker.
    OAuth2ClientCredentials {
        token_url: String,
        client_id: String,
        secret: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        scope: Option<String>,
    },
}

/// A subscription's interest in one channel, optionally narrowed by filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterGroup {
    pub id: Uuid,
    pub channel_name: String,
    /// Keys are unique within a group.
    pub filters: Vec<Filter>,
}

impl FilterGroup {
    pub fn new(channel_name: impl Into<String>, filters: Vec<Filter>) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel_name: channel_name.into(),
            filters,
        }
    }
}

/// One key/value match within a filter group. `value == "*"` means "any".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    pub key: String,
    pub value: String,
}

impl Filter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A subscription's interest in a family of CloudEvent types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudEventFilterGroup {
    pub id: Uuid,
    /// Matched as a substring against the event's `type`.
    pub type_substring: String,
    pub filters: Vec<CloudEventFilter>,
}

impl CloudEventFilterGroup {
    pub fn new(type_substring: impl Into<String>, filters: Vec<CloudEventFilter>) -> Self {
        Self {
            id: Uuid::new_v4(),
            type_substring: type_substring.into(),
            filters,
        }
    }
}

/// One key/value match against a CloudEvent's `data` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudEventFilter {
    pub key: String,
    pub value: String,
}

impl CloudEventFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
