use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use uuid::Uuid;

use relay_core::{AuditParent, DeliveryResponse, NotificationPayload, Subscription, WorkKind};

use crate::auth::{authorization_header, TokenCache};
use crate::error::DeliveryError;
use crate::transform::notification_to_cloudevent;

const CONTENT_TYPE_NOTIFICATION: &str = "application/json";
const CONTENT_TYPE_CLOUDEVENT: &str = "application/cloudevents+json";

/// Outbound HTTP client for delivery attempts.
///
/// A subscriber with no custom TLS material shares one pooled `reqwest::Client`;
/// a subscriber carrying a server-pinning certificate or a client certificate
/// gets its own client, built on first use and cached by subscriber id (spec
/// §4.4 step 4, §9 "scoped resources"). The [`TokenCache`] is taken as a
/// shared `Arc` rather than owned outright, so callers that also expose a
/// token-evicting API surface (e.g. the subscription-deletion handler) can
/// hold the very same cache instance the delivery path reads from. Both
/// caches MUST be evicted when a subscriber is deleted — see
/// [`DeliveryClient::evict_subscriber`].
pub struct DeliveryClient {
    default_http: reqwest::Client,
    connect_timeout: Duration,
    read_timeout: Duration,
    extra_roots: Vec<Vec<u8>>,
    per_subscriber_http: DashMap<Uuid, reqwest::Client>,
    token_cache: Arc<TokenCache>,
}

impl DeliveryClient {
    /// `extra_ca_bundle_paths` are read once at construction (spec §4.9's
    /// `extra_ca_bundle_paths`) and trusted in addition to the system roots,
    /// for both the shared client and every per-subscriber client built later.
    pub fn new(
        connect_timeout: Duration,
        read_timeout: Duration,
        extra_ca_bundle_paths: &[String],
        token_cache: Arc<TokenCache>,
    ) -> Result<Self, DeliveryError> {
        let extra_roots = extra_ca_bundle_paths
            .iter()
            .map(|path| {
                std::fs::read(path)
                    .map_err(|e| DeliveryError::TlsConfig(format!("reading {path}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout);
        for root in &extra_roots {
            let cert = reqwest::Certificate::from_pem(root)
                .map_err(|e| DeliveryError::TlsConfig(e.to_string()))?;
            builder = builder.add_root_certificate(cert);
        }
        let default_http = builder.build().map_err(|e| DeliveryError::Transport(e.to_string()))?;

        Ok(Self {
            default_http,
            connect_timeout,
            read_timeout,
            extra_roots,
            per_subscriber_http: DashMap::new(),
            token_cache,
        })
    }

    pub async fn evict_token(&self, token_url: &str, client_id: &str) {
        self.token_cache.evict(token_url, client_id).await;
    }

    /// Drops a subscriber's pooled HTTP client and cached token, if any.
    /// Callers MUST invoke this when a subscriber is deleted (spec §9).
    pub async fn evict_subscriber(&self, subscriber: &Subscription) {
        self.per_subscriber_http.remove(&subscriber.id);
        if let relay_core::AuthProfile::OAuth2ClientCredentials { token_url, client_id, .. } = &subscriber.auth {
            self.evict_token(token_url, client_id).await;
        }
    }

    /// Resolves the `reqwest::Client` to use for one subscriber: the shared
    /// pooled client, or a per-subscriber client honoring its server-pinning
    /// and client certificates, built on first use and cached thereafter.
    fn client_for(&self, subscriber: &Subscription) -> Result<reqwest::Client, DeliveryError> {
        if subscriber.server_certificate.is_none() && subscriber.client_certificate.is_none() {
            return Ok(self.default_http.clone());
        }

        if let Some(existing) = self.per_subscriber_http.get(&subscriber.id) {
            return Ok(existing.clone());
        }

        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.read_timeout);
        for root in &self.extra_roots {
            let cert = reqwest::Certificate::from_pem(root)
                .map_err(|e| DeliveryError::TlsConfig(e.to_string()))?;
            builder = builder.add_root_certificate(cert);
        }
        if let Some(server_certificate) = &subscriber.server_certificate {
            let cert = reqwest::Certificate::from_pem(server_certificate.as_bytes())
                .map_err(|e| DeliveryError::TlsConfig(e.to_string()))?;
            builder = builder.add_root_certificate(cert);
        }
        if let Some(client_certificate) = &subscriber.client_certificate {
            let mut combined = client_certificate.certificate_pem.clone();
            combined.push('\n');
            combined.push_str(&client_certificate.private_key_pem);
            let identity = reqwest::Identity::from_pem(combined.as_bytes())
                .map_err(|e| DeliveryError::TlsConfig(e.to_string()))?;
            builder = builder.identity(identity);
        }
        let client = builder.build().map_err(|e| DeliveryError::Transport(e.to_string()))?;

        self.per_subscriber_http.insert(subscriber.id, client.clone());
        Ok(client)
    }

    /// Delivers one event to one subscriber and returns the resulting
    /// [`DeliveryResponse`]. Never returns `Err` for delivery-level failures
    /// (non-2xx responses, transport errors) — those are folded into the
    /// response's `exception`/`response_status` fields per spec §4.4; `Err`
    /// is reserved for failures that are programming errors (bad payload
    /// JSON that should have been caught earlier).
    pub async fn deliver(
        &self,
        subscriber: &Subscription,
        work_kind: WorkKind,
        raw_payload: &serde_json::Value,
        parent: AuditParent,
        attempt: u32,
        cloudevents_specversion: &str,
    ) -> Result<DeliveryResponse, DeliveryError> {
        let (body, content_type) =
            build_outbound_body(work_kind, raw_payload, subscriber, cloudevents_specversion)?;

        let http = self.client_for(subscriber)?;

        let auth_header = match authorization_header(&subscriber.auth, &self.token_cache, &http).await {
            Ok(header) => header,
            Err(e) => {
                return Ok(DeliveryResponse::failure_transport(
                    parent,
                    subscriber.id,
                    attempt + 1,
                    e.to_string(),
                ))
            }
        };

        let mut request = http
            .post(&subscriber.callback_url)
            .header("Content-Type", content_type)
            .body(body);

        if let Some(auth_header) = auth_header {
            request = request.header("Authorization", auth_header);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    Ok(DeliveryResponse::success(parent, subscriber.id, attempt + 1, status.as_u16()))
                } else {
                    let text = response.text().await.unwrap_or_default();
                    Ok(DeliveryResponse::failure_status(
                        parent,
                        subscriber.id,
                        attempt + 1,
                        status.as_u16(),
                        text,
                    ))
                }
            }
            Err(e) => Ok(DeliveryResponse::failure_transport(
                parent,
                subscriber.id,
                attempt + 1,
                e.to_string(),
            )),
        }
    }
}

/// Builds the request body and `Content-Type` for one (work, subscriber)
/// pair. A notification delivered to a subscriber with `send_cloudevents`
/// set is transformed in flight; everything else is forwarded as-is.
fn build_outbound_body(
    work_kind: WorkKind,
    raw_payload: &serde_json::Value,
    subscriber: &Subscription,
    cloudevents_specversion: &str,
) -> Result<(String, &'static str), DeliveryError> {
    match work_kind {
        WorkKind::Notification if subscriber.send_cloudevents => {
            let payload: NotificationPayload = serde_json::from_value(raw_payload.clone())
                .map_err(|e| DeliveryError::Serialization(e.to_string()))?;
            let event = notification_to_cloudevent(&payload, cloudevents_specversion)
                .map_err(|e| DeliveryError::Serialization(e.to_string()))?;
            let body = serde_json::to_string(&event).map_err(|e| DeliveryError::Serialization(e.to_string()))?;
            Ok((body, CONTENT_TYPE_CLOUDEVENT))
        }
        WorkKind::Notification => {
            let body = serde_json::to_string(raw_payload).map_err(|e| DeliveryError::Serialization(e.to_string()))?;
            Ok((body, CONTENT_TYPE_NOTIFICATION))
        }
        WorkKind::CloudEvent => {
            let body = serde_json::to_string(raw_payload).map_err(|e| DeliveryError::Serialization(e.to_string()))?;
            Ok((body, CONTENT_TYPE_CLOUDEVENT))
        }
    }
}
