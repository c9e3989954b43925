use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use relay_admin::probe_callback_url;
use relay_core::{AuthProfile, CloudEventFilterGroup, FilterGroup, Subscription};
use relay_storage::{AuditStorage, ChannelStorage, SubscriptionStorage};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct SubscriptionBody {
    pub callback_url: String,
    pub auth: AuthProfile,
    pub client_id: String,
    #[serde(default)]
    pub send_cloudevents: bool,
    #[serde(default)]
    pub filter_groups: Vec<FilterGroup>,
    #[serde(default)]
    pub cloud_event_filter_groups: Vec<CloudEventFilterGroup>,
}

/// Validates each filter group's channel keys against the stored channel
/// schema (the subscription-side half of spec §6's `inconsistent-abonnement-filters`).
async fn check_filter_consistency(state: &AppState, groups: &[FilterGroup]) -> Result<(), ApiError> {
    for group in groups {
        let channel = state
            .channels
            .get_by_name(&group.channel_name)
            .await?
            .ok_or_else(|| relay_core::CoreError::UnknownChannel(group.channel_name.clone()))?;
        let submitted_keys = group.filters.iter().map(|f| f.key.as_str());
        channel.check_key_consistency(submitted_keys).map_err(|_| {
            ApiError::Validation(relay_core::ValidationError::new(
                "inconsistent-abonnement-filters",
                format!("filters for channel {} are inconsistent with its schema", group.channel_name),
            ))
        })?;
    }
    Ok(())
}

async fn probe_new_callback(state: &AppState, callback_url: &str, auth: &AuthProfile) -> Result<(), ApiError> {
    let result = probe_callback_url(
        &state.http_client,
        &state.token_cache,
        callback_url,
        auth,
        state.config.test_callback_auth,
    )
    .await?;

    if !result.reachable {
        return Err(ApiError::InvalidCallbackUrl(callback_url.to_string()));
    }
    if result.rejects_without_auth == Some(false) {
        return Err(ApiError::NoAuthOnCallbackUrl);
    }
    Ok(())
}

/// `POST /api/v1/abonnement`. Probes the callback URL before accepting (§4.8).
pub async fn create_subscription(
    State(state): State<AppState>,
    Json(body): Json<SubscriptionBody>,
) -> Result<(StatusCode, Json<Subscription>), ApiError> {
    check_filter_consistency(&state, &body.filter_groups).await?;
    probe_new_callback(&state, &body.callback_url, &body.auth).await?;

    let mut subscription = Subscription::new(body.callback_url, body.auth, body.client_id);
    subscription.send_cloudevents = body.send_cloudevents;
    subscription.filter_groups = body.filter_groups;
    subscription.cloud_event_filter_groups = body.cloud_event_filter_groups;

    let created = state.subscriptions.create(subscription).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/v1/abonnement/{id}`.
pub async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<Subscription>, ApiError> {
    let subscription = state
        .subscriptions
        .get(id)
        .await?
        .ok_or(ApiError::NotFound("subscription"))?;
    Ok(Json(subscription))
}

/// `PUT /api/v1/abonnement/{id}`. Replaces filter groups wholesale (§5: a
/// single transaction on a durable backend; the in-memory store is not
/// transactional but a single `update` call is still atomic per row).
pub async fn update_subscription(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(body): Json<SubscriptionBody>,
) -> Result<Json<Subscription>, ApiError> {
    check_filter_consistency(&state, &body.filter_groups).await?;

    let mut subscription = state
        .subscriptions
        .get(id)
        .await?
        .ok_or(ApiError::NotFound("subscription"))?;
    subscription.callback_url = body.callback_url;
    subscription.auth = body.auth;
    subscription.client_id = body.client_id;
    subscription.send_cloudevents = body.send_cloudevents;
    subscription.filter_groups = body.filter_groups;
    subscription.cloud_event_filter_groups = body.cloud_event_filter_groups;

    let updated = state.subscriptions.update(subscription).await?;
    Ok(Json(updated))
}

/// `DELETE /api/v1/abonnement/{id}`. Cascades to the subscriber's delivery
/// responses, its cached pinned-TLS client, and, for OAuth2 subscribers,
/// its cached access token (§5, §6, §9 "scoped resources").
pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<StatusCode, ApiError> {
    let subscription = state
        .subscriptions
        .get(id)
        .await?
        .ok_or(ApiError::NotFound("subscription"))?;

    state.subscriptions.delete(id).await?;
    state.audit.purge_responses_for_subscription(id).await?;

    if let Some(delivery) = &state.delivery {
        delivery.evict_subscriber(&subscription).await;
    } else if let AuthProfile::OAuth2ClientCredentials { token_url, client_id, .. } = &subscription.auth {
        state.token_cache.evict(token_url, client_id).await;
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_config::RelayConfig;
    use relay_core::Channel;
    use relay_storage_memory::{
        MemoryAuditStorage, MemoryChannelStorage, MemoryScheduledWorkStorage, MemorySubscriptionStorage,
    };
    use std::sync::Arc;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn test_state() -> AppState {
        let channels = Arc::new(MemoryChannelStorage::new());
        channels
            .create(Channel::new("zaken", vec!["bron".to_string()]))
            .await
            .unwrap();
        AppState::new(
            channels,
            Arc::new(MemorySubscriptionStorage::new()),
            Arc::new(MemoryAuditStorage::new()),
            Arc::new(MemoryScheduledWorkStorage::new()),
            Arc::new(RelayConfig::default()),
        )
    }

    #[tokio::test]
    async fn create_probes_and_persists() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

        let state = test_state().await;
        let body = SubscriptionBody {
            callback_url: server.uri(),
            auth: AuthProfile::NoAuth,
            client_id: "client-a".to_string(),
            send_cloudevents: false,
            filter_groups: vec![FilterGroup::new("zaken", vec![])],
            cloud_event_filter_groups: vec![],
        };

        let (status, Json(created)) = create_subscription(State(state.clone()), Json(body))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(fetched) = get_subscription(State(state), Path(created.id)).await.unwrap();
        assert_eq!(fetched.client_id, "client-a");
    }

    #[tokio::test]
    async fn create_rejects_unreachable_callback() {
        let state = test_state().await;
        let body = SubscriptionBody {
            callback_url: "http://127.0.0.1:1".to_string(),
            auth: AuthProfile::NoAuth,
            client_id: "client-a".to_string(),
            send_cloudevents: false,
            filter_groups: vec![],
            cloud_event_filter_groups: vec![],
        };
        let err = create_subscription(State(state), Json(body)).await;
        assert!(matches!(err, Err(ApiError::InvalidCallbackUrl(_))));
    }

    #[tokio::test]
    async fn create_rejects_inconsistent_filters() {
        let state = test_state().await;
        let body = SubscriptionBody {
            callback_url: "http://127.0.0.1:1".to_string(),
            auth: AuthProfile::NoAuth,
            client_id: "client-a".to_string(),
            send_cloudevents: false,
            filter_groups: vec![FilterGroup::new("zaken", vec![relay_core::Filter::new("nope", "x")])],
            cloud_event_filter_groups: vec![],
        };
        let err = create_subscription(State(state), Json(body)).await;
        assert!(matches!(err, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn delete_removes_subscription() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

        let state = test_state().await;
        let body = SubscriptionBody {
            callback_url: server.uri(),
            auth: AuthProfile::NoAuth,
            client_id: "client-a".to_string(),
            send_cloudevents: false,
            filter_groups: vec![],
            cloud_event_filter_groups: vec![],
        };
        let (_, Json(created)) = create_subscription(State(state.clone()), Json(body)).await.unwrap();

        delete_subscription(State(state.clone()), Path(created.id)).await.unwrap();
        let err = get_subscription(State(state), Path(created.id)).await;
        assert!(matches!(err, Err(ApiError::NotFound("subscription"))));
    }
}
