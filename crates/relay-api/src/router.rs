use axum::routing::{get, post, put};
use axum::Router;

use crate::{channel, ingest, state::AppState, subscription};

/// Builds the publisher-facing router (spec §6). Layering (tracing,
/// compression, request ids) is the caller's job — this crate only owns
/// routes and handlers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/notificaties", post(ingest::create_notification))
        .route("/api/v1/cloudevent", post(ingest::create_cloudevent))
        .route(
            "/api/v1/kanaal",
            get(channel::list_channels).post(channel::create_channel),
        )
        .route("/api/v1/kanaal/{id}", get(channel::get_channel))
        .route("/api/v1/abonnement", post(subscription::create_subscription))
        .route(
            "/api/v1/abonnement/{id}",
            get(subscription::get_subscription)
                .put(subscription::update_subscription)
                .delete(subscription::delete_subscription),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use relay_config::RelayConfig;
    use relay_storage_memory::{
        MemoryAuditStorage, MemoryChannelStorage, MemoryScheduledWorkStorage, MemorySubscriptionStorage,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn unknown_route_is_404() {
        let state = AppState::new(
            Arc::new(MemoryChannelStorage::new()),
            Arc::new(MemorySubscriptionStorage::new()),
            Arc::new(MemoryAuditStorage::new()),
            Arc::new(MemoryScheduledWorkStorage::new()),
            Arc::new(RelayConfig::default()),
        );
        let router = build_router(state);

        let response = router
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_channels_starts_empty() {
        let state = AppState::new(
            Arc::new(MemoryChannelStorage::new()),
            Arc::new(MemorySubscriptionStorage::new()),
            Arc::new(MemoryAuditStorage::new()),
            Arc::new(MemoryScheduledWorkStorage::new()),
            Arc::new(RelayConfig::default()),
        );
        let router = build_router(state);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/kanaal")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
