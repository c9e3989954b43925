use std::sync::Arc;

use relay_config::RelayConfig;
use relay_delivery::{DeliveryClient, TokenCache};
use relay_storage::{AuditStorage, ChannelStorage, ScheduledWorkStorage, SubscriptionStorage};

/// Shared application state threaded through every handler.
///
/// Storage is held behind trait objects so the HTTP surface doesn't care
/// whether it's talking to the in-memory reference store or a durable
/// backend.
#[derive(Clone)]
pub struct AppState {
    pub channels: Arc<dyn ChannelStorage>,
    pub subscriptions: Arc<dyn SubscriptionStorage>,
    pub audit: Arc<dyn AuditStorage>,
    pub scheduled_work: Arc<dyn ScheduledWorkStorage>,
    pub config: Arc<RelayConfig>,
    pub http_client: Arc<reqwest::Client>,
    pub token_cache: Arc<TokenCache>,
    /// The scheduler's delivery client, wired in via [`AppState::with_delivery`]
    /// so the subscription-deletion handler can drop a subscriber's cached
    /// mTLS client alongside its cached token. `None` in tests that don't
    /// exercise delivery; `delete_subscription` falls back to evicting the
    /// token cache directly in that case.
    pub delivery: Option<Arc<DeliveryClient>>,
}

impl AppState {
    pub fn new(
        channels: Arc<dyn ChannelStorage>,
        subscriptions: Arc<dyn SubscriptionStorage>,
        audit: Arc<dyn AuditStorage>,
        scheduled_work: Arc<dyn ScheduledWorkStorage>,
        config: Arc<RelayConfig>,
    ) -> Self {
        Self {
            channels,
            subscriptions,
            audit,
            scheduled_work,
            config,
            http_client: Arc::new(reqwest::Client::new()),
            token_cache: Arc::new(TokenCache::new()),
            delivery: None,
        }
    }

    /// Shares the scheduler's `DeliveryClient` (and, through it, its token
    /// cache) with the HTTP surface.
    pub fn with_delivery(mut self, delivery: Arc<DeliveryClient>, token_cache: Arc<TokenCache>) -> Self {
        self.delivery = Some(delivery);
        self.token_cache = token_cache;
        self
    }
}
