use std::sync::Arc;

use time::OffsetDateTime;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use relay_config::RelayConfig;
use relay_core::{AuditParent, CloudEvent, NotificationPayload, ScheduledWork, Subscription, WorkKind};
use relay_delivery::DeliveryClient;
use relay_storage::{AuditStorage, ChannelStorage, ScheduledWorkStorage, StorageError, SubscriptionStorage};

use crate::backoff::{backoff_seconds, exceeds_retry_ceiling};

/// Outcome of one scheduler tick, for logging and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct TickStats {
    pub claimed: usize,
    pub delivered: usize,
    pub rescheduled: usize,
    pub discarded: usize,
}

/// Owns everything one tick needs: the storage traits it claims and mutates
/// work rows against, the delivery client, and the tuning config.
pub struct Scheduler {
    channels: Arc<dyn ChannelStorage>,
    subscriptions: Arc<dyn SubscriptionStorage>,
    audit: Arc<dyn AuditStorage>,
    work: Arc<dyn ScheduledWorkStorage>,
    delivery: Arc<DeliveryClient>,
    config: RelayConfig,
}

impl Scheduler {
    pub fn new(
        channels: Arc<dyn ChannelStorage>,
        subscriptions: Arc<dyn SubscriptionStorage>,
        audit: Arc<dyn AuditStorage>,
        work: Arc<dyn ScheduledWorkStorage>,
        delivery: Arc<DeliveryClient>,
        config: RelayConfig,
    ) -> Self {
        Self {
            channels,
            subscriptions,
            audit,
            work,
            delivery,
            config,
        }
    }

    /// Runs forever, ticking at `config.scheduler_tick_interval_seconds`.
    pub async fn run(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.config.scheduler_tick_interval());
        loop {
            ticker.tick().await;
            match self.run_tick().await {
                Ok(stats) if stats.claimed > 0 => {
                    info!(
                        claimed = stats.claimed,
                        delivered = stats.delivered,
                        rescheduled = stats.rescheduled,
                        discarded = stats.discarded,
                        "scheduler tick"
                    );
                }
                Ok(_) => {}
                Err(e) => error!(error = %e, "scheduler tick failed"),
            }
        }
    }

    /// Processes one batch of ready work (spec §4.3). Bounded to
    /// `config.scheduler_batch_size` rows so no single tick starves others.
    pub async fn run_tick(&self) -> Result<TickStats, StorageError> {
        let rows = self.work.claim_ready(self.config.scheduler_batch_size).await?;
        let mut stats = TickStats {
            claimed: rows.len(),
            ..Default::default()
        };

        for row in rows {
            self.process_row(row, &mut stats).await;
        }

        Ok(stats)
    }

    async fn process_row(&self, row: ScheduledWork, stats: &mut TickStats) {
        if exceeds_retry_ceiling(&self.config, row.attempt) {
            if let Err(e) = self.work.delete(row.id).await {
                error!(work_id = %row.id, error = %e, "failed to discard exhausted work");
            }
            stats.discarded += 1;
            return;
        }

        let attempt = row.attempt;
        let try_count = attempt + 1;
        let targets = match self.resolve_targets(&row).await {
            Ok(targets) => targets,
            Err(e) => {
                error!(work_id = %row.id, error = %e, "failed to resolve delivery targets");
                if let Err(e) = self.work.release(row.id).await {
                    error!(work_id = %row.id, error = %e, "failed to release work after target resolution error");
                }
                return;
            }
        };

        let parent = row
            .parent
            .unwrap_or_else(|| match row.kind {
                WorkKind::Notification => AuditParent::Notification(row.id),
                WorkKind::CloudEvent => AuditParent::CloudEvent(row.id),
            });

        let mut fan_out = JoinSet::new();
        for subscriber in targets {
            let delivery = Arc::clone(&self.delivery);
            let audit = Arc::clone(&self.audit);
            let payload = row.payload.clone();
            let specversion = self.config.cloudevents_specversion.clone();
            let kind = row.kind;
            fan_out.spawn(async move {
                let response = match delivery
                    .deliver(&subscriber, kind, &payload, parent, attempt, &specversion)
                    .await
                {
                    Ok(response) => response,
                    Err(e) => {
                        error!(subscription_id = %subscriber.id, error = %e, "delivery worker error");
                        return Some(subscriber.id);
                    }
                };
                let failed = response.response_status.map(|s| !(200..300).contains(&s)).unwrap_or(true);
                if let Err(e) = audit.put_delivery_response(response).await {
                    error!(subscription_id = %subscriber.id, error = %e, "failed to persist delivery response");
                }
                if failed {
                    warn!(subscription_id = %subscriber.id, work_id = %row.id, attempt, try_count, "delivery failed");
                    Some(subscriber.id)
                } else {
                    None
                }
            });
        }

        let mut failed_ids = Vec::new();
        while let Some(outcome) = fan_out.join_next().await {
            if let Ok(Some(id)) = outcome {
                failed_ids.push(id);
            }
        }

        if failed_ids.is_empty() {
            if let Err(e) = self.work.delete(row.id).await {
                error!(work_id = %row.id, error = %e, "failed to delete completed work");
            }
            stats.delivered += 1;
        } else {
            let next_attempt = attempt + 1;
            let mut retried = row;
            retried.target_subscriptions = failed_ids;
            retried.attempt = next_attempt;
            retried.execute_after =
                OffsetDateTime::now_utc() + time::Duration::seconds(backoff_seconds(&self.config, next_attempt) as i64);
            if let Err(e) = self.work.reschedule(retried).await {
                error!(error = %e, "failed to reschedule work");
            }
            stats.rescheduled += 1;
        }
    }

    async fn resolve_targets(&self, row: &ScheduledWork) -> Result<Vec<Subscription>, StorageError> {
        if row.is_retry() {
            let mut targets = Vec::with_capacity(row.target_subscriptions.len());
            for id in &row.target_subscriptions {
                match self.subscriptions.get(*id).await? {
                    Some(sub) => targets.push(sub),
                    None => warn!(subscription_id = %id, "subscription_does_not_exist"),
                }
            }
            return Ok(targets);
        }

        match row.kind {
            WorkKind::Notification => {
                let payload: NotificationPayload = serde_json::from_value(row.payload.clone())
                    .map_err(|e| StorageError::Backend(e.to_string()))?;
                let _ = self.channels.get_by_name(&payload.kanaal).await?;
                let candidates = self.subscriptions.list_for_channel(&payload.kanaal).await?;
                let ids = relay_matching::notification::matching_subscriptions(
                    &payload.kanaal,
                    &payload.kenmerken,
                    &candidates,
                );
                Ok(candidates.into_iter().filter(|s| ids.contains(&s.id)).collect())
            }
            WorkKind::CloudEvent => {
                let event: CloudEvent = serde_json::from_value(row.payload.clone())
                    .map_err(|e| StorageError::Backend(e.to_string()))?;
                let candidates = self.subscriptions.list_cloudevent_subscribers().await?;
                let data = event.data_as_object();
                let ids = relay_matching::cloudevent::matching_subscriptions(&event.event_type, &data, &candidates);
                Ok(candidates.into_iter().filter(|s| ids.contains(&s.id)).collect())
            }
        }
    }
}
