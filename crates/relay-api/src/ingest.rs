use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use time::OffsetDateTime;

use relay_core::{CloudEvent, CloudEventRecord, CoreError, NotificationPayload, NotificationRecord, ScheduledWork, WorkKind};
use relay_matching::notification::matching_subscriptions as matching_notification_subscriptions;
use relay_storage::{AuditStorage, ChannelStorage, ScheduledWorkStorage, SubscriptionStorage};

use crate::error::ApiError;
use crate::state::AppState;

/// `POST /api/v1/notificaties` (spec §4.2).
pub async fn create_notification(
    State(state): State<AppState>,
    Json(payload): Json<NotificationPayload>,
) -> Result<(StatusCode, Json<NotificationPayload>), ApiError> {
    if payload.aanmaakdatum > OffsetDateTime::now_utc() {
        return Err(CoreError::FutureNotAllowed(payload.aanmaakdatum.to_string()).into());
    }

    let channel = state
        .channels
        .get_by_name(&payload.kanaal)
        .await?
        .ok_or_else(|| CoreError::UnknownChannelOnIngest(payload.kanaal.clone()))?;

    channel.check_key_consistency(payload.kenmerken.keys().map(String::as_str))?;

    let candidates = state.subscriptions.list_for_channel(&payload.kanaal).await?;
    let matched = matching_notification_subscriptions(&payload.kanaal, &payload.kenmerken, &candidates);
    let wants_cloudevents = matched.iter().any(|id| {
        candidates
            .iter()
            .find(|s| &s.id == id)
            .map(|s| s.send_cloudevents)
            .unwrap_or(false)
    });
    if wants_cloudevents && payload.source.is_none() {
        return Err(CoreError::MissingSource.into());
    }

    let mut parent = None;
    if state.config.audit_enabled {
        let record = NotificationRecord::new(&payload.kanaal, payload.clone());
        parent = Some(relay_core::AuditParent::Notification(record.id));
        state.audit.put_notification(record).await?;
    }

    let task_payload = serde_json::to_value(&payload).map_err(|e| {
        ApiError::Validation(relay_core::ValidationError::new("invalid_field", e.to_string()))
    })?;
    let work = ScheduledWork::new(WorkKind::Notification, task_payload, parent);
    state.scheduled_work.put(work).await?;

    Ok((StatusCode::CREATED, Json(payload)))
}

/// `POST /api/v1/cloudevent` (experimental, spec §4.2).
pub async fn create_cloudevent(
    State(state): State<AppState>,
    Json(event): Json<CloudEvent>,
) -> Result<(StatusCode, Json<CloudEvent>), ApiError> {
    let mut parent = None;
    if state.config.audit_enabled {
        let already_seen = state
            .audit
            .cloudevent_exists(&event.id, &event.source)
            .await?;
        if !already_seen {
            let record = CloudEventRecord::new(event.clone());
            parent = Some(relay_core::AuditParent::CloudEvent(record.id));
            state.audit.put_cloudevent(record).await?;
        }
    }

    let task_payload = serde_json::to_value(&event).map_err(|e| {
        ApiError::Validation(relay_core::ValidationError::new("invalid_field", e.to_string()))
    })?;
    let work = ScheduledWork::new(WorkKind::CloudEvent, task_payload, parent);
    state.scheduled_work.put(work).await?;

    Ok((StatusCode::CREATED, Json(event)))
}
