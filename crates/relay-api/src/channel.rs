use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use relay_core::Channel;
use relay_storage::ChannelStorage;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct CreateChannel {
    pub name: String,
    #[serde(default)]
    pub filter_keys: Vec<String>,
}

/// `POST /api/v1/kanaal`. Minimal create; no partial-update support (§6).
pub async fn create_channel(
    State(state): State<AppState>,
    Json(body): Json<CreateChannel>,
) -> Result<(StatusCode, Json<Channel>), ApiError> {
    let channel = Channel::new(body.name, body.filter_keys);
    let created = state.channels.create(channel).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/v1/kanaal/{id}`.
pub async fn get_channel(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<Channel>, ApiError> {
    let channel = state.channels.get(id).await?.ok_or(ApiError::NotFound("channel"))?;
    Ok(Json(channel))
}

/// `GET /api/v1/kanaal`.
pub async fn list_channels(State(state): State<AppState>) -> Result<Json<Vec<Channel>>, ApiError> {
    Ok(Json(state.channels.list().await?))
}
