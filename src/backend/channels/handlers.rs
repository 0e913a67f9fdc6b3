/**
 * Channel HTTP Handlers
 *
 * - `GET /api/workspaces/{id}/channels` - list (members)
 * - `POST /api/workspaces/{id}/channels` - create (admin)
 * - `GET /api/channels/{id}` - channel or `null`
 * - `PATCH /api/channels/{id}` - rename (admin)
 * - `DELETE /api/channels/{id}` - remove with its messages (admin)
 */

use axum::{
    extract::{Path, State},
    response::Json,
};
use uuid::Uuid;

use super::service::ChannelService;
use crate::backend::error::BackendError;
use crate::backend::middleware::Caller;
use crate::shared::workspace::{Channel, CreateChannelRequest, IdResponse, UpdateChannelRequest};

pub async fn list_channels(
    State(service): State<ChannelService>,
    Caller(caller): Caller,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<Vec<Channel>>, BackendError> {
    Ok(Json(service.get(caller, workspace_id).await?))
}

pub async fn create_channel(
    State(service): State<ChannelService>,
    Caller(caller): Caller,
    Path(workspace_id): Path<Uuid>,
    Json(request): Json<CreateChannelRequest>,
) -> Result<Json<IdResponse>, BackendError> {
    let id = service.create(caller, workspace_id, &request.name).await?;
    Ok(Json(IdResponse { id }))
}

pub async fn get_channel(
    State(service): State<ChannelService>,
    Caller(caller): Caller,
    Path(channel_id): Path<Uuid>,
) -> Result<Json<Option<Channel>>, BackendError> {
    Ok(Json(service.get_by_id(caller, channel_id).await?))
}

pub async fn update_channel(
    State(service): State<ChannelService>,
    Caller(caller): Caller,
    Path(channel_id): Path<Uuid>,
    Json(request): Json<UpdateChannelRequest>,
) -> Result<Json<IdResponse>, BackendError> {
    let id = service.update(caller, channel_id, &request.name).await?;
    Ok(Json(IdResponse { id }))
}

pub async fn remove_channel(
    State(service): State<ChannelService>,
    Caller(caller): Caller,
    Path(channel_id): Path<Uuid>,
) -> Result<Json<IdResponse>, BackendError> {
    let id = service.remove(caller, channel_id).await?;
    Ok(Json(IdResponse { id }))
}
