/**
 * Message HTTP Handlers
 *
 * - `GET /api/workspaces/{id}/messages` - a page of a channel, conversation
 *   or thread (`?channel_id=`, `?conversation_id=` or `?parent_message_id=`,
 *   plus `cursor` and `limit`)
 * - `POST /api/workspaces/{id}/messages` - post a message or thread reply
 * - `POST /api/workspaces/{id}/conversations` - open (or find) a direct
 *   conversation with another member
 * - `GET /api/messages/{id}` - message or `null`
 * - `POST /api/messages/{id}/reactions` - toggle the caller's reaction
 */

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use uuid::Uuid;

use super::service::MessageService;
use crate::backend::error::BackendError;
use crate::backend::middleware::Caller;
use crate::shared::workspace::{
    CreateConversationRequest, CreateMessageRequest, IdResponse, MessagePage, MessageQuery,
    MessageView, ToggleReactionRequest,
};

pub async fn list_messages(
    State(service): State<MessageService>,
    Caller(caller): Caller,
    Path(workspace_id): Path<Uuid>,
    Query(query): Query<MessageQuery>,
) -> Result<Json<MessagePage>, BackendError> {
    Ok(Json(service.get(caller, workspace_id, &query).await?))
}

pub async fn create_message(
    State(service): State<MessageService>,
    Caller(caller): Caller,
    Path(workspace_id): Path<Uuid>,
    Json(request): Json<CreateMessageRequest>,
) -> Result<Json<IdResponse>, BackendError> {
    let id = service.create(caller, workspace_id, &request).await?;
    Ok(Json(IdResponse { id }))
}

pub async fn get_message(
    State(service): State<MessageService>,
    Caller(caller): Caller,
    Path(message_id): Path<Uuid>,
) -> Result<Json<Option<MessageView>>, BackendError> {
    Ok(Json(service.get_by_id(caller, message_id).await?))
}

pub async fn toggle_reaction(
    State(service): State<MessageService>,
    Caller(caller): Caller,
    Path(message_id): Path<Uuid>,
    Json(request): Json<ToggleReactionRequest>,
) -> Result<Json<IdResponse>, BackendError> {
    let id = service
        .toggle_reaction(caller, message_id, &request.value)
        .await?;
    Ok(Json(IdResponse { id }))
}

pub async fn create_conversation(
    State(service): State<MessageService>,
    Caller(caller): Caller,
    Path(workspace_id): Path<Uuid>,
    Json(request): Json<CreateConversationRequest>,
) -> Result<Json<IdResponse>, BackendError> {
    let id = service
        .create_or_get_conversation(caller, workspace_id, request.member_id)
        .await?;
    Ok(Json(IdResponse { id }))
}
