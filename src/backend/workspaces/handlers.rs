/**
 * Workspace HTTP Handlers
 *
 * Thin adapters from Axum extractors to `WorkspaceService`. Request shape
 * is validated by the `Json` and `Path` extractors; everything else is
 * decided by the service.
 *
 * # Routes
 *
 * - `POST /api/workspaces` - create
 * - `GET /api/workspaces` - list the caller's workspaces
 * - `GET /api/workspaces/{id}` - full workspace (members only, else `null`)
 * - `GET /api/workspaces/{id}/info` - join preview
 * - `PATCH /api/workspaces/{id}` - rename (admin)
 * - `DELETE /api/workspaces/{id}` - remove with all contents (admin)
 * - `POST /api/workspaces/{id}/join` - join with a join code
 * - `POST /api/workspaces/{id}/join-code` - rotate the join code (admin)
 */

use axum::{
    extract::{Path, State},
    response::Json,
};
use uuid::Uuid;

use super::service::WorkspaceService;
use crate::backend::error::BackendError;
use crate::backend::middleware::Caller;
use crate::shared::workspace::{
    CreateWorkspaceRequest, IdResponse, JoinWorkspaceRequest, UpdateWorkspaceRequest, Workspace,
    WorkspaceInfo,
};

pub async fn create_workspace(
    State(service): State<WorkspaceService>,
    Caller(caller): Caller,
    Json(request): Json<CreateWorkspaceRequest>,
) -> Result<Json<IdResponse>, BackendError> {
    let id = service.create(caller, &request.name).await?;
    Ok(Json(IdResponse { id }))
}

pub async fn list_workspaces(
    State(service): State<WorkspaceService>,
    Caller(caller): Caller,
) -> Result<Json<Vec<Workspace>>, BackendError> {
    Ok(Json(service.get(caller).await?))
}

pub async fn get_workspace(
    State(service): State<WorkspaceService>,
    Caller(caller): Caller,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<Option<Workspace>>, BackendError> {
    Ok(Json(service.get_by_id(caller, workspace_id).await?))
}

pub async fn get_workspace_info(
    State(service): State<WorkspaceService>,
    Caller(caller): Caller,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<Option<WorkspaceInfo>>, BackendError> {
    Ok(Json(service.get_info_by_id(caller, workspace_id).await?))
}

pub async fn update_workspace(
    State(service): State<WorkspaceService>,
    Caller(caller): Caller,
    Path(workspace_id): Path<Uuid>,
    Json(request): Json<UpdateWorkspaceRequest>,
) -> Result<Json<IdResponse>, BackendError> {
    let id = service.update(caller, workspace_id, &request.name).await?;
    Ok(Json(IdResponse { id }))
}

pub async fn remove_workspace(
    State(service): State<WorkspaceService>,
    Caller(caller): Caller,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<IdResponse>, BackendError> {
    let id = service.remove(caller, workspace_id).await?;
    Ok(Json(IdResponse { id }))
}

pub async fn join_workspace(
    State(service): State<WorkspaceService>,
    Caller(caller): Caller,
    Path(workspace_id): Path<Uuid>,
    Json(request): Json<JoinWorkspaceRequest>,
) -> Result<Json<IdResponse>, BackendError> {
    let id = service.join(caller, workspace_id, &request.join_code).await?;
    Ok(Json(IdResponse { id }))
}

pub async fn rotate_join_code(
    State(service): State<WorkspaceService>,
    Caller(caller): Caller,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<IdResponse>, BackendError> {
    let id = service.new_join_code(caller, workspace_id).await?;
    Ok(Json(IdResponse { id }))
}
