/**
 * Member HTTP Handlers
 *
 * - `GET /api/workspaces/{id}/members/current` - the caller's own Member
 *   record, or `null` when anonymous, not a member, or the workspace is gone
 */

use axum::{
    extract::{Path, State},
    response::Json,
};
use uuid::Uuid;

use super::gate;
use crate::backend::error::BackendError;
use crate::backend::middleware::Caller;
use crate::backend::store::SharedStore;
use crate::backend::workspaces::WorkspaceError;
use crate::shared::workspace::Member;

pub async fn get_current_member(
    State(store): State<SharedStore>,
    Caller(caller): Caller,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<Option<Member>>, BackendError> {
    let member = gate::current_member(store.as_ref(), caller, workspace_id)
        .await
        .map_err(WorkspaceError::from)?;
    Ok(Json(member))
}
