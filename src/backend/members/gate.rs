/**
 * Membership Gate
 *
 * Every workspace-scoped operation except `join` goes through this gate.
 * Given the caller's identity and a workspace id it yields either the
 * caller's membership or a denial (`None`).
 *
 * The gate fails closed. Each of the following is a denial:
 * - no caller identity
 * - no such workspace
 * - the workspace is being removed (unless the removal itself is asking)
 * - no Member record for the caller
 * - an admin requirement the Member does not meet
 *
 * Store failures are not denials; they propagate to the caller.
 */

use uuid::Uuid;

use crate::backend::store::{DocumentStore, StoreResult};
use crate::shared::workspace::{Member, Workspace};

/// What the caller needs to be in the workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any membership
    Member,
    /// Membership with `Role::Admin`
    Admin,
}

/// A granted request: the workspace and the caller's membership in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Access {
    pub workspace: Workspace,
    pub member: Member,
}

/// Caller's Member record in a live workspace, if any
pub async fn current_member(
    store: &dyn DocumentStore,
    caller: Option<Uuid>,
    workspace_id: Uuid,
) -> StoreResult<Option<Member>> {
    let access = authorize(store, caller, workspace_id, Requirement::Member, false).await?;
    Ok(access.map(|a| a.member))
}

/// Grant access to any member of a live workspace
pub async fn require_member(
    store: &dyn DocumentStore,
    caller: Option<Uuid>,
    workspace_id: Uuid,
) -> StoreResult<Option<Access>> {
    authorize(store, caller, workspace_id, Requirement::Member, false).await
}

/// Grant access to an admin of a live workspace
pub async fn require_admin(
    store: &dyn DocumentStore,
    caller: Option<Uuid>,
    workspace_id: Uuid,
) -> StoreResult<Option<Access>> {
    authorize(store, caller, workspace_id, Requirement::Admin, false).await
}

/// Grant access to an admin, including while the workspace is tombstoned.
/// Only the removal path uses this, so an interrupted removal can be retried.
pub async fn require_admin_for_removal(
    store: &dyn DocumentStore,
    caller: Option<Uuid>,
    workspace_id: Uuid,
) -> StoreResult<Option<Access>> {
    authorize(store, caller, workspace_id, Requirement::Admin, true).await
}

async fn authorize(
    store: &dyn DocumentStore,
    caller: Option<Uuid>,
    workspace_id: Uuid,
    requirement: Requirement,
    allow_pending_removal: bool,
) -> StoreResult<Option<Access>> {
    let Some(user_id) = caller else {
        return Ok(None);
    };

    let Some(workspace) = store.workspace(workspace_id).await? else {
        return Ok(None);
    };
    if workspace.pending_removal && !allow_pending_removal {
        return Ok(None);
    }

    let Some(member) = store
        .member_by_workspace_and_user(workspace_id, user_id)
        .await?
    else {
        return Ok(None);
    };

    let granted = match requirement {
        Requirement::Member => true,
        Requirement::Admin => member.is_admin(),
    };
    if !granted {
        tracing::debug!(
            "[Members] User {} lacks {:?} in workspace {}",
            user_id,
            requirement,
            workspace_id
        );
        return Ok(None);
    }

    Ok(Some(Access { workspace, member }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::InMemoryStore;
    use crate::shared::workspace::{Role, WorkspacePatch};

    struct Fixture {
        store: InMemoryStore,
        workspace: Workspace,
        admin: Uuid,
        member: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let admin = Uuid::new_v4();
        let member = Uuid::new_v4();
        let workspace = Workspace::new("Acme".into(), admin, "abc123".into());
        store.insert_workspace(&workspace).await.unwrap();
        store
            .insert_member(&Member::new(admin, workspace.id, Role::Admin))
            .await
            .unwrap();
        store
            .insert_member(&Member::new(member, workspace.id, Role::Member))
            .await
            .unwrap();
        Fixture {
            store,
            workspace,
            admin,
            member,
        }
    }

    #[tokio::test]
    async fn test_anonymous_caller_is_denied() {
        let f = fixture().await;
        assert!(require_member(&f.store, None, f.workspace.id).await.unwrap().is_none());
        assert!(current_member(&f.store, None, f.workspace.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_workspace_is_denied() {
        let f = fixture().await;
        let access = require_member(&f.store, Some(f.admin), Uuid::new_v4()).await.unwrap();
        assert!(access.is_none());
    }

    #[tokio::test]
    async fn test_non_member_is_denied() {
        let f = fixture().await;
        let stranger = Uuid::new_v4();
        let access = require_member(&f.store, Some(stranger), f.workspace.id).await.unwrap();
        assert!(access.is_none());
    }

    #[tokio::test]
    async fn test_member_passes_member_requirement_only() {
        let f = fixture().await;
        let access = require_member(&f.store, Some(f.member), f.workspace.id)
            .await
            .unwrap()
            .expect("member access");
        assert_eq!(access.member.user_id, f.member);
        assert_eq!(access.workspace.id, f.workspace.id);

        let admin = require_admin(&f.store, Some(f.member), f.workspace.id).await.unwrap();
        assert!(admin.is_none());
    }

    #[tokio::test]
    async fn test_admin_passes_admin_requirement() {
        let f = fixture().await;
        let access = require_admin(&f.store, Some(f.admin), f.workspace.id).await.unwrap();
        assert_eq!(access.map(|a| a.member.role), Some(Role::Admin));
    }

    #[tokio::test]
    async fn test_tombstoned_workspace_only_open_to_removal() {
        let f = fixture().await;
        f.store
            .patch_workspace(f.workspace.id, &WorkspacePatch::mark_pending_removal())
            .await
            .unwrap();

        assert!(require_admin(&f.store, Some(f.admin), f.workspace.id).await.unwrap().is_none());
        assert!(current_member(&f.store, Some(f.admin), f.workspace.id).await.unwrap().is_none());

        let removal = require_admin_for_removal(&f.store, Some(f.admin), f.workspace.id)
            .await
            .unwrap();
        assert!(removal.is_some());

        let by_member = require_admin_for_removal(&f.store, Some(f.member), f.workspace.id)
            .await
            .unwrap();
        assert!(by_member.is_none());
    }
}
