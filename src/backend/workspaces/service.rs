/**
 * Workspace Lifecycle Service
 *
 * Creation, joining, join-code rotation, renaming, removal and the read
 * queries for workspaces. Caller identity is always passed in explicitly as
 * `Option<Uuid>`; `None` is an anonymous caller.
 *
 * # Removal
 *
 * Removal is a cascade over five collections and cannot be made atomic
 * against a document store, so it is tombstoned:
 *
 * 1. mark the workspace `pending_removal` (hidden from all reads from here on)
 * 2. scan reactions, messages, conversations, channels and members concurrently
 * 3. delete those rows in `Collection::CASCADE_ORDER`, members last
 * 4. delete the workspace row
 *
 * Every step is idempotent. If a step fails the workspace stays tombstoned
 * and either the admin calling `remove` again or `sweep_pending_removals`
 * finishes the job.
 */

use futures_util::future::try_join_all;
use uuid::Uuid;

use super::error::{WorkspaceError, WorkspaceResult};
use super::join_code::{generate_join_code, rotate_join_code};
use super::locks::WorkspaceLocks;
use crate::backend::members::gate;
use crate::backend::realtime::{broadcast_event, RealtimeEventBroadcast};
use crate::backend::store::{Collection, SharedStore, StoreError, StoreResult};
use crate::shared::workspace::{
    validate_name, Channel, Member, Role, Workspace, WorkspaceInfo, WorkspacePatch,
    DEFAULT_CHANNEL_NAME,
};
use crate::shared::RealtimeEvent;

#[derive(Clone)]
pub struct WorkspaceService {
    store: SharedStore,
    locks: WorkspaceLocks,
    events: RealtimeEventBroadcast,
}

impl WorkspaceService {
    pub fn new(store: SharedStore, locks: WorkspaceLocks, events: RealtimeEventBroadcast) -> Self {
        Self {
            store,
            locks,
            events,
        }
    }

    /// Create a workspace owned by the caller, with the caller as its admin
    /// and a `general` channel
    pub async fn create(&self, caller: Option<Uuid>, name: &str) -> WorkspaceResult<Uuid> {
        let user_id = caller.ok_or(WorkspaceError::Unauthorized)?;
        let name = validate_name("name", name)?;

        let workspace = Workspace::new(name, user_id, generate_join_code());
        self.store.insert_workspace(&workspace).await?;

        if let Err(e) = self.seed(&workspace, user_id).await {
            tracing::error!(
                "[Workspaces] Failed to seed workspace {}: {}",
                workspace.id,
                e
            );
            self.discard(workspace.id).await;
            return Err(e.into());
        }

        tracing::info!(
            "[Workspaces] User {} created workspace {} ({})",
            user_id,
            workspace.id,
            workspace.name
        );
        broadcast_event(
            &self.events,
            RealtimeEvent::workspace_created(workspace.id, &workspace.name),
        );
        Ok(workspace.id)
    }

    async fn seed(&self, workspace: &Workspace, user_id: Uuid) -> StoreResult<()> {
        let admin = Member::new(user_id, workspace.id, Role::Admin);
        self.store.insert_member(&admin).await?;
        let general = Channel::new(workspace.id, DEFAULT_CHANNEL_NAME.to_string());
        self.store.insert_channel(&general).await
    }

    /// Best-effort undo of a half-created workspace
    async fn discard(&self, workspace_id: Uuid) {
        if let Err(e) = self.cascade(workspace_id).await {
            tracing::error!(
                "[Workspaces] Could not discard workspace {}: {}",
                workspace_id,
                e
            );
        }
    }

    /// Join a workspace with its join code. The code is compared
    /// case-insensitively.
    pub async fn join(
        &self,
        caller: Option<Uuid>,
        workspace_id: Uuid,
        join_code: &str,
    ) -> WorkspaceResult<Uuid> {
        let user_id = caller.ok_or(WorkspaceError::Unauthorized)?;
        let _guard = self.locks.acquire(workspace_id).await;

        let workspace = self
            .live_workspace(workspace_id)
            .await?
            .ok_or(WorkspaceError::NotFound("Workspace"))?;

        if !workspace.accepts_join_code(join_code) {
            tracing::warn!(
                "[Workspaces] User {} used a wrong join code for {}",
                user_id,
                workspace_id
            );
            return Err(WorkspaceError::InvalidJoinCode);
        }

        if self
            .store
            .member_by_workspace_and_user(workspace_id, user_id)
            .await?
            .is_some()
        {
            return Err(WorkspaceError::AlreadyMember);
        }

        let member = Member::new(user_id, workspace_id, Role::Member);
        match self.store.insert_member(&member).await {
            Ok(()) => {}
            Err(StoreError::Conflict { .. }) => return Err(WorkspaceError::AlreadyMember),
            Err(e) => return Err(e.into()),
        }

        tracing::info!("[Workspaces] User {} joined workspace {}", user_id, workspace_id);
        broadcast_event(
            &self.events,
            RealtimeEvent::member_joined(workspace_id, member.id, user_id),
        );
        Ok(workspace_id)
    }

    /// Replace the join code with a fresh one. Admins only.
    pub async fn new_join_code(
        &self,
        caller: Option<Uuid>,
        workspace_id: Uuid,
    ) -> WorkspaceResult<Uuid> {
        let _guard = self.locks.acquire(workspace_id).await;
        let access = gate::require_admin(self.store.as_ref(), caller, workspace_id)
            .await?
            .ok_or(WorkspaceError::Unauthorized)?;

        let code = rotate_join_code(&access.workspace.join_code);
        self.store
            .patch_workspace(workspace_id, &WorkspacePatch::join_code(code))
            .await?;

        tracing::info!("[Workspaces] Join code of workspace {} rotated", workspace_id);
        broadcast_event(&self.events, RealtimeEvent::join_code_rotated(workspace_id));
        Ok(workspace_id)
    }

    /// Rename a workspace. Admins only.
    pub async fn update(
        &self,
        caller: Option<Uuid>,
        workspace_id: Uuid,
        name: &str,
    ) -> WorkspaceResult<Uuid> {
        let name = validate_name("name", name)?;
        let _guard = self.locks.acquire(workspace_id).await;
        gate::require_admin(self.store.as_ref(), caller, workspace_id)
            .await?
            .ok_or(WorkspaceError::Unauthorized)?;

        self.store
            .patch_workspace(workspace_id, &WorkspacePatch::name(name.clone()))
            .await?;

        tracing::info!("[Workspaces] Workspace {} renamed to {}", workspace_id, name);
        broadcast_event(
            &self.events,
            RealtimeEvent::workspace_updated(workspace_id, &name),
        );
        Ok(workspace_id)
    }

    /// Remove a workspace and every row that belongs to it. Admins only.
    /// Also finishes a removal that was interrupted earlier.
    pub async fn remove(&self, caller: Option<Uuid>, workspace_id: Uuid) -> WorkspaceResult<Uuid> {
        let _guard = self.locks.acquire(workspace_id).await;
        let access = gate::require_admin_for_removal(self.store.as_ref(), caller, workspace_id)
            .await?
            .ok_or(WorkspaceError::Unauthorized)?;

        if !access.workspace.pending_removal {
            self.store
                .patch_workspace(workspace_id, &WorkspacePatch::mark_pending_removal())
                .await?;
        } else {
            tracing::info!("[Workspaces] Resuming removal of workspace {}", workspace_id);
        }

        if let Err(e) = self.cascade(workspace_id).await {
            tracing::error!(
                "[Workspaces] Removal of workspace {} interrupted: {}",
                workspace_id,
                e
            );
            return Err(e.into());
        }

        tracing::info!("[Workspaces] Workspace {} removed", workspace_id);
        broadcast_event(&self.events, RealtimeEvent::workspace_removed(workspace_id));
        Ok(workspace_id)
    }

    async fn cascade(&self, workspace_id: Uuid) -> StoreResult<()> {
        let scans = try_join_all(
            Collection::CASCADE_ORDER
                .iter()
                .map(|collection| self.store.ids_by_workspace(*collection, workspace_id)),
        )
        .await?;

        for (collection, ids) in Collection::CASCADE_ORDER.into_iter().zip(scans) {
            if !ids.is_empty() {
                tracing::debug!(
                    "[Workspaces] Deleting {} rows from {} for workspace {}",
                    ids.len(),
                    collection,
                    workspace_id
                );
            }
            for id in ids {
                self.store.delete(collection, id).await?;
            }
        }

        self.store.delete_workspace(workspace_id).await
    }

    /// Finish every removal left tombstoned by a failure. Returns how many
    /// workspaces were completed.
    pub async fn sweep_pending_removals(&self) -> StoreResult<usize> {
        let pending = self.store.workspaces_pending_removal().await?;
        let mut finished = 0;

        for workspace_id in pending {
            let _guard = self.locks.acquire(workspace_id).await;
            let still_pending = self
                .store
                .workspace(workspace_id)
                .await?
                .is_some_and(|w| w.pending_removal);
            if !still_pending {
                continue;
            }

            match self.cascade(workspace_id).await {
                Ok(()) => {
                    tracing::info!("[Workspaces] Sweep finished removing workspace {}", workspace_id);
                    broadcast_event(&self.events, RealtimeEvent::workspace_removed(workspace_id));
                    finished += 1;
                }
                Err(e) => {
                    tracing::error!(
                        "[Workspaces] Sweep could not remove workspace {}: {}",
                        workspace_id,
                        e
                    );
                }
            }
        }

        Ok(finished)
    }

    /// Every live workspace the caller is a member of, unordered
    pub async fn get(&self, caller: Option<Uuid>) -> WorkspaceResult<Vec<Workspace>> {
        let Some(user_id) = caller else {
            return Ok(Vec::new());
        };

        let members = self.store.members_by_user(user_id).await?;
        let workspaces = try_join_all(
            members
                .iter()
                .map(|member| self.store.workspace(member.workspace_id)),
        )
        .await?;

        Ok(workspaces
            .into_iter()
            .flatten()
            .filter(|w| !w.pending_removal)
            .collect())
    }

    /// The full workspace, for members. `Ok(None)` for non-members.
    pub async fn get_by_id(
        &self,
        caller: Option<Uuid>,
        workspace_id: Uuid,
    ) -> WorkspaceResult<Option<Workspace>> {
        if caller.is_none() {
            return Err(WorkspaceError::Unauthorized);
        }
        let access = gate::require_member(self.store.as_ref(), caller, workspace_id).await?;
        Ok(access.map(|a| a.workspace))
    }

    /// Join preview: the name and whether the caller already belongs.
    /// `Ok(None)` for anonymous callers.
    pub async fn get_info_by_id(
        &self,
        caller: Option<Uuid>,
        workspace_id: Uuid,
    ) -> WorkspaceResult<Option<WorkspaceInfo>> {
        if caller.is_none() {
            return Ok(None);
        }

        let workspace = self.live_workspace(workspace_id).await?;
        let member = gate::current_member(self.store.as_ref(), caller, workspace_id).await?;

        Ok(Some(WorkspaceInfo {
            name: workspace.map(|w| w.name),
            is_member: member.is_some(),
        }))
    }

    async fn live_workspace(&self, workspace_id: Uuid) -> StoreResult<Option<Workspace>> {
        Ok(self
            .store
            .workspace(workspace_id)
            .await?
            .filter(|w| !w.pending_removal))
    }
}
