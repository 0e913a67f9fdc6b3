/**
 * Workspace Routes
 *
 * Every route here resolves the caller from an optional bearer token. Which
 * routes accept an anonymous caller is decided by the services, not by the
 * router.
 *
 * ## Workspaces
 * - `POST /api/workspaces`, `GET /api/workspaces`
 * - `GET|PATCH|DELETE /api/workspaces/{workspace_id}`
 * - `GET /api/workspaces/{workspace_id}/info`
 * - `POST /api/workspaces/{workspace_id}/join`
 * - `POST /api/workspaces/{workspace_id}/join-code`
 *
 * ## Members
 * - `GET /api/workspaces/{workspace_id}/members/current`
 *
 * ## Channels
 * - `GET|POST /api/workspaces/{workspace_id}/channels`
 * - `GET|PATCH|DELETE /api/channels/{channel_id}`
 *
 * ## Messages
 * - `GET|POST /api/workspaces/{workspace_id}/messages`
 * - `POST /api/workspaces/{workspace_id}/conversations`
 * - `GET /api/messages/{message_id}`
 * - `POST /api/messages/{message_id}/reactions`
 *
 * ## Realtime
 * - `GET /api/workspaces/{workspace_id}/events` - SSE stream (members only)
 */

use axum::routing::{get, post};
use axum::Router;

use crate::backend::channels::handlers::{
    create_channel, get_channel, list_channels, remove_channel, update_channel,
};
use crate::backend::members::handlers::get_current_member;
use crate::backend::messages::handlers::{
    create_conversation, create_message, get_message, list_messages, toggle_reaction,
};
use crate::backend::realtime::handle_workspace_events;
use crate::backend::server::state::AppState;
use crate::backend::workspaces::handlers::{
    create_workspace, get_workspace, get_workspace_info, join_workspace, list_workspaces,
    remove_workspace, rotate_join_code, update_workspace,
};

/// Configure workspace, member, channel, message and event routes
pub fn configure_workspace_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/workspaces", get(list_workspaces).post(create_workspace))
        .route(
            "/api/workspaces/{workspace_id}",
            get(get_workspace)
                .patch(update_workspace)
                .delete(remove_workspace),
        )
        .route("/api/workspaces/{workspace_id}/info", get(get_workspace_info))
        .route("/api/workspaces/{workspace_id}/join", post(join_workspace))
        .route("/api/workspaces/{workspace_id}/join-code", post(rotate_join_code))
        .route(
            "/api/workspaces/{workspace_id}/members/current",
            get(get_current_member),
        )
        .route(
            "/api/workspaces/{workspace_id}/channels",
            get(list_channels).post(create_channel),
        )
        .route(
            "/api/channels/{channel_id}",
            get(get_channel).patch(update_channel).delete(remove_channel),
        )
        .route(
            "/api/workspaces/{workspace_id}/messages",
            get(list_messages).post(create_message),
        )
        .route(
            "/api/workspaces/{workspace_id}/conversations",
            post(create_conversation),
        )
        .route("/api/messages/{message_id}", get(get_message))
        .route("/api/messages/{message_id}/reactions", post(toggle_reaction))
        .route("/api/workspaces/{workspace_id}/events", get(handle_workspace_events))
}
