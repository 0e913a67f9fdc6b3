/**
 * Message Service
 *
 * Members post messages into a channel, a direct conversation, or as a
 * reply to another message. Replies take their channel or conversation from
 * the parent and are one level deep.
 *
 * Reads are keyset pages, newest first. A page holds up to `limit` messages
 * and a `continue_cursor` naming the oldest one; passing it back yields the
 * next, older page. Callers who cannot see the location get an empty page
 * rather than an error.
 *
 * Conversation messages are visible only to the conversation's two members.
 *
 * Writes hold the workspace lock so they cannot land in a workspace whose
 * removal is in progress.
 */

use futures_util::future::try_join_all;
use uuid::Uuid;

use crate::backend::members::gate;
use crate::backend::realtime::{broadcast_event, RealtimeEventBroadcast};
use crate::backend::store::{Collection, MessageFilter, SharedStore, StoreResult};
use crate::backend::workspaces::{WorkspaceError, WorkspaceLocks, WorkspaceResult};
use crate::shared::workspace::{
    summarize_reactions, Conversation, CreateMessageRequest, Member, Message, MessagePage,
    MessageQuery, MessageView, Reaction, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
use crate::shared::{RealtimeEvent, SharedError};

#[derive(Clone)]
pub struct MessageService {
    store: SharedStore,
    locks: WorkspaceLocks,
    events: RealtimeEventBroadcast,
}

impl MessageService {
    pub fn new(store: SharedStore, locks: WorkspaceLocks, events: RealtimeEventBroadcast) -> Self {
        Self {
            store,
            locks,
            events,
        }
    }

    /// Post a message as the caller's member of the workspace
    pub async fn create(
        &self,
        caller: Option<Uuid>,
        workspace_id: Uuid,
        request: &CreateMessageRequest,
    ) -> WorkspaceResult<Uuid> {
        if caller.is_none() {
            return Err(WorkspaceError::Unauthorized);
        }
        let body = validate_body(&request.body)?;

        let _guard = self.locks.acquire(workspace_id).await;
        let access = gate::require_member(self.store.as_ref(), caller, workspace_id)
            .await?
            .ok_or(WorkspaceError::Unauthorized)?;

        let message = self
            .compose(workspace_id, &access.member, body, request)
            .await?;
        self.store.insert_message(&message).await?;

        tracing::debug!(
            "[Messages] Member {} posted message {} in workspace {}",
            access.member.id,
            message.id,
            workspace_id
        );
        broadcast_event(&self.events, RealtimeEvent::message_created(&message));
        Ok(message.id)
    }

    /// Build the message row, resolving where it goes
    async fn compose(
        &self,
        workspace_id: Uuid,
        author: &Member,
        body: String,
        request: &CreateMessageRequest,
    ) -> WorkspaceResult<Message> {
        if let Some(parent_id) = request.parent_message_id {
            let parent = self
                .store
                .message(parent_id)
                .await?
                .filter(|m| m.workspace_id == workspace_id)
                .ok_or(WorkspaceError::NotFound("Message"))?;
            if parent.parent_message_id.is_some() {
                return Err(SharedError::validation(
                    "parent_message_id",
                    "Cannot reply to a reply",
                )
                .into());
            }
            if !self.can_see(&parent, author).await? {
                return Err(WorkspaceError::Unauthorized);
            }
            return Ok(Message::reply_to(&parent, author.id, body));
        }

        match (request.channel_id, request.conversation_id) {
            (Some(channel_id), None) => {
                self.store
                    .channel(channel_id)
                    .await?
                    .filter(|c| c.workspace_id == workspace_id)
                    .ok_or(WorkspaceError::NotFound("Channel"))?;
                Ok(Message::in_channel(workspace_id, channel_id, author.id, body))
            }
            (None, Some(conversation_id)) => {
                let conversation = self
                    .store
                    .conversation(conversation_id)
                    .await?
                    .filter(|c| c.workspace_id == workspace_id)
                    .ok_or(WorkspaceError::NotFound("Conversation"))?;
                if !is_participant(&conversation, author) {
                    return Err(WorkspaceError::Unauthorized);
                }
                Ok(Message::in_conversation(
                    workspace_id,
                    conversation_id,
                    author.id,
                    body,
                ))
            }
            _ => Err(SharedError::validation(
                "channel_id",
                "A message needs exactly one of channel_id or conversation_id",
            )
            .into()),
        }
    }

    /// One page of a channel, conversation or thread
    pub async fn get(
        &self,
        caller: Option<Uuid>,
        workspace_id: Uuid,
        query: &MessageQuery,
    ) -> WorkspaceResult<MessagePage> {
        if caller.is_none() {
            return Err(WorkspaceError::Unauthorized);
        }
        let filter = message_filter(query)?;
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let Some(access) = gate::require_member(self.store.as_ref(), caller, workspace_id).await?
        else {
            return Ok(MessagePage::empty());
        };
        if !self.location_visible(filter, workspace_id, &access.member).await? {
            return Ok(MessagePage::empty());
        }

        let before = match query.cursor {
            Some(cursor) => Some(
                self.store
                    .message(cursor)
                    .await?
                    .filter(|m| filter.matches(m))
                    .ok_or_else(|| SharedError::validation("cursor", "Unknown cursor"))?,
            ),
            None => None,
        };

        let mut messages = self
            .store
            .messages_page(filter, before.as_ref(), limit + 1)
            .await?;
        let is_done = messages.len() <= limit;
        messages.truncate(limit);
        let continue_cursor = if is_done {
            None
        } else {
            messages.last().map(|m| m.id)
        };

        let page = try_join_all(messages.into_iter().map(|m| self.view(m))).await?;
        Ok(MessagePage {
            page,
            continue_cursor,
            is_done,
        })
    }

    /// A message the caller can see, or `None`
    pub async fn get_by_id(
        &self,
        caller: Option<Uuid>,
        message_id: Uuid,
    ) -> WorkspaceResult<Option<MessageView>> {
        let Some(message) = self.store.message(message_id).await? else {
            return Ok(None);
        };
        let Some(access) =
            gate::require_member(self.store.as_ref(), caller, message.workspace_id).await?
        else {
            return Ok(None);
        };
        if !self.can_see(&message, &access.member).await? {
            return Ok(None);
        }
        Ok(Some(self.view(message).await?))
    }

    /// Add the caller's reaction, or take it back if it is already there.
    /// Returns the id of the reaction added or removed.
    pub async fn toggle_reaction(
        &self,
        caller: Option<Uuid>,
        message_id: Uuid,
        value: &str,
    ) -> WorkspaceResult<Uuid> {
        if caller.is_none() {
            return Err(WorkspaceError::Unauthorized);
        }
        let value = value.trim();
        if value.is_empty() {
            return Err(SharedError::validation("value", "Reaction cannot be empty").into());
        }

        let workspace_id = self
            .store
            .message(message_id)
            .await?
            .ok_or(WorkspaceError::NotFound("Message"))?
            .workspace_id;
        let _guard = self.locks.acquire(workspace_id).await;
        let message = self
            .store
            .message(message_id)
            .await?
            .ok_or(WorkspaceError::NotFound("Message"))?;
        let access = gate::require_member(self.store.as_ref(), caller, workspace_id)
            .await?
            .ok_or(WorkspaceError::Unauthorized)?;
        if !self.can_see(&message, &access.member).await? {
            return Err(WorkspaceError::Unauthorized);
        }

        let existing = self
            .store
            .reactions_by_message(message_id)
            .await?
            .into_iter()
            .find(|r| r.member_id == access.member.id && r.value == value);
        let reaction_id = match existing {
            Some(reaction) => {
                self.store.delete(Collection::Reactions, reaction.id).await?;
                reaction.id
            }
            None => {
                let reaction = Reaction::new(&message, access.member.id, value.to_string());
                self.store.insert_reaction(&reaction).await?;
                reaction.id
            }
        };

        broadcast_event(
            &self.events,
            RealtimeEvent::reaction_toggled(workspace_id, message_id, value),
        );
        Ok(reaction_id)
    }

    /// The conversation between the caller and another member, opened on
    /// first use
    pub async fn create_or_get_conversation(
        &self,
        caller: Option<Uuid>,
        workspace_id: Uuid,
        other_member_id: Uuid,
    ) -> WorkspaceResult<Uuid> {
        if caller.is_none() {
            return Err(WorkspaceError::Unauthorized);
        }
        let _guard = self.locks.acquire(workspace_id).await;
        let access = gate::require_member(self.store.as_ref(), caller, workspace_id)
            .await?
            .ok_or(WorkspaceError::Unauthorized)?;
        let other = self
            .store
            .member(other_member_id)
            .await?
            .filter(|m| m.workspace_id == workspace_id)
            .ok_or(WorkspaceError::NotFound("Member"))?;

        if let Some(existing) = self
            .store
            .conversation_between(workspace_id, access.member.id, other.id)
            .await?
        {
            return Ok(existing.id);
        }

        let conversation = Conversation::new(workspace_id, access.member.id, other.id);
        self.store.insert_conversation(&conversation).await?;

        tracing::info!(
            "[Messages] Conversation {} opened in workspace {}",
            conversation.id,
            workspace_id
        );
        broadcast_event(
            &self.events,
            RealtimeEvent::conversation_created(workspace_id, conversation.id),
        );
        Ok(conversation.id)
    }

    async fn view(&self, message: Message) -> StoreResult<MessageView> {
        let reactions = self.store.reactions_by_message(message.id).await?;
        let thread_count = self.store.reply_count(message.id).await?;
        Ok(MessageView {
            message,
            reactions: summarize_reactions(&reactions),
            thread_count,
        })
    }

    /// Whether `member` may read `message`. Channel messages are open to
    /// every member; conversation messages only to the two participants.
    async fn can_see(&self, message: &Message, member: &Member) -> StoreResult<bool> {
        let Some(conversation_id) = message.conversation_id else {
            return Ok(true);
        };
        Ok(self
            .store
            .conversation(conversation_id)
            .await?
            .is_some_and(|c| is_participant(&c, member)))
    }

    async fn location_visible(
        &self,
        filter: MessageFilter,
        workspace_id: Uuid,
        member: &Member,
    ) -> StoreResult<bool> {
        match filter {
            MessageFilter::Channel(id) => Ok(self
                .store
                .channel(id)
                .await?
                .is_some_and(|c| c.workspace_id == workspace_id)),
            MessageFilter::Conversation(id) => Ok(self
                .store
                .conversation(id)
                .await?
                .is_some_and(|c| c.workspace_id == workspace_id && is_participant(&c, member))),
            MessageFilter::Thread(id) => match self.store.message(id).await? {
                Some(parent) if parent.workspace_id == workspace_id => {
                    self.can_see(&parent, member).await
                }
                _ => Ok(false),
            },
        }
    }
}

fn is_participant(conversation: &Conversation, member: &Member) -> bool {
    conversation.member_one_id == member.id || conversation.member_two_id == member.id
}

fn validate_body(body: &str) -> Result<String, SharedError> {
    if body.trim().is_empty() {
        return Err(SharedError::validation("body", "Message cannot be empty"));
    }
    Ok(body.to_string())
}

/// Exactly one location must be named
fn message_filter(query: &MessageQuery) -> Result<MessageFilter, SharedError> {
    match (query.channel_id, query.conversation_id, query.parent_message_id) {
        (Some(id), None, None) => Ok(MessageFilter::Channel(id)),
        (None, Some(id), None) => Ok(MessageFilter::Conversation(id)),
        (None, None, Some(id)) => Ok(MessageFilter::Thread(id)),
        _ => Err(SharedError::validation(
            "channel_id",
            "Name exactly one of channel_id, conversation_id or parent_message_id",
        )),
    }
}
