//! In-memory Conversation Store.
//!
//! Owns the canonical, de-duplicated, ordered message lists for every loaded
//! conversation.  Both producers - the send pipeline (request/response) and
//! the push channel - submit candidate messages through [`ConversationStore::merge`];
//! nothing else may mutate a conversation's message list.  The store performs
//! no I/O.

use std::collections::HashMap;

use crate::models::{ApiChatMessage, ApiConversation};

/// Result of a merge attempt, reported for observability and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The message id was new and was appended at the end of the list.
    Inserted,
    /// A message with the same id already existed; the call was a no-op.
    AlreadyPresent,
}

#[derive(Default)]
pub struct ConversationStore {
    conversations: HashMap<u32, ApiConversation>,
    /// Server-returned listing order, preserved for the sidebar.
    order: Vec<u32>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the full collection after a fresh `GET /chat/conversations`.
    /// Any state from a previous load is discarded.
    pub fn load(&mut self, conversations: Vec<ApiConversation>) {
        self.conversations.clear();
        self.order.clear();
        for conv in conversations {
            if !self.conversations.contains_key(&conv.id) {
                self.order.push(conv.id);
            }
            self.conversations.insert(conv.id, conv);
        }
    }

    /// Insert a conversation that was created after the initial load
    /// (buyer-initiated contact).  Existing entries are replaced in place and
    /// keep their sidebar position.
    pub fn upsert_conversation(&mut self, conversation: ApiConversation) {
        if !self.conversations.contains_key(&conversation.id) {
            self.order.push(conversation.id);
        }
        self.conversations.insert(conversation.id, conversation);
    }

    /// The idempotent insert-or-ignore both delivery paths converge on.
    ///
    /// The target conversation is named by the caller (pushes may reference
    /// any subscribed conversation, not just the active one).  Appending at
    /// the end is correct because server ids are issued in non-decreasing
    /// chronological order per conversation and both paths observe them in
    /// creation order; the list is deliberately never re-sorted.
    ///
    /// Returns `None` when the conversation id is unknown to the store.
    pub fn merge(
        &mut self,
        conversation_id: u32,
        message: ApiChatMessage,
    ) -> Option<(MergeOutcome, &ApiConversation)> {
        let conv = self.conversations.get_mut(&conversation_id)?;
        let outcome = if conv.messages.iter().any(|m| m.id == message.id) {
            MergeOutcome::AlreadyPresent
        } else {
            conv.messages.push(message);
            MergeOutcome::Inserted
        };
        Some((outcome, &*conv))
    }

    pub fn get(&self, conversation_id: u32) -> Option<&ApiConversation> {
        self.conversations.get(&conversation_id)
    }

    /// Conversations in load order.
    pub fn list(&self) -> Vec<&ApiConversation> {
        self.order
            .iter()
            .filter_map(|id| self.conversations.get(id))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn contains(&self, conversation_id: u32) -> bool {
        self.conversations.contains_key(&conversation_id)
    }

    /// First conversation in load order, used as the default selection.
    pub fn first_id(&self) -> Option<u32> {
        self.order.first().copied()
    }
}
