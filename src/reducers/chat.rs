//! Chat reducer: every state transition of the conversation view.
//!
//! The send pipeline's local validation lives here (reject before any
//! network command), and both delivery paths - the POST response and the
//! push frame - converge on [`merge_incoming`], which defers to the store's
//! idempotent merge.

use crate::debug_log;
use crate::messages::{Command, Message};
use crate::models::ApiChatMessage;
use crate::state::AppState;
use crate::store::MergeOutcome;
use crate::warn_log;

/// Returns `true` when the message was handled by the chat reducer.
pub fn update(state: &mut AppState, msg: Message, cmds: &mut Vec<Command>) -> bool {
    match msg {
        Message::LoadConversations => {
            state.is_loading = true;
            cmds.push(Command::FetchConversations);
            true
        }

        Message::ConversationsLoaded(conversations) => {
            state.is_loading = false;
            state.store.load(conversations);
            state.unread.clear();

            // Keep the current selection when it survived the reload,
            // otherwise fall back to the first conversation.
            let active = state
                .active_conversation_id
                .filter(|id| state.store.contains(*id))
                .or_else(|| state.store.first_id());
            state.active_conversation_id = active;

            request_missing_articles(state, cmds);

            if let Some(conversation_id) = active {
                cmds.push(Command::OpenChannel(conversation_id));
            }
            true
        }

        Message::ConversationsLoadFailed(error) => {
            state.is_loading = false;
            warn_log!("Failed to load conversations: {}", error);
            cmds.push(Command::UpdateUI(Box::new(move || {
                crate::toast::error("Could not load your conversations");
            })));
            true
        }

        Message::OpenConversationForArticle(article_id) => {
            // Self-chat is rejected before any network effect when the
            // article decoration is already cached.
            if let (Some(article), Some(user_id)) =
                (state.articles.get(&article_id), state.current_user_id)
            {
                if article.seller_id == user_id {
                    cmds.push(Command::UpdateUI(Box::new(|| {
                        crate::toast::error("You cannot message yourself about your own listing");
                    })));
                    return true;
                }
            }
            cmds.push(Command::OpenConversation { article_id });
            true
        }

        Message::ConversationOpened(conversation) => {
            let conversation_id = conversation.id;
            state.store.upsert_conversation(conversation);
            state.active_conversation_id = Some(conversation_id);
            state.unread.remove(&conversation_id);
            request_missing_articles(state, cmds);
            cmds.push(Command::OpenChannel(conversation_id));
            true
        }

        Message::ConversationOpenFailed(error) => {
            cmds.push(Command::UpdateUI(Box::new(move || {
                crate::toast::error(&error);
            })));
            true
        }

        Message::SelectConversation(conversation_id) => {
            if !state.store.contains(conversation_id) {
                warn_log!("SelectConversation: unknown conversation {}", conversation_id);
                return true;
            }
            if state.active_conversation_id != Some(conversation_id) {
                state.active_conversation_id = Some(conversation_id);
                cmds.push(Command::OpenChannel(conversation_id));
            }
            state.unread.remove(&conversation_id);
            true
        }

        Message::ArticleLoaded(article) => {
            state.articles.insert(article.id, article);
            true
        }

        Message::ArticleLoadFailed(article_id) => {
            // Article sold or removed - the conversation stays usable and
            // the view shows the raw id instead.
            debug_log!("Article {} unavailable, degrading to id", article_id);
            true
        }

        Message::UpdateComposeText(text) => {
            state.compose_text = text;
            true
        }

        Message::AttachComposeFile(file_url) => {
            state.compose_attachment = Some(file_url);
            true
        }

        Message::ClearComposeAttachment => {
            state.compose_attachment = None;
            true
        }

        Message::SendChatMessage => {
            let conversation_id = match state.active_conversation_id {
                Some(id) => id,
                None => {
                    debug_log!("Send rejected: no active conversation");
                    return true;
                }
            };
            let text = state.compose_text.trim();
            if text.is_empty() && state.compose_attachment.is_none() {
                debug_log!("Send rejected: empty compose state");
                return true;
            }
            if state.sending {
                // One in-flight send at a time; the button is disabled but a
                // queued Enter keypress can still race it here.
                return true;
            }

            state.sending = true;
            cmds.push(Command::CreateChatMessage {
                conversation_id,
                content: if text.is_empty() {
                    None
                } else {
                    Some(text.to_string())
                },
                file_url: state.compose_attachment.clone(),
            });
            true
        }

        Message::ChatMessageSent(message) => {
            state.sending = false;
            merge_incoming(state, message, cmds);
            // Compose state is cleared only on success; a failed send keeps
            // it intact for retry.
            state.compose_text.clear();
            state.compose_attachment = None;
            true
        }

        Message::ChatMessageSendFailed {
            conversation_id,
            error,
        } => {
            state.sending = false;
            warn_log!(
                "Send failed for conversation {}: {}",
                conversation_id,
                error
            );
            cmds.push(Command::UpdateUI(Box::new(|| {
                crate::toast::error("Message not sent - check your connection and try again");
            })));
            true
        }

        Message::ReceiveChatMessage(message) => {
            merge_incoming(state, message, cmds);
            true
        }

        Message::Checkout => {
            let conversation_id = match state.active_conversation_id {
                Some(id) => id,
                None => return true,
            };
            if !state.is_active_buyer() {
                cmds.push(Command::UpdateUI(Box::new(|| {
                    crate::toast::error("Only the buyer can check out this item");
                })));
                return true;
            }
            if state.buying {
                return true;
            }
            state.buying = true;
            cmds.push(Command::Checkout(conversation_id));
            true
        }

        Message::CheckoutCompleted { transaction_id } => {
            state.buying = false;
            cmds.push(Command::UpdateUI(Box::new(move || {
                crate::toast::success(&format!(
                    "Payment success! Transaction ID: {}",
                    transaction_id
                ));
            })));
            // Reload so the server's automated confirmation message shows up.
            cmds.push(Command::FetchConversations);
            true
        }

        Message::CheckoutFailed(detail) => {
            state.buying = false;
            cmds.push(Command::UpdateUI(Box::new(move || {
                crate::toast::error(&detail);
            })));
            true
        }
    }
}

/// Shared merge path for both producers.  Scoped by the message's own
/// conversation id - a push frame may belong to any subscribed conversation,
/// not necessarily the one on screen.
fn merge_incoming(state: &mut AppState, message: ApiChatMessage, cmds: &mut Vec<Command>) {
    let conversation_id = message.conversation_id;
    // A send response can land after the user switched conversations; the
    // sender's own message must not show up as unread there.
    let own = message.is_own(state.current_user_id);
    match state.store.merge(conversation_id, message) {
        None => {
            warn_log!(
                "Dropping message for unknown conversation {}",
                conversation_id
            );
        }
        Some((MergeOutcome::AlreadyPresent, _)) => {
            // Dual delivery (send response + echoed push frame) lands here.
            debug_log!(
                "Duplicate message for conversation {} ignored",
                conversation_id
            );
        }
        Some((MergeOutcome::Inserted, _)) => {
            if state.active_conversation_id != Some(conversation_id) && !own {
                *state.unread.entry(conversation_id).or_insert(0) += 1;
            }
            request_missing_articles(state, cmds);
        }
    }
}

/// Queue article lookups for conversations that are not decorated yet.
/// Each id is requested once; failures degrade instead of retrying.
fn request_missing_articles(state: &mut AppState, cmds: &mut Vec<Command>) {
    let missing: Vec<u32> = state
        .store
        .list()
        .iter()
        .map(|c| c.article_id)
        .filter(|id| !state.articles_requested.contains(id))
        .collect();
    for article_id in missing {
        state.articles_requested.insert(article_id);
        cmds.push(Command::FetchArticle(article_id));
    }
}
