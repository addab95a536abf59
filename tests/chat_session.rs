//! Session-level test driving the reducer pipeline the way a real chat
//! session does: bootstrap, navigation, a send with dual delivery, pushes
//! into a background conversation, and a checkout.
//!
//! Runs on the host: it exercises state transitions and the commands they
//! produce, never the browser side effects behind them.

use marketplace_frontend::messages::{Command, Message};
use marketplace_frontend::models::{ApiChatMessage, ApiConversation};
use marketplace_frontend::state::AppState;
use marketplace_frontend::store::MergeOutcome;

fn conversation(id: u32, buyer_id: u32, seller_id: u32) -> ApiConversation {
    ApiConversation {
        id,
        article_id: 100 + id,
        buyer_id,
        seller_id,
        created_at: Some("2024-05-01T10:00:00".to_string()),
        messages: Vec::new(),
    }
}

fn chat_message(conversation_id: u32, id: u32, sender_id: u32) -> ApiChatMessage {
    ApiChatMessage {
        id,
        conversation_id,
        sender_id,
        content: Some(format!("message {}", id)),
        file_url: None,
        created_at: Some("2024-05-01T10:05:00".to_string()),
    }
}

#[test]
fn full_buyer_session_converges() {
    let mut state = AppState::new();
    state.current_user_id = Some(1);

    // Bootstrap: two conversations, user 1 is the buyer in both.
    let cmds = state.dispatch(Message::ConversationsLoaded(vec![
        conversation(10, 1, 2),
        conversation(20, 1, 3),
    ]));
    assert_eq!(state.active_conversation_id, Some(10));
    assert!(cmds.iter().any(|c| matches!(c, Command::OpenChannel(10))));
    assert!(cmds
        .iter()
        .any(|c| matches!(c, Command::FetchArticle(110))));

    // Compose and send in the active conversation.
    state.dispatch(Message::UpdateComposeText("is this still available?".into()));
    let cmds = state.dispatch(Message::SendChatMessage);
    assert!(state.sending);
    assert!(cmds
        .iter()
        .any(|c| matches!(c, Command::CreateChatMessage { conversation_id: 10, .. })));

    // Canonical response lands, then the echoed push frame for the same id.
    state.dispatch(Message::ChatMessageSent(chat_message(10, 1, 1)));
    assert!(!state.sending);
    assert!(state.compose_text.is_empty());
    state.dispatch(Message::ReceiveChatMessage(chat_message(10, 1, 1)));
    assert_eq!(state.store.get(10).unwrap().messages.len(), 1);

    // A push for the background conversation merges there and counts unread.
    state.dispatch(Message::ReceiveChatMessage(chat_message(20, 7, 3)));
    assert_eq!(state.store.get(20).unwrap().messages.len(), 1);
    assert_eq!(state.unread.get(&20), Some(&1));

    // Switching conversations clears unread and rebinds the channel.
    let cmds = state.dispatch(Message::SelectConversation(20));
    assert_eq!(state.active_conversation_id, Some(20));
    assert!(state.unread.get(&20).is_none());
    assert!(cmds.iter().any(|c| matches!(c, Command::OpenChannel(20))));

    // Checkout as the buyer fires once and a completion reloads the list.
    let cmds = state.dispatch(Message::Checkout);
    assert!(cmds.iter().any(|c| matches!(c, Command::Checkout(20))));
    let cmds = state.dispatch(Message::CheckoutCompleted {
        transaction_id: "pi_mock_1".to_string(),
    });
    assert!(cmds
        .iter()
        .any(|c| matches!(c, Command::FetchConversations)));
    assert!(!state.buying);
}

#[test]
fn failed_send_keeps_the_draft_and_the_transcript_clean() {
    let mut state = AppState::new();
    state.current_user_id = Some(1);
    state.dispatch(Message::ConversationsLoaded(vec![conversation(10, 1, 2)]));

    state.dispatch(Message::UpdateComposeText("offer: 20 euros".into()));
    state.dispatch(Message::SendChatMessage);
    state.dispatch(Message::ChatMessageSendFailed {
        conversation_id: 10,
        error: "503".to_string(),
    });

    assert_eq!(state.compose_text, "offer: 20 euros");
    assert!(state.store.get(10).unwrap().messages.is_empty());
    assert!(!state.sending);

    // Retry succeeds; nothing was duplicated by the failed attempt.
    state.dispatch(Message::SendChatMessage);
    state.dispatch(Message::ChatMessageSent(chat_message(10, 2, 1)));
    assert_eq!(state.store.get(10).unwrap().messages.len(), 1);
}

#[test]
fn push_frames_replayed_out_of_band_stay_idempotent() {
    let mut state = AppState::new();
    state.current_user_id = Some(1);
    state.dispatch(Message::ConversationsLoaded(vec![conversation(10, 1, 2)]));

    // A flaky channel may replay frames after a reconnect.
    for _ in 0..3 {
        for id in [1u32, 2, 3] {
            state.dispatch(Message::ReceiveChatMessage(chat_message(10, id, 2)));
        }
    }

    let ids: Vec<u32> = state
        .store
        .get(10)
        .unwrap()
        .messages
        .iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);

    // Direct store access reports the duplicate outcome.
    let (outcome, _) = state.store.merge(10, chat_message(10, 2, 2)).unwrap();
    assert_eq!(outcome, MergeOutcome::AlreadyPresent);
}
