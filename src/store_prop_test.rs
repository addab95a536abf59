//! Property tests for the conversation store's merge semantics: replaying
//! any interleaving of push frames and send responses must converge to one
//! copy of each message, in arrival order of first sighting.

#![cfg(test)]

use proptest::prelude::*;

use crate::models::{ApiChatMessage, ApiConversation};
use crate::store::ConversationStore;

static CONVERSATION_IDS: [u32; 3] = [1, 2, 3];

fn seeded_store() -> ConversationStore {
    let mut store = ConversationStore::new();
    store.load(
        CONVERSATION_IDS
            .iter()
            .map(|&id| ApiConversation {
                id,
                article_id: id * 10,
                buyer_id: 100,
                seller_id: 200,
                created_at: None,
                messages: Vec::new(),
            })
            .collect(),
    );
    store
}

/// One inbound delivery: a message id targeted at one of the seeded
/// conversations.  Duplicate (conversation, id) pairs model the dual
/// delivery paths (send response and echoed push frame).
fn delivery_strategy() -> impl Strategy<Value = Vec<(u32, u32)>> {
    prop::collection::vec(
        (prop::sample::select(&CONVERSATION_IDS[..]), 1u32..20),
        0..60,
    )
}

fn message(conversation_id: u32, id: u32) -> ApiChatMessage {
    ApiChatMessage {
        id,
        conversation_id,
        sender_id: 100,
        content: Some(format!("m{}", id)),
        file_url: None,
        created_at: None,
    }
}

proptest! {
    #[test]
    fn merge_never_duplicates(deliveries in delivery_strategy()) {
        let mut store = seeded_store();
        for &(conversation_id, id) in &deliveries {
            store.merge(conversation_id, message(conversation_id, id));
        }

        for &conversation_id in &CONVERSATION_IDS {
            let conversation = store.get(conversation_id).unwrap();
            let mut ids: Vec<u32> = conversation.messages.iter().map(|m| m.id).collect();
            let before = ids.len();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), before, "duplicate message id survived merge");
        }
    }

    #[test]
    fn merge_is_idempotent_under_replay(deliveries in delivery_strategy()) {
        let mut store = seeded_store();
        for &(conversation_id, id) in &deliveries {
            store.merge(conversation_id, message(conversation_id, id));
        }
        let snapshot: Vec<Vec<u32>> = CONVERSATION_IDS
            .iter()
            .map(|&cid| store.get(cid).unwrap().messages.iter().map(|m| m.id).collect())
            .collect();

        // Replay the full history a second time.
        for &(conversation_id, id) in &deliveries {
            store.merge(conversation_id, message(conversation_id, id));
        }
        let replayed: Vec<Vec<u32>> = CONVERSATION_IDS
            .iter()
            .map(|&cid| store.get(cid).unwrap().messages.iter().map(|m| m.id).collect())
            .collect();

        prop_assert_eq!(snapshot, replayed);
    }

    #[test]
    fn transcript_preserves_first_sighting_order(deliveries in delivery_strategy()) {
        let mut store = seeded_store();
        for &(conversation_id, id) in &deliveries {
            store.merge(conversation_id, message(conversation_id, id));
        }

        for &conversation_id in &CONVERSATION_IDS {
            let mut expected: Vec<u32> = Vec::new();
            for &(cid, id) in &deliveries {
                if cid == conversation_id && !expected.contains(&id) {
                    expected.push(id);
                }
            }
            let actual: Vec<u32> = store
                .get(conversation_id)
                .unwrap()
                .messages
                .iter()
                .map(|m| m.id)
                .collect();
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn deliveries_never_leak_across_conversations(deliveries in delivery_strategy()) {
        let mut store = seeded_store();
        for &(conversation_id, id) in &deliveries {
            store.merge(conversation_id, message(conversation_id, id));
        }

        for &conversation_id in &CONVERSATION_IDS {
            let conversation = store.get(conversation_id).unwrap();
            prop_assert!(conversation
                .messages
                .iter()
                .all(|m| m.conversation_id == conversation_id));
        }
    }
}
