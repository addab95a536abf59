use serde::{Deserialize, Serialize};

use crate::constants::AUTOMATED_MESSAGE_MARKER;

// API models matching the chat/article service schemas.

/// One unit of conversation content.  `id` is the server-assigned,
/// per-conversation monotonically increasing identifier and is the only key
/// used for dedup and ordering; `created_at` is display-only because the two
/// delivery paths (send response, push frame) may carry skewed clocks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiChatMessage {
    pub id: u32,
    pub conversation_id: u32,
    pub sender_id: u32,
    pub content: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    pub created_at: Option<String>,
}

/// A buyer-seller thread scoped to one article listing.  Messages arrive
/// chronologically ordered from `GET /chat/conversations` and stay
/// append-only afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiConversation {
    pub id: u32,
    pub article_id: u32,
    pub buyer_id: u32,
    pub seller_id: u32,
    pub created_at: Option<String>,
    #[serde(default)]
    pub messages: Vec<ApiChatMessage>,
}

/// Request body for `POST /chat/conversations/{id}/messages`.
#[derive(Clone, Debug, Serialize)]
pub struct ChatMessageCreate {
    pub content: Option<String>,
    pub file_url: Option<String>,
}

/// Request body for `POST /chat/conversations`.
#[derive(Clone, Debug, Serialize)]
pub struct ConversationCreate {
    pub article_id: u32,
}

/// Read-only article lookup used to decorate the conversation list.  A
/// missing article (deleted, unapproved) must never break the chat view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiArticle {
    pub id: u32,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub shipping_cost: f64,
    pub image_url: Option<String>,
    pub seller_id: u32,
    #[serde(default)]
    pub is_approved: bool,
}

/// Response of the opaque checkout simulation call.
#[derive(Clone, Debug, Deserialize)]
pub struct PaymentReceipt {
    pub amount: f64,
    pub success: bool,
    pub transaction_id: Option<String>,
}

impl ApiChatMessage {
    /// Whether the sender of this message is the given user.
    pub fn is_own(&self, user_id: Option<u32>) -> bool {
        user_id.map_or(false, |id| id == self.sender_id)
    }
}

/// Derived classification, never stored: a message is "system/automated"
/// when the service's sentinel marker appears in its content.
pub fn is_system_message(message: &ApiChatMessage) -> bool {
    message
        .content
        .as_deref()
        .map_or(false, |c| c.contains(AUTOMATED_MESSAGE_MARKER))
}

/// The article service stores either a plain image URL or a JSON array of
/// URLs in `image_url`.  Return the first usable one.
pub fn first_image_url(image_url: Option<&str>) -> Option<String> {
    let url = image_url?;
    if url.starts_with('[') {
        if let Ok(urls) = serde_json::from_str::<Vec<String>>(url) {
            return urls.into_iter().next();
        }
        // Malformed array - fall through and treat it as a literal URL.
    }
    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(content: Option<&str>) -> ApiChatMessage {
        ApiChatMessage {
            id: 1,
            conversation_id: 1,
            sender_id: 2,
            content: content.map(|c| c.to_string()),
            file_url: None,
            created_at: None,
        }
    }

    #[test]
    fn system_classification_matches_marker() {
        assert!(is_system_message(&msg(Some(
            "🛍️ AUTOMATED MESSAGE: Buyer just purchased this item for $42"
        ))));
        assert!(!is_system_message(&msg(Some("hello there"))));
        assert!(!is_system_message(&msg(None)));
    }

    #[test]
    fn first_image_handles_plain_and_array_forms() {
        assert_eq!(
            first_image_url(Some("https://img/1.jpg")),
            Some("https://img/1.jpg".to_string())
        );
        assert_eq!(
            first_image_url(Some(r#"["https://img/a.jpg","https://img/b.jpg"]"#)),
            Some("https://img/a.jpg".to_string())
        );
        assert_eq!(first_image_url(Some("[]")), None);
        assert_eq!(first_image_url(None), None);
        assert_eq!(first_image_url(Some("")), None);
    }

    #[test]
    fn message_frame_round_trips_through_serde() {
        let raw = r#"{"id":7,"conversation_id":3,"sender_id":9,"content":"hi","file_url":null,"created_at":"2026-01-05T10:00:00"}"#;
        let parsed: ApiChatMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.id, 7);
        assert_eq!(parsed.conversation_id, 3);
        assert_eq!(parsed.content.as_deref(), Some("hi"));
        assert!(parsed.file_url.is_none());
    }
}
