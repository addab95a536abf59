// src/messages.rs
//
// The events that can occur in the chat UI, plus the side-effect commands
// reducers hand back to be executed once the state borrow is released.

use crate::models::{ApiArticle, ApiChatMessage, ApiConversation};

#[derive(Debug)]
pub enum Message {
    // Bootstrap / conversation list
    LoadConversations,
    ConversationsLoaded(Vec<ApiConversation>),
    ConversationsLoadFailed(String),

    // Buyer initiates contact about an article
    OpenConversationForArticle(u32), // article_id
    ConversationOpened(ApiConversation),
    ConversationOpenFailed(String),

    // Sidebar navigation
    SelectConversation(u32),

    // Article decoration (read-only lookups, failures degrade gracefully)
    ArticleLoaded(ApiArticle),
    ArticleLoadFailed(u32), // article_id

    // Compose state
    UpdateComposeText(String),
    AttachComposeFile(String), // opaque file/data-url reference
    ClearComposeAttachment,

    // Send pipeline
    SendChatMessage,
    ChatMessageSent(ApiChatMessage),
    ChatMessageSendFailed { conversation_id: u32, error: String },

    // Push channel
    ReceiveChatMessage(ApiChatMessage),

    // Checkout (opaque payment simulation)
    Checkout,
    CheckoutCompleted { transaction_id: String },
    CheckoutFailed(String),
}

/// Side effects produced by the reducer.  Executed by
/// `command_executors::execute_command` after the `APP_STATE` borrow drops.
pub enum Command {
    /// Run a UI closure after state changes (toasts, focused re-renders).
    UpdateUI(Box<dyn FnOnce() + 'static>),

    /// GET /chat/conversations
    FetchConversations,

    /// GET /articles/{id}
    FetchArticle(u32),

    /// POST /chat/conversations {article_id}
    OpenConversation { article_id: u32 },

    /// POST /chat/conversations/{id}/messages
    CreateChatMessage {
        conversation_id: u32,
        content: Option<String>,
        file_url: Option<String>,
    },

    /// POST /chat/conversations/{id}/checkout
    Checkout(u32),

    /// Bind the push channel to this conversation (closing any previous one).
    OpenChannel(u32),
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::UpdateUI(_) => write!(f, "UpdateUI(..)"),
            Command::FetchConversations => write!(f, "FetchConversations"),
            Command::FetchArticle(id) => write!(f, "FetchArticle({})", id),
            Command::OpenConversation { article_id } => {
                write!(f, "OpenConversation {{ article_id: {} }}", article_id)
            }
            Command::CreateChatMessage {
                conversation_id, ..
            } => write!(
                f,
                "CreateChatMessage {{ conversation_id: {} }}",
                conversation_id
            ),
            Command::Checkout(id) => write!(f, "Checkout({})", id),
            Command::OpenChannel(id) => write!(f, "OpenChannel({})", id),
        }
    }
}
