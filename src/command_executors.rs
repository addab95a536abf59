//! Command executors: the async side effects behind reducer commands.
//!
//! Runs after the `APP_STATE` borrow is released, so every completion
//! dispatches back through `dispatch_global_message` instead of touching
//! state directly.

use wasm_bindgen::JsValue;

use crate::debug_log;
use crate::error_log;
use crate::messages::{Command, Message};
use crate::models::{ApiArticle, ApiChatMessage, ApiConversation, PaymentReceipt};
use crate::network::api_client::ApiClient;
use crate::state::dispatch_global_message;

pub fn execute_command(cmd: Command) {
    match cmd {
        Command::UpdateUI(ui_fn) => ui_fn(),

        Command::FetchConversations => {
            debug_log!("Executing FetchConversations command");
            wasm_bindgen_futures::spawn_local(async move {
                match ApiClient::get_conversations().await {
                    Ok(response) => {
                        match serde_json::from_str::<Vec<ApiConversation>>(&response) {
                            Ok(conversations) => {
                                debug_log!("Fetched {} conversations", conversations.len());
                                dispatch_global_message(Message::ConversationsLoaded(
                                    conversations,
                                ));
                            }
                            Err(e) => dispatch_global_message(Message::ConversationsLoadFailed(
                                format!("parse error: {}", e),
                            )),
                        }
                    }
                    Err(e) => dispatch_global_message(Message::ConversationsLoadFailed(
                        js_error_string(e),
                    )),
                }
            });
        }

        Command::FetchArticle(article_id) => {
            wasm_bindgen_futures::spawn_local(async move {
                match ApiClient::get_article(article_id).await {
                    Ok(response) => match serde_json::from_str::<ApiArticle>(&response) {
                        Ok(article) => dispatch_global_message(Message::ArticleLoaded(article)),
                        Err(e) => {
                            error_log!("Failed to parse article {}: {}", article_id, e);
                            dispatch_global_message(Message::ArticleLoadFailed(article_id));
                        }
                    },
                    // Sold or deleted articles 404 here - degrade, don't retry.
                    Err(_) => dispatch_global_message(Message::ArticleLoadFailed(article_id)),
                }
            });
        }

        Command::OpenConversation { article_id } => {
            wasm_bindgen_futures::spawn_local(async move {
                match ApiClient::create_conversation(article_id).await {
                    Ok(response) => match serde_json::from_str::<ApiConversation>(&response) {
                        Ok(conversation) => {
                            dispatch_global_message(Message::ConversationOpened(conversation))
                        }
                        Err(e) => dispatch_global_message(Message::ConversationOpenFailed(
                            format!("parse error: {}", e),
                        )),
                    },
                    Err(e) => dispatch_global_message(Message::ConversationOpenFailed(
                        js_error_string(e),
                    )),
                }
            });
        }

        Command::CreateChatMessage {
            conversation_id,
            content,
            file_url,
        } => {
            wasm_bindgen_futures::spawn_local(async move {
                match ApiClient::create_chat_message(
                    conversation_id,
                    content.as_deref(),
                    file_url.as_deref(),
                )
                .await
                {
                    Ok(response) => match serde_json::from_str::<ApiChatMessage>(&response) {
                        Ok(message) => {
                            dispatch_global_message(Message::ChatMessageSent(message))
                        }
                        Err(e) => dispatch_global_message(Message::ChatMessageSendFailed {
                            conversation_id,
                            error: format!("parse error: {}", e),
                        }),
                    },
                    Err(e) => dispatch_global_message(Message::ChatMessageSendFailed {
                        conversation_id,
                        error: js_error_string(e),
                    }),
                }
            });
        }

        Command::Checkout(conversation_id) => {
            wasm_bindgen_futures::spawn_local(async move {
                match ApiClient::checkout(conversation_id).await {
                    Ok(response) => match serde_json::from_str::<PaymentReceipt>(&response) {
                        Ok(receipt) if receipt.success => {
                            dispatch_global_message(Message::CheckoutCompleted {
                                transaction_id: receipt
                                    .transaction_id
                                    .unwrap_or_else(|| "unknown".to_string()),
                            })
                        }
                        Ok(_) => dispatch_global_message(Message::CheckoutFailed(
                            "Checkout was declined".to_string(),
                        )),
                        Err(e) => dispatch_global_message(Message::CheckoutFailed(format!(
                            "parse error: {}",
                            e
                        ))),
                    },
                    // Server-side authorization failures surface verbatim.
                    Err(e) => dispatch_global_message(Message::CheckoutFailed(js_error_string(e))),
                }
            });
        }

        Command::OpenChannel(conversation_id) => {
            if let Err(e) = crate::components::chat::ws_manager::init_chat_channel(conversation_id)
            {
                error_log!(
                    "Failed to open channel for conversation {}: {:?}",
                    conversation_id,
                    e
                );
                // Non-fatal: the send pipeline keeps working without live
                // updates from the counterpart.
            }
        }
    }
}

fn js_error_string(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}
