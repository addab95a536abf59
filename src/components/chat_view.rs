use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, HtmlInputElement};

use crate::constants::AUTOMATED_MESSAGE_MARKER;
use crate::messages::Message;
use crate::models::{first_image_url, is_system_message, ApiChatMessage, ApiConversation};
use crate::state::{dispatch_global_message, APP_STATE};
use crate::utils::{format_message_time, truncate_preview};

// Main function to set up the chat page skeleton and its event handlers.
pub fn setup_chat_page(document: &Document) -> Result<(), JsValue> {
    if document.get_element_by_id("chat-page-container").is_none() {
        let container = document.create_element("div")?;
        container.set_id("chat-page-container");
        container.set_class_name("chat-page-container");

        container.set_inner_html(
            r#"
            <div class="conversation-sidebar">
                <div class="sidebar-header"><h3>Messages</h3></div>
                <div class="conversation-list"></div>
            </div>
            <div class="chat-main">
                <div class="chat-header">
                    <div class="chat-article-title"></div>
                    <div class="chat-role-line"></div>
                    <button class="buy-now-btn" style="display: none;">Buy Now</button>
                </div>
                <div class="messages-container"></div>
                <div class="chat-input-area">
                    <input type="text" class="chat-input" placeholder="Type your message...">
                    <input type="text" class="attachment-input" placeholder="Image URL (optional)">
                    <button class="send-button">Send</button>
                </div>
            </div>
        "#,
        );

        let app_container = document
            .get_element_by_id("app-container")
            .or_else(|| document.body().map(|b| b.into()))
            .ok_or(JsValue::from_str("Could not find app container"))?;
        app_container.append_child(&container)?;

        setup_chat_event_handlers(document)?;
    }

    Ok(())
}

fn setup_chat_event_handlers(document: &Document) -> Result<(), JsValue> {
    // Compose text mirrors into state on every keystroke so a failed send
    // never loses the draft.
    if let Some(input_el) = document.query_selector(".chat-input")? {
        let input_handler = Closure::wrap(Box::new(move |e: Event| {
            if let Some(input) = e
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            {
                dispatch_global_message(Message::UpdateComposeText(input.value()));
            }
        }) as Box<dyn FnMut(_)>);
        input_el
            .add_event_listener_with_callback("input", input_handler.as_ref().unchecked_ref())?;
        input_handler.forget();
    }

    if let Some(attachment_el) = document.query_selector(".attachment-input")? {
        let attachment_handler = Closure::wrap(Box::new(move |e: Event| {
            if let Some(input) = e
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            {
                let url = input.value();
                if url.trim().is_empty() {
                    dispatch_global_message(Message::ClearComposeAttachment);
                } else {
                    dispatch_global_message(Message::AttachComposeFile(url));
                }
            }
        }) as Box<dyn FnMut(_)>);
        attachment_el.add_event_listener_with_callback(
            "change",
            attachment_handler.as_ref().unchecked_ref(),
        )?;
        attachment_handler.forget();
    }

    if let Some(send_button) = document.query_selector(".send-button")? {
        let send_handler = Closure::wrap(Box::new(move |_: Event| {
            dispatch_global_message(Message::SendChatMessage);
        }) as Box<dyn FnMut(_)>);
        send_button
            .add_event_listener_with_callback("click", send_handler.as_ref().unchecked_ref())?;
        send_handler.forget();
    }

    if let Some(input_el) = document.query_selector(".chat-input")? {
        let keypress_handler = Closure::wrap(Box::new(move |e: web_sys::KeyboardEvent| {
            if e.key() == "Enter" {
                e.prevent_default();
                dispatch_global_message(Message::SendChatMessage);
            }
        }) as Box<dyn FnMut(_)>);
        input_el.add_event_listener_with_callback(
            "keypress",
            keypress_handler.as_ref().unchecked_ref(),
        )?;
        keypress_handler.forget();
    }

    if let Some(buy_button) = document.query_selector(".buy-now-btn")? {
        let buy_handler = Closure::wrap(Box::new(move |_: Event| {
            dispatch_global_message(Message::Checkout);
        }) as Box<dyn FnMut(_)>);
        buy_button
            .add_event_listener_with_callback("click", buy_handler.as_ref().unchecked_ref())?;
        buy_handler.forget();
    }

    Ok(())
}

// Re-render everything derived from state: sidebar, transcript, header.
pub fn refresh_chat_view(document: &Document) -> Result<(), JsValue> {
    APP_STATE.with(|state| {
        let state = state.borrow();

        update_conversation_list(document, &state)?;
        update_transcript(document, &state)?;
        update_header(document, &state)?;
        sync_compose_inputs(document, &state)?;

        Ok(())
    })
}

fn update_conversation_list(
    document: &Document,
    state: &crate::state::AppState,
) -> Result<(), JsValue> {
    let list = match document.query_selector(".conversation-list")? {
        Some(el) => el,
        None => return Ok(()),
    };
    list.set_inner_html("");

    if state.is_loading {
        let placeholder = document.create_element("div")?;
        placeholder.set_class_name("sidebar-loading");
        placeholder.set_text_content(Some("Loading conversations..."));
        list.append_child(&placeholder)?;
        return Ok(());
    }

    for conversation in state.store.list() {
        let item = document.create_element("div")?;
        if state.active_conversation_id == Some(conversation.id) {
            item.set_class_name("conversation-item selected");
        } else {
            item.set_class_name("conversation-item");
        }
        item.set_attribute("data-id", &conversation.id.to_string())?;

        // Article decoration is best-effort; fall back to the raw article id
        // until (or unless) the lookup completes.
        let article = state.articles.get(&conversation.article_id);
        let title = document.create_element("div")?;
        title.set_class_name("conversation-item-title");
        title.set_text_content(Some(&article_label(article, conversation.article_id)));
        if let Some(image) = article.and_then(|a| first_image_url(a.image_url.as_deref())) {
            let thumb = document.create_element("img")?;
            thumb.set_class_name("conversation-item-thumb");
            thumb.set_attribute("src", &image)?;
            item.append_child(&thumb)?;
        }

        let preview = document.create_element("div")?;
        preview.set_class_name("conversation-item-preview");
        match conversation.messages.last() {
            Some(last) => {
                let text = last.content.as_deref().unwrap_or("[image]");
                preview.set_text_content(Some(&truncate_preview(text)));
            }
            None => preview.set_text_content(Some("No messages yet")),
        }

        item.append_child(&title)?;
        item.append_child(&preview)?;

        if let Some(count) = state.unread.get(&conversation.id) {
            if *count > 0 {
                let badge = document.create_element("span")?;
                badge.set_class_name("unread-badge");
                badge.set_text_content(Some(&count.to_string()));
                item.append_child(&badge)?;
            }
        }

        let conversation_id = conversation.id;
        let click = Closure::wrap(Box::new(move |_: Event| {
            dispatch_global_message(Message::SelectConversation(conversation_id));
        }) as Box<dyn FnMut(_)>);
        item.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
        click.forget();

        list.append_child(&item)?;
    }

    Ok(())
}

fn update_transcript(document: &Document, state: &crate::state::AppState) -> Result<(), JsValue> {
    let container = match document.query_selector(".messages-container")? {
        Some(el) => el,
        None => return Ok(()),
    };
    container.set_inner_html("");

    let conversation = match state.active_conversation() {
        Some(c) => c,
        None => return Ok(()),
    };

    for message in &conversation.messages {
        container.append_child(&render_message(document, state, message)?.into())?;
    }

    container.set_scroll_top(container.scroll_height());
    Ok(())
}

fn render_message(
    document: &Document,
    state: &crate::state::AppState,
    message: &ApiChatMessage,
) -> Result<web_sys::Element, JsValue> {
    let element = document.create_element("div")?;

    if is_system_message(message) {
        element.set_class_name("message system-notice");
        let text = message
            .content
            .as_deref()
            .map(|c| c.replace(AUTOMATED_MESSAGE_MARKER, "").trim().to_string())
            .unwrap_or_default();
        element.set_text_content(Some(&text));
        return Ok(element);
    }

    let own = message.is_own(state.current_user_id);
    element.set_class_name(if own {
        "message own-message"
    } else {
        "message counterpart-message"
    });

    if let Some(content) = message.content.as_deref() {
        if !content.is_empty() {
            let body = document.create_element("div")?;
            body.set_class_name("message-content");
            body.set_text_content(Some(content));
            element.append_child(&body)?;
        }
    }

    if let Some(file_url) = message.file_url.as_deref() {
        let image = document.create_element("img")?;
        image.set_class_name("message-image");
        image.set_attribute("src", file_url)?;
        element.append_child(&image)?;
    }

    if let Some(time) = message
        .created_at
        .as_deref()
        .and_then(format_message_time)
    {
        let timestamp = document.create_element("div")?;
        timestamp.set_class_name("message-time");
        timestamp.set_text_content(Some(&time));
        element.append_child(&timestamp)?;
    }

    Ok(element)
}

fn update_header(document: &Document, state: &crate::state::AppState) -> Result<(), JsValue> {
    let conversation: Option<&ApiConversation> = state.active_conversation();

    if let Some(title_el) = document.query_selector(".chat-article-title")? {
        let text = match conversation {
            Some(c) => article_label(state.articles.get(&c.article_id), c.article_id),
            None => "Select a conversation".to_string(),
        };
        title_el.set_text_content(Some(&text));
    }

    if let Some(role_el) = document.query_selector(".chat-role-line")? {
        let text = match (conversation, state.current_user_id) {
            (Some(c), Some(uid)) if c.buyer_id == uid => "You are buying this item",
            (Some(c), Some(uid)) if c.seller_id == uid => "You are selling this item",
            _ => "",
        };
        role_el.set_text_content(Some(text));
    }

    // Buy Now is buyer-only.
    if let Some(buy_button) = document.query_selector(".buy-now-btn")? {
        let visible = state.is_active_buyer() && !state.buying;
        buy_button.set_attribute(
            "style",
            if visible {
                "display: inline-block;"
            } else {
                "display: none;"
            },
        )?;
    }

    Ok(())
}

/// Listing label for a conversation: the article title when the lookup
/// succeeded, otherwise the raw article id so the listing stays
/// identifiable even when the article service degrades.
fn article_label(article: Option<&crate::models::ApiArticle>, article_id: u32) -> String {
    match article {
        Some(article) => article.title.clone(),
        None => format!("Article #{}", article_id),
    }
}

fn sync_compose_inputs(document: &Document, state: &crate::state::AppState) -> Result<(), JsValue> {
    if let Some(input) = document
        .query_selector(".chat-input")?
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    {
        if input.value() != state.compose_text {
            input.set_value(&state.compose_text);
        }
    }

    if let Some(attachment) = document
        .query_selector(".attachment-input")?
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    {
        let expected = state.compose_attachment.as_deref().unwrap_or("");
        if attachment.value() != expected {
            attachment.set_value(expected);
        }
    }

    if let Some(send_button) = document
        .query_selector(".send-button")?
        .and_then(|el| el.dyn_into::<web_sys::HtmlButtonElement>().ok())
    {
        send_button.set_disabled(state.sending);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::article_label;
    use crate::models::ApiArticle;

    #[test]
    fn label_uses_the_article_title_when_decorated() {
        let article = ApiArticle {
            id: 110,
            title: "Vintage lamp".to_string(),
            price: 25.0,
            shipping_cost: 4.0,
            image_url: None,
            seller_id: 2,
            is_approved: true,
        };
        assert_eq!(article_label(Some(&article), 110), "Vintage lamp");
    }

    #[test]
    fn label_degrades_to_the_article_id_not_the_conversation_id() {
        assert_eq!(article_label(None, 110), "Article #110");
    }
}
