use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::models::{ChatMessageCreate, ConversationCreate};
use crate::utils as auth_utils;

/// REST client for the chat and article services.
pub struct ApiClient;

impl ApiClient {
    fn api_base_url() -> String {
        super::get_api_base_url()
    }

    // ---------------- Chat service ----------------

    /// Full conversation list for the authenticated user, each with its
    /// chronologically ordered message list.
    pub async fn get_conversations() -> Result<String, JsValue> {
        let url = format!("{}/chat/conversations", Self::api_base_url());
        Self::fetch_json(&url, "GET", None).await
    }

    /// Create (or return the existing) conversation between the caller and
    /// the article's seller.
    pub async fn create_conversation(article_id: u32) -> Result<String, JsValue> {
        let url = format!("{}/chat/conversations", Self::api_base_url());
        let body = serde_json::to_string(&ConversationCreate { article_id })
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))?;
        Self::fetch_json(&url, "POST", Some(&body)).await
    }

    /// The send pipeline's single request.  The response body is the
    /// canonical message (authoritative id and timestamp).
    pub async fn create_chat_message(
        conversation_id: u32,
        content: Option<&str>,
        file_url: Option<&str>,
    ) -> Result<String, JsValue> {
        let url = format!(
            "{}/chat/conversations/{}/messages",
            Self::api_base_url(),
            conversation_id
        );
        let body = serde_json::to_string(&ChatMessageCreate {
            content: content.map(|c| c.to_string()),
            file_url: file_url.map(|u| u.to_string()),
        })
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))?;
        Self::fetch_json(&url, "POST", Some(&body)).await
    }

    /// Opaque payment simulation; the result is surfaced verbatim.
    pub async fn checkout(conversation_id: u32) -> Result<String, JsValue> {
        let url = format!(
            "{}/chat/conversations/{}/checkout",
            Self::api_base_url(),
            conversation_id
        );
        Self::fetch_json(&url, "POST", None).await
    }

    // ---------------- Article service (read-only decoration) ----------------

    pub async fn get_article(article_id: u32) -> Result<String, JsValue> {
        let url = format!("{}/articles/{}", Self::api_base_url(), article_id);
        Self::fetch_json(&url, "GET", None).await
    }

    // Helper function to make fetch requests
    pub async fn fetch_json(url: &str, method: &str, body: Option<&str>) -> Result<String, JsValue> {
        use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::Cors);

        let headers = Headers::new()?;

        // Attach the bearer token whenever the auth collaborator has one.
        if let Some(jwt) = auth_utils::current_jwt() {
            headers.append("Authorization", &format!("Bearer {}", jwt))?;
        }

        if let Some(data) = body {
            opts.set_body(&JsValue::from_str(data));
            headers.append("Content-Type", "application/json")?;
        }

        opts.set_headers(&headers);

        let request = Request::new_with_str_and_init(url, &opts)?;

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
        let resp: Response = resp_value.dyn_into()?;

        if !resp.ok() {
            let status = resp.status();

            // Expired or invalid token - hand control back to the auth
            // collaborator.
            if status == 401 {
                let _ = auth_utils::logout();
            }

            // Surface the server's `detail` message verbatim when present,
            // otherwise the bare status line.
            let body_text = match resp.text() {
                Ok(p) => JsFuture::from(p)
                    .await
                    .ok()
                    .and_then(|t| t.as_string())
                    .unwrap_or_default(),
                Err(_) => String::new(),
            };
            let detail = serde_json::from_str::<serde_json::Value>(&body_text)
                .ok()
                .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from));
            return Err(JsValue::from_str(&detail.unwrap_or_else(|| {
                format!("API request failed: {} {}", status, resp.status_text())
            })));
        }

        // Parse body as text - caller decodes JSON.
        let text = JsFuture::from(resp.text()?).await?;
        Ok(text.as_string().unwrap_or_default())
    }
}
