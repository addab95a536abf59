/// API route configuration.
pub struct ApiConfig {
    base_url: String,
}

impl Default for ApiConfig {
    /// Minimal default pointing at the local development backend.  Only
    /// meant for unit tests and the very first moments of bootstrap -
    /// production code calls `init_api_config()` with the real URL before
    /// any request goes out.
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

impl ApiConfig {
    /// Build from the `API_BASE_URL` compile-time environment variable.
    pub fn from_env() -> Result<Self, &'static str> {
        if let Some(url) = option_env!("API_BASE_URL") {
            Ok(Self::from_url(url))
        } else {
            Err("API_BASE_URL environment variable is not set")
        }
    }

    pub fn from_url(url: &str) -> Self {
        Self {
            base_url: url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL for all REST calls.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// WebSocket base derived from the HTTP base (`http → ws`, `https → wss`).
    pub fn ws_base_url(&self) -> String {
        if self.base_url.starts_with("https://") {
            self.base_url.replacen("https://", "wss://", 1)
        } else {
            self.base_url.replacen("http://", "ws://", 1)
        }
    }

    /// Push endpoint for one conversation.  Auth travels as a query
    /// parameter because the browser WebSocket API cannot set headers.
    pub fn conversation_ws_url(&self, conversation_id: u32, token: &str) -> String {
        format!(
            "{}/chat/conversations/{}/ws?token={}",
            self.ws_base_url(),
            conversation_id,
            token
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_base_follows_http_scheme() {
        assert_eq!(
            ApiConfig::from_url("https://market.example/api").ws_base_url(),
            "wss://market.example/api"
        );
        assert_eq!(
            ApiConfig::from_url("http://localhost:8000/").ws_base_url(),
            "ws://localhost:8000"
        );
    }

    #[test]
    fn conversation_ws_url_carries_id_and_token() {
        let cfg = ApiConfig::from_url("http://localhost:8000");
        assert_eq!(
            cfg.conversation_ws_url(12, "tok"),
            "ws://localhost:8000/chat/conversations/12/ws?token=tok"
        );
    }
}
