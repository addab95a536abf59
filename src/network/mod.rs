// Re-export network modules
pub mod api_client;
pub mod config;
pub mod ws_client;

pub use api_client::ApiClient;
pub use ws_client::{ChatChannel, ChatChannelHandle, ConnectionState};

use std::cell::RefCell;

use config::ApiConfig;

thread_local! {
    static API_CONFIG: RefCell<ApiConfig> = RefCell::new(
        ApiConfig::from_env().unwrap_or_default()
    );
}

/// Override the API base URL at runtime (bootstrap, tests).
pub fn init_api_config(base_url: &str) {
    API_CONFIG.with(|cfg| {
        *cfg.borrow_mut() = ApiConfig::from_url(base_url);
    });
}

/// Base URL for REST calls.
pub(crate) fn get_api_base_url() -> String {
    API_CONFIG.with(|cfg| cfg.borrow().base_url().to_string())
}

/// Push endpoint for one conversation, token included.
pub(crate) fn get_conversation_ws_url(conversation_id: u32, token: &str) -> String {
    API_CONFIG.with(|cfg| cfg.borrow().conversation_ws_url(conversation_id, token))
}
