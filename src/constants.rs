// Constants shared across the frontend.

/// Sentinel the chat service embeds in automated messages (checkout
/// confirmations etc.).  Messages containing it render as system notices.
pub const AUTOMATED_MESSAGE_MARKER: &str = "AUTOMATED MESSAGE";

/// Sidebar preview length in grapheme clusters.
pub const PREVIEW_MAX_GRAPHEMES: usize = 40;

/// WebSocket reconnect policy. First retry after 1s, doubling up to the cap.
pub const WS_INITIAL_BACKOFF_MS: u32 = 1_000;
pub const WS_MAX_BACKOFF_MS: u32 = 30_000;
pub const WS_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// localStorage keys owned by the auth collaborator.  We only read them.
pub const JWT_STORAGE_KEY: &str = "marketplace_jwt";
pub const USER_ID_STORAGE_KEY: &str = "marketplace_user_id";
