//! Utility helpers shared across the WASM frontend.

use unicode_segmentation::UnicodeSegmentation;

use crate::constants::{JWT_STORAGE_KEY, PREVIEW_MAX_GRAPHEMES, USER_ID_STORAGE_KEY};

/// Read the session JWT from local storage, if the user is logged in.
pub fn current_jwt() -> Option<String> {
    let storage = web_sys::window()?.local_storage().ok()??;
    storage.get_item(JWT_STORAGE_KEY).ok()?
}

/// Numeric id of the logged-in user, parsed from local storage.
pub fn current_user_id() -> Option<u32> {
    let storage = web_sys::window()?.local_storage().ok()??;
    let raw = storage.get_item(USER_ID_STORAGE_KEY).ok()??;
    raw.parse().ok()
}

/// Drop the stored credential and send the browser back to the login page.
/// The push channel is torn down first so no frame outlives the session.
pub fn logout() {
    crate::components::chat::ws_manager::close_chat_channel();
    if let Some(window) = web_sys::window() {
        if let Ok(Some(storage)) = window.local_storage() {
            let _ = storage.remove_item(JWT_STORAGE_KEY);
            let _ = storage.remove_item(USER_ID_STORAGE_KEY);
        }
        let _ = window.location().set_href("/login");
    }
}

/// Sidebar preview: first line of the message, truncated on grapheme
/// boundaries so multi-byte text never splits mid-character.
pub fn truncate_preview(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or("");
    let graphemes: Vec<&str> = first_line.graphemes(true).collect();
    if graphemes.len() <= PREVIEW_MAX_GRAPHEMES {
        first_line.to_string()
    } else {
        let mut out: String = graphemes[..PREVIEW_MAX_GRAPHEMES].concat();
        out.push('…');
        out
    }
}

/// Render an ISO-8601 timestamp as `HH:MM` local-agnostic wall time.
/// Display-only; message ordering never depends on this.
pub fn format_message_time(iso: &str) -> Option<String> {
    let parsed = chrono::DateTime::parse_from_rfc3339(iso)
        .map(|dt| dt.naive_local())
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()?;
    Some(parsed.format("%H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_preview_is_unchanged() {
        assert_eq!(truncate_preview("hello"), "hello");
    }

    #[test]
    fn long_preview_is_truncated_with_ellipsis() {
        let long = "a".repeat(100);
        let preview = truncate_preview(&long);
        assert_eq!(preview.graphemes(true).count(), PREVIEW_MAX_GRAPHEMES + 1);
        assert!(preview.ends_with('…'));
    }

    #[test]
    fn preview_respects_grapheme_boundaries() {
        let long = "é".repeat(60);
        let preview = truncate_preview(&long);
        assert!(preview.starts_with("é"));
        assert_eq!(preview.graphemes(true).count(), PREVIEW_MAX_GRAPHEMES + 1);
    }

    #[test]
    fn preview_uses_first_line_only() {
        assert_eq!(truncate_preview("first\nsecond"), "first");
    }

    #[test]
    fn formats_naive_backend_timestamp() {
        assert_eq!(
            format_message_time("2024-05-01T14:03:22.123456").as_deref(),
            Some("14:03")
        );
    }

    #[test]
    fn formats_rfc3339_timestamp() {
        assert_eq!(
            format_message_time("2024-05-01T09:30:00+00:00").as_deref(),
            Some("09:30")
        );
    }

    #[test]
    fn rejects_garbage_timestamp() {
        assert_eq!(format_message_time("yesterday"), None);
    }
}
