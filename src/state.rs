use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::messages::{Command, Message};
use crate::models::ApiArticle;
use crate::store::ConversationStore;
use crate::update::update;

/// Global application state.  Single-threaded, event-driven: the send
/// pipeline and the push channel both funnel through
/// [`dispatch_global_message`], so state transitions never interleave
/// mid-operation and the store needs no locking.
pub struct AppState {
    /// Canonical conversation/message data.  Only the store's merge routine
    /// mutates message lists.
    pub store: ConversationStore,

    /// Article decorations keyed by article id.  Absent entries mean the
    /// lookup failed or has not completed; the view falls back to the id.
    pub articles: HashMap<u32, ApiArticle>,
    /// Article ids we already asked for, so failures are not retried in a loop.
    pub articles_requested: HashSet<u32>,

    /// Authenticated identity, read from the auth collaborator's storage.
    pub current_user_id: Option<u32>,

    pub active_conversation_id: Option<u32>,
    /// Unread counts for conversations other than the active one.
    pub unread: HashMap<u32, u32>,

    // Compose state for the active conversation.  Cleared only on a
    // successful send so the user can retry after a failure.
    pub compose_text: String,
    pub compose_attachment: Option<String>,

    pub sending: bool,
    pub buying: bool,
    /// True while the initial `GET /chat/conversations` is in flight; the
    /// sidebar shows a loading placeholder instead of an empty list.
    pub is_loading: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            store: ConversationStore::new(),
            articles: HashMap::new(),
            articles_requested: HashSet::new(),
            current_user_id: None,
            active_conversation_id: None,
            unread: HashMap::new(),
            compose_text: String::new(),
            compose_attachment: None,
            sending: false,
            buying: false,
            is_loading: true,
        }
    }

    /// Run the reducer and hand back the commands it produced.
    pub fn dispatch(&mut self, msg: Message) -> Vec<Command> {
        let mut commands = Vec::new();
        update(self, msg, &mut commands);
        commands
    }

    /// The conversation whose transcript and channel are live, if any.
    pub fn active_conversation(&self) -> Option<&crate::models::ApiConversation> {
        self.active_conversation_id.and_then(|id| self.store.get(id))
    }

    /// Whether the current user is the buyer in the active conversation
    /// (only buyers may trigger checkout).
    pub fn is_active_buyer(&self) -> bool {
        match (self.active_conversation_id, self.current_user_id) {
            (Some(conv_id), Some(user_id)) => self
                .store
                .get(conv_id)
                .map_or(false, |c| c.buyer_id == user_id),
            _ => false,
        }
    }

    /// Full chat view re-render from current state.  No-op outside a browser
    /// (host-side tests, early bootstrap).
    pub fn refresh_ui_after_state_change() -> Result<(), wasm_bindgen::JsValue> {
        let document = match web_sys::window().and_then(|w| w.document()) {
            Some(d) => d,
            None => return Ok(()),
        };
        crate::components::chat_view::refresh_chat_view(&document)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    pub static APP_STATE: RefCell<AppState> = RefCell::new(AppState::new());
}

/// Dispatch a message: update state while the borrow is held, then execute
/// the returned commands after it is released.  Commands may re-enter the
/// dispatcher; the borrow discipline here is what makes that safe.
pub fn dispatch_global_message(msg: Message) {
    let commands = APP_STATE.with(|state| {
        let mut state = state.borrow_mut();
        state.dispatch(msg)
    });

    for cmd in commands {
        crate::command_executors::execute_command(cmd);
    }

    if let Err(e) = AppState::refresh_ui_after_state_change() {
        crate::warn_log!("Failed to refresh UI after dispatch: {:?}", e);
    }
}
