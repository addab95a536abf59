use wasm_bindgen::prelude::*;

mod macros;

pub mod command_executors;
pub mod components;
pub mod constants;
pub mod messages;
pub mod models;
pub mod network;
pub mod reducers;
pub mod state;
pub mod store;
pub mod toast;
pub mod update;
pub mod utils;

#[cfg(test)]
mod store_prop_test;

// Main entry point for the WASM application
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Initialize better panic messages
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or(JsValue::from_str("no global `window` exists"))?;
    let document = window
        .document()
        .ok_or(JsValue::from_str("should have a document on window"))?;

    // Build the chat page skeleton and wire its event handlers.
    components::chat_view::setup_chat_page(&document)?;

    // Pick up the logged-in user before any data loads so own/counterpart
    // message alignment is right from the first render.
    state::APP_STATE.with(|state| {
        state.borrow_mut().current_user_id = utils::current_user_id();
    });

    state::dispatch_global_message(messages::Message::LoadConversations);

    Ok(())
}
