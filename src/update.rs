// src/update.rs
//
// Root reducer.  Delegates to the domain reducers in `reducers/`; the chat
// domain currently owns every message, but the split keeps the layout ready
// for further marketplace views.

use crate::messages::{Command, Message};
use crate::state::AppState;

pub fn update(state: &mut AppState, msg: Message, commands: &mut Vec<Command>) {
    if crate::reducers::chat::update(state, msg, commands) {
        return;
    }
}
