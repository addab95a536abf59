//! Chat channel manager: exactly one live push subscription at a time.
//!
//! Selecting a conversation rebinds the subscription; the previous channel
//! is always torn down before the new one connects, so two subscriptions
//! never overlap and a superseded channel's frames never land in the store.

use std::cell::RefCell;

use wasm_bindgen::JsValue;

use crate::debug_log;
use crate::network::{ChatChannel, ChatChannelHandle, ConnectionState};
use crate::network::ws_client::ChannelConfig;

pub struct ChatChannelManager<C: ChatChannelHandle> {
    active: Option<C>,
}

impl<C: ChatChannelHandle> ChatChannelManager<C> {
    pub fn new() -> Self {
        Self { active: None }
    }

    pub fn active_conversation_id(&self) -> Option<u32> {
        self.active.as_ref().map(|c| c.conversation_id())
    }

    /// Make `channel` the live subscription.  The old channel (if any) is
    /// closed first; if the requested conversation is already live the call
    /// is a no-op and `channel` is discarded unopened.
    pub fn activate(&mut self, mut channel: C) -> Result<(), JsValue> {
        if let Some(active) = &self.active {
            if active.conversation_id() == channel.conversation_id()
                && active.connection_state() != ConnectionState::Closed
            {
                return Ok(());
            }
        }
        if let Some(mut old) = self.active.take() {
            debug_log!(
                "Closing chat channel for conversation {} before rebinding",
                old.conversation_id()
            );
            old.close();
        }
        channel.connect()?;
        self.active = Some(channel);
        Ok(())
    }

    /// Tear down the live subscription, if any.
    pub fn shutdown(&mut self) {
        if let Some(mut old) = self.active.take() {
            old.close();
        }
    }
}

thread_local! {
    static CHAT_CHANNEL_MANAGER: RefCell<ChatChannelManager<ChatChannel>> =
        RefCell::new(ChatChannelManager::new());
}

/// Bind the push subscription to `conversation_id`.
pub fn init_chat_channel(conversation_id: u32) -> Result<(), JsValue> {
    CHAT_CHANNEL_MANAGER.with(|manager| {
        manager
            .borrow_mut()
            .activate(ChatChannel::new(conversation_id, ChannelConfig::default()))
    })
}

/// Close the active subscription (conversation deselected or logout).
pub fn close_chat_channel() {
    CHAT_CHANNEL_MANAGER.with(|manager| manager.borrow_mut().shutdown());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    struct MockChannel {
        conversation_id: u32,
        state: ConnectionState,
        events: Rc<RefCell<Vec<String>>>,
    }

    impl MockChannel {
        fn new(conversation_id: u32, events: Rc<RefCell<Vec<String>>>) -> Self {
            Self {
                conversation_id,
                state: ConnectionState::Closed,
                events,
            }
        }
    }

    impl ChatChannelHandle for MockChannel {
        fn conversation_id(&self) -> u32 {
            self.conversation_id
        }

        fn connection_state(&self) -> ConnectionState {
            self.state.clone()
        }

        fn connect(&mut self) -> Result<(), JsValue> {
            self.state = ConnectionState::Open;
            self.events
                .borrow_mut()
                .push(format!("connect:{}", self.conversation_id));
            Ok(())
        }

        fn close(&mut self) {
            self.state = ConnectionState::Closed;
            self.events
                .borrow_mut()
                .push(format!("close:{}", self.conversation_id));
        }
    }

    #[test]
    fn first_activation_connects() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut manager = ChatChannelManager::new();

        manager
            .activate(MockChannel::new(1, events.clone()))
            .unwrap();

        assert_eq!(*events.borrow(), vec!["connect:1"]);
        assert_eq!(manager.active_conversation_id(), Some(1));
    }

    #[test]
    fn rebinding_closes_old_channel_before_connecting_new() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut manager = ChatChannelManager::new();

        manager
            .activate(MockChannel::new(1, events.clone()))
            .unwrap();
        manager
            .activate(MockChannel::new(2, events.clone()))
            .unwrap();

        assert_eq!(*events.borrow(), vec!["connect:1", "close:1", "connect:2"]);
        assert_eq!(manager.active_conversation_id(), Some(2));
    }

    #[test]
    fn reselecting_live_conversation_is_a_no_op() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut manager = ChatChannelManager::new();

        manager
            .activate(MockChannel::new(1, events.clone()))
            .unwrap();
        manager
            .activate(MockChannel::new(1, events.clone()))
            .unwrap();

        assert_eq!(*events.borrow(), vec!["connect:1"]);
    }

    #[test]
    fn shutdown_closes_active_channel() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut manager = ChatChannelManager::new();

        manager
            .activate(MockChannel::new(7, events.clone()))
            .unwrap();
        manager.shutdown();

        assert_eq!(*events.borrow(), vec!["connect:7", "close:7"]);
        assert_eq!(manager.active_conversation_id(), None);
    }
}
