//! Message Channel Client: one push subscription (WebSocket) per active
//! conversation.
//!
//! Owns the connect/reconnect/teardown lifecycle.  Inbound frames are parsed
//! into `ApiChatMessage` and handed to the store through the global
//! dispatcher; parse failures are logged and dropped without touching the
//! connection.  Every frame carries the channel *generation* it was wired
//! under - closing the channel bumps the generation, so a superseded
//! socket's late frames can never reach the store.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{MessageEvent, WebSocket};

use crate::constants::{WS_INITIAL_BACKOFF_MS, WS_MAX_BACKOFF_MS, WS_MAX_RECONNECT_ATTEMPTS};
use crate::debug_log;
use crate::models::ApiChatMessage;
use crate::warn_log;

/// Connection lifecycle: `Closed → Connecting → Open → Closed`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    Closed,
    Connecting,
    Open,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Closed => write!(f, "Closed"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Open => write!(f, "Open"),
        }
    }
}

/// Reconnect policy for unexpected closures.  Deliberate closes never retry.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub initial_backoff_ms: u32,
    pub max_backoff_ms: u32,
    pub max_reconnect_attempts: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: WS_INITIAL_BACKOFF_MS,
            max_backoff_ms: WS_MAX_BACKOFF_MS,
            max_reconnect_attempts: WS_MAX_RECONNECT_ATTEMPTS,
        }
    }
}

/// What to do with a raw inbound frame, given the generation it was wired
/// under and the channel's current generation.
#[derive(Debug, PartialEq)]
pub(crate) enum FrameDisposition {
    Deliver(ApiChatMessage),
    /// Frame from a superseded subscription - arrived after close.
    Stale,
    /// Not a valid message frame - dropped, connection stays up.
    Unparseable,
}

pub(crate) fn classify_frame(
    current_generation: u32,
    frame_generation: u32,
    raw: &str,
) -> FrameDisposition {
    if current_generation != frame_generation {
        return FrameDisposition::Stale;
    }
    match serde_json::from_str::<ApiChatMessage>(raw) {
        Ok(message) => FrameDisposition::Deliver(message),
        Err(_) => FrameDisposition::Unparseable,
    }
}

/// Interface the channel manager works against, so tests can substitute a
/// mock channel.
pub trait ChatChannelHandle {
    fn conversation_id(&self) -> u32;
    fn connection_state(&self) -> ConnectionState;
    fn connect(&mut self) -> Result<(), JsValue>;
    fn close(&mut self);
}

/// Live push subscription for one conversation.
pub struct ChatChannel {
    conversation_id: u32,
    config: ChannelConfig,
    websocket: Rc<RefCell<Option<WebSocket>>>,
    state: Rc<RefCell<ConnectionState>>,
    reconnect_attempt: Rc<RefCell<u32>>,
    reconnect_timer: Rc<RefCell<Option<Timeout>>>,
    /// Bumped on every deliberate close; frames check it before delivery.
    generation: Rc<RefCell<u32>>,
}

impl ChatChannel {
    pub fn new(conversation_id: u32, config: ChannelConfig) -> Self {
        Self {
            conversation_id,
            config,
            websocket: Rc::new(RefCell::new(None)),
            state: Rc::new(RefCell::new(ConnectionState::Closed)),
            reconnect_attempt: Rc::new(RefCell::new(0)),
            reconnect_timer: Rc::new(RefCell::new(None)),
            generation: Rc::new(RefCell::new(0)),
        }
    }

    #[cfg(test)]
    pub(crate) fn current_generation(&self) -> u32 {
        *self.generation.borrow()
    }

    /// Backoff before retry number `attempt` (zero-based): initial *
    /// 2^attempt, capped. The first retry waits the initial delay.
    fn backoff_ms(&self, attempt: u32) -> u32 {
        let delay = self
            .config
            .initial_backoff_ms
            .saturating_mul(2_u32.pow(attempt.min(10)));
        delay.min(self.config.max_backoff_ms)
    }

    /// Wire a fresh WebSocket for the current generation.
    fn establish_connection(&mut self) -> Result<(), JsValue> {
        let token = crate::utils::current_jwt()
            .ok_or_else(|| JsValue::from_str("No credential for chat channel"))?;
        let url = super::get_conversation_ws_url(self.conversation_id, &token);

        let ws = WebSocket::new(&url)?;
        let my_generation = *self.generation.borrow();
        let conversation_id = self.conversation_id;

        // Open: reset the retry counter so the next outage backs off from
        // the start again.
        let state_rc = self.state.clone();
        let attempt_rc = self.reconnect_attempt.clone();
        let generation_rc = self.generation.clone();
        let onopen = Closure::wrap(Box::new(move |_: web_sys::Event| {
            if *generation_rc.borrow() != my_generation {
                return;
            }
            debug_log!("Chat channel open for conversation {}", conversation_id);
            *state_rc.borrow_mut() = ConnectionState::Open;
            *attempt_rc.borrow_mut() = 0;
        }) as Box<dyn FnMut(web_sys::Event)>);
        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();

        // One JSON-encoded message per frame.
        let generation_rc = self.generation.clone();
        let onmessage = Closure::wrap(Box::new(move |event: MessageEvent| {
            let text = match event.data().dyn_into::<js_sys::JsString>() {
                Ok(t) => String::from(t),
                Err(_) => {
                    warn_log!("Chat channel: non-text frame ignored");
                    return;
                }
            };
            // Copy out of the RefCell before matching: the Deliver arm
            // dispatches synchronously and must not hold the borrow.
            let current_generation = *generation_rc.borrow();
            match classify_frame(current_generation, my_generation, &text) {
                FrameDisposition::Deliver(message) => {
                    crate::state::dispatch_global_message(
                        crate::messages::Message::ReceiveChatMessage(message),
                    );
                }
                FrameDisposition::Stale => {
                    debug_log!(
                        "Chat channel: late frame for closed subscription dropped ({})",
                        conversation_id
                    );
                }
                FrameDisposition::Unparseable => {
                    warn_log!("Chat channel: unparseable frame dropped: {}", text);
                }
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();

        let onerror = Closure::wrap(Box::new(move |e: web_sys::Event| {
            warn_log!("Chat channel error: {:?}", e);
            // The close handler decides whether to retry.
        }) as Box<dyn FnMut(web_sys::Event)>);
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();

        // Close: deliberate closes bumped the generation first and fall
        // through silently; anything else schedules a retry.
        let state_rc = self.state.clone();
        let attempt_rc = self.reconnect_attempt.clone();
        let generation_rc = self.generation.clone();
        let channel = self.clone();
        let onclose = Closure::wrap(Box::new(move |_: web_sys::Event| {
            if *generation_rc.borrow() != my_generation {
                return;
            }
            *state_rc.borrow_mut() = ConnectionState::Closed;

            let attempt = *attempt_rc.borrow();
            if attempt < channel.config.max_reconnect_attempts {
                // Delay derives from the attempt we are about to make, so
                // the first retry waits the initial backoff.
                let delay = channel.backoff_ms(attempt);
                *attempt_rc.borrow_mut() = attempt + 1;
                channel.clone().schedule_reconnect(my_generation, delay);
            } else {
                warn_log!(
                    "Chat channel for conversation {} gave up after {} attempts",
                    conversation_id,
                    attempt
                );
            }
        }) as Box<dyn FnMut(web_sys::Event)>);
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        onclose.forget();

        *self.websocket.borrow_mut() = Some(ws);
        Ok(())
    }

    fn schedule_reconnect(self, my_generation: u32, delay: u32) {
        debug_log!(
            "Chat channel reconnect for conversation {} in {} ms (attempt {})",
            self.conversation_id,
            delay,
            *self.reconnect_attempt.borrow()
        );

        let timer_slot = self.reconnect_timer.clone();
        let mut channel = self.clone();
        let timeout = Timeout::new(delay, move || {
            // The channel may have been deliberately closed while we waited.
            if *channel.generation.borrow() != my_generation {
                return;
            }
            *channel.state.borrow_mut() = ConnectionState::Connecting;
            if let Err(e) = channel.establish_connection() {
                warn_log!("Chat channel reconnect failed: {:?}", e);
                *channel.state.borrow_mut() = ConnectionState::Closed;
            }
        });
        *timer_slot.borrow_mut() = Some(timeout);
    }
}

impl ChatChannelHandle for ChatChannel {
    fn conversation_id(&self) -> u32 {
        self.conversation_id
    }

    fn connection_state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    /// Open the subscription.  Requires a valid credential; any previous
    /// socket owned by this channel is superseded first.
    fn connect(&mut self) -> Result<(), JsValue> {
        self.close();
        *self.reconnect_attempt.borrow_mut() = 0;
        *self.state.borrow_mut() = ConnectionState::Connecting;
        self.establish_connection()
    }

    /// Deterministic teardown: after this returns, no frame from this
    /// subscription can be merged.
    fn close(&mut self) {
        *self.generation.borrow_mut() += 1;
        if let Some(timer) = self.reconnect_timer.borrow_mut().take() {
            timer.cancel();
        }
        *self.state.borrow_mut() = ConnectionState::Closed;
        if let Some(ws) = self.websocket.borrow_mut().take() {
            if let Err(e) = ws.close_with_code(1000) {
                warn_log!("Error closing chat channel socket: {:?}", e);
            }
        }
    }
}

// Clones share all channel state (the socket handle included); only the
// closures created per connection hold a fixed generation.
impl Clone for ChatChannel {
    fn clone(&self) -> Self {
        Self {
            conversation_id: self.conversation_id,
            config: self.config.clone(),
            websocket: self.websocket.clone(),
            state: self.state.clone(),
            reconnect_attempt: self.reconnect_attempt.clone(),
            reconnect_timer: self.reconnect_timer.clone(),
            generation: self.generation.clone(),
        }
    }
}
