//! Status banner for non-fatal outcomes (send failures, checkout results).
//!
//! One reusable element at the bottom of the page; each call replaces the
//! previous text and restarts the hide timer, so rapid-fire outcomes never
//! stack up. Errors and successes differ only in background color.

use std::cell::RefCell;

use gloo_timers::callback::Timeout;
use web_sys::{Document, Element};

const BANNER_ID: &str = "chat-status-banner";
const HIDE_AFTER_MS: u32 = 4_000;

const BASE_STYLE: &str = "position:fixed;bottom:24px;left:50%;transform:translateX(-50%);\
    padding:10px 18px;border-radius:6px;color:#fff;font-family:sans-serif;\
    box-shadow:0 2px 6px rgba(0,0,0,.25);z-index:9999;";

#[derive(Debug, Clone, Copy)]
enum Severity {
    Success,
    Error,
}

impl Severity {
    fn background(self) -> &'static str {
        match self {
            Severity::Success => "background:#15803d;",
            Severity::Error => "background:#b91c1c;",
        }
    }
}

pub fn success(msg: &str) {
    show(msg, Severity::Success);
}

pub fn error(msg: &str) {
    show(msg, Severity::Error);
}

thread_local! {
    static HIDE_TIMER: RefCell<Option<Timeout>> = RefCell::new(None);
}

fn show(message: &str, severity: Severity) {
    let document = match web_sys::window().and_then(|w| w.document()) {
        Some(d) => d,
        None => return,
    };
    let banner = match banner_element(&document) {
        Some(b) => b,
        None => return,
    };

    banner.set_text_content(Some(message));
    let _ = banner.set_attribute(
        "style",
        &format!("{}{}", BASE_STYLE, severity.background()),
    );

    // Restart the hide timer; a newer notice extends the banner's lifetime.
    HIDE_TIMER.with(|slot| {
        if let Some(previous) = slot.borrow_mut().take() {
            previous.cancel();
        }
        let timeout = Timeout::new(HIDE_AFTER_MS, move || {
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                if let Some(banner) = document.get_element_by_id(BANNER_ID) {
                    let _ = banner.set_attribute("style", "display:none;");
                }
            }
        });
        *slot.borrow_mut() = Some(timeout);
    });
}

fn banner_element(document: &Document) -> Option<Element> {
    if let Some(existing) = document.get_element_by_id(BANNER_ID) {
        return Some(existing);
    }
    let banner = document.create_element("div").ok()?;
    banner.set_id(BANNER_ID);
    document.body()?.append_child(&banner).ok()?;
    Some(banner)
}
