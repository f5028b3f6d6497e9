// Handshake with the embedding surface (parent frame)
use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::MessageEvent;

use crate::util::{clog, cwarn};

pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostMessage {
    #[serde(rename = "miniapp.ready")]
    Ready { version: u32 },
    #[serde(rename = "miniapp.context")]
    Context {
        #[serde(default)]
        fid: Option<u64>,
    },
}

/// Parses a message posted to this frame. Foreign messages yield `None`.
pub fn parse_host_message(raw: &str) -> Option<HostMessage> {
    serde_json::from_str(raw).ok()
}

/// The identity carried by a context message; a zero fid counts as absent.
pub fn context_fid(msg: &HostMessage) -> Option<u64> {
    match msg {
        HostMessage::Context { fid: Some(fid) } if *fid > 0 => Some(*fid),
        _ => None,
    }
}

/// Tells the parent frame we are ready to receive context.
pub fn announce_ready() {
    let Some(win) = web_sys::window() else { return };
    let Ok(Some(parent)) = win.parent() else { return };
    let msg = HostMessage::Ready {
        version: PROTOCOL_VERSION,
    };
    let Ok(json) = serde_json::to_string(&msg) else { return };
    let Ok(value) = js_sys::JSON::parse(&json) else { return };
    if parent.post_message(&value, "*").is_err() {
        cwarn("could not announce readiness to host");
    }
}

/// Keeps the `message` listener installed; removing it on drop.
pub struct ContextListener {
    closure: Closure<dyn FnMut(MessageEvent)>,
}

impl Drop for ContextListener {
    fn drop(&mut self) {
        if let Some(win) = web_sys::window() {
            let _ = win.remove_event_listener_with_callback(
                "message",
                self.closure.as_ref().unchecked_ref(),
            );
        }
    }
}

/// Calls `on_fid` for the first context message that carries an identity.
pub fn listen_for_context(on_fid: impl Fn(u64) + 'static) -> Option<ContextListener> {
    let win = web_sys::window()?;
    let delivered = Rc::new(Cell::new(false));
    let closure = Closure::wrap(Box::new(move |ev: MessageEvent| {
        if delivered.get() {
            return;
        }
        let Some(raw) = js_sys::JSON::stringify(&ev.data())
            .ok()
            .and_then(|s| s.as_string())
        else {
            return;
        };
        if let Some(fid) = parse_host_message(&raw).as_ref().and_then(context_fid) {
            delivered.set(true);
            clog(&format!("host context received: fid {fid}"));
            on_fid(fid);
        }
    }) as Box<dyn FnMut(MessageEvent)>);
    win.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        .ok()?;
    Some(ContextListener { closure })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_message_matches_host_protocol() {
        let json = serde_json::to_string(&HostMessage::Ready { version: 1 }).expect("serializes");
        assert_eq!(json, r#"{"type":"miniapp.ready","version":1}"#);
    }

    #[test]
    fn context_message_yields_fid() {
        let msg = parse_host_message(r#"{"type":"miniapp.context","fid":1234,"client":{}}"#)
            .expect("context");
        assert_eq!(context_fid(&msg), Some(1234));
    }

    #[test]
    fn foreign_or_empty_messages_are_ignored() {
        assert_eq!(parse_host_message(r#"{"type":"other"}"#), None);
        assert_eq!(parse_host_message("\"hello\""), None);
        let empty = parse_host_message(r#"{"type":"miniapp.context"}"#).expect("context");
        assert_eq!(context_fid(&empty), None);
        let zero = parse_host_message(r#"{"type":"miniapp.context","fid":0}"#).expect("context");
        assert_eq!(context_fid(&zero), None);
    }
}
