//! Window `message` events as a `MessageBus`.
//!
//! Each subscription installs its own listener on `window` and keeps the
//! closure until the matching `unsubscribe`, which removes the listener
//! before the closure is dropped.

use checkout_core::{
    FrameId, InboundMessage, ListenerId, MessageBus, MessageHandler, WidgetError, WidgetResult,
    FRAME_ID_ATTR,
};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlIFrameElement, MessageEvent, Window};

type EventClosure = Closure<dyn FnMut(MessageEvent)>;

/// Message bus backed by the browser window
pub struct WindowMessageBus {
    window: Window,
    next_id: Cell<u64>,
    listeners: RefCell<HashMap<ListenerId, EventClosure>>,
}

impl WindowMessageBus {
    pub fn new() -> WidgetResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| WidgetError::Bus("no window available".to_string()))?;
        Ok(Self {
            window,
            next_id: Cell::new(0),
            listeners: RefCell::new(HashMap::new()),
        })
    }
}

impl MessageBus for WindowMessageBus {
    fn subscribe(&self, handler: MessageHandler) -> WidgetResult<ListenerId> {
        let id = ListenerId::new(self.next_id.get());
        self.next_id.set(id.raw() + 1);

        let document = self.window.document();
        let mut handler = handler;
        let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
            let message = to_inbound(document.as_ref(), &event);
            handler(&message);
        }) as Box<dyn FnMut(MessageEvent)>);

        self.window
            .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            .map_err(|e| WidgetError::Bus(format!("{:?}", e)))?;

        self.listeners.borrow_mut().insert(id, closure);
        Ok(id)
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        let Some(closure) = self.listeners.borrow_mut().remove(&id) else {
            return false;
        };
        // A failed removal leaves a listener whose session handler is inert
        let _ = self
            .window
            .remove_event_listener_with_callback("message", closure.as_ref().unchecked_ref());
        true
    }
}

/// Translate a DOM event into the core message shape.
///
/// Payloads that cannot be represented as JSON become `null`, which the
/// session ignores.
pub fn to_inbound(document: Option<&Document>, event: &MessageEvent) -> InboundMessage {
    let payload = serde_wasm_bindgen::from_value::<Value>(event.data()).unwrap_or(Value::Null);
    let source = match (document, event.source()) {
        (Some(document), Some(source)) => frame_for_window(document, &source),
        _ => None,
    };
    InboundMessage::new(event.origin(), source, payload)
}

/// Find the widget frame whose content window is `source`
fn frame_for_window(document: &Document, source: &js_sys::Object) -> Option<FrameId> {
    let selector = format!("iframe[{}]", FRAME_ID_ATTR);
    let frames = document.query_selector_all(&selector).ok()?;

    for index in 0..frames.length() {
        let Some(frame) = frames
            .item(index)
            .and_then(|node| node.dyn_into::<HtmlIFrameElement>().ok())
        else {
            continue;
        };
        let Some(window) = frame.content_window() else {
            continue;
        };
        if js_sys::Object::is(&window, source) {
            return frame
                .get_attribute(FRAME_ID_ATTR)
                .and_then(|id| FrameId::parse(&id));
        }
    }
    None
}
