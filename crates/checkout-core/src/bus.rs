//! # Message Bus
//!
//! The host window's message channel is shared by every session on a page.
//! Sessions reach it through the `MessageBus` trait so the channel can be a
//! real browser window or an in-process bus.
//!
//! Every subscription returns a `ListenerId`; the session keeps it and hands
//! it back on close so no handler outlives its session.

use crate::error::{WidgetError, WidgetResult};
use crate::protocol::InboundMessage;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Handler invoked for each inbound message
pub type MessageHandler = Box<dyn FnMut(&InboundMessage)>;

/// Registration token returned by `MessageBus::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// A channel delivering frame-to-host messages
pub trait MessageBus {
    /// Register a handler; the returned id is required to remove it.
    fn subscribe(&self, handler: MessageHandler) -> WidgetResult<ListenerId>;

    /// Remove a handler. Returns false if the id was not registered.
    fn unsubscribe(&self, id: ListenerId) -> bool;
}

type SharedHandler = Rc<RefCell<MessageHandler>>;

#[derive(Default)]
struct LocalBusInner {
    next_id: Cell<u64>,
    fail_subscribe: Cell<bool>,
    listeners: RefCell<Vec<(ListenerId, SharedHandler)>>,
}

/// In-process message bus.
///
/// Cloning yields another handle to the same bus.
#[derive(Clone, Default)]
pub struct LocalBus {
    inner: Rc<LocalBusInner>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a message to every listener registered when the call starts,
    /// in registration order. Returns how many handlers ran.
    ///
    /// Listeners removed mid-delivery are skipped. A handler that posts to
    /// the bus from inside its own invocation is not re-entered.
    pub fn post(&self, message: &InboundMessage) -> usize {
        let snapshot: Vec<(ListenerId, SharedHandler)> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(id, handler)| (*id, Rc::clone(handler)))
            .collect();

        let mut delivered = 0;
        for (id, handler) in snapshot {
            if !self.is_subscribed(id) {
                continue;
            }
            if let Ok(mut handler) = handler.try_borrow_mut() {
                (*handler)(message);
                delivered += 1;
            }
        }
        delivered
    }

    pub fn is_subscribed(&self, id: ListenerId) -> bool {
        self.inner
            .listeners
            .borrow()
            .iter()
            .any(|(listener, _)| *listener == id)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Make subsequent subscriptions fail, as a window that refuses a
    /// listener would.
    pub fn set_fail_subscribe(&self, fail: bool) {
        self.inner.fail_subscribe.set(fail);
    }
}

impl MessageBus for LocalBus {
    fn subscribe(&self, handler: MessageHandler) -> WidgetResult<ListenerId> {
        if self.inner.fail_subscribe.get() {
            return Err(WidgetError::Bus("listener registration refused".to_string()));
        }
        let id = ListenerId::new(self.inner.next_id.get());
        self.inner.next_id.set(id.raw() + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(RefCell::new(handler))));
        Ok(id)
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener, _)| *listener != id);
        before != listeners.len()
    }
}

impl std::fmt::Debug for LocalBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
