//! # Checkout Session
//!
//! One widget lifecycle: configuration, overlay open/close, and the
//! interpretation of messages posted by the payment page.
//!
//! ```text
//!            open()                 close() / payment_success
//!   Idle ───────────────▶ Open ─────────────────────────────▶ Closed
//!                          │  ▲
//!                          └──┘ payment_failed
//! ```
//!
//! The session is a cheap handle (`Rc`) around shared state. Handlers given
//! to the bus and the surface hold only a `Weak` reference, so they never
//! keep a session alive and become inert once it is gone.

use crate::bus::{ListenerId, MessageBus};
use crate::config::{Callbacks, CheckoutConfig};
use crate::error::{WidgetError, WidgetResult};
use crate::frame::{self, FrameId};
use crate::overlay::{DisplaySurface, OverlaySpec};
use crate::protocol::{BridgeMessage, InboundMessage};
use crate::settings::WidgetSettings;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::{debug, info, warn};

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Constructed, overlay not shown
    Idle,
    /// Overlay shown, listening for messages
    Open,
    /// Terminal: overlay removed, listener removed
    Closed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Open => "open",
            SessionState::Closed => "closed",
        }
    }
}

/// Why an inbound message had no effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotOpen,
    UntrustedOrigin,
    ForeignSource,
    Unrecognized,
}

/// What `handle_message` did with a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Success reported; session closed
    Succeeded,
    /// Failure reported; session still open
    Failed,
    Ignored(IgnoreReason),
}

struct Shared<B: MessageBus, S: DisplaySurface> {
    config: CheckoutConfig,
    settings: WidgetSettings,
    trusted_origins: Vec<String>,
    frame_id: FrameId,
    frame_url: String,
    diagnostics: Vec<WidgetError>,
    state: Cell<SessionState>,
    listener: Cell<Option<ListenerId>>,
    callbacks: RefCell<Callbacks>,
    bus: B,
    surface: S,
}

impl<B: MessageBus, S: DisplaySurface> Shared<B, S> {
    fn close(&self) {
        if self.state.get() != SessionState::Open {
            return;
        }
        // Flip first so callbacks that close again see a closed session
        self.state.set(SessionState::Closed);

        self.surface.detach(self.frame_id);
        if let Some(id) = self.listener.take() {
            self.bus.unsubscribe(id);
        }
        debug!("Checkout session {} closed", self.frame_id);

        self.with_callback(|c| &mut c.on_close, |f| f());
    }

    fn handle_message(&self, message: &InboundMessage) -> MessageOutcome {
        if self.state.get() != SessionState::Open {
            return MessageOutcome::Ignored(IgnoreReason::NotOpen);
        }

        let origin = message.origin.trim_end_matches('/').to_ascii_lowercase();
        if !self.trusted_origins.iter().any(|trusted| *trusted == origin) {
            warn!("Rejected message from untrusted origin {}", message.origin);
            return MessageOutcome::Ignored(IgnoreReason::UntrustedOrigin);
        }

        if message.source != Some(self.frame_id) {
            debug!("Ignored message addressed to another frame");
            return MessageOutcome::Ignored(IgnoreReason::ForeignSource);
        }

        match BridgeMessage::parse(&message.payload) {
            Some(BridgeMessage::PaymentSuccess(data)) => {
                info!("Payment succeeded for order {}", self.config.order_id);
                self.with_callback(|c| &mut c.on_success, |f| f(data));
                self.close();
                MessageOutcome::Succeeded
            }
            Some(BridgeMessage::PaymentFailed(data)) => {
                info!("Payment failed for order {}", self.config.order_id);
                self.with_callback(|c| &mut c.on_failure, |f| f(data));
                MessageOutcome::Failed
            }
            None => {
                debug!("Ignored unrecognized bridge message");
                MessageOutcome::Ignored(IgnoreReason::Unrecognized)
            }
        }
    }

    /// Run a callback with its slot emptied, so the callback may re-enter
    /// the session without meeting a held borrow.
    fn with_callback<T>(
        &self,
        slot: impl Fn(&mut Callbacks) -> &mut Option<T>,
        call: impl FnOnce(&mut T),
    ) {
        let taken = slot(&mut *self.callbacks.borrow_mut()).take();
        if let Some(mut callback) = taken {
            call(&mut callback);
            let mut callbacks = self.callbacks.borrow_mut();
            let current = slot(&mut *callbacks);
            if current.is_none() {
                *current = Some(callback);
            }
        }
    }
}

impl<B: MessageBus, S: DisplaySurface> Drop for Shared<B, S> {
    fn drop(&mut self) {
        if self.state.get() == SessionState::Open {
            self.surface.detach(self.frame_id);
            if let Some(id) = self.listener.take() {
                self.bus.unsubscribe(id);
            }
        }
    }
}

/// Handle to one checkout session.
///
/// Cloning yields another handle to the same session.
pub struct CheckoutSession<B: MessageBus + 'static, S: DisplaySurface + 'static> {
    shared: Rc<Shared<B, S>>,
}

impl<B: MessageBus + 'static, S: DisplaySurface + 'static> CheckoutSession<B, S> {
    /// Create a session.
    ///
    /// Missing configuration fields are logged and kept as diagnostics; the
    /// session is returned either way. Nothing is displayed yet.
    pub fn new(
        config: CheckoutConfig,
        callbacks: Callbacks,
        settings: WidgetSettings,
        bus: B,
        surface: S,
    ) -> Self {
        let diagnostics = config.validate();
        for diagnostic in &diagnostics {
            warn!("{}", diagnostic);
        }

        let trusted_origins = settings.trusted_origins();
        if trusted_origins.is_empty() {
            warn!(
                "No trusted origin for frame address {}; every message will be rejected",
                settings.frame_base_url
            );
        }

        let frame_url = frame::frame_url(&settings.frame_base_url, &config.order_id, &config.key);

        Self {
            shared: Rc::new(Shared {
                config,
                settings,
                trusted_origins,
                frame_id: FrameId::new(),
                frame_url,
                diagnostics,
                state: Cell::new(SessionState::Idle),
                listener: Cell::new(None),
                callbacks: RefCell::new(callbacks),
                bus,
                surface,
            }),
        }
    }

    /// Show the overlay and start listening for messages.
    ///
    /// Only an idle session opens; otherwise this does nothing. On error
    /// the session stays idle with nothing attached.
    pub fn open(&self) -> WidgetResult<()> {
        let shared = &self.shared;
        let state = shared.state.get();
        if state != SessionState::Idle {
            debug!("open() ignored for {} session", state.as_str());
            return Ok(());
        }

        let spec = OverlaySpec::new(
            shared.frame_id,
            shared.frame_url.clone(),
            shared.settings.z_index,
        );

        let on_dismiss = self.weak();
        shared.surface.attach(
            &spec,
            Box::new(move || {
                if let Some(shared) = on_dismiss.upgrade() {
                    shared.close();
                }
            }),
        )?;

        let on_message = self.weak();
        let subscribed = shared.bus.subscribe(Box::new(move |message: &InboundMessage| {
            if let Some(shared) = on_message.upgrade() {
                shared.handle_message(message);
            }
        }));

        match subscribed {
            Ok(id) => {
                shared.listener.set(Some(id));
                shared.state.set(SessionState::Open);
                info!("Checkout opened for order {}", shared.config.order_id);
                Ok(())
            }
            Err(e) => {
                shared.surface.detach(shared.frame_id);
                Err(e)
            }
        }
    }

    /// Remove the overlay and the listener, then notify `on_close`.
    /// No-op unless the session is open.
    pub fn close(&self) {
        self.shared.close();
    }

    /// Interpret one inbound message
    pub fn handle_message(&self, message: &InboundMessage) -> MessageOutcome {
        self.shared.handle_message(message)
    }

    pub fn state(&self) -> SessionState {
        self.shared.state.get()
    }

    pub fn is_open(&self) -> bool {
        self.state() == SessionState::Open
    }

    pub fn frame_id(&self) -> FrameId {
        self.shared.frame_id
    }

    /// Address of the embedded payment page
    pub fn frame_url(&self) -> &str {
        &self.shared.frame_url
    }

    pub fn trusted_origins(&self) -> &[String] {
        &self.shared.trusted_origins
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.shared.config
    }

    pub fn settings(&self) -> &WidgetSettings {
        &self.shared.settings
    }

    /// Configuration problems found at construction
    pub fn diagnostics(&self) -> &[WidgetError] {
        &self.shared.diagnostics
    }

    fn weak(&self) -> Weak<Shared<B, S>> {
        Rc::downgrade(&self.shared)
    }
}

impl<B: MessageBus + 'static, S: DisplaySurface + 'static> Clone for CheckoutSession<B, S> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<B: MessageBus + 'static, S: DisplaySurface + 'static> std::fmt::Debug for CheckoutSession<B, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutSession")
            .field("frame_id", &self.shared.frame_id)
            .field("state", &self.state())
            .field("order_id", &self.shared.config.order_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::LocalBus;
    use crate::overlay::MemorySurface;
    use serde_json::{json, Value};

    const PAY_ORIGIN: &str = "http://localhost:3001";

    type TestSession = CheckoutSession<LocalBus, MemorySurface>;

    #[derive(Default)]
    struct Recorder {
        successes: Rc<RefCell<Vec<Value>>>,
        failures: Rc<RefCell<Vec<Value>>>,
        closes: Rc<Cell<u32>>,
    }

    impl Recorder {
        fn callbacks(&self) -> Callbacks {
            let successes = Rc::clone(&self.successes);
            let failures = Rc::clone(&self.failures);
            let closes = Rc::clone(&self.closes);
            Callbacks::new()
                .on_success(move |data| successes.borrow_mut().push(data))
                .on_failure(move |data| failures.borrow_mut().push(data))
                .on_close(move || closes.set(closes.get() + 1))
        }
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn session_with(
        config: CheckoutConfig,
        callbacks: Callbacks,
    ) -> (TestSession, LocalBus, MemorySurface) {
        init_tracing();
        let bus = LocalBus::new();
        let surface = MemorySurface::new();
        let session = CheckoutSession::new(
            config,
            callbacks,
            WidgetSettings::default(),
            bus.clone(),
            surface.clone(),
        );
        (session, bus, surface)
    }

    fn from_frame(session: &TestSession, message: BridgeMessage) -> InboundMessage {
        InboundMessage::bridge(PAY_ORIGIN, Some(session.frame_id()), &message)
    }

    #[test]
    fn test_missing_fields_are_diagnostics_only() {
        let recorder = Recorder::default();
        let (session, _bus, surface) =
            session_with(CheckoutConfig::new("", ""), recorder.callbacks());

        assert_eq!(session.diagnostics().len(), 2);
        assert!(session.diagnostics().iter().all(WidgetError::is_diagnostic));
        assert_eq!(session.state(), SessionState::Idle);

        session.open().unwrap();
        assert!(session.is_open());
        assert!(surface.is_attached(session.frame_id()));
        assert_eq!(
            session.frame_url(),
            "http://localhost:3001/checkout.html?order_id=&key="
        );
    }

    #[test]
    fn test_construct_does_not_touch_surface() {
        let (session, bus, surface) =
            session_with(CheckoutConfig::new("key_1", "order_1"), Callbacks::new());

        assert!(session.diagnostics().is_empty());
        assert!(surface.attached().is_empty());
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_open_attaches_overlay_with_frame_url() {
        let (session, bus, surface) =
            session_with(CheckoutConfig::new("key_abc", "order_123"), Callbacks::new());

        session.open().unwrap();

        assert_eq!(session.state(), SessionState::Open);
        assert_eq!(bus.listener_count(), 1);
        let attached = surface.attached();
        assert_eq!(attached.len(), 1);
        assert_eq!(attached[0].frame_id, session.frame_id());
        assert_eq!(
            attached[0].frame_url,
            "http://localhost:3001/checkout.html?order_id=order_123&key=key_abc"
        );
        assert_eq!(attached[0].z_index, 9999);
        assert_eq!(attached[0].z_index, session.settings().z_index);
    }

    #[test]
    fn test_success_invokes_callback_and_closes() {
        let recorder = Recorder::default();
        let (session, bus, surface) =
            session_with(CheckoutConfig::new("key_1", "order_1"), recorder.callbacks());
        session.open().unwrap();

        let payload = json!({ "payment_id": "pay_77", "amount": 5000 });
        let delivered = bus.post(&from_frame(
            &session,
            BridgeMessage::PaymentSuccess(payload.clone()),
        ));

        assert_eq!(delivered, 1);
        assert_eq!(*recorder.successes.borrow(), vec![payload]);
        assert!(recorder.failures.borrow().is_empty());
        assert_eq!(recorder.closes.get(), 1);
        assert_eq!(session.state(), SessionState::Closed);
        assert!(!surface.is_attached(session.frame_id()));
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_failure_keeps_session_open() {
        let recorder = Recorder::default();
        let (session, bus, surface) =
            session_with(CheckoutConfig::new("key_1", "order_1"), recorder.callbacks());
        session.open().unwrap();

        let error = json!({ "code": "card_declined" });
        bus.post(&from_frame(&session, BridgeMessage::PaymentFailed(error.clone())));

        assert_eq!(*recorder.failures.borrow(), vec![error]);
        assert!(recorder.successes.borrow().is_empty());
        assert_eq!(recorder.closes.get(), 0);
        assert_eq!(session.state(), SessionState::Open);
        assert!(surface.is_attached(session.frame_id()));

        // retry succeeds
        bus.post(&from_frame(&session, BridgeMessage::PaymentSuccess(json!("ok"))));
        assert_eq!(*recorder.successes.borrow(), vec![json!("ok")]);
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn test_unrecognized_type_is_ignored() {
        let recorder = Recorder::default();
        let (session, _bus, _surface) =
            session_with(CheckoutConfig::new("key_1", "order_1"), recorder.callbacks());
        session.open().unwrap();

        let ping = InboundMessage::new(
            PAY_ORIGIN,
            Some(session.frame_id()),
            json!({ "type": "ping", "data": 1 }),
        );
        assert_eq!(
            session.handle_message(&ping),
            MessageOutcome::Ignored(IgnoreReason::Unrecognized)
        );

        let garbage = InboundMessage::new(PAY_ORIGIN, Some(session.frame_id()), json!([1, 2]));
        assert_eq!(
            session.handle_message(&garbage),
            MessageOutcome::Ignored(IgnoreReason::Unrecognized)
        );

        assert!(recorder.successes.borrow().is_empty());
        assert!(recorder.failures.borrow().is_empty());
        assert_eq!(recorder.closes.get(), 0);
        assert_eq!(session.state(), SessionState::Open);
    }

    #[test]
    fn test_double_close_fires_on_close_once() {
        let recorder = Recorder::default();
        let (session, bus, _surface) =
            session_with(CheckoutConfig::new("key_1", "order_1"), recorder.callbacks());
        session.open().unwrap();

        session.close();
        session.close();

        assert_eq!(recorder.closes.get(), 1);
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_close_when_idle_is_noop() {
        let recorder = Recorder::default();
        let (session, _bus, _surface) =
            session_with(CheckoutConfig::new("key_1", "order_1"), recorder.callbacks());

        session.close();

        assert_eq!(recorder.closes.get(), 0);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_no_callbacks_after_close() {
        let recorder = Recorder::default();
        let (session, bus, _surface) =
            session_with(CheckoutConfig::new("key_1", "order_1"), recorder.callbacks());
        session.open().unwrap();
        session.close();

        let delivered = bus.post(&from_frame(&session, BridgeMessage::PaymentSuccess(json!(1))));
        assert_eq!(delivered, 0);

        assert_eq!(
            session.handle_message(&from_frame(&session, BridgeMessage::PaymentFailed(json!(2)))),
            MessageOutcome::Ignored(IgnoreReason::NotOpen)
        );
        assert!(recorder.successes.borrow().is_empty());
        assert!(recorder.failures.borrow().is_empty());
    }

    #[test]
    fn test_untrusted_origin_rejected() {
        let recorder = Recorder::default();
        let (session, bus, _surface) =
            session_with(CheckoutConfig::new("key_1", "order_1"), recorder.callbacks());
        session.open().unwrap();

        let forged = InboundMessage::bridge(
            "https://evil.example.com",
            Some(session.frame_id()),
            &BridgeMessage::PaymentSuccess(json!({ "forged": true })),
        );
        bus.post(&forged);
        assert_eq!(
            session.handle_message(&forged),
            MessageOutcome::Ignored(IgnoreReason::UntrustedOrigin)
        );

        assert!(recorder.successes.borrow().is_empty());
        assert_eq!(session.state(), SessionState::Open);
    }

    #[test]
    fn test_unknown_source_rejected() {
        let recorder = Recorder::default();
        let (session, _bus, _surface) =
            session_with(CheckoutConfig::new("key_1", "order_1"), recorder.callbacks());
        session.open().unwrap();

        let success = BridgeMessage::PaymentSuccess(json!(null));
        for source in [None, Some(FrameId::new())] {
            let message = InboundMessage::bridge(PAY_ORIGIN, source, &success);
            assert_eq!(
                session.handle_message(&message),
                MessageOutcome::Ignored(IgnoreReason::ForeignSource)
            );
        }
        assert!(recorder.successes.borrow().is_empty());
        assert!(session.is_open());
    }

    #[test]
    fn test_origin_match_is_case_insensitive() {
        let (session, _bus, _surface) =
            session_with(CheckoutConfig::new("key_1", "order_1"), Callbacks::new());
        session.open().unwrap();

        let message = InboundMessage::bridge(
            "HTTP://LOCALHOST:3001/",
            Some(session.frame_id()),
            &BridgeMessage::PaymentFailed(json!(null)),
        );
        assert_eq!(session.handle_message(&message), MessageOutcome::Failed);
    }

    #[test]
    fn test_explicit_allowed_origins() {
        init_tracing();
        let bus = LocalBus::new();
        let session = CheckoutSession::new(
            CheckoutConfig::new("key_1", "order_1"),
            Callbacks::new(),
            WidgetSettings::default()
                .with_frame_base_url("https://pay.example.com/checkout")
                .with_allowed_origin("https://cdn.example.com"),
            bus.clone(),
            MemorySurface::new(),
        );
        session.open().unwrap();

        assert_eq!(session.trusted_origins(), ["https://cdn.example.com".to_string()]);

        let from_base = InboundMessage::bridge(
            "https://pay.example.com",
            Some(session.frame_id()),
            &BridgeMessage::PaymentFailed(json!(null)),
        );
        assert_eq!(
            session.handle_message(&from_base),
            MessageOutcome::Ignored(IgnoreReason::UntrustedOrigin)
        );

        let from_cdn = InboundMessage { origin: "https://cdn.example.com".into(), ..from_base };
        assert_eq!(session.handle_message(&from_cdn), MessageOutcome::Failed);
    }

    #[test]
    fn test_allowed_origin_with_default_port() {
        init_tracing();
        let session = CheckoutSession::new(
            CheckoutConfig::new("key_1", "order_1"),
            Callbacks::new(),
            WidgetSettings::default()
                .with_frame_base_url("https://pay.example.com/checkout")
                .with_allowed_origin("https://pay.example.com:443"),
            LocalBus::new(),
            MemorySurface::new(),
        );
        session.open().unwrap();

        assert_eq!(session.settings().allowed_origins, ["https://pay.example.com:443"]);
        assert_eq!(session.trusted_origins(), ["https://pay.example.com".to_string()]);

        let message = InboundMessage::bridge(
            "https://pay.example.com",
            Some(session.frame_id()),
            &BridgeMessage::PaymentFailed(json!(null)),
        );
        assert_eq!(session.handle_message(&message), MessageOutcome::Failed);
    }

    #[test]
    fn test_close_from_failure_callback() {
        let closes = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<TestSession>>> = Rc::new(RefCell::new(None));

        let handle = Rc::clone(&slot);
        let counter = Rc::clone(&closes);
        let callbacks = Callbacks::new()
            .on_failure(move |_| {
                if let Some(session) = handle.borrow().as_ref() {
                    session.close();
                }
            })
            .on_close(move || counter.set(counter.get() + 1));

        let (session, bus, surface) =
            session_with(CheckoutConfig::new("key_1", "order_1"), callbacks);
        *slot.borrow_mut() = Some(session.clone());
        session.open().unwrap();

        bus.post(&from_frame(&session, BridgeMessage::PaymentFailed(json!("declined"))));

        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(closes.get(), 1);
        assert!(surface.attached().is_empty());
        assert_eq!(bus.listener_count(), 0);

        slot.borrow_mut().take();
    }

    #[test]
    fn test_close_from_success_callback() {
        let closes = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<TestSession>>> = Rc::new(RefCell::new(None));

        let handle = Rc::clone(&slot);
        let counter = Rc::clone(&closes);
        let callbacks = Callbacks::new()
            .on_success(move |_| {
                if let Some(session) = handle.borrow().as_ref() {
                    session.close();
                    session.close();
                }
            })
            .on_close(move || counter.set(counter.get() + 1));

        let (session, bus, _surface) =
            session_with(CheckoutConfig::new("key_1", "order_1"), callbacks);
        *slot.borrow_mut() = Some(session.clone());
        session.open().unwrap();

        bus.post(&from_frame(&session, BridgeMessage::PaymentSuccess(json!(null))));

        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(closes.get(), 1);

        slot.borrow_mut().take();
    }

    #[test]
    fn test_sessions_do_not_cross_deliver() {
        init_tracing();
        let bus = LocalBus::new();
        let surface = MemorySurface::new();
        let first = Recorder::default();
        let second = Recorder::default();

        let a = CheckoutSession::new(
            CheckoutConfig::new("key_1", "order_a"),
            first.callbacks(),
            WidgetSettings::default(),
            bus.clone(),
            surface.clone(),
        );
        let b = CheckoutSession::new(
            CheckoutConfig::new("key_1", "order_b"),
            second.callbacks(),
            WidgetSettings::default(),
            bus.clone(),
            surface.clone(),
        );
        a.open().unwrap();
        b.open().unwrap();
        assert_eq!(bus.listener_count(), 2);

        bus.post(&from_frame(&b, BridgeMessage::PaymentSuccess(json!("b-paid"))));

        assert!(first.successes.borrow().is_empty());
        assert_eq!(*second.successes.borrow(), vec![json!("b-paid")]);
        assert!(a.is_open());
        assert_eq!(b.state(), SessionState::Closed);
        assert_eq!(bus.listener_count(), 1);
        assert!(surface.is_attached(a.frame_id()));
    }

    #[test]
    fn test_open_is_noop_outside_idle() {
        let recorder = Recorder::default();
        let (session, bus, surface) =
            session_with(CheckoutConfig::new("key_1", "order_1"), recorder.callbacks());

        session.open().unwrap();
        session.open().unwrap();
        assert_eq!(bus.listener_count(), 1);
        assert_eq!(surface.attached().len(), 1);

        session.close();
        session.open().unwrap();
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(bus.listener_count(), 0);
        assert!(surface.attached().is_empty());
    }

    #[test]
    fn test_failed_attach_leaves_session_idle() {
        let (session, bus, surface) =
            session_with(CheckoutConfig::new("key_1", "order_1"), Callbacks::new());
        surface.set_fail_attach(true);

        let result = session.open();
        assert!(matches!(result, Err(WidgetError::Surface(_))));
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(bus.listener_count(), 0);

        surface.set_fail_attach(false);
        session.open().unwrap();
        assert!(session.is_open());
    }

    #[test]
    fn test_failed_subscribe_detaches_overlay() {
        let (session, bus, surface) =
            session_with(CheckoutConfig::new("key_1", "order_1"), Callbacks::new());
        bus.set_fail_subscribe(true);

        let result = session.open();
        assert!(matches!(result, Err(WidgetError::Bus(_))));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(surface.attached().is_empty());
        assert_eq!(bus.listener_count(), 0);

        bus.set_fail_subscribe(false);
        session.open().unwrap();
        assert!(session.is_open());
        assert!(surface.is_attached(session.frame_id()));
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn test_dismiss_control_closes() {
        let recorder = Recorder::default();
        let (session, bus, surface) =
            session_with(CheckoutConfig::new("key_1", "order_1"), recorder.callbacks());
        session.open().unwrap();

        assert!(surface.dismiss(session.frame_id()));

        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(recorder.closes.get(), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_dropping_open_session_releases_resources() {
        let (session, bus, surface) =
            session_with(CheckoutConfig::new("key_1", "order_1"), Callbacks::new());
        session.open().unwrap();

        drop(session);

        assert_eq!(bus.listener_count(), 0);
        assert!(surface.attached().is_empty());
    }

    #[test]
    fn test_state_names() {
        assert_eq!(SessionState::Idle.as_str(), "idle");
        assert_eq!(
            serde_json::to_value(SessionState::Closed).unwrap(),
            json!("closed")
        );
    }
}
