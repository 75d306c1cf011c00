//! # checkout-core
//!
//! Core of the embeddable checkout widget.
//!
//! This crate provides:
//! - `CheckoutSession` for the overlay lifecycle and the message bridge
//! - `CheckoutConfig`, `Callbacks` and `WidgetSettings` for configuration
//! - `BridgeMessage` and `InboundMessage` for the frame-to-host protocol
//! - `MessageBus` and `DisplaySurface` traits, with in-memory
//!   implementations (`LocalBus`, `MemorySurface`)
//! - `WidgetError` for typed error handling
//!
//! ## Example
//!
//! ```rust
//! use checkout_core::{
//!     BridgeMessage, Callbacks, CheckoutConfig, CheckoutSession, InboundMessage, LocalBus,
//!     MemorySurface, SessionState, WidgetSettings,
//! };
//! use serde_json::json;
//!
//! let bus = LocalBus::new();
//! let session = CheckoutSession::new(
//!     CheckoutConfig::new("key_test_123", "order_42"),
//!     Callbacks::new().on_success(|data| println!("paid: {}", data)),
//!     WidgetSettings::default(),
//!     bus.clone(),
//!     MemorySurface::new(),
//! );
//!
//! session.open()?;
//! assert_eq!(
//!     session.frame_url(),
//!     "http://localhost:3001/checkout.html?order_id=order_42&key=key_test_123"
//! );
//!
//! bus.post(&InboundMessage::bridge(
//!     "http://localhost:3001",
//!     Some(session.frame_id()),
//!     &BridgeMessage::PaymentSuccess(json!({ "payment_id": "pay_1" })),
//! ));
//! assert_eq!(session.state(), SessionState::Closed);
//! # Ok::<(), checkout_core::WidgetError>(())
//! ```

pub mod bus;
pub mod config;
pub mod error;
pub mod frame;
pub mod overlay;
pub mod protocol;
pub mod session;
pub mod settings;

// Re-exports for convenience
pub use bus::{ListenerId, LocalBus, MessageBus, MessageHandler};
pub use config::{Callbacks, CheckoutConfig, CloseCallback, PayloadCallback};
pub use error::{WidgetError, WidgetResult};
pub use frame::{frame_url, origin_of, FrameId};
pub use overlay::{
    DismissHandler, DisplaySurface, MemorySurface, OverlayElement, OverlaySpec, DISMISS_LABEL,
    FRAME_ID_ATTR, TEST_ID_ATTR,
};
pub use protocol::{BridgeMessage, InboundMessage, MessageKind};
pub use session::{CheckoutSession, IgnoreReason, MessageOutcome, SessionState};
pub use settings::WidgetSettings;
