//! # checkout-wasm
//!
//! WebAssembly bindings for the embeddable checkout widget.
//!
//! This crate provides:
//! - `PaymentGateway`, the class embedding pages construct
//! - `DomSurface`, rendering the overlay into the document
//! - `WindowMessageBus`, the window `message` channel as a `MessageBus`
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { PaymentGateway } from 'checkout-wasm';
//!
//! await init();
//!
//! const checkout = new PaymentGateway({
//!   key: 'key_test_abc',
//!   orderId: 'order_123',
//!   onSuccess: (data) => console.log('paid', data),
//!   onFailure: (error) => console.warn('failed', error),
//!   onClose: () => console.log('closed'),
//! });
//!
//! checkout.open();
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web
//! ```

pub mod bridge;
pub mod dom;
pub mod options;

pub use bridge::WindowMessageBus;
pub use dom::DomSurface;
pub use options::GatewayOptions;

use checkout_core::{CheckoutSession, WidgetError};
use js_sys::Array;
use wasm_bindgen::prelude::*;

/// Initialize the WASM module (called automatically)
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Convert a widget error into a JS `Error`
pub fn js_error(err: &WidgetError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// Checkout widget instance exposed to JavaScript
#[wasm_bindgen]
pub struct PaymentGateway {
    session: CheckoutSession<WindowMessageBus, DomSurface>,
}

#[wasm_bindgen]
impl PaymentGateway {
    /// Create a widget. Missing `key` or `orderId` is reported on the
    /// console and in `diagnostics`, never thrown.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<PaymentGateway, JsValue> {
        let GatewayOptions {
            config,
            callbacks,
            settings,
        } = GatewayOptions::from_js(&options);

        let bus = WindowMessageBus::new().map_err(|e| js_error(&e))?;
        let surface = DomSurface::new().map_err(|e| js_error(&e))?;
        let session = CheckoutSession::new(config, callbacks, settings, bus, surface);

        for diagnostic in session.diagnostics() {
            web_sys::console::error_1(&JsValue::from_str(&diagnostic.to_string()));
        }

        Ok(Self { session })
    }

    /// Show the overlay. Does nothing if already opened or closed.
    pub fn open(&self) -> Result<(), JsValue> {
        self.session.open().map_err(|e| js_error(&e))
    }

    /// Dismiss the overlay. Safe to call at any time.
    pub fn close(&self) {
        self.session.close();
    }

    /// `"idle"`, `"open"` or `"closed"`
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.session.state().as_str().to_string()
    }

    #[wasm_bindgen(getter, js_name = frameUrl)]
    pub fn frame_url(&self) -> String {
        self.session.frame_url().to_string()
    }

    /// Configuration problems found at construction
    #[wasm_bindgen(getter)]
    pub fn diagnostics(&self) -> Array {
        self.session
            .diagnostics()
            .iter()
            .map(|d| JsValue::from_str(&d.to_string()))
            .collect()
    }
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
