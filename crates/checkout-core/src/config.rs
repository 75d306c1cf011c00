//! # Checkout Configuration
//!
//! Per-order options supplied by the embedding page: the merchant key, the
//! order being paid, and the outcome callbacks.

use crate::error::WidgetError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Serializable part of the checkout options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutConfig {
    /// Opaque merchant credential
    #[serde(default)]
    pub key: String,

    /// Identifier of the order being paid
    #[serde(default)]
    pub order_id: String,
}

impl CheckoutConfig {
    /// Create a config with both required fields
    pub fn new(key: impl Into<String>, order_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            order_id: order_id.into(),
        }
    }

    /// Check required fields.
    ///
    /// Returns one diagnostic per missing field. An empty result means the
    /// config is complete; a non-empty one does not make it unusable.
    pub fn validate(&self) -> Vec<WidgetError> {
        let mut diagnostics = Vec::new();
        if self.key.trim().is_empty() {
            diagnostics.push(WidgetError::MissingField { field: "key" });
        }
        if self.order_id.trim().is_empty() {
            diagnostics.push(WidgetError::MissingField { field: "orderId" });
        }
        diagnostics
    }
}

/// Callback receiving an outcome payload
pub type PayloadCallback = Box<dyn FnMut(Value)>;

/// Callback fired when the overlay is dismissed
pub type CloseCallback = Box<dyn FnMut()>;

/// Outcome callbacks registered by the embedding page
#[derive(Default)]
pub struct Callbacks {
    pub on_success: Option<PayloadCallback>,
    pub on_failure: Option<PayloadCallback>,
    pub on_close: Option<CloseCallback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the success callback
    pub fn on_success(mut self, f: impl FnMut(Value) + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    /// Builder: set the failure callback
    pub fn on_failure(mut self, f: impl FnMut(Value) + 'static) -> Self {
        self.on_failure = Some(Box::new(f));
        self
    }

    /// Builder: set the close callback
    pub fn on_close(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_close = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}
