//! # Bridge Protocol
//!
//! Messages posted by the embedded payment page to the host window.
//! The payload is a JSON object `{ "type": ..., "data": ... }`; `data` is
//! opaque and forwarded verbatim to the matching callback.

use crate::frame::FrameId;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Outcome discriminator carried in the `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    PaymentSuccess,
    PaymentFailed,
}

impl MessageKind {
    /// Wire name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::PaymentSuccess => "payment_success",
            MessageKind::PaymentFailed => "payment_failed",
        }
    }

    /// Map a wire name to a kind; unknown names yield `None`
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "payment_success" => Some(MessageKind::PaymentSuccess),
            "payment_failed" => Some(MessageKind::PaymentFailed),
            _ => None,
        }
    }
}

/// A recognised message from the payment page
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeMessage {
    /// Payment completed; carries provider result data
    PaymentSuccess(Value),
    /// Payment attempt failed; carries provider error data
    PaymentFailed(Value),
}

impl BridgeMessage {
    /// Interpret a raw payload.
    ///
    /// Returns `None` for anything that is not an object with a known
    /// `type`. A missing `data` field is forwarded as `null`.
    pub fn parse(payload: &Value) -> Option<Self> {
        let obj = payload.as_object()?;
        let kind = obj
            .get("type")
            .and_then(|v| v.as_str())
            .and_then(MessageKind::from_wire)?;
        let data = obj.get("data").cloned().unwrap_or(Value::Null);

        Some(match kind {
            MessageKind::PaymentSuccess => BridgeMessage::PaymentSuccess(data),
            MessageKind::PaymentFailed => BridgeMessage::PaymentFailed(data),
        })
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            BridgeMessage::PaymentSuccess(_) => MessageKind::PaymentSuccess,
            BridgeMessage::PaymentFailed(_) => MessageKind::PaymentFailed,
        }
    }

    pub fn data(&self) -> &Value {
        match self {
            BridgeMessage::PaymentSuccess(data) | BridgeMessage::PaymentFailed(data) => data,
        }
    }

    /// Wire form of this message, as the payment page posts it
    pub fn to_value(&self) -> Value {
        json!({
            "type": self.kind().as_str(),
            "data": self.data(),
        })
    }
}

/// A message event as delivered by the transport
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Origin reported by the transport (`scheme://host[:port]`)
    pub origin: String,

    /// Frame the message came from, when the transport could attribute it
    pub source: Option<FrameId>,

    /// Raw payload
    pub payload: Value,
}

impl InboundMessage {
    pub fn new(origin: impl Into<String>, source: Option<FrameId>, payload: Value) -> Self {
        Self {
            origin: origin.into(),
            source,
            payload,
        }
    }

    /// Convenience: a message carrying a recognised payload
    pub fn bridge(origin: impl Into<String>, source: Option<FrameId>, message: &BridgeMessage) -> Self {
        Self::new(origin, source, message.to_value())
    }
}
