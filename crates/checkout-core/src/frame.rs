//! # Frame Address
//!
//! Builds the embedded payment page address and derives origins for the
//! trust check on inbound messages.
//!
//! The query contract with the payment page is fixed:
//!
//! ```text
//! <base>?order_id=<orderId>&key=<key>
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Query parameter carrying the order identifier
pub const ORDER_ID_PARAM: &str = "order_id";

/// Query parameter carrying the merchant key
pub const KEY_PARAM: &str = "key";

/// Identity stamped on a session's embedded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameId(Uuid);

impl FrameId {
    /// Mint a fresh random frame id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the textual form written to the `data-frame-id` attribute
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for FrameId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Build the payment page address for an order.
///
/// Values are inserted as given. A base address that already carries a
/// query string gets the parameters appended with `&`.
pub fn frame_url(base_url: &str, order_id: &str, key: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}{}={}&{}={}",
        base_url, separator, ORDER_ID_PARAM, order_id, KEY_PARAM, key
    )
}

/// Origin (`scheme://host[:port]`) of an absolute address, in the form a
/// browser reports as `MessageEvent.origin`.
///
/// No IDNA conversion is done: a non-ASCII host yields `None`, so the
/// address must already use the punycode (`xn--`) form.
pub fn origin_of(url: &str) -> Option<String> {
    let (scheme, rest) = url.split_once("://")?;
    if scheme.is_empty()
        || !scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return None;
    }

    let authority = rest
        .split(|c| matches!(c, '/' | '?' | '#'))
        .next()
        .unwrap_or_default();
    // userinfo is never part of an origin
    let host_port = authority.rsplit('@').next().unwrap_or_default();
    if host_port.is_empty() || !host_port.is_ascii() {
        return None;
    }

    let scheme = scheme.to_ascii_lowercase();
    let host_port = host_port.to_ascii_lowercase();
    let host_port = match (scheme.as_str(), host_port.rsplit_once(':')) {
        ("http", Some((host, "80"))) | ("https", Some((host, "443"))) => host.to_string(),
        _ => host_port,
    };

    Some(format!("{}://{}", scheme, host_port))
}
