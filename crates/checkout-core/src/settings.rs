//! # Widget Settings
//!
//! Deployment-level settings shared by every session on a page: where the
//! payment page lives, which origins may post outcomes, and overlay stacking.

use crate::error::{WidgetError, WidgetResult};
use crate::frame;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

/// Address the payment page is served from when nothing else is configured
pub const DEFAULT_FRAME_BASE_URL: &str = "http://localhost:3001/checkout.html";

/// Overlay stacking order when nothing else is configured
pub const DEFAULT_Z_INDEX: i32 = 9999;

/// Settings for the checkout widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSettings {
    /// Base address of the embedded payment page
    #[serde(default = "default_frame_base_url")]
    pub frame_base_url: String,

    /// Origins allowed to post outcome messages.
    /// Empty means "the origin of `frame_base_url`".
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Stacking order of the overlay root
    #[serde(default = "default_z_index")]
    pub z_index: i32,
}

fn default_frame_base_url() -> String {
    DEFAULT_FRAME_BASE_URL.to_string()
}

fn default_z_index() -> i32 {
    DEFAULT_Z_INDEX
}

impl WidgetSettings {
    /// Parse settings from a TOML document
    pub fn from_toml_str(content: &str) -> WidgetResult<Self> {
        toml::from_str(content)
            .map_err(|e| WidgetError::Configuration(format!("Invalid widget settings: {}", e)))
    }

    /// Load settings from environment variables.
    ///
    /// Optional env vars:
    /// - `CHECKOUT_FRAME_URL`
    /// - `CHECKOUT_ALLOWED_ORIGINS` (comma separated)
    /// - `CHECKOUT_Z_INDEX`
    pub fn from_env() -> WidgetResult<Self> {
        dotenvy::dotenv().ok();

        let mut settings = Self::default();

        if let Ok(url) = env::var("CHECKOUT_FRAME_URL") {
            settings.frame_base_url = url;
        }

        if let Ok(origins) = env::var("CHECKOUT_ALLOWED_ORIGINS") {
            settings.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }

        if let Ok(z) = env::var("CHECKOUT_Z_INDEX") {
            settings.z_index = z.parse().map_err(|_| {
                WidgetError::Configuration(format!("CHECKOUT_Z_INDEX is not an integer: {}", z))
            })?;
        }

        Ok(settings)
    }

    /// Builder: set the payment page address
    pub fn with_frame_base_url(mut self, url: impl Into<String>) -> Self {
        self.frame_base_url = url.into();
        self
    }

    /// Builder: allow an additional origin
    pub fn with_allowed_origin(mut self, origin: impl Into<String>) -> Self {
        self.allowed_origins.push(origin.into());
        self
    }

    /// Builder: set the overlay stacking order
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Origins whose messages are trusted.
    ///
    /// Explicit entries win; otherwise the origin of the payment page.
    /// Entries are reduced to the origin a browser reports, so default ports
    /// and paths are dropped. Hosts must already be ASCII (punycode);
    /// non-ASCII entries and an unparsable base address trust nothing.
    pub fn trusted_origins(&self) -> Vec<String> {
        if !self.allowed_origins.is_empty() {
            return self
                .allowed_origins
                .iter()
                .filter_map(|entry| {
                    if !entry.is_ascii() {
                        warn!("Ignoring non-ASCII allowed origin {}; use its punycode form", entry);
                        return None;
                    }
                    Some(
                        frame::origin_of(entry)
                            .unwrap_or_else(|| entry.trim_end_matches('/').to_ascii_lowercase()),
                    )
                })
                .collect();
        }
        frame::origin_of(&self.frame_base_url).into_iter().collect()
    }
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            frame_base_url: default_frame_base_url(),
            allowed_origins: Vec::new(),
            z_index: DEFAULT_Z_INDEX,
        }
    }
}
