//! # Widget Error Types
//!
//! Typed error handling for the checkout widget.
//! Fallible operations return `Result<T, WidgetError>`; configuration
//! defects are carried as values instead of being raised.

use thiserror::Error;

/// Core error type for the checkout widget
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    /// A required configuration field is empty
    #[error("PaymentGateway: '{field}' is required")]
    MissingField { field: &'static str },

    /// Settings could not be loaded or parsed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The overlay could not be attached to the display surface
    #[error("Display surface error: {0}")]
    Surface(String),

    /// The message listener could not be registered
    #[error("Message bus error: {0}")]
    Bus(String),
}

impl WidgetError {
    /// Returns true if this error is reported as a diagnostic only and never
    /// stops the widget from operating
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, WidgetError::MissingField { .. })
    }
}

/// Result type alias for widget operations
pub type WidgetResult<T> = Result<T, WidgetError>;
