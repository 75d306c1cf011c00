//! # Overlay Layout
//!
//! Static description of the modal overlay and the `DisplaySurface` trait
//! that renders it.
//!
//! ```text
//! ┌──────────────── Root (payment-modal) ────────────────┐
//! │            ┌──── Panel (payment-modal-content) ──┐   │
//! │            │                          [×] Dismiss│   │
//! │            │  ┌──── Frame (payment-iframe) ───┐  │   │
//! │            │  │  <frame_base_url>?order_id=…  │  │   │
//! │            │  └───────────────────────────────┘  │   │
//! │            └─────────────────────────────────────┘   │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Styles are fixed per element and applied in one write, so a surface
//! never has to compute layout at runtime.

use crate::error::{WidgetError, WidgetResult};
use crate::frame::FrameId;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Attribute carrying the automation hook of each element
pub const TEST_ID_ATTR: &str = "data-test-id";

/// Attribute carrying the session's frame identity on the iframe
pub const FRAME_ID_ATTR: &str = "data-frame-id";

/// Text of the dismiss control
pub const DISMISS_LABEL: &str = "×";

const ROOT_STYLE: &str = "position: fixed; top: 0; left: 0; width: 100%; height: 100%; \
     background-color: rgba(0,0,0,0.5); display: flex; justify-content: center; \
     align-items: center;";

const PANEL_STYLE: &str = "background-color: white; padding: 20px; border-radius: 8px; \
     width: 400px; height: 500px; position: relative;";

const DISMISS_STYLE: &str = "position: absolute; top: 10px; right: 10px; border: none; \
     background: none; font-size: 24px; cursor: pointer;";

const FRAME_STYLE: &str = "width: 100%; height: 100%; border: none;";

/// One node of the overlay tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayElement {
    /// Full-viewport dimming layer
    Root,
    /// Fixed-size content panel
    Panel,
    /// Dismiss control
    Dismiss,
    /// Embedded payment frame
    Frame,
}

impl OverlayElement {
    /// All elements, parents before children
    pub const ALL: [OverlayElement; 4] = [
        OverlayElement::Root,
        OverlayElement::Panel,
        OverlayElement::Dismiss,
        OverlayElement::Frame,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            OverlayElement::Root | OverlayElement::Panel => "div",
            OverlayElement::Dismiss => "button",
            OverlayElement::Frame => "iframe",
        }
    }

    /// Stable automation hook, independent of class names
    pub fn test_id(&self) -> &'static str {
        match self {
            OverlayElement::Root => "payment-modal",
            OverlayElement::Panel => "payment-modal-content",
            OverlayElement::Dismiss => "close-modal-button",
            OverlayElement::Frame => "payment-iframe",
        }
    }

    pub fn dom_id(&self) -> Option<&'static str> {
        match self {
            OverlayElement::Root => Some("payment-gateway-modal"),
            _ => None,
        }
    }

    pub fn class_name(&self) -> Option<&'static str> {
        match self {
            OverlayElement::Panel => Some("modal-content"),
            OverlayElement::Dismiss => Some("close-button"),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<OverlayElement> {
        match self {
            OverlayElement::Root => None,
            OverlayElement::Panel => Some(OverlayElement::Root),
            OverlayElement::Dismiss | OverlayElement::Frame => Some(OverlayElement::Panel),
        }
    }

    fn base_style(&self) -> &'static str {
        match self {
            OverlayElement::Root => ROOT_STYLE,
            OverlayElement::Panel => PANEL_STYLE,
            OverlayElement::Dismiss => DISMISS_STYLE,
            OverlayElement::Frame => FRAME_STYLE,
        }
    }
}

/// Everything a surface needs to render one session's overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlaySpec {
    pub frame_id: FrameId,
    pub frame_url: String,
    pub z_index: i32,
}

impl OverlaySpec {
    pub fn new(frame_id: FrameId, frame_url: impl Into<String>, z_index: i32) -> Self {
        Self {
            frame_id,
            frame_url: frame_url.into(),
            z_index,
        }
    }

    /// Inline style declaration for an element
    pub fn style(&self, element: OverlayElement) -> String {
        match element {
            OverlayElement::Root => format!("{} z-index: {};", ROOT_STYLE, self.z_index),
            other => other.base_style().to_string(),
        }
    }
}

/// Handler invoked when the user activates the dismiss control
pub type DismissHandler = Box<dyn FnMut()>;

/// Where overlays are rendered
pub trait DisplaySurface {
    /// Render the overlay and wire the dismiss control to `on_dismiss`.
    fn attach(&self, spec: &OverlaySpec, on_dismiss: DismissHandler) -> WidgetResult<()>;

    /// Remove the overlay for `frame`. Returns false if it was not attached.
    fn detach(&self, frame: FrameId) -> bool;
}

type SharedDismiss = Rc<RefCell<DismissHandler>>;

#[derive(Default)]
struct MemorySurfaceInner {
    attached: RefCell<Vec<(OverlaySpec, SharedDismiss)>>,
    fail_attach: Cell<bool>,
}

/// Surface that keeps overlays in memory.
///
/// Cloning yields another handle to the same surface.
#[derive(Clone, Default)]
pub struct MemorySurface {
    inner: Rc<MemorySurfaceInner>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `attach` calls fail
    pub fn set_fail_attach(&self, fail: bool) {
        self.inner.fail_attach.set(fail);
    }

    pub fn is_attached(&self, frame: FrameId) -> bool {
        self.inner
            .attached
            .borrow()
            .iter()
            .any(|(spec, _)| spec.frame_id == frame)
    }

    /// Specs of all overlays currently shown, oldest first
    pub fn attached(&self) -> Vec<OverlaySpec> {
        self.inner
            .attached
            .borrow()
            .iter()
            .map(|(spec, _)| spec.clone())
            .collect()
    }

    /// Simulate a click on the dismiss control of `frame`'s overlay
    pub fn dismiss(&self, frame: FrameId) -> bool {
        let handler = self
            .inner
            .attached
            .borrow()
            .iter()
            .find(|(spec, _)| spec.frame_id == frame)
            .map(|(_, handler)| Rc::clone(handler));

        match handler {
            Some(handler) => match handler.try_borrow_mut() {
                Ok(mut on_dismiss) => {
                    (*on_dismiss)();
                    true
                }
                Err(_) => false,
            },
            None => false,
        }
    }
}

impl DisplaySurface for MemorySurface {
    fn attach(&self, spec: &OverlaySpec, on_dismiss: DismissHandler) -> WidgetResult<()> {
        if self.inner.fail_attach.get() {
            return Err(WidgetError::Surface("document body unavailable".to_string()));
        }
        self.inner
            .attached
            .borrow_mut()
            .push((spec.clone(), Rc::new(RefCell::new(on_dismiss))));
        Ok(())
    }

    fn detach(&self, frame: FrameId) -> bool {
        let mut attached = self.inner.attached.borrow_mut();
        let before = attached.len();
        attached.retain(|(spec, _)| spec.frame_id != frame);
        before != attached.len()
    }
}

impl std::fmt::Debug for MemorySurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySurface")
            .field("attached", &self.attached())
            .finish()
    }
}
