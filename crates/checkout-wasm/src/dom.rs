//! DOM rendering of the checkout overlay.

use checkout_core::{
    DismissHandler, DisplaySurface, FrameId, OverlayElement, OverlaySpec, WidgetError,
    WidgetResult, DISMISS_LABEL, FRAME_ID_ATTR, TEST_ID_ATTR,
};
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

struct Mounted {
    frame_id: FrameId,
    root: Element,
    // Dropping this removes the only Rust side of the click handler
    _on_click: Closure<dyn FnMut()>,
}

/// Renders overlays into `document.body`
pub struct DomSurface {
    document: Document,
    mounted: RefCell<Vec<Mounted>>,
}

impl DomSurface {
    /// Surface for the current window's document
    pub fn new() -> WidgetResult<Self> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| WidgetError::Surface("no document available".to_string()))?;
        Ok(Self::with_document(document))
    }

    pub fn with_document(document: Document) -> Self {
        Self {
            document,
            mounted: RefCell::new(Vec::new()),
        }
    }

    fn create(&self, spec: &OverlaySpec, element: OverlayElement) -> Result<Element, JsValue> {
        let node = self.document.create_element(element.tag())?;
        node.set_attribute(TEST_ID_ATTR, element.test_id())?;
        if let Some(id) = element.dom_id() {
            node.set_id(id);
        }
        if let Some(class) = element.class_name() {
            node.set_class_name(class);
        }
        node.set_attribute("style", &spec.style(element))?;
        Ok(node)
    }

    /// Create every overlay element, parents first, and hang each under
    /// its parent. The root goes last into `document.body`.
    fn build(&self, spec: &OverlaySpec, on_dismiss: DismissHandler) -> Result<Mounted, JsValue> {
        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;

        let mut on_dismiss = on_dismiss;
        let on_click = Closure::wrap(Box::new(move || on_dismiss()) as Box<dyn FnMut()>);

        let mut created: Vec<(OverlayElement, Element)> = Vec::with_capacity(OverlayElement::ALL.len());
        for element in OverlayElement::ALL {
            let node = self.create(spec, element)?;
            match element {
                OverlayElement::Dismiss => {
                    node.set_text_content(Some(DISMISS_LABEL));
                    node.add_event_listener_with_callback(
                        "click",
                        on_click.as_ref().unchecked_ref(),
                    )?;
                }
                OverlayElement::Frame => {
                    node.set_attribute("src", &spec.frame_url)?;
                    node.set_attribute(FRAME_ID_ATTR, &spec.frame_id.to_string())?;
                }
                OverlayElement::Root | OverlayElement::Panel => {}
            }

            if let Some(parent) = element.parent() {
                let (_, parent) = created
                    .iter()
                    .find(|(kind, _)| *kind == parent)
                    .ok_or_else(|| JsValue::from_str("overlay parent not created"))?;
                parent.append_child(&node)?;
            }
            created.push((element, node));
        }

        let root = created
            .into_iter()
            .find_map(|(kind, node)| (kind == OverlayElement::Root).then_some(node))
            .ok_or_else(|| JsValue::from_str("overlay root not created"))?;
        body.append_child(&root)?;

        Ok(Mounted {
            frame_id: spec.frame_id,
            root,
            _on_click: on_click,
        })
    }
}

impl DisplaySurface for DomSurface {
    fn attach(&self, spec: &OverlaySpec, on_dismiss: DismissHandler) -> WidgetResult<()> {
        let mounted = self
            .build(spec, on_dismiss)
            .map_err(|e| WidgetError::Surface(format!("{:?}", e)))?;
        self.mounted.borrow_mut().push(mounted);
        Ok(())
    }

    fn detach(&self, frame: FrameId) -> bool {
        let removed = {
            let mut mounted = self.mounted.borrow_mut();
            match mounted.iter().position(|m| m.frame_id == frame) {
                Some(index) => mounted.remove(index),
                None => return false,
            }
        };
        removed.root.remove();
        true
    }
}
