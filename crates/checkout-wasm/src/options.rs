//! Reading `new PaymentGateway({...})` options from JavaScript.
//!
//! Reading never fails: absent or mistyped fields fall back to empty values
//! and defaults, and the session reports what is missing.

use checkout_core::{Callbacks, CheckoutConfig, WidgetSettings};
use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Options split into the core's configuration types
pub struct GatewayOptions {
    pub config: CheckoutConfig,
    pub callbacks: Callbacks,
    pub settings: WidgetSettings,
}

impl GatewayOptions {
    pub fn from_js(options: &JsValue) -> Self {
        let config = CheckoutConfig::new(
            string_field(options, "key").unwrap_or_default(),
            string_field(options, "orderId").unwrap_or_default(),
        );

        let mut callbacks = Callbacks::new();
        if let Some(f) = function_field(options, "onSuccess") {
            callbacks = callbacks.on_success(payload_callback("onSuccess", f));
        }
        if let Some(f) = function_field(options, "onFailure") {
            callbacks = callbacks.on_failure(payload_callback("onFailure", f));
        }
        if let Some(f) = function_field(options, "onClose") {
            callbacks = callbacks.on_close(move || {
                if let Err(e) = f.call0(&JsValue::NULL) {
                    report_throw("onClose", &e);
                }
            });
        }

        let mut settings = WidgetSettings::default();
        if let Some(url) = string_field(options, "frameUrl") {
            settings.frame_base_url = url;
        }
        if let Some(origins) = field(options, "allowedOrigins").and_then(|v| v.dyn_into::<Array>().ok()) {
            settings.allowed_origins = origins.iter().filter_map(|o| o.as_string()).collect();
        }
        if let Some(z) = field(options, "zIndex").and_then(|v| v.as_f64()) {
            match z_index_from(z) {
                Some(z) => settings.z_index = z,
                None => web_sys::console::warn_1(&JsValue::from_str(&format!(
                    "PaymentGateway: ignoring zIndex {}",
                    z
                ))),
            }
        }

        Self {
            config,
            callbacks,
            settings,
        }
    }
}

/// Integral part of a JS number, if it is finite and fits an `i32`
fn z_index_from(z: f64) -> Option<i32> {
    let z = z.trunc();
    if z.is_finite() && z >= f64::from(i32::MIN) && z <= f64::from(i32::MAX) {
        Some(z as i32)
    } else {
        None
    }
}

fn field(options: &JsValue, name: &str) -> Option<JsValue> {
    if !options.is_object() {
        return None;
    }
    Reflect::get(options, &JsValue::from_str(name))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

/// Strings are taken as-is; numbers are accepted as their decimal text
fn string_field(options: &JsValue, name: &str) -> Option<String> {
    let value = field(options, name)?;
    value
        .as_string()
        .or_else(|| value.as_f64().map(|n| n.to_string()))
}

fn function_field(options: &JsValue, name: &str) -> Option<Function> {
    field(options, name).and_then(|v| v.dyn_into::<Function>().ok())
}

fn payload_callback(name: &'static str, f: Function) -> impl FnMut(Value) {
    move |data: Value| {
        let arg = to_js(&data);
        if let Err(e) = f.call1(&JsValue::NULL, &arg) {
            report_throw(name, &e);
        }
    }
}

/// Convert a payload to a plain JS value (objects, not `Map`s)
pub fn to_js(data: &Value) -> JsValue {
    data.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}

fn report_throw(name: &str, error: &JsValue) {
    web_sys::console::error_2(
        &JsValue::from_str(&format!("PaymentGateway: {} threw", name)),
        error,
    );
}
