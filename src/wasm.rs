//! WASM bindings for in-browser page analysis.
//!
//! Pages are passed in as markup; results come back as JSON strings.

use wasm_bindgen::prelude::*;

use crate::{
    Address, ElementSelector, OutlineOptions, Page, accessible_text, build_outline,
    resolve_address,
};

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Outline of `html` as JSON. `exclude` is an optional CSS selector list.
#[wasm_bindgen]
pub fn outline_json(html: &str, exclude: Option<String>) -> Result<String, JsValue> {
    let exclude = exclude
        .filter(|s| !s.trim().is_empty())
        .map(|s| ElementSelector::parse(&s))
        .transpose()
        .map_err(to_js)?;

    let page = Page::parse(html);
    let toc = build_outline(&page, page.top(), &OutlineOptions { exclude });
    serde_json::to_string(&toc).map_err(to_js)
}

/// Spoken text of the element at `address_json` (a JSON array of locators).
/// Returns `undefined` when the address no longer resolves.
#[wasm_bindgen]
pub fn speech_text(html: &str, address_json: &str) -> Result<Option<String>, JsValue> {
    let address = Address::from_json(address_json).map_err(to_js)?;
    let page = Page::parse(html);
    Ok(resolve_address(&page, page.top(), &address).map(|node| accessible_text(&page, node)))
}
