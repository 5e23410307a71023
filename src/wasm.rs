//! WASM bindings for tex2expr
//!
//! This module provides JavaScript-accessible functions for LaTeX to
//! expression translation.

use wasm_bindgen::prelude::*;

use serde::{Deserialize, Serialize};

use crate::core::latex2expr::TranslateOptions;

/// Translation result with additional metadata
#[derive(Serialize, Deserialize)]
pub struct ConvertResult {
    /// The translated expression
    pub output: String,
    /// Whether the translation was successful
    pub success: bool,
    /// Error message if translation failed
    pub error: Option<String>,
    /// Warnings during translation
    pub warnings: Vec<String>,
}

/// Safely serialize a value to JsValue, returning an error object on failure.
fn to_js_value<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or_else(|e| {
        let error_obj = ConvertResult {
            output: String::new(),
            success: false,
            error: Some(format!("Serialization error: {}", e)),
            warnings: vec![],
        };
        serde_wasm_bindgen::to_value(&error_obj).unwrap_or(JsValue::NULL)
    })
}

fn run(input: &str, options: &TranslateOptions) -> ConvertResult {
    match crate::translate_with_options(input, options) {
        Ok(translation) => ConvertResult {
            output: translation.expression,
            success: true,
            error: None,
            warnings: translation.warnings.iter().map(|w| w.to_string()).collect(),
        },
        Err(err) => ConvertResult {
            output: String::new(),
            success: false,
            error: Some(err.to_string()),
            warnings: vec![],
        },
    }
}

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Translate LaTeX math to an infix expression (strict mode)
///
/// # Arguments
/// * `input` - LaTeX math code (`$` delimiters are optional)
///
/// # Returns
/// `{ output, success, error, warnings }`
#[wasm_bindgen(js_name = "latexToExpr")]
pub fn latex_to_expr_wasm(input: &str) -> JsValue {
    to_js_value(&run(input, &TranslateOptions::default()))
}

/// Translate LaTeX math with options
///
/// `options` is a plain object such as
/// `{ strict: false, plus_minus: "minus", log_base: "natural" }`; missing
/// fields keep their defaults and an unreadable object falls back to them.
#[wasm_bindgen(js_name = "latexToExprWithOptions")]
pub fn latex_to_expr_with_options_wasm(input: &str, options: JsValue) -> JsValue {
    let options: TranslateOptions = serde_wasm_bindgen::from_value(options).unwrap_or_default();
    to_js_value(&run(input, &options))
}

/// Get version information
#[wasm_bindgen(js_name = "getVersion")]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
