//! WASM bindings for the flowcss converter.
//!
//! Exposes `convert()`, `compileIndex()`, `validate()` and `version()` to
//! JavaScript via wasm-bindgen. Values cross the boundary as plain JS objects.

use flowcss_codegen::{CodegenError, Conversion, ConvertConfig};
use flowcss_parser::{ClassIndex, CompileOptions};
use flowcss_validator::PreflightResult;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Convert CSS into a clipboard payload.
///
/// `config` is an optional object with the same fields as `flowcss.toml`.
/// Returns `{ payload, warnings, nonStandardMediaCss?, preflight?,
/// droppedDuplicateStyles, payloadJson }`; `payload` and `payloadJson` are
/// null when the safety gate blocked the result.
#[wasm_bindgen]
pub fn convert(css: &str, config: JsValue) -> Result<JsValue, JsError> {
    let config = read_config(config)?;
    let conversion = native_convert(css, &config).map_err(|e| JsError::new(&e.to_string()))?;
    let payload_json = match &conversion.payload {
        Some(payload) => JsValue::from_str(&payload.to_json()?),
        None => JsValue::NULL,
    };

    let js_obj = to_js(&conversion)?;
    js_sys::Reflect::set(&js_obj, &"payloadJson".into(), &payload_json)
        .map_err(|_| JsError::new("Failed to set payloadJson property"))?;
    Ok(js_obj)
}

/// Compile CSS into the intermediate class index.
#[wasm_bindgen(js_name = compileIndex)]
pub fn compile_index(css: &str) -> Result<JsValue, JsError> {
    to_js(&native_compile_index(css, &ConvertConfig::default()))
}

/// Run preflight validation over a payload object.
#[wasm_bindgen]
pub fn validate(payload: JsValue) -> Result<JsValue, JsError> {
    let payload: serde_json::Value = serde_wasm_bindgen::from_value(payload)?;
    to_js(&native_validate(&payload))
}

/// Get the converter version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn read_config(config: JsValue) -> Result<ConvertConfig, JsError> {
    if config.is_undefined() || config.is_null() {
        return Ok(ConvertConfig::default());
    }
    Ok(serde_wasm_bindgen::from_value(config)?)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    // Maps become plain objects, not JS `Map`s
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    Ok(value.serialize(&serializer)?)
}

fn native_convert(css: &str, config: &ConvertConfig) -> Result<Conversion, CodegenError> {
    flowcss_codegen::convert(css, config)
}

fn native_compile_index(css: &str, config: &ConvertConfig) -> ClassIndex {
    let options: CompileOptions = config.compile_options();
    flowcss_parser::compile(css, &options)
}

fn native_validate(payload: &serde_json::Value) -> PreflightResult {
    flowcss_validator::validate(payload)
}
