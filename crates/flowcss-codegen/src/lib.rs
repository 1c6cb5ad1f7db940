//! flowcss Code Generator
//!
//! Turns a compiled [`ClassIndex`](flowcss_parser::ClassIndex) into
//! `@webflow/XscpData` style nodes and assembles the clipboard payload.
//!
//! ```text
//! CSS → compile() → ClassIndex → emit_styles() → ClipboardPayload → SafetyGate
//! ```
//!
//! ```
//! use flowcss_codegen::{convert, ConvertConfig};
//!
//! let css = ".card { display: flex } @media (max-width: 767px) { .card { flex-direction: column } }";
//! let conversion = convert(css, &ConvertConfig::default()).unwrap();
//! let payload = conversion.payload.unwrap();
//! let card = payload.style("card").unwrap();
//! assert_eq!(card.variant("small"), Some("flex-direction: column;"));
//! ```

pub mod config;
pub mod emit;
pub mod grid;
pub mod ids;
pub mod payload;
pub mod pipeline;

pub use config::{ConfigError, ConvertConfig, CONFIG_FILE};
pub use emit::{emit_style, emit_styles, variant_key};
pub use grid::{expand_tracks, normalize_grid};
pub use ids::IdTable;
pub use payload::{
    ClipboardPayload, NodeDraft, Variant, WebflowNode, WebflowStyle, PAYLOAD_TYPE,
};
pub use pipeline::{Phase, Pipeline, Progress, Section};

use flowcss_parser::Diagnostic;
use flowcss_validator::PreflightResult;
use serde::Serialize;
use std::ops::ControlFlow;

/// Code generation error.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    #[error("failed to serialize payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("conversion cancelled after {completed} of {total} sections")]
    Cancelled { completed: usize, total: usize },
}

/// Everything a conversion run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    /// The clipboard payload, or `None` when the safety gate blocked it.
    pub payload: Option<ClipboardPayload>,
    pub warnings: Vec<Diagnostic>,
    /// At-rules the target cannot express, for literal embedding by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_standard_media_css: Option<String>,
    /// The deciding preflight, when validation ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preflight: Option<PreflightResult>,
    pub dropped_duplicate_styles: usize,
}

impl Conversion {
    pub fn is_blocked(&self) -> bool {
        self.payload.is_none()
    }
}

/// Convert one CSS document into a style-only clipboard payload.
pub fn convert(css: &str, config: &ConvertConfig) -> Result<Conversion, CodegenError> {
    let section = Section::new("document", css);
    Pipeline::new(config.clone()).run(std::slice::from_ref(&section), |_| ControlFlow::Continue(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // =========================================================================
    // End to end
    // =========================================================================

    #[test]
    fn test_flex_card_end_to_end() {
        let css = ".card{display:flex}@media (max-width:767px){.card{flex-direction:column}}";
        let conversion = convert(css, &ConvertConfig::default()).unwrap();
        assert!(!conversion.is_blocked());
        let payload = conversion.payload.unwrap();
        let card = payload.style("card").unwrap();
        assert!(card.style_less.contains("display: flex;"));
        assert!(card
            .style_less
            .contains("flex-direction: row; justify-content: flex-start; align-items: stretch;"));
        assert_eq!(card.variant("small"), Some("flex-direction: column;"));
    }

    #[test]
    fn test_grid_end_to_end() {
        let css = ".grid{display:grid;grid-template-columns:repeat(3,1fr);gap:20px}";
        let payload = convert(css, &ConvertConfig::default()).unwrap().payload.unwrap();
        let grid = &payload.style("grid").unwrap().style_less;
        assert!(grid.contains("grid-row-gap: 20px; grid-column-gap: 20px;"));
        assert!(grid.contains("grid-template-rows: auto;"));
        assert!(grid.contains("grid-auto-rows: auto;"));
        assert!(grid.contains("grid-auto-flow: row;"));
        let keys: Vec<&str> = grid
            .split(';')
            .filter_map(|d| d.split(':').next())
            .map(str::trim)
            .collect();
        for banned in ["gap", "row-gap", "column-gap"] {
            assert!(!keys.contains(&banned), "{banned} in {grid}");
        }
    }

    #[test]
    fn test_inversion_end_to_end() {
        let css = ".x{color:red}@media (min-width:992px){.x{color:blue}}";
        let payload = convert(css, &ConvertConfig::default()).unwrap().payload.unwrap();
        let x = payload.style("x").unwrap();
        assert_eq!(x.style_less, "color: blue;");
        assert_eq!(x.variant("medium"), Some("color: red;"));
        assert_eq!(x.variant("small"), Some("color: red;"));
        assert_eq!(x.variant("tiny"), Some("color: red;"));
    }

    #[test]
    fn test_payload_json_shape() {
        let conversion = convert(".a { color: red }", &ConvertConfig::default()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&conversion.payload.unwrap().to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "@webflow/XscpData");
        assert_eq!(json["payload"]["styles"][0]["name"], "a");
        assert_eq!(json["payload"]["nodes"], serde_json::json!([]));
    }

    #[test]
    fn test_warnings_surface() {
        let css = ".a { zoom: 2; color: var(--nope) } .b .c { color: red }";
        let conversion = convert(css, &ConvertConfig::default()).unwrap();
        let codes: Vec<&str> = conversion.warnings.iter().map(|w| w.code.as_str()).collect();
        assert!(codes.contains(&"UNSUPPORTED_PROPERTY"));
        assert!(codes.contains(&"UNRESOLVED_VARIABLE"));
        assert!(codes.contains(&"DESCENDANT_FLATTENED"));
    }

    #[test]
    fn test_preflight_attached() {
        let conversion = convert(".a { color: red }", &ConvertConfig::default()).unwrap();
        let preflight = conversion.preflight.unwrap();
        assert!(preflight.is_valid, "{}", preflight.summary);
    }

    #[test]
    fn test_conversion_serializes_camel_case() {
        let conversion = convert("@media print { .a { color: black } }", &ConvertConfig::default()).unwrap();
        let json = serde_json::to_value(&conversion).unwrap();
        assert!(json["nonStandardMediaCss"].as_str().unwrap().contains("@media print"));
        assert_eq!(json["droppedDuplicateStyles"], 0);
    }
}
