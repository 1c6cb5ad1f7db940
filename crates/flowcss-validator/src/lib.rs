//! flowcss Validator
//!
//! Structural safety checks for node/style clipboard payloads. The target
//! application treats duplicate ids, dangling child references and cyclic
//! children chains as project corruption, so [`SafetyGate`] fails closed:
//! fatal issues withhold the payload outright, and error-level issues get
//! one sanitize and re-validate pass before the same verdict.
//!
//! ```
//! use flowcss_validator::{validate, SafetyGate};
//! use serde_json::json;
//!
//! let payload = json!({"nodes": [{"_id": "a", "type": "Block", "children": []}], "styles": []});
//! assert!(validate(&payload).can_proceed);
//! assert!(!SafetyGate::structural().run(&payload).is_blocked());
//! ```

pub mod checks;
pub mod gate;
pub mod issue;
pub mod payload;
pub mod preflight;

pub use checks::{
    check_circular, check_embed_size, check_references, check_structure, check_style_references,
    check_styles, check_uuids, CircularCheck, EmbedSizeCheck, ReferenceCheck, StructureCheck,
    StyleCheck, UuidCheck, EMBED_MAX_BYTES, EMBED_WARN_BYTES,
};
pub use gate::{GateReport, SafetyGate, Sanitizer, StructuralSanitizer};
pub use issue::{IssueCode, Severity, ValidationIssue};
pub use payload::{PayloadView, PAYLOAD_TYPE};
pub use preflight::{summarize, validate, validate_view, PreflightResult};
