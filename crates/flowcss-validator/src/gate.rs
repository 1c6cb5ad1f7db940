//! Fail-closed safety gate.
//!
//! Fatal issues block outright. A payload whose only blocking issues are
//! errors is handed to a [`Sanitizer`] once and validated again; if blocking
//! issues remain, the payload is withheld.

use crate::issue::Severity;
use crate::payload::nodes_mut;
use crate::preflight::{validate, PreflightResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// Repairs a payload that failed validation with error-level issues.
pub trait Sanitizer {
    /// Return a repaired copy of `payload`. `result` is the failed preflight.
    fn sanitize(&self, payload: &Value, result: &PreflightResult) -> Value;
}

/// Mechanical repairs that never invent content or drop nodes:
///
/// - child ids pointing at missing nodes are removed
/// - text nodes lose their children and get an empty text value if missing
/// - `section` tags on a non-`Block` type are re-typed to `Block`
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralSanitizer;

impl Sanitizer for StructuralSanitizer {
    fn sanitize(&self, payload: &Value, _result: &PreflightResult) -> Value {
        let mut repaired = payload.clone();
        let Some(nodes) = nodes_mut(&mut repaired) else {
            return repaired;
        };

        let known: HashSet<String> = nodes.iter().filter_map(id_of).collect();
        for node in nodes.iter_mut() {
            if let Some(children) = node.get_mut("children").and_then(Value::as_array_mut) {
                children.retain(|c| c.as_str().is_some_and(|id| known.contains(id)));
            }
            repair_node(node);
        }
        repaired
    }
}

fn id_of(node: &Value) -> Option<String> {
    node.get("_id").and_then(Value::as_str).map(str::to_string)
}

fn repair_node(node: &mut Value) {
    let Some(object) = node.as_object_mut() else {
        return;
    };
    if object.get("text").and_then(Value::as_bool) == Some(true) {
        object.remove("children");
        if !object.get("v").is_some_and(Value::is_string) {
            object.insert("v".to_string(), Value::String(String::new()));
        }
        return;
    }
    let is_section = object
        .get("tag")
        .and_then(Value::as_str)
        .is_some_and(|t| t.eq_ignore_ascii_case("section"));
    if is_section && object.get("type").and_then(Value::as_str) != Some("Block") {
        object.insert("type".to_string(), Value::String("Block".to_string()));
    }
}

/// Result of running a payload through the gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateReport {
    /// The payload cleared for emission, or `None` when blocked.
    pub payload: Option<Value>,
    pub preflight: PreflightResult,
    /// Preflight of the sanitized payload, when sanitization ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revalidation: Option<PreflightResult>,
}

impl GateReport {
    pub fn is_blocked(&self) -> bool {
        self.payload.is_none()
    }

    pub fn was_sanitized(&self) -> bool {
        self.revalidation.is_some() && self.payload.is_some()
    }

    /// The preflight that decided the outcome.
    pub fn final_result(&self) -> &PreflightResult {
        self.revalidation.as_ref().unwrap_or(&self.preflight)
    }
}

/// Validate, block on fatal issues, sanitize errors once, re-validate.
#[derive(Debug, Clone)]
pub struct SafetyGate<S = StructuralSanitizer> {
    sanitizer: S,
}

impl SafetyGate {
    /// A gate backed by [`StructuralSanitizer`].
    pub fn structural() -> Self {
        Self::new(StructuralSanitizer)
    }
}

impl<S: Sanitizer> SafetyGate<S> {
    pub fn new(sanitizer: S) -> Self {
        Self { sanitizer }
    }

    pub fn run(&self, payload: &Value) -> GateReport {
        let preflight = validate(payload);
        if preflight.can_proceed {
            return GateReport {
                payload: Some(payload.clone()),
                preflight,
                revalidation: None,
            };
        }
        let fatal = preflight.count(Severity::Fatal);
        if fatal > 0 {
            tracing::warn!(fatal, "payload blocked by fatal issues");
            return GateReport {
                payload: None,
                preflight,
                revalidation: None,
            };
        }

        let sanitized = self.sanitizer.sanitize(payload, &preflight);
        let revalidation = validate(&sanitized);
        let payload = if revalidation.can_proceed {
            tracing::info!(
                fixed = preflight.issues.len().saturating_sub(revalidation.issues.len()),
                "payload repaired by sanitizer"
            );
            Some(sanitized)
        } else {
            tracing::warn!(
                blocking = revalidation.blocking_issues().count(),
                "payload blocked after sanitization"
            );
            None
        };

        GateReport {
            payload,
            preflight,
            revalidation: Some(revalidation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn payload(nodes: Value) -> Value {
        json!({"type": "@webflow/XscpData", "payload": {"nodes": nodes, "styles": []}, "meta": {}})
    }

    fn block(id: &str, children: &[&str]) -> Value {
        json!({"_id": id, "type": "Block", "tag": "div", "classes": [], "children": children})
    }

    #[test]
    fn test_clean_payload_passes_untouched() {
        let input = payload(json!([block("a", &["b"]), block("b", &[])]));
        let report = SafetyGate::structural().run(&input);
        assert!(!report.is_blocked());
        assert!(!report.was_sanitized());
        assert_eq!(report.payload, Some(input));
    }

    #[test]
    fn test_orphan_is_sanitized() {
        let input = payload(json!([block("a", &["b", "ghost"]), block("b", &[])]));
        let report = SafetyGate::structural().run(&input);
        assert!(report.was_sanitized());
        let repaired = report.payload.unwrap();
        assert_eq!(repaired["payload"]["nodes"][0]["children"], json!(["b"]));
        assert!(report.preflight.has(IssueCode::OrphanReference));
    }

    #[test]
    fn test_cycle_is_blocked_without_sanitizing() {
        let input = payload(json!([block("root", &["a"]), block("a", &["b"]), block("b", &["a"])]));
        let report = SafetyGate::structural().run(&input);
        assert!(report.is_blocked());
        assert!(report.revalidation.is_none());
        assert!(report.final_result().has(IssueCode::CircularReference));
    }

    #[test]
    fn test_duplicate_node_id_is_blocked() {
        let input = payload(json!([
            block("a", &["b"]),
            block("a", &["c"]),
            block("b", &[]),
            block("c", &[])
        ]));
        let report = SafetyGate::structural().run(&input);
        assert!(report.is_blocked());
        assert!(!report.was_sanitized());
        assert_eq!(report.final_result().count(Severity::Fatal), 1);
        assert!(report.final_result().has(IssueCode::DuplicateNodeId));
    }

    #[test]
    fn test_fatal_issue_blocks_even_with_repairable_errors() {
        let input = payload(json!([block("a", &["ghost"]), block("a", &[])]));
        let report = SafetyGate::structural().run(&input);
        assert!(report.is_blocked());
        assert!(report.preflight.has(IssueCode::OrphanReference));
        assert!(report.revalidation.is_none());
    }

    #[test]
    fn test_text_children_and_section_type_repaired() {
        let input = payload(json!([
            block("a", &["t", "s"]),
            {"_id": "t", "text": true, "v": "Hi", "children": ["ghost"]},
            {"_id": "s", "type": "Section", "tag": "section", "children": []}
        ]));
        let report = SafetyGate::structural().run(&input);
        assert!(report.was_sanitized());
        let nodes = &report.payload.as_ref().unwrap()["payload"]["nodes"];
        assert_eq!(nodes.as_array().map(Vec::len), Some(3));
        assert!(nodes[1].get("children").is_none());
        assert_eq!(nodes[2]["type"], "Block");
    }

    #[test]
    fn test_unrepairable_payload_is_blocked() {
        let input = payload(json!([block("bad id", &[])]));
        let report = SafetyGate::structural().run(&input);
        assert!(report.is_blocked());
        assert!(report.final_result().has(IssueCode::InvalidIdFormat));
    }

    #[test]
    fn test_invalid_shape_is_blocked() {
        let report = SafetyGate::structural().run(&json!({"nodes": "x"}));
        assert!(report.is_blocked());
    }

    struct NoopSanitizer;

    impl Sanitizer for NoopSanitizer {
        fn sanitize(&self, payload: &Value, _result: &PreflightResult) -> Value {
            payload.clone()
        }
    }

    #[test]
    fn test_custom_sanitizer_that_fixes_nothing_blocks() {
        let input = payload(json!([block("a", &["missing"])]));
        let report = SafetyGate::new(NoopSanitizer).run(&input);
        assert!(report.is_blocked());
        assert!(report.revalidation.is_some());
    }
}
