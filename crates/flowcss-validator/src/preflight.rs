//! Preflight validation of a candidate payload.

use crate::checks::{
    check_circular, check_embed_size, check_references, check_structure, check_styles,
    check_uuids, CircularCheck, EmbedSizeCheck, ReferenceCheck, StructureCheck, StyleCheck,
    UuidCheck,
};
use crate::issue::{IssueCode, Severity, ValidationIssue};
use crate::payload::PayloadView;
use serde::Serialize;
use serde_json::Value;

/// How many concrete examples each summary category lists.
pub const SUMMARY_EXAMPLES: usize = 3;

/// Aggregated result of every check. Computed fresh per call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreflightResult {
    /// No issues of any severity.
    pub is_valid: bool,
    /// No fatal or error issues.
    pub can_proceed: bool,
    pub uuid: UuidCheck,
    pub references: ReferenceCheck,
    pub circular: CircularCheck,
    pub styles: StyleCheck,
    pub embed_size: EmbedSizeCheck,
    pub structure: StructureCheck,
    pub summary: String,
    pub issues: Vec<ValidationIssue>,
}

impl PreflightResult {
    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        Self {
            is_valid: issues.is_empty(),
            can_proceed: !issues.iter().any(|i| i.severity.is_blocking()),
            summary: summarize(&issues),
            issues,
            ..Self::default()
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn has(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }

    pub fn blocking_issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity.is_blocking())
    }
}

/// Run every check over `payload`. Never panics on malformed input; a
/// payload of the wrong shape yields a single fatal `INVALID_PAYLOAD` issue.
pub fn validate(payload: &Value) -> PreflightResult {
    let view = match PayloadView::from_value(payload) {
        Ok(view) => view,
        Err(reason) => {
            tracing::warn!(%reason, "payload rejected before validation");
            return PreflightResult::from_issues(vec![ValidationIssue::fatal(
                IssueCode::InvalidPayload,
                format!("Payload is not a node/style graph: {reason}"),
            )]);
        }
    };
    validate_view(&view)
}

/// Run every check over an already parsed view.
pub fn validate_view(view: &PayloadView) -> PreflightResult {
    let mut issues = Vec::new();
    let uuid = check_uuids(view, &mut issues);
    let circular = check_circular(view, &mut issues);
    let references = check_references(view, &mut issues);
    let styles = check_styles(view, &mut issues);
    let embed_size = check_embed_size(view, &mut issues);
    let structure = check_structure(view, &mut issues);

    let result = PreflightResult {
        uuid,
        references,
        circular,
        styles,
        embed_size,
        structure,
        ..PreflightResult::from_issues(issues)
    };

    tracing::debug!(
        nodes = view.nodes.len(),
        styles = view.styles.len(),
        issues = result.issues.len(),
        can_proceed = result.can_proceed,
        "preflight complete"
    );
    result
}

/// Bounded human-readable summary: one line per issue code with its total
/// and the first few messages.
pub fn summarize(issues: &[ValidationIssue]) -> String {
    if issues.is_empty() {
        return "No issues found".to_string();
    }

    let count = |severity: Severity| issues.iter().filter(|i| i.severity == severity).count();
    let mut lines = vec![format!(
        "{} fatal, {} errors, {} warnings, {} info",
        count(Severity::Fatal),
        count(Severity::Error),
        count(Severity::Warning),
        count(Severity::Info)
    )];

    let mut codes: Vec<IssueCode> = Vec::new();
    for issue in issues {
        if !codes.contains(&issue.code) {
            codes.push(issue.code);
        }
    }

    for code in codes {
        let matching: Vec<&ValidationIssue> = issues.iter().filter(|i| i.code == code).collect();
        let examples: Vec<&str> = matching
            .iter()
            .take(SUMMARY_EXAMPLES)
            .map(|i| i.message.as_str())
            .collect();
        let mut line = format!("{code} ({}): {}", matching.len(), examples.join("; "));
        if matching.len() > SUMMARY_EXAMPLES {
            line.push_str(&format!("; and {} more", matching.len() - SUMMARY_EXAMPLES));
        }
        lines.push(line);
    }
    lines.join("\n")
}
