//! Independent payload checks.
//!
//! Each check reads a [`PayloadView`], appends severity-tagged issues to the
//! shared list and returns its own sub-result for the preflight report.
//! Graph traversals use explicit stacks so adversarial depth cannot
//! overflow the call stack.

use crate::issue::{IssueCode, ValidationIssue};
use crate::payload::{NodeView, PayloadView};
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Embedded content above this many bytes is a warning.
pub const EMBED_WARN_BYTES: usize = 10 * 1024;
/// Embedded content above this many bytes is an error.
pub const EMBED_MAX_BYTES: usize = 100 * 1024;

static ID_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w-]+$").expect("id pattern is valid"));
static LEAKED_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(undefined|NaN)").expect("token pattern is valid"));
static EMPTY_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"url\(\s*(""|''|)\s*\)"#).expect("url pattern is valid"));
static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[0-9A-Za-z]+\b").expect("hex pattern is valid"));
static URL_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"url\([^)]*\)").expect("url call pattern is valid"));
static NEGATIVE_LENGTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\d*\.?\d").expect("length pattern is valid"));

// =========================================================================
// Identifiers
// =========================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UuidCheck {
    pub valid: bool,
    pub duplicate_node_ids: Vec<String>,
    pub duplicate_style_ids: Vec<String>,
    pub invalid_ids: Vec<String>,
}

/// Duplicate identifiers are fatal; malformed ones are errors.
pub fn check_uuids(view: &PayloadView, issues: &mut Vec<ValidationIssue>) -> UuidCheck {
    let mut result = UuidCheck::default();

    let node_ids = view.nodes.iter().map(|n| n.id.as_str());
    for id in duplicates(node_ids) {
        issues.push(
            ValidationIssue::fatal(IssueCode::DuplicateNodeId, format!("Node id '{id}' is used more than once"))
                .with_context(id.clone())
                .with_suggestion("Regenerate ids so every node is unique"),
        );
        result.duplicate_node_ids.push(id);
    }

    let style_ids = view.styles.iter().map(|s| s.id.as_str());
    for id in duplicates(style_ids) {
        issues.push(
            ValidationIssue::fatal(IssueCode::DuplicateStyleId, format!("Style id '{id}' is used more than once"))
                .with_context(id.clone())
                .with_suggestion("Deduplicate styles by name before emitting"),
        );
        result.duplicate_style_ids.push(id);
    }

    let all_ids = view
        .nodes
        .iter()
        .map(|n| (n.index, "node", n.id.as_str()))
        .chain(view.styles.iter().map(|s| (s.index, "style", s.id.as_str())));
    for (index, kind, id) in all_ids {
        if ID_FORMAT.is_match(id) {
            continue;
        }
        let shown = if id.is_empty() { "<empty>" } else { id };
        issues.push(
            ValidationIssue::error(
                IssueCode::InvalidIdFormat,
                format!("{kind} #{index} has an invalid id '{shown}'"),
            )
            .with_context(format!("{kind}s[{index}]")),
        );
        result.invalid_ids.push(id.to_string());
    }

    result.valid = result.duplicate_node_ids.is_empty()
        && result.duplicate_style_ids.is_empty()
        && result.invalid_ids.is_empty();
    result
}

/// Ids that occur more than once, each reported once, in first-seen order.
fn duplicates<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut out = Vec::new();
    for id in ids {
        if !seen.insert(id) && reported.insert(id) {
            out.push(id.to_string());
        }
    }
    out
}

// =========================================================================
// Cycles
// =========================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircularCheck {
    pub has_cycles: bool,
    /// Each cycle as the node path from the re-entered node to the node
    /// whose child edge closes it.
    pub cycles: Vec<Vec<String>>,
}

/// Node graph keyed by position; the first node wins for duplicated ids.
struct Graph<'a> {
    ids: Vec<&'a str>,
    edges: Vec<Vec<usize>>,
}

impl<'a> Graph<'a> {
    fn new(nodes: &'a [NodeView]) -> Self {
        let mut by_id: HashMap<&str, usize> = HashMap::new();
        for (i, node) in nodes.iter().enumerate() {
            by_id.entry(node.id.as_str()).or_insert(i);
        }
        let edges = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                if by_id.get(node.id.as_str()) != Some(&i) {
                    return Vec::new();
                }
                node.children
                    .iter()
                    .filter_map(|child| by_id.get(child.as_str()).copied())
                    .collect()
            })
            .collect();
        Self {
            ids: nodes.iter().map(|n| n.id.as_str()).collect(),
            edges,
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    White,
    Grey,
    Black,
}

/// Depth-first search over `children` edges. Every back-edge is recorded as
/// a cycle.
pub fn check_circular(view: &PayloadView, issues: &mut Vec<ValidationIssue>) -> CircularCheck {
    let graph = Graph::new(&view.nodes);
    let cycles = find_cycles(&graph);

    for cycle in &cycles {
        let mut path = cycle.join(" -> ");
        if let Some(first) = cycle.first() {
            path.push_str(" -> ");
            path.push_str(first);
        }
        issues.push(
            ValidationIssue::fatal(IssueCode::CircularReference, format!("Circular children chain: {path}"))
                .with_context(path)
                .with_suggestion("Remove the child reference that closes the loop"),
        );
    }

    CircularCheck {
        has_cycles: !cycles.is_empty(),
        cycles,
    }
}

fn find_cycles(graph: &Graph<'_>) -> Vec<Vec<String>> {
    let mut marks = vec![Mark::White; graph.ids.len()];
    let mut cycles = Vec::new();

    for start in 0..graph.ids.len() {
        if marks[start] != Mark::White {
            continue;
        }
        // (node, next edge to follow)
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        marks[start] = Mark::Grey;

        while let Some(top) = stack.last_mut() {
            let (node, edge) = *top;
            top.1 += 1;
            let Some(&child) = graph.edges[node].get(edge) else {
                marks[node] = Mark::Black;
                stack.pop();
                continue;
            };

            match marks[child] {
                Mark::White => {
                    marks[child] = Mark::Grey;
                    stack.push((child, 0));
                }
                Mark::Grey => {
                    let from = stack.iter().position(|&(n, _)| n == child).unwrap_or(0);
                    cycles.push(
                        stack[from..]
                            .iter()
                            .map(|&(n, _)| graph.ids[n].to_string())
                            .collect(),
                    );
                }
                Mark::Black => {}
            }
        }
    }

    cycles
}

// =========================================================================
// References
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanReference {
    pub parent: String,
    pub child: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceCheck {
    pub valid: bool,
    pub orphans: Vec<OrphanReference>,
    pub unreachable: Vec<String>,
    pub missing_styles: Vec<String>,
}

/// Dangling child references, unreachable nodes and missing style refs.
pub fn check_references(view: &PayloadView, issues: &mut Vec<ValidationIssue>) -> ReferenceCheck {
    let mut result = ReferenceCheck::default();
    let node_ids: HashSet<&str> = view.nodes.iter().map(|n| n.id.as_str()).collect();

    let mut seen_pairs = HashSet::new();
    for node in &view.nodes {
        for child in &node.children {
            if node_ids.contains(child.as_str()) || !seen_pairs.insert((&node.id, child)) {
                continue;
            }
            issues.push(
                ValidationIssue::error(
                    IssueCode::OrphanReference,
                    format!("Node '{}' lists missing child '{child}'", node.id),
                )
                .with_context(format!("{} -> {child}", node.id))
                .with_suggestion("Drop the dangling child id"),
            );
            result.orphans.push(OrphanReference {
                parent: node.id.clone(),
                child: child.clone(),
            });
        }
    }

    result.unreachable = unreachable_nodes(view);
    for id in &result.unreachable {
        issues.push(
            ValidationIssue::warning(
                IssueCode::UnreachableNode,
                format!("Node '{id}' is not reachable from any root"),
            )
            .with_context(id.clone()),
        );
    }

    result.missing_styles = check_style_references(view, issues);
    result.valid = result.orphans.is_empty();
    result
}

/// Nodes not reachable from an inferred root (a node nobody lists as child).
fn unreachable_nodes(view: &PayloadView) -> Vec<String> {
    let graph = Graph::new(&view.nodes);
    let claimed: HashSet<&str> = view
        .nodes
        .iter()
        .flat_map(|n| n.children.iter().map(String::as_str))
        .collect();

    let mut visited = vec![false; graph.ids.len()];
    let mut stack: Vec<usize> = (0..graph.ids.len())
        .filter(|&i| !claimed.contains(graph.ids[i]))
        .collect();
    while let Some(node) = stack.pop() {
        if std::mem::replace(&mut visited[node], true) {
            continue;
        }
        stack.extend(graph.edges[node].iter().copied().filter(|&c| !visited[c]));
    }

    // Duplicates of a visited id count as reached; they are reported as duplicates instead.
    let reached: HashSet<&str> = (0..graph.ids.len())
        .filter(|&i| visited[i])
        .map(|i| graph.ids[i])
        .collect();
    let mut out: Vec<String> = Vec::new();
    for id in &graph.ids {
        if !reached.contains(id) && !out.iter().any(|o| o == id) {
            out.push(id.to_string());
        }
    }
    out
}

/// Class references resolving to no style by id or name. Built-in `w-`
/// classes are skipped.
pub fn check_style_references(view: &PayloadView, issues: &mut Vec<ValidationIssue>) -> Vec<String> {
    let known: HashSet<&str> = view
        .styles
        .iter()
        .flat_map(|s| [s.id.as_str(), s.name.as_str()])
        .collect();

    let mut missing = Vec::new();
    for node in &view.nodes {
        for class in &node.classes {
            if class.starts_with("w-") || known.contains(class.as_str()) {
                continue;
            }
            if !missing.contains(class) {
                issues.push(
                    ValidationIssue::warning(
                        IssueCode::MissingStyleReference,
                        format!("Node '{}' references unknown style '{class}'", node.id),
                    )
                    .with_context(node.id.clone()),
                );
                missing.push(class.clone());
            }
        }
    }
    missing
}

// =========================================================================
// Style content
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleProblem {
    pub style: String,
    pub variant: Option<String>,
    pub property: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleCheck {
    pub valid: bool,
    pub problems: Vec<StyleProblem>,
}

/// Flag style declarations that would paste as broken values.
pub fn check_styles(view: &PayloadView, issues: &mut Vec<ValidationIssue>) -> StyleCheck {
    let mut problems = Vec::new();

    for style in &view.styles {
        let buckets = std::iter::once((None, style.style_less.as_str())).chain(
            style
                .variants
                .iter()
                .map(|(key, less)| (Some(key.as_str()), less.as_str())),
        );
        for (variant, style_less) in buckets {
            for (property, value) in declarations(style_less) {
                let Some(reason) = value_problem(property, value) else {
                    continue;
                };
                let location = match variant {
                    Some(v) => format!("{} ({v})", style.name),
                    None => style.name.clone(),
                };
                issues.push(
                    ValidationIssue::warning(
                        IssueCode::InvalidStyleValue,
                        format!("{location}: '{property}: {value}' {reason}"),
                    )
                    .with_context(location),
                );
                problems.push(StyleProblem {
                    style: style.name.clone(),
                    variant: variant.map(str::to_string),
                    property: property.to_string(),
                    reason: reason.to_string(),
                });
            }
        }
    }

    StyleCheck {
        valid: problems.is_empty(),
        problems,
    }
}

/// Why a declaration is unsafe, if it is.
fn value_problem(property: &str, value: &str) -> Option<&'static str> {
    if LEAKED_TOKEN.is_match(value) {
        return Some("contains a leaked undefined/NaN token");
    }
    if value.contains("{{") || value.contains("${") {
        return Some("contains an unresolved template placeholder");
    }
    if value.contains("var(--") {
        return Some("contains an unresolved variable reference");
    }
    if value.to_ascii_lowercase().contains("!important") {
        return Some("uses !important");
    }
    if EMPTY_URL.is_match(value) {
        return Some("has an empty url()");
    }
    // Fragment references like url(#clip) are not colors
    let outside_urls = URL_CALL.replace_all(value, "url()");
    if HEX_COLOR.find_iter(&outside_urls).any(|m| !is_valid_hex(m.as_str())) {
        return Some("has a malformed hex color");
    }
    let sized = matches!(
        property,
        "width" | "height" | "min-width" | "min-height" | "max-width" | "max-height"
    ) || property.starts_with("padding");
    if sized && NEGATIVE_LENGTH.is_match(value.trim()) {
        return Some("is negative");
    }
    None
}

fn is_valid_hex(token: &str) -> bool {
    let digits = &token[1..];
    matches!(digits.len(), 3 | 4 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Split a styleLess string into `(property, value)` pairs.
fn declarations(style_less: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in style_less.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ';' if depth == 0 => {
                push_declaration(&style_less[start..i], &mut out);
                start = i + 1;
            }
            _ => {}
        }
    }
    push_declaration(&style_less[start..], &mut out);
    out
}

fn push_declaration<'a>(text: &'a str, out: &mut Vec<(&'a str, &'a str)>) {
    if let Some((property, value)) = text.split_once(':') {
        let property = property.trim();
        if !property.is_empty() {
            out.push((property, value.trim()));
        }
    }
}

// =========================================================================
// Embed size
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedSize {
    pub node_id: String,
    pub bytes: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedSizeCheck {
    pub total_bytes: usize,
    pub oversized: Vec<EmbedSize>,
    pub exceeds_limit: bool,
}

/// Size of embedded markup, per node and in total.
pub fn check_embed_size(view: &PayloadView, issues: &mut Vec<ValidationIssue>) -> EmbedSizeCheck {
    let mut result = EmbedSizeCheck::default();

    for node in &view.nodes {
        let Some(embed) = &node.embed else { continue };
        let bytes = embed.len();
        result.total_bytes += bytes;
        if let Some(issue) = size_issue(bytes, &format!("Embed in node '{}'", node.id)) {
            result.exceeds_limit |= issue.severity.is_blocking();
            issues.push(issue.with_context(node.id.clone()));
            result.oversized.push(EmbedSize {
                node_id: node.id.clone(),
                bytes,
            });
        }
    }

    if let Some(issue) = size_issue(result.total_bytes, "Embedded content in total") {
        result.exceeds_limit |= issue.severity.is_blocking();
        issues.push(issue.with_suggestion("Split the page or move scripts out of embeds"));
    }
    result
}

fn size_issue(bytes: usize, subject: &str) -> Option<ValidationIssue> {
    let kb = bytes as f64 / 1024.0;
    if bytes > EMBED_MAX_BYTES {
        Some(ValidationIssue::error(
            IssueCode::EmbedSizeExceeded,
            format!("{subject} is {kb:.1}KB, above the 100KB limit"),
        ))
    } else if bytes > EMBED_WARN_BYTES {
        Some(ValidationIssue::warning(
            IssueCode::EmbedSizeWarning,
            format!("{subject} is {kb:.1}KB; large embeds may fail to paste"),
        ))
    } else {
        None
    }
}

// =========================================================================
// Structure
// =========================================================================

/// Node types the target accepts.
pub const KNOWN_NODE_TYPES: &[&str] = &[
    "Block", "Section", "Container", "BlockContainer", "Grid", "Layout", "Cell", "VFlex",
    "HFlex", "Heading", "Paragraph", "Link", "LinkBlock", "Image", "List", "ListItem",
    "Blockquote", "RichText", "Span", "Strong", "Emphasis", "Superscript", "Subscript",
    "LineBreak", "HtmlEmbed", "Video", "YouTubeVideo", "Icon", "Figure", "Figcaption",
    "CodeBlock", "FormWrapper", "FormForm", "FormTextInput", "FormTextarea", "FormSelect",
    "FormButton", "FormBlockLabel", "FormInlineLabel", "FormCheckboxWrapper",
    "FormCheckboxInput", "FormRadioWrapper", "FormRadioInput", "FormSuccessMessage",
    "FormErrorMessage", "NavbarWrapper", "NavbarContainer", "NavbarBrand", "NavbarMenu",
    "NavbarLink", "NavbarButton", "DropdownWrapper", "DropdownToggle", "DropdownList",
    "DropdownLink",
];

/// Tags each type is expected to carry.
const TYPE_TAGS: &[(&str, &[&str])] = &[
    ("Heading", &["h1", "h2", "h3", "h4", "h5", "h6"]),
    ("Paragraph", &["p"]),
    ("Link", &["a"]),
    ("LinkBlock", &["a"]),
    ("Image", &["img"]),
    ("List", &["ul", "ol"]),
    ("ListItem", &["li"]),
    ("Blockquote", &["blockquote"]),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureCheck {
    pub valid: bool,
    pub invalid_nodes: Vec<String>,
}

/// Text nodes, node types and tag/type combinations.
pub fn check_structure(view: &PayloadView, issues: &mut Vec<ValidationIssue>) -> StructureCheck {
    let mut result = StructureCheck::default();
    let mut blocking = false;

    for node in &view.nodes {
        let before = issues.len();
        if node.text {
            check_text_node(node, issues);
        } else {
            check_typed_node(node, issues);
        }
        let added = &issues[before..];
        if !added.is_empty() {
            blocking |= added.iter().any(|i| i.severity.is_blocking());
            result.invalid_nodes.push(node.id.clone());
        }
    }

    result.valid = !blocking;
    result
}

fn check_text_node(node: &NodeView, issues: &mut Vec<ValidationIssue>) {
    if node.v.is_none() {
        issues.push(
            ValidationIssue::error(
                IssueCode::TextNodeInvalid,
                format!("Text node '{}' has no text value", node.id),
            )
            .with_context(node.id.clone()),
        );
    }
    if !node.children.is_empty() {
        issues.push(
            ValidationIssue::error(
                IssueCode::TextNodeInvalid,
                format!("Text node '{}' has {} children", node.id, node.children.len()),
            )
            .with_context(node.id.clone())
            .with_suggestion("Text nodes must be leaves"),
        );
    }
}

fn check_typed_node(node: &NodeView, issues: &mut Vec<ValidationIssue>) {
    let Some(node_type) = node.node_type.as_deref() else {
        issues.push(
            ValidationIssue::error(
                IssueCode::UnknownNodeType,
                format!("Node '{}' has no type", node.id),
            )
            .with_context(node.id.clone()),
        );
        return;
    };
    if !KNOWN_NODE_TYPES.contains(&node_type) {
        issues.push(
            ValidationIssue::warning(
                IssueCode::UnknownNodeType,
                format!("Node '{}' has unknown type '{node_type}'", node.id),
            )
            .with_context(node.id.clone()),
        );
        return;
    }

    let Some(tag) = node.tag.as_deref() else {
        return;
    };
    if tag.eq_ignore_ascii_case("section") && node_type != "Block" {
        issues.push(
            ValidationIssue::error(
                IssueCode::TagTypeMismatch,
                format!("Node '{}' uses type '{node_type}' for a section tag", node.id),
            )
            .with_context(node.id.clone())
            .with_suggestion("Use type 'Block' with tag 'section'"),
        );
        return;
    }
    if let Some((_, tags)) = TYPE_TAGS.iter().find(|(t, _)| *t == node_type) {
        if !tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            issues.push(
                ValidationIssue::warning(
                    IssueCode::TagTypeMismatch,
                    format!("Node '{}' of type '{node_type}' has unexpected tag '{tag}'", node.id),
                )
                .with_context(node.id.clone()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Severity;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn view(value: Value) -> PayloadView {
        PayloadView::from_value(&value).unwrap()
    }

    fn node(id: &str, children: &[&str]) -> Value {
        json!({"_id": id, "type": "Block", "tag": "div", "children": children, "classes": []})
    }

    fn graph(nodes: Vec<Value>) -> PayloadView {
        view(json!({"nodes": nodes, "styles": []}))
    }

    fn codes(issues: &[ValidationIssue]) -> Vec<IssueCode> {
        issues.iter().map(|i| i.code).collect()
    }

    // =========================================================================
    // Identifiers
    // =========================================================================

    #[test]
    fn test_duplicate_node_id_is_fatal() {
        let mut issues = Vec::new();
        let result = check_uuids(&graph(vec![node("a", &[]), node("a", &[]), node("a", &[])]), &mut issues);
        assert_eq!(result.duplicate_node_ids, vec!["a"]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Fatal);
    }

    #[test]
    fn test_duplicate_style_id_is_fatal() {
        let mut issues = Vec::new();
        let payload = view(json!({"nodes": [], "styles": [
            {"_id": "s", "name": "a", "styleLess": ""},
            {"_id": "s", "name": "b", "styleLess": ""}
        ]}));
        let result = check_uuids(&payload, &mut issues);
        assert!(!result.valid);
        assert_eq!(codes(&issues), vec![IssueCode::DuplicateStyleId]);
    }

    #[test]
    fn test_invalid_id_format() {
        let mut issues = Vec::new();
        let result = check_uuids(&graph(vec![node("", &[]), node("has space", &[]), node("ok-id_1", &[])]), &mut issues);
        assert_eq!(result.invalid_ids.len(), 2);
        assert!(issues.iter().all(|i| i.severity == Severity::Error));
    }

    // =========================================================================
    // Cycles
    // =========================================================================

    #[test]
    fn test_three_node_cycle() {
        let mut issues = Vec::new();
        let result = check_circular(
            &graph(vec![node("A", &["B"]), node("B", &["C"]), node("C", &["A"])]),
            &mut issues,
        );
        assert_eq!(result.cycles, vec![vec!["A", "B", "C"]]);
        assert_eq!(codes(&issues), vec![IssueCode::CircularReference]);
    }

    #[test]
    fn test_acyclic_graph() {
        let mut issues = Vec::new();
        let result = check_circular(
            &graph(vec![node("A", &["B", "C"]), node("B", &["C"]), node("C", &[])]),
            &mut issues,
        );
        assert!(!result.has_cycles);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_all_back_edges_enumerated() {
        let mut issues = Vec::new();
        let result = check_circular(
            &graph(vec![
                node("A", &["B"]),
                node("B", &["A", "C"]),
                node("C", &["C"]),
            ]),
            &mut issues,
        );
        assert_eq!(result.cycles, vec![vec!["A", "B"], vec!["C"]]);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let nodes: Vec<Value> = (0..20_000)
            .map(|i| {
                let child = format!("n{}", i + 1);
                if i == 19_999 {
                    node(&format!("n{i}"), &[])
                } else {
                    node(&format!("n{i}"), &[child.as_str()])
                }
            })
            .collect();
        let mut issues = Vec::new();
        assert!(!check_circular(&graph(nodes), &mut issues).has_cycles);
    }

    // =========================================================================
    // References
    // =========================================================================

    #[test]
    fn test_orphan_per_unique_pair() {
        let mut issues = Vec::new();
        let result = check_references(
            &graph(vec![node("A", &["ghost", "ghost", "B"]), node("B", &["ghost"])]),
            &mut issues,
        );
        assert_eq!(result.orphans.len(), 2);
        assert_eq!(
            issues.iter().filter(|i| i.code == IssueCode::OrphanReference).count(),
            2
        );
    }

    #[test]
    fn test_unreachable_cycle_members() {
        let mut issues = Vec::new();
        let result = check_references(
            &graph(vec![node("root", &[]), node("x", &["y"]), node("y", &["x"])]),
            &mut issues,
        );
        assert_eq!(result.unreachable, vec!["x", "y"]);
        assert!(result.valid);
    }

    #[test]
    fn test_missing_style_reference() {
        let mut issues = Vec::new();
        let payload = view(json!({
            "nodes": [{"_id": "a", "type": "Block", "classes": ["s1", "nope", "w-layout-grid"], "children": []}],
            "styles": [{"_id": "s1", "name": "card", "styleLess": ""}]
        }));
        let result = check_references(&payload, &mut issues);
        assert_eq!(result.missing_styles, vec!["nope"]);
    }

    // =========================================================================
    // Styles
    // =========================================================================

    fn style_reasons(style_less: &str) -> Vec<String> {
        let payload = view(json!({"nodes": [], "styles": [
            {"_id": "s", "name": "x", "styleLess": style_less}
        ]}));
        let mut issues = Vec::new();
        check_styles(&payload, &mut issues)
            .problems
            .into_iter()
            .map(|p| p.property)
            .collect()
    }

    #[test]
    fn test_clean_style_passes() {
        assert!(style_reasons("color: #fff; margin-top: -10px; background-image: url(a.png);").is_empty());
    }

    #[test]
    fn test_url_fragments_are_not_hex_colors() {
        assert!(style_reasons("clip-path: url(#clip); background-image: url(icon.svg#arrow);").is_empty());
        assert_eq!(style_reasons("background: url(#clip) #zz;"), vec!["background"]);
    }

    #[test]
    fn test_style_content_flags() {
        assert_eq!(style_reasons("width: undefinedpx; height: NaN;"), vec!["width", "height"]);
        assert_eq!(style_reasons("color: {{brand}};"), vec!["color"]);
        assert_eq!(style_reasons("color: var(--brand);"), vec!["color"]);
        assert_eq!(style_reasons("color: red !important;"), vec!["color"]);
        assert_eq!(style_reasons("background-image: url('');"), vec!["background-image"]);
        assert_eq!(style_reasons("color: #ggg;"), vec!["color"]);
        assert_eq!(style_reasons("color: #12345;"), vec!["color"]);
        assert_eq!(style_reasons("padding-top: -4px; width: -1px;"), vec!["padding-top", "width"]);
    }

    #[test]
    fn test_variant_styles_checked() {
        let payload = view(json!({"nodes": [], "styles": [
            {"_id": "s", "name": "x", "styleLess": "", "variants": {"small": {"styleLess": "color: NaN;"}}}
        ]}));
        let mut issues = Vec::new();
        let result = check_styles(&payload, &mut issues);
        assert_eq!(result.problems[0].variant.as_deref(), Some("small"));
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    // =========================================================================
    // Embeds and structure
    // =========================================================================

    #[test]
    fn test_embed_size_thresholds() {
        let big = "x".repeat(EMBED_WARN_BYTES + 1);
        let huge = "x".repeat(EMBED_MAX_BYTES + 1);
        let mut issues = Vec::new();
        let result = check_embed_size(
            &graph(vec![json!({"_id": "e1", "type": "HtmlEmbed", "v": big})]),
            &mut issues,
        );
        assert!(!result.exceeds_limit);
        assert_eq!(codes(&issues), vec![IssueCode::EmbedSizeWarning, IssueCode::EmbedSizeWarning]);

        let mut issues = Vec::new();
        let result = check_embed_size(
            &graph(vec![json!({"_id": "e2", "type": "HtmlEmbed", "v": huge})]),
            &mut issues,
        );
        assert!(result.exceeds_limit);
        assert_eq!(issues[0].severity, Severity::Error);
    }

    #[test]
    fn test_text_node_rules() {
        let mut issues = Vec::new();
        let result = check_structure(
            &graph(vec![
                json!({"_id": "t1", "text": true, "v": "ok"}),
                json!({"_id": "t2", "text": true}),
                json!({"_id": "t3", "text": true, "v": "x", "children": ["t1"]}),
            ]),
            &mut issues,
        );
        assert_eq!(result.invalid_nodes, vec!["t2", "t3"]);
        assert!(!result.valid);
    }

    #[test]
    fn test_section_tag_requires_block() {
        let mut issues = Vec::new();
        check_structure(
            &graph(vec![json!({"_id": "s", "type": "Section", "tag": "section"})]),
            &mut issues,
        );
        assert_eq!(codes(&issues), vec![IssueCode::TagTypeMismatch]);
        assert_eq!(issues[0].severity, Severity::Error);
    }

    #[test]
    fn test_unknown_type_and_tag_mismatch_warn() {
        let mut issues = Vec::new();
        let result = check_structure(
            &graph(vec![
                json!({"_id": "a", "type": "Widget"}),
                json!({"_id": "b", "type": "Heading", "tag": "div"}),
                json!({"_id": "c", "type": "Block", "tag": "section"}),
            ]),
            &mut issues,
        );
        assert_eq!(codes(&issues), vec![IssueCode::UnknownNodeType, IssueCode::TagTypeMismatch]);
        assert!(issues.iter().all(|i| i.severity == Severity::Warning));
        assert!(result.valid);
    }
}
