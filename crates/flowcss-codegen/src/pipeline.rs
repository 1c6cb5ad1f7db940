//! Section-by-section conversion.
//!
//! Sections are compiled in document order against one shared [`IdTable`].
//! The progress callback runs at every section and phase boundary and may
//! cancel the run there; a section that has started always finishes.

use crate::config::ConvertConfig;
use crate::emit::emit_styles;
use crate::ids::IdTable;
use crate::payload::{ClipboardPayload, NodeDraft, WebflowNode, WebflowStyle};
use crate::{CodegenError, Conversion};
use flowcss_parser::{compile, Diagnostics};
use flowcss_validator::{PreflightResult, SafetyGate};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::ops::ControlFlow;

/// Class names the target provides itself.
const BUILTIN_CLASS_PREFIX: &str = "w-";

/// One unit of input: its CSS and the elements that use it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub css: String,
    #[serde(default)]
    pub nodes: Vec<NodeDraft>,
}

impl Section {
    pub fn new(name: impl Into<String>, css: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            css: css.into(),
            nodes: Vec::new(),
        }
    }

    pub fn with_node(mut self, node: NodeDraft) -> Self {
        self.nodes.push(node);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Styles,
    Nodes,
    Validate,
}

/// Reported before each unit of work starts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress<'a> {
    pub phase: Phase,
    /// The section about to be compiled, during [`Phase::Styles`].
    pub section: Option<&'a str>,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: ConvertConfig,
}

impl Pipeline {
    pub fn new(config: ConvertConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    pub fn run<F>(&self, sections: &[Section], mut on_progress: F) -> Result<Conversion, CodegenError>
    where
        F: FnMut(&Progress<'_>) -> ControlFlow<()>,
    {
        let total = sections.len();
        let options = self.config.compile_options();
        let mut ids = IdTable::new();
        let mut diagnostics = Diagnostics::new();
        let mut styles: Vec<WebflowStyle> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut dropped = 0;
        let mut verbatim: Vec<String> = Vec::new();

        for (completed, section) in sections.iter().enumerate() {
            let progress = Progress {
                phase: Phase::Styles,
                section: Some(section.name.as_str()),
                completed,
                total,
            };
            if on_progress(&progress).is_break() {
                return Err(CodegenError::Cancelled { completed, total });
            }

            let index = compile(&section.css, &options);
            for warning in &index.warnings {
                diagnostics.push(warning.clone());
            }
            if let Some(css) = &index.non_standard_media_css {
                verbatim.push(css.clone());
            }

            for style in emit_styles(&index, &mut ids, &self.config, &mut diagnostics) {
                if seen.insert(style.name.clone()) {
                    styles.push(style);
                } else {
                    dropped += 1;
                    tracing::debug!(section = %section.name, class = %style.name, "dropped duplicate style");
                }
            }
        }

        let checkpoint = |phase| Progress {
            phase,
            section: None,
            completed: total,
            total,
        };

        if on_progress(&checkpoint(Phase::Nodes)).is_break() {
            return Err(CodegenError::Cancelled {
                completed: total,
                total,
            });
        }
        let style_ids: HashMap<&str, &str> = styles
            .iter()
            .map(|s| (s.name.as_str(), s.id.as_str()))
            .collect();
        let mut translator = Translator {
            ids: &mut ids,
            style_ids: &style_ids,
            diagnostics: &mut diagnostics,
            nodes: Vec::new(),
        };
        for draft in sections.iter().flat_map(|s| &s.nodes) {
            translator.translate(draft);
        }
        let nodes = translator.nodes;

        if on_progress(&checkpoint(Phase::Validate)).is_break() {
            return Err(CodegenError::Cancelled {
                completed: total,
                total,
            });
        }
        let payload = ClipboardPayload::new(nodes, styles);
        let (payload, preflight) = gate(payload, &self.config)?;

        tracing::info!(
            sections = total,
            dropped_duplicates = dropped,
            blocked = payload.is_none(),
            "conversion finished"
        );

        Ok(Conversion {
            payload,
            warnings: diagnostics.into_vec(),
            non_standard_media_css: (!verbatim.is_empty()).then(|| verbatim.join("\n")),
            preflight,
            dropped_duplicate_styles: dropped,
        })
    }
}

/// Run the safety gate when enabled. A blocked payload comes back as `None`.
fn gate(
    payload: ClipboardPayload,
    config: &ConvertConfig,
) -> Result<(Option<ClipboardPayload>, Option<PreflightResult>), CodegenError> {
    if !config.validate {
        return Ok((Some(payload), None));
    }
    let report = SafetyGate::structural().run(&payload.to_value()?);
    let preflight = report.final_result().clone();
    let payload = report
        .payload
        .map(ClipboardPayload::from_value)
        .transpose()?;
    Ok((payload, Some(preflight)))
}

struct Translator<'a> {
    ids: &'a mut IdTable,
    style_ids: &'a HashMap<&'a str, &'a str>,
    diagnostics: &'a mut Diagnostics,
    nodes: Vec<WebflowNode>,
}

impl Translator<'_> {
    /// Append `draft` and its descendants, parent first. Returns its id.
    fn translate(&mut self, draft: &NodeDraft) -> String {
        let id = self.ids.node_id();
        let is_section = draft
            .tag
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("section"));
        let kind = if is_section { "Block" } else { draft.kind.as_str() };

        let classes = self.class_refs(&draft.classes);
        let slot = self.nodes.len();
        self.nodes.push(WebflowNode {
            id: id.clone(),
            kind: Some(kind.to_string()),
            tag: draft.tag.clone(),
            classes,
            ..WebflowNode::default()
        });

        let mut children = Vec::new();
        if let Some(text) = &draft.text {
            let text_id = self.ids.node_id();
            self.nodes.push(WebflowNode::text(text_id.clone(), text.clone()));
            children.push(text_id);
        }
        for child in &draft.children {
            children.push(self.translate(child));
        }
        self.nodes[slot].children = children;
        id
    }

    fn class_refs(&mut self, names: &[String]) -> Vec<String> {
        let mut refs = Vec::new();
        for name in names {
            if let Some(id) = self.style_ids.get(name.as_str()) {
                refs.push((*id).to_string());
            } else if name.starts_with(BUILTIN_CLASS_PREFIX) {
                refs.push(name.clone());
            } else {
                self.diagnostics.info(
                    "UNKNOWN_CLASS",
                    format!("class '{name}' has no style; reference dropped"),
                );
            }
        }
        refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(sections: &[Section]) -> Conversion {
        Pipeline::default()
            .run(sections, |_| ControlFlow::Continue(()))
            .unwrap()
    }

    // =========================================================================
    // Styles
    // =========================================================================

    #[test]
    fn test_first_duplicate_style_wins() {
        let sections = [
            Section::new("hero", ".btn { color: red } .hero { margin-top: 0 }"),
            Section::new("footer", ".btn { color: blue }"),
        ];
        let conversion = run(&sections);
        let payload = conversion.payload.unwrap();
        assert_eq!(payload.styles().len(), 2);
        assert_eq!(payload.style("btn").unwrap().style_less, "color: red;");
        assert_eq!(conversion.dropped_duplicate_styles, 1);
    }

    #[test]
    fn test_styles_keep_document_order() {
        let sections = [Section::new("a", ".z { color: red }"), Section::new("b", ".a { color: red }")];
        let payload = run(&sections).payload.unwrap();
        let names: Vec<&str> = payload.styles().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn test_non_standard_media_joined() {
        let sections = [
            Section::new("a", "@media print { .a { color: black } }"),
            Section::new("b", "@media (orientation: landscape) { .b { color: red } }"),
        ];
        let css = run(&sections).non_standard_media_css.unwrap();
        assert!(css.contains("@media print"));
        assert!(css.contains("orientation: landscape"));
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    #[test]
    fn test_drafts_reference_style_ids() {
        let section = Section::new("hero", ".card { display: flex } .title { color: red }").with_node(
            NodeDraft::new("Block", "div")
                .with_class("card")
                .with_class("w-inline-block")
                .with_class("missing")
                .with_child(NodeDraft::new("Heading", "h2").with_class("title").with_text("Hi")),
        );
        let conversion = run(&[section]);
        assert!(conversion.warnings.iter().any(|w| w.code == "UNKNOWN_CLASS"));

        let payload = conversion.payload.unwrap();
        let card_id = &payload.style("card").unwrap().id;
        let title_id = &payload.style("title").unwrap().id;
        let nodes = payload.nodes();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].classes, vec![card_id.clone(), "w-inline-block".to_string()]);
        assert_eq!(nodes[0].children, vec![nodes[1].id.clone()]);
        assert_eq!(nodes[1].classes, vec![title_id.clone()]);
        assert_eq!(nodes[2].text, Some(true));
        assert_eq!(nodes[2].v.as_deref(), Some("Hi"));
        assert_eq!(nodes[1].children, vec![nodes[2].id.clone()]);
    }

    #[test]
    fn test_section_tag_uses_block_type() {
        let section = Section::new("s", "").with_node(NodeDraft::new("Section", "section"));
        let payload = run(&[section]).payload.unwrap();
        assert_eq!(payload.nodes()[0].kind.as_deref(), Some("Block"));
    }

    #[test]
    fn test_payload_passes_preflight() {
        let section = Section::new("s", ".a { color: red }")
            .with_node(NodeDraft::new("Block", "div").with_class("a"));
        let conversion = run(&[section]);
        let preflight = conversion.preflight.unwrap();
        assert!(preflight.can_proceed, "{}", preflight.summary);
    }

    // =========================================================================
    // Progress and cancellation
    // =========================================================================

    #[test]
    fn test_progress_reports_every_boundary() {
        let sections = [Section::new("a", ""), Section::new("b", "")];
        let mut seen = Vec::new();
        Pipeline::default()
            .run(&sections, |p| {
                seen.push((p.phase, p.section.map(str::to_string), p.completed));
                ControlFlow::Continue(())
            })
            .unwrap();
        assert_eq!(
            seen,
            vec![
                (Phase::Styles, Some("a".to_string()), 0),
                (Phase::Styles, Some("b".to_string()), 1),
                (Phase::Nodes, None, 2),
                (Phase::Validate, None, 2),
            ]
        );
    }

    #[test]
    fn test_cancel_between_sections() {
        let sections = [Section::new("a", ".a { color: red }"), Section::new("b", "")];
        let result = Pipeline::default().run(&sections, |p| {
            if p.completed == 1 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert!(matches!(
            result,
            Err(CodegenError::Cancelled { completed: 1, total: 2 })
        ));
    }

    #[test]
    fn test_validation_can_be_disabled() {
        let pipeline = Pipeline::new(ConvertConfig {
            validate: false,
            ..ConvertConfig::default()
        });
        let conversion = pipeline
            .run(&[Section::new("a", ".a { color: red }")], |_| ControlFlow::Continue(()))
            .unwrap();
        assert!(conversion.preflight.is_none());
        assert!(conversion.payload.is_some());
    }
}
