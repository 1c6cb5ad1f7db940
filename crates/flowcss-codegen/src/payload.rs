//! Clipboard payload types.
//!
//! Field names follow the `@webflow/XscpData` wire format exactly, hence the
//! underscore and camelCase renames.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub use flowcss_validator::PAYLOAD_TYPE;

/// One variant bucket on a style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    #[serde(rename = "styleLess")]
    pub style_less: String,
}

/// A class style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebflowStyle {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    /// `"&"` for combo classes, empty otherwise.
    #[serde(default)]
    pub comb: String,
    #[serde(rename = "styleLess", default)]
    pub style_less: String,
    #[serde(default)]
    pub variants: BTreeMap<String, Variant>,
    #[serde(default)]
    pub children: Vec<String>,
}

impl WebflowStyle {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: "class".to_string(),
            name: name.into(),
            namespace: String::new(),
            comb: String::new(),
            style_less: String::new(),
            variants: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn variant(&self, key: &str) -> Option<&str> {
        self.variants.get(key).map(|v| v.style_less.as_str())
    }
}

/// An element node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebflowNode {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<String>,
    /// Style ids.
    #[serde(default)]
    pub classes: Vec<String>,
    /// Node ids.
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl WebflowNode {
    pub fn element(id: impl Into<String>, kind: &str, tag: &str) -> Self {
        Self {
            id: id.into(),
            kind: Some(kind.to_string()),
            tag: Some(tag.to_string()),
            ..Self::default()
        }
    }

    pub fn text(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: Some(true),
            v: Some(value.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interactions {
    pub interactions: Vec<Value>,
    pub events: Vec<Value>,
    pub action_lists: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayloadBody {
    pub nodes: Vec<WebflowNode>,
    pub styles: Vec<WebflowStyle>,
    #[serde(default)]
    pub assets: Vec<Value>,
    #[serde(default)]
    pub ix1: Vec<Value>,
    #[serde(default)]
    pub ix2: Interactions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadMeta {
    pub unlinked_symbol_count: u32,
    pub dropped_links: u32,
    pub dyn_bind_removed_count: u32,
    pub dyn_list_bind_removed_count: u32,
    pub pagination_removed_count: u32,
}

/// The full clipboard document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: PayloadBody,
    #[serde(default)]
    pub meta: PayloadMeta,
}

impl ClipboardPayload {
    pub fn new(nodes: Vec<WebflowNode>, styles: Vec<WebflowStyle>) -> Self {
        Self {
            kind: PAYLOAD_TYPE.to_string(),
            payload: PayloadBody {
                nodes,
                styles,
                ..PayloadBody::default()
            },
            meta: PayloadMeta::default(),
        }
    }

    pub fn nodes(&self) -> &[WebflowNode] {
        &self.payload.nodes
    }

    pub fn styles(&self) -> &[WebflowStyle] {
        &self.payload.styles
    }

    pub fn style(&self, name: &str) -> Option<&WebflowStyle> {
        self.payload.styles.iter().find(|s| s.name == name)
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// An element described by class names rather than ids, as supplied by the
/// caller of the section pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDraft {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Class names.
    #[serde(default)]
    pub classes: Vec<String>,
    /// Text content, emitted as a text child node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<NodeDraft>,
}

impl NodeDraft {
    pub fn new(kind: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            tag: Some(tag.into()),
            classes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_class(mut self, name: impl Into<String>) -> Self {
        self.classes.push(name.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: NodeDraft) -> Self {
        self.children.push(child);
        self
    }
}
