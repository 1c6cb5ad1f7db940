//! Lenient read-only view over a candidate payload.
//!
//! The validator must produce a result for any input, so the payload is
//! read from a [`serde_json::Value`] field by field instead of being
//! deserialized into strict types. Missing or mistyped fields fall back to
//! empty values and are left for the individual checks to report.

use serde_json::Value;

/// Clipboard type tag of a full payload envelope.
pub const PAYLOAD_TYPE: &str = "@webflow/XscpData";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeView {
    /// Position in the `nodes` array.
    pub index: usize,
    pub id: String,
    pub node_type: Option<String>,
    pub tag: Option<String>,
    pub text: bool,
    /// The text value; `None` when absent or not a string.
    pub v: Option<String>,
    pub children: Vec<String>,
    pub classes: Vec<String>,
    /// Embedded markup carried by the node, if any.
    pub embed: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleView {
    pub index: usize,
    pub id: String,
    pub name: String,
    pub style_less: String,
    /// `(variant key, styleLess)` pairs.
    pub variants: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayloadView {
    pub nodes: Vec<NodeView>,
    pub styles: Vec<StyleView>,
}

impl PayloadView {
    /// Read a payload envelope (`{type, payload: {nodes, styles}}`) or a bare
    /// `{nodes, styles}` object. Returns a description of the problem when
    /// neither shape is present.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let Some(object) = value.as_object() else {
            return Err(format!("expected a JSON object, found {}", kind_of(value)));
        };
        let inner = match object.get("payload") {
            Some(payload) => payload
                .as_object()
                .ok_or_else(|| format!("'payload' is {}, expected an object", kind_of(payload)))?,
            None => object,
        };

        let nodes = array_field(inner, "nodes")?;
        let styles = array_field(inner, "styles")?;

        Ok(Self {
            nodes: nodes.iter().enumerate().map(|(i, n)| read_node(i, n)).collect(),
            styles: styles.iter().enumerate().map(|(i, s)| read_style(i, s)).collect(),
        })
    }
}

/// The `nodes` array of either payload shape, for in-place repair.
pub fn nodes_mut(value: &mut Value) -> Option<&mut Vec<Value>> {
    inner_mut(value)?.get_mut("nodes")?.as_array_mut()
}

/// The `styles` array of either payload shape, for in-place repair.
pub fn styles_mut(value: &mut Value) -> Option<&mut Vec<Value>> {
    inner_mut(value)?.get_mut("styles")?.as_array_mut()
}

fn inner_mut(value: &mut Value) -> Option<&mut serde_json::Map<String, Value>> {
    let object = value.as_object_mut()?;
    if object.contains_key("payload") {
        object.get_mut("payload")?.as_object_mut()
    } else {
        Some(object)
    }
}

fn array_field<'a>(
    object: &'a serde_json::Map<String, Value>,
    key: &str,
) -> Result<&'a Vec<Value>, String> {
    match object.get(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(format!("'{key}' is {}, expected an array", kind_of(other))),
        None => Err(format!("missing '{key}' array")),
    }
}

fn read_node(index: usize, node: &Value) -> NodeView {
    let embed = node
        .pointer("/data/embed/meta/html")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            (str_field(node, "type").as_deref() == Some("HtmlEmbed"))
                .then(|| str_field(node, "v"))
                .flatten()
        });

    NodeView {
        index,
        id: str_field(node, "_id").unwrap_or_default(),
        node_type: str_field(node, "type"),
        tag: str_field(node, "tag"),
        text: node.get("text").and_then(Value::as_bool).unwrap_or(false),
        v: str_field(node, "v"),
        children: string_list(node, "children"),
        classes: string_list(node, "classes"),
        embed,
    }
}

fn read_style(index: usize, style: &Value) -> StyleView {
    let variants = style
        .get("variants")
        .and_then(Value::as_object)
        .map(|variants| {
            variants
                .iter()
                .map(|(key, variant)| {
                    let style_less = str_field(variant, "styleLess").unwrap_or_default();
                    (key.clone(), style_less)
                })
                .collect()
        })
        .unwrap_or_default();

    StyleView {
        index,
        id: str_field(style, "_id").unwrap_or_default(),
        name: str_field(style, "name").unwrap_or_default(),
        style_less: str_field(style, "styleLess").unwrap_or_default(),
        variants,
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
