use indexmap::map::Entry;
use indexmap::IndexMap;

/// A position in source text, tracking line and column for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

/// One `property: value` pair from a declaration block.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            important: false,
        }
    }

    pub fn is_custom_property(&self) -> bool {
        self.property.starts_with("--")
    }
}

/// A qualified rule: selector text plus its declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: String,
    pub declarations: Vec<Declaration>,
    pub span: Span,
}

/// An `@media` block with the rules nested inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaBlock {
    /// The query text after `@media`, whitespace-collapsed.
    pub query: String,
    pub rules: Vec<Rule>,
    /// The block exactly as written, for verbatim re-embedding.
    pub raw: String,
    pub span: Span,
    /// How many base rules precede this block in the document.
    pub base_rules_before: usize,
}

/// Custom-property table. The first definition of a name wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableTable {
    entries: IndexMap<String, String>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `name` unless it already exists. Returns whether it was added.
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        match self.entries.entry(name.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value.into());
                true
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Everything the extractor pulls out of one CSS document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    /// Rules outside any `@media` block, in document order.
    pub rules: Vec<Rule>,
    /// `@media` blocks in document order.
    pub media: Vec<MediaBlock>,
    /// At-rule blocks that cannot be modelled and must be embedded literally.
    pub verbatim: Vec<String>,
    pub variables: VariableTable,
}
