//! Class index data model.
//!
//! The resolver folds every rule into one [`ClassEntry`] per target class
//! name. Each entry carries a base bucket, pseudo-state buckets and
//! breakpoint buckets; all buckets are insertion-ordered [`StyleMap`]s.

use flowcss_lexer::Diagnostic;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

/// Breakpoint tiers. `Desktop`, `Medium`, `Small` and `Tiny` cascade down;
/// `XLarge`, `XxLarge` and `XxxLarge` cascade up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Desktop,
    Medium,
    Small,
    Tiny,
    XLarge,
    XxLarge,
    XxxLarge,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 7] = [
        Breakpoint::Desktop,
        Breakpoint::Medium,
        Breakpoint::Small,
        Breakpoint::Tiny,
        Breakpoint::XLarge,
        Breakpoint::XxLarge,
        Breakpoint::XxxLarge,
    ];

    /// Max-width tiers, largest first.
    pub const CASCADE_DOWN: [Breakpoint; 3] =
        [Breakpoint::Medium, Breakpoint::Small, Breakpoint::Tiny];

    pub fn name(self) -> &'static str {
        match self {
            Breakpoint::Desktop => "desktop",
            Breakpoint::Medium => "medium",
            Breakpoint::Small => "small",
            Breakpoint::Tiny => "tiny",
            Breakpoint::XLarge => "xlarge",
            Breakpoint::XxLarge => "xxlarge",
            Breakpoint::XxxLarge => "xxxlarge",
        }
    }

    /// Upper bound in px for cascade-down tiers.
    pub fn max_width(self) -> Option<u32> {
        match self {
            Breakpoint::Medium => Some(991),
            Breakpoint::Small => Some(767),
            Breakpoint::Tiny => Some(479),
            _ => None,
        }
    }

    /// Lower bound in px for cascade-up tiers.
    pub fn min_width(self) -> Option<u32> {
        match self {
            Breakpoint::XLarge => Some(1280),
            Breakpoint::XxLarge => Some(1440),
            Breakpoint::XxxLarge => Some(1920),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Breakpoint::Desktop => "Desktop (base, 992px to 1279px)",
            Breakpoint::Medium => "Tablet (max-width: 991px)",
            Breakpoint::Small => "Mobile landscape (max-width: 767px)",
            Breakpoint::Tiny => "Mobile portrait (max-width: 479px)",
            Breakpoint::XLarge => "Large desktop (min-width: 1280px)",
            Breakpoint::XxLarge => "Extra large desktop (min-width: 1440px)",
            Breakpoint::XxxLarge => "Widescreen (above 1920px)",
        }
    }
}

/// Interactive states the target can express as variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PseudoState {
    Hover,
    Focus,
    Active,
    Visited,
}

impl PseudoState {
    pub const ALL: [PseudoState; 4] = [
        PseudoState::Hover,
        PseudoState::Focus,
        PseudoState::Active,
        PseudoState::Visited,
    ];

    /// Map a pseudo-class name (without the colon) to a state.
    pub fn from_pseudo_class(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "hover" => Some(PseudoState::Hover),
            "focus" | "focus-visible" | "focus-within" => Some(PseudoState::Focus),
            "active" => Some(PseudoState::Active),
            "visited" => Some(PseudoState::Visited),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PseudoState::Hover => "hover",
            PseudoState::Focus => "focus",
            PseudoState::Active => "active",
            PseudoState::Visited => "visited",
        }
    }
}

// ---------------------------------------------------------------------------
// StyleMap
// ---------------------------------------------------------------------------

/// Insertion-ordered property map. Setting an existing property replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    entries: IndexMap<String, String>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(property.into(), value.into());
    }

    /// Set `property` only if it is not already present.
    pub fn set_if_absent(&mut self, property: &str, value: &str) -> bool {
        if self.contains(property) {
            return false;
        }
        self.entries.insert(property.to_string(), value.to_string());
        true
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.entries.get(property).map(String::as_str)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.entries.contains_key(property)
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        self.entries.shift_remove(property)
    }

    /// Rename a property, keeping its position. An existing `to` is replaced.
    pub fn rename(&mut self, from: &str, to: &str) {
        if from == to || !self.contains(from) {
            return;
        }
        self.entries.shift_remove(to);
        if let Some((idx, _, value)) = self.entries.shift_remove_full(from) {
            self.entries.shift_insert(idx, to.to_string(), value);
        }
    }

    /// Merge `other` into `self`; values from `other` win.
    pub fn extend(&mut self, other: &StyleMap) {
        for (property, value) in other.iter() {
            self.set(property, value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }

    /// Serialize as a flat `property: value;` string.
    pub fn to_style_less(&self) -> String {
        self.entries
            .iter()
            .map(|(p, v)| format!("{p}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Serialize for StyleMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_style_less())
    }
}

impl<P: Into<String>, V: Into<String>> FromIterator<(P, V)> for StyleMap {
    fn from_iter<I: IntoIterator<Item = (P, V)>>(iter: I) -> Self {
        let mut map = StyleMap::new();
        for (p, v) in iter {
            map.set(p, v);
        }
        map
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// Everything known about one target class.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassEntry {
    pub name: String,
    #[serde(rename = "styleLess")]
    pub base: StyleMap,
    pub pseudo: BTreeMap<PseudoState, StyleMap>,
    pub breakpoints: BTreeMap<Breakpoint, StyleMap>,
    pub is_combo: bool,
    pub parents: Vec<String>,
    pub children: Vec<String>,
    pub is_layout_container: bool,
}

impl ClassEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether the entry carries any declarations at all.
    pub fn has_content(&self) -> bool {
        !self.base.is_empty()
            || self.pseudo.values().any(|m| !m.is_empty())
            || self.breakpoints.values().any(|m| !m.is_empty())
    }

    pub fn pseudo_mut(&mut self, state: PseudoState) -> &mut StyleMap {
        self.pseudo.entry(state).or_default()
    }

    pub fn breakpoint_mut(&mut self, breakpoint: Breakpoint) -> &mut StyleMap {
        self.breakpoints.entry(breakpoint).or_default()
    }

    pub fn breakpoint(&self, breakpoint: Breakpoint) -> Option<&StyleMap> {
        self.breakpoints.get(&breakpoint).filter(|m| !m.is_empty())
    }

    fn add_unique(list: &mut Vec<String>, name: &str) {
        if !list.iter().any(|n| n == name) {
            list.push(name.to_string());
        }
    }

    pub fn add_parent(&mut self, name: &str) {
        Self::add_unique(&mut self.parents, name);
    }

    pub fn add_child(&mut self, name: &str) {
        Self::add_unique(&mut self.children, name);
    }
}

/// Insertion-ordered map of class name to entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassMap {
    entries: IndexMap<String, ClassEntry>,
}

impl ClassMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the entry for `name`, creating it on first use.
    pub fn entry(&mut self, name: &str) -> &mut ClassEntry {
        self.entries
            .entry(name.to_string())
            .or_insert_with(|| ClassEntry::new(name))
    }

    pub fn get(&self, name: &str) -> Option<&ClassEntry> {
        self.entries.get(name)
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

    pub fn iter(&self) -> impl Iterator<Item = &ClassEntry> {
        self.entries.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ClassEntry> {
        self.entries.values_mut()
    }
}

impl Serialize for ClassMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, entry) in &self.entries {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

/// The result of compiling one CSS document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassIndex {
    pub classes: ClassMap,
    pub media_breakpoints: BTreeMap<Breakpoint, &'static str>,
    pub warnings: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_standard_media_css: Option<String>,
}

impl ClassIndex {
    pub fn get(&self, name: &str) -> Option<&ClassEntry> {
        self.classes.get(name)
    }

    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}

/// Knobs for a single compile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Pixel size of `1rem`/`1em` when reading media query thresholds.
    pub root_font_size: f64,
    /// Maximum nesting of `var()` references before giving up.
    pub max_variable_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            root_font_size: 16.0,
            max_variable_depth: 10,
        }
    }
}
