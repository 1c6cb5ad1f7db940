//! Selector classification.
//!
//! Reduces a single CSS selector to the class the target can attach styles
//! to. The last class of the last compound wins; classes in earlier compounds
//! become parent hints, because the target has no combinator selectors.

use crate::model::PseudoState;

/// Bare elements that are recovered as reserved target classes.
pub const ELEMENT_CLASSES: &[(&str, &str)] = &[
    ("h1", "heading-1"),
    ("h2", "heading-2"),
    ("h3", "heading-3"),
    ("h4", "heading-4"),
    ("h5", "heading-5"),
    ("h6", "heading-6"),
    ("p", "paragraph"),
    ("a", "link"),
    ("blockquote", "block-quote"),
    ("section", "section"),
    ("header", "header"),
    ("footer", "footer"),
    ("nav", "nav"),
    ("main", "main"),
    ("article", "article"),
    ("aside", "aside"),
];

/// Selectors that only scope variables or page-wide defaults.
const GLOBAL_SELECTORS: &[&str] = &[":root", "html", "body", "*"];

/// The class a selector resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassTarget {
    pub name: String,
    pub pseudo: Option<PseudoState>,
    pub is_combo: bool,
    /// Classes from ancestor compounds, outermost first.
    pub parents: Vec<String>,
    /// Set when the target came from the element table.
    pub from_element: bool,
}

/// Why a selector cannot be attached to a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSkip {
    pub code: &'static str,
    pub message: String,
}

impl SelectorSkip {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is_global(&self) -> bool {
        self.code == "GLOBAL_SELECTOR"
    }
}

/// One compound selector, e.g. `a.btn.is-primary:hover`.
#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    element: Option<String>,
    classes: Vec<String>,
    has_id: bool,
    has_attribute: bool,
    pseudos: Vec<String>,
    pseudo_element: bool,
}

/// Classify a single selector (not a selector list).
pub fn classify_selector(selector: &str) -> Result<ClassTarget, SelectorSkip> {
    let selector = selector.trim();
    if GLOBAL_SELECTORS.contains(&selector) {
        return Err(SelectorSkip::new(
            "GLOBAL_SELECTOR",
            format!("'{selector}' has no class equivalent"),
        ));
    }

    let compounds = parse_compounds(selector);
    let Some((last, ancestors)) = compounds.split_last() else {
        return Err(SelectorSkip::new("EMPTY_SELECTOR", "empty selector"));
    };

    if last.pseudo_element {
        return Err(SelectorSkip::new(
            "UNSUPPORTED_PSEUDO",
            format!("pseudo-element in '{selector}' cannot be represented"),
        ));
    }

    if ancestors.iter().any(|c| !c.pseudos.is_empty() || c.pseudo_element) {
        return Err(SelectorSkip::new(
            "UNSUPPORTED_PSEUDO",
            format!("ancestor state in '{selector}' cannot be represented"),
        ));
    }

    let pseudo = match last.pseudos.as_slice() {
        [] => None,
        [single] => match PseudoState::from_pseudo_class(single) {
            Some(state) => Some(state),
            None => {
                return Err(SelectorSkip::new(
                    "UNSUPPORTED_PSEUDO",
                    format!("':{single}' in '{selector}' has no variant"),
                ))
            }
        },
        _ => {
            return Err(SelectorSkip::new(
                "UNSUPPORTED_PSEUDO",
                format!("chained pseudo-classes in '{selector}' cannot be represented"),
            ))
        }
    };

    if last.has_id || last.has_attribute {
        return Err(SelectorSkip::new(
            "UNSUPPORTED_SELECTOR",
            format!("id or attribute selector in '{selector}' cannot be represented"),
        ));
    }

    let mut parents = Vec::new();
    for class in ancestors.iter().flat_map(|c| c.classes.iter()) {
        if !parents.contains(class) {
            parents.push(class.clone());
        }
    }

    if let Some(name) = last.classes.last() {
        return Ok(ClassTarget {
            name: name.clone(),
            pseudo,
            is_combo: last.classes.len() > 1,
            parents,
            from_element: false,
        });
    }

    let element = last.element.as_deref().unwrap_or("");
    if !ancestors.is_empty() {
        return Err(SelectorSkip::new(
            "ELEMENT_IN_CHAIN",
            format!("'{selector}' targets an element inside a chain"),
        ));
    }
    if GLOBAL_SELECTORS.contains(&element) {
        return Err(SelectorSkip::new(
            "GLOBAL_SELECTOR",
            format!("'{selector}' has no class equivalent"),
        ));
    }
    match element_class(element) {
        Some(name) => Ok(ClassTarget {
            name: name.to_string(),
            pseudo,
            is_combo: false,
            parents,
            from_element: true,
        }),
        None => Err(SelectorSkip::new(
            "UNSUPPORTED_SELECTOR",
            format!("'{selector}' has no class to attach styles to"),
        )),
    }
}

/// Reserved class for a bare element name.
pub fn element_class(element: &str) -> Option<&'static str> {
    let element = element.to_ascii_lowercase();
    ELEMENT_CLASSES
        .iter()
        .find(|(tag, _)| *tag == element)
        .map(|(_, class)| *class)
}

// =========================================================================
// Compound parsing
// =========================================================================

fn parse_compounds(selector: &str) -> Vec<Compound> {
    let chars: Vec<char> = selector.chars().collect();
    let mut compounds = Vec::new();
    let mut current = Compound::default();
    let mut touched = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '>' | '+' | '~' => {
                if touched {
                    compounds.push(std::mem::take(&mut current));
                    touched = false;
                }
                i += 1;
            }
            '.' => {
                let (name, next) = read_ident(&chars, i + 1);
                if !name.is_empty() {
                    current.classes.push(name);
                }
                touched = true;
                i = next;
            }
            '#' => {
                let (_, next) = read_ident(&chars, i + 1);
                current.has_id = true;
                touched = true;
                i = next;
            }
            '[' => {
                i = skip_balanced(&chars, i, '[', ']');
                current.has_attribute = true;
                touched = true;
            }
            ':' => {
                let pseudo_element = chars.get(i + 1) == Some(&':');
                let start = if pseudo_element { i + 2 } else { i + 1 };
                let (name, mut next) = read_ident(&chars, start);
                if chars.get(next) == Some(&'(') {
                    next = skip_balanced(&chars, next, '(', ')');
                }
                if pseudo_element || is_legacy_pseudo_element(&name) {
                    current.pseudo_element = true;
                } else {
                    current.pseudos.push(name);
                }
                touched = true;
                i = next;
            }
            '*' => {
                current.element = Some("*".to_string());
                touched = true;
                i += 1;
            }
            _ => {
                let (name, next) = read_ident(&chars, i);
                if name.is_empty() {
                    i += 1;
                } else {
                    current.element = Some(name.to_ascii_lowercase());
                    touched = true;
                    i = next;
                }
            }
        }
    }

    if touched {
        compounds.push(current);
    }
    compounds
}

/// Read an identifier starting at `start`, resolving backslash escapes.
fn read_ident(chars: &[char], start: usize) -> (String, usize) {
    let mut name = String::new();
    let mut i = start;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && i + 1 < chars.len() {
            name.push(chars[i + 1]);
            i += 2;
        } else if c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            name.push(c);
            i += 1;
        } else {
            break;
        }
    }
    (name, i)
}

/// Return the index just past the bracket that closes the one at `start`.
fn skip_balanced(chars: &[char], start: usize, open: char, close: char) -> usize {
    let mut depth = 0usize;
    let mut i = start;
    while i < chars.len() {
        if chars[i] == open {
            depth += 1;
        } else if chars[i] == close {
            depth -= 1;
            if depth == 0 {
                return i + 1;
            }
        }
        i += 1;
    }
    chars.len()
}

fn is_legacy_pseudo_element(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "before" | "after" | "first-line" | "first-letter"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn target(selector: &str) -> ClassTarget {
        classify_selector(selector).unwrap()
    }

    fn skip_code(selector: &str) -> &'static str {
        classify_selector(selector).unwrap_err().code
    }

    // =========================================================================
    // Classes
    // =========================================================================

    #[test]
    fn test_single_class() {
        let t = target(".card");
        assert_eq!(t.name, "card");
        assert_eq!(t.pseudo, None);
        assert!(!t.is_combo);
        assert!(t.parents.is_empty());
    }

    #[test]
    fn test_compound_last_class_is_combo_target() {
        let t = target(".btn.is-primary");
        assert_eq!(t.name, "is-primary");
        assert!(t.is_combo);
    }

    #[test]
    fn test_descendant_chain_records_parents() {
        let t = target(".nav .menu > .link");
        assert_eq!(t.name, "link");
        assert_eq!(t.parents, vec!["nav", "menu"]);
    }

    #[test]
    fn test_escaped_class_name() {
        assert_eq!(target(".md\\:flex").name, "md:flex");
    }

    #[test]
    fn test_element_with_class_uses_class() {
        assert_eq!(target("a.button").name, "button");
    }

    #[test]
    fn test_ancestor_id_ignored() {
        let t = target("#main .card");
        assert_eq!(t.name, "card");
        assert!(t.parents.is_empty());
    }

    // =========================================================================
    // Pseudo-classes
    // =========================================================================

    #[test]
    fn test_trailing_hover() {
        let t = target(".btn:hover");
        assert_eq!(t.name, "btn");
        assert_eq!(t.pseudo, Some(PseudoState::Hover));
    }

    #[test]
    fn test_focus_visible_maps_to_focus() {
        assert_eq!(target(".field:focus-visible").pseudo, Some(PseudoState::Focus));
    }

    #[test]
    fn test_unsupported_pseudo_class() {
        assert_eq!(skip_code(".item:first-child"), "UNSUPPORTED_PSEUDO");
        assert_eq!(skip_code(".item:not(.active)"), "UNSUPPORTED_PSEUDO");
    }

    #[test]
    fn test_pseudo_elements_rejected() {
        assert_eq!(skip_code(".icon::before"), "UNSUPPORTED_PSEUDO");
        assert_eq!(skip_code(".icon:after"), "UNSUPPORTED_PSEUDO");
    }

    #[test]
    fn test_ancestor_state_rejected() {
        assert_eq!(skip_code(".card:hover .title"), "UNSUPPORTED_PSEUDO");
    }

    // =========================================================================
    // Elements
    // =========================================================================

    #[test]
    fn test_bare_heading_maps_to_reserved_class() {
        let t = target("h2");
        assert_eq!(t.name, "heading-2");
        assert!(t.from_element);
    }

    #[test]
    fn test_bare_anchor_with_hover() {
        let t = target("a:hover");
        assert_eq!(t.name, "link");
        assert_eq!(t.pseudo, Some(PseudoState::Hover));
    }

    #[test]
    fn test_unknown_element() {
        assert_eq!(skip_code("span"), "UNSUPPORTED_SELECTOR");
    }

    #[test]
    fn test_element_inside_chain() {
        assert_eq!(skip_code(".card p"), "ELEMENT_IN_CHAIN");
    }

    #[test]
    fn test_global_selectors() {
        assert!(classify_selector(":root").unwrap_err().is_global());
        assert!(classify_selector("body").unwrap_err().is_global());
        assert!(classify_selector("*").unwrap_err().is_global());
    }

    #[test]
    fn test_attribute_selector_rejected() {
        assert_eq!(skip_code(".btn[disabled]"), "UNSUPPORTED_SELECTOR");
        assert_eq!(skip_code("#hero"), "UNSUPPORTED_SELECTOR");
    }
}
