//! Property normalization.
//!
//! Declarations are rewritten into the longhand vocabulary the target
//! understands: functional values it cannot evaluate are collapsed,
//! shorthands are expanded, and anything outside the supported set is
//! dropped with a diagnostic. Layout containers get the browser's implicit
//! flex/grid defaults written out explicitly.

use crate::model::StyleMap;
use flowcss_lexer::{Diagnostic, Diagnostics};

/// Longhand properties the target accepts.
pub const SUPPORTED_PROPERTIES: &[&str] = &[
    // Layout
    "display", "position", "top", "right", "bottom", "left", "z-index", "float", "clear",
    "overflow", "overflow-x", "overflow-y", "box-sizing", "vertical-align", "direction",
    // Sizing
    "width", "height", "min-width", "min-height", "max-width", "max-height", "aspect-ratio",
    // Spacing
    "margin-top", "margin-right", "margin-bottom", "margin-left",
    "padding-top", "padding-right", "padding-bottom", "padding-left",
    // Flex
    "flex-direction", "flex-wrap", "flex-grow", "flex-shrink", "flex-basis",
    "justify-content", "align-items", "align-self", "align-content", "order",
    // Grid
    "justify-items", "justify-self", "row-gap", "column-gap",
    "grid-template-columns", "grid-template-rows", "grid-template-areas",
    "grid-auto-flow", "grid-auto-columns", "grid-auto-rows",
    "grid-column-start", "grid-column-end", "grid-row-start", "grid-row-end", "grid-area",
    // Typography
    "font-family", "font-size", "font-weight", "font-style", "line-height",
    "letter-spacing", "word-spacing", "text-align", "text-decoration", "text-transform",
    "text-indent", "text-shadow", "text-overflow", "white-space", "word-break", "overflow-wrap",
    "color", "list-style-type", "list-style-position",
    // Backgrounds
    "background-color", "background-image", "background-size", "background-position",
    "background-repeat", "background-clip", "background-attachment",
    // Borders
    "border-top-width", "border-right-width", "border-bottom-width", "border-left-width",
    "border-top-style", "border-right-style", "border-bottom-style", "border-left-style",
    "border-top-color", "border-right-color", "border-bottom-color", "border-left-color",
    "border-top-left-radius", "border-top-right-radius",
    "border-bottom-right-radius", "border-bottom-left-radius",
    // Effects
    "opacity", "visibility", "box-shadow", "filter", "backdrop-filter", "mix-blend-mode",
    "transform", "transform-origin", "cursor", "pointer-events", "user-select",
    "object-fit", "object-position", "outline-width", "outline-style", "outline-color",
    "outline-offset",
];

/// Properties removed without a diagnostic; they mean nothing in a static graph.
const STRIPPED_PROPERTIES: &[&str] = &[
    "transition",
    "animation",
    "will-change",
    "-webkit-font-smoothing",
    "-moz-osx-font-smoothing",
    "font-smoothing",
];

const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

const BORDER_WIDTH_KEYWORDS: &[&str] = &["thin", "medium", "thick"];

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

const CORNERS: [&str; 4] = ["top-left", "top-right", "bottom-right", "bottom-left"];

const BACKGROUND_KEYWORDS: &[&str] = &[
    "no-repeat", "repeat", "repeat-x", "repeat-y", "space", "round", "center", "top", "bottom",
    "left", "right", "cover", "contain", "fixed", "scroll", "local", "none", "auto",
    "padding-box", "border-box", "content-box", "text", "/",
];

pub fn is_supported(property: &str) -> bool {
    SUPPORTED_PROPERTIES.contains(&property)
}

pub fn is_stripped(property: &str) -> bool {
    STRIPPED_PROPERTIES.iter().any(|p| {
        property == *p
            || property
                .strip_prefix(p)
                .is_some_and(|rest| rest.starts_with('-'))
    }) || property
        .strip_prefix("-webkit-")
        .or_else(|| property.strip_prefix("-moz-"))
        .is_some_and(|rest| rest.starts_with("transition") || rest.starts_with("animation"))
}

/// Normalize one declaration into zero or more supported longhands.
pub fn normalize_declaration(
    property: &str,
    value: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<(String, String)> {
    if is_stripped(property) {
        tracing::debug!(property, "stripped animation property");
        return Vec::new();
    }

    let value = rewrite_functions(value.trim());
    let expanded = match expand_shorthand(property, &value) {
        Ok(pairs) => pairs,
        Err(reason) => {
            diagnostics.push(Diagnostic::warning(
                "INVALID_SHORTHAND",
                format!("'{property}: {value}' could not be expanded: {reason}"),
            ));
            return Vec::new();
        }
    };

    expanded
        .into_iter()
        .filter(|(p, _)| {
            let ok = is_supported(p);
            if !ok {
                diagnostics.push(Diagnostic::warning(
                    "UNSUPPORTED_PROPERTY",
                    format!("Property '{p}' is not supported by the target and was dropped"),
                ));
            }
            ok
        })
        .collect()
}

fn expand_shorthand(property: &str, value: &str) -> Result<Vec<(String, String)>, String> {
    let pairs = match property {
        "padding" | "margin" => expand_box(property, value)?,
        "inset" => {
            let tokens = box_values(value)?;
            SIDES
                .iter()
                .zip(tokens)
                .map(|(side, v)| (side.to_string(), v))
                .collect()
        }
        "gap" | "grid-gap" => {
            let tokens = split_tokens(value);
            match tokens.as_slice() {
                [both] => vec![pair("row-gap", both), pair("column-gap", both)],
                [row, column] => vec![pair("row-gap", row), pair("column-gap", column)],
                _ => return Err("expected one or two lengths".into()),
            }
        }
        "grid-row-gap" => vec![pair("row-gap", value)],
        "grid-column-gap" => vec![pair("column-gap", value)],
        "border-radius" => expand_radius(value)?,
        "flex" => expand_flex(value)?,
        "flex-flow" => expand_flex_flow(value),
        "border" => expand_border(&SIDES, value),
        "border-top" | "border-right" | "border-bottom" | "border-left" => {
            let side = &property["border-".len()..];
            expand_border(&[side], value)
        }
        "border-width" | "border-style" | "border-color" => {
            let suffix = &property["border".len()..];
            box_values(value)?
                .into_iter()
                .zip(SIDES)
                .map(|(v, side)| (format!("border-{side}{suffix}"), v))
                .collect()
        }
        "grid-column" | "grid-row" => expand_grid_line(property, value),
        "place-items" => {
            let tokens = split_tokens(value);
            match tokens.as_slice() {
                [both] => vec![pair("align-items", both), pair("justify-items", both)],
                [align, justify] => vec![pair("align-items", align), pair("justify-items", justify)],
                _ => return Err("expected one or two keywords".into()),
            }
        }
        "background" => expand_background(value),
        "outline" => {
            let mut pairs = Vec::new();
            for (kind, v) in classify_border_tokens(value) {
                pairs.push((format!("outline-{kind}"), v));
            }
            pairs
        }
        "list-style" => vec![pair("list-style-type", value)],
        _ => vec![pair(property, value)],
    };
    Ok(pairs)
}

fn pair(property: &str, value: &str) -> (String, String) {
    (property.to_string(), value.to_string())
}

// =========================================================================
// Box shorthands
// =========================================================================

/// Apply the CSS 1/2/3/4-value rule: top, right, bottom, left.
fn box_values(value: &str) -> Result<Vec<String>, String> {
    let tokens = split_tokens(value);
    let [top, right, bottom, left] = match tokens.as_slice() {
        [a] => [a, a, a, a],
        [a, b] => [a, b, a, b],
        [a, b, c] => [a, b, c, b],
        [a, b, c, d] => [a, b, c, d],
        _ => return Err(format!("expected 1 to 4 values, got {}", tokens.len())),
    };
    Ok(vec![top.clone(), right.clone(), bottom.clone(), left.clone()])
}

fn expand_box(property: &str, value: &str) -> Result<Vec<(String, String)>, String> {
    Ok(box_values(value)?
        .into_iter()
        .zip(SIDES)
        .map(|(v, side)| (format!("{property}-{side}"), v))
        .collect())
}

fn expand_radius(value: &str) -> Result<Vec<(String, String)>, String> {
    // Elliptical radii: keep the horizontal part
    let horizontal = value.split('/').next().unwrap_or(value);
    let tokens = split_tokens(horizontal);
    let [tl, tr, br, bl] = match tokens.as_slice() {
        [a] => [a, a, a, a],
        [a, b] => [a, b, a, b],
        [a, b, c] => [a, b, c, b],
        [a, b, c, d] => [a, b, c, d],
        _ => return Err(format!("expected 1 to 4 radii, got {}", tokens.len())),
    };
    Ok([tl, tr, br, bl]
        .into_iter()
        .zip(CORNERS)
        .map(|(v, corner)| (format!("border-{corner}-radius"), v.clone()))
        .collect())
}

// =========================================================================
// Flex
// =========================================================================

fn expand_flex(value: &str) -> Result<Vec<(String, String)>, String> {
    let (grow, shrink, basis) = match value.to_ascii_lowercase().as_str() {
        "none" => ("0".to_string(), "0".to_string(), "auto".to_string()),
        "auto" => ("1".to_string(), "1".to_string(), "auto".to_string()),
        "initial" => ("0".to_string(), "1".to_string(), "auto".to_string()),
        _ => {
            let tokens = split_tokens(value);
            match tokens.as_slice() {
                [one] if is_number(one) => (one.clone(), "1".to_string(), "0%".to_string()),
                [one] => ("1".to_string(), "1".to_string(), one.clone()),
                [g, s] if is_number(s) => (g.clone(), s.clone(), "0%".to_string()),
                [g, b] => (g.clone(), "1".to_string(), b.clone()),
                [g, s, b] => (g.clone(), s.clone(), b.clone()),
                _ => return Err("expected 1 to 3 values".into()),
            }
        }
    };
    Ok(vec![
        ("flex-grow".to_string(), grow),
        ("flex-shrink".to_string(), shrink),
        ("flex-basis".to_string(), basis),
    ])
}

fn expand_flex_flow(value: &str) -> Vec<(String, String)> {
    split_tokens(value)
        .into_iter()
        .map(|token| {
            let property = if token.contains("wrap") {
                "flex-wrap"
            } else {
                "flex-direction"
            };
            (property.to_string(), token)
        })
        .collect()
}

// =========================================================================
// Borders
// =========================================================================

/// Sort border tokens into width, style and color.
fn classify_border_tokens(value: &str) -> Vec<(&'static str, String)> {
    let mut width = None;
    let mut style = None;
    let mut color: Vec<String> = Vec::new();

    for token in split_tokens(value) {
        if width.is_none() && is_border_width(&token) {
            width = Some(token);
        } else if style.is_none() && BORDER_STYLES.contains(&token.to_ascii_lowercase().as_str()) {
            style = Some(token.to_ascii_lowercase());
        } else {
            color.push(token);
        }
    }

    let mut out = Vec::new();
    if let Some(w) = width {
        out.push(("width", w));
    }
    if let Some(s) = style {
        out.push(("style", s));
    }
    if !color.is_empty() {
        out.push(("color", color.join(" ")));
    }
    out
}

fn expand_border(sides: &[&str], value: &str) -> Vec<(String, String)> {
    let parts = if value.trim() == "0" {
        vec![("width", "0".to_string()), ("style", "none".to_string())]
    } else {
        classify_border_tokens(value)
    };
    let mut out = Vec::new();
    for side in sides {
        for (kind, v) in &parts {
            out.push((format!("border-{side}-{kind}"), v.clone()));
        }
    }
    out
}

fn is_border_width(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    if BORDER_WIDTH_KEYWORDS.contains(&lower.as_str()) || lower == "0" {
        return true;
    }
    if lower.starts_with("calc(") {
        return true;
    }
    let number_end = lower
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(lower.len());
    number_end > 0
        && lower[..number_end].parse::<f64>().is_ok()
        && lower[number_end..].chars().all(|c| c.is_ascii_alphabetic())
        && number_end < lower.len()
}

// =========================================================================
// Grid lines
// =========================================================================

fn expand_grid_line(property: &str, value: &str) -> Vec<(String, String)> {
    let (start, end) = match value.split_once('/') {
        Some((start, end)) => (start.trim().to_string(), end.trim().to_string()),
        None => (value.trim().to_string(), "auto".to_string()),
    };
    vec![
        (format!("{property}-start"), start),
        (format!("{property}-end"), end),
    ]
}

// =========================================================================
// Background
// =========================================================================

fn expand_background(value: &str) -> Vec<(String, String)> {
    let mut images = Vec::new();
    let mut color = None;

    for layer in flowcss_lexer::split_selector_list(value) {
        for token in split_tokens(&layer) {
            let lower = token.to_ascii_lowercase();
            if lower.starts_with("url(") || lower.contains("gradient(") {
                images.push(token);
            } else if is_color_token(&lower) {
                color = Some(token);
            }
        }
    }

    let mut out = Vec::new();
    if let Some(c) = color {
        out.push(("background-color".to_string(), c));
    }
    if !images.is_empty() {
        out.push(("background-image".to_string(), images.join(", ")));
    }
    if out.is_empty() && value.eq_ignore_ascii_case("none") {
        out.push(("background-image".to_string(), "none".to_string()));
    }
    out
}

fn is_color_token(lower: &str) -> bool {
    if lower.starts_with('#')
        || lower.starts_with("rgb")
        || lower.starts_with("hsl")
        || lower.starts_with("oklch(")
        || lower.starts_with("color(")
    {
        return true;
    }
    !BACKGROUND_KEYWORDS.contains(&lower)
        && lower.chars().all(|c| c.is_ascii_alphabetic())
        && !lower.is_empty()
}

// =========================================================================
// Functional values
// =========================================================================

/// Collapse functions the target cannot evaluate: `clamp(a, b, c)` becomes
/// `c`; `min(a, ...)` and `max(a, ...)` become `a`.
pub fn rewrite_functions(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());
    let mut i = 0;

    while i < chars.len() {
        let at_boundary = i == 0 || !is_ident_char(chars[i - 1]);
        let matched = if at_boundary {
            ["clamp(", "min(", "max("]
                .into_iter()
                .find(|f| starts_with_ignore_case(&chars[i..], f))
        } else {
            None
        };

        let Some(function) = matched else {
            out.push(chars[i]);
            i += 1;
            continue;
        };

        let open = i + function.len() - 1;
        let Some(close) = closing_paren(&chars, open) else {
            out.extend(&chars[i..]);
            break;
        };
        let inner: String = chars[open + 1..close].iter().collect();
        let args = flowcss_lexer::split_selector_list(&inner);
        let chosen = if function == "clamp(" {
            args.last()
        } else {
            args.first()
        };
        if let Some(arg) = chosen {
            out.push_str(&rewrite_functions(arg));
        }
        i = close + 1;
    }

    out
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn starts_with_ignore_case(chars: &[char], needle: &str) -> bool {
    let needle: Vec<char> = needle.chars().collect();
    chars.len() >= needle.len()
        && chars
            .iter()
            .zip(&needle)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
}

fn closing_paren(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, c) in chars[open..].iter().enumerate() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

// =========================================================================
// Layout defaults
// =========================================================================

/// The kind of layout container a bucket declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Flex,
    Grid,
}

pub fn layout_kind(styles: &StyleMap) -> Option<LayoutKind> {
    match styles.get("display")?.trim() {
        "flex" | "inline-flex" => Some(LayoutKind::Flex),
        "grid" | "inline-grid" => Some(LayoutKind::Grid),
        _ => None,
    }
}

/// Write out the browser's implicit container defaults. Properties already
/// present in `styles` or in `inherited` are left alone.
pub fn inject_layout_defaults(
    styles: &mut StyleMap,
    inherited: Option<&StyleMap>,
) -> Option<LayoutKind> {
    let kind = layout_kind(styles)?;
    let defaults: &[(&str, &str)] = match kind {
        LayoutKind::Flex => &[
            ("flex-direction", "row"),
            ("justify-content", "flex-start"),
            ("align-items", "stretch"),
        ],
        LayoutKind::Grid => &[("justify-items", "stretch"), ("align-items", "stretch")],
    };

    fn declared(styles: &StyleMap, inherited: Option<&StyleMap>, property: &str) -> bool {
        styles.contains(property) || inherited.is_some_and(|m| m.contains(property))
    }

    for &(property, value) in defaults {
        if !declared(styles, inherited, property) {
            styles.set(property, value);
        }
    }

    if kind == LayoutKind::Grid
        && declared(styles, inherited, "grid-template-columns")
        && !declared(styles, inherited, "grid-template-rows")
    {
        for (property, value) in [
            ("grid-template-rows", "auto"),
            ("grid-auto-rows", "auto"),
            ("grid-auto-flow", "row"),
        ] {
            if !declared(styles, inherited, property) {
                styles.set(property, value);
            }
        }
    }

    Some(kind)
}

// =========================================================================
// Tokens
// =========================================================================

/// Split a value on whitespace outside parentheses and quotes.
pub fn split_tokens(value: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in value.chars() {
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn is_number(token: &str) -> bool {
    token.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn normalize(property: &str, value: &str) -> Vec<(String, String)> {
        let mut diagnostics = Diagnostics::new();
        normalize_declaration(property, value, &mut diagnostics)
    }

    fn as_map(pairs: Vec<(String, String)>) -> StyleMap {
        pairs.into_iter().collect()
    }

    // =========================================================================
    // Box shorthands
    // =========================================================================

    #[test]
    fn test_padding_single_value() {
        let map = as_map(normalize("padding", "10px"));
        assert_eq!(
            map.to_style_less(),
            "padding-top: 10px; padding-right: 10px; padding-bottom: 10px; padding-left: 10px;"
        );
    }

    #[test]
    fn test_padding_four_values_positional() {
        let map = as_map(normalize("padding", "1px 2px 3px 4px"));
        assert_eq!(map.get("padding-top"), Some("1px"));
        assert_eq!(map.get("padding-right"), Some("2px"));
        assert_eq!(map.get("padding-bottom"), Some("3px"));
        assert_eq!(map.get("padding-left"), Some("4px"));
    }

    #[test]
    fn test_margin_two_and_three_values() {
        let two = as_map(normalize("margin", "0 auto"));
        assert_eq!(two.get("margin-left"), Some("auto"));
        assert_eq!(two.get("margin-bottom"), Some("0"));
        let three = as_map(normalize("margin", "1px 2px 3px"));
        assert_eq!(three.get("margin-left"), Some("2px"));
        assert_eq!(three.get("margin-bottom"), Some("3px"));
    }

    #[test]
    fn test_too_many_box_values() {
        let mut diagnostics = Diagnostics::new();
        assert!(normalize_declaration("margin", "1px 2px 3px 4px 5px", &mut diagnostics).is_empty());
        assert_eq!(diagnostics.count("INVALID_SHORTHAND"), 1);
    }

    #[test]
    fn test_gap_splits() {
        let map = as_map(normalize("gap", "10px 20px"));
        assert_eq!(map.to_style_less(), "row-gap: 10px; column-gap: 20px;");
    }

    #[test]
    fn test_border_radius_corners() {
        let map = as_map(normalize("border-radius", "4px 8px"));
        assert_eq!(map.get("border-top-left-radius"), Some("4px"));
        assert_eq!(map.get("border-top-right-radius"), Some("8px"));
        assert_eq!(map.get("border-bottom-right-radius"), Some("4px"));
        assert_eq!(map.get("border-bottom-left-radius"), Some("8px"));
    }

    // =========================================================================
    // Flex and border
    // =========================================================================

    #[test]
    fn test_flex_single_number() {
        let map = as_map(normalize("flex", "1"));
        assert_eq!(map.to_style_less(), "flex-grow: 1; flex-shrink: 1; flex-basis: 0%;");
    }

    #[test]
    fn test_flex_keywords_and_basis() {
        assert_eq!(as_map(normalize("flex", "none")).get("flex-shrink"), Some("0"));
        let map = as_map(normalize("flex", "2 200px"));
        assert_eq!(map.get("flex-grow"), Some("2"));
        assert_eq!(map.get("flex-basis"), Some("200px"));
        let map = as_map(normalize("flex", "0 0 auto"));
        assert_eq!(map.get("flex-basis"), Some("auto"));
    }

    #[test]
    fn test_border_disambiguation() {
        let map = as_map(normalize("border", "1px solid rgba(0, 0, 0, 0.1)"));
        assert_eq!(map.get("border-top-width"), Some("1px"));
        assert_eq!(map.get("border-left-style"), Some("solid"));
        assert_eq!(map.get("border-bottom-color"), Some("rgba(0, 0, 0, 0.1)"));
        assert_eq!(map.len(), 12);
    }

    #[test]
    fn test_border_order_independent() {
        let map = as_map(normalize("border-top", "dashed #ccc thick"));
        assert_eq!(map.get("border-top-width"), Some("thick"));
        assert_eq!(map.get("border-top-style"), Some("dashed"));
        assert_eq!(map.get("border-top-color"), Some("#ccc"));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_border_none() {
        let map = as_map(normalize("border", "none"));
        assert_eq!(map.get("border-right-style"), Some("none"));
        assert_eq!(map.len(), 4);
    }

    // =========================================================================
    // Functional values
    // =========================================================================

    #[test]
    fn test_clamp_takes_max() {
        assert_eq!(rewrite_functions("clamp(1rem, 2.5vw, 2rem)"), "2rem");
    }

    #[test]
    fn test_min_max_take_first() {
        assert_eq!(rewrite_functions("min(100%, 1200px)"), "100%");
        assert_eq!(rewrite_functions("max(50vh, 400px)"), "50vh");
    }

    #[test]
    fn test_minmax_untouched() {
        assert_eq!(
            rewrite_functions("repeat(auto-fit, minmax(200px, 1fr))"),
            "repeat(auto-fit, minmax(200px, 1fr))"
        );
    }

    #[test]
    fn test_nested_and_embedded_functions() {
        assert_eq!(rewrite_functions("calc(100% - clamp(1px, 2px, min(3px, 4px)))"), "calc(100% - 3px)");
        let map = as_map(normalize("padding", "clamp(1rem, 3vw, 2rem) 0"));
        assert_eq!(map.get("padding-top"), Some("2rem"));
        assert_eq!(map.get("padding-left"), Some("0"));
    }

    // =========================================================================
    // Grid lines and misc shorthands
    // =========================================================================

    #[test]
    fn test_grid_column_slash() {
        let map = as_map(normalize("grid-column", "1 / 3"));
        assert_eq!(map.get("grid-column-start"), Some("1"));
        assert_eq!(map.get("grid-column-end"), Some("3"));
    }

    #[test]
    fn test_grid_row_span() {
        let map = as_map(normalize("grid-row", "span 2"));
        assert_eq!(map.get("grid-row-start"), Some("span 2"));
        assert_eq!(map.get("grid-row-end"), Some("auto"));
    }

    #[test]
    fn test_background_color_only() {
        assert_eq!(
            normalize("background", "#fff"),
            vec![("background-color".to_string(), "#fff".to_string())]
        );
    }

    #[test]
    fn test_background_gradient_and_color() {
        let map = as_map(normalize("background", "linear-gradient(red, blue) no-repeat center, white"));
        assert_eq!(map.get("background-image"), Some("linear-gradient(red, blue)"));
        assert_eq!(map.get("background-color"), Some("white"));
    }

    // =========================================================================
    // Allowlist and strip-list
    // =========================================================================

    #[test]
    fn test_transition_and_smoothing_stripped_silently() {
        let mut diagnostics = Diagnostics::new();
        assert!(normalize_declaration("transition", "all .2s", &mut diagnostics).is_empty());
        assert!(normalize_declaration("animation-delay", "1s", &mut diagnostics).is_empty());
        assert!(normalize_declaration("-webkit-transition", "all .2s", &mut diagnostics).is_empty());
        assert!(normalize_declaration("-webkit-font-smoothing", "antialiased", &mut diagnostics).is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unsupported_property_warned() {
        let mut diagnostics = Diagnostics::new();
        assert!(normalize_declaration("zoom", "1.1", &mut diagnostics).is_empty());
        assert_eq!(diagnostics.count("UNSUPPORTED_PROPERTY"), 1);
    }

    #[test]
    fn test_supported_property_passes() {
        assert_eq!(
            normalize("color", "red"),
            vec![("color".to_string(), "red".to_string())]
        );
    }

    // =========================================================================
    // Layout defaults
    // =========================================================================

    #[test]
    fn test_flex_defaults_injected() {
        let mut map: StyleMap = [("display", "flex"), ("align-items", "center")].into_iter().collect();
        assert_eq!(inject_layout_defaults(&mut map, None), Some(LayoutKind::Flex));
        assert_eq!(
            map.to_style_less(),
            "display: flex; align-items: center; flex-direction: row; justify-content: flex-start;"
        );
    }

    #[test]
    fn test_grid_defaults_with_columns_only() {
        let mut map: StyleMap = [("display", "grid"), ("grid-template-columns", "1fr 1fr")]
            .into_iter()
            .collect();
        inject_layout_defaults(&mut map, None);
        assert_eq!(map.get("justify-items"), Some("stretch"));
        assert_eq!(map.get("grid-template-rows"), Some("auto"));
        assert_eq!(map.get("grid-auto-rows"), Some("auto"));
        assert_eq!(map.get("grid-auto-flow"), Some("row"));
    }

    #[test]
    fn test_grid_with_rows_gets_no_row_defaults() {
        let mut map: StyleMap = [
            ("display", "grid"),
            ("grid-template-columns", "1fr"),
            ("grid-template-rows", "auto auto"),
        ]
        .into_iter()
        .collect();
        inject_layout_defaults(&mut map, None);
        assert!(!map.contains("grid-auto-flow"));
    }

    #[test]
    fn test_inherited_properties_not_overridden() {
        let base: StyleMap = [("flex-direction", "column")].into_iter().collect();
        let mut tier: StyleMap = [("display", "flex")].into_iter().collect();
        inject_layout_defaults(&mut tier, Some(&base));
        assert!(!tier.contains("flex-direction"));
        assert!(tier.contains("justify-content"));
    }

    #[test]
    fn test_non_container_untouched() {
        let mut map: StyleMap = [("display", "block")].into_iter().collect();
        assert_eq!(inject_layout_defaults(&mut map, None), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_split_tokens_respects_parens() {
        assert_eq!(
            split_tokens("1px  solid rgb(1, 2, 3)"),
            vec!["1px", "solid", "rgb(1, 2, 3)"]
        );
    }
}
