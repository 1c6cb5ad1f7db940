//! Class index → style nodes.

use crate::config::ConvertConfig;
use crate::grid::normalize_grid;
use crate::ids::IdTable;
use crate::payload::{Variant, WebflowStyle};
use flowcss_parser::{
    layout_kind, Breakpoint, ClassEntry, ClassIndex, Diagnostics, LayoutKind, StyleMap,
};
use std::collections::{BTreeMap, HashSet};

/// External variant key for a breakpoint tier.
pub fn variant_key(breakpoint: Breakpoint) -> &'static str {
    match breakpoint {
        Breakpoint::Desktop => "main",
        Breakpoint::Medium => "medium",
        Breakpoint::Small => "small",
        Breakpoint::Tiny => "tiny",
        Breakpoint::XLarge => "xl",
        Breakpoint::XxLarge | Breakpoint::XxxLarge => "xxl",
    }
}

/// Build one style node per class that carries any declarations.
pub fn emit_styles(
    index: &ClassIndex,
    ids: &mut IdTable,
    config: &ConvertConfig,
    diagnostics: &mut Diagnostics,
) -> Vec<WebflowStyle> {
    let mut styles: Vec<WebflowStyle> = index
        .classes
        .iter()
        .filter_map(|entry| emit_style(entry, ids, config, diagnostics))
        .collect();

    // Child links may only name styles that were actually emitted
    let emitted: HashSet<String> = styles.iter().map(|s| s.name.clone()).collect();
    for style in &mut styles {
        style.children.retain(|child| emitted.contains(child));
    }
    tracing::debug!(
        classes = index.classes.len(),
        styles = styles.len(),
        "emitted styles"
    );
    styles
}

/// Build the style node for `entry`, or `None` when it has no content.
/// Children are copied as recorded; [`emit_styles`] prunes the ones that
/// produce no style.
pub fn emit_style(
    entry: &ClassEntry,
    ids: &mut IdTable,
    config: &ConvertConfig,
    diagnostics: &mut Diagnostics,
) -> Option<WebflowStyle> {
    if !entry.has_content() {
        return None;
    }

    let mut base = entry.base.clone();
    let base_is_grid = layout_kind(&base) == Some(LayoutKind::Grid);
    normalize_grid(&mut base, base_is_grid, config);
    if config.force_visible {
        force_visible(&entry.name, &mut base, diagnostics);
    }

    let mut buckets: BTreeMap<String, StyleMap> = BTreeMap::new();
    for (state, styles) in &entry.pseudo {
        if !styles.is_empty() {
            buckets.insert(state.name().to_string(), styles.clone());
        }
    }
    // BTreeMap order puts XxLarge before XxxLarge, so the larger tier wins
    for (breakpoint, styles) in &entry.breakpoints {
        if !styles.is_empty() {
            buckets
                .entry(variant_key(*breakpoint).to_string())
                .or_default()
                .extend(styles);
        }
    }

    let mut variants = BTreeMap::new();
    for (key, mut styles) in buckets {
        let is_grid = match layout_kind(&styles) {
            Some(kind) => kind == LayoutKind::Grid,
            None => !styles.contains("display") && base_is_grid,
        };
        normalize_grid(&mut styles, is_grid, config);
        variants.insert(
            key,
            Variant {
                style_less: styles.to_style_less(),
            },
        );
    }

    let mut style = WebflowStyle::new(ids.style_id(&entry.name), entry.name.clone());
    style.comb = if entry.is_combo { "&" } else { "" }.to_string();
    style.style_less = base.to_style_less();
    style.variants = variants;
    style.children = entry.children.clone();
    Some(style)
}

/// Rewrite fully hidden values so pasted elements are visible.
fn force_visible(class: &str, styles: &mut StyleMap, diagnostics: &mut Diagnostics) {
    let transparent = styles
        .get("opacity")
        .and_then(|v| v.trim().parse::<f64>().ok())
        .is_some_and(|v| v == 0.0);
    if transparent {
        styles.set("opacity", "1");
        diagnostics.warn(
            "FORCED_VISIBLE",
            format!("'.{class}' had opacity: 0; emitted as opacity: 1"),
        );
    }
    if styles
        .get("visibility")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("hidden"))
    {
        styles.set("visibility", "visible");
        diagnostics.warn(
            "FORCED_VISIBLE",
            format!("'.{class}' had visibility: hidden; emitted as visibility: visible"),
        );
    }
}
