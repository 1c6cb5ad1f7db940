//! Grid track normalization.
//!
//! The target cannot evaluate `repeat()`, `minmax()` or intrinsic track
//! counts, so template values are expanded into explicit track lists.

use crate::config::ConvertConfig;
use flowcss_parser::StyleMap;

/// Container width assumed when resolving `auto-fit`/`auto-fill`.
pub const AUTO_FIT_CONTAINER_PX: f64 = 1200.0;

/// Track count used when the minimum track size is not a fixed length.
pub const AUTO_FIT_FALLBACK: usize = 3;

const TEMPLATE_PROPERTIES: [&str; 4] = [
    "grid-template-columns",
    "grid-template-rows",
    "grid-auto-columns",
    "grid-auto-rows",
];

/// Expand track functions in template properties and, for grid containers,
/// move `row-gap`/`column-gap` to the target's grid gap keys.
pub fn normalize_grid(styles: &mut StyleMap, is_grid: bool, config: &ConvertConfig) {
    for property in TEMPLATE_PROPERTIES {
        let Some(value) = styles.get(property) else {
            continue;
        };
        let expanded = expand_tracks(value, config);
        if expanded != value {
            tracing::debug!(property, from = value, to = %expanded, "expanded grid tracks");
            styles.set(property, expanded);
        }
    }

    if is_grid {
        styles.rename("row-gap", "grid-row-gap");
        styles.rename("column-gap", "grid-column-gap");
    }
}

/// Rewrite `repeat()` into repeated tracks and `minmax(a, b)` into `b`.
pub fn expand_tracks(value: &str, config: &ConvertConfig) -> String {
    let mut out = value.to_string();
    while let Some(call) = find_call(&out, "repeat") {
        let args = split_args(&call.args);
        let replacement = match args.as_slice() {
            [count, tracks] => {
                let tracks = collapse_minmax(tracks);
                let n = repeat_count(count, &call.args, config);
                vec![tracks.as_str(); n].join(" ")
            }
            // Malformed; keep the inner text so the loop terminates
            _ => call.args.clone(),
        };
        out.replace_range(call.start..call.end, &replacement);
    }
    collapse_minmax(&out)
}

fn repeat_count(count: &str, raw_args: &str, config: &ConvertConfig) -> usize {
    let max = config.max_grid_columns.max(1);
    let count = count.trim();
    if count.eq_ignore_ascii_case("auto-fit") || count.eq_ignore_ascii_case("auto-fill") {
        let minimum = find_call(raw_args, "minmax")
            .and_then(|c| split_args(&c.args).into_iter().next())
            .unwrap_or_else(|| split_args(raw_args).get(1).cloned().unwrap_or_default());
        return match length_px(&minimum, config.root_font_size) {
            Some(px) if px > 0.0 => ((AUTO_FIT_CONTAINER_PX / px).floor() as usize).clamp(1, max),
            _ => AUTO_FIT_FALLBACK.min(max),
        };
    }
    match count.parse::<usize>() {
        Ok(n) => n.clamp(1, max),
        Err(_) => 1,
    }
}

fn length_px(value: &str, root_font_size: f64) -> Option<f64> {
    let value = value.trim().to_ascii_lowercase();
    if let Some(number) = value.strip_suffix("px") {
        return number.trim().parse().ok();
    }
    if let Some(number) = value.strip_suffix("rem") {
        return number.trim().parse::<f64>().ok().map(|n| n * root_font_size);
    }
    None
}

fn collapse_minmax(value: &str) -> String {
    let mut out = value.trim().to_string();
    while let Some(call) = find_call(&out, "minmax") {
        let args = split_args(&call.args);
        let replacement = args.last().cloned().unwrap_or_default();
        out.replace_range(call.start..call.end, &replacement);
    }
    out
}

struct Call {
    start: usize,
    end: usize,
    args: String,
}

/// Locate the first `name(...)` with balanced parentheses.
fn find_call(value: &str, name: &str) -> Option<Call> {
    let lower = value.to_ascii_lowercase();
    let needle = format!("{name}(");
    let mut from = 0;
    while let Some(offset) = lower[from..].find(&needle) {
        let start = from + offset;
        let boundary = lower[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '-'));
        if boundary {
            let open = start + needle.len();
            let mut depth = 1;
            for (i, c) in value[open..].char_indices() {
                match c {
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            return Some(Call {
                                start,
                                end: open + i + 1,
                                args: value[open..open + i].to_string(),
                            });
                        }
                    }
                    _ => {}
                }
            }
            return None;
        }
        from = start + needle.len();
    }
    None
}

fn split_args(args: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in args.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    parts.push(current.trim().to_string());
    parts
}
