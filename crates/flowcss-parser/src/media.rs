//! Media query routing.
//!
//! Max-width queries land on fixed cascade-down tiers. Min-width queries at
//! or above 1280px land on cascade-up tiers; smaller min-width queries are
//! mobile-first overrides and are handed back for cascade inversion.
//! Anything that is not a pure width query is non-standard.

use crate::model::Breakpoint;

/// Where the rules of one `@media` block go.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaRoute {
    /// No width condition; the rules apply at every size.
    Base,
    /// A fixed tier. `note` explains any rounding or flattening.
    Tier {
        breakpoint: Breakpoint,
        note: Option<String>,
    },
    /// A mobile-first override below the cascade-up range.
    Invert { min_width: f64 },
    /// Print, orientation, color-scheme, pointer and other features.
    NonStandard,
}

/// Smallest min-width handled natively as a cascade-up tier.
pub const CASCADE_UP_FROM: f64 = 1280.0;

#[derive(Debug, Default)]
struct WidthBounds {
    min: Option<f64>,
    max: Option<f64>,
}

/// Route a media query (the text after `@media`).
pub fn route_media(query: &str, root_font_size: f64) -> MediaRoute {
    let query = query.trim().to_ascii_lowercase();
    if query.contains(',') {
        return MediaRoute::NonStandard;
    }

    let mut bounds = WidthBounds::default();
    for part in query.split(" and ") {
        let part = part.trim();
        match part {
            "" | "all" | "screen" | "only screen" | "only all" => continue,
            _ => {}
        }
        let Some(feature) = part.strip_prefix('(').and_then(|p| p.strip_suffix(')')) else {
            return MediaRoute::NonStandard;
        };
        if !read_feature(feature.trim(), root_font_size, &mut bounds) {
            return MediaRoute::NonStandard;
        }
    }

    match (bounds.min, bounds.max) {
        (None, None) => MediaRoute::Base,
        (None, Some(max)) => tier_for_max(max),
        (Some(min), None) if min >= CASCADE_UP_FROM => tier_for_min(min),
        (Some(min), None) => MediaRoute::Invert { min_width: min },
        (Some(min), Some(max)) => route_range(min, max),
    }
}

/// Parse one parenthesised feature into `bounds`. Returns false for
/// features that are not width conditions.
fn read_feature(feature: &str, root_font_size: f64, bounds: &mut WidthBounds) -> bool {
    if let Some((name, value)) = feature.split_once(':') {
        let Some(px) = to_px(value.trim(), root_font_size) else {
            return false;
        };
        return match name.trim() {
            "max-width" => {
                bounds.max = Some(bounds.max.map_or(px, |m| m.min(px)));
                true
            }
            "min-width" => {
                bounds.min = Some(bounds.min.map_or(px, |m| m.max(px)));
                true
            }
            _ => false,
        };
    }

    // Range syntax: `width <= 767px`, `width > 991px`
    for (op, is_max, offset) in [("<=", true, 0.0), (">=", false, 0.0), ("<", true, -1.0), (">", false, 1.0)] {
        if let Some((name, value)) = feature.split_once(op) {
            if name.trim() != "width" {
                return false;
            }
            let Some(px) = to_px(value.trim(), root_font_size) else {
                return false;
            };
            let px = px + offset;
            if is_max {
                bounds.max = Some(bounds.max.map_or(px, |m| m.min(px)));
            } else {
                bounds.min = Some(bounds.min.map_or(px, |m| m.max(px)));
            }
            return true;
        }
    }
    false
}

/// Convert a length to pixels. `rem` and `em` use the root font size.
pub fn to_px(value: &str, root_font_size: f64) -> Option<f64> {
    let value = value.trim();
    let (number, factor) = if let Some(n) = value.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = value.strip_suffix("rem") {
        (n, root_font_size)
    } else if let Some(n) = value.strip_suffix("em") {
        (n, root_font_size)
    } else {
        (value, 1.0)
    };
    number.trim().parse::<f64>().ok().map(|n| n * factor)
}

fn tier_for_max(max: f64) -> MediaRoute {
    let tier = Breakpoint::CASCADE_DOWN
        .iter()
        .rev()
        .copied()
        .find(|bp| bp.max_width().is_some_and(|w| max <= f64::from(w)));

    let (breakpoint, note) = match tier {
        Some(bp) => {
            let boundary = f64::from(bp.max_width().unwrap_or_default());
            let note = (max != boundary).then(|| {
                format!(
                    "max-width: {}px rounded to {} ({}px)",
                    format_px(max),
                    bp.name(),
                    format_px(boundary)
                )
            });
            (bp, note)
        }
        None => (
            Breakpoint::Medium,
            Some(format!(
                "max-width: {}px is above the medium tier; applied from 991px down",
                format_px(max)
            )),
        ),
    };
    MediaRoute::Tier { breakpoint, note }
}

fn tier_for_min(min: f64) -> MediaRoute {
    let breakpoint = if min < 1440.0 {
        Breakpoint::XLarge
    } else if min <= 1920.0 {
        Breakpoint::XxLarge
    } else {
        Breakpoint::XxxLarge
    };
    let standard = [1280.0, 1440.0, 1920.0].contains(&min);
    let note = (!standard).then(|| {
        format!(
            "min-width: {}px rounded to {}",
            format_px(min),
            breakpoint.name()
        )
    });
    MediaRoute::Tier { breakpoint, note }
}

/// `(min-width: A) and (max-width: B)`.
fn route_range(min: f64, max: f64) -> MediaRoute {
    if min >= CASCADE_UP_FROM {
        return tier_for_min(min);
    }
    if min >= 992.0 && max < CASCADE_UP_FROM {
        return MediaRoute::Tier {
            breakpoint: Breakpoint::Desktop,
            note: Some(format!(
                "range {}px to {}px mapped to the desktop tier",
                format_px(min),
                format_px(max)
            )),
        };
    }
    match tier_for_max(max) {
        MediaRoute::Tier { breakpoint, note } => {
            let flattened = format!("lower bound min-width: {}px flattened", format_px(min));
            let note = match note {
                Some(n) => format!("{n}; {flattened}"),
                None => flattened,
            };
            MediaRoute::Tier {
                breakpoint,
                note: Some(note),
            }
        }
        other => other,
    }
}

fn format_px(px: f64) -> String {
    if px.fract() == 0.0 && px.is_finite() {
        format!("{}", px as i64)
    } else {
        format!("{px}")
    }
}
