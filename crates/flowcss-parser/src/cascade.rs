//! Cascade resolution.
//!
//! Folds extracted rules into the class index. Base rules and `@media`
//! blocks are applied in document order, so a later declaration of the same
//! property always wins. A base declaration also clears that property from
//! every breakpoint tier, since it follows and overrides any earlier media
//! rule at every width.
//!
//! Mobile-first min-width overrides below the cascade-up range are inverted:
//! the new value becomes the desktop base, and whatever used to apply at
//! narrower widths is written into the max-width tiers below the threshold.

use crate::media::{route_media, MediaRoute};
use crate::model::{Breakpoint, ClassEntry, ClassIndex, ClassMap, CompileOptions};
use crate::normalize::{inject_layout_defaults, normalize_declaration};
use crate::selector::{classify_selector, ClassTarget};
use crate::variables::resolve_value;
use flowcss_lexer::{split_selector_list, Diagnostic, Diagnostics, Rule, Stylesheet, VariableTable};

/// Where the rules being applied land.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Scope {
    Base,
    Tier(Breakpoint),
    Invert(f64),
}

/// Compile CSS text into a class index.
pub fn compile(css: &str, options: &CompileOptions) -> ClassIndex {
    let mut diagnostics = Diagnostics::new();
    let sheet = flowcss_lexer::extract(css, &mut diagnostics);
    let mut index = compile_stylesheet(&sheet, options, &mut diagnostics);
    index.warnings = diagnostics.into_vec();
    index
}

/// Compile an already extracted stylesheet. Diagnostics are reported into
/// `diagnostics`; the returned index has an empty warning list.
pub fn compile_stylesheet(
    sheet: &Stylesheet,
    options: &CompileOptions,
    diagnostics: &mut Diagnostics,
) -> ClassIndex {
    let mut resolver = Resolver {
        classes: ClassMap::new(),
        variables: &sheet.variables,
        options,
        diagnostics,
    };

    let mut base_rules = sheet.rules.iter();
    let mut applied = 0;
    let mut side_channel: Vec<String> = sheet.verbatim.clone();
    for block in &sheet.media {
        for rule in base_rules.by_ref().take(block.base_rules_before.saturating_sub(applied)) {
            resolver.apply_rule(rule, Scope::Base);
            applied += 1;
        }
        let scope = match route_media(&block.query, options.root_font_size) {
            MediaRoute::Base => Scope::Base,
            MediaRoute::Tier { breakpoint, note } => {
                if let Some(note) = note {
                    resolver.diagnostics.push(
                        Diagnostic::info("ROUNDED_BREAKPOINT", format!("@media {}: {note}", block.query))
                            .with_line(block.span.line),
                    );
                }
                Scope::Tier(breakpoint)
            }
            MediaRoute::Invert { min_width } => Scope::Invert(min_width),
            MediaRoute::NonStandard => {
                resolver.diagnostics.push(
                    Diagnostic::warning(
                        "NON_STANDARD_MEDIA",
                        format!("@media {} kept verbatim for literal embedding", block.query),
                    )
                    .with_line(block.span.line),
                );
                // Nested blocks are already part of their parent's raw text
                if !side_channel.iter().any(|raw| raw.contains(&block.raw)) {
                    side_channel.push(block.raw.clone());
                }
                continue;
            }
        };
        for rule in &block.rules {
            resolver.apply_rule(rule, scope);
        }
    }
    for rule in base_rules {
        resolver.apply_rule(rule, Scope::Base);
    }

    let mut classes = resolver.classes;
    for entry in classes.iter_mut() {
        finish_entry(entry);
    }

    tracing::debug!(
        classes = classes.len(),
        side_channel = side_channel.len(),
        "resolved class index"
    );

    ClassIndex {
        classes,
        media_breakpoints: Breakpoint::ALL.iter().map(|bp| (*bp, bp.label())).collect(),
        warnings: Vec::new(),
        non_standard_media_css: (!side_channel.is_empty()).then(|| side_channel.join("\n")),
    }
}

/// Make implicit container defaults explicit and set the container flag.
fn finish_entry(entry: &mut ClassEntry) {
    let mut container = inject_layout_defaults(&mut entry.base, None).is_some();
    for bucket in entry.breakpoints.values_mut() {
        if bucket.contains("display") {
            container |= inject_layout_defaults(bucket, Some(&entry.base)).is_some();
        }
    }
    entry.breakpoints.retain(|_, bucket| !bucket.is_empty());
    entry.pseudo.retain(|_, bucket| !bucket.is_empty());
    entry.is_layout_container = container;
}

struct Resolver<'a> {
    classes: ClassMap,
    variables: &'a VariableTable,
    options: &'a CompileOptions,
    diagnostics: &'a mut Diagnostics,
}

impl Resolver<'_> {
    fn apply_rule(&mut self, rule: &Rule, scope: Scope) {
        for selector in split_selector_list(&rule.selector) {
            match classify_selector(&selector) {
                Ok(target) => self.apply_target(&target, &selector, rule, scope),
                Err(skip) if skip.is_global() => {
                    if rule.declarations.iter().all(|d| d.is_custom_property()) {
                        continue;
                    }
                    self.diagnostics.push(
                        Diagnostic::info(skip.code, skip.message)
                            .with_selector(selector.clone())
                            .with_line(rule.span.line),
                    );
                }
                Err(skip) => self.diagnostics.push(
                    Diagnostic::warning(skip.code, skip.message)
                        .with_selector(selector.clone())
                        .with_line(rule.span.line),
                ),
            }
        }
    }

    fn apply_target(&mut self, target: &ClassTarget, selector: &str, rule: &Rule, scope: Scope) {
        let line = rule.span.line;

        if !target.parents.is_empty() {
            self.diagnostics.push(
                Diagnostic::warning(
                    "DESCENDANT_FLATTENED",
                    format!(
                        "'{selector}' flattened onto '.{}'; descendant specificity is lost",
                        target.name
                    ),
                )
                .with_selector(selector)
                .with_line(line),
            );
            for parent in &target.parents {
                self.classes.entry(parent).add_child(&target.name);
                self.classes.entry(&target.name).add_parent(parent);
            }
        }
        if target.from_element {
            self.diagnostics.push(
                Diagnostic::info(
                    "ELEMENT_SELECTOR_MAPPED",
                    format!("'{selector}' mapped to class '{}'", target.name),
                )
                .with_selector(selector)
                .with_line(line),
            );
        }

        let longhands = self.resolve_declarations(rule, selector);

        let entry = self.classes.entry(&target.name);
        if target.is_combo {
            entry.is_combo = true;
        }

        match (scope, target.pseudo) {
            (Scope::Base | Scope::Invert(_), Some(state)) => {
                let bucket = entry.pseudo_mut(state);
                for (property, value) in longhands {
                    bucket.set(property, value);
                }
            }
            (Scope::Base, None) => {
                for (property, value) in longhands {
                    for bucket in entry.breakpoints.values_mut() {
                        bucket.remove(&property);
                    }
                    entry.base.set(property, value);
                }
            }
            (Scope::Tier(breakpoint), None) => {
                let bucket = entry.breakpoint_mut(breakpoint);
                for (property, value) in longhands {
                    bucket.set(property, value);
                }
            }
            (Scope::Tier(breakpoint), Some(state)) => {
                self.diagnostics.push(
                    Diagnostic::warning(
                        "PSEUDO_IN_MEDIA",
                        format!(
                            "':{}' inside the {} tier cannot be represented and was dropped",
                            state.name(),
                            breakpoint.name()
                        ),
                    )
                    .with_selector(selector)
                    .with_line(line),
                );
            }
            (Scope::Invert(threshold), None) => {
                for (property, value) in longhands {
                    if !invert(entry, &property, &value, threshold) {
                        self.diagnostics.push(
                            Diagnostic::warning(
                                "INVERSION_WITHOUT_BASE",
                                format!(
                                    "'{property}' set from min-width {threshold}px has no narrower value; it now applies at every width below too"
                                ),
                            )
                            .with_selector(selector)
                            .with_line(line),
                        );
                    }
                }
            }
        }
    }

    /// Resolve variables, strip quotes and normalize every declaration of
    /// `rule` into supported longhands.
    fn resolve_declarations(&mut self, rule: &Rule, selector: &str) -> Vec<(String, String)> {
        let mut longhands = Vec::new();
        for declaration in &rule.declarations {
            if declaration.is_custom_property() {
                continue;
            }
            if declaration.important {
                self.diagnostics.push(
                    Diagnostic::info(
                        "IMPORTANT_DROPPED",
                        format!("!important on '{}' has no equivalent", declaration.property),
                    )
                    .with_selector(selector),
                );
            }

            let value = match resolve_value(
                &declaration.value,
                self.variables,
                self.options.max_variable_depth,
            ) {
                Ok(value) => value,
                Err(err) => {
                    self.diagnostics.push(
                        Diagnostic::warning(
                            "UNRESOLVED_VARIABLE",
                            format!("'{}' dropped: {err}", declaration.property),
                        )
                        .with_selector(selector)
                        .with_line(rule.span.line),
                    );
                    continue;
                }
            };
            let value = if declaration.property == "font-family" {
                value
            } else {
                strip_quotes(&value)
            };

            longhands.extend(normalize_declaration(
                &declaration.property,
                &value,
                self.diagnostics,
            ));
        }
        longhands
    }
}

/// Promote `value` to the base of `entry` and push whatever applied at
/// narrower widths down into the max-width tiers below `threshold`.
/// Returns false when there was no narrower value to preserve.
fn invert(entry: &mut ClassEntry, property: &str, value: &str, threshold: f64) -> bool {
    let mut carried = entry.base.get(property).map(str::to_string);

    for breakpoint in Breakpoint::CASCADE_DOWN {
        let Some(max) = breakpoint.max_width().map(f64::from) else {
            continue;
        };
        let existing = entry
            .breakpoints
            .get(&breakpoint)
            .and_then(|bucket| bucket.get(property))
            .map(str::to_string);

        if max >= threshold {
            // The override wins inside this tier from the threshold up, but
            // the tier's own value still governs widths below the threshold.
            if let Some(old) = existing {
                carried = Some(old);
                if let Some(bucket) = entry.breakpoints.get_mut(&breakpoint) {
                    bucket.remove(property);
                }
            }
            continue;
        }

        if existing.is_some() {
            break;
        }
        if let Some(old) = &carried {
            entry.breakpoint_mut(breakpoint).set(property, old.as_str());
        }
    }

    let cleared_above = [
        (Breakpoint::Desktop, threshold <= 992.0),
        (Breakpoint::XLarge, true),
        (Breakpoint::XxLarge, true),
        (Breakpoint::XxxLarge, true),
    ];
    for (breakpoint, applies) in cleared_above {
        if applies {
            if let Some(bucket) = entry.breakpoints.get_mut(&breakpoint) {
                bucket.remove(property);
            }
        }
    }

    entry.base.set(property, value);
    carried.is_some()
}

/// Remove one pair of matching surrounding quotes.
fn strip_quotes(value: &str) -> String {
    let trimmed = value.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            if !inner.contains(quote) {
                return inner.to_string();
            }
        }
    }
    trimmed.to_string()
}
