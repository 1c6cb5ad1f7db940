//! Custom-property resolution.
//!
//! `var(--name)` and `var(--name, fallback)` references are replaced with
//! their values from the [`VariableTable`], recursively, up to a fixed depth.

use flowcss_lexer::VariableTable;

/// Why a value could not be fully resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VariableError {
    #[error("undefined custom property '{0}'")]
    Undefined(String),
    #[error("custom property '{0}' nests deeper than the resolution limit")]
    TooDeep(String),
    #[error("malformed var() reference in '{0}'")]
    Malformed(String),
}

/// Replace every `var()` reference in `value`.
pub fn resolve_value(
    value: &str,
    variables: &VariableTable,
    max_depth: usize,
) -> Result<String, VariableError> {
    resolve_at_depth(value, variables, max_depth, 0)
}

fn resolve_at_depth(
    value: &str,
    variables: &VariableTable,
    max_depth: usize,
    depth: usize,
) -> Result<String, VariableError> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = find_var(rest) {
        out.push_str(&rest[..start]);
        let open = start + "var(".len();
        let close = matching_paren(rest, open - 1)
            .ok_or_else(|| VariableError::Malformed(value.to_string()))?;
        let inner = &rest[open..close];

        let (name, fallback) = match split_first_comma(inner) {
            Some((name, fallback)) => (name.trim(), Some(fallback.trim())),
            None => (inner.trim(), None),
        };
        if !name.starts_with("--") {
            return Err(VariableError::Malformed(value.to_string()));
        }

        let replacement = match (variables.get(name), fallback) {
            (Some(found), _) => found,
            (None, Some(fallback)) => fallback,
            (None, None) => return Err(VariableError::Undefined(name.to_string())),
        };

        if depth >= max_depth {
            return Err(VariableError::TooDeep(name.to_string()));
        }
        out.push_str(&resolve_at_depth(replacement, variables, max_depth, depth + 1)?);
        rest = &rest[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Byte offset of the next `var(` that is not part of a longer identifier.
fn find_var(text: &str) -> Option<usize> {
    let lower = text.to_ascii_lowercase();
    let mut from = 0;
    while let Some(rel) = lower[from..].find("var(") {
        let idx = from + rel;
        let boundary = lower[..idx]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '-' || c == '_'));
        if boundary {
            return Some(idx);
        }
        from = idx + 4;
    }
    None
}

fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_first_comma(text: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some((&text[..i], &text[i + 1..])),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(pairs: &[(&str, &str)]) -> VariableTable {
        let mut table = VariableTable::new();
        for (name, value) in pairs {
            table.define(*name, *value);
        }
        table
    }

    #[test]
    fn test_plain_value_untouched() {
        assert_eq!(resolve_value("10px", &table(&[]), 10).unwrap(), "10px");
    }

    #[test]
    fn test_simple_reference() {
        let vars = table(&[("--brand", "#ff0000")]);
        assert_eq!(resolve_value("var(--brand)", &vars, 10).unwrap(), "#ff0000");
    }

    #[test]
    fn test_reference_inside_value() {
        let vars = table(&[("--gap", "8px")]);
        assert_eq!(
            resolve_value("calc(var(--gap) * 2) var(--gap)", &vars, 10).unwrap(),
            "calc(8px * 2) 8px"
        );
    }

    #[test]
    fn test_chained_references() {
        let vars = table(&[("--a", "var(--b)"), ("--b", "var(--c)"), ("--c", "blue")]);
        assert_eq!(resolve_value("var(--a)", &vars, 10).unwrap(), "blue");
    }

    #[test]
    fn test_fallback_used_when_undefined() {
        let vars = table(&[]);
        assert_eq!(
            resolve_value("var(--missing, rgb(0, 0, 0))", &vars, 10).unwrap(),
            "rgb(0, 0, 0)"
        );
    }

    #[test]
    fn test_fallback_may_reference_variable() {
        let vars = table(&[("--b", "2px")]);
        assert_eq!(resolve_value("var(--a, var(--b))", &vars, 10).unwrap(), "2px");
    }

    #[test]
    fn test_undefined_reported() {
        let err = resolve_value("var(--nope)", &table(&[]), 10).unwrap_err();
        assert_eq!(err, VariableError::Undefined("--nope".into()));
    }

    #[test]
    fn test_self_reference_terminates() {
        let vars = table(&[("--loop", "var(--loop)")]);
        let err = resolve_value("var(--loop)", &vars, 10).unwrap_err();
        assert_eq!(err, VariableError::TooDeep("--loop".into()));
    }

    #[test]
    fn test_unclosed_reference_is_malformed() {
        assert!(matches!(
            resolve_value("var(--a", &table(&[("--a", "1")]), 10),
            Err(VariableError::Malformed(_))
        ));
    }
}
