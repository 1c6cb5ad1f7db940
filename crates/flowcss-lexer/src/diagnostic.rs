//! Compile-time diagnostics.
//!
//! Every pass of the compiler reports recoverable problems into a shared
//! [`Diagnostics`] collector instead of failing. The collector is passed by
//! `&mut` and owned by the caller of a single conversion run.

use serde::Serialize;
use std::collections::HashSet;

/// How loud a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
}

/// A single recoverable problem found while compiling CSS.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub level: Level,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn info(code: &str, message: impl Into<String>) -> Self {
        Self::new(Level::Info, code, message)
    }

    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self::new(Level::Warning, code, message)
    }

    fn new(level: Level, code: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            code: code.to_string(),
            message: message.into(),
            selector: None,
            line: None,
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

/// Ordered, de-duplicating collector of diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    seen: HashSet<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic. Exact duplicates are dropped.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if self.seen.insert(diagnostic.clone()) {
            self.items.push(diagnostic);
        }
    }

    pub fn info(&mut self, code: &str, message: impl Into<String>) {
        self.push(Diagnostic::info(code, message));
    }

    pub fn warn(&mut self, code: &str, message: impl Into<String>) {
        self.push(Diagnostic::warning(code, message));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Count of diagnostics carrying `code`.
    pub fn count(&self, code: &str) -> usize {
        self.items.iter().filter(|d| d.code == code).count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_duplicates_are_dropped() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warn("UNSUPPORTED_PROPERTY", "unsupported property 'zoom'");
        diagnostics.warn("UNSUPPORTED_PROPERTY", "unsupported property 'zoom'");
        diagnostics.warn("UNSUPPORTED_PROPERTY", "unsupported property 'cursor'");
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.count("UNSUPPORTED_PROPERTY"), 2);
    }

    #[test]
    fn test_same_message_different_selector_kept() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::warning("X", "m").with_selector(".a"));
        diagnostics.push(Diagnostic::warning("X", "m").with_selector(".b"));
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_order_is_preserved() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.info("B", "second");
        diagnostics.warn("A", "first");
        let codes: Vec<_> = diagnostics.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["B", "A"]);
    }
}
