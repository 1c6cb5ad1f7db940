use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::rule::{Declaration, MediaBlock, Rule, Span, Stylesheet};

/// Selectors whose custom properties feed the variable table.
const VARIABLE_SCOPES: &[&str] = &[":root", "html", "body", "*"];

/// At-rules whose inner rules are treated as if they were written without the wrapper.
const UNWRAPPED_AT_RULES: &[&str] = &["supports", "layer"];

/// At-rules that carry no styling the target can use.
const SKIPPED_AT_RULES: &[&str] = &[
    "font-face",
    "counter-style",
    "property",
    "import",
    "charset",
    "namespace",
];

/// A top-level construct found by the scanner.
#[derive(Debug, Clone, PartialEq)]
enum Item {
    Rule {
        prelude: String,
        body: String,
        body_line: usize,
        span: Span,
    },
    AtRule {
        name: String,
        prelude: String,
        body: Option<String>,
        body_line: usize,
        raw: String,
        span: Span,
    },
}

/// Brace-aware CSS scanner.
///
/// Walks comment-free CSS as a `Vec<char>` and splits it into rules and
/// at-rules. Block bodies are matched by counting brace depth, skipping
/// over quoted strings and backslash escapes, so nested blocks never end a
/// match early.
pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Scanner {
    /// Create a new scanner for the given source.
    pub fn new(source: &str) -> Self {
        Self::at_line(source, 1)
    }

    /// Create a scanner whose line numbers start at `line`.
    pub fn at_line(source: &str, line: usize) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line,
            column: 1,
        }
    }

    /// Scan all top-level items.
    fn scan_items(&mut self, diagnostics: &mut Diagnostics) -> Vec<Item> {
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }

            let start = self.pos;
            let line = self.line;
            let column = self.column;

            if self.peek() == '}' {
                self.advance();
                diagnostics.push(
                    Diagnostic::warning("STRAY_BRACE", "Unmatched '}' ignored").with_line(line),
                );
                continue;
            }

            if self.peek() == '@' {
                self.advance();
                let name = self.scan_at_keyword();
                let (prelude, terminator) = self.scan_prelude();
                let mut body = None;
                let mut body_line = self.line;
                match terminator {
                    '{' => {
                        self.advance();
                        body_line = self.line;
                        let (content, closed) = self.scan_block();
                        if !closed {
                            diagnostics.push(
                                Diagnostic::warning(
                                    "UNTERMINATED_BLOCK",
                                    format!("@{name} block is not closed; closed at end of input"),
                                )
                                .with_line(line),
                            );
                        }
                        body = Some(content);
                    }
                    ';' => self.advance(),
                    _ => {}
                }
                let raw: String = self.chars[start..self.pos].iter().collect();
                items.push(Item::AtRule {
                    name,
                    prelude: collapse_whitespace(&prelude),
                    body,
                    body_line,
                    raw,
                    span: Span::new(start, self.pos, line, column),
                });
                continue;
            }

            let (prelude, terminator) = self.scan_prelude();
            match terminator {
                '{' => {
                    self.advance();
                    let body_line = self.line;
                    let (body, closed) = self.scan_block();
                    if !closed {
                        diagnostics.push(
                            Diagnostic::warning(
                                "UNTERMINATED_BLOCK",
                                "Rule block is not closed; closed at end of input",
                            )
                            .with_selector(collapse_whitespace(&prelude))
                            .with_line(line),
                        );
                    }
                    items.push(Item::Rule {
                        prelude,
                        body,
                        body_line,
                        span: Span::new(start, self.pos, line, column),
                    });
                }
                ';' => {
                    self.advance();
                    diagnostics.push(
                        Diagnostic::warning(
                            "STRAY_DECLARATION",
                            format!("Text outside any rule ignored: '{}'", prelude.trim()),
                        )
                        .with_line(line),
                    );
                }
                _ => {
                    if !prelude.trim().is_empty() {
                        diagnostics.push(
                            Diagnostic::warning(
                                "INCOMPLETE_RULE",
                                format!("Selector without a block ignored: '{}'", prelude.trim()),
                            )
                            .with_line(line),
                        );
                    }
                }
            }
        }

        items
    }

    /// Read an at-keyword name (the part after `@`), lowercased.
    fn scan_at_keyword(&mut self) -> String {
        let mut name = String::new();
        while !self.is_at_end()
            && (self.peek().is_alphanumeric() || self.peek() == '-' || self.peek() == '_')
        {
            name.push(self.peek().to_ascii_lowercase());
            self.advance();
        }
        name
    }

    /// Read up to the next `{`, `;` or `}` outside parentheses, brackets and
    /// strings. The terminator is returned but not consumed; `'\0'` means end
    /// of input.
    fn scan_prelude(&mut self) -> (String, char) {
        let mut out = String::new();
        let mut depth = 0usize;

        while !self.is_at_end() {
            let c = self.peek();
            match c {
                '"' | '\'' => {
                    self.scan_string_into(&mut out);
                    continue;
                }
                '\\' => {
                    self.scan_escape_into(&mut out);
                    continue;
                }
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                '{' | ';' | '}' if depth == 0 => return (out, c),
                _ => {}
            }
            out.push(c);
            self.advance();
        }

        (out, '\0')
    }

    /// Read a block body after its opening `{` has been consumed. Consumes
    /// the matching `}`. Returns the body and whether the block was closed.
    fn scan_block(&mut self) -> (String, bool) {
        let mut out = String::new();
        let mut depth = 1usize;

        while !self.is_at_end() {
            let c = self.peek();
            match c {
                '"' | '\'' => {
                    self.scan_string_into(&mut out);
                    continue;
                }
                '\\' => {
                    self.scan_escape_into(&mut out);
                    continue;
                }
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return (out, true);
                    }
                }
                _ => {}
            }
            out.push(c);
            self.advance();
        }

        (out, false)
    }

    /// Copy a quoted string verbatim, quotes included.
    fn scan_string_into(&mut self, out: &mut String) {
        let quote = self.peek();
        out.push(quote);
        self.advance();

        while !self.is_at_end() {
            let c = self.peek();
            if c == '\\' {
                self.scan_escape_into(out);
                continue;
            }
            out.push(c);
            self.advance();
            if c == quote {
                return;
            }
        }
    }

    fn scan_escape_into(&mut self, out: &mut String) {
        out.push(self.peek());
        self.advance();
        if !self.is_at_end() {
            out.push(self.peek());
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.peek().is_whitespace() {
            self.advance();
        }
    }

    // --- Helpers ---

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.pos]
        }
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            if self.chars[self.pos] == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }
}

// =========================================================================
// Extraction
// =========================================================================

/// Extract base rules, media blocks, verbatim at-rules and custom properties
/// from a CSS document.
pub fn extract(source: &str, diagnostics: &mut Diagnostics) -> Stylesheet {
    let clean = strip_comments(source);
    let items = Scanner::new(&clean).scan_items(diagnostics);

    let mut extractor = Extractor {
        sheet: Stylesheet::default(),
        base_rules: 0,
        diagnostics,
    };
    let mut base = Vec::new();
    extractor.route_items(items, None, &mut base);

    let mut sheet = extractor.sheet;
    sheet.rules = base;
    collect_variables(&mut sheet);

    tracing::debug!(
        rules = sheet.rules.len(),
        media = sheet.media.len(),
        verbatim = sheet.verbatim.len(),
        variables = sheet.variables.len(),
        "extracted stylesheet"
    );
    sheet
}

struct Extractor<'d> {
    sheet: Stylesheet,
    /// Base rules routed so far, for placing media blocks among them.
    base_rules: usize,
    diagnostics: &'d mut Diagnostics,
}

impl Extractor<'_> {
    fn route_items(&mut self, items: Vec<Item>, query: Option<&str>, sink: &mut Vec<Rule>) {
        for item in items {
            match item {
                Item::Rule {
                    prelude,
                    body,
                    body_line,
                    span,
                } => {
                    if let Some(rule) = self.make_rule(&prelude, &body, body_line, span) {
                        if query.is_none() {
                            self.base_rules += 1;
                        }
                        sink.push(rule);
                    }
                }
                Item::AtRule {
                    name,
                    prelude,
                    body,
                    body_line,
                    raw,
                    span,
                } => self.route_at_rule(&name, &prelude, body, body_line, raw, span, query, sink),
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn route_at_rule(
        &mut self,
        name: &str,
        prelude: &str,
        body: Option<String>,
        body_line: usize,
        raw: String,
        span: Span,
        query: Option<&str>,
        sink: &mut Vec<Rule>,
    ) {
        let Some(body) = body else {
            self.diagnostics.push(
                Diagnostic::info("AT_RULE_SKIPPED", format!("@{name} statement skipped"))
                    .with_line(span.line),
            );
            return;
        };

        if name == "media" {
            let full_query = match query {
                Some(outer) => format!("{outer} and {prelude}"),
                None => prelude.to_string(),
            };
            let index = self.sheet.media.len();
            self.sheet.media.push(MediaBlock {
                query: full_query.clone(),
                rules: Vec::new(),
                raw,
                span,
                base_rules_before: self.base_rules,
            });
            let items = Scanner::at_line(&body, body_line).scan_items(self.diagnostics);
            let mut rules = Vec::new();
            self.route_items(items, Some(&full_query), &mut rules);
            self.sheet.media[index].rules = rules;
        } else if UNWRAPPED_AT_RULES.contains(&name) {
            self.diagnostics.push(
                Diagnostic::warning(
                    "AT_RULE_UNWRAPPED",
                    format!("@{name} {prelude} condition ignored; inner rules applied unconditionally"),
                )
                .with_line(span.line),
            );
            let items = Scanner::at_line(&body, body_line).scan_items(self.diagnostics);
            self.route_items(items, query, sink);
        } else if name.ends_with("keyframes") || SKIPPED_AT_RULES.contains(&name) {
            self.diagnostics.push(
                Diagnostic::info("AT_RULE_SKIPPED", format!("@{name} block skipped"))
                    .with_line(span.line),
            );
        } else {
            self.diagnostics.push(
                Diagnostic::warning(
                    "NON_STANDARD_AT_RULE",
                    format!("@{name} {prelude} kept verbatim for literal embedding"),
                )
                .with_line(span.line),
            );
            self.sheet.verbatim.push(raw);
        }
    }

    fn make_rule(&mut self, prelude: &str, body: &str, body_line: usize, span: Span) -> Option<Rule> {
        let selector = collapse_whitespace(prelude);
        if selector.is_empty() {
            self.diagnostics.push(
                Diagnostic::warning("MISSING_SELECTOR", "Declaration block without a selector ignored")
                    .with_line(span.line),
            );
            return None;
        }

        let mut scanner = Scanner::at_line(body, body_line);
        let mut declarations = Vec::new();
        let mut nested = 0usize;

        loop {
            scanner.skip_whitespace();
            if scanner.is_at_end() {
                break;
            }
            let (text, terminator) = scanner.scan_prelude();
            match terminator {
                '{' => {
                    scanner.advance();
                    scanner.scan_block();
                    nested += 1;
                    continue;
                }
                '\0' => {}
                _ => scanner.advance(),
            }
            if text.trim().is_empty() {
                continue;
            }
            match parse_declaration(&text) {
                Some(declaration) => declarations.push(declaration),
                None => self.diagnostics.push(
                    Diagnostic::warning(
                        "MALFORMED_DECLARATION",
                        format!("Declaration without ':' ignored: '{}'", text.trim()),
                    )
                    .with_selector(selector.clone())
                    .with_line(span.line),
                ),
            }
        }

        if nested > 0 {
            self.diagnostics.push(
                Diagnostic::warning(
                    "NESTED_RULE_IGNORED",
                    format!("{nested} nested rule(s) inside '{selector}' ignored"),
                )
                .with_selector(selector.clone())
                .with_line(span.line),
            );
        }

        Some(Rule {
            selector,
            declarations,
            span,
        })
    }
}

/// Collect custom properties from `:root`, `html`, `body` and `*` rules.
fn collect_variables(sheet: &mut Stylesheet) {
    for rule in &sheet.rules {
        let in_scope = split_selector_list(&rule.selector)
            .iter()
            .any(|s| VARIABLE_SCOPES.contains(&s.as_str()));
        if !in_scope {
            continue;
        }
        for declaration in rule.declarations.iter().filter(|d| d.is_custom_property()) {
            sheet
                .variables
                .define(declaration.property.clone(), declaration.value.clone());
        }
    }
}

/// Parse a single `property: value` text. Returns `None` when there is no colon.
fn parse_declaration(text: &str) -> Option<Declaration> {
    let (property, value) = text.split_once(':')?;
    let property = property.trim();
    if property.is_empty() {
        return None;
    }
    let property = if property.starts_with("--") {
        property.to_string()
    } else {
        property.to_ascii_lowercase()
    };

    let mut value = value.trim().to_string();
    let mut important = false;
    if let Some(idx) = value.to_ascii_lowercase().rfind("!important") {
        if value[idx + "!important".len()..].trim().is_empty() {
            value.truncate(idx);
            value = value.trim_end().to_string();
            important = true;
        }
    }

    Some(Declaration {
        property,
        value,
        important,
    })
}

// =========================================================================
// Text helpers
// =========================================================================

/// Remove `/* ... */` comments. Newlines inside comments are kept so line
/// numbers stay stable; quoted strings are left untouched.
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push(c);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for inner in chars.by_ref() {
                    if inner == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }

    out
}

/// Split a declaration block on semicolons outside parentheses and strings.
pub fn split_declarations(body: &str) -> Vec<String> {
    split_top_level(body, ';')
}

/// Split a selector list on commas outside parentheses, brackets and strings.
pub fn split_selector_list(selector: &str) -> Vec<String> {
    split_top_level(selector, ',')
}

fn split_top_level(text: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            current.push(c);
            if c == '\\' {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                let part = current.trim();
                if !part.is_empty() {
                    parts.push(part.to_string());
                }
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }

    let part = current.trim();
    if !part.is_empty() {
        parts.push(part.to_string());
    }
    parts
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
