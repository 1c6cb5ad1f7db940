//! flowcss Lexer
//!
//! Extracts rules from scraped CSS text. Comments are stripped, `@media`
//! blocks are matched with explicit brace-depth counting, and declaration
//! blocks are split on semicolons that sit outside parentheses and strings.
//! Custom-property definitions on `:root`, `html`, `body` and `*` are
//! collected into a [`VariableTable`].
//!
//! # Example
//!
//! ```
//! use flowcss_lexer::{extract, Diagnostics};
//!
//! let mut diagnostics = Diagnostics::new();
//! let sheet = extract(".card { color: red }", &mut diagnostics);
//! assert_eq!(sheet.rules.len(), 1);
//! assert_eq!(sheet.rules[0].selector, ".card");
//! ```

pub mod diagnostic;
pub mod rule;
pub mod scanner;

pub use diagnostic::{Diagnostic, Diagnostics, Level};
pub use rule::{Declaration, MediaBlock, Rule, Span, Stylesheet, VariableTable};
pub use scanner::{extract, split_declarations, split_selector_list, strip_comments, Scanner};
