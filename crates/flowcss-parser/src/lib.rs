//! flowcss Parser
//!
//! Turns extracted CSS rules into a breakpoint-aware class index: selectors
//! are reduced to target classes, `var()` references are resolved,
//! shorthands are expanded, and media queries are routed onto a fixed set of
//! tiers, inverting mobile-first overrides into a desktop-first model.
//!
//! # Example
//!
//! ```
//! use flowcss_parser::{compile, Breakpoint, CompileOptions};
//!
//! let css = ".card { padding: 8px } @media (max-width: 767px) { .card { padding: 4px } }";
//! let index = compile(css, &CompileOptions::default());
//! let card = index.get("card").unwrap();
//! assert_eq!(card.base.get("padding-left"), Some("8px"));
//! assert_eq!(card.breakpoint(Breakpoint::Small).unwrap().get("padding-left"), Some("4px"));
//! ```

pub mod cascade;
pub mod media;
pub mod model;
pub mod normalize;
pub mod selector;
pub mod variables;

pub use cascade::{compile, compile_stylesheet};
pub use media::{route_media, MediaRoute};
pub use model::{
    Breakpoint, ClassEntry, ClassIndex, ClassMap, CompileOptions, PseudoState, StyleMap,
};
pub use normalize::{
    inject_layout_defaults, layout_kind, normalize_declaration, rewrite_functions, split_tokens,
    LayoutKind,
};
pub use selector::{classify_selector, ClassTarget, SelectorSkip};
pub use variables::{resolve_value, VariableError};

pub use flowcss_lexer::{Diagnostic, Diagnostics, Level};
