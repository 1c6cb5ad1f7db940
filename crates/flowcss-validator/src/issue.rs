use serde::Serialize;
use std::fmt;

/// How serious a validation issue is. Ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks unconditionally.
    Fatal,
    /// Blocks unless sanitized away.
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Whether an issue of this severity prevents the payload from leaving.
    pub fn is_blocking(self) -> bool {
        matches!(self, Severity::Fatal | Severity::Error)
    }
}

/// Stable machine-readable issue codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    InvalidPayload,
    DuplicateNodeId,
    DuplicateStyleId,
    InvalidIdFormat,
    CircularReference,
    OrphanReference,
    UnreachableNode,
    InvalidStyleValue,
    MissingStyleReference,
    EmbedSizeWarning,
    EmbedSizeExceeded,
    TextNodeInvalid,
    UnknownNodeType,
    TagTypeMismatch,
}

impl IssueCode {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueCode::InvalidPayload => "INVALID_PAYLOAD",
            IssueCode::DuplicateNodeId => "DUPLICATE_NODE_ID",
            IssueCode::DuplicateStyleId => "DUPLICATE_STYLE_ID",
            IssueCode::InvalidIdFormat => "INVALID_ID_FORMAT",
            IssueCode::CircularReference => "CIRCULAR_REFERENCE",
            IssueCode::OrphanReference => "ORPHAN_REFERENCE",
            IssueCode::UnreachableNode => "UNREACHABLE_NODE",
            IssueCode::InvalidStyleValue => "INVALID_STYLE_VALUE",
            IssueCode::MissingStyleReference => "MISSING_STYLE_REFERENCE",
            IssueCode::EmbedSizeWarning => "EMBED_SIZE_WARNING",
            IssueCode::EmbedSizeExceeded => "EMBED_SIZE_EXCEEDED",
            IssueCode::TextNodeInvalid => "TEXT_NODE_INVALID",
            IssueCode::UnknownNodeType => "UNKNOWN_NODE_TYPE",
            IssueCode::TagTypeMismatch => "TAG_TYPE_MISMATCH",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One problem found in a candidate payload. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: IssueCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn new(severity: Severity, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            context: None,
            suggestion: None,
        }
    }

    pub fn fatal(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, code, message)
    }

    pub fn error(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    pub fn warning(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}
