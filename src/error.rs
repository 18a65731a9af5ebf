//! Error types with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

pub type Result<T, E = UriTemplateError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum UriTemplateError {
    // ─────────────────────────────────────────────────────────────
    // Template errors (URIT-010 to URIT-013)
    // ─────────────────────────────────────────────────────────────

    #[error("URIT-010: Malformed expression '{{{expression}}}': {details}")]
    TemplateSyntax { expression: String, details: String },

    #[error("URIT-011: Operator '-{operator}' takes exactly one variable, given {count}")]
    Arity { operator: String, count: usize },

    #[error("URIT-012: Unknown operator '-{name}'")]
    UnknownOperator { name: String },

    #[error("URIT-013: Variable '{variable}' must be {expected}")]
    TypeMismatch { variable: String, expected: &'static str },

    // ─────────────────────────────────────────────────────────────
    // Parameter input errors (URIT-020 to URIT-022)
    // ─────────────────────────────────────────────────────────────

    #[error("URIT-020: Invalid parameter '{input}' (expected name=value)")]
    ParamSyntax { input: String },

    #[error("URIT-021: JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URIT-022: YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl UriTemplateError {
    pub(crate) fn syntax(expression: &str, details: impl Into<String>) -> Self {
        Self::TemplateSyntax {
            expression: expression.to_string(),
            details: details.into(),
        }
    }
}

impl FixSuggestion for UriTemplateError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            UriTemplateError::TemplateSyntax { .. } => {
                Some("Use {name} or {-operator|arg|var1,var2} with exactly two '|' separators")
            }
            UriTemplateError::Arity { .. } => {
                Some("-prefix, -suffix and -list accept a single variable; split into several expressions")
            }
            UriTemplateError::UnknownOperator { .. } => {
                Some("Supported operators: opt, neg, prefix, suffix, join, list")
            }
            UriTemplateError::TypeMismatch { .. } => {
                Some("Pass a list only to -list (and -opt/-neg); use a plain string elsewhere")
            }
            UriTemplateError::ParamSyntax { .. } => Some("Write parameters as name=value"),
            UriTemplateError::Json(_) => {
                Some("Params must be a flat JSON object of strings, numbers, booleans or arrays of those")
            }
            UriTemplateError::Yaml(_) => Some("Check YAML syntax: indentation and quoting"),
            UriTemplateError::Io(_) => Some("Check file path and permissions"),
        }
    }
}
