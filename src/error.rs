//! Unified error types for license-normalizer.
//!
//! This module provides the error hierarchy for the library, with enough
//! context (original query, offending tokens, conflicting ids) for callers to
//! report a failure without re-running the query.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for license-normalizer operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NormalizerError {
    /// Definition tables could not be built. Fatal for the engine.
    #[error("Failed to load license definitions: {context}")]
    Load {
        context: String,
        #[source]
        source: LoadErrorKind,
    },

    /// A single name could not be resolved through any lookup table
    #[error("Could not identify license from \"{token}\"{}", suggestion_suffix(.suggestion.as_deref()))]
    UnidentifiedToken {
        token: String,
        suggestion: Option<String>,
    },

    /// The expression parser rejected the fully rewritten text
    #[error("Failed to parse \"{expression}\": {message}{}", ambiguity_suffix(.ambiguities))]
    Parse {
        expression: String,
        message: String,
        ambiguities: Vec<String>,
    },

    /// A requested validation mode rejected the canonical form
    #[error("Validation of \"{expression}\" failed: {source}")]
    Validation {
        expression: String,
        #[source]
        source: ValidationErrorKind,
    },

    /// A query was not a string
    #[error("Wrong input type ({0}), only strings can be normalized")]
    InputType(String),

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Specific load error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LoadErrorKind {
    #[error("Alias \"{alias}\" -> {id} already defined as \"{existing}\"")]
    DuplicateAlias {
        alias: String,
        id: String,
        existing: String,
    },

    #[error("License \"{0}\" defined more than once")]
    DuplicateId(String),

    #[error("Record without an identifier")]
    MissingId,

    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Unknown license \"{id}\" referenced by {table}")]
    UnknownReference { id: String, table: String },
}

/// Specific validation error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ValidationErrorKind {
    #[error("Found license with multiple words \"{0}\"")]
    MultiWordToken(String),

    #[error("Non SPDX licenses found: {}", .0.join(", "))]
    NonSpdxTokens(Vec<String>),

    #[error("Expression errors: {}", .0.join(", "))]
    Scancode(Vec<String>),

    #[error("Not supported by the compatibility matrix: {}", describe_unsupported(.0))]
    UnsupportedByMatrix(Vec<(String, bool)>),
}

fn suggestion_suffix(suggestion: Option<&str>) -> String {
    suggestion.map_or_else(String::new, |s| format!(" (did you mean \"{s}\"?)"))
}

fn ambiguity_suffix(ambiguities: &[String]) -> String {
    if ambiguities.is_empty() {
        String::new()
    } else {
        format!(". Ambiguities: {}", ambiguities.join(" "))
    }
}

fn describe_unsupported(table: &[(String, bool)]) -> String {
    table
        .iter()
        .map(|(token, supported)| format!("{token}: {supported}"))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for license-normalizer operations
pub type Result<T> = std::result::Result<T, NormalizerError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl NormalizerError {
    /// Create a load error with context
    pub fn load(context: impl Into<String>, source: LoadErrorKind) -> Self {
        Self::Load {
            context: context.into(),
            source,
        }
    }

    /// Create a load error for two records sharing an alias
    pub fn duplicate_alias(
        alias: impl Into<String>,
        id: impl Into<String>,
        existing: impl Into<String>,
    ) -> Self {
        Self::load(
            "building alias table",
            LoadErrorKind::DuplicateAlias {
                alias: alias.into(),
                id: id.into(),
                existing: existing.into(),
            },
        )
    }

    /// Create a validation error for an expression
    pub fn validation(expression: impl Into<String>, source: ValidationErrorKind) -> Self {
        Self::Validation {
            expression: expression.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the caller can retry with different input or modes.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Load { .. } | Self::Config(_))
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for NormalizerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for NormalizerError {
    fn from(err: serde_json::Error) -> Self {
        Self::load(
            "JSON deserialization",
            LoadErrorKind::InvalidJson(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The context string is prepended to the error's existing context, creating
/// a chain that shows the path through the code.
///
/// # Example
///
/// ```ignore
/// use license_normalizer::error::ErrorContext;
///
/// let record: LicenseRecord = serde_json::from_str(&data)
///     .with_context(|| format!("reading {}", path.display()))?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, only evaluated on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<NormalizerError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
///
/// Query errors carry their own diagnostic payload and pass through as-is.
fn add_context_to_error(err: NormalizerError, new_ctx: &str) -> NormalizerError {
    match err {
        NormalizerError::Load {
            context: existing,
            source,
        } => NormalizerError::Load {
            context: chain_context(new_ctx, &existing),
            source,
        },
        NormalizerError::Io {
            path,
            message,
            source,
        } => NormalizerError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        NormalizerError::Config(msg) => NormalizerError::Config(chain_context(new_ctx, &msg)),
        other => other,
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_alias_names_both_ids() {
        let err = NormalizerError::duplicate_alias("BSD3", "BSD-3-Clause", "BSD-3-Clause-Clear");
        let display = format!("{err}: {}", std::error::Error::source(&err).unwrap());
        assert!(display.contains("BSD-3-Clause-Clear"), "{display}");
        assert!(display.contains("\"BSD3\" -> BSD-3-Clause"), "{display}");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_config_error_context() {
        let err = add_context_to_error(NormalizerError::config("matrix.file: missing"), "setup");
        assert_eq!(err.to_string(), "Invalid configuration: setup: matrix.file: missing");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_unidentified_token_display() {
        let err = NormalizerError::UnidentifiedToken {
            token: "MTI".to_string(),
            suggestion: Some("MIT".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Could not identify license from \"MTI\" (did you mean \"MIT\"?)"
        );

        let err = NormalizerError::UnidentifiedToken {
            token: "zzz".to_string(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "Could not identify license from \"zzz\"");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_validation_display() {
        let err = NormalizerError::validation(
            "BSD 3 Clause",
            ValidationErrorKind::MultiWordToken("BSD 3 Clause".to_string()),
        );
        let source = std::error::Error::source(&err).unwrap().to_string();
        assert_eq!(source, "Found license with multiple words \"BSD 3 Clause\"");

        let kind = ValidationErrorKind::UnsupportedByMatrix(vec![
            ("MIT".to_string(), true),
            ("Foo".to_string(), false),
        ]);
        assert_eq!(
            kind.to_string(),
            "Not supported by the compatibility matrix: MIT: true, Foo: false"
        );
    }

    #[test]
    fn test_parse_error_lists_ambiguities() {
        let err = NormalizerError::Parse {
            expression: "GNU (".to_string(),
            message: "unbalanced parenthesis".to_string(),
            ambiguities: vec!["GNU is ambiguous.".to_string()],
        };
        let display = err.to_string();
        assert!(display.contains("unbalanced parenthesis"));
        assert!(display.ends_with("Ambiguities: GNU is ambiguous."));
    }

    #[test]
    fn test_context_chaining_multiple_levels() {
        fn inner() -> Result<()> {
            Err(NormalizerError::load("base", LoadErrorKind::MissingId))
        }

        fn middle() -> Result<()> {
            inner().context("middle layer")
        }

        fn outer() -> Result<()> {
            middle().context("outer layer")
        }

        match outer() {
            Err(NormalizerError::Load { context, .. }) => {
                assert_eq!(context, "outer layer: middle layer: base");
            }
            _ => panic!("Expected Load error"),
        }
    }

    #[test]
    fn test_context_leaves_query_errors_untouched() {
        let err: Result<()> = Err(NormalizerError::InputType("number".to_string()));
        match err.context("normalizing") {
            Err(NormalizerError::InputType(found)) => assert_eq!(found, "number"),
            _ => panic!("Expected InputType error"),
        }
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let mut called = false;
        let ok_result: Result<i32> = Ok(42);
        let _ = ok_result.with_context(|| {
            called = true;
            "should not be called"
        });
        assert!(!called, "Closure should not be called for Ok result");
    }

    #[test]
    fn test_chain_context_helper() {
        assert_eq!(chain_context("new", ""), "new");
        assert_eq!(chain_context("new", "existing"), "new: existing");
    }
}
