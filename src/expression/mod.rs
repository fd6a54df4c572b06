//! Boolean license expression parsing.
//!
//! The normalizer does not interpret boolean structure itself. It hands the
//! fully rewritten text to an [`ExpressionParser`], which either prints a
//! canonical form or reports why the text is not a valid expression.
//!
//! [`SpdxExpressionParser`] is the default implementation: a small
//! precedence-aware grammar for printing, and the `spdx` crate's strict
//! parser for validation.

mod grammar;

use thiserror::Error;

/// Structural problem found while parsing an expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (at token {position})")]
pub struct ExpressionError {
    pub message: String,
    /// Index of the offending token
    pub position: usize,
}

impl ExpressionError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Parses and validates license expressions.
pub trait ExpressionParser: Send + Sync {
    /// Print `text` in canonical form.
    fn parse(&self, text: &str) -> Result<String, ExpressionError>;

    /// Structural errors in `text`; empty when the expression is valid.
    fn validate(&self, text: &str) -> Vec<String>;
}

/// Default [`ExpressionParser`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SpdxExpressionParser;

impl SpdxExpressionParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ExpressionParser for SpdxExpressionParser {
    fn parse(&self, text: &str) -> Result<String, ExpressionError> {
        grammar::parse(text).map(|node| node.to_string())
    }

    fn validate(&self, text: &str) -> Vec<String> {
        if let Err(err) = grammar::parse(text) {
            return vec![err.to_string()];
        }
        match spdx::Expression::parse_mode(text, spdx::ParseMode::STRICT) {
            Ok(_) => Vec::new(),
            Err(err) => vec![err.to_string()],
        }
    }
}

/// Whether `token` is an SPDX license identifier, spelled exactly.
#[must_use]
pub fn is_spdx_license_id(token: &str) -> bool {
    spdx::license_id(token).is_some_and(|id| id.name == token)
}

/// Whether `token` is an SPDX exception identifier, spelled exactly.
#[must_use]
pub fn is_spdx_exception_id(token: &str) -> bool {
    spdx::exception_id(token).is_some_and(|id| id.name == token)
}
