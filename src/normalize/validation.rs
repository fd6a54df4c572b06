//! The four validation modes.
//!
//! Each check takes the canonical expression (or the pre-parse fallback)
//! and reports the offending part through [`ValidationErrorKind`].

use crate::error::ValidationErrorKind;
use crate::expression::{is_spdx_exception_id, is_spdx_license_id, ExpressionParser};
use indexmap::IndexMap;

/// Split an expression into license tokens.
///
/// Parentheses are ignored and words between two operators are joined back
/// with single spaces, so a multi-word name stays one token. With
/// `split_with` unset an `X WITH Y` clause is kept as one token.
pub fn license_tokens(expression: &str, split_with: bool) -> Vec<String> {
    let flattened = expression.replace(['(', ')'], " ");
    let mut tokens = Vec::new();
    let mut words: Vec<&str> = Vec::new();

    for word in flattened.split_whitespace() {
        let is_operator = matches!(word, "AND" | "OR") || (split_with && word == "WITH");
        if is_operator {
            if !words.is_empty() {
                tokens.push(words.join(" "));
                words.clear();
            }
        } else {
            words.push(word);
        }
    }
    if !words.is_empty() {
        tokens.push(words.join(" "));
    }
    tokens
}

/// RELAXED: every token is a single word.
pub fn relaxed(expression: &str) -> Result<(), ValidationErrorKind> {
    match license_tokens(expression, true)
        .into_iter()
        .find(|token| token.contains(' '))
    {
        Some(token) => Err(ValidationErrorKind::MultiWordToken(token)),
        None => Ok(()),
    }
}

/// SPDX: every token is an SPDX license or exception identifier.
pub fn spdx(expression: &str) -> Result<(), ValidationErrorKind> {
    let offending: Vec<String> = license_tokens(expression, true)
        .into_iter()
        .filter(|token| !is_spdx_token(token))
        .collect();
    if offending.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrorKind::NonSpdxTokens(offending))
    }
}

fn is_spdx_token(token: &str) -> bool {
    is_spdx_license_id(token)
        || is_spdx_exception_id(token)
        || token.to_lowercase().contains("exception")
}

/// SCANCODE: the parser finds no structural problem.
pub fn scancode(expression: &str, parser: &dyn ExpressionParser) -> Result<(), ValidationErrorKind> {
    let errors = parser.validate(expression);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrorKind::Scancode(errors))
    }
}

/// OSADL: the compatibility matrix supports every token.
pub fn osadl(support: &IndexMap<String, bool>, supported: bool) -> Result<(), ValidationErrorKind> {
    if supported {
        Ok(())
    } else {
        Err(ValidationErrorKind::UnsupportedByMatrix(
            support
                .iter()
                .map(|(token, ok)| (token.clone(), *ok))
                .collect(),
        ))
    }
}
