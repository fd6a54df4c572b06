//! `normalize` and `compat` command handlers.

use super::output::{exit_codes, to_json, write_output, OutputTarget};
use crate::config::{NormalizerConfig, OutputFormat};
use crate::model::{CompatibilityResult, NormalizationResult};
use crate::normalize::LicenseNormalizer;
use crate::NormalizerError;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::BufRead;

/// One query and what became of it
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome<T> {
    Ok(T),
    Failed {
        queried_license: String,
        error: String,
    },
}

impl<T> QueryOutcome<T> {
    fn new(expression: &str, result: crate::Result<T>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(err) => Self::Failed {
                queried_license: expression.to_string(),
                error: err.to_string(),
            },
        }
    }

    const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Expressions from the arguments, or one per line from stdin when none
/// were given.
pub fn collect_expressions(args: Vec<String>) -> Result<Vec<String>> {
    if !args.is_empty() {
        return Ok(args);
    }
    let stdin = std::io::stdin();
    let mut expressions = Vec::new();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read expressions from stdin")?;
        if !line.trim().is_empty() {
            expressions.push(line);
        }
    }
    Ok(expressions)
}

/// Run the normalize command.
///
/// Returns the exit code: non-zero when any expression failed.
pub fn run_normalize(config: &NormalizerConfig, expressions: &[String]) -> Result<i32> {
    let normalizer =
        LicenseNormalizer::from_config(config).context("Failed to set up the normalizer")?;
    let modes = config.normalize.modes();
    tracing::debug!(
        "Normalizing {} expression(s), modes [{}], expand_dual={}",
        expressions.len(),
        modes,
        config.normalize.expand_dual
    );

    let outcomes: Vec<QueryOutcome<NormalizationResult>> = normalizer
        .normalize_batch(expressions, &modes, config.normalize.expand_dual)
        .into_iter()
        .zip(expressions)
        .map(|(result, expression)| QueryOutcome::new(expression, result))
        .collect();

    let content = match config.output.format {
        OutputFormat::Json => to_json(&outcomes, &config.output)?,
        OutputFormat::Text => outcomes
            .iter()
            .map(normalization_summary)
            .collect::<Vec<_>>()
            .join("\n"),
    };
    write_output(&content, &OutputTarget::from_option(config.output.file.clone()))?;

    Ok(exit_code(&outcomes))
}

/// Run the compat command.
pub fn run_compat(config: &NormalizerConfig, expressions: &[String]) -> Result<i32> {
    let normalizer =
        LicenseNormalizer::from_config(config).context("Failed to set up the normalizer")?;
    let modes = config.normalize.modes();

    let outcomes: Vec<QueryOutcome<CompatibilityResult>> = expressions
        .iter()
        .map(|expression| {
            let result =
                normalizer.resolve_compatibility(expression, &modes, config.normalize.expand_dual);
            QueryOutcome::new(expression, result)
        })
        .collect();

    let content = match config.output.format {
        OutputFormat::Json => to_json(&outcomes, &config.output)?,
        OutputFormat::Text => outcomes
            .iter()
            .map(compatibility_summary)
            .collect::<Vec<_>>()
            .join("\n"),
    };
    write_output(&content, &OutputTarget::from_option(config.output.file.clone()))?;

    Ok(exit_code(&outcomes))
}

fn exit_code<T>(outcomes: &[QueryOutcome<T>]) -> i32 {
    if outcomes.iter().any(QueryOutcome::is_failed) {
        exit_codes::QUERY_FAILED
    } else {
        exit_codes::SUCCESS
    }
}

fn normalization_summary(outcome: &QueryOutcome<NormalizationResult>) -> String {
    match outcome {
        QueryOutcome::Ok(result) => {
            let mut line = format!(
                "{} -> {}",
                result.queried_license, result.identified_license
            );
            if let Some(failure) = &result.parse_failure {
                line.push_str(&format!("\n  unparsed: {failure}"));
            }
            for finding in &result.ambiguities {
                line.push_str(&format!("\n  ambiguous: {}", finding.description));
            }
            line
        }
        QueryOutcome::Failed {
            queried_license,
            error,
        } => format!("{queried_license} -> error: {error}"),
    }
}

fn compatibility_summary(outcome: &QueryOutcome<CompatibilityResult>) -> String {
    match outcome {
        QueryOutcome::Ok(result) => {
            let unsupported: Vec<&str> = result.unsupported().collect();
            let status = if result.supported {
                "supported".to_string()
            } else {
                format!("unsupported: {}", unsupported.join(", "))
            };
            format!(
                "{} -> {} -> {} ({status})",
                result.normalization.queried_license,
                result.identified_license(),
                result.compat_license
            )
        }
        QueryOutcome::Failed {
            queried_license,
            error,
        } => format!("{queried_license} -> error: {error}"),
    }
}

/// Whether an error should map to the query-failure exit code
#[must_use]
pub fn is_query_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<NormalizerError>()
        .is_some_and(NormalizerError::is_recoverable)
}
