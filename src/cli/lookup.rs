//! Table lookup command handlers: `identify`, `licenses`, `aliases`,
//! `operators`.

use super::output::{exit_codes, to_json, write_output, OutputTarget};
use super::query::QueryOutcome;
use crate::config::{NormalizerConfig, OutputFormat};
use crate::definitions::{DefinitionTables, LicenseLookup};
use anyhow::{Context, Result};

fn load_tables(config: &NormalizerConfig) -> Result<DefinitionTables> {
    let tables = match &config.definitions.data_dir {
        Some(dir) => DefinitionTables::from_dir(dir),
        None => DefinitionTables::builtin(),
    };
    tables.context("Failed to load license definitions")
}

fn emit(config: &NormalizerConfig, content: &str) -> Result<()> {
    write_output(content, &OutputTarget::from_option(config.output.file.clone()))
}

/// Run the identify command.
pub fn run_identify(config: &NormalizerConfig, names: &[String]) -> Result<i32> {
    let tables = load_tables(config)?;
    let outcomes: Vec<QueryOutcome<LicenseLookup<'_>>> = names
        .iter()
        .map(|name| match tables.license(name) {
            Ok(lookup) => QueryOutcome::Ok(lookup),
            Err(err) => QueryOutcome::Failed {
                queried_license: name.clone(),
                error: err.to_string(),
            },
        })
        .collect();

    let content = match config.output.format {
        OutputFormat::Json => to_json(&outcomes, &config.output)?,
        OutputFormat::Text => outcomes
            .iter()
            .map(|outcome| match outcome {
                QueryOutcome::Ok(lookup) => format!(
                    "{} -> {} (via {})",
                    lookup.identified_element.queried_name,
                    lookup.identified_element.name,
                    lookup.identified_element.identified_via
                ),
                QueryOutcome::Failed { error, .. } => format!("error: {error}"),
            })
            .collect::<Vec<_>>()
            .join("\n"),
    };
    emit(config, &content)?;

    let failed = outcomes
        .iter()
        .any(|outcome| matches!(outcome, QueryOutcome::Failed { .. }));
    Ok(if failed {
        exit_codes::QUERY_FAILED
    } else {
        exit_codes::SUCCESS
    })
}

/// Run the licenses command: every canonical id, then compound ids.
pub fn run_licenses(config: &NormalizerConfig) -> Result<()> {
    let tables = load_tables(config)?;
    let mut ids: Vec<&str> = tables.licenses().collect();
    ids.extend(tables.compounds().map(|record| record.id.as_str()));

    let content = match config.output.format {
        OutputFormat::Json => to_json(&ids, &config.output)?,
        OutputFormat::Text => ids.join("\n"),
    };
    emit(config, &content)
}

/// Run the aliases command, optionally restricted to ids containing `filter`.
pub fn run_aliases(config: &NormalizerConfig, filter: Option<&str>) -> Result<()> {
    let tables = load_tables(config)?;
    let aliases = tables.aliases_list(filter);

    let content = match config.output.format {
        OutputFormat::Json => to_json(&aliases, &config.output)?,
        OutputFormat::Text => aliases
            .iter()
            .map(|(alias, id)| format!("{alias} -> {id}"))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    emit(config, &content)
}

/// Run the operators command.
pub fn run_operators(config: &NormalizerConfig) -> Result<()> {
    let tables = load_tables(config)?;
    let operators = tables.operators();

    let content = match config.output.format {
        OutputFormat::Json => to_json(operators, &config.output)?,
        OutputFormat::Text => operators
            .iter()
            .map(|(spelling, op)| format!("{spelling:>4} -> {op}"))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    emit(config, &content)
}
