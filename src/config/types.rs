//! Configuration type definitions.

use crate::model::{ValidationMode, ValidationModes};
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Top-level configuration
// ============================================================================

/// Settings for building and querying a normalizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Where license definitions come from
    pub definitions: DefinitionsConfig,
    /// Compatibility matrix selection
    pub matrix: MatrixConfig,
    /// Query defaults
    pub normalize: NormalizeConfig,
    /// Output settings
    pub output: OutputConfig,
}

impl NormalizerConfig {
    /// Create a new builder for `NormalizerConfig`.
    #[must_use]
    pub fn builder() -> NormalizerConfigBuilder {
        NormalizerConfigBuilder::default()
    }
}

// ============================================================================
// Sections
// ============================================================================

/// Definition table source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DefinitionsConfig {
    /// Directory with `licenses/`, `compounds/` and the table files;
    /// the bundled definitions are used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

/// Compatibility matrix source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MatrixConfig {
    /// OSADL matrix JSON file; the bundled matrix is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Defaults applied to every query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Expand "-or-later" licenses into OR groups
    pub expand_dual: bool,
    /// Validation modes to run
    pub validations: Vec<ValidationMode>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            expand_dual: true,
            validations: Vec::new(),
        }
    }
}

impl NormalizeConfig {
    /// The configured validations as a set
    #[must_use]
    pub fn modes(&self) -> ValidationModes {
        self.validations.iter().copied().collect()
    }
}

/// How results are printed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Indent JSON output
    pub pretty: bool,
    /// Write output to this file instead of stdout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Output format for query results
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One short line per result
    #[default]
    Text,
    /// The full result object
    Json,
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`NormalizerConfig`].
#[derive(Debug, Default)]
#[must_use]
pub struct NormalizerConfigBuilder {
    config: NormalizerConfig,
}

impl NormalizerConfigBuilder {
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.definitions.data_dir = Some(dir.into());
        self
    }

    pub fn matrix_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.config.matrix.file = Some(file.into());
        self
    }

    pub const fn expand_dual(mut self, expand: bool) -> Self {
        self.config.normalize.expand_dual = expand;
        self
    }

    pub fn validation(mut self, mode: ValidationMode) -> Self {
        self.config.normalize.validations.push(mode);
        self
    }

    pub const fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output.format = format;
        self
    }

    #[must_use]
    pub fn build(self) -> NormalizerConfig {
        self.config
    }
}
