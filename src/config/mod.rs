//! Configuration module for license-normalizer.
//!
//! This module provides:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Configuration File
//!
//! Place a `.license-normalizer.yaml` file in your project root or
//! `~/.config/license-normalizer/`:
//!
//! ```yaml
//! definitions:
//!   data_dir: ./license-data
//! normalize:
//!   expand_dual: false
//!   validations: [spdx]
//! ```

pub mod file;
mod types;
mod validation;

pub use file::{
    discover_config_file, generate_full_example_config, load_config_file, load_or_default,
    ConfigFileError, ConfigOverrides,
};
pub use types::{
    DefinitionsConfig, MatrixConfig, NormalizeConfig, NormalizerConfig, NormalizerConfigBuilder,
    OutputConfig, OutputFormat,
};
pub use validation::{ConfigError, Validatable};

/// Generate a JSON Schema for the `NormalizerConfig` configuration format.
///
/// This schema documents all configuration options that can be set in
/// `.license-normalizer.yaml` config files. It can be used by editors for
/// validation and autocompletion.
pub fn generate_json_schema() -> serde_json::Result<String> {
    let schema = schemars::schema_for!(NormalizerConfig);
    serde_json::to_string_pretty(&schema)
}
