//! Configuration validation for license-normalizer.
//!
//! Provides validation traits and implementations for all configuration types.

use super::types::{DefinitionsConfig, MatrixConfig, NormalizeConfig, NormalizerConfig, OutputConfig};
use crate::error::NormalizerError;
use std::collections::BTreeSet;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Fail with [`NormalizerError::Config`] listing every validation error.
    fn ensure_valid(&self) -> crate::Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            return Ok(());
        }
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        Err(NormalizerError::config(messages.join("; ")))
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for NormalizerConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.definitions.validate());
        errors.extend(self.matrix.validate());
        errors.extend(self.normalize.validate());
        errors.extend(self.output.validate());
        errors
    }
}

impl Validatable for DefinitionsConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(ref dir) = self.data_dir {
            if !dir.is_dir() {
                errors.push(ConfigError {
                    field: "definitions.data_dir".to_string(),
                    message: format!("Not a directory: {}", dir.display()),
                });
            }
        }
        errors
    }
}

impl Validatable for MatrixConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(ref file) = self.file {
            if !file.is_file() {
                errors.push(ConfigError {
                    field: "matrix.file".to_string(),
                    message: format!("Matrix file does not exist: {}", file.display()),
                });
            }
        }
        errors
    }
}

impl Validatable for NormalizeConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut seen = BTreeSet::new();
        for mode in &self.validations {
            if !seen.insert(*mode) {
                errors.push(ConfigError {
                    field: "normalize.validations".to_string(),
                    message: format!("Validation mode '{mode}' listed more than once"),
                });
            }
        }
        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        // Validate output file path if specified
        if let Some(ref file_path) = self.file {
            if let Some(parent) = file_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    errors.push(ConfigError {
                        field: "output.file".to_string(),
                        message: format!("Parent directory does not exist: {}", parent.display()),
                    });
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ValidationMode;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(NormalizerConfig::default().is_valid());
    }

    #[test]
    fn test_missing_paths() {
        let config = NormalizerConfig::builder()
            .data_dir("/nonexistent/licenses")
            .matrix_file("/nonexistent/matrix.json")
            .build();
        let errors = config.validate();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["definitions.data_dir", "matrix.file"]);
    }

    #[test]
    fn test_ensure_valid_reports_every_field() {
        assert!(NormalizerConfig::default().ensure_valid().is_ok());

        let config = NormalizerConfig::builder()
            .data_dir("/nonexistent/licenses")
            .matrix_file("/nonexistent/matrix.json")
            .build();
        let err = config.ensure_valid().unwrap_err();
        assert!(matches!(err, NormalizerError::Config(_)));
        let message = err.to_string();
        assert!(message.contains("definitions.data_dir"), "{message}");
        assert!(message.contains("; matrix.file"), "{message}");
    }

    #[test]
    fn test_existing_data_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let config = DefinitionsConfig {
            data_dir: Some(tmp.path().to_path_buf()),
        };
        assert!(config.is_valid());
    }

    #[test]
    fn test_duplicate_validation_mode() {
        let config = NormalizeConfig {
            expand_dual: true,
            validations: vec![ValidationMode::Spdx, ValidationMode::Spdx],
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("'spdx'"));
    }

    #[test]
    fn test_output_parent_missing() {
        let config = OutputConfig {
            file: Some(PathBuf::from("/nonexistent/dir/out.json")),
            ..OutputConfig::default()
        };
        assert!(!config.is_valid());
    }
}
