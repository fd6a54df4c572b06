//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::NormalizerConfig;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".license-normalizer.yaml",
    ".license-normalizer.yml",
    "license-normalizer.yaml",
    "license-normalizer.yml",
];

/// Directory name under the user config directory
pub const CONFIG_DIR_NAME: &str = "license-normalizer";

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/license-normalizer/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    // 1. Use explicit path if provided
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    // 2. Search current directory
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(path) = find_config_in_dir(&cwd) {
            return Some(path);
        }
    }

    // 3. Search git root (if in a repo)
    if let Some(git_root) = find_git_root() {
        if let Some(path) = find_config_in_dir(&git_root) {
            return Some(path);
        }
    }

    // 4. Search user config directory
    if let Some(config_dir) = dirs::config_dir() {
        if let Some(path) = find_config_in_dir(&config_dir.join(CONFIG_DIR_NAME)) {
            return Some(path);
        }
    }

    // 5. Search home directory
    dirs::home_dir().and_then(|home| find_config_in_dir(&home))
}

/// Directories searched by [`discover_config_file`], in order.
#[must_use]
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    paths.extend(std::env::current_dir().ok());
    paths.extend(find_git_root());
    paths.extend(dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME)));
    paths.extend(dirs::home_dir());
    paths.dedup();
    paths
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();

    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigFileError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err)
    }
}

/// Load a `NormalizerConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<NormalizerConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: NormalizerConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (NormalizerConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (NormalizerConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => {
                tracing::debug!("Loaded config from {}", path.display());
                (config, Some(path))
            }
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (NormalizerConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Command-line overrides
// ============================================================================

/// Values given on the command line; unset fields keep the file's value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub matrix_file: Option<PathBuf>,
    pub no_dual: bool,
    pub validations: Vec<crate::model::ValidationMode>,
    pub format: Option<super::types::OutputFormat>,
    pub pretty: bool,
    pub output_file: Option<PathBuf>,
}

impl NormalizerConfig {
    /// Apply command-line overrides on top of this config.
    pub fn merge(&mut self, overrides: &ConfigOverrides) {
        if overrides.data_dir.is_some() {
            self.definitions.data_dir.clone_from(&overrides.data_dir);
        }
        if overrides.matrix_file.is_some() {
            self.matrix.file.clone_from(&overrides.matrix_file);
        }
        if overrides.no_dual {
            self.normalize.expand_dual = false;
        }
        if !overrides.validations.is_empty() {
            self.normalize.validations.clone_from(&overrides.validations);
        }
        if let Some(format) = overrides.format {
            self.output.format = format;
        }
        if overrides.pretty {
            self.output.pretty = true;
        }
        if overrides.output_file.is_some() {
            self.output.file.clone_from(&overrides.output_file);
        }
    }

    /// Load from file and merge with CLI overrides.
    #[must_use]
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> (Self, Option<PathBuf>) {
        let (mut config, loaded_from) = load_or_default(config_path);
        config.merge(overrides);
        (config, loaded_from)
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r"# license-normalizer configuration
# ===============================
#
# Place this file at:
#   - .license-normalizer.yaml in your project root
#   - ~/.config/license-normalizer/license-normalizer.yaml for global config
#
# CLI arguments always override file settings.

# License definitions
definitions:
  # Directory with licenses/, compounds/, operators.json, ambiguities.json
  # and duals.json. The bundled definitions are used when unset.
  data_dir: null

# Compatibility matrix
matrix:
  # OSADL matrix JSON file. The bundled matrix is used when unset.
  file: null

# Query defaults
normalize:
  # Expand -or-later licenses into explicit OR groups
  expand_dual: true
  # Validation modes: relaxed, spdx, scancode, osadl
  validations: []

# Output
output:
  # Format: text, json
  format: text
  pretty: false
  # file: results.json
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
