//! Output handling for command results.

use crate::config::OutputConfig;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Exit codes used by the binary
pub mod exit_codes {
    /// Every query succeeded
    pub const SUCCESS: i32 = 0;
    /// At least one query failed
    pub const QUERY_FAILED: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 3;
}

/// Target for output - either stdout or a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write to stdout
    Stdout,
    /// Write to a file
    File(PathBuf),
}

impl OutputTarget {
    /// Create output target from optional path
    #[must_use]
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Stdout, Self::File)
    }
}

/// Write output to the target (file or stdout)
pub fn write_output(content: &str, target: &OutputTarget) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            println!("{content}");
            Ok(())
        }
        OutputTarget::File(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            tracing::info!("Output written to {}", path.display());
            Ok(())
        }
    }
}

/// Serialize `value` as JSON, indented when the config asks for it.
pub fn to_json<T: Serialize + ?Sized>(value: &T, output: &OutputConfig) -> Result<String> {
    let json = if output.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("Failed to serialize output")
}
