//! License compatibility matrix support.
//!
//! The compatibility resolver only needs to know which licenses a matrix
//! covers. [`OsadlMatrix`] reads that from a document in the OSADL matrix
//! JSON format:
//!
//! ```json
//! {
//!   "timestamp": "2024-05-16T12:00:00+00:00",
//!   "licenses": [
//!     {"name": "MIT", "compatibilities": [{"name": "Apache-2.0", "compatibility": "Yes"}]}
//!   ]
//! }
//! ```

use crate::error::{ErrorContext, NormalizerError, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const BUILTIN_MATRIX: &str = include_str!("../../data/osadl-matrix.json");

/// Answers which licenses a compatibility matrix supports.
pub trait CompatibilityMatrix: Send + Sync {
    /// Every license the matrix has an entry for
    fn supported_licenses(&self) -> &BTreeSet<String>;

    /// Whether the matrix has an entry for `license`
    fn is_supported(&self, license: &str) -> bool {
        self.supported_licenses().contains(license)
    }
}

/// Where to read a matrix from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MatrixSource {
    /// The matrix bundled with the crate
    #[default]
    Builtin,
    /// An OSADL matrix JSON file
    File(PathBuf),
}

#[derive(Debug, Deserialize)]
struct MatrixDocument {
    #[serde(default)]
    timestamp: Option<String>,
    licenses: Vec<MatrixEntry>,
}

#[derive(Debug, Deserialize)]
struct MatrixEntry {
    name: String,
}

/// Matrix backed by an OSADL-format document.
#[derive(Debug, Clone)]
pub struct OsadlMatrix {
    licenses: BTreeSet<String>,
    timestamp: Option<String>,
}

impl OsadlMatrix {
    /// Load the matrix from `source`.
    pub fn load(source: &MatrixSource) -> Result<Self> {
        match source {
            MatrixSource::Builtin => Self::from_json(BUILTIN_MATRIX).context("builtin matrix"),
            MatrixSource::File(path) => Self::from_file(path),
        }
    }

    /// The bundled matrix
    pub fn builtin() -> Result<Self> {
        Self::load(&MatrixSource::Builtin)
    }

    /// Read a matrix file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| NormalizerError::io(path, e))?;
        Self::from_json(&content).with_context(|| format!("reading {}", path.display()))
    }

    /// Parse a matrix document
    pub fn from_json(content: &str) -> Result<Self> {
        let document: MatrixDocument = serde_json::from_str(content)?;
        let licenses: BTreeSet<String> = document
            .licenses
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        tracing::debug!("Compatibility matrix covers {} licenses", licenses.len());
        Ok(Self {
            licenses,
            timestamp: document.timestamp,
        })
    }

    /// Build a matrix from a list of supported ids
    pub fn from_licenses<I, S>(licenses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            licenses: licenses.into_iter().map(Into::into).collect(),
            timestamp: None,
        }
    }

    /// Publication time of the matrix, when the document carries one
    #[must_use]
    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }
}

impl CompatibilityMatrix for OsadlMatrix {
    fn supported_licenses(&self) -> &BTreeSet<String> {
        &self.licenses
    }
}
