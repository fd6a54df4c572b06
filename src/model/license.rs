//! Definition records: licenses, compounds, ambiguities and dual licenses.
//!
//! These mirror the on-disk JSON definition files one-to-one so the loader
//! can deserialize them directly.

use serde::{Deserialize, Serialize};

/// A license (or compound) definition.
///
/// Compound records share this shape; they name a canonical expression such
/// as `GPL-2.0-only WITH Classpath-exception-2.0` instead of a single id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    /// Canonical identifier
    #[serde(rename = "spdxid")]
    pub id: String,
    /// Non-canonical spellings resolving to `id`
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Identifier used by the scancode scanner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scancode_key: Option<String>,
    /// Id to use when checking against a compatibility matrix
    #[serde(default, rename = "compatibility_as", skip_serializing_if = "Option::is_none")]
    pub compatibility_as: Option<String>,
    /// Full license text, not interpreted
    #[serde(default, skip_serializing)]
    pub license_text: Option<String>,
}

impl LicenseRecord {
    /// Create a record with no aliases
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            aliases: Vec::new(),
            scancode_key: None,
            compatibility_as: None,
            license_text: None,
        }
    }

    /// Add aliases
    #[must_use]
    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases
            .extend(aliases.iter().map(|alias| (*alias).to_string()));
        self
    }

    /// Set the scancode key
    #[must_use]
    pub fn with_scancode_key(mut self, key: impl Into<String>) -> Self {
        self.scancode_key = Some(key.into());
        self
    }

    /// Set the compatibility target
    #[must_use]
    pub fn with_compatibility_as(mut self, id: impl Into<String>) -> Self {
        self.compatibility_as = Some(id.into());
        self
    }
}

/// A token that cannot be resolved without more context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguityEntry {
    /// The ambiguous id
    #[serde(rename = "spdxid")]
    pub id: String,
    /// Why the token is ambiguous
    pub problem: String,
    /// Spellings that trigger the finding (the id always does)
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl AmbiguityEntry {
    /// Create a new entry
    pub fn new(id: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            problem: problem.into(),
            aliases: Vec::new(),
        }
    }

    /// Add trigger aliases
    #[must_use]
    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases
            .extend(aliases.iter().map(|alias| (*alias).to_string()));
        self
    }
}

/// An "-or-later" id and the explicit versions it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualLicenseEntry {
    /// The triggering id, e.g. `GPL-2.0-or-later`
    #[serde(rename = "spdxid")]
    pub id: String,
    /// Ids the expansion offers, in output order
    pub newer_versions: Vec<String>,
}

impl DualLicenseEntry {
    /// Create a new entry
    pub fn new(id: impl Into<String>, newer_versions: &[&str]) -> Self {
        Self {
            id: id.into(),
            newer_versions: newer_versions.iter().map(|v| (*v).to_string()).collect(),
        }
    }
}
