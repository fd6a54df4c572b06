//! Query results and the events collected while producing them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a token was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentificationMethod {
    /// Already a canonical id
    Direct,
    /// Known alias
    Alias,
    /// Operator spelling
    Operator,
    /// Scancode license key
    ScancodeKey,
    /// Compatibility-as substitution
    Compat,
    /// "-or-later" expansion
    Dual,
}

impl fmt::Display for IdentificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Alias => write!(f, "alias"),
            Self::Operator => write!(f, "operator"),
            Self::ScancodeKey => write!(f, "scancode_key"),
            Self::Compat => write!(f, "compat"),
            Self::Dual => write!(f, "dual"),
        }
    }
}

/// One resolved token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentificationEvent {
    /// The text that was looked up
    pub queried_name: String,
    /// What it resolved to
    pub name: String,
    pub identified_via: IdentificationMethod,
}

impl IdentificationEvent {
    pub fn new(
        queried_name: impl Into<String>,
        name: impl Into<String>,
        identified_via: IdentificationMethod,
    ) -> Self {
        Self {
            queried_name: queried_name.into(),
            name: name.into(),
            identified_via,
        }
    }
}

/// A known-ambiguous token found in an expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguityFinding {
    /// Expression as it looked when the token was found
    pub license_expression: String,
    /// Ambiguous id the token belongs to
    pub ambiguous_license: String,
    pub problem: String,
    /// Human readable summary
    pub description: String,
}

/// One "-or-later" fragment that was expanded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualExpansionEvent {
    pub original: String,
    pub dual_license: String,
    pub newer_versions: Vec<String>,
    pub expanded: String,
}

/// Result of normalizing one expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationResult {
    /// The expression as given
    pub queried_license: String,
    /// Canonical form
    pub identified_license: String,
    pub identifications: Vec<IdentificationEvent>,
    pub ambiguities: Vec<AmbiguityFinding>,
    pub dual_expansions: Vec<DualExpansionEvent>,
    /// Set when the parser rejected the rewritten text and
    /// `identified_license` holds the pre-parse fallback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_failure: Option<String>,
}

impl NormalizationResult {
    /// Whether any ambiguous token was found
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        !self.ambiguities.is_empty()
    }

    /// Whether the canonical form came from the parser
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        self.parse_failure.is_none()
    }
}

/// Result of resolving an expression against the compatibility matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityResult {
    #[serde(flatten)]
    pub normalization: NormalizationResult,
    /// Expression with compatibility-as substitutions applied
    pub compat_license: String,
    pub compatibilities: Vec<IdentificationEvent>,
    /// Matrix support per token, in expression order
    pub support: IndexMap<String, bool>,
    /// True when every token is supported
    pub supported: bool,
}

impl CompatibilityResult {
    /// Canonical form of the queried expression
    #[must_use]
    pub fn identified_license(&self) -> &str {
        &self.normalization.identified_license
    }

    /// Tokens the matrix does not know
    pub fn unsupported(&self) -> impl Iterator<Item = &str> {
        self.support
            .iter()
            .filter(|(_, supported)| !**supported)
            .map(|(token, _)| token.as_str())
    }
}
