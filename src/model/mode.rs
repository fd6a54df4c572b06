//! Validation mode definitions.

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A check the canonical expression must pass
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    ValueEnum,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Every license token is a single word
    Relaxed,
    /// Every license token is an SPDX identifier or an exception
    Spdx,
    /// The expression passes the parser's structural validation
    Scancode,
    /// Every token is supported by the compatibility matrix
    Osadl,
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relaxed => write!(f, "relaxed"),
            Self::Spdx => write!(f, "spdx"),
            Self::Scancode => write!(f, "scancode"),
            Self::Osadl => write!(f, "osadl"),
        }
    }
}

/// Set of requested validation modes.
///
/// Ordered so that two sets with the same members always hash the same,
/// which makes the set usable as part of a cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationModes(BTreeSet<ValidationMode>);

impl ValidationModes {
    /// No validation
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Add a mode
    #[must_use]
    pub fn with(mut self, mode: ValidationMode) -> Self {
        self.0.insert(mode);
        self
    }

    /// Whether a mode was requested
    #[must_use]
    pub fn contains(&self, mode: ValidationMode) -> bool {
        self.0.contains(&mode)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in a fixed order
    pub fn iter(&self) -> impl Iterator<Item = ValidationMode> + '_ {
        self.0.iter().copied()
    }
}

impl From<ValidationMode> for ValidationModes {
    fn from(mode: ValidationMode) -> Self {
        Self::none().with(mode)
    }
}

impl FromIterator<ValidationMode> for ValidationModes {
    fn from_iter<I: IntoIterator<Item = ValidationMode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[ValidationMode; N]> for ValidationModes {
    fn from(modes: [ValidationMode; N]) -> Self {
        modes.into_iter().collect()
    }
}

impl fmt::Display for ValidationModes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|m| m.to_string()).collect();
        write!(f, "{}", names.join(","))
    }
}
