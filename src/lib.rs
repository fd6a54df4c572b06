//! **Normalize free-form license expressions into canonical SPDX expressions.**
//!
//! License information found in source headers, SBOMs and scanner output is
//! written in many ways: `BSD3`, `GPLv2+ || BSD3`, `Apache 2.0 with LLVM
//! exception`. `license-normalizer` rewrites such strings into canonical SPDX
//! expressions, reports tokens that cannot be resolved without more context,
//! expands "-or-later" licenses into explicit choices and maps the result onto
//! a license compatibility matrix.
//!
//! ## Core Concepts & Modules
//!
//! - **[`definitions`]**: the read-only [`DefinitionTables`]: licenses, aliases,
//!   scancode keys, operators, ambiguities, dual licenses and compounds, plus
//!   single-name lookups.
//! - **[`rewrite`]**: the boundary-aware, longest-match-first token rewriter
//!   that every substitution pass uses.
//! - **[`normalize`]**: the [`LicenseNormalizer`] engine: pass ordering,
//!   ambiguity detection, dual-license expansion, compatibility resolution,
//!   validation modes and result caches.
//! - **[`expression`]**: the [`ExpressionParser`] capability and its default
//!   implementation.
//! - **[`matrix`]**: the [`CompatibilityMatrix`] capability and the OSADL
//!   matrix loader.
//! - **[`config`]**: YAML configuration with discovery and validation.
//!
//! ## Getting Started
//!
//! ```
//! use license_normalizer::{LicenseNormalizer, ValidationMode, ValidationModes};
//!
//! let normalizer = LicenseNormalizer::builtin().unwrap();
//!
//! let result = normalizer.normalize("BSD3", &ValidationModes::none(), true).unwrap();
//! assert_eq!(result.identified_license, "BSD-3-Clause");
//!
//! let strict = ValidationModes::from(ValidationMode::Spdx);
//! assert!(normalizer.normalize("x11-keith-packard", &strict, true).is_err());
//!
//! let compat = normalizer
//!     .resolve_compatibility("x11-keith-packard", &ValidationModes::none(), true)
//!     .unwrap();
//! assert_eq!(compat.compat_license, "HPND");
//! ```
//!
//! ## Command-Line Interface (CLI)
//!
//! The `license-normalizer` binary wraps the library; run
//! `license-normalizer --help` for its subcommands.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
// Pedantic lints: allow categories that are design choices for this codebase
#![allow(
    // Hit rates are computed from usize counters
    clippy::cast_precision_loss,
    // Doc completeness: # Errors / # Panics sections are aspirational
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod cli;
pub mod config;
pub mod definitions;
pub mod error;
pub mod expression;
pub mod matrix;
pub mod model;
pub mod normalize;
pub mod rewrite;

// Re-export main types for convenience
pub use config::{ConfigError, NormalizerConfig, Validatable};
pub use definitions::{DefinitionSources, DefinitionTables};
pub use error::{ErrorContext, LoadErrorKind, NormalizerError, Result, ValidationErrorKind};
pub use expression::{ExpressionError, ExpressionParser, SpdxExpressionParser};
pub use matrix::{CompatibilityMatrix, MatrixSource, OsadlMatrix};
pub use model::{
    AmbiguityFinding, CompatibilityResult, DualExpansionEvent, IdentificationEvent,
    IdentificationMethod, NormalizationResult, ValidationMode, ValidationModes,
};
pub use normalize::{CacheStats, LicenseNormalizer, NormalizerCacheStats};
