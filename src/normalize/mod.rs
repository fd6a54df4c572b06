//! The normalization engine.
//!
//! [`LicenseNormalizer`] runs the rewrite passes in a fixed order:
//!
//! 1. collapse whitespace
//! 2. aliases
//! 3. scancode keys
//! 4. ambiguity scan (reports only)
//! 5. operators
//! 6. dual-license expansion (optional)
//! 7. expression parser
//! 8. validation modes
//!
//! Compatibility resolution chains after step 8. Results of both entry
//! points are memoized per (expression, modes, expand_dual).
//!
//! # Example
//!
//! ```
//! use license_normalizer::{LicenseNormalizer, ValidationModes};
//!
//! let normalizer = LicenseNormalizer::builtin().unwrap();
//! let result = normalizer
//!     .normalize("GPLv2+ || BSD3", &ValidationModes::none(), true)
//!     .unwrap();
//! assert_eq!(
//!     result.identified_license,
//!     "(GPL-2.0-only OR GPL-3.0-only) OR BSD-3-Clause"
//! );
//! ```

pub mod ambiguity;
mod cache;
pub mod compat;
pub mod dual;
pub mod validation;

pub use cache::{CacheStats, QueryCache, QueryKey};

use crate::config::{NormalizerConfig, Validatable};
use crate::definitions::DefinitionTables;
use crate::error::{NormalizerError, Result, ValidationErrorKind};
use crate::expression::{ExpressionParser, SpdxExpressionParser};
use crate::matrix::{CompatibilityMatrix, MatrixSource, OsadlMatrix};
use crate::model::{
    CompatibilityResult, IdentificationEvent, NormalizationResult, ValidationMode, ValidationModes,
};
use crate::rewrite::{collapse_whitespace, NeedleCache, NeedleCategory};
use compat::CompatibilityResolution;
use rayon::prelude::*;
use serde::Serialize;

/// Statistics of both result caches.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizerCacheStats {
    pub normalize: CacheStats,
    pub compatibility: CacheStats,
    /// Needle categories compiled so far
    pub compiled_needle_tables: usize,
}

/// Normalizes license expressions against a set of definition tables.
///
/// The engine is `Send + Sync`; share it by reference across threads.
pub struct LicenseNormalizer {
    tables: DefinitionTables,
    parser: Box<dyn ExpressionParser>,
    matrix: Box<dyn CompatibilityMatrix>,
    needles: NeedleCache,
    normalized: QueryCache<NormalizationResult>,
    compatibility: QueryCache<CompatibilityResult>,
}

impl std::fmt::Debug for LicenseNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicenseNormalizer")
            .field("tables", &self.tables)
            .field("needles", &self.needles)
            .finish_non_exhaustive()
    }
}

impl LicenseNormalizer {
    /// Create an engine with the default expression parser.
    pub fn new(tables: DefinitionTables, matrix: impl CompatibilityMatrix + 'static) -> Self {
        Self {
            tables,
            parser: Box::new(SpdxExpressionParser::new()),
            matrix: Box::new(matrix),
            needles: NeedleCache::new(),
            normalized: QueryCache::new(),
            compatibility: QueryCache::new(),
        }
    }

    /// Engine over the bundled definitions and matrix.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(DefinitionTables::builtin()?, OsadlMatrix::builtin()?))
    }

    /// Engine over the definitions and matrix named by `config`.
    pub fn from_config(config: &NormalizerConfig) -> Result<Self> {
        config.ensure_valid()?;
        let tables = match &config.definitions.data_dir {
            Some(dir) => DefinitionTables::from_dir(dir)?,
            None => DefinitionTables::builtin()?,
        };
        let source = config
            .matrix
            .file
            .clone()
            .map_or(MatrixSource::Builtin, MatrixSource::File);
        Ok(Self::new(tables, OsadlMatrix::load(&source)?))
    }

    /// Replace the expression parser.
    #[must_use]
    pub fn with_parser(mut self, parser: impl ExpressionParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self.clear_caches();
        self
    }

    /// Replace the compatibility matrix.
    #[must_use]
    pub fn with_matrix(mut self, matrix: impl CompatibilityMatrix + 'static) -> Self {
        self.matrix = Box::new(matrix);
        self.clear_caches();
        self
    }

    /// The definition tables, for single-name lookups and listings
    #[must_use]
    pub fn tables(&self) -> &DefinitionTables {
        &self.tables
    }

    /// Resolve one name through the lookup tables.
    pub fn identify(&self, name: &str) -> Result<IdentificationEvent> {
        self.tables.identify(name)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Normalize `expression` and check it against `modes`.
    ///
    /// A parser failure is not an error on its own: the result then carries
    /// the rewritten text and a parse-failure note. With modes requested the
    /// failure is raised, after any token-level mode that fails on the
    /// rewritten text.
    pub fn normalize(
        &self,
        expression: &str,
        modes: &ValidationModes,
        expand_dual: bool,
    ) -> Result<NormalizationResult> {
        let key = QueryKey::new(expression, modes, expand_dual);
        self.normalized
            .get_or_try_insert(key, || self.run_normalize(expression, modes, expand_dual))
    }

    /// Normalize `expression`, then map it onto the compatibility matrix.
    pub fn resolve_compatibility(
        &self,
        expression: &str,
        modes: &ValidationModes,
        expand_dual: bool,
    ) -> Result<CompatibilityResult> {
        let key = QueryKey::new(expression, modes, expand_dual);
        self.compatibility.get_or_try_insert(key, || {
            let normalization = self.normalize(expression, modes, expand_dual)?;
            let resolution = self.resolve(&normalization.identified_license);
            Ok(CompatibilityResult {
                normalization,
                compat_license: resolution.compat_license,
                compatibilities: resolution.compatibilities,
                support: resolution.support,
                supported: resolution.supported,
            })
        })
    }

    /// Normalize a loosely typed value, e.g. a field of scanner JSON output.
    pub fn normalize_value(
        &self,
        value: &serde_json::Value,
        modes: &ValidationModes,
        expand_dual: bool,
    ) -> Result<NormalizationResult> {
        match value {
            serde_json::Value::String(expression) => self.normalize(expression, modes, expand_dual),
            other => Err(NormalizerError::InputType(json_type_name(other).to_string())),
        }
    }

    /// Normalize many expressions in parallel. Results keep input order.
    pub fn normalize_batch<S>(
        &self,
        expressions: &[S],
        modes: &ValidationModes,
        expand_dual: bool,
    ) -> Vec<Result<NormalizationResult>>
    where
        S: AsRef<str> + Sync,
    {
        expressions
            .par_iter()
            .map(|expression| self.normalize(expression.as_ref(), modes, expand_dual))
            .collect()
    }

    #[must_use]
    pub fn cache_stats(&self) -> NormalizerCacheStats {
        NormalizerCacheStats {
            normalize: self.normalized.stats(),
            compatibility: self.compatibility.stats(),
            compiled_needle_tables: self.needles.compiled_count(),
        }
    }

    /// Drop every memoized result. Compiled needle tables are kept.
    pub fn clear_caches(&self) {
        self.normalized.clear();
        self.compatibility.clear();
    }

    // ------------------------------------------------------------------------
    // Pipeline
    // ------------------------------------------------------------------------

    fn run_normalize(
        &self,
        expression: &str,
        modes: &ValidationModes,
        expand_dual: bool,
    ) -> Result<NormalizationResult> {
        let mut identifications = Vec::new();

        let text = collapse_whitespace(expression);
        let text = self.rewrite(NeedleCategory::Aliases, &text, &mut identifications);
        let text = self.rewrite(NeedleCategory::ScancodeKeys, &text, &mut identifications);

        let ambiguity_needles = self.needles.get(NeedleCategory::Ambiguities, &self.tables);
        let ambiguities = ambiguity::detect(&text, &ambiguity_needles, &self.tables);
        if !ambiguities.is_empty() {
            tracing::debug!("{} ambiguous token(s) in \"{}\"", ambiguities.len(), text);
        }

        let text = self.rewrite(NeedleCategory::Operators, &text, &mut identifications);

        let (text, dual_expansions) = if expand_dual {
            let expansion = dual::expand(&text, &self.tables);
            identifications.extend(expansion.identifications);
            (expansion.text, expansion.expansions)
        } else {
            (text, Vec::new())
        };

        let mut result = NormalizationResult {
            queried_license: expression.to_string(),
            identified_license: String::new(),
            identifications,
            ambiguities,
            dual_expansions,
            parse_failure: None,
        };

        match self.parser.parse(&text) {
            Ok(parsed) => {
                tracing::debug!("Normalized \"{}\" to \"{}\"", expression, parsed);
                result.identified_license = parsed;
                self.validate(expression, &result.identified_license, modes, true)?;
            }
            Err(err) => {
                tracing::warn!("Could not parse \"{}\": {}", text, err);
                if !modes.is_empty() {
                    self.validate(expression, &text, modes, false)?;
                    return Err(NormalizerError::Parse {
                        expression: expression.to_string(),
                        message: err.to_string(),
                        ambiguities: result
                            .ambiguities
                            .iter()
                            .map(|finding| finding.description.clone())
                            .collect(),
                    });
                }
                result.identified_license = text;
                result.parse_failure = Some(err.to_string());
            }
        }

        Ok(result)
    }

    fn rewrite(
        &self,
        category: NeedleCategory,
        text: &str,
        identifications: &mut Vec<IdentificationEvent>,
    ) -> String {
        let table = self.needles.get(category, &self.tables);
        let rewrite = table.rewrite(text);
        if !rewrite.identifications.is_empty() {
            tracing::debug!(
                "{:?} pass: {} replacement(s), now \"{}\"",
                category,
                rewrite.identifications.len(),
                rewrite.text
            );
        }
        identifications.extend(rewrite.identifications);
        rewrite.text
    }

    /// Map a canonical expression onto compatibility targets.
    ///
    /// The substituted text is printed by the parser when it parses, so
    /// padding left by the rewriter does not leak into the result.
    fn resolve(&self, expression: &str) -> CompatibilityResolution {
        let needles = self.needles.get(NeedleCategory::Compatibility, &self.tables);
        let mut resolution = compat::resolve(expression, &needles, self.matrix.as_ref());
        if let Ok(printed) = self.parser.parse(&resolution.compat_license) {
            resolution.compat_license = printed;
        }
        resolution
    }

    /// Run the requested modes in order; the first failure is returned.
    ///
    /// With `parsed` unset only the token-level modes run, the structural
    /// check would repeat the parse error.
    fn validate(
        &self,
        expression: &str,
        text: &str,
        modes: &ValidationModes,
        parsed: bool,
    ) -> Result<()> {
        for mode in modes.iter() {
            let outcome: std::result::Result<(), ValidationErrorKind> = match mode {
                ValidationMode::Relaxed => validation::relaxed(text),
                ValidationMode::Spdx => validation::spdx(text),
                ValidationMode::Scancode if parsed => {
                    validation::scancode(text, self.parser.as_ref())
                }
                ValidationMode::Scancode => Ok(()),
                ValidationMode::Osadl => {
                    let resolution = self.resolve(text);
                    validation::osadl(&resolution.support, resolution.supported)
                }
            };
            if let Err(kind) = outcome {
                tracing::debug!("{} validation rejected \"{}\": {}", mode, text, kind);
                return Err(NormalizerError::validation(expression, kind));
            }
        }
        Ok(())
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
