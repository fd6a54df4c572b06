//! Compatibility-as substitution and matrix support checks.

use super::validation::license_tokens;
use crate::matrix::CompatibilityMatrix;
use crate::model::IdentificationEvent;
use crate::rewrite::NeedleTable;
use indexmap::IndexMap;

/// A canonical expression mapped onto compatibility targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityResolution {
    pub compat_license: String,
    pub compatibilities: Vec<IdentificationEvent>,
    /// Matrix support per token, in order of first appearance
    pub support: IndexMap<String, bool>,
    pub supported: bool,
}

/// Substitute compatibility targets in `expression` and check each token.
///
/// A `X WITH Y` clause is checked as a whole. An expression without any
/// token is not supported.
pub fn resolve(
    expression: &str,
    needles: &NeedleTable,
    matrix: &dyn CompatibilityMatrix,
) -> CompatibilityResolution {
    let rewrite = needles.rewrite(expression);
    let support = support_table(&rewrite.text, matrix);
    let supported = !support.is_empty() && support.values().all(|ok| *ok);

    CompatibilityResolution {
        compat_license: rewrite.text,
        compatibilities: rewrite.identifications,
        support,
        supported,
    }
}

/// Matrix support of every token in `expression`.
pub fn support_table(expression: &str, matrix: &dyn CompatibilityMatrix) -> IndexMap<String, bool> {
    license_tokens(expression, false)
        .into_iter()
        .map(|token| {
            let supported = matrix.is_supported(&token);
            (token, supported)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::DefinitionTables;
    use crate::matrix::OsadlMatrix;
    use crate::model::IdentificationMethod;
    use crate::rewrite::NeedleCategory;

    fn resolve_builtin(expression: &str) -> CompatibilityResolution {
        let tables = DefinitionTables::builtin().unwrap();
        let needles = NeedleTable::compile(tables.compat_map(), NeedleCategory::Compatibility);
        let matrix = OsadlMatrix::builtin().unwrap();
        resolve(expression, &needles, &matrix)
    }

    #[test]
    fn test_substitution() {
        let result = resolve_builtin("x11-keith-packard");
        assert_eq!(result.compat_license, "HPND");
        assert_eq!(result.compatibilities.len(), 1);
        assert_eq!(result.compatibilities[0].queried_name, "x11-keith-packard");
        assert_eq!(
            result.compatibilities[0].identified_via,
            IdentificationMethod::Compat
        );
        assert!(result.supported);
    }

    #[test]
    fn test_with_clause_is_one_token() {
        let result = resolve_builtin("GPL-2.0-only WITH Classpath-exception-2.0 OR MIT");
        assert_eq!(result.support.len(), 2);
        assert_eq!(
            result.support.get("GPL-2.0-only WITH Classpath-exception-2.0"),
            Some(&true)
        );
        assert!(result.supported);
    }

    #[test]
    fn test_one_unsupported_token_fails_all() {
        let result = resolve_builtin("MIT AND GNU");
        assert_eq!(result.support.get("MIT"), Some(&true));
        assert_eq!(result.support.get("GNU"), Some(&false));
        assert!(!result.supported);
    }

    #[test]
    fn test_empty_expression_is_unsupported() {
        let result = resolve_builtin("");
        assert!(result.support.is_empty());
        assert!(!result.supported);
    }
}
