//! Detection of tokens that cannot be resolved without more context.

use crate::definitions::DefinitionTables;
use crate::model::AmbiguityFinding;
use crate::rewrite::NeedleTable;

/// Report every ambiguous token in `expression`.
///
/// `needles` is the compiled ambiguity index. A trigger alias that only
/// occurs inside a longer trigger's match is not reported again. The
/// expression itself is left alone.
pub fn detect(
    expression: &str,
    needles: &NeedleTable,
    tables: &DefinitionTables,
) -> Vec<AmbiguityFinding> {
    needles
        .matches(expression)
        .into_iter()
        .filter_map(|(alias, id)| {
            let entry = tables.ambiguity(id)?;
            Some(AmbiguityFinding {
                license_expression: expression.to_string(),
                ambiguous_license: entry.id.clone(),
                problem: entry.problem.clone(),
                description: describe(alias, &entry.id, expression, &entry.problem),
            })
        })
        .collect()
}

fn describe(alias: &str, id: &str, expression: &str, problem: &str) -> String {
    if alias == id {
        format!("The license \"{id}\" in \"{expression}\" is ambiguous: {problem}")
    } else {
        format!(
            "The license \"{alias}\" (identified as \"{id}\") in \"{expression}\" is ambiguous: {problem}"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::NeedleCategory;

    fn detect_builtin(expression: &str) -> Vec<AmbiguityFinding> {
        let tables = DefinitionTables::builtin().unwrap();
        let needles = NeedleTable::compile(tables.ambiguity_index(), NeedleCategory::Ambiguities);
        detect(expression, &needles, &tables)
    }

    #[test]
    fn test_single_ambiguous_id() {
        let findings = detect_builtin("GNU");
        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.ambiguous_license, "GNU");
        assert_eq!(finding.license_expression, "GNU");
        assert!(finding.problem.contains("not a license"));
        assert!(finding.description.contains("\"GNU\""));
        assert!(finding.description.contains(&finding.problem));
    }

    #[test]
    fn test_alias_trigger_masks_shorter_id() {
        let findings = detect_builtin("GNU license OR MIT");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].description.contains("\"GNU license\""));
        assert!(findings[0].description.contains("identified as \"GNU\""));
    }

    #[test]
    fn test_all_matches_are_reported() {
        let findings = detect_builtin("BSD OR GPL");
        let ids: Vec<&str> = findings
            .iter()
            .map(|f| f.ambiguous_license.as_str())
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"BSD"));
        assert!(ids.contains(&"GPL"));
    }

    #[test]
    fn test_canonical_ids_are_not_ambiguous() {
        assert!(detect_builtin("GPL-2.0-only OR BSD-3-Clause").is_empty());
        assert!(detect_builtin("LGPL-2.1-or-later").is_empty());
    }
}
