//! Integration tests for license-normalizer
//!
//! These tests drive the public query API end to end: table loading,
//! normalization, validation modes, compatibility resolution and caching.

use license_normalizer::{
    DefinitionTables, IdentificationMethod, LicenseNormalizer, NormalizerError, OsadlMatrix,
    ValidationErrorKind, ValidationMode, ValidationModes,
};
use std::path::Path;

fn normalizer() -> LicenseNormalizer {
    LicenseNormalizer::builtin().expect("builtin definitions load")
}

fn none() -> ValidationModes {
    ValidationModes::none()
}

/// Display of an error and every source below it
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn write_json(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).expect("write definition file");
}

// ============================================================================
// Normalization
// ============================================================================

mod normalize_tests {
    use super::*;

    #[test]
    fn test_alias_resolution() {
        let result = normalizer().normalize("BSD3", &none(), true).unwrap();
        assert_eq!(result.identified_license, "BSD-3-Clause");
        assert!(result
            .identifications
            .iter()
            .any(|event| event.queried_name == "BSD3"
                && event.identified_via == IdentificationMethod::Alias));
    }

    #[test]
    fn test_operator_and_dual_expansion() {
        let result = normalizer()
            .normalize("GPLv2+ || BSD3", &none(), true)
            .unwrap();
        assert_eq!(
            result.identified_license,
            "(GPL-2.0-only OR GPL-3.0-only) OR BSD-3-Clause"
        );
        assert_eq!(result.dual_expansions.len(), 1);
        assert_eq!(result.dual_expansions[0].dual_license, "GPL-2.0-or-later");
    }

    #[test]
    fn test_dual_expansion_toggle() {
        let normalizer = normalizer();
        let kept = normalizer
            .normalize("GPL-2.0-or-later", &none(), false)
            .unwrap();
        assert_eq!(kept.identified_license, "GPL-2.0-or-later");
        assert!(kept.dual_expansions.is_empty());

        let expanded = normalizer
            .normalize("GPL-2.0-or-later", &none(), true)
            .unwrap();
        assert_eq!(expanded.identified_license, "GPL-2.0-only OR GPL-3.0-only");
    }

    #[test]
    fn test_ambiguity_is_reported_not_resolved() {
        let result = normalizer().normalize("GNU", &none(), true).unwrap();
        assert!(result.is_ambiguous());
        let finding = &result.ambiguities[0];
        assert_eq!(finding.ambiguous_license, "GNU");
        assert!(!finding.problem.is_empty());
        assert!(finding.description.contains(&finding.problem));
        assert!(result.identified_license.contains("GNU"));
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        let result = normalizer()
            .normalize("  MIT \t and   Apache-2.0 ", &none(), true)
            .unwrap();
        assert_eq!(result.identified_license, "MIT AND Apache-2.0");
    }

    #[test]
    fn test_unparsable_text_is_kept_as_fallback() {
        let result = normalizer()
            .normalize("BSD 3 Clause", &none(), true)
            .unwrap();
        assert!(!result.is_parsed());
        assert_eq!(result.identified_license, "BSD 3 Clause");
        assert!(result.parse_failure.is_some());
    }

    #[test]
    fn test_deeply_nested_expression_fails_cleanly() {
        let normalizer = normalizer();
        let nested = format!("{}MIT{}", "(".repeat(10_000), ")".repeat(10_000));

        let result = normalizer.normalize(&nested, &none(), true).unwrap();
        assert!(!result.is_parsed());
        let failure = result.parse_failure.as_deref().unwrap();
        assert!(failure.contains("nested too deeply"), "{failure}");

        let scancode: ValidationModes = [ValidationMode::Scancode].into_iter().collect();
        assert!(normalizer.normalize(&nested, &scancode, true).is_err());

        let results = normalizer.normalize_batch(&[nested.as_str(), "BSD3"], &none(), true);
        assert!(results[0].is_ok());
        assert_eq!(results[1].as_ref().unwrap().identified_license, "BSD-3-Clause");
    }

    #[test]
    fn test_dual_before_trailing_operator_keeps_tokens() {
        let normalizer = normalizer();
        let result = normalizer.normalize("GPLv2+ &&", &none(), true).unwrap();
        assert_eq!(
            result.identified_license,
            "(GPL-2.0-only OR GPL-3.0-only) AND"
        );
        assert!(result.parse_failure.is_some());

        let result = normalizer
            .normalize("MIT OR GPL-2.0-or-later AND", &none(), true)
            .unwrap();
        assert_eq!(
            result.identified_license,
            "MIT OR (GPL-2.0-only OR GPL-3.0-only) AND"
        );
        assert_eq!(result.dual_expansions.len(), 1);
    }

    #[test]
    fn test_idempotence_on_canonical_expressions() {
        let normalizer = normalizer();
        for expression in [
            "MIT",
            "MIT AND Apache-2.0",
            "(MIT OR ISC) AND Zlib",
            "MIT OR BSD-2-Clause AND BSD-3-Clause",
            "GPL-2.0-only WITH Classpath-exception-2.0",
            "Apache-2.0 WITH LLVM-exception OR MIT",
        ] {
            let first = normalizer.normalize(expression, &none(), true).unwrap();
            let second = normalizer
                .normalize(&first.identified_license, &none(), true)
                .unwrap();
            assert_eq!(
                first.identified_license, second.identified_license,
                "not idempotent for {expression}"
            );
        }
    }

    #[test]
    fn test_non_string_input_is_rejected() {
        let normalizer = normalizer();
        let err = normalizer
            .normalize_value(&serde_json::json!(42), &none(), true)
            .unwrap_err();
        assert!(matches!(err, NormalizerError::InputType(ref kind) if kind == "number"));
        assert!(err.is_recoverable());

        let ok = normalizer
            .normalize_value(&serde_json::json!("BSD3"), &none(), true)
            .unwrap();
        assert_eq!(ok.identified_license, "BSD-3-Clause");
    }
}

// ============================================================================
// Validation Modes
// ============================================================================

mod validation_tests {
    use super::*;

    #[test]
    fn test_relaxed_names_the_multi_word_token() {
        let err = normalizer()
            .normalize("BSD 3 Clause", &ValidationMode::Relaxed.into(), true)
            .unwrap_err();
        match err {
            NormalizerError::Validation {
                expression,
                source: ValidationErrorKind::MultiWordToken(token),
            } => {
                assert_eq!(expression, "BSD 3 Clause");
                assert_eq!(token, "BSD 3 Clause");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_spdx_rejects_non_spdx_ids() {
        let normalizer = normalizer();
        let strict = ValidationModes::from(ValidationMode::Spdx);
        assert!(normalizer.normalize("MIT OR Apache-2.0", &strict, true).is_ok());

        let err = normalizer
            .normalize("x11-keith-packard", &strict, true)
            .unwrap_err();
        assert!(matches!(
            err,
            NormalizerError::Validation {
                source: ValidationErrorKind::NonSpdxTokens(ref tokens),
                ..
            } if tokens == &["x11-keith-packard".to_string()]
        ));
    }

    #[test]
    fn test_parse_failure_raised_when_modes_requested() {
        let err = normalizer()
            .normalize("MIT OR", &ValidationMode::Scancode.into(), true)
            .unwrap_err();
        assert!(matches!(err, NormalizerError::Parse { .. }), "{err}");
    }

    #[test]
    fn test_osadl_fails_with_support_table() {
        let err = normalizer()
            .normalize("MIT AND Artistic-2.0", &ValidationMode::Osadl.into(), true)
            .unwrap_err();
        match err {
            NormalizerError::Validation {
                source: ValidationErrorKind::UnsupportedByMatrix(table),
                ..
            } => {
                assert!(table.contains(&("MIT".to_string(), true)));
                assert!(table.contains(&("Artistic-2.0".to_string(), false)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_all_selected_modes_must_pass() {
        let modes: ValidationModes = [ValidationMode::Relaxed, ValidationMode::Spdx]
            .into_iter()
            .collect();
        let normalizer = normalizer();
        assert!(normalizer.normalize("BSD3 AND MIT", &modes, true).is_ok());
        assert!(normalizer.normalize("x11-keith-packard", &modes, true).is_err());
    }
}

// ============================================================================
// Compatibility
// ============================================================================

mod compatibility_tests {
    use super::*;

    #[test]
    fn test_compatibility_mapping() {
        let result = normalizer()
            .resolve_compatibility("x11-keith-packard", &none(), true)
            .unwrap();
        assert_eq!(result.identified_license(), "x11-keith-packard");
        assert_eq!(result.compat_license, "HPND");
        assert!(result.supported);
    }

    #[test]
    fn test_single_unsupported_token_fails_expression() {
        let result = normalizer()
            .resolve_compatibility("MIT AND Artistic-2.0", &none(), true)
            .unwrap();
        assert!(!result.supported);
        assert_eq!(result.unsupported().collect::<Vec<_>>(), vec!["Artistic-2.0"]);
    }

    #[test]
    fn test_custom_matrix() {
        let normalizer = normalizer().with_matrix(OsadlMatrix::from_licenses(["WTFPL"]));
        let result = normalizer
            .resolve_compatibility("WTFPL", &none(), true)
            .unwrap();
        assert!(result.supported);
        let result = normalizer.resolve_compatibility("MIT", &none(), true).unwrap();
        assert!(!result.supported);
    }
}

// ============================================================================
// Caching
// ============================================================================

mod cache_tests {
    use super::*;

    #[test]
    fn test_dual_flag_never_shares_an_entry() {
        let normalizer = normalizer();
        let expanded = normalizer.normalize("GPLv2+", &none(), true).unwrap();
        let kept = normalizer.normalize("GPLv2+", &none(), false).unwrap();
        assert_ne!(expanded.identified_license, kept.identified_license);

        let stats = normalizer.cache_stats();
        assert_eq!(stats.normalize.cache_size, 2);
        assert_eq!(stats.normalize.cache_hits, 0);
    }

    #[test]
    fn test_identical_keys_hit_the_cache() {
        let normalizer = normalizer();
        let first = normalizer.normalize("BSD3 or MIT", &none(), true).unwrap();
        let second = normalizer.normalize("BSD3 or MIT", &none(), true).unwrap();
        assert_eq!(first, second);
        assert_eq!(normalizer.cache_stats().normalize.cache_hits, 1);
    }

    #[test]
    fn test_failed_queries_are_not_cached() {
        let normalizer = normalizer();
        let relaxed = ValidationModes::from(ValidationMode::Relaxed);
        assert!(normalizer.normalize("BSD 3 Clause", &relaxed, true).is_err());
        assert!(normalizer.normalize("BSD 3 Clause", &relaxed, true).is_err());

        let stats = normalizer.cache_stats();
        assert_eq!(stats.normalize.cache_size, 0);
        assert_eq!(stats.normalize.cache_misses, 2);
    }

    #[test]
    fn test_batch_keeps_input_order() {
        let results = normalizer().normalize_batch(&["BSD3", "MIT OR", "GPLv3"], &none(), true);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().identified_license, "BSD-3-Clause");
        assert!(!results[1].as_ref().unwrap().is_parsed());
        assert_eq!(results[2].as_ref().unwrap().identified_license, "GPL-3.0-only");
    }
}

// ============================================================================
// Definition Loading
// ============================================================================

mod loading_tests {
    use super::*;

    #[test]
    fn test_from_dir_with_record_files() {
        let tmp = tempfile::tempdir().unwrap();
        let licenses = tmp.path().join("licenses");
        std::fs::create_dir(&licenses).unwrap();
        write_json(
            &licenses,
            "MIT.json",
            r#"{"spdxid": "MIT", "aliases": ["Expat"], "scancode_key": "mit"}"#,
        );
        write_json(
            tmp.path(),
            "operators.json",
            r#"{"operators": {"&&": "AND", "||": "OR"}}"#,
        );

        let tables = DefinitionTables::from_dir(tmp.path()).unwrap();
        let normalizer =
            LicenseNormalizer::new(tables, OsadlMatrix::from_licenses(["MIT"]));
        let result = normalizer.normalize("Expat && mit", &none(), false).unwrap();
        assert_eq!(result.identified_license, "MIT AND MIT");
    }

    #[test]
    fn test_duplicate_alias_names_both_ids() {
        let tmp = tempfile::tempdir().unwrap();
        write_json(
            tmp.path(),
            "licenses.json",
            r#"{"licenses": [
                {"spdxid": "BSD-2-Clause", "aliases": ["BSD"]},
                {"spdxid": "BSD-3-Clause", "aliases": ["BSD"]}
            ]}"#,
        );

        let err = DefinitionTables::from_dir(tmp.path()).unwrap_err();
        assert!(!err.is_recoverable());
        let message = error_chain(&err);
        assert!(message.contains("BSD-2-Clause"), "{message}");
        assert!(message.contains("BSD-3-Clause"), "{message}");
    }

    #[test]
    fn test_malformed_json_fails_to_load() {
        let tmp = tempfile::tempdir().unwrap();
        write_json(tmp.path(), "licenses.json", "{\"licenses\": [");
        assert!(DefinitionTables::from_dir(tmp.path()).is_err());
    }

    #[test]
    fn test_missing_dir_fails_to_load() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(DefinitionTables::from_dir(tmp.path().join("absent")).is_err());
    }
}
