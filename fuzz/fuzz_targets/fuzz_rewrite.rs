#![no_main]
use libfuzzer_sys::fuzz_target;
use license_normalizer::rewrite::{collapse_whitespace, NeedleCategory, NeedleTable};
use license_normalizer::DefinitionTables;
use std::sync::OnceLock;

static TABLES: OnceLock<(NeedleTable, NeedleTable)> = OnceLock::new();

/// Fuzz the token rewriter.
///
/// A second pass over the rewriter's own output must not change it. The
/// pipeline collapses whitespace before the first pass, so this does too.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let (aliases, operators) = TABLES.get_or_init(|| {
            let tables = DefinitionTables::builtin().expect("builtin definitions load");
            (
                NeedleTable::compile(tables.alias_map(), NeedleCategory::Aliases),
                NeedleTable::compile(tables.operator_map(), NeedleCategory::Operators),
            )
        });
        let s = collapse_whitespace(s);
        for table in [aliases, operators] {
            let once = table.rewrite(&s);
            let twice = table.rewrite(&once.text);
            assert_eq!(once.text, twice.text);
        }
    }
});
