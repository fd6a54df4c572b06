//! Lazily compiled needle tables.

use super::{NeedleCategory, NeedleTable};
use crate::definitions::DefinitionTables;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Needle tables compiled on first use, one per category.
///
/// Compilation happens under the write lock after a second lookup, so
/// concurrent first users compile a category only once.
#[derive(Debug, Default)]
pub struct NeedleCache {
    compiled: RwLock<HashMap<NeedleCategory, Arc<NeedleTable>>>,
}

impl NeedleCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The compiled table for `category`, compiling it if needed.
    pub fn get(&self, category: NeedleCategory, tables: &DefinitionTables) -> Arc<NeedleTable> {
        if let Ok(compiled) = self.compiled.read() {
            if let Some(table) = compiled.get(&category) {
                return Arc::clone(table);
            }
        }

        let mut compiled = self
            .compiled
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let table = compiled.entry(category).or_insert_with(|| {
            let source = match category {
                NeedleCategory::Aliases => tables.alias_map(),
                NeedleCategory::ScancodeKeys => tables.scancode_map(),
                NeedleCategory::Ambiguities => tables.ambiguity_index(),
                NeedleCategory::Operators => tables.operator_map(),
                NeedleCategory::Compatibility => tables.compat_map(),
            };
            let table = NeedleTable::compile(source, category);
            tracing::debug!("Compiled {} needles for {:?}", table.len(), category);
            Arc::new(table)
        });
        Arc::clone(table)
    }

    /// Number of categories compiled so far
    #[must_use]
    pub fn compiled_count(&self) -> usize {
        self.compiled.read().map(|c| c.len()).unwrap_or(0)
    }
}
