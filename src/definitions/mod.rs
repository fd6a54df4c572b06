//! Immutable license definition tables.
//!
//! [`DefinitionTables`] indexes licenses, compound records, operators,
//! ambiguities and dual licenses once at construction. Every lookup the
//! normalizer performs afterwards is a read against these tables.
//!
//! # Example
//!
//! ```
//! use license_normalizer::definitions::DefinitionTables;
//!
//! let tables = DefinitionTables::builtin().unwrap();
//! let event = tables.identify("BSD3").unwrap();
//! assert_eq!(event.name, "BSD-3-Clause");
//! ```

mod loader;

pub use loader::{DefinitionFiles, BUILTIN_DATA_DIR};

use crate::error::{LoadErrorKind, NormalizerError, Result};
use crate::model::{
    AmbiguityEntry, DualLicenseEntry, IdentificationEvent, IdentificationMethod, LicenseRecord,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion
const SUGGESTION_THRESHOLD: f64 = 0.85;

/// Raw records the tables are built from.
#[derive(Debug, Clone, Default)]
pub struct DefinitionSources {
    pub licenses: Vec<LicenseRecord>,
    pub compounds: Vec<LicenseRecord>,
    /// Operator spelling to canonical operator
    pub operators: BTreeMap<String, String>,
    pub ambiguities: Vec<AmbiguityEntry>,
    pub duals: Vec<DualLicenseEntry>,
}

/// What a single name resolved to.
#[derive(Debug, Clone, Serialize)]
pub struct LicenseLookup<'a> {
    pub identified_element: IdentificationEvent,
    /// The record, absent for operators
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<&'a LicenseRecord>,
}

impl LicenseLookup<'_> {
    /// Whether the name was an operator spelling
    #[must_use]
    pub fn is_operator(&self) -> bool {
        self.identified_element.identified_via == IdentificationMethod::Operator
    }
}

/// Compatibility-as declaration of one license
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatibilityAs {
    pub spdxid: String,
    pub compatibility_as: String,
}

/// Indexed, read-only definition tables.
#[derive(Debug, Clone)]
pub struct DefinitionTables {
    licenses: BTreeMap<String, LicenseRecord>,
    compounds: BTreeMap<String, LicenseRecord>,
    aliases: BTreeMap<String, String>,
    scancode_keys: BTreeMap<String, String>,
    compats: BTreeMap<String, String>,
    operators: BTreeMap<String, String>,
    ambiguities: BTreeMap<String, AmbiguityEntry>,
    /// Trigger alias to ambiguous id; ids map to themselves
    ambiguity_aliases: BTreeMap<String, String>,
    duals: HashMap<String, DualLicenseEntry>,
}

impl DefinitionTables {
    /// Index the given records.
    ///
    /// Fails when two records share an alias, when an id is defined twice,
    /// or when a dual-license entry names an unknown license.
    pub fn build(sources: DefinitionSources) -> Result<Self> {
        let mut tables = Self {
            licenses: BTreeMap::new(),
            compounds: BTreeMap::new(),
            aliases: BTreeMap::new(),
            scancode_keys: BTreeMap::new(),
            compats: BTreeMap::new(),
            operators: sources.operators,
            ambiguities: BTreeMap::new(),
            ambiguity_aliases: BTreeMap::new(),
            duals: HashMap::new(),
        };

        for record in sources.licenses {
            tables.insert_record(record, false)?;
        }
        for record in sources.compounds {
            tables.insert_record(record, true)?;
        }
        tables.check_alias_collisions()?;

        for entry in sources.ambiguities {
            tables
                .ambiguity_aliases
                .insert(entry.id.clone(), entry.id.clone());
            for alias in &entry.aliases {
                tables
                    .ambiguity_aliases
                    .insert(alias.clone(), entry.id.clone());
            }
            tables.ambiguities.insert(entry.id.clone(), entry);
        }

        for entry in sources.duals {
            if !tables.contains_id(&entry.id) {
                return Err(NormalizerError::load(
                    "building dual license table",
                    LoadErrorKind::UnknownReference {
                        id: entry.id,
                        table: "duals".to_string(),
                    },
                ));
            }
            tables.duals.insert(entry.id.clone(), entry);
        }

        tracing::info!(
            "Loaded {} licenses, {} compounds, {} aliases, {} operators, {} ambiguities, {} dual licenses",
            tables.licenses.len(),
            tables.compounds.len(),
            tables.aliases.len(),
            tables.operators.len(),
            tables.ambiguities.len(),
            tables.duals.len()
        );

        Ok(tables)
    }

    fn insert_record(&mut self, record: LicenseRecord, compound: bool) -> Result<()> {
        if record.id.trim().is_empty() {
            return Err(NormalizerError::load(
                "building license table",
                LoadErrorKind::MissingId,
            ));
        }
        if self.contains_id(&record.id) {
            return Err(NormalizerError::load(
                "building license table",
                LoadErrorKind::DuplicateId(record.id),
            ));
        }

        for alias in &record.aliases {
            if alias == &record.id {
                continue;
            }
            if let Some(existing) = self.aliases.get(alias) {
                return Err(NormalizerError::duplicate_alias(
                    alias.as_str(),
                    record.id.as_str(),
                    existing.as_str(),
                ));
            }
            self.aliases.insert(alias.clone(), record.id.clone());
        }

        if let Some(key) = &record.scancode_key {
            if let Some(existing) = self.scancode_keys.get(key) {
                tracing::warn!(
                    "Scancode key \"{key}\" of {} already maps to {existing}, keeping the first",
                    record.id
                );
            } else if key != &record.id {
                self.scancode_keys.insert(key.clone(), record.id.clone());
            }
        }

        if let Some(compat) = &record.compatibility_as {
            self.compats.insert(record.id.clone(), compat.clone());
        }

        if compound {
            self.compounds.insert(record.id.clone(), record);
        } else {
            self.licenses.insert(record.id.clone(), record);
        }
        Ok(())
    }

    /// An alias spelled exactly like another record's id would be rewritten
    /// on every pass, so it counts as a collision.
    fn check_alias_collisions(&self) -> Result<()> {
        for (alias, id) in &self.aliases {
            if self.contains_id(alias) {
                return Err(NormalizerError::duplicate_alias(
                    alias.as_str(),
                    id.as_str(),
                    alias.as_str(),
                ));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Needle tables used by the rewriter
    // ------------------------------------------------------------------------

    /// Alias to canonical id, licenses and compounds combined
    #[must_use]
    pub fn alias_map(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    #[must_use]
    pub fn scancode_map(&self) -> &BTreeMap<String, String> {
        &self.scancode_keys
    }

    /// Canonical id to compatibility target
    #[must_use]
    pub fn compat_map(&self) -> &BTreeMap<String, String> {
        &self.compats
    }

    #[must_use]
    pub fn operator_map(&self) -> &BTreeMap<String, String> {
        &self.operators
    }

    /// Ambiguity trigger alias to ambiguous id
    #[must_use]
    pub fn ambiguity_index(&self) -> &BTreeMap<String, String> {
        &self.ambiguity_aliases
    }

    /// Ambiguity entry by its id
    #[must_use]
    pub fn ambiguity(&self, id: &str) -> Option<&AmbiguityEntry> {
        self.ambiguities.get(id)
    }

    /// Dual-license entry for an id
    #[must_use]
    pub fn dual(&self, id: &str) -> Option<&DualLicenseEntry> {
        self.duals.get(id)
    }

    // ------------------------------------------------------------------------
    // Single-name lookups
    // ------------------------------------------------------------------------

    /// Whether `id` is a canonical license or compound id
    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.licenses.contains_key(id) || self.compounds.contains_key(id)
    }

    fn record(&self, id: &str) -> Option<&LicenseRecord> {
        self.licenses.get(id).or_else(|| self.compounds.get(id))
    }

    /// Resolve one name: canonical id, then operator, alias and scancode key.
    pub fn identify(&self, name: &str) -> Result<IdentificationEvent> {
        let (resolved, method) = if self.contains_id(name) {
            (name.to_string(), IdentificationMethod::Direct)
        } else if let Some(op) = self.operators.get(name) {
            (op.clone(), IdentificationMethod::Operator)
        } else if let Some(id) = self.aliases.get(name) {
            (id.clone(), IdentificationMethod::Alias)
        } else if let Some(id) = self.scancode_keys.get(name) {
            (id.clone(), IdentificationMethod::ScancodeKey)
        } else {
            return Err(NormalizerError::UnidentifiedToken {
                token: name.to_string(),
                suggestion: self.suggest(name),
            });
        };
        Ok(IdentificationEvent::new(name, resolved, method))
    }

    /// Closest known id or alias, if any is close enough
    fn suggest(&self, name: &str) -> Option<String> {
        let lower = name.to_lowercase();
        self.licenses
            .keys()
            .chain(self.compounds.keys())
            .chain(self.aliases.keys())
            .map(|candidate| (candidate, strsim::jaro_winkler(&lower, &candidate.to_lowercase())))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(candidate, _)| {
                self.aliases
                    .get(candidate)
                    .cloned()
                    .unwrap_or_else(|| candidate.clone())
            })
    }

    /// Resolve a name and return the record behind it.
    pub fn license(&self, name: &str) -> Result<LicenseLookup<'_>> {
        let identified_element = self.identify(name)?;
        let license = if identified_element.identified_via == IdentificationMethod::Operator {
            None
        } else {
            self.record(&identified_element.name)
        };
        Ok(LicenseLookup {
            identified_element,
            license,
        })
    }

    /// The full record for a name; operators are not records.
    pub fn license_complete(&self, name: &str) -> Result<&LicenseRecord> {
        let identified = self.identify(name)?;
        self.record(&identified.name)
            .ok_or_else(|| NormalizerError::UnidentifiedToken {
                token: name.to_string(),
                suggestion: None,
            })
    }

    /// All canonical license ids, sorted
    pub fn licenses(&self) -> impl Iterator<Item = &str> {
        self.licenses.keys().map(String::as_str)
    }

    /// All compound records, sorted by id
    pub fn compounds(&self) -> impl Iterator<Item = &LicenseRecord> {
        self.compounds.values()
    }

    /// Aliases of the license a name resolves to
    pub fn aliases(&self, name: &str) -> Result<&[String]> {
        Ok(&self.license_complete(name)?.aliases)
    }

    /// Alias table, optionally restricted to ids containing `filter`
    #[must_use]
    pub fn aliases_list(&self, filter: Option<&str>) -> BTreeMap<&str, &str> {
        self.aliases
            .iter()
            .filter(|(_, id)| filter.map_or(true, |f| id.contains(f)))
            .map(|(alias, id)| (alias.as_str(), id.as_str()))
            .collect()
    }

    #[must_use]
    pub fn operators(&self) -> &BTreeMap<String, String> {
        &self.operators
    }

    /// Every license declaring a compatibility-as target
    #[must_use]
    pub fn compatibility_as_list(&self) -> Vec<CompatibilityAs> {
        self.compats
            .iter()
            .map(|(id, compat)| CompatibilityAs {
                spdxid: id.clone(),
                compatibility_as: compat.clone(),
            })
            .collect()
    }

    /// All ambiguity entries, sorted by id
    pub fn ambiguities(&self) -> impl Iterator<Item = &AmbiguityEntry> {
        self.ambiguities.values()
    }

    /// All dual-license entries, sorted by id
    #[must_use]
    pub fn dual_licenses(&self) -> Vec<&DualLicenseEntry> {
        let mut duals: Vec<&DualLicenseEntry> = self.duals.values().collect();
        duals.sort_by(|a, b| a.id.cmp(&b.id));
        duals
    }
}
