//! Definition file loading.
//!
//! Definitions live in a directory laid out as:
//!
//! ```text
//! licenses/*.json      one LicenseRecord per file, optional *.LICENSE text
//! compounds/*.json     one compound record per file
//! licenses.json        {"licenses": [...]}   (bundled form)
//! compounds.json       {"compounds": [...]}  (bundled form)
//! operators.json       {"operators": {"&": "AND", ...}}
//! ambiguities.json     {"ambiguities": [...]}
//! duals.json           {"duals": [...]}
//! ```
//!
//! Every file is optional; missing files contribute empty tables.

use super::{DefinitionSources, DefinitionTables};
use crate::error::{ErrorContext, NormalizerError, Result};
use crate::model::{AmbiguityEntry, DualLicenseEntry, LicenseRecord};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Directory of the bundled data set inside the source tree
pub const BUILTIN_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

const BUILTIN_LICENSES: &str = include_str!("../../data/licenses.json");
const BUILTIN_COMPOUNDS: &str = include_str!("../../data/compounds.json");
const BUILTIN_OPERATORS: &str = include_str!("../../data/operators.json");
const BUILTIN_AMBIGUITIES: &str = include_str!("../../data/ambiguities.json");
const BUILTIN_DUALS: &str = include_str!("../../data/duals.json");

#[derive(Debug, Default, Deserialize)]
struct LicensesFile {
    #[serde(default)]
    licenses: Vec<LicenseRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct CompoundsFile {
    #[serde(default)]
    compounds: Vec<LicenseRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct OperatorsFile {
    #[serde(default)]
    operators: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct AmbiguitiesFile {
    #[serde(default)]
    ambiguities: Vec<AmbiguityEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct DualsFile {
    #[serde(default)]
    duals: Vec<DualLicenseEntry>,
}

/// Paths of the definition files inside a data directory.
#[derive(Debug, Clone)]
pub struct DefinitionFiles {
    root: PathBuf,
}

impl DefinitionFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read every definition file into raw records
    pub fn read(&self) -> Result<DefinitionSources> {
        if !self.root.is_dir() {
            return Err(NormalizerError::io(
                &self.root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }
        tracing::debug!("Reading license definitions from {}", self.root.display());

        let mut licenses = read_record_dir(&self.root.join("licenses"))?;
        licenses.extend(
            read_optional::<LicensesFile>(&self.root.join("licenses.json"))?.licenses,
        );

        let mut compounds = read_record_dir(&self.root.join("compounds"))?;
        compounds.extend(
            read_optional::<CompoundsFile>(&self.root.join("compounds.json"))?.compounds,
        );

        Ok(DefinitionSources {
            licenses,
            compounds,
            operators: read_optional::<OperatorsFile>(&self.root.join("operators.json"))?
                .operators,
            ambiguities: read_optional::<AmbiguitiesFile>(&self.root.join("ambiguities.json"))?
                .ambiguities,
            duals: read_optional::<DualsFile>(&self.root.join("duals.json"))?.duals,
        })
    }
}

impl DefinitionTables {
    /// Build tables from the data set compiled into the crate.
    pub fn builtin() -> Result<Self> {
        let sources = DefinitionSources {
            licenses: parse_json::<LicensesFile>(BUILTIN_LICENSES, "builtin licenses.json")?
                .licenses,
            compounds: parse_json::<CompoundsFile>(BUILTIN_COMPOUNDS, "builtin compounds.json")?
                .compounds,
            operators: parse_json::<OperatorsFile>(BUILTIN_OPERATORS, "builtin operators.json")?
                .operators,
            ambiguities: parse_json::<AmbiguitiesFile>(
                BUILTIN_AMBIGUITIES,
                "builtin ambiguities.json",
            )?
            .ambiguities,
            duals: parse_json::<DualsFile>(BUILTIN_DUALS, "builtin duals.json")?.duals,
        };
        Self::build(sources)
    }

    /// Build tables from a definition directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let files = DefinitionFiles::new(dir.as_ref());
        let sources = files.read()?;
        Self::build(sources).with_context(|| format!("loading {}", files.root().display()))
    }
}

fn parse_json<T: for<'de> Deserialize<'de>>(content: &str, origin: &str) -> Result<T> {
    serde_json::from_str(content).with_context(|| format!("parsing {origin}"))
}

fn read_optional<T: for<'de> Deserialize<'de> + Default>(path: &Path) -> Result<T> {
    if !path.is_file() {
        return Ok(T::default());
    }
    let content = std::fs::read_to_string(path).map_err(|e| NormalizerError::io(path, e))?;
    parse_json(&content, &path.display().to_string())
}

/// Read `*.json` records in a directory, sorted by file name.
fn read_record_dir(dir: &Path) -> Result<Vec<LicenseRecord>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| NormalizerError::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        tracing::debug!(" * {}", path.display());
        let content =
            std::fs::read_to_string(&path).map_err(|e| NormalizerError::io(&path, e))?;
        let mut record: LicenseRecord = parse_json(&content, &path.display().to_string())?;

        let text_path = path.with_extension("LICENSE");
        if text_path.is_file() {
            record.license_text = Some(
                std::fs::read_to_string(&text_path)
                    .map_err(|e| NormalizerError::io(&text_path, e))?,
            );
        }
        records.push(record);
    }
    Ok(records)
}
