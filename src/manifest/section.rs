//! Dependency sections and how records are written into them
//!
//! Which section a group lands in depends only on the dialect and whether the
//! group is `root`:
//!
//! | dialect | group  | section                                 | kind  |
//! |---------|--------|-----------------------------------------|-------|
//! | v1      | root   | `tool.poetry.dependencies`              | table |
//! | v2      | root   | `project.dependencies`                  | array |
//! | any     | `name` | `tool.poetry.group.<name>.dependencies` | table |
//!
//! Sections are created only when there is something to write, so a run that
//! adds nothing leaves the document untouched.

use std::collections::HashSet;
use toml_edit::{Array, DocumentMut, Item, Table, TableLike, Value};

use super::dialect::Dialect;
use super::format::{array_entry, table_entry};
use crate::error::{ImportError, Result};
use crate::grouping::ROOT_GROUP;
use crate::requirement::{canonical_name, DependencyRecord};

/// Indentation used for entries of a newly created multi-line array.
const NEW_ARRAY_INDENT: &str = "\n    ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionTarget {
    /// A `name = spec` table: `tool.poetry.dependencies` when `group` is
    /// `None`, `tool.poetry.group.<group>.dependencies` otherwise
    PoetryTable { group: Option<String> },
    /// The PEP 621 `project.dependencies` string array
    ProjectArray,
}

impl SectionTarget {
    pub fn for_group(dialect: Dialect, group: &str) -> Self {
        match (dialect, group) {
            (Dialect::V1, ROOT_GROUP) => SectionTarget::PoetryTable { group: None },
            (Dialect::V2, ROOT_GROUP) => SectionTarget::ProjectArray,
            (_, name) => SectionTarget::PoetryTable {
                group: Some(name.to_string()),
            },
        }
    }

    /// Key path from the document root.
    pub fn key_path(&self) -> Vec<&str> {
        match self {
            SectionTarget::PoetryTable { group: None } => vec!["tool", "poetry", "dependencies"],
            SectionTarget::PoetryTable { group: Some(name) } => {
                vec!["tool", "poetry", "group", name.as_str(), "dependencies"]
            }
            SectionTarget::ProjectArray => vec!["project", "dependencies"],
        }
    }

    pub fn dotted(&self) -> String {
        self.key_path().join(".")
    }
}

/// What happened to one group's records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionWrite {
    pub added: Vec<String>,
    pub already_present: Vec<String>,
    pub missing_version: Vec<String>,
    /// The section did not exist and was added for these records
    pub created: bool,
}

/// Write `records` into the section `target` of `doc`.
pub fn write_section(
    doc: &mut DocumentMut,
    target: &SectionTarget,
    records: &[DependencyRecord],
) -> Result<SectionWrite> {
    match target {
        SectionTarget::PoetryTable { .. } => write_table(doc, target, records),
        SectionTarget::ProjectArray => write_array(doc, target, records),
    }
}

/// Sort records into new entries, names already present and names lacking a
/// version. `render` returns `None` when a record has no version.
fn plan<T>(
    records: &[DependencyRecord],
    existing: HashSet<String>,
    render: impl Fn(&DependencyRecord) -> Option<T>,
) -> (Vec<(String, T)>, SectionWrite) {
    let mut planned = Vec::new();
    let mut report = SectionWrite::default();
    let mut seen = HashSet::new();

    for record in records {
        if record.name.trim().is_empty() {
            continue;
        }
        let canonical = record.canonical_name();
        if existing.contains(&canonical) {
            report.already_present.push(record.name.clone());
            continue;
        }
        if !seen.insert(canonical.clone()) {
            log::debug!("duplicate requirement {} skipped", record.name);
            continue;
        }
        match render(record) {
            Some(entry) => {
                report.added.push(record.name.clone());
                planned.push((record.name.clone(), entry));
            }
            None => report.missing_version.push(record.name.clone()),
        }
    }
    (planned, report)
}

fn write_table(
    doc: &mut DocumentMut,
    target: &SectionTarget,
    records: &[DependencyRecord],
) -> Result<SectionWrite> {
    let path = target.key_path();
    let existing = match find_table_like(doc, &path)? {
        Some(table) => table.iter().map(|(key, _)| canonical_name(key)).collect(),
        None => HashSet::new(),
    };

    let (planned, mut report) = plan(records, existing, table_entry);
    if planned.is_empty() {
        return Ok(report);
    }

    report.created = find_table_like(doc, &path)?.is_none();
    let table = ensure_table_path(doc, &path)?;
    for (name, item) in planned {
        table.insert(&name, item);
    }
    Ok(report)
}

fn write_array(
    doc: &mut DocumentMut,
    target: &SectionTarget,
    records: &[DependencyRecord],
) -> Result<SectionWrite> {
    let path = target.key_path();
    let (parent_path, key) = path.split_at(path.len() - 1);
    let key = key[0];

    let existing = match find_table_like(doc, parent_path)?.and_then(|p| p.get(key)) {
        Some(item) => existing_array_names(item.as_array().ok_or_else(|| {
            ImportError::ManifestLayout {
                key: target.dotted(),
                expected: "an array",
            }
        })?),
        None => HashSet::new(),
    };

    let (planned, mut report) = plan(records, existing, array_entry);
    if planned.is_empty() {
        return Ok(report);
    }

    let parent = ensure_table_path(doc, parent_path)?;
    let created = !parent.contains_key(key);
    if created {
        log::info!("adding {} to switch the manifest to the Poetry v2 layout", target.dotted());
        parent.insert(key, Item::Value(Value::Array(Array::new())));
    }
    report.created = created;
    let array = parent
        .get_mut(key)
        .and_then(Item::as_array_mut)
        .ok_or_else(|| ImportError::ManifestLayout {
            key: target.dotted(),
            expected: "an array",
        })?;

    let indent = if created {
        Some(NEW_ARRAY_INDENT.to_string())
    } else {
        multiline_indent(array)
    };
    for (_, entry) in planned {
        match &indent {
            Some(prefix) => array.push_formatted(Value::from(entry).decorated(prefix.as_str(), "")),
            None => array.push(entry),
        }
    }
    if created {
        array.set_trailing("\n");
        array.set_trailing_comma(true);
    }
    Ok(report)
}

/// Canonical names of the string entries of a PEP 508 array.
fn existing_array_names(array: &Array) -> HashSet<String> {
    array
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|entry| {
            let entry = entry.trim();
            let end = entry
                .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
                .unwrap_or(entry.len());
            let name = &entry[..end];
            if name.is_empty() {
                None
            } else {
                Some(canonical_name(name))
            }
        })
        .collect()
}

/// Prefix of the last entry when the array is laid out one entry per line.
fn multiline_indent(array: &Array) -> Option<String> {
    let Some(last) = array.iter().last() else {
        let multiline = array.trailing().as_str().is_some_and(|t| t.contains('\n'));
        return multiline.then(|| NEW_ARRAY_INDENT.to_string());
    };
    let prefix = last.decor().prefix()?.as_str()?;
    if prefix.contains('\n') {
        Some(prefix.to_string())
    } else {
        None
    }
}

/// Walk `path` without creating anything.
fn find_table_like<'a>(doc: &'a DocumentMut, path: &[&str]) -> Result<Option<&'a dyn TableLike>> {
    let mut current: &dyn TableLike = doc.as_table();
    for (depth, key) in path.iter().enumerate() {
        match current.get(key) {
            None => return Ok(None),
            Some(item) => {
                current = item.as_table_like().ok_or_else(|| ImportError::ManifestLayout {
                    key: path[..=depth].join("."),
                    expected: "a table",
                })?;
            }
        }
    }
    Ok(Some(current))
}

/// Walk `path`, creating missing tables. Intermediate tables are implicit so
/// only the last one gets a `[header]`.
fn ensure_table_path<'a>(doc: &'a mut DocumentMut, path: &[&str]) -> Result<&'a mut dyn TableLike> {
    let mut current: &mut dyn TableLike = doc.as_table_mut();
    for (depth, key) in path.iter().enumerate() {
        if !current.contains_key(key) {
            let mut table = Table::new();
            table.set_implicit(depth + 1 < path.len());
            current.insert(key, Item::Table(table));
        }
        current = current
            .get_mut(key)
            .and_then(Item::as_table_like_mut)
            .ok_or_else(|| ImportError::ManifestLayout {
                key: path[..=depth].join("."),
                expected: "a table",
            })?;
    }
    Ok(current)
}
