//! Reading requirements and constraints files
//!
//! Both readers share one line filter: after trimming, a line is considered
//! only if it is non-empty and starts with an alphabetic character. That skips
//! comments, blank lines and pip options such as `--index-url` or `-r`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{FileKind, ImportError, Result};
use crate::requirement::{canonical_name, parse_requirement, DependencyRecord};

/// Version pins read from a constraints file, keyed by canonical name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintMap {
    pins: BTreeMap<String, String>,
}

impl ConstraintMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the pin for `name`.
    pub fn insert(&mut self, name: &str, version: impl Into<String>) {
        self.pins.insert(canonical_name(name), version.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pins.get(&canonical_name(name)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pins.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overwrite the record's version with its pin, unless the record is
    /// pinned to a URL or VCS checkout. Returns whether the record changed.
    pub fn apply(&self, record: &mut DependencyRecord) -> bool {
        let Some(version) = self.get(&record.name) else {
            return false;
        };
        if record.is_pinned() {
            log::debug!("constraint for {} ignored: dependency is URL pinned", record.name);
            return false;
        }
        record.version = Some(version.to_string());
        true
    }
}

fn is_requirement_line(line: &str) -> bool {
    line.trim()
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic())
}

/// Parse every requirement line of one file, in file order.
fn read_records(path: &Path, kind: FileKind) -> Result<Vec<DependencyRecord>> {
    if !path.is_file() {
        return Err(ImportError::not_found(kind, path));
    }
    let content = fs::read_to_string(path).map_err(|e| ImportError::io(path, e))?;

    let mut records = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if !is_requirement_line(line) {
            continue;
        }
        let parsed = parse_requirement(line).map_err(|source| ImportError::Parse {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        match parsed {
            Some(record) if !record.is_empty() => records.push(record),
            _ => {}
        }
    }
    Ok(records)
}

/// Read requirements files in order and apply constraints.
///
/// # Errors
/// [`ImportError::NotFound`] if a path is not an existing regular file,
/// [`ImportError::Parse`] for the first line the parser rejects.
pub fn read_requirements<P: AsRef<Path>>(
    paths: &[P],
    constraints: &ConstraintMap,
) -> Result<Vec<DependencyRecord>> {
    let mut records = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let mut file_records = read_records(path, FileKind::Requirements)?;
        for record in &mut file_records {
            constraints.apply(record);
        }
        log::debug!("read {} requirement(s) from {}", file_records.len(), path.display());
        records.extend(file_records);
    }
    Ok(records)
}

/// Read a constraints file. No path means no constraints.
pub fn read_constraints(path: Option<&Path>) -> Result<ConstraintMap> {
    let mut constraints = ConstraintMap::new();
    let Some(path) = path else {
        return Ok(constraints);
    };

    for record in read_records(path, FileKind::Constraints)? {
        match record.version {
            Some(version) => constraints.insert(&record.name, version),
            None => log::warn!(
                "constraint `{}` in {} has no version, ignoring it",
                record.name,
                path.display()
            ),
        }
    }
    log::debug!("read {} constraint(s) from {}", constraints.len(), path.display());
    Ok(constraints)
}
