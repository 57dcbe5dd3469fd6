//! Merging dependency records into `pyproject.toml`
//!
//! The manifest is read once, edited in memory with `toml_edit` so that every
//! untouched byte survives, and written back at most once. Writing goes
//! through a temporary file in the manifest's directory followed by a rename,
//! so a failed run never leaves a half-written manifest behind.

pub mod dialect;
pub mod format;
pub mod section;

pub use dialect::{detect_dialect, Dialect, DialectChoice};
pub use section::{write_section, SectionTarget, SectionWrite};

use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use toml_edit::DocumentMut;

use crate::error::{FileKind, ImportError, Result};
use crate::grouping::ROOT_GROUP;
use crate::requirement::DependencyRecord;

/// Records read for one dependency group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecords {
    pub name: String,
    pub records: Vec<DependencyRecord>,
}

impl GroupRecords {
    pub fn new(name: impl Into<String>, records: Vec<DependencyRecord>) -> Self {
        GroupRecords {
            name: name.into(),
            records,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MergeRequest {
    pub manifest_path: PathBuf,
    pub groups: Vec<GroupRecords>,
    pub dialect: DialectChoice,
}

/// Result of merging one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupMerge {
    pub name: String,
    /// Dotted key of the section the group maps to
    pub section: String,
    pub added: Vec<String>,
    pub already_present: Vec<String>,
    /// The section was added to the manifest by this merge
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    pub dialect: Dialect,
    pub groups: Vec<GroupMerge>,
    /// Packages that were skipped because they carry no version
    pub missing_versions: Vec<String>,
    /// Whether the manifest file was rewritten
    pub written: bool,
}

impl MergeOutcome {
    pub fn added_count(&self) -> usize {
        self.groups.iter().map(|g| g.added.len()).sum()
    }
}

/// Read and parse the manifest, keeping the original text for comparison.
pub fn load_manifest(path: &Path) -> Result<(String, DocumentMut)> {
    if !path.is_file() {
        return Err(ImportError::not_found(FileKind::Manifest, path));
    }
    let text = fs::read_to_string(path).map_err(|e| ImportError::io(path, e))?;
    let doc = text
        .parse::<DocumentMut>()
        .map_err(|e| ImportError::InvalidManifest {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
    Ok((text, doc))
}

/// Apply every group to `doc` in order. Does not touch the filesystem.
///
/// Returns the per-group results and the de-duplicated names of packages
/// skipped for lack of a version.
pub fn merge_document(
    doc: &mut DocumentMut,
    dialect: Dialect,
    groups: &[GroupRecords],
) -> Result<(Vec<GroupMerge>, Vec<String>)> {
    let mut merged = Vec::with_capacity(groups.len());
    let mut missing: Vec<String> = Vec::new();

    for group in groups {
        let target = SectionTarget::for_group(dialect, &group.name);
        let write = write_section(doc, &target, &group.records)?;
        log::debug!(
            "group {}: {} added, {} already present in {}",
            group.name,
            write.added.len(),
            write.already_present.len(),
            target.dotted()
        );
        for name in write.missing_version {
            if !missing.contains(&name) {
                missing.push(name);
            }
        }
        merged.push(GroupMerge {
            name: group.name.clone(),
            section: target.dotted(),
            added: write.added,
            already_present: write.already_present,
            created: write.created,
        });
    }
    Ok((merged, missing))
}

/// Serialize `doc` with dotted headers for the named groups that received
/// entries.
pub fn render_document(doc: &DocumentMut, groups: &[GroupMerge]) -> String {
    let touched = groups
        .iter()
        .filter(|g| g.name != ROOT_GROUP && !g.added.is_empty())
        .map(|g| g.name.as_str());
    format::unquote_group_headers(&doc.to_string(), touched)
}

/// Merge the request into the manifest on disk.
///
/// # Errors
/// [`ImportError::NotFound`] when the manifest does not exist,
/// [`ImportError::InvalidManifest`] when it cannot be parsed and
/// [`ImportError::ManifestLayout`] when a dependency section has the wrong
/// type. Nothing is written in any of these cases.
pub fn merge(request: &MergeRequest) -> Result<MergeOutcome> {
    let path = request.manifest_path.as_path();
    let (original, mut doc) = load_manifest(path)?;
    let dialect = request.dialect.resolve(&doc);
    log::debug!("merging into {} using the {} layout", path.display(), dialect);

    let (groups, missing_versions) = merge_document(&mut doc, dialect, &request.groups)?;
    let rendered = render_document(&doc, &groups);

    let written = rendered != original;
    if written {
        write_manifest(path, &rendered)?;
    } else {
        log::debug!("{} unchanged, not rewriting it", path.display());
    }

    Ok(MergeOutcome {
        dialect,
        groups,
        missing_versions,
        written,
    })
}

/// Replace the manifest atomically, keeping its permissions.
///
/// A symlinked manifest is resolved first so the rename lands on the
/// link's target and the link itself survives.
fn write_manifest(path: &Path, contents: &str) -> Result<()> {
    let target = fs::canonicalize(path).map_err(|e| ImportError::io(path, e))?;
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(&target)
        .map_err(|e| ImportError::io(&target, e))?
        .permissions();

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| ImportError::io(dir, e))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| ImportError::io(tmp.path(), e))?;
    fs::set_permissions(tmp.path(), permissions).map_err(|e| ImportError::io(tmp.path(), e))?;
    tmp.persist(&target)
        .map_err(|e| ImportError::io(&target, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(specs: &[(&str, &str)]) -> Vec<DependencyRecord> {
        specs
            .iter()
            .map(|(name, version)| DependencyRecord::with_version(*name, *version))
            .collect()
    }

    #[test]
    fn test_merge_document_reports_missing_once() {
        let mut doc = DocumentMut::new();
        let groups = vec![
            GroupRecords::new("root", vec![DependencyRecord::new("ruff")]),
            GroupRecords::new("dev", vec![DependencyRecord::new("ruff")]),
        ];
        let (merged, missing) = merge_document(&mut doc, Dialect::V1, &groups).unwrap();
        assert_eq!(missing, vec!["ruff"]);
        assert!(merged.iter().all(|g| g.added.is_empty()));
        assert_eq!(doc.to_string(), "");
    }

    #[test]
    fn test_named_group_header_is_dotted() {
        let mut doc: DocumentMut = "[tool.poetry]\nname = \"demo\"\n".parse().unwrap();
        let groups = vec![GroupRecords::new("dev", records(&[("pytest", "8.0")]))];
        let (merged, _) = merge_document(&mut doc, Dialect::V2, &groups).unwrap();
        assert_eq!(merged[0].section, "tool.poetry.group.dev.dependencies");

        let text = render_document(&doc, &merged);
        assert_eq!(
            text,
            "[tool.poetry]\nname = \"demo\"\n\n[tool.poetry.group.dev.dependencies]\npytest = \"8.0\"\n"
        );
    }

    #[test]
    fn test_v1_root_goes_to_poetry_table() {
        let mut doc: DocumentMut = "[tool.poetry.dependencies]\npython = \"^3.10\"\n"
            .parse()
            .unwrap();
        let groups = vec![GroupRecords::new("root", records(&[("flask", "1.0")]))];
        merge_document(&mut doc, Dialect::V1, &groups).unwrap();
        assert_eq!(
            doc.to_string(),
            "[tool.poetry.dependencies]\npython = \"^3.10\"\nflask = \"1.0\"\n"
        );
    }

    #[test]
    fn test_load_manifest_reports_invalid_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("pyproject.toml");
        fs::write(&path, "[project\nname = 1\n").unwrap();
        let err = load_manifest(&path).unwrap_err();
        assert!(matches!(err, ImportError::InvalidManifest { .. }));
    }

    #[test]
    fn test_load_manifest_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_manifest(&dir.path().join("pyproject.toml")).unwrap_err();
        assert!(matches!(
            err,
            ImportError::NotFound {
                kind: FileKind::Manifest,
                ..
            }
        ));
    }
}
