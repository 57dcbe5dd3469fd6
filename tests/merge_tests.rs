//! Merging records into pyproject.toml on disk

use std::fs;
use std::path::PathBuf;

use poetry_import::{
    merge, Dialect, DialectChoice, DependencyRecord, GroupRecords, ImportError, MergeRequest,
};
use tempfile::TempDir;

fn manifest(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("pyproject.toml");
    fs::write(&path, content).unwrap();
    path
}

fn flask_and_django() -> Vec<DependencyRecord> {
    vec![
        DependencyRecord::with_version("flask", "1.0"),
        DependencyRecord::with_version("Django", "3.0"),
    ]
}

fn request(path: &PathBuf, groups: Vec<GroupRecords>, dialect: DialectChoice) -> MergeRequest {
    MergeRequest {
        manifest_path: path.clone(),
        groups,
        dialect,
    }
}

#[test]
fn test_v1_named_group() {
    let dir = TempDir::new().unwrap();
    let original = "[tool.poetry.dependencies]\npython = \"^3.8\"\n";
    let path = manifest(&dir, original);

    let outcome = merge(&request(
        &path,
        vec![GroupRecords::new("dev", flask_and_django())],
        DialectChoice::V1,
    ))
    .unwrap();

    assert!(outcome.written);
    assert_eq!(outcome.dialect, Dialect::V1);
    assert_eq!(outcome.groups[0].added, vec!["flask", "Django"]);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with(original));
    assert_eq!(
        text,
        "[tool.poetry.dependencies]\npython = \"^3.8\"\n\n\
         [tool.poetry.group.dev.dependencies]\nflask = \"1.0\"\nDjango = \"3.0\"\n"
    );
}

#[test]
fn test_v2_root_array() {
    let dir = TempDir::new().unwrap();
    let path = manifest(&dir, "[project]\nname = \"demo\"\ndependencies = []\n");

    merge(&request(
        &path,
        vec![GroupRecords::new("root", flask_and_django())],
        DialectChoice::V2,
    ))
    .unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "[project]\nname = \"demo\"\ndependencies = [\"flask (>=1.0)\", \"Django (>=3.0)\"]\n"
    );
}

#[test]
fn test_v2_creates_multiline_array() {
    let dir = TempDir::new().unwrap();
    let path = manifest(&dir, "[project]\nname = \"demo\"\n");

    let outcome = merge(&request(
        &path,
        vec![GroupRecords::new(
            "root",
            vec![DependencyRecord::with_version("flask", "==1.0")],
        )],
        DialectChoice::V2,
    ))
    .unwrap();

    assert!(outcome.groups[0].created);
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "[project]\nname = \"demo\"\ndependencies = [\n    \"flask (==1.0)\",\n]\n"
    );
}

#[test]
fn test_v2_appends_to_multiline_array() {
    let dir = TempDir::new().unwrap();
    let path = manifest(
        &dir,
        "[project]\nname = \"demo\"\ndependencies = [\n    \"requests (>=2.31)\",\n]\n",
    );

    merge(&request(
        &path,
        vec![GroupRecords::new(
            "root",
            vec![
                DependencyRecord::with_version("Requests", "3.0"),
                DependencyRecord::with_version("flask", "1.0"),
            ],
        )],
        DialectChoice::V2,
    ))
    .unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "[project]\nname = \"demo\"\ndependencies = [\n    \"requests (>=2.31)\",\n    \"flask (>=1.0)\",\n]\n"
    );
}

#[test]
fn test_auto_dialect_follows_manifest() {
    let dir = TempDir::new().unwrap();
    let path = manifest(&dir, "[tool.poetry.dependencies]\npython = \"^3.8\"\n");

    let outcome = merge(&request(
        &path,
        vec![GroupRecords::new("root", flask_and_django())],
        DialectChoice::Auto,
    ))
    .unwrap();

    assert_eq!(outcome.dialect, Dialect::V1);
    assert_eq!(outcome.groups[0].section, "tool.poetry.dependencies");
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("flask = \"1.0\"\nDjango = \"3.0\"\n"));
    assert!(!text.contains("[project]"));
}

#[test]
fn test_rerun_is_a_noop() {
    let dir = TempDir::new().unwrap();
    let path = manifest(
        &dir,
        "[project]\nname = \"demo\"\ndependencies = []\n\n[tool.poetry]\npackage-mode = false\n",
    );
    let groups = vec![
        GroupRecords::new("root", flask_and_django()),
        GroupRecords::new("dev", vec![DependencyRecord::with_version("pytest", "^8")]),
    ];

    let first = merge(&request(&path, groups.clone(), DialectChoice::V2)).unwrap();
    assert!(first.written);
    let after_first = fs::read_to_string(&path).unwrap();

    let second = merge(&request(&path, groups, DialectChoice::V2)).unwrap();
    assert!(!second.written);
    assert_eq!(second.added_count(), 0);
    assert_eq!(second.groups[0].already_present, vec!["flask", "Django"]);
    assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
}

#[test]
fn test_empty_merge_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let original = "# managed by hand\n[tool.poetry]\nname = \"demo\"   # keep\n\n[tool.poetry.dependencies]\npython = '^3.8'\n";
    let path = manifest(&dir, original);

    let outcome = merge(&request(
        &path,
        vec![
            GroupRecords::new("root", Vec::new()),
            GroupRecords::new("dev", vec![DependencyRecord::new("ruff")]),
        ],
        DialectChoice::V1,
    ))
    .unwrap();

    assert!(!outcome.written);
    assert_eq!(outcome.missing_versions, vec!["ruff"]);
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_existing_entries_are_not_replaced() {
    let dir = TempDir::new().unwrap();
    let path = manifest(&dir, "[tool.poetry.dependencies]\nFlask = \"^0.12\"\n");

    let outcome = merge(&request(
        &path,
        vec![GroupRecords::new("root", flask_and_django())],
        DialectChoice::V1,
    ))
    .unwrap();

    assert_eq!(outcome.groups[0].already_present, vec!["flask"]);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "[tool.poetry.dependencies]\nFlask = \"^0.12\"\nDjango = \"3.0\"\n"
    );
}

#[test]
fn test_missing_manifest() {
    let dir = TempDir::new().unwrap();
    let err = merge(&request(
        &dir.path().join("pyproject.toml"),
        vec![GroupRecords::new("root", flask_and_django())],
        DialectChoice::V2,
    ))
    .unwrap_err();
    assert!(matches!(err, ImportError::NotFound { .. }));
}

#[test]
fn test_layout_conflict_leaves_file_alone() {
    let dir = TempDir::new().unwrap();
    let original = "[project]\nname = \"demo\"\ndependencies = \"flask\"\n";
    let path = manifest(&dir, original);

    let err = merge(&request(
        &path,
        vec![GroupRecords::new("root", flask_and_django())],
        DialectChoice::V2,
    ))
    .unwrap_err();
    assert!(matches!(err, ImportError::ManifestLayout { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[cfg(unix)]
#[test]
fn test_write_keeps_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let path = manifest(&dir, "[project]\nname = \"demo\"\n");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

    merge(&request(
        &path,
        vec![GroupRecords::new("root", flask_and_django())],
        DialectChoice::V2,
    ))
    .unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o640);
}

#[cfg(unix)]
#[test]
fn test_write_through_symlink_updates_target() {
    let dir = TempDir::new().unwrap();
    let real = dir.path().join("real.toml");
    fs::write(&real, "[project]\nname = \"demo\"\ndependencies = []\n").unwrap();
    let link = dir.path().join("pyproject.toml");
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let outcome = merge(&request(
        &link,
        vec![GroupRecords::new(
            "root",
            vec![DependencyRecord::with_version("flask", "1.0")],
        )],
        DialectChoice::V2,
    ))
    .unwrap();

    assert!(outcome.written);
    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert_eq!(
        fs::read_to_string(&real).unwrap(),
        "[project]\nname = \"demo\"\ndependencies = [\"flask (>=1.0)\"]\n"
    );
}
