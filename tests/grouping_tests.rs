//! Grouping of command-line tokens into dependency groups

use poetry_import::{group_tokens, import_option_table, ImportError};

fn tokens(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn usage_message(list: &[&str]) -> String {
    match group_tokens(&tokens(list), &import_option_table()) {
        Err(ImportError::Usage(message)) => message,
        other => panic!("expected a usage error for {:?}, got {:?}", list, other),
    }
}

#[test]
fn test_mixed_groups_and_constraints() {
    let buckets = group_tokens(
        &tokens(&["base.txt", "-g", "dev", "dev.txt", "lint.txt", "-c", "c.txt"]),
        &import_option_table(),
    )
    .unwrap();

    assert_eq!(buckets.files("root").unwrap(), ["base.txt"]);
    assert_eq!(buckets.files("dev").unwrap(), ["dev.txt", "lint.txt"]);
    assert_eq!(buckets.constraints(), Some("c.txt"));
    assert_eq!(buckets.group_names(), vec!["root", "dev"]);
}

#[test]
fn test_interleaving_is_positional() {
    let buckets = group_tokens(
        &tokens(&["-g", "a", "f1", "-g", "b", "f2", "f3"]),
        &import_option_table(),
    )
    .unwrap();

    assert!(buckets.files("root").unwrap().is_empty());
    assert_eq!(buckets.files("a").unwrap(), ["f1"]);
    assert_eq!(buckets.files("b").unwrap(), ["f2", "f3"]);
}

#[test]
fn test_command_options_are_skipped() {
    let buckets = group_tokens(
        &tokens(&[
            "--poetry-version",
            "v1",
            "base.txt",
            "--lock",
            "-v",
            "--output=json",
            "-g",
            "dev",
            "--install",
            "dev.txt",
        ]),
        &import_option_table(),
    )
    .unwrap();

    assert_eq!(buckets.files("root").unwrap(), ["base.txt"]);
    assert_eq!(buckets.files("dev").unwrap(), ["dev.txt"]);
}

#[test]
fn test_empty_token_stream() {
    assert_eq!(
        usage_message(&[]),
        "At least one file or a group with files needs to be provided"
    );
}

#[test]
fn test_duplicate_group() {
    assert_eq!(
        usage_message(&["-g", "dev", "a.txt", "-g", "dev", "b.txt"]),
        "Duplicate group name: dev"
    );
}

#[test]
fn test_group_flag_without_name() {
    assert_eq!(
        usage_message(&["a.txt", "-g"]),
        "Missing or invalid group name after '-g'."
    );
    assert_eq!(
        usage_message(&["a.txt", "--group", "--lock"]),
        "Missing or invalid group name after '--group'."
    );
}

#[test]
fn test_constraint_rules() {
    assert_eq!(
        usage_message(&["a.txt", "-c", "c1.txt", "-c", "c2.txt"]),
        "Multiple '-c' flags are not allowed."
    );
    assert_eq!(usage_message(&["a.txt", "-c"]), "Missing filename after '-c'.");
    assert_eq!(
        usage_message(&["-c", "c.txt"]),
        "constraints file should pair with one or more requirements files"
    );
}

#[test]
fn test_reserved_group_names() {
    assert_eq!(
        usage_message(&["-g", "constraints", "a.txt"]),
        "'constraints' is a reserved group name"
    );
    assert_eq!(
        usage_message(&["--group", "constraints", "a.txt"]),
        "'constraints' is a reserved group name"
    );
}

#[test]
fn test_explicit_root_group() {
    let buckets = group_tokens(
        &tokens(&["-g", "root", "a.txt", "-g", "dev", "d.txt"]),
        &import_option_table(),
    )
    .unwrap();
    assert_eq!(buckets.group_names(), vec!["root", "dev"]);
    assert_eq!(buckets.files("root").unwrap(), ["a.txt"]);
    assert_eq!(buckets.files("dev").unwrap(), ["d.txt"]);

    assert_eq!(
        usage_message(&["a.txt", "-g", "root", "b.txt"]),
        "Duplicate group name: root"
    );
}

#[test]
fn test_unknown_option() {
    assert_eq!(
        usage_message(&["a.txt", "--frobnicate"]),
        "Unknown argument: --frobnicate"
    );
}
