//! Argument grouping for `poetry-import import`
//!
//! Splits the flat token stream that follows the subcommand into dependency
//! groups. Tokens are scanned positionally, so `-g` segments can be freely
//! interleaved with plain file arguments:
//!
//! ```text
//! base.txt -g dev dev.txt lint.txt -g docs docs.txt -c constraints.txt
//!
//! root -> [base.txt]
//! dev  -> [dev.txt, lint.txt]
//! docs -> [docs.txt]
//! constraints file: constraints.txt
//! ```
//!
//! Which tokens are options of the host command is decided by an explicit
//! [`OptionTable`] instead of asking the argument framework at runtime.

use crate::error::{ImportError, Result};

/// Name of the default bucket for files given before any `-g`.
pub const ROOT_GROUP: &str = "root";

/// Reserved for the constraints file; never a dependency group.
pub const CONSTRAINTS_GROUP: &str = "constraints";

/// One option the host command accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub long: &'static str,
    pub short: Option<char>,
    pub takes_value: bool,
}

impl OptionSpec {
    pub const fn flag(long: &'static str, short: Option<char>) -> Self {
        OptionSpec {
            long,
            short,
            takes_value: false,
        }
    }

    pub const fn value(long: &'static str, short: Option<char>) -> Self {
        OptionSpec {
            long,
            short,
            takes_value: true,
        }
    }
}

/// Options the grouper must step over, with their arity.
#[derive(Debug, Clone, Default)]
pub struct OptionTable {
    specs: Vec<OptionSpec>,
}

impl OptionTable {
    pub fn new(specs: Vec<OptionSpec>) -> Self {
        OptionTable { specs }
    }

    /// Look up a dash-prefixed token (`--lock`, `-v`, `--output=json`).
    pub fn lookup(&self, token: &str) -> Option<&OptionSpec> {
        let name = option_name(token)?;
        self.specs.iter().find(|spec| {
            spec.long == name
                || spec
                    .short
                    .is_some_and(|s| name.len() == s.len_utf8() && name.starts_with(s))
        })
    }
}

/// Strip leading dashes and any `=value` suffix.
fn option_name(token: &str) -> Option<&str> {
    if !token.starts_with('-') {
        return None;
    }
    let name = token.trim_start_matches('-');
    let name = name.split_once('=').map_or(name, |(n, _)| n);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn is_flag(token: &str) -> bool {
    token.starts_with('-') && token.len() > 1
}

/// Files bucketed by dependency group, in command-line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupBuckets {
    groups: Vec<(String, Vec<String>)>,
    constraints: Option<String>,
}

impl GroupBuckets {
    fn with_root() -> Self {
        GroupBuckets {
            groups: vec![(ROOT_GROUP.to_string(), Vec::new())],
            constraints: None,
        }
    }

    pub fn constraints(&self) -> Option<&str> {
        self.constraints.as_deref()
    }

    /// Files of one group, `None` if the group was never declared.
    pub fn files(&self, group: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, files)| files.as_slice())
    }

    /// Groups in declaration order, `root` first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(name, files)| (name.as_str(), files.as_slice()))
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn file_count(&self) -> usize {
        self.groups.iter().map(|(_, files)| files.len()).sum()
    }

    fn contains(&self, group: &str) -> bool {
        self.groups.iter().any(|(name, _)| name == group)
    }

    fn push_file(&mut self, group: &str, file: String) {
        if let Some((_, files)) = self.groups.iter_mut().find(|(name, _)| name == group) {
            files.push(file);
        }
    }
}

fn is_group_flag(token: &str) -> bool {
    token == "-g" || token == "--group"
}

fn is_constraint_flag(token: &str) -> bool {
    token == "-c" || token == "--constraint"
}

/// Group the tokens that follow the subcommand name.
///
/// # Errors
/// [`ImportError::Usage`] when the token stream is empty, a `-g`/`-c` lacks its
/// value, a group is declared twice or is named `constraints`, `-g root`
/// follows files already placed in root, `-c` is repeated,
/// a constraints file is given without any requirements file, or an
/// unregistered option is found.
pub fn group_tokens(tokens: &[String], options: &OptionTable) -> Result<GroupBuckets> {
    if tokens.is_empty() {
        return Err(ImportError::usage(
            "At least one file or a group with files needs to be provided",
        ));
    }

    let mut buckets = GroupBuckets::with_root();
    let mut current = ROOT_GROUP.to_string();

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();

        if is_group_flag(token) {
            let name = match tokens.get(i + 1) {
                Some(next) if !is_flag(next) => next,
                _ => {
                    return Err(ImportError::usage(format!(
                        "Missing or invalid group name after '{}'.",
                        token
                    )))
                }
            };
            if name == CONSTRAINTS_GROUP {
                return Err(ImportError::usage(format!(
                    "'{}' is a reserved group name",
                    name
                )));
            }
            // Explicit root is only allowed before any file landed in it.
            if name == ROOT_GROUP && buckets.files(ROOT_GROUP).is_some_and(|f| f.is_empty()) {
                current = ROOT_GROUP.to_string();
                i += 2;
                continue;
            }
            if buckets.contains(name) {
                return Err(ImportError::usage(format!("Duplicate group name: {}", name)));
            }
            buckets.groups.push((name.clone(), Vec::new()));
            current = name.clone();
            i += 2;
            continue;
        }

        if is_constraint_flag(token) {
            if buckets.constraints.is_some() {
                return Err(ImportError::usage("Multiple '-c' flags are not allowed."));
            }
            match tokens.get(i + 1) {
                Some(next) if !is_flag(next) => buckets.constraints = Some(next.clone()),
                _ => {
                    return Err(ImportError::usage(format!(
                        "Missing filename after '{}'.",
                        token
                    )))
                }
            }
            i += 2;
            continue;
        }

        if is_flag(token) {
            let spec = options
                .lookup(token)
                .ok_or_else(|| ImportError::usage(format!("Unknown argument: {}", token)))?;
            i += if spec.takes_value && !token.contains('=') {
                2
            } else {
                1
            };
            continue;
        }

        buckets.push_file(&current, token.to_string());
        i += 1;
    }

    if buckets.constraints.is_some() && buckets.file_count() == 0 {
        return Err(ImportError::usage(
            "constraints file should pair with one or more requirements files",
        ));
    }

    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    fn table() -> OptionTable {
        OptionTable::new(vec![
            OptionSpec::flag("lock", None),
            OptionSpec::flag("verbose", Some('v')),
            OptionSpec::value("poetry-version", None),
        ])
    }

    #[test]
    fn test_lookup_by_long_and_short_name() {
        let table = table();
        assert!(table.lookup("--lock").is_some());
        assert!(table.lookup("-v").is_some());
        assert!(table.lookup("--poetry-version=v1").is_some());
        assert!(table.lookup("--unknown").is_none());
        assert!(table.lookup("lock").is_none());
    }

    #[test]
    fn test_files_default_to_root() {
        let buckets = group_tokens(&tokens("a.txt b.txt"), &table()).unwrap();
        assert_eq!(buckets.files(ROOT_GROUP).unwrap(), ["a.txt", "b.txt"]);
        assert_eq!(buckets.constraints(), None);
    }

    #[test]
    fn test_skips_registered_options_with_their_values() {
        let buckets =
            group_tokens(&tokens("--poetry-version v1 a.txt --lock -v b.txt"), &table()).unwrap();
        assert_eq!(buckets.files(ROOT_GROUP).unwrap(), ["a.txt", "b.txt"]);
    }

    #[test]
    fn test_inline_option_value_is_skipped_alone() {
        let buckets = group_tokens(&tokens("--poetry-version=v1 a.txt"), &table()).unwrap();
        assert_eq!(buckets.files(ROOT_GROUP).unwrap(), ["a.txt"]);
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let err = group_tokens(&tokens("a.txt --bogus"), &table()).unwrap_err();
        assert!(matches!(err, ImportError::Usage(_)));
    }

    #[test]
    fn test_constraints_is_reserved() {
        let err = group_tokens(&tokens("-g constraints a.txt"), &table()).unwrap_err();
        assert_eq!(err.to_string(), "'constraints' is a reserved group name");
    }

    #[test]
    fn test_explicit_root_while_empty() {
        let buckets = group_tokens(&tokens("-g dev d.txt -g root a.txt"), &table()).unwrap();
        assert_eq!(buckets.group_names(), vec![ROOT_GROUP, "dev"]);
        assert_eq!(buckets.files(ROOT_GROUP).unwrap(), ["a.txt"]);
        assert_eq!(buckets.files("dev").unwrap(), ["d.txt"]);
    }

    #[test]
    fn test_explicit_root_after_root_files() {
        let err = group_tokens(&tokens("a.txt -g root b.txt"), &table()).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate group name: root");
    }

    #[test]
    fn test_group_declared_without_files_is_kept() {
        let buckets = group_tokens(&tokens("a.txt -g dev"), &table()).unwrap();
        assert_eq!(buckets.group_names(), vec![ROOT_GROUP, "dev"]);
        assert!(buckets.files("dev").unwrap().is_empty());
    }

    #[test]
    fn test_long_forms_of_group_and_constraint() {
        let buckets =
            group_tokens(&tokens("--group dev d.txt --constraint c.txt"), &table()).unwrap();
        assert_eq!(buckets.files("dev").unwrap(), ["d.txt"]);
        assert_eq!(buckets.constraints(), Some("c.txt"));
    }
}
