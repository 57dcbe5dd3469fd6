//! The import pipeline: tokens in, updated manifest and report out

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::ImportConfig;
use crate::error::Result;
use crate::grouping::{group_tokens, OptionSpec, OptionTable};
use crate::manifest::{merge, Dialect, DialectChoice, GroupMerge, GroupRecords, MergeRequest};
use crate::post_action::{dispatch, PackageManager, PostActions, PostStep};
use crate::requirements_file::{read_constraints, read_requirements};

/// Options of the `import` command other than `-g` and `-c`, which the
/// grouper handles itself.
pub const IMPORT_OPTIONS: &[OptionSpec] = &[
    OptionSpec::value("poetry-version", None),
    OptionSpec::flag("lock", None),
    OptionSpec::flag("no-update", None),
    OptionSpec::flag("install", None),
    OptionSpec::value("output", None),
    OptionSpec::flag("verbose", Some('v')),
];

pub fn import_option_table() -> OptionTable {
    OptionTable::new(IMPORT_OPTIONS.to_vec())
}

/// Everything one `import` invocation needs.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Tokens following the subcommand name
    pub tokens: Vec<String>,
    /// Options of the host command the grouper has to step over
    pub options: OptionTable,
    pub config: ImportConfig,
    pub dialect: DialectChoice,
    pub actions: PostActions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub manifest: PathBuf,
    pub dialect: Dialect,
    pub groups: Vec<GroupMerge>,
    pub missing_versions: Vec<String>,
    pub written: bool,
    pub post_steps: Vec<PostStep>,
}

impl ImportReport {
    pub fn added_count(&self) -> usize {
        self.groups.iter().map(|g| g.added.len()).sum()
    }
}

/// Run an import end to end.
///
/// Every requirements and constraints file is read and validated before the
/// manifest is touched; the manifest is written at most once, and post
/// actions only run after a successful merge.
pub fn run_import(options: &ImportOptions, manager: &mut dyn PackageManager) -> Result<ImportReport> {
    let buckets = group_tokens(&options.tokens, &options.options)?;
    log::debug!(
        "grouped {} file(s) into {:?}",
        buckets.file_count(),
        buckets.group_names()
    );

    let constraints = read_constraints(buckets.constraints().map(Path::new))?;

    let mut groups = Vec::new();
    for (name, files) in buckets.iter() {
        if files.is_empty() {
            continue;
        }
        let records = read_requirements(files, &constraints)?;
        groups.push(GroupRecords::new(name, records));
    }

    let outcome = merge(&MergeRequest {
        manifest_path: options.config.manifest_path.clone(),
        groups,
        dialect: options.dialect,
    })?;
    log::debug!(
        "{} dependency(ies) added, manifest {}",
        outcome.added_count(),
        if outcome.written { "updated" } else { "unchanged" }
    );

    let post_steps = dispatch(&options.actions, manager)?;

    Ok(ImportReport {
        manifest: options.config.manifest_path.clone(),
        dialect: outcome.dialect,
        groups: outcome.groups,
        missing_versions: outcome.missing_versions,
        written: outcome.written,
        post_steps,
    })
}
