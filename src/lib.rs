//! poetry-import: import `requirements.txt` files into a Poetry `pyproject.toml`
//!
//! An import runs in four stages:
//!
//! 1. [`grouping`] splits the command-line tokens into dependency groups and
//!    an optional constraints file.
//! 2. [`requirements_file`] reads every file through the requirement parser in
//!    [`requirement`] and applies the constraints.
//! 3. [`manifest`] merges the records into the manifest, in the Poetry 1.x
//!    (`v1`) or PEP 621 (`v2`) layout, preserving all untouched formatting.
//! 4. [`post_action`] optionally runs `poetry lock` and `poetry install`.
//!
//! [`run_import`] wires the stages together. All inputs are read and validated
//! before the manifest is written, and the manifest is written at most once.
//!
//! # Example
//!
//! ```no_run
//! use poetry_import::{import_option_table, run_import, ImportConfig, ImportOptions, PoetryCli};
//!
//! let config = ImportConfig::with_manifest("pyproject.toml");
//! let options = ImportOptions {
//!     tokens: vec!["requirements.txt".into(), "-g".into(), "dev".into(), "dev.txt".into()],
//!     options: import_option_table(),
//!     config: config.clone(),
//!     dialect: Default::default(),
//!     actions: Default::default(),
//! };
//! let report = run_import(&options, &mut PoetryCli::for_manifest(&config.manifest_path))?;
//! println!("{} added", report.added_count());
//! # Ok::<(), poetry_import::ImportError>(())
//! ```

pub mod config;
pub mod error;
pub mod error_codes;
pub mod grouping;
pub mod importer;
pub mod manifest;
pub mod output;
pub mod post_action;
pub mod requirement;
pub mod requirements_file;
pub mod version;

pub use config::ImportConfig;
pub use error::{FileKind, ImportError, Result};
pub use grouping::{group_tokens, GroupBuckets, OptionSpec, OptionTable, CONSTRAINTS_GROUP, ROOT_GROUP};
pub use importer::{import_option_table, run_import, ImportOptions, ImportReport};
pub use manifest::{merge, Dialect, DialectChoice, GroupMerge, GroupRecords, MergeOutcome, MergeRequest};
pub use output::{JsonResponse, OutputFormat};
pub use post_action::{dispatch, PackageManager, PoetryCli, PostActions, PostStep};
pub use requirement::{canonical_name, parse_requirement, DependencyRecord, RequirementError};
pub use requirements_file::{read_constraints, read_requirements, ConstraintMap};
